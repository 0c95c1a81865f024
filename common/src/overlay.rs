//! 検出オーバーレイ描画
//!
//! 表示中の画像に重ねた透明キャンバスへ、検出ボックスとラベルを描く。
//! bboxは常に元画像のピクセル座標で保持し、表示サイズへの変換は
//! 描画のたびに `DisplayGeometry` で計算し直す（変換後の座標はキャッシュしない）。
//!
//! 描画先は `Surface` トレイトで抽象化している:
//! - `DrawList`: 描画命令の記録（テスト・SVG出力）
//! - ブラウザの `CanvasRenderingContext2d`（web-wasm）
//! - `image::RgbaImage`（CLIのPNG出力）

use crate::palette;
use crate::types::{BoundingBox, Detection};

/// 外枠の線幅
pub const OUTER_LINE_WIDTH: f64 = 10.0;
/// 内枠の線幅
pub const INNER_LINE_WIDTH: f64 = 6.0;
/// 内枠の内側オフセット
pub const INNER_INSET: f64 = 5.0;
/// 塗りつぶしの不透明度
pub const FILL_ALPHA: f64 = 0.15;
/// ラベル文字の高さ
pub const LABEL_TEXT_HEIGHT: f64 = 28.0;
/// ラベル背景の左右余白
pub const LABEL_PADDING_X: f64 = 10.0;
/// ラベル背景とボックスの間隔
pub const LABEL_GAP: f64 = 5.0;
/// ラベル文字の縁取り幅
pub const TEXT_OUTLINE_WIDTH: f64 = 4.0;
/// キャンバス1辺の上限（ブラウザのcanvas上限に合わせる）
pub const MAX_CANVAS_SIDE: u32 = 16_384;

/// RGBA色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(0xFF, 0xFF, 0xFF);
    pub const BLACK: Color = Color::rgb(0x00, 0x00, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xFF }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// 不透明度（0.0-1.0）を差し替える
    pub fn with_alpha(self, alpha: f64) -> Self {
        let a = (alpha.clamp(0.0, 1.0) * 255.0).round() as u8;
        Self { a, ..self }
    }

    /// CSSの色表記
    pub fn to_css(&self) -> String {
        if self.a == 0xFF {
            format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
        } else {
            format!(
                "rgba({}, {}, {}, {:.2})",
                self.r,
                self.g,
                self.b,
                self.a as f64 / 255.0
            )
        }
    }
}

/// キャンバス座標の矩形
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// 四辺をdだけ内側に寄せる（潰れる場合はNone）
    pub fn inset(&self, d: f64) -> Option<Rect> {
        let width = self.width - 2.0 * d;
        let height = self.height - 2.0 * d;
        if width <= 0.0 || height <= 0.0 {
            return None;
        }
        Some(Rect::new(self.x + d, self.y + d, width, height))
    }
}

/// フォント指定
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Font {
    pub size_px: f64,
    pub bold: bool,
    pub family: &'static str,
}

impl Font {
    /// ラベル用フォント
    pub const LABEL: Font = Font {
        size_px: 20.0,
        bold: true,
        family: "Arial",
    };

    /// CSSのfont表記（例: "bold 20px Arial"）
    pub fn to_css(&self) -> String {
        if self.bold {
            format!("bold {}px {}", self.size_px, self.family)
        } else {
            format!("{}px {}", self.size_px, self.family)
        }
    }
}

/// 文字描画のスタイル
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextStyle {
    pub font: Font,
    pub fill: Color,
    pub outline: Color,
    pub outline_width: f64,
}

impl TextStyle {
    pub const LABEL: TextStyle = TextStyle {
        font: Font::LABEL,
        fill: Color::WHITE,
        outline: Color::BLACK,
        outline_width: TEXT_OUTLINE_WIDTH,
    };
}

/// フォントメトリクスが取れない描画先向けの概算幅
pub fn approx_text_width(text: &str, font: &Font) -> f64 {
    let factor = if font.bold { 0.62 } else { 0.56 };
    text.chars().count() as f64 * font.size_px * factor
}

/// 表示サイズと元画像サイズの対応
///
/// 表示中の画像要素のレイアウトから毎回作り直す。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayGeometry {
    natural_width: u32,
    natural_height: u32,
    canvas_width: u32,
    canvas_height: u32,
}

impl DisplayGeometry {
    /// # Arguments
    /// * `natural` - 元画像のピクセルサイズ
    /// * `displayed` - 画面上の表示サイズ（CSSピクセル、小数あり）
    ///
    /// # Returns
    /// 元画像サイズが0、または表示サイズが不正（非有限・`MAX_CANVAS_SIDE`超）な場合はNone
    pub fn new(natural: (u32, u32), displayed: (f64, f64)) -> Option<Self> {
        let (natural_width, natural_height) = natural;
        let (display_width, display_height) = displayed;
        if natural_width == 0 || natural_height == 0 {
            return None;
        }
        if !display_width.is_finite() || !display_height.is_finite() {
            return None;
        }
        let max_side = f64::from(MAX_CANVAS_SIDE) + 1.0;
        if display_width >= max_side || display_height >= max_side {
            return None;
        }
        // canvas.width への代入と同じく小数部は切り捨て
        Some(Self {
            natural_width,
            natural_height,
            canvas_width: display_width.max(0.0) as u32,
            canvas_height: display_height.max(0.0) as u32,
        })
    }

    pub fn natural_size(&self) -> (u32, u32) {
        (self.natural_width, self.natural_height)
    }

    pub fn canvas_size(&self) -> (u32, u32) {
        (self.canvas_width, self.canvas_height)
    }

    pub fn scale_x(&self) -> f64 {
        self.canvas_width as f64 / self.natural_width as f64
    }

    pub fn scale_y(&self) -> f64 {
        self.canvas_height as f64 / self.natural_height as f64
    }

    /// 元画像座標のbboxをキャンバス座標へ（縦横独立にスケール）
    pub fn scale_box(&self, bbox: &BoundingBox) -> Rect {
        let (sx, sy) = (self.scale_x(), self.scale_y());
        let x1 = (bbox.x1 * sx).round();
        let y1 = (bbox.y1 * sy).round();
        let x2 = (bbox.x2 * sx).round();
        let y2 = (bbox.y2 * sy).round();
        Rect::new(x1, y1, x2 - x1, y2 - y1)
    }
}

/// 描画先
pub trait Surface {
    /// ピクセルサイズを変更する（内容は消える）
    fn resize(&mut self, width: u32, height: u32);

    /// 全体を透明にする
    fn clear(&mut self);

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64);

    fn fill_rect(&mut self, rect: Rect, color: Color);

    fn text_width(&self, text: &str, font: &Font) -> f64;

    /// (x, y) はベースラインの左端
    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle);
}

/// 描画結果
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderSummary {
    pub drawn: usize,
    pub skipped: usize,
}

/// ラベル文字列（クラス名 + 信頼度%小数1桁）
pub fn format_label(detection: &Detection) -> String {
    format!("{} {:.1}%", detection.class_name, detection.confidence * 100.0)
}

/// 検出結果を描画
///
/// 呼ぶたびにキャンバスを表示サイズに合わせてクリアし、全件描き直す。
/// 不正なbbox（x1>=x2 など）は描かずにskippedとして数える。
pub fn render_detections<S: Surface + ?Sized>(
    surface: &mut S,
    detections: &[Detection],
    geometry: &DisplayGeometry,
) -> RenderSummary {
    let (width, height) = geometry.canvas_size();
    surface.resize(width, height);
    surface.clear();

    let mut summary = RenderSummary::default();
    for detection in detections {
        if detection.validate().is_err() {
            summary.skipped += 1;
            continue;
        }
        let rect = geometry.scale_box(&detection.bbox);
        // 表示サイズが小さすぎて潰れたもの
        if rect.width <= 0.0 || rect.height <= 0.0 {
            summary.skipped += 1;
            continue;
        }
        draw_detection(surface, detection, rect);
        summary.drawn += 1;
    }
    summary
}

/// オーバーレイを消す
pub fn clear_overlay<S: Surface + ?Sized>(surface: &mut S) {
    surface.clear();
}

fn draw_detection<S: Surface + ?Sized>(
    surface: &mut S,
    detection: &Detection,
    rect: Rect,
) {
    let color = palette::color_for(&detection.class_name);

    surface.stroke_rect(rect, color, OUTER_LINE_WIDTH);
    if let Some(inner) = rect.inset(INNER_INSET) {
        surface.stroke_rect(inner, color, INNER_LINE_WIDTH);
    }
    surface.fill_rect(rect, color.with_alpha(FILL_ALPHA));

    // ラベルはボックスの上、キャンバス上端からははみ出さない
    let label = format_label(detection);
    let text_width = surface.text_width(&label, &TextStyle::LABEL.font);
    let background_height = LABEL_TEXT_HEIGHT + LABEL_GAP;
    let background = Rect::new(
        rect.x,
        (rect.y - background_height).max(0.0),
        text_width + 2.0 * LABEL_PADDING_X,
        background_height,
    );
    surface.fill_rect(background, color);

    let baseline = (rect.y - 10.0).max(LABEL_TEXT_HEIGHT - 10.0);
    surface.draw_text(&label, rect.x + LABEL_PADDING_X, baseline, &TextStyle::LABEL);
}

/// 記録された描画命令
#[derive(Debug, Clone, PartialEq)]
pub enum DrawOp {
    StrokeRect {
        rect: Rect,
        color: Color,
        line_width: f64,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    Text {
        text: String,
        x: f64,
        y: f64,
        style: TextStyle,
    },
}

/// 描画命令を記録するSurface
///
/// resize/clearで以前の命令を捨てるため、`ops()` は常に「今見えているもの」。
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    width: u32,
    height: u32,
    ops: Vec<DrawOp>,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    pub fn is_blank(&self) -> bool {
        self.ops.is_empty()
    }

    /// 外枠（線幅 OUTER_LINE_WIDTH の矩形）の一覧 = 描画されたボックス
    pub fn boxes(&self) -> Vec<Rect> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::StrokeRect { rect, line_width, .. } if *line_width == OUTER_LINE_WIDTH => {
                    Some(*rect)
                }
                _ => None,
            })
            .collect()
    }

    /// 描画された文字列の一覧
    pub fn labels(&self) -> Vec<&str> {
        self.ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { text, .. } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl Surface for DrawList {
    fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.ops.clear();
    }

    fn clear(&mut self) {
        self.ops.clear();
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        self.ops.push(DrawOp::StrokeRect { rect, color, line_width });
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        self.ops.push(DrawOp::FillRect { rect, color });
    }

    fn text_width(&self, text: &str, font: &Font) -> f64 {
        approx_text_width(text, font)
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        self.ops.push(DrawOp::Text {
            text: text.to_string(),
            x,
            y,
            style: *style,
        });
    }
}
