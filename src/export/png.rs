//! PNG出力（元画像を表示サイズに縮尺し、その上にボックスを合成）

use crate::error::{DentalAiError, Result};
use ab_glyph::{Font as _, FontArc, PxScale, ScaleFont};
use dental_ai_common::overlay::{approx_text_width, Color, Font, Rect, Surface, TextStyle};
use dental_ai_common::{render_detections, Detection, DisplayGeometry, RenderSummary};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size, Blend};
use imageproc::rect::Rect as PixelRect;
use std::path::Path;

/// ラベル用フォントの探索候補（太字・ベトナム語のダイアクリティクスを含むもの）
const FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    r"C:\Windows\Fonts\arialbd.ttf",
];

/// ラベル描画用フォント
#[derive(Clone)]
pub struct LabelFont(FontArc);

impl LabelFont {
    pub fn from_bytes(data: Vec<u8>) -> Result<Self> {
        FontArc::try_from_vec(data)
            .map(Self)
            .map_err(|e| DentalAiError::Export(format!("フォントを読み込めません: {}", e)))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)
            .map_err(|_| DentalAiError::FileNotFound(path.display().to_string()))?;
        Self::from_bytes(data)
    }

    /// 既知のシステムフォントから最初に読めたものを使う
    pub fn discover() -> Option<Self> {
        FONT_CANDIDATES
            .iter()
            .find_map(|path| Self::load(Path::new(path)).ok())
    }

    fn scale(font: &Font) -> PxScale {
        PxScale::from(font.size_px as f32)
    }
}

/// `image::RgbaImage` に描くSurface
///
/// フォントがない場合、ラベルは背景帯だけになる。
pub struct RasterSurface {
    canvas: Blend<RgbaImage>,
    font: Option<LabelFont>,
}

impl RasterSurface {
    pub fn new(font: Option<LabelFont>) -> Self {
        Self {
            canvas: Blend(RgbaImage::new(0, 0)),
            font,
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.canvas.0
    }

    /// 小数座標の矩形をピクセル矩形へ。面積がなければNone
    fn pixel_rect(x0: f64, y0: f64, x1: f64, y1: f64) -> Option<PixelRect> {
        let (left, top) = (x0.round(), y0.round());
        let width = x1.round() - left;
        let height = y1.round() - top;
        if width < 1.0 || height < 1.0 {
            return None;
        }
        Some(PixelRect::at(left as i32, top as i32).of_size(width as u32, height as u32))
    }
}

fn pixel(color: Color) -> Rgba<u8> {
    Rgba([color.r, color.g, color.b, color.a])
}

impl Surface for RasterSurface {
    fn resize(&mut self, width: u32, height: u32) {
        self.canvas = Blend(RgbaImage::new(width, height));
    }

    fn clear(&mut self) {
        for p in self.canvas.0.pixels_mut() {
            *p = Rgba([0, 0, 0, 0]);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: Color, line_width: f64) {
        // 線は輪郭線の両側にline_width/2ずつ広がる。1px幅の枠を内側へ重ねて太くする
        let half = line_width / 2.0;
        let Some(outer) =
            Self::pixel_rect(rect.x - half, rect.y - half, rect.right() + half, rect.bottom() + half)
        else {
            return;
        };
        let paint = pixel(color);
        let steps = line_width.round().max(1.0) as u32;

        for i in 0..steps {
            let width = outer.width().saturating_sub(2 * i);
            let height = outer.height().saturating_sub(2 * i);
            if width == 0 || height == 0 {
                break;
            }
            let ring = PixelRect::at(outer.left() + i as i32, outer.top() + i as i32).of_size(width, height);
            draw_hollow_rect_mut(&mut self.canvas, ring, paint);
        }
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) {
        if let Some(area) = Self::pixel_rect(rect.x, rect.y, rect.right(), rect.bottom()) {
            draw_filled_rect_mut(&mut self.canvas, area, pixel(color));
        }
    }

    fn text_width(&self, text: &str, font: &Font) -> f64 {
        match &self.font {
            Some(label_font) => text_size(LabelFont::scale(font), &label_font.0, text).0 as f64,
            None => approx_text_width(text, font),
        }
    }

    fn draw_text(&mut self, text: &str, x: f64, y: f64, style: &TextStyle) {
        let Some(label_font) = &self.font else {
            return;
        };
        let scale = LabelFont::scale(&style.font);
        // imageprocは上端基準なのでベースラインからascent分戻す
        let ascent = label_font.0.as_scaled(scale).ascent();
        let left = x.round() as i32;
        let top = (y as f32 - ascent).round() as i32;

        // 縁取り: strokeTextと同じくoutline_width/2だけ外側へ広げる
        let radius = (style.outline_width / 2.0).round() as i32;
        let outline = pixel(style.outline);
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if (dx, dy) == (0, 0) || dx * dx + dy * dy > radius * radius {
                    continue;
                }
                draw_text_mut(&mut self.canvas, outline, left + dx, top + dy, scale, &label_font.0, text);
            }
        }
        draw_text_mut(&mut self.canvas, pixel(style.fill), left, top, scale, &label_font.0, text);
    }
}

/// 元画像 + オーバーレイをPNGで保存
pub fn write_png(
    output: &Path,
    source: &Path,
    detections: &[Detection],
    geometry: &DisplayGeometry,
    font: Option<&LabelFont>,
) -> Result<RenderSummary> {
    let base = image::open(source)
        .map_err(|e| DentalAiError::ImageLoad(format!("{}: {}", source.display(), e)))?
        .to_rgba8();

    let (composed, summary) = compose(&base, detections, geometry, font);
    composed
        .save(output)
        .map_err(|e| DentalAiError::Export(format!("{}: {}", output.display(), e)))?;
    Ok(summary)
}

/// 元画像を表示サイズへ縮尺し、オーバーレイを重ねる
pub fn compose(
    base: &RgbaImage,
    detections: &[Detection],
    geometry: &DisplayGeometry,
    font: Option<&LabelFont>,
) -> (RgbaImage, RenderSummary) {
    let mut surface = RasterSurface::new(font.cloned());
    let summary = render_detections(&mut surface, detections, geometry);

    let (width, height) = geometry.canvas_size();
    // 表示されていない画像には重ねるものがない
    if width == 0 || height == 0 {
        return (base.clone(), summary);
    }
    let mut composed = if base.dimensions() == (width, height) {
        base.clone()
    } else {
        imageops::resize(base, width, height, FilterType::Triangle)
    };
    imageops::overlay(&mut composed, surface.image(), 0, 0);
    (composed, summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use dental_ai_common::BoundingBox;
    use tempfile::tempdir;

    const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);

    fn calculus(bbox: (f64, f64, f64, f64)) -> Detection {
        Detection::new("Calculus", 0.9, BoundingBox::new(bbox.0, bbox.1, bbox.2, bbox.3))
    }

    fn near_white(p: &Rgba<u8>) -> bool {
        p.0.iter().all(|c| *c >= 230)
    }

    fn near_black(p: &Rgba<u8>) -> bool {
        p[0] <= 25 && p[1] <= 25 && p[2] <= 25 && p[3] >= 230
    }

    fn system_font() -> Option<LabelFont> {
        let font = LabelFont::discover();
        if font.is_none() {
            eprintln!("no system font found; skipping glyph test");
        }
        font
    }

    #[test]
    fn test_stroke_covers_outline() {
        let mut surface = RasterSurface::new(None);
        surface.resize(100, 100);
        surface.stroke_rect(Rect::new(20.0, 20.0, 60.0, 60.0), Color::rgb(255, 0, 0), 10.0);

        let img = surface.image();
        // 輪郭線上
        assert_eq!(img.get_pixel(20, 50), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(16, 50), &Rgba([255, 0, 0, 255]));
        assert_eq!(img.get_pixel(84, 50), &Rgba([255, 0, 0, 255]));
        // 内側と外側は透明
        assert_eq!(img.get_pixel(50, 50)[3], 0);
        assert_eq!(img.get_pixel(5, 5)[3], 0);
        assert_eq!(img.get_pixel(85, 50)[3], 0);
    }

    #[test]
    fn test_fill_is_clipped_to_canvas() {
        let mut surface = RasterSurface::new(None);
        surface.resize(10, 10);
        surface.fill_rect(Rect::new(-5.0, -5.0, 30.0, 30.0), Color::rgb(0, 0, 255));
        assert!(surface.image().pixels().all(|p| *p == Rgba([0, 0, 255, 255])));
    }

    #[test]
    fn test_translucent_fill_blends() {
        let mut surface = RasterSurface::new(None);
        surface.resize(4, 4);
        surface.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::rgb(255, 0, 0));
        surface.fill_rect(Rect::new(0.0, 0.0, 4.0, 4.0), Color::rgb(0, 0, 255).with_alpha(0.5));

        let p = surface.image().get_pixel(1, 1);
        assert_eq!(p[3], 255);
        assert!(p[0] > 100 && p[0] < 160, "red channel {}", p[0]);
        assert!(p[2] > 100 && p[2] < 160, "blue channel {}", p[2]);
    }

    #[test]
    fn test_empty_rect_draws_nothing() {
        let mut surface = RasterSurface::new(None);
        surface.resize(10, 10);
        surface.fill_rect(Rect::new(2.0, 2.0, 0.0, 5.0), Color::BLACK);
        assert!(surface.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_resize_discards_previous_drawing() {
        let mut surface = RasterSurface::new(None);
        surface.resize(10, 10);
        surface.fill_rect(Rect::new(0.0, 0.0, 10.0, 10.0), Color::rgb(0, 0, 255));
        surface.resize(20, 5);
        assert_eq!(surface.image().dimensions(), (20, 5));
        assert!(surface.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_text_without_font_uses_estimate() {
        let mut surface = RasterSurface::new(None);
        surface.resize(200, 50);
        assert_eq!(
            surface.text_width("Calculus 90.0%", &Font::LABEL),
            approx_text_width("Calculus 90.0%", &Font::LABEL)
        );
        surface.draw_text("Calculus 90.0%", 10.0, 30.0, &TextStyle::LABEL);
        assert!(surface.image().pixels().all(|p| p[3] == 0));
    }

    #[test]
    fn test_text_drawn_with_outline() {
        let Some(font) = system_font() else {
            return;
        };
        let mut surface = RasterSurface::new(Some(font));
        surface.resize(240, 50);
        assert!(surface.text_width("Calculus 90.0%", &Font::LABEL) > 0.0);

        surface.draw_text("Calculus 90.0%", 10.0, 35.0, &TextStyle::LABEL);
        let img = surface.image();
        assert!(img.pixels().any(near_white), "fill glyphs");
        assert!(img.pixels().any(near_black), "outline");
        // ベースラインより十分下には何も描かれない
        assert!((45..50).all(|y| (0..240).all(|x| img.get_pixel(x, y)[3] == 0)));
    }

    #[test]
    fn test_vietnamese_label_has_glyphs() {
        let Some(font) = system_font() else {
            return;
        };
        let surface = RasterSurface::new(Some(font));
        let plain = surface.text_width("Sau rang", &Font::LABEL);
        let accented = surface.text_width("Sâu răng", &Font::LABEL);
        assert!(plain > 0.0);
        assert!((plain - accented).abs() < plain * 0.2);
    }

    #[test]
    fn test_load_rejects_non_font_data() {
        assert!(matches!(
            LabelFont::from_bytes(b"not a font".to_vec()),
            Err(DentalAiError::Export(_))
        ));
        assert!(matches!(
            LabelFont::load(Path::new("/nonexistent/font.ttf")),
            Err(DentalAiError::FileNotFound(_))
        ));
    }

    #[test]
    fn test_compose_scales_base_to_display_size() {
        let base = RgbaImage::from_pixel(400, 200, WHITE);
        let geometry = DisplayGeometry::new((400, 200), (200.0, 100.0)).unwrap();
        let (composed, summary) =
            compose(&base, &[calculus((100.0, 60.0, 300.0, 160.0))], &geometry, None);

        assert_eq!(composed.dimensions(), (200, 100));
        assert_eq!(summary.drawn, 1);
        // 縮尺後のボックス左辺 x=50 は黄色い線
        let edge = composed.get_pixel(50, 60);
        assert_eq!((edge[0], edge[1], edge[2]), (255, 255, 0));
        // ボックスから離れた場所は元画像のまま
        let far = composed.get_pixel(190, 95);
        assert!(far.0.iter().all(|c| *c >= 250));
    }

    #[test]
    fn test_compose_draws_label_text() {
        let Some(font) = system_font() else {
            return;
        };
        let base = RgbaImage::from_pixel(300, 200, Rgba([40, 40, 40, 255]));
        let geometry = DisplayGeometry::new((300, 200), (300.0, 200.0)).unwrap();
        let (with_text, _) = compose(&base, &[calculus((50.0, 80.0, 250.0, 180.0))], &geometry, Some(&font));
        let (without_text, _) = compose(&base, &[calculus((50.0, 80.0, 250.0, 180.0))], &geometry, None);

        // ラベル帯（ボックス上端の上）に白い文字がある
        let white_in_band = |img: &RgbaImage| {
            (40..75).any(|y| (45..250).any(|x| near_white(img.get_pixel(x, y))))
        };
        assert!(white_in_band(&with_text));
        assert!(!white_in_band(&without_text));
    }

    #[test]
    fn test_write_png() {
        let dir = tempdir().unwrap();
        let source = dir.path().join("teeth.png");
        let output = dir.path().join("overlay.png");
        RgbaImage::from_pixel(100, 80, WHITE).save(&source).unwrap();

        let geometry = DisplayGeometry::new((100, 80), (100.0, 80.0)).unwrap();
        let summary =
            write_png(&output, &source, &[calculus((10.0, 40.0, 60.0, 70.0))], &geometry, None).unwrap();

        assert_eq!(summary.drawn, 1);
        assert_eq!(image::image_dimensions(&output).unwrap(), (100, 80));
    }
}
