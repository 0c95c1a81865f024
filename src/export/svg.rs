//! SVG出力（記録した描画命令をそのまま要素にする）

use dental_ai_common::overlay::{Color, DrawOp};
use dental_ai_common::DrawList;

/// DrawListをSVG文書に変換
///
/// `background` を渡すと表示サイズに引き伸ばした `<image>` を最背面に置く。
/// 1要素1行で出力する。
pub fn to_svg(list: &DrawList, background: Option<&str>) -> String {
    let (width, height) = list.size();
    let mut lines = vec![format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = width,
        h = height
    )];

    if let Some(href) = background {
        lines.push(format!(
            r#"  <image href="{}" x="0" y="0" width="{}" height="{}" preserveAspectRatio="none"/>"#,
            escape(href),
            width,
            height
        ));
    }

    lines.extend(list.ops().iter().map(element));
    lines.push("</svg>\n".to_string());
    lines.join("\n")
}

fn element(op: &DrawOp) -> String {
    match op {
        DrawOp::StrokeRect { rect, color, line_width } => format!(
            r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}"{} stroke-width="{}"/>"#,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            hex(color),
            opacity_attr("stroke-opacity", color),
            line_width
        ),
        DrawOp::FillRect { rect, color } => format!(
            r#"  <rect x="{}" y="{}" width="{}" height="{}" fill="{}"{}/>"#,
            rect.x,
            rect.y,
            rect.width,
            rect.height,
            hex(color),
            opacity_attr("fill-opacity", color)
        ),
        // 縁取りを先に描いて文字を読みやすくする
        DrawOp::Text { text, x, y, style } => format!(
            r#"  <text x="{}" y="{}" font-family="{}" font-size="{}" font-weight="{}" fill="{}" stroke="{}" stroke-width="{}" paint-order="stroke">{}</text>"#,
            x,
            y,
            style.font.family,
            style.font.size_px,
            if style.font.bold { "bold" } else { "normal" },
            hex(&style.fill),
            hex(&style.outline),
            style.outline_width,
            escape(text)
        ),
    }
}

fn hex(color: &Color) -> String {
    format!("#{:02X}{:02X}{:02X}", color.r, color.g, color.b)
}

fn opacity_attr(name: &str, color: &Color) -> String {
    if color.a == 0xFF {
        String::new()
    } else {
        format!(r#" {}="{:.2}""#, name, color.a as f64 / 255.0)
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
