//! 検出オーバーレイのファイル出力

pub mod png;
pub mod svg;

use crate::cli::OverlayFormat;
use crate::error::{DentalAiError, Result};
use crate::image_input::ImageInput;
use dental_ai_common::{render_detections, Detection, DisplayGeometry, DrawList, RenderSummary};
use std::path::Path;

/// オーバーレイを出力
///
/// `displayed` は画像を表示しているサイズ。ボックスはこのサイズに合わせて縮尺される。
/// `font` はPNGのラベル文字に使う（SVGはビューア側のフォントで描かれる）。
pub fn write_overlay(
    format: OverlayFormat,
    output: &Path,
    source: &ImageInput,
    detections: &[Detection],
    displayed: (f64, f64),
    font: Option<&png::LabelFont>,
) -> Result<RenderSummary> {
    let geometry = DisplayGeometry::new(source.natural_size, displayed).ok_or_else(|| {
        DentalAiError::Export(format!(
            "表示サイズが不正です: {}x{}",
            displayed.0, displayed.1
        ))
    })?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    match format {
        OverlayFormat::Png => png::write_png(output, &source.path, detections, &geometry, font),
        OverlayFormat::Svg => {
            let mut list = DrawList::new();
            let summary = render_detections(&mut list, detections, &geometry);
            let href = source.path.to_string_lossy();
            std::fs::write(output, svg::to_svg(&list, Some(&href)))?;
            Ok(summary)
        }
    }
}
