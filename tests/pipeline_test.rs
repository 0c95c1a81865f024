//! レスポンスJSON → パース → オーバーレイ出力 の一連の流れ

use dental_ai::cli::OverlayFormat;
use dental_ai::export;
use dental_ai::image_input::ImageInput;
use dental_ai::report::AnalysisReport;
use dental_ai_common::{
    parse_analysis_text, render_detections, AnalysisResponse, DisplayGeometry, DrawList,
    OverlaySession, OverviewStatus,
};
use image::{Rgba, RgbaImage};
use serde_json::json;
use tempfile::tempdir;

fn sample_response_json() -> String {
    json!({
        "success": true,
        "gemini_analysis": "**Độ tin cậy:** 85\n**Tổng quan:** Răng miệng không có vấn đề gì\n**Phát hiện:**\n- **Nướu:** hồng, bình thường\n**Khuyến nghị:**\n- Đánh răng hai lần mỗi ngày\n- Dùng chỉ nha khoa sau bữa ăn\n**Lưu ý:** Chỉ mang tính tham khảo.",
        "cv_detections": {
            "num_detections": 1,
            "detections": [
                {
                    "class_id": 5,
                    "class_name": "Calculus",
                    "confidence": 0.82,
                    "bbox": { "x1": 40.0, "y1": 60.0, "x2": 140.0, "y2": 120.0 }
                }
            ]
        },
        "model": "gemini-2.0-flash"
    })
    .to_string()
}

#[test]
fn test_response_to_parsed_analysis() {
    let response = AnalysisResponse::from_json(&sample_response_json())
        .unwrap()
        .into_success()
        .unwrap();
    let parsed = parse_analysis_text(&response.gemini_analysis);

    assert_eq!(parsed.confidence, Some(85));
    assert_eq!(parsed.overview, "Răng miệng không có vấn đề gì");
    assert_eq!(parsed.findings, vec!["<strong>Nướu:</strong> hồng, bình thường"]);
    assert_eq!(parsed.recommendations.len(), 2);

    let report = AnalysisReport::build(&response, None);
    assert_eq!(report.status, Some(OverviewStatus::Healthy));
}

#[test]
fn test_response_to_single_box() {
    let response = AnalysisResponse::from_json(&sample_response_json()).unwrap();
    let set = response.detections().unwrap();

    // 400x300の画像を200x150で表示
    let geometry = DisplayGeometry::new((400, 300), (200.0, 150.0)).unwrap();
    let mut list = DrawList::new();
    let summary = render_detections(&mut list, &set.detections, &geometry);

    assert_eq!(summary.drawn, 1);
    assert_eq!(list.size(), (200, 150));
    let boxes = list.boxes();
    assert_eq!(boxes.len(), 1);
    assert_eq!((boxes[0].x, boxes[0].y, boxes[0].width, boxes[0].height), (20.0, 30.0, 50.0, 30.0));
    assert_eq!(list.labels(), vec!["Calculus 82.0%"]);
}

#[test]
fn test_session_follows_resize_and_reset() {
    let response = AnalysisResponse::from_json(&sample_response_json()).unwrap();
    let mut session = OverlaySession::new();
    session.show(response.detections().unwrap().detections.clone(), (400, 300));

    let mut list = DrawList::new();
    session.redraw(&mut list, (400.0, 300.0));
    assert_eq!(list.boxes()[0].width, 100.0);

    // 表示サイズ変更後はその時点のサイズで描き直す
    session.redraw(&mut list, (800.0, 600.0));
    assert_eq!(list.size(), (800, 600));
    assert_eq!(list.boxes().len(), 1);
    assert_eq!(list.boxes()[0].width, 200.0);

    session.reset(&mut list);
    assert!(list.is_blank());
    assert!(!session.is_active());
}

#[test]
fn test_failed_response_message() {
    let response = AnalysisResponse::from_json(r#"{"success": false, "error": "Không có file ảnh nào được gửi lên"}"#).unwrap();
    let err = response.into_success().unwrap_err();
    assert_eq!(err.to_string(), "Không có file ảnh nào được gửi lên");
}

#[test]
fn test_write_overlay_files() {
    let dir = tempdir().expect("Failed to create temp dir");
    let source = dir.path().join("teeth.png");
    RgbaImage::from_pixel(400, 300, Rgba([230, 230, 230, 255]))
        .save(&source)
        .unwrap();

    let response = AnalysisResponse::from_json(&sample_response_json()).unwrap();
    let detections = &response.detections().unwrap().detections;
    let input = ImageInput::load(&source).unwrap();
    let displayed = input.display_size(Some(200.0), None);
    assert_eq!(displayed, (200.0, 150.0));

    let png_path = dir.path().join("out").join("overlay.png");
    let summary = export::write_overlay(OverlayFormat::Png, &png_path, &input, detections, displayed, None).unwrap();
    assert_eq!(summary.drawn, 1);
    assert_eq!(image::image_dimensions(&png_path).unwrap(), (200, 150));

    let svg_path = dir.path().join("overlay.svg");
    export::write_overlay(OverlayFormat::Svg, &svg_path, &input, detections, displayed, None).unwrap();
    let svg = std::fs::read_to_string(&svg_path).unwrap();
    assert!(svg.contains("Calculus 82.0%"));
    assert!(svg.contains("teeth.png"));
}

#[test]
fn test_write_overlay_rejects_bad_display_size() {
    let dir = tempdir().expect("Failed to create temp dir");
    let source = dir.path().join("teeth.png");
    RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255])).save(&source).unwrap();
    let input = ImageInput::load(&source).unwrap();

    let result = export::write_overlay(
        OverlayFormat::Svg,
        &dir.path().join("x.svg"),
        &input,
        &[],
        (f64::NAN, 10.0),
        None,
    );
    assert!(result.is_err());
}

#[test]
fn test_write_overlay_rejects_oversized_display() {
    let dir = tempdir().expect("Failed to create temp dir");
    let source = dir.path().join("teeth.png");
    RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255])).save(&source).unwrap();
    let input = ImageInput::load(&source).unwrap();
    let output = dir.path().join("huge.png");

    let displayed = input.display_size(Some(1e12), None);
    let result = export::write_overlay(OverlayFormat::Png, &output, &input, &[], displayed, None);
    assert!(matches!(result, Err(dental_ai::error::DentalAiError::Export(_))));
    assert!(!output.exists());
}
