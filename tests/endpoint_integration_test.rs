use dental_ai::client::AnalyzeClient;
use dental_ai::config::ENDPOINT_ENV;
use dental_ai::image_input::ImageInput;
use dental_ai::report::AnalysisReport;
use image::{Rgba, RgbaImage};
use std::time::Duration;
use tempfile::tempdir;

#[tokio::test]
async fn analyze_endpoint_integration() {
    let endpoint = match std::env::var(ENDPOINT_ENV) {
        Ok(url) if !url.trim().is_empty() => url,
        _ => {
            eprintln!("{} not set; skipping integration test", ENDPOINT_ENV);
            return;
        }
    };

    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("integration-test.jpg");
    image::DynamicImage::ImageRgba8(RgbaImage::from_pixel(320, 240, Rgba([240, 240, 235, 255])))
        .to_rgb8()
        .save(&path)
        .expect("failed to write test image");

    let input = ImageInput::load(&path).expect("failed to load test image");
    let client = AnalyzeClient::new(endpoint, Duration::from_secs(60)).expect("client");
    let response = client.analyze(&input).await.expect("request failed");

    assert!(response.success);
    let report = AnalysisReport::build(&response, Some(&input.file_name));
    assert!(!report.render_text().is_empty());
}
