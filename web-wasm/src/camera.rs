//! カメラ撮影（getUserMedia）

use futures::channel::oneshot;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{
    Blob, CanvasRenderingContext2d, File, FilePropertyBag, HtmlCanvasElement, HtmlVideoElement,
    MediaStream, MediaStreamConstraints, MediaStreamTrack,
};

/// 撮影画像のファイル名
pub const CAPTURE_FILE_NAME: &str = "capture.jpg";
pub const CAPTURE_MIME: &str = "image/jpeg";

/// 希望解像度（端末が満たせなければ近い値になる）
const IDEAL_WIDTH: u32 = 1280;
const IDEAL_HEIGHT: u32 = 720;

pub const UNSUPPORTED_MESSAGE: &str = "Trình duyệt của bạn không hỗ trợ truy cập camera.";
pub const PERMISSION_MESSAGE: &str = "Không thể truy cập camera. Vui lòng cấp quyền và thử lại.";

#[derive(Serialize)]
struct Ideal {
    ideal: u32,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VideoConstraints {
    facing_mode: &'static str,
    width: Ideal,
    height: Ideal,
}

fn video_constraints() -> VideoConstraints {
    VideoConstraints {
        facing_mode: "user",
        width: Ideal { ideal: IDEAL_WIDTH },
        height: Ideal { ideal: IDEAL_HEIGHT },
    }
}

/// インカメラのストリームを開く
///
/// エラーはそのまま表示できる文言。
pub async fn open_stream() -> Result<MediaStream, String> {
    let window = web_sys::window().ok_or_else(|| UNSUPPORTED_MESSAGE.to_string())?;
    let devices = window
        .navigator()
        .media_devices()
        .map_err(|_| UNSUPPORTED_MESSAGE.to_string())?;

    let video = video_constraints()
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|_| UNSUPPORTED_MESSAGE.to_string())?;
    let constraints = MediaStreamConstraints::new();
    constraints.set_video(&video);

    let promise = devices
        .get_user_media_with_constraints(&constraints)
        .map_err(|_| UNSUPPORTED_MESSAGE.to_string())?;
    let stream = JsFuture::from(promise).await.map_err(|e| {
        leptos::logging::error!("camera access failed: {:?}", e);
        PERMISSION_MESSAGE.to_string()
    })?;

    stream
        .dyn_into::<MediaStream>()
        .map_err(|_| PERMISSION_MESSAGE.to_string())
}

/// 動作中のカメラ
#[derive(Default)]
pub struct Camera {
    stream: Option<MediaStream>,
    video: Option<HtmlVideoElement>,
}

impl Camera {
    /// ストリームを映像要素に接続（既存のストリームは止める）
    pub fn attach(&mut self, stream: MediaStream, video: HtmlVideoElement) {
        self.stop();
        video.set_src_object(Some(&stream));
        if let Ok(promise) = video.play() {
            wasm_bindgen_futures::spawn_local(async move {
                let _ = JsFuture::from(promise).await;
            });
        }
        self.stream = Some(stream);
        self.video = Some(video);
    }

    /// 全トラックを止めて映像要素から外す
    pub fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            for track in stream.get_tracks().iter() {
                if let Ok(track) = track.dyn_into::<MediaStreamTrack>() {
                    track.stop();
                }
            }
        }
        if let Some(video) = self.video.take() {
            video.set_src_object(None);
        }
    }
}

impl Drop for Camera {
    fn drop(&mut self) {
        self.stop();
    }
}

/// 現在のフレームをJPEGファイルにする
///
/// プレビューは鏡像表示のため、左右反転して元の向きに戻してから描く。
pub async fn capture_frame(
    video: &HtmlVideoElement,
    canvas: &HtmlCanvasElement,
) -> Result<File, JsValue> {
    let (width, height) = (video.video_width(), video.video_height());
    if width == 0 || height == 0 {
        return Err(JsValue::from_str("camera is not ready"));
    }
    canvas.set_width(width);
    canvas.set_height(height);

    let ctx = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2D context unavailable"))?
        .dyn_into::<CanvasRenderingContext2d>()?;
    ctx.translate(width as f64, 0.0)?;
    ctx.scale(-1.0, 1.0)?;
    ctx.draw_image_with_html_video_element_and_dw_and_dh(
        video,
        0.0,
        0.0,
        width as f64,
        height as f64,
    )?;
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;

    let (tx, rx) = oneshot::channel::<Option<Blob>>();
    let mut tx = Some(tx);
    let callback = Closure::<dyn FnMut(Option<Blob>)>::new(move |blob: Option<Blob>| {
        if let Some(tx) = tx.take() {
            let _ = tx.send(blob);
        }
    });
    canvas.to_blob_with_type(callback.as_ref().unchecked_ref(), CAPTURE_MIME)?;

    let blob = rx
        .await
        .ok()
        .flatten()
        .ok_or_else(|| JsValue::from_str("failed to encode frame"))?;
    drop(callback);

    let parts = js_sys::Array::of1(&blob);
    let options = FilePropertyBag::new();
    options.set_type(CAPTURE_MIME);
    File::new_with_blob_sequence_and_options(&parts, CAPTURE_FILE_NAME, &options)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_constraints_shape() {
        let value = serde_json::to_value(video_constraints()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "facingMode": "user",
                "width": { "ideal": 1280 },
                "height": { "ideal": 720 }
            })
        );
    }

    #[test]
    fn test_capture_file_is_jpeg() {
        assert!(CAPTURE_FILE_NAME.ends_with(".jpg"));
        assert!(dental_ai_common::validate_upload(CAPTURE_MIME, 1).is_ok());
    }
}
