//! ページ状態のコントローラ
//!
//! 選択中のファイル・プレビューURL・カメラ・オーバーレイを一つにまとめ、
//! リセットで全て解放する。

use crate::camera::Camera;
use crate::canvas::CanvasSurface;
use dental_ai_common::{validate_upload, Detection, InputRejection, OverlaySession, RenderSummary};
use gloo::events::EventListener;
use leptos::prelude::*;
use wasm_bindgen::JsValue;
use web_sys::{File, HtmlCanvasElement, HtmlImageElement, MediaStream, HtmlVideoElement, Url};

/// コンポーネント間で共有するハンドル
pub type ControllerHandle = StoredValue<PageController, LocalStorage>;

/// オーバーレイの描画先（表示中の画像とその上のキャンバス）
struct OverlayTarget {
    image: HtmlImageElement,
    surface: CanvasSurface,
}

#[derive(Default)]
pub struct PageController {
    file: Option<File>,
    preview_url: Option<String>,
    camera: Camera,
    session: OverlaySession,
    target: Option<OverlayTarget>,
    resize_listener: Option<EventListener>,
}

impl PageController {
    pub fn new() -> Self {
        Self::default()
    }

    /// ファイルを検証して選択し、プレビュー用URLを返す
    pub fn select_file(&mut self, file: File) -> Result<String, InputRejection> {
        validate_upload(&file.type_(), file.size() as u64)?;

        self.release_preview();
        let url = Url::create_object_url_with_blob(&file)
            .map_err(|_| InputRejection::NotAnImage)?;
        self.preview_url = Some(url.clone());
        self.file = Some(file);
        Ok(url)
    }

    pub fn current_file(&self) -> Option<File> {
        self.file.clone()
    }

    pub fn start_camera(&mut self, stream: MediaStream, video: HtmlVideoElement) {
        self.camera.attach(stream, video);
    }

    pub fn stop_camera(&mut self) {
        self.camera.stop();
    }

    /// 検出結果を表示中の画像に重ねる
    pub fn present(
        &mut self,
        detections: Vec<Detection>,
        image: HtmlImageElement,
        canvas: HtmlCanvasElement,
    ) -> Result<RenderSummary, JsValue> {
        let surface = CanvasSurface::new(canvas)?;
        self.session
            .show(detections, (image.natural_width(), image.natural_height()));
        self.target = Some(OverlayTarget { image, surface });
        Ok(self.redraw())
    }

    /// 画像の現在の表示サイズで描き直す
    pub fn redraw(&mut self) -> RenderSummary {
        let Some(target) = self.target.as_mut() else {
            return RenderSummary::default();
        };
        let rect = target.image.get_bounding_client_rect();
        self.session
            .redraw(&mut target.surface, (rect.width(), rect.height()))
    }

    /// 全状態を破棄
    pub fn reset(&mut self) {
        self.resize_listener = None;
        match self.target.take() {
            Some(mut target) => self.session.reset(&mut target.surface),
            None => self.session = OverlaySession::new(),
        }
        self.camera.stop();
        self.release_preview();
        self.file = None;
    }

    /// リサイズ監視が有効か
    pub fn is_watching_resize(&self) -> bool {
        self.resize_listener.is_some()
    }

    fn release_preview(&mut self) {
        if let Some(url) = self.preview_url.take() {
            let _ = Url::revoke_object_url(&url);
        }
    }
}

/// ウィンドウのリサイズでオーバーレイを描き直す
///
/// 登録はリセットまで有効。再登録すると前のリスナーは外れる。
pub fn watch_resize(handle: ControllerHandle) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let listener = EventListener::new(&window, "resize", move |_| {
        handle.update_value(|controller| {
            controller.redraw();
        });
    });
    handle.update_value(|controller| controller.resize_listener = Some(listener));
}

#[cfg(all(target_arch = "wasm32", test))]
mod wasm_tests {
    use super::*;
    use dental_ai_common::BoundingBox;
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use wasm_bindgen_test::*;
    use web_sys::{CanvasRenderingContext2d, Document};

    wasm_bindgen_test_configure!(run_in_browser);

    /// 元サイズ 200x100 の画像
    const IMAGE_200X100: &str =
        "data:image/svg+xml,%3Csvg xmlns='http://www.w3.org/2000/svg' width='200' height='100'/%3E";

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    /// 指定サイズで表示された画像（読み込み完了まで待つ）
    async fn displayed_image(width: u32, height: u32) -> HtmlImageElement {
        let image: HtmlImageElement = document().create_element("img").unwrap().dyn_into().unwrap();
        set_display_size(&image, width, height);
        image.set_src(IMAGE_200X100);
        document().body().unwrap().append_child(&image).unwrap();
        JsFuture::from(image.decode()).await.unwrap();
        image
    }

    fn set_display_size(image: &HtmlImageElement, width: u32, height: u32) {
        image
            .set_attribute("style", &format!("display:block;width:{}px;height:{}px", width, height))
            .unwrap();
    }

    fn canvas() -> HtmlCanvasElement {
        document().create_element("canvas").unwrap().dyn_into().unwrap()
    }

    fn is_blank(canvas: &HtmlCanvasElement) -> bool {
        let ctx: CanvasRenderingContext2d =
            canvas.get_context("2d").unwrap().unwrap().dyn_into().unwrap();
        let data = ctx
            .get_image_data(0.0, 0.0, canvas.width() as f64, canvas.height() as f64)
            .unwrap()
            .data();
        data.0.chunks(4).all(|px| px[3] == 0)
    }

    fn caries() -> Vec<Detection> {
        vec![Detection::new("Caries", 0.8, BoundingBox::new(40.0, 30.0, 160.0, 90.0))]
    }

    #[wasm_bindgen_test]
    async fn test_present_sizes_canvas_to_displayed_image() {
        let image = displayed_image(200, 100).await;
        let canvas = canvas();
        let mut controller = PageController::new();

        let summary = controller.present(caries(), image, canvas.clone()).unwrap();
        assert_eq!(summary.drawn, 1);
        assert_eq!((canvas.width(), canvas.height()), (200, 100));
        assert!(!is_blank(&canvas));
    }

    #[wasm_bindgen_test]
    async fn test_redraw_follows_display_size() {
        let image = displayed_image(200, 100).await;
        let canvas = canvas();
        let mut controller = PageController::new();
        controller.present(caries(), image.clone(), canvas.clone()).unwrap();

        set_display_size(&image, 100, 50);
        let summary = controller.redraw();
        assert_eq!(summary.drawn, 1);
        assert_eq!((canvas.width(), canvas.height()), (100, 50));
    }

    #[wasm_bindgen_test]
    async fn test_reset_leaves_canvas_blank() {
        let image = displayed_image(200, 100).await;
        let canvas = canvas();
        let mut controller = PageController::new();
        controller.present(caries(), image, canvas.clone()).unwrap();
        assert!(!is_blank(&canvas));

        controller.reset();
        assert!(is_blank(&canvas));
        // 描画対象が外れたので再描画しても何も起きない
        assert_eq!(controller.redraw(), RenderSummary::default());
        assert!(controller.current_file().is_none());
    }

    #[wasm_bindgen_test]
    fn test_reset_drops_resize_listener() {
        let handle: ControllerHandle = StoredValue::new_local(PageController::new());
        assert!(!handle.with_value(|c| c.is_watching_resize()));

        watch_resize(handle);
        assert!(handle.with_value(|c| c.is_watching_resize()));

        handle.update_value(|c| c.reset());
        assert!(!handle.with_value(|c| c.is_watching_resize()));
    }
}
