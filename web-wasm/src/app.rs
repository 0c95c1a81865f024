//! メインアプリケーションコンポーネント

use crate::api::analyze_image;
use crate::components::{
    detection_overlay::DetectionOverlay,
    header::Header,
    result_panel::{ResultPanel, ResultView},
    upload_area::{InputTab, UploadArea},
};
use crate::controller::{ControllerHandle, PageController};
use dental_ai_common::api::DEFAULT_ENDPOINT;
use dental_ai_common::{Detection, InputRejection};
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::File;

/// 画面の進行状態
#[derive(Clone, Debug, PartialEq, Default)]
pub enum Phase {
    /// 画像未選択
    #[default]
    Idle,
    /// プレビュー表示中（解析前）
    Ready,
    Analyzing,
    Done,
    /// エラー文言付き（再解析可能）
    Failed(String),
}

impl Phase {
    pub fn can_analyze(&self) -> bool {
        matches!(self, Phase::Ready | Phase::Failed(_))
    }

    pub fn can_reset(&self) -> bool {
        !matches!(self, Phase::Idle | Phase::Analyzing)
    }
}

/// ブラウザのalert
pub fn alert(message: &str) {
    if let Some(window) = web_sys::window() {
        let _ = window.alert_with_message(message);
    }
}

/// メインアプリケーションコンポーネント
#[component]
pub fn App() -> impl IntoView {
    let controller: ControllerHandle = StoredValue::new_local(PageController::new());

    let (phase, set_phase) = signal(Phase::Idle);
    let (tab, set_tab) = signal(InputTab::File);
    let (preview, set_preview) = signal(None::<String>);
    let (result, set_result) = signal(None::<ResultView>);
    let (detections, set_detections) = signal(Vec::<Detection>::new());

    // 画像選択（ファイル・ドロップ・撮影共通）
    let on_file = move |file: File| {
        let mut selected = Err(InputRejection::NotAnImage);
        controller.update_value(|c| selected = c.select_file(file));
        match selected {
            Ok(url) => {
                set_preview.set(Some(url));
                set_result.set(None);
                set_detections.set(Vec::new());
                set_phase.set(Phase::Ready);
            }
            Err(rejection) => alert(&rejection.to_string()),
        }
    };

    // 解析開始
    let on_analyze = move |_| {
        let Some(file) = controller.with_value(|c| c.current_file()) else {
            return;
        };
        set_phase.set(Phase::Analyzing);
        set_detections.set(Vec::new());

        spawn_local(async move {
            match analyze_image(DEFAULT_ENDPOINT, &file).await {
                Ok(response) => {
                    set_result.set(Some(ResultView::from_response(&response)));
                    set_detections.set(
                        response
                            .detections()
                            .map(|set| set.detections.clone())
                            .unwrap_or_default(),
                    );
                    set_phase.set(Phase::Done);
                }
                Err(failure) => set_phase.set(Phase::Failed(failure.to_string())),
            }
        });
    };

    // リセット（カメラ停止・オーバーレイ消去・プレビュー解放）
    let on_reset = move |_| {
        controller.update_value(|c| c.reset());
        set_detections.set(Vec::new());
        set_result.set(None);
        set_preview.set(None);
        set_tab.set(InputTab::File);
        set_phase.set(Phase::Idle);
    };

    view! {
        <div class="container">
            <Header />

            <div class="diagnosis-grid">
                <div class="upload-column">
                    <Show
                        when=move || preview.get().is_none()
                        fallback=move || view! {
                            <img
                                id="previewImage"
                                class="preview-image"
                                src=move || preview.get().unwrap_or_default()
                            />
                        }
                    >
                        <UploadArea
                            controller=controller
                            tab=tab
                            set_tab=set_tab
                            on_file=on_file
                        />
                    </Show>

                    <div class="actions">
                        <Show when=move || phase.get().can_analyze()>
                            <button class="btn btn-primary" on:click=on_analyze>
                                "🔍 Phân tích"
                            </button>
                        </Show>
                        <Show when=move || phase.get().can_reset()>
                            <button class="btn btn-secondary" on:click=on_reset>
                                "🔄 Làm lại"
                            </button>
                        </Show>
                    </div>
                </div>

                <div class="result-column">
                    <ResultPanel phase=phase result=result />
                    <DetectionOverlay
                        controller=controller
                        preview=preview
                        detections=detections
                    />
                </div>
            </div>
        </div>
    }
}
