//! 検出ボックスを重ねた画像

use crate::controller::{watch_resize, ControllerHandle};
use dental_ai_common::Detection;
use leptos::html;
use leptos::prelude::*;

#[component]
pub fn DetectionOverlay(
    controller: ControllerHandle,
    preview: ReadSignal<Option<String>>,
    detections: ReadSignal<Vec<Detection>>,
) -> impl IntoView {
    view! {
        <Show when=move || !detections.get().is_empty()>
            {move || {
                let image_ref: NodeRef<html::Img> = NodeRef::new();
                let canvas_ref: NodeRef<html::Canvas> = NodeRef::new();

                // 画像の読み込み後でないと表示サイズ・元サイズが取れない
                let on_load = move |_| {
                    let (Some(image), Some(canvas)) = (image_ref.get(), canvas_ref.get()) else {
                        return;
                    };
                    let detections = detections.get_untracked();
                    controller.update_value(|c| match c.present(detections, image, canvas) {
                        Ok(summary) => leptos::logging::log!(
                            "overlay: {} drawn, {} skipped",
                            summary.drawn,
                            summary.skipped
                        ),
                        Err(e) => leptos::logging::error!("overlay failed: {:?}", e),
                    });
                    // 画像の差し替えでon:loadが再度来てもリスナーは一つだけ
                    if !controller.with_value(|c| c.is_watching_resize()) {
                        watch_resize(controller);
                    }
                };

                view! {
                    <div id="annotated-image-section" class="annotated-section">
                        <h4>"Vùng phát hiện trên ảnh"</h4>
                        <div class="overlay-wrapper" style="position: relative; display: inline-block;">
                            <img
                                node_ref=image_ref
                                id="annotated-preview"
                                src=move || preview.get().unwrap_or_default()
                                style="display: block; max-width: 100%;"
                                on:load=on_load
                            />
                            <canvas
                                node_ref=canvas_ref
                                id="detection-canvas"
                                style="position: absolute; top: 0; left: 0; pointer-events: none;"
                            />
                        </div>
                    </div>
                }
            }}
        </Show>
    }
}
