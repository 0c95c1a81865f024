//! カメラプレビュー

use leptos::html;
use leptos::prelude::*;

#[component]
pub fn CameraView<C, X>(
    visible: Signal<bool>,
    video_ref: NodeRef<html::Video>,
    canvas_ref: NodeRef<html::Canvas>,
    on_capture: C,
    on_cancel: X,
) -> impl IntoView
where
    C: Fn(()) + 'static + Clone,
    X: Fn(()) + 'static + Clone,
{
    view! {
        <div class=move || if visible.get() { "camera-view" } else { "camera-view hidden" }>
            // 鏡像で表示（撮影時に反転を戻す）
            <video
                node_ref=video_ref
                autoplay=true
                playsinline=true
                muted=true
                style="transform: scaleX(-1);"
            />
            <canvas node_ref=canvas_ref class="hidden" />
            <div class="camera-actions">
                <button class="btn btn-primary" on:click=move |_| on_capture(())>
                    "📸 Chụp"
                </button>
                <button class="btn btn-secondary" on:click=move |_| on_cancel(())>
                    "Hủy"
                </button>
            </div>
        </div>
    }
}
