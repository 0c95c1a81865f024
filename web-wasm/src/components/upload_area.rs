//! アップロードエリアコンポーネント（ファイル選択 / カメラ撮影）

use crate::app::alert;
use crate::camera;
use crate::components::camera_view::CameraView;
use crate::controller::ControllerHandle;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use web_sys::{DragEvent, File, HtmlInputElement};

/// 入力方法のタブ
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum InputTab {
    #[default]
    File,
    Camera,
}

#[component]
pub fn UploadArea<F>(
    controller: ControllerHandle,
    tab: ReadSignal<InputTab>,
    set_tab: WriteSignal<InputTab>,
    on_file: F,
) -> impl IntoView
where
    F: Fn(File) + 'static + Clone,
{
    let (is_dragover, set_is_dragover) = signal(false);
    let file_input: NodeRef<html::Input> = NodeRef::new();
    let video_ref: NodeRef<html::Video> = NodeRef::new();
    let canvas_ref: NodeRef<html::Canvas> = NodeRef::new();

    let select_file_tab = move |_| {
        controller.update_value(|c| c.stop_camera());
        set_tab.set(InputTab::File);
    };

    let select_camera_tab = move |_| {
        set_tab.set(InputTab::Camera);
        spawn_local(async move {
            match camera::open_stream().await {
                Ok(stream) => match video_ref.get_untracked() {
                    Some(video) => {
                        controller.update_value(|c| c.start_camera(stream, video));
                    }
                    None => set_tab.set(InputTab::File),
                },
                Err(message) => {
                    alert(&message);
                    set_tab.set(InputTab::File);
                }
            }
        });
    };

    let on_drop = {
        let on_file = on_file.clone();
        move |ev: DragEvent| {
            ev.prevent_default();
            set_is_dragover.set(false);
            let file = ev
                .data_transfer()
                .and_then(|dt| dt.files())
                .and_then(|files| files.get(0));
            if let Some(file) = file {
                on_file(file);
            }
        }
    };

    let on_change = {
        let on_file = on_file.clone();
        move |ev| {
            let input: HtmlInputElement = event_target(&ev);
            if let Some(file) = input.files().and_then(|files| files.get(0)) {
                on_file(file);
            }
            // 同じファイルを選び直せるように
            input.set_value("");
        }
    };

    let open_picker = move |_| {
        if let Some(input) = file_input.get() {
            input.click();
        }
    };

    let on_capture = {
        let on_file = on_file.clone();
        move |_| {
            let (Some(video), Some(canvas)) = (video_ref.get(), canvas_ref.get()) else {
                return;
            };
            let on_file = on_file.clone();
            spawn_local(async move {
                match camera::capture_frame(&video, &canvas).await {
                    Ok(file) => {
                        controller.update_value(|c| c.stop_camera());
                        on_file(file);
                    }
                    Err(e) => leptos::logging::error!("capture failed: {:?}", e),
                }
            });
        }
    };

    let on_cancel = move |_| {
        controller.update_value(|c| c.stop_camera());
        set_tab.set(InputTab::File);
    };

    view! {
        <div class="upload-tabs">
            <button
                class=move || if tab.get() == InputTab::File { "tab active" } else { "tab" }
                on:click=select_file_tab
            >
                "📁 Chọn ảnh"
            </button>
            <button
                class=move || if tab.get() == InputTab::Camera { "tab active" } else { "tab" }
                on:click=select_camera_tab
            >
                "📷 Chụp ảnh"
            </button>
        </div>

        <div
            class=move || {
                let mut classes = vec!["upload-area"];
                if is_dragover.get() {
                    classes.push("dragover");
                }
                if tab.get() != InputTab::File {
                    classes.push("hidden");
                }
                classes.join(" ")
            }
            on:drop=on_drop
            on:dragover=move |ev: DragEvent| {
                ev.prevent_default();
                set_is_dragover.set(true);
            }
            on:dragleave=move |ev: DragEvent| {
                ev.prevent_default();
                set_is_dragover.set(false);
            }
            on:click=open_picker
        >
            <div class="upload-icon">"🦷"</div>
            <h3>"Kéo thả ảnh vào đây"</h3>
            <p class="text-muted">"hoặc nhấn để chọn ảnh (tối đa 5MB)"</p>
            <input
                type="file"
                accept="image/*"
                class="hidden"
                node_ref=file_input
                on:click=|ev| ev.stop_propagation()
                on:change=on_change
            />
        </div>

        <CameraView
            visible=Signal::derive(move || tab.get() == InputTab::Camera)
            video_ref=video_ref
            canvas_ref=canvas_ref
            on_capture=on_capture
            on_cancel=on_cancel
        />
    }
}
