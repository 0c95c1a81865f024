//! ヘッダーコンポーネント

use leptos::prelude::*;

#[component]
pub fn Header() -> impl IntoView {
    view! {
        <header class="header">
            <h1>"🦷 Chẩn đoán răng miệng bằng AI"</h1>
            <p class="text-muted">"Tải ảnh răng lên hoặc chụp trực tiếp để nhận phân tích"</p>
        </header>
    }
}
