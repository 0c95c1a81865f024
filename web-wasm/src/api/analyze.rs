//! 画像をmultipartで送信し、解析結果を受け取る

use dental_ai_common::api::{check_status, ApiFailure, IMAGE_FIELD, REQUEST_TIMEOUT_SECS};
use dental_ai_common::AnalysisResponse;
use gloo::timers::callback::Timeout;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{AbortController, DomException, File, FormData, RequestInit, Response};

/// 解析を実行
///
/// REQUEST_TIMEOUT_SECS 経過で中断し `ApiFailure::Timeout` を返す。
/// `success: false` はサーバーのエラー文言で `ApiFailure::Service`。
pub async fn analyze_image(endpoint: &str, file: &File) -> Result<AnalysisResponse, ApiFailure> {
    let window = web_sys::window().ok_or(ApiFailure::Unreachable)?;

    let form = FormData::new().map_err(js_failure)?;
    form.append_with_blob_and_filename(IMAGE_FIELD, file, &file.name())
        .map_err(js_failure)?;

    let controller = AbortController::new().map_err(js_failure)?;
    let init = RequestInit::new();
    init.set_method("POST");
    init.set_body(&form.into());
    init.set_signal(Some(&controller.signal()));

    // dropで解除される
    let timeout = Timeout::new((REQUEST_TIMEOUT_SECS * 1000) as u32, {
        let controller = controller.clone();
        move || controller.abort()
    });

    let result = send(&window, endpoint, &init).await;
    drop(timeout);

    result.map_err(|err| classify_fetch_error(&window, err))?
}

async fn send(
    window: &web_sys::Window,
    endpoint: &str,
    init: &RequestInit,
) -> Result<Result<AnalysisResponse, ApiFailure>, JsValue> {
    let response: Response = JsFuture::from(window.fetch_with_str_and_init(endpoint, init))
        .await?
        .dyn_into()?;

    if let Err(failure) = check_status(response.status(), &response.status_text()) {
        return Ok(Err(failure));
    }

    let json = JsFuture::from(response.json()?).await?;
    let parsed: AnalysisResponse = match serde_wasm_bindgen::from_value(json) {
        Ok(parsed) => parsed,
        Err(e) => return Ok(Err(ApiFailure::InvalidResponse(e.to_string()))),
    };

    Ok(parsed.into_success())
}

/// fetchの例外を分類
///
/// 中断 → タイムアウト、オフライン → 回線断、それ以外は到達不能。
fn classify_fetch_error(window: &web_sys::Window, err: JsValue) -> ApiFailure {
    leptos::logging::error!("analyze request failed: {:?}", err);

    let aborted = err
        .dyn_ref::<DomException>()
        .map(|e| e.name() == "AbortError")
        .unwrap_or(false);
    if aborted {
        ApiFailure::Timeout
    } else if !window.navigator().on_line() {
        ApiFailure::Offline
    } else if err.is_instance_of::<js_sys::SyntaxError>() {
        ApiFailure::InvalidResponse("JSON".to_string())
    } else {
        ApiFailure::Unreachable
    }
}

fn js_failure(err: JsValue) -> ApiFailure {
    ApiFailure::InvalidResponse(
        err.as_string()
            .unwrap_or_else(|| format!("{:?}", err)),
    )
}
