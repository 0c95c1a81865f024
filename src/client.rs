//! 解析サーバーへの画像送信（multipart POST）

use crate::error::Result;
use crate::image_input::ImageInput;
use dental_ai_common::api::{check_status, ApiFailure, IMAGE_FIELD};
use dental_ai_common::AnalysisResponse;
use reqwest::multipart::{Form, Part};
use std::time::Duration;

pub struct AnalyzeClient {
    http: reqwest::Client,
    endpoint: String,
}

impl AnalyzeClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiFailure::InvalidResponse(e.to_string()))?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// 画像を送信して解析結果を受け取る
    ///
    /// `success: false` のレスポンスは `ApiFailure::Service` として返す。
    pub async fn analyze(&self, input: &ImageInput) -> Result<AnalysisResponse> {
        let bytes = tokio::fs::read(&input.path).await?;
        self.analyze_bytes(bytes, &input.file_name, input.mime).await
    }

    pub async fn analyze_bytes(
        &self,
        bytes: Vec<u8>,
        file_name: &str,
        mime: &str,
    ) -> Result<AnalysisResponse> {
        let part = Part::bytes(bytes)
            .file_name(file_name.to_string())
            .mime_str(mime)
            .map_err(|e| ApiFailure::InvalidResponse(e.to_string()))?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .http
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        check_status(status.as_u16(), status.canonical_reason().unwrap_or(""))?;

        let body = response.text().await.map_err(classify_transport_error)?;
        let parsed = AnalysisResponse::from_json(&body)
            .map_err(|e| ApiFailure::InvalidResponse(e.to_string()))?;

        Ok(parsed.into_success()?)
    }
}

/// reqwestのエラーをユーザー向けの失敗種別に分類
fn classify_transport_error(err: reqwest::Error) -> ApiFailure {
    if err.is_timeout() {
        ApiFailure::Timeout
    } else if err.is_connect() {
        ApiFailure::Unreachable
    } else if let Some(status) = err.status() {
        ApiFailure::Server {
            status: status.as_u16(),
            reason: status.canonical_reason().unwrap_or("").to_string(),
        }
    } else {
        ApiFailure::InvalidResponse(err.to_string())
    }
}
