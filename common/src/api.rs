//! 解析サーバーとの通信に関する共通定義
//!
//! 送信方法（reqwest / fetch）はCLIとWASMで異なるが、
//! エンドポイント・タイムアウト・エラーメッセージは共通。

use thiserror::Error;

/// デフォルトの解析エンドポイント
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5001/analyze";

/// multipartフォームの画像フィールド名
pub const IMAGE_FIELD: &str = "image";

/// リクエストのタイムアウト（秒）
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// `success: false` でエラー文言がない場合のメッセージ
pub const GENERIC_SERVICE_ERROR: &str = "Đã xảy ra lỗi không xác định.";

/// 解析リクエストの失敗
///
/// Displayはそのままユーザーに表示できる文言。自動リトライはしない。
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiFailure {
    #[error("Quá thời gian chờ phản hồi từ máy chủ. Vui lòng thử lại.")]
    Timeout,

    #[error("Không có kết nối mạng. Vui lòng kiểm tra kết nối internet của bạn.")]
    Offline,

    #[error("Không thể kết nối đến máy chủ. Vui lòng kiểm tra kết nối mạng của bạn.")]
    Unreachable,

    #[error("Lỗi server: {status} {reason}")]
    Server { status: u16, reason: String },

    #[error("{0}")]
    Service(String),

    #[error("Phản hồi không hợp lệ từ máy chủ: {0}")]
    InvalidResponse(String),
}

/// HTTPステータスを検査
///
/// ステータス0はブラウザがサーバーに到達できなかったことを示す。
pub fn check_status(status: u16, reason: &str) -> Result<(), ApiFailure> {
    match status {
        0 => Err(ApiFailure::Unreachable),
        200..=299 => Ok(()),
        _ => Err(ApiFailure::Server {
            status,
            reason: reason.trim().to_string(),
        }),
    }
}
