//! エラー型定義

use thiserror::Error;
use crate::api::ApiFailure;

/// 共通エラー型
#[derive(Error, Debug)]
pub enum Error {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid detection: {0}")]
    InvalidDetection(String),

    #[error(transparent)]
    Api(#[from] ApiFailure),
}

/// Result型エイリアス
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("invalid json").unwrap_err();
        let error = Error::Json(json_error);
        assert!(format!("{}", error).contains("JSON error"));
    }

    #[test]
    fn test_error_display_invalid_detection() {
        let error = Error::InvalidDetection("x1 >= x2".to_string());
        assert_eq!(format!("{}", error), "Invalid detection: x1 >= x2");
    }

    #[test]
    fn test_error_from_json() {
        let json_error = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error: Error = json_error.into();
        assert!(matches!(error, Error::Json(_)));
    }

    #[test]
    fn test_error_from_api_failure_is_transparent() {
        let error: Error = ApiFailure::Timeout.into();
        assert!(matches!(error, Error::Api(ApiFailure::Timeout)));
        assert_eq!(format!("{}", error), ApiFailure::Timeout.to_string());
    }
}
