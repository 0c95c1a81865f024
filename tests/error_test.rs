//! エラーケーステスト
//!
//! 各種エラー条件でのエラーハンドリングを検証

use dental_ai::error::DentalAiError;
use dental_ai::image_input::ImageInput;
use dental_ai_common::input::MAX_UPLOAD_BYTES;
use dental_ai_common::{ApiFailure, InputRejection};
use std::path::Path;
use tempfile::tempdir;

/// 存在しない画像を指定した場合
#[test]
fn test_load_nonexistent_image() {
    let result = ImageInput::load(Path::new("/nonexistent/path/12345.jpg"));
    assert!(matches!(result.unwrap_err(), DentalAiError::FileNotFound(_)));
}

/// ディレクトリを指定した場合
#[test]
fn test_load_directory() {
    let dir = tempdir().expect("Failed to create temp dir");
    let result = ImageInput::load(dir.path());
    assert!(matches!(result.unwrap_err(), DentalAiError::FileNotFound(_)));
}

/// 5MBを超える画像
#[test]
fn test_load_too_large_image() {
    let dir = tempdir().expect("Failed to create temp dir");
    let path = dir.path().join("huge.jpg");
    std::fs::write(&path, vec![0u8; (MAX_UPLOAD_BYTES + 1) as usize]).unwrap();

    let err = ImageInput::load(&path).unwrap_err();
    assert!(matches!(err, DentalAiError::Rejected(InputRejection::TooLarge(_))));
    assert!(err.to_string().contains("5MB"));
}

/// DentalAiErrorのDisplay実装確認
#[test]
fn test_error_display() {
    let errors = vec![
        DentalAiError::Config("テスト設定エラー".to_string()),
        DentalAiError::FileNotFound("test.jpg".to_string()),
        DentalAiError::ImageLoad("壊れた画像".to_string()),
        DentalAiError::Export("出力エラー".to_string()),
        DentalAiError::Rejected(InputRejection::NotAnImage),
        DentalAiError::Request(ApiFailure::Timeout),
    ];

    for err in errors {
        let display = format!("{}", err);
        assert!(!display.is_empty(), "エラーメッセージが空: {:?}", err);
    }
}

/// 通信エラーはユーザー向け文言がそのまま表示される
#[test]
fn test_request_error_message_passthrough() {
    let err: DentalAiError = ApiFailure::Server {
        status: 500,
        reason: "INTERNAL SERVER ERROR".to_string(),
    }
    .into();
    assert_eq!(err.to_string(), "Lỗi server: 500 INTERNAL SERVER ERROR");
}

/// エラーのDebug実装確認
#[test]
fn test_error_debug() {
    let err = DentalAiError::Config("テスト".to_string());
    let debug = format!("{:?}", err);

    assert!(debug.contains("Config"));
    assert!(debug.contains("テスト"));
}

/// IOエラーからの変換
#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let err: DentalAiError = io_err.into();

    assert!(matches!(err, DentalAiError::Io(_)));
    assert!(format!("{}", err).contains("IO"));
}

/// JSONエラーからの変換
#[test]
fn test_json_error_conversion() {
    let json_err = serde_json::from_str::<serde_json::Value>("{ invalid }").unwrap_err();
    let err: DentalAiError = json_err.into();

    assert!(matches!(err, DentalAiError::JsonParse(_)));
}

/// common::Errorからの変換（透過的エラー）
#[test]
fn test_common_error_conversion() {
    let common_err = dental_ai_common::Error::InvalidDetection("x1 >= x2".to_string());
    let err: DentalAiError = common_err.into();

    assert!(matches!(err, DentalAiError::Common(_)));
    assert!(err.to_string().contains("x1 >= x2"));
}
