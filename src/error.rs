use dental_ai_common::{ApiFailure, InputRejection};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DentalAiError {
    #[error("設定エラー: {0}")]
    Config(String),

    #[error("ファイルが見つかりません: {0}")]
    FileNotFound(String),

    #[error("画像読み込みエラー: {0}")]
    ImageLoad(String),

    #[error("{0}")]
    Rejected(#[from] InputRejection),

    #[error("{0}")]
    Request(#[from] ApiFailure),

    #[error("オーバーレイ出力エラー: {0}")]
    Export(String),

    #[error("JSON解析エラー: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IOエラー: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] dental_ai_common::Error),
}

pub type Result<T> = std::result::Result<T, DentalAiError>;
