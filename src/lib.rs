//! 歯科画像AI解析クライアント
//!
//! 解析サーバーへの画像送信、結果の表示、検出オーバーレイのPNG/SVG出力

pub mod cli;
pub mod client;
pub mod config;
pub mod error;
pub mod export;
pub mod image_input;
pub mod report;
