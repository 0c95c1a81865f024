//! 解析サーバーAPI

pub mod analyze;

pub use analyze::analyze_image;
