//! Dental AI Common Library
//!
//! CLIとWeb(WASM)で共有される型・パーサー・オーバーレイ描画

pub mod types;
pub mod error;
pub mod api;
pub mod input;
pub mod parser;
pub mod palette;
pub mod overlay;
pub mod assessment;
pub mod summary;
pub mod session;

pub use types::{
    AnalysisResponse, BoundingBox, ClassPrediction, ClassificationResult, Detection,
    DetectionSet, ParsedAnalysis, Region,
};
pub use error::{Error, Result};
pub use api::ApiFailure;
pub use input::{validate_upload, InputRejection};
pub use parser::{parse_analysis_text, split_emphasis, Segment};
pub use overlay::{
    clear_overlay, render_detections, Color, DisplayGeometry, DrawList, Font, Rect,
    RenderSummary, Surface,
};
pub use assessment::{assess_overview, OverviewStatus};
pub use summary::{classification_summary, detection_summary};
pub use session::OverlaySession;
