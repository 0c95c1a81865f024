//! 検出・分類結果の表示用サマリー

use serde::Serialize;

use crate::types::{ClassificationResult, DetectionSet};

/// パースできなかった場合の表示
pub const UNPARSEABLE_MESSAGE: &str = "Không thể phân tích ảnh. Vui lòng thử lại với ảnh khác.";

/// findingsが空の場合の表示
pub const NO_FINDINGS_MESSAGE: &str = "Không có phát hiện đặc biệt.";

/// recommendationsが空の場合の表示
pub const DEFAULT_RECOMMENDATION: &str = "Duy trì vệ sinh răng miệng tốt và khám nha sĩ định kỳ.";

/// 結果エリアの初期表示
pub const RESULT_PLACEHOLDER: &str = "Kết quả sẽ hiển thị tại đây";

/// 複合クラス名の短縮表示
const DISPLAY_ALIASES: &[(&str, &str)] = &[("Caries_Gingivitus_ToothDiscoloration_Ulcer", "Nhiều bệnh lý")];

/// 検出サマリー
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionSummary {
    pub count: usize,
    /// 例: "Phát hiện 2 vùng bệnh lý"
    pub headline: String,
    /// 例: "2 vùng phát hiện"
    pub badge: String,
    pub items: Vec<DetectionItem>,
}

/// 検出1件の表示行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetectionItem {
    /// "Vùng 1"
    pub label: String,
    pub display_name: String,
    /// "87.5%"
    pub confidence: String,
}

impl DetectionItem {
    /// "Vùng 1: Calculus (87.5%)"
    pub fn line(&self) -> String {
        format!("{}: {} ({})", self.label, self.display_name, self.confidence)
    }
}

/// CNN分類サマリー
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassificationSummary {
    pub class_name: String,
    pub description: Option<String>,
    pub confidence: String,
    /// 0-100（プログレスバー幅）
    pub percent: f64,
}

impl ClassificationSummary {
    /// "Phân loại CNN: Gingivitis (87.0%)"
    pub fn line(&self) -> String {
        format!("Phân loại CNN: {} ({})", self.class_name, self.confidence)
    }
}

/// 表示用クラス名
pub fn display_name(class_name: &str) -> &str {
    DISPLAY_ALIASES
        .iter()
        .find(|(name, _)| *name == class_name)
        .map(|(_, alias)| *alias)
        .unwrap_or(class_name)
}

/// 0-1の信頼度を "xx.x%" に
pub fn format_percent(confidence: f64) -> String {
    format!("{:.1}%", confidence * 100.0)
}

/// 検出サマリーを作成（0件ならNone）
pub fn detection_summary(set: &DetectionSet) -> Option<DetectionSummary> {
    let count = set.count();
    if count == 0 {
        return None;
    }

    let items = set
        .detections
        .iter()
        .enumerate()
        .map(|(idx, det)| DetectionItem {
            label: format!("Vùng {}", idx + 1),
            display_name: display_name(&det.class_name).to_string(),
            confidence: format_percent(det.confidence),
        })
        .collect();

    Some(DetectionSummary {
        count,
        headline: format!("Phát hiện {} vùng bệnh lý", count),
        badge: format!("{} vùng phát hiện", count),
        items,
    })
}

/// CNN分類サマリーを作成
pub fn classification_summary(result: &ClassificationResult) -> Option<ClassificationSummary> {
    let top = result.top()?;
    Some(ClassificationSummary {
        description: result.description.clone().filter(|d| !d.trim().is_empty()),
        confidence: format_percent(top.confidence),
        percent: (top.confidence * 100.0).clamp(0.0, 100.0),
        class_name: top.class_name,
    })
}
