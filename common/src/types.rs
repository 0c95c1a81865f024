//! 解析結果の型定義
//!
//! CLIとWeb(WASM)で共有される型:
//! - AnalysisResponse: 解析サーバーのJSONレスポンス
//! - DetectionSet / Detection: 検出結果（元画像のピクセル座標）
//! - ClassificationResult: CNNによる画像全体の分類
//! - ParsedAnalysis: Geminiテキストをパースした構造化結果

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::api::{ApiFailure, GENERIC_SERVICE_ERROR};
use crate::error::{Error, Result};

/// 解析サーバーのレスポンス
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisResponse {
    pub success: bool,
    pub gemini_analysis: String,
    pub cv_detections: Option<DetectionSet>,
    pub yolo_detections: Option<DetectionSet>,
    pub cnn_prediction: Option<ClassificationResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotated_image: Option<String>,
}

impl AnalysisResponse {
    /// JSON文字列からパース
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json.trim())?)
    }

    /// `success: false` のレスポンスをサービスエラーに変換
    pub fn into_success(self) -> std::result::Result<Self, ApiFailure> {
        if self.success {
            return Ok(self);
        }
        let message = self
            .error
            .filter(|e| !e.trim().is_empty())
            .unwrap_or_else(|| GENERIC_SERVICE_ERROR.to_string());
        Err(ApiFailure::Service(message))
    }

    /// 描画対象の検出結果
    ///
    /// CV検出器の結果を優先し、空ならYOLOの結果を使う。
    pub fn detections(&self) -> Option<&DetectionSet> {
        [self.cv_detections.as_ref(), self.yolo_detections.as_ref()]
            .into_iter()
            .flatten()
            .find(|set| !set.detections.is_empty())
    }
}

/// 検出結果の集合（上流サービスの順序を保持）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectionSet {
    pub num_detections: usize,
    pub detections: Vec<Detection>,
}

impl DetectionSet {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            num_detections: detections.len(),
            detections,
        }
    }

    /// 表示用の件数（num_detectionsが欠けている場合は実件数）
    pub fn count(&self) -> usize {
        if self.num_detections == 0 {
            self.detections.len()
        } else {
            self.num_detections
        }
    }
}

/// 1件の検出
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Detection {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<u32>,
    pub class_name: String,
    pub confidence: f64,
    pub bbox: BoundingBox,
}

impl Detection {
    pub fn new(class_name: impl Into<String>, confidence: f64, bbox: BoundingBox) -> Self {
        Self {
            class_id: None,
            class_name: class_name.into(),
            confidence,
            bbox,
        }
    }

    /// 描画可能か検証
    pub fn validate(&self) -> Result<()> {
        if !self.bbox.is_valid() {
            return Err(Error::InvalidDetection(format!(
                "{}: bbox ({}, {})-({}, {})",
                self.class_name, self.bbox.x1, self.bbox.y1, self.bbox.x2, self.bbox.y2
            )));
        }
        Ok(())
    }
}

/// 元画像ピクセル座標のバウンディングボックス
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    pub fn new(x1: f64, y1: f64, x2: f64, y2: f64) -> Self {
        Self { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> f64 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f64 {
        self.y2 - self.y1
    }

    /// 有限値かつ x1<x2, y1<y2
    pub fn is_valid(&self) -> bool {
        [self.x1, self.y1, self.x2, self.y2].iter().all(|v| v.is_finite())
            && self.x1 < self.x2
            && self.y1 < self.y2
    }
}

/// CNN分類結果
///
/// サーバーは `predicted_class` + `confidence` を返すが、
/// `predictions` 配列形式も受け付ける。
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassificationResult {
    pub success: bool,
    pub predicted_class: Option<String>,
    pub description: Option<String>,
    pub confidence: Option<f64>,
    pub all_probabilities: BTreeMap<String, f64>,
    pub predictions: Vec<ClassPrediction>,
}

/// 分類候補
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ClassPrediction {
    pub class_name: String,
    pub confidence: f64,
}

impl ClassificationResult {
    /// 最上位の分類
    pub fn top(&self) -> Option<ClassPrediction> {
        if let Some(first) = self.predictions.first() {
            return Some(first.clone());
        }
        let class_name = self.predicted_class.clone()?;
        let confidence = self
            .confidence
            .or_else(|| self.all_probabilities.get(&class_name).copied())
            .unwrap_or(0.0);
        Some(ClassPrediction { class_name, confidence })
    }
}

/// Geminiテキストのパース結果
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ParsedAnalysis {
    /// 0-100
    pub confidence: Option<u8>,
    pub overview: String,
    /// 強調は `<strong>..</strong>` で保持
    pub findings: Vec<String>,
    pub recommendations: Vec<String>,
    #[serde(default)]
    pub regions: Vec<Region>,
}

impl ParsedAnalysis {
    /// 何も抽出できなかった（「解析できません」を表示すべき）
    pub fn is_empty(&self) -> bool {
        self.confidence.is_none()
            && self.overview.is_empty()
            && self.findings.is_empty()
            && self.recommendations.is_empty()
    }
}

/// `Regions:` ブロックの注記点
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Region {
    pub x: f64,
    pub y: f64,
    pub description: String,
}
