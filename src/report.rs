//! 解析結果の整形（コンソール表示・JSONレポート）

use crate::error::Result;
use chrono::Local;
use dental_ai_common::parser::split_emphasis;
use dental_ai_common::summary::{
    ClassificationSummary, DetectionSummary, DEFAULT_RECOMMENDATION, NO_FINDINGS_MESSAGE,
    UNPARSEABLE_MESSAGE,
};
use dental_ai_common::{
    assess_overview, classification_summary, detection_summary, parse_analysis_text,
    AnalysisResponse, OverviewStatus, ParsedAnalysis,
};
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// テキストが空、または構造を読み取れなかった
    pub unparseable: bool,
    pub status: Option<OverviewStatus>,
    pub analysis: ParsedAnalysis,
    pub detections: Option<DetectionSummary>,
    pub classification: Option<ClassificationSummary>,
}

impl AnalysisReport {
    pub fn build(response: &AnalysisResponse, source_image: Option<&str>) -> Self {
        let analysis = parse_analysis_text(&response.gemini_analysis);
        let unparseable = analysis.is_empty();
        let status = (!unparseable).then(|| assess_overview(&analysis.overview));

        Self {
            generated_at: Local::now().to_rfc3339(),
            source_image: source_image.map(str::to_string),
            model: response.model.clone(),
            unparseable,
            status,
            analysis,
            detections: response.detections().and_then(detection_summary),
            classification: response.cnn_prediction.as_ref().and_then(classification_summary),
        }
    }

    /// コンソールに表示
    pub fn print(&self) {
        println!("{}", self.render_text());
    }

    /// 表示用テキスト
    pub fn render_text(&self) -> String {
        let mut lines = Vec::new();

        if self.unparseable {
            lines.push(format!("⚠️  {}", UNPARSEABLE_MESSAGE));
        } else {
            if let Some(status) = self.status {
                lines.push(format!("{} {}", status.icon(), status.headline()));
            }
            if let Some(confidence) = self.analysis.confidence {
                lines.push(format!("Độ tin cậy: {}%", confidence));
            }
            lines.push(String::new());
            lines.push("Tổng quan:".to_string());
            lines.push(indent(&self.analysis.overview));

            lines.push(String::new());
            lines.push("Phát hiện:".to_string());
            if self.analysis.findings.is_empty() {
                lines.push(format!("  - {}", NO_FINDINGS_MESSAGE));
            } else {
                for finding in &self.analysis.findings {
                    lines.push(format!("  - {}", plain_text(finding)));
                }
            }

            lines.push(String::new());
            lines.push("Khuyến nghị:".to_string());
            if self.analysis.recommendations.is_empty() {
                lines.push(format!("  - {}", DEFAULT_RECOMMENDATION));
            } else {
                for rec in &self.analysis.recommendations {
                    lines.push(format!("  - {}", rec));
                }
            }
        }

        if let Some(detections) = &self.detections {
            lines.push(String::new());
            lines.push(format!("🦷 {}", detections.headline));
            for item in &detections.items {
                lines.push(format!("  {}", item.line()));
            }
        }

        if let Some(classification) = &self.classification {
            lines.push(String::new());
            lines.push(classification.line());
            if let Some(desc) = &classification.description {
                lines.push(indent(desc));
            }
        }

        lines.join("\n")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}

/// `<strong>` 区切りを外した平文
fn plain_text(line: &str) -> String {
    split_emphasis(line).iter().map(|s| s.text).collect()
}

fn indent(text: &str) -> String {
    text.lines()
        .map(|l| format!("  {}", l))
        .collect::<Vec<_>>()
        .join("\n")
}

/// パース結果のみのJSON（`parse --json`）
pub fn analysis_json(analysis: &ParsedAnalysis) -> Result<String> {
    Ok(serde_json::to_string_pretty(analysis)?)
}
