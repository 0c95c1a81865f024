//! 解析結果パネル

use crate::app::Phase;
use dental_ai_common::summary::{
    ClassificationSummary, DetectionSummary, DEFAULT_RECOMMENDATION, NO_FINDINGS_MESSAGE,
    RESULT_PLACEHOLDER, UNPARSEABLE_MESSAGE,
};
use dental_ai_common::{
    assess_overview, classification_summary, detection_summary, parse_analysis_text,
    split_emphasis, AnalysisResponse, OverviewStatus, ParsedAnalysis,
};
use leptos::prelude::*;

/// 表示用に整えた解析結果
#[derive(Clone, Debug, PartialEq)]
pub struct ResultView {
    pub analysis: ParsedAnalysis,
    pub unparseable: bool,
    pub status: Option<OverviewStatus>,
    pub detections: Option<DetectionSummary>,
    pub classification: Option<ClassificationSummary>,
}

impl ResultView {
    pub fn from_response(response: &AnalysisResponse) -> Self {
        let analysis = parse_analysis_text(&response.gemini_analysis);
        let unparseable = analysis.is_empty();
        Self {
            status: (!unparseable).then(|| assess_overview(&analysis.overview)),
            unparseable,
            analysis,
            detections: response.detections().and_then(detection_summary),
            classification: response.cnn_prediction.as_ref().and_then(classification_summary),
        }
    }
}

#[component]
pub fn ResultPanel(phase: ReadSignal<Phase>, result: ReadSignal<Option<ResultView>>) -> impl IntoView {
    move || match phase.get() {
        Phase::Idle | Phase::Ready => view! {
            <div class="placeholder">
                <div class="placeholder-icon">"📄"</div>
                <p>{RESULT_PLACEHOLDER}</p>
            </div>
        }
        .into_any(),
        Phase::Analyzing => view! {
            <div class="loading">
                <div class="spinner"></div>
                <p>"Đang phân tích..."</p>
            </div>
        }
        .into_any(),
        Phase::Failed(message) => view! {
            <div class="placeholder error">
                <div class="placeholder-icon">"⚠️"</div>
                <h4>"Lỗi Phân Tích"</h4>
                <p class="text-muted">{message}</p>
            </div>
        }
        .into_any(),
        Phase::Done => match result.get() {
            Some(data) => result_card(data),
            None => view! { <p>{UNPARSEABLE_MESSAGE}</p> }.into_any(),
        },
    }
}

fn result_card(data: ResultView) -> AnyView {
    let ResultView { analysis, unparseable, status, detections, classification } = data;

    let body = if unparseable {
        view! { <p id="diagnosis-text">{UNPARSEABLE_MESSAGE}</p> }.into_any()
    } else {
        let status = status.unwrap_or(OverviewStatus::Healthy);
        view! {
            <div class=format!("overview-status {}", status.css_class())>
                <span id="overview-status-icon">{status.icon()}</span>
                <span id="overview-text">{status.headline()}</span>
            </div>
            {analysis.confidence.map(|confidence| view! {
                <div id="confidence-section" class="confidence">
                    <span>"Độ tin cậy: "</span>
                    <span id="confidence-percent">{format!("{}%", confidence)}</span>
                    <div class="progress-bar">
                        <div class="progress-fill" style=format!("width: {}%", confidence)></div>
                    </div>
                </div>
            })}
            <p id="diagnosis-text" class="overview">{analysis.overview.clone()}</p>

            <h4>"Phát hiện"</h4>
            <ul id="findings-list">{findings_items(&analysis.findings)}</ul>

            <h4>"Khuyến nghị"</h4>
            <ul id="recommendations">{recommendation_items(&analysis.recommendations)}</ul>
        }
        .into_any()
    };

    view! {
        <div class="result">
            {body}
            {detections.map(detection_card)}
            {classification.map(classification_card)}
        </div>
    }
    .into_any()
}

fn findings_items(findings: &[String]) -> impl IntoView {
    if findings.is_empty() {
        return view! { <li>{NO_FINDINGS_MESSAGE}</li> }.into_any();
    }
    findings
        .iter()
        .map(|finding| {
            // 強調部分だけ<strong>にして、文字列はテキストとして挿入する
            let segments = split_emphasis(finding)
                .into_iter()
                .map(|seg| {
                    let text = seg.text.to_string();
                    if seg.strong {
                        view! { <strong>{text}</strong> }.into_any()
                    } else {
                        view! { <span>{text}</span> }.into_any()
                    }
                })
                .collect_view();
            view! { <li>{segments}</li> }
        })
        .collect_view()
        .into_any()
}

fn recommendation_items(recommendations: &[String]) -> impl IntoView {
    let items: Vec<String> = if recommendations.is_empty() {
        vec![DEFAULT_RECOMMENDATION.to_string()]
    } else {
        recommendations.to_vec()
    };
    items
        .into_iter()
        .map(|rec| view! { <li class="recommendation-item"><span>{rec}</span></li> })
        .collect_view()
}

fn detection_card(summary: DetectionSummary) -> impl IntoView {
    view! {
        <div id="yolo-summary" class="model-summary">
            <div class="summary-header">
                <h4>{summary.headline}</h4>
                <span class="badge">{summary.badge}</span>
            </div>
            <ul>
                {summary
                    .items
                    .into_iter()
                    .map(|item| view! { <li>{item.line()}</li> })
                    .collect_view()}
            </ul>
        </div>
    }
}

fn classification_card(summary: ClassificationSummary) -> impl IntoView {
    view! {
        <div id="cnn-summary" class="model-summary">
            <h4>{summary.line()}</h4>
            {summary.description.map(|desc| view! { <p class="text-muted">{desc}</p> })}
            <div class="progress-bar">
                <div class="progress-fill" style=format!("width: {:.1}%", summary.percent)></div>
            </div>
        </div>
    }
}
