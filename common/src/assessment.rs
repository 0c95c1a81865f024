//! 概要テキストからの状態判定
//!
//! Tổng quanの文言に含まれるキーワードで、結果カードのアイコンと見出しを決める。

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// 口腔状態の区分
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverviewStatus {
    /// 要警戒
    Alarming,
    /// 要ケア
    NeedsAttention,
    /// 軽微
    Fair,
    /// 良好
    Healthy,
}

impl OverviewStatus {
    pub fn icon(&self) -> &'static str {
        match self {
            OverviewStatus::Alarming => "🚨",
            OverviewStatus::NeedsAttention => "⚠️",
            OverviewStatus::Fair => "👍",
            OverviewStatus::Healthy => "✅",
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            OverviewStatus::Alarming => "Răng đang báo động",
            OverviewStatus::NeedsAttention => "Cần chú ý chăm sóc",
            OverviewStatus::Fair => "Răng khá ổn",
            OverviewStatus::Healthy => "Tình trạng răng miệng tốt",
        }
    }

    /// CSSクラス（色分け用）
    pub fn css_class(&self) -> &'static str {
        match self {
            OverviewStatus::Alarming => "status-danger",
            OverviewStatus::NeedsAttention => "status-warning",
            OverviewStatus::Fair => "status-primary",
            OverviewStatus::Healthy => "status-success",
        }
    }
}

lazy_static! {
    static ref HEALTHY_RE: Regex =
        Regex::new(r"(?i)không có|không phát hiện|không thấy|bình thường|khỏe mạnh|ổn định").unwrap();
    static ref ALARMING_RE: Regex =
        Regex::new(r"(?i)nghiêm trọng|nặng|nhiều vấn đề|cần điều trị ngay").unwrap();
    static ref ISSUES_RE: Regex =
        Regex::new(r"(?i)viêm|sâu|cao răng|lệch|thưa|chen chúc|bất thường|cần chú ý").unwrap();
    static ref MINOR_RE: Regex = Regex::new(r"(?i)nhẹ|ít mảng bám|hơi ố vàng").unwrap();
}

/// 概要テキストを判定
///
/// 優先順位: 警戒 > 要ケア（健康語なし） > 軽微（健康語なし） > 良好
pub fn assess_overview(overview: &str) -> OverviewStatus {
    let healthy = HEALTHY_RE.is_match(overview);

    if ALARMING_RE.is_match(overview) {
        OverviewStatus::Alarming
    } else if ISSUES_RE.is_match(overview) && !healthy {
        OverviewStatus::NeedsAttention
    } else if MINOR_RE.is_match(overview) && !healthy {
        OverviewStatus::Fair
    } else {
        OverviewStatus::Healthy
    }
}
