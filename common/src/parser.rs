//! Geminiレスポンスパーサー
//!
//! 解析サーバーの `gemini_analysis` は次のような半構造化テキスト:
//!
//! ```text
//! **Độ tin cậy:** 85
//! **Tổng quan:**
//! - Tóm tắt ...
//! **Regions:** [[[120, 80], "Sâu răng số 6"]]
//! **Phát hiện:**
//! - **Sâu răng:** ...
//! **Khuyến nghị:**
//! - ...
//! **Lưu ý:** ...
//! ```
//!
//! 形式は緩い約束事でしかないため、ラベルの太字の有無・大文字小文字を問わず
//! 取れるものだけを取る。どんな入力でもエラーにはしない。

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;

use crate::types::{ParsedAnalysis, Region};

/// 強調マーカー（findingsのみ）
pub const EMPHASIS_OPEN: &str = "<strong>";
pub const EMPHASIS_CLOSE: &str = "</strong>";

/// Tổng quanが取れなかった場合の代替文言
pub const OVERVIEW_PLACEHOLDER: &str = "Không có thông tin tổng quan.";

/// findings中の見出し行（項目ではない）
const FINDINGS_HEADING: &str = "phát hiện chi tiết";

/// recommendationsの最小文字数（これ未満はノイズ扱い）
const MIN_RECOMMENDATION_CHARS: usize = 6;

// 区切りとみなすのは太字のラベル、またはコロンが続くラベルだけ。
// 項目本文中の「khuyến nghị」「lưu ý」などの語では止めない。
lazy_static! {
    static ref CONFIDENCE_RE: Regex =
        Regex::new(r"(?i)(?:\*\*)?Độ tin cậy:(?:\*\*)?\s*(\d+)").unwrap();
    static ref OVERVIEW_START_RE: Regex =
        Regex::new(r"(?i)(?:\*\*)?Tổng quan:(?:\*\*)?\s*").unwrap();
    static ref OVERVIEW_END_RE: Regex = Regex::new(
        r"(?i)\*\*(?:Regions|Phát hiện|Độ tin cậy|Khuyến nghị|Lưu ý)|(?:Regions|Phát hiện|Độ tin cậy|Khuyến nghị|Lưu ý)[ \t]*:"
    )
    .unwrap();
    static ref REGIONS_START_RE: Regex =
        Regex::new(r"(?i)(?:\*\*)?Regions:(?:\*\*)?\s*").unwrap();
    static ref FINDINGS_START_RE: Regex =
        Regex::new(r"(?i)(?:\*\*)?Phát hiện:(?:\*\*)?\s*").unwrap();
    static ref FINDINGS_END_RE: Regex =
        Regex::new(r"(?i)\*\*Khuyến nghị|Khuyến nghị[ \t]*:").unwrap();
    static ref RECOMMENDATIONS_START_RE: Regex =
        Regex::new(r"(?i)(?:\*\*)?Khuyến nghị:(?:\*\*)?\s*").unwrap();
    static ref RECOMMENDATIONS_END_RE: Regex =
        Regex::new(r"(?i)\*\*Lưu ý|Lưu ý[ \t]*:").unwrap();
    static ref BOLD_RE: Regex = Regex::new(r"\*\*(.*?)\*\*").unwrap();
    static ref LIST_MARKER_RE: Regex = Regex::new(r"^[-*•]\s+").unwrap();
}

/// Geminiテキストをパース
///
/// # Examples
/// ```
/// use dental_ai_common::parse_analysis_text;
///
/// let parsed = parse_analysis_text("**Độ tin cậy:** 85\n**Tổng quan:** Răng khỏe mạnh");
/// assert_eq!(parsed.confidence, Some(85));
/// assert_eq!(parsed.overview, "Răng khỏe mạnh");
/// ```
pub fn parse_analysis_text(text: &str) -> ParsedAnalysis {
    let mut result = ParsedAnalysis {
        confidence: extract_confidence(text),
        overview: extract_overview(text),
        findings: extract_findings(text),
        recommendations: extract_recommendations(text),
        regions: extract_regions(text),
    };

    // 構造が見つからない場合は先頭行を概要とする
    if result.overview.is_empty() && !text.trim().is_empty() {
        result.overview = text
            .lines()
            .next()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .unwrap_or(OVERVIEW_PLACEHOLDER)
            .to_string();
    }

    result
}

/// `**x**` → `x`
pub fn strip_bold(text: &str) -> String {
    BOLD_RE.replace_all(text, "$1").into_owned()
}

/// `**x**` → `<strong>x</strong>`
pub fn emphasize_bold(text: &str) -> String {
    BOLD_RE
        .replace_all(text, format!("{}$1{}", EMPHASIS_OPEN, EMPHASIS_CLOSE).as_str())
        .into_owned()
}

/// 強調付きテキストの断片
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment<'a> {
    pub text: &'a str,
    pub strong: bool,
}

/// findingsの行を強調/通常の断片に分割
///
/// HTMLを直接注入せずに描画するために使う。
pub fn split_emphasis(line: &str) -> Vec<Segment<'_>> {
    let mut segments = Vec::new();
    let mut rest = line;

    while let Some(open) = rest.find(EMPHASIS_OPEN) {
        let inner_start = open + EMPHASIS_OPEN.len();
        let Some(close_offset) = rest[inner_start..].find(EMPHASIS_CLOSE) else {
            break;
        };
        if open > 0 {
            segments.push(Segment { text: &rest[..open], strong: false });
        }
        let inner = &rest[inner_start..inner_start + close_offset];
        if !inner.is_empty() {
            segments.push(Segment { text: inner, strong: true });
        }
        rest = &rest[inner_start + close_offset + EMPHASIS_CLOSE.len()..];
    }

    if !rest.is_empty() {
        segments.push(Segment { text: rest, strong: false });
    }
    segments
}

fn extract_confidence(text: &str) -> Option<u8> {
    let caps = CONFIDENCE_RE.captures(text)?;
    let value: u32 = caps[1].parse().ok()?;
    Some(value.min(100) as u8)
}

fn extract_overview(text: &str) -> String {
    let Some(body) = section(text, &OVERVIEW_START_RE, &OVERVIEW_END_RE) else {
        return String::new();
    };

    body.lines()
        .map(|line| strip_bold(&strip_marker(line.trim())).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn extract_findings(text: &str) -> Vec<String> {
    let Some(body) = section(text, &FINDINGS_START_RE, &FINDINGS_END_RE) else {
        return Vec::new();
    };

    body.lines()
        .map(str::trim)
        .filter(|line| !is_findings_heading(line))
        .map(|line| emphasize_bold(&strip_marker(line)).trim().to_string())
        .filter(|line| !line.is_empty())
        .collect()
}

fn extract_recommendations(text: &str) -> Vec<String> {
    let Some(body) = section(text, &RECOMMENDATIONS_START_RE, &RECOMMENDATIONS_END_RE) else {
        return Vec::new();
    };

    body.lines()
        .map(|line| strip_bold(&strip_marker(line.trim())).trim().to_string())
        .filter(|line| line.chars().count() >= MIN_RECOMMENDATION_CHARS)
        .collect()
}

fn extract_regions(text: &str) -> Vec<Region> {
    let Some(m) = REGIONS_START_RE.find(text) else {
        return Vec::new();
    };
    let rest = &text[m.end()..];
    if !rest.starts_with('[') {
        return Vec::new();
    }

    // 配列の後ろに続くテキストは無視する
    let mut stream = serde_json::Deserializer::from_str(rest).into_iter::<Value>();
    let Some(Ok(Value::Array(items))) = stream.next() else {
        return Vec::new();
    };

    items.iter().filter_map(region_from_value).collect()
}

/// `[[x, y], "説明"]` 形式の要素を変換
fn region_from_value(value: &Value) -> Option<Region> {
    let item = value.as_array()?;
    let point = item.first()?.as_array()?;
    let x = point.first()?.as_f64()?;
    let y = point.get(1)?.as_f64()?;
    let description = item
        .get(1)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();
    Some(Region { x, y, description })
}

/// startラベルの直後からendラベル（なければ末尾）まで
fn section<'a>(text: &'a str, start: &Regex, end: &Regex) -> Option<&'a str> {
    let m = start.find(text)?;
    let rest = &text[m.end()..];
    let stop = end.find(rest).map(|e| e.start()).unwrap_or(rest.len());
    Some(&rest[..stop])
}

fn strip_marker(line: &str) -> String {
    LIST_MARKER_RE.replace(line, "").into_owned()
}

fn is_findings_heading(line: &str) -> bool {
    let plain = strip_bold(&strip_marker(line));
    plain.trim().trim_end_matches(':').trim().to_lowercase() == FINDINGS_HEADING
}
