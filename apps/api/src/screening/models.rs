//! Candidate assessment records held in a session.
//!
//! Model output is trusted as-is apart from the lenient reading needed to
//! display and sort it: missing fields fall back to defaults and the match
//! score is read from whatever shape the model chose.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use serde_json::Value;

pub const UNKNOWN_CANDIDATE: &str = "Unknown";
pub const NO_RED_FLAGS: &str = "None";

/// First `X/10` in a narrative report. The guards on both ends keep `/100`
/// and dates such as `12/10/2023` from matching.
static TEN_POINT_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[^/\d.])(\d+(?:\.\d+)?)\s*/\s*10(?:[^/\d]|$)")
        .expect("ten-point score pattern is valid")
});

/// The match score exactly as the model returned it, plus a numeric reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchScore {
    pub raw: Value,
    /// `None` when the raw value could not be read as a number.
    pub value: Option<f64>,
}

impl MatchScore {
    pub fn from_raw(raw: Value) -> Self {
        let value = match &raw {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => parse_score_text(s),
            _ => None,
        }
        .filter(|v| v.is_finite());
        Self { raw, value }
    }

    /// Score shown to the user, always within 0–100. Unreadable scores show as 0.
    pub fn percent(&self) -> u8 {
        self.value
            .map(|v| v.clamp(0.0, 100.0).round() as u8)
            .unwrap_or(0)
    }

    /// Ordering key: the clamped score, with unreadable scores below every real one.
    pub fn sort_key(&self) -> f64 {
        self.value.map(|v| v.clamp(0.0, 100.0)).unwrap_or(-1.0)
    }
}

/// Reads `"85"`, `"85%"`, `"8.5/10"` or `"42 / 50"` as a 0–100 style number.
pub fn parse_score_text(text: &str) -> Option<f64> {
    let text = text.trim();
    if let Some((num, den)) = text.split_once('/') {
        let num: f64 = num.trim().parse().ok()?;
        let den: f64 = den.trim().parse().ok()?;
        if den <= 0.0 {
            return None;
        }
        return Some(num / den * 100.0);
    }
    text.trim_end_matches('%').trim().parse().ok()
}

/// One leaderboard-mode assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateAssessment {
    pub filename: String,
    pub candidate_name: String,
    pub match_score: MatchScore,
    pub years_experience: String,
    pub key_skills: Vec<String>,
    pub summary: String,
    pub red_flags: String,
    pub email_draft: String,
}

impl CandidateAssessment {
    /// Builds an assessment from the model's JSON object.
    /// Returns `None` when the response is not an object at all.
    pub fn from_model_value(filename: impl Into<String>, value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let field = |key: &str| object.get(key).unwrap_or(&Value::Null);

        Some(Self {
            filename: filename.into(),
            candidate_name: text_field(field("candidate_name"))
                .unwrap_or_else(|| UNKNOWN_CANDIDATE.to_string()),
            match_score: MatchScore::from_raw(field("match_score").clone()),
            years_experience: text_field(field("years_experience")).unwrap_or_default(),
            key_skills: list_field(field("key_skills")),
            summary: text_field(field("summary")).unwrap_or_default(),
            red_flags: text_field(field("red_flags")).unwrap_or_else(|| NO_RED_FLAGS.to_string()),
            email_draft: text_field(field("email_draft")).unwrap_or_default(),
        })
    }
}

fn text_field(value: &Value) -> Option<String> {
    let text = match value {
        Value::Null => return None,
        Value::String(s) => s.trim().to_string(),
        Value::Array(items) => items
            .iter()
            .filter_map(text_field)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn list_field(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(text_field).collect(),
        Value::String(s) => s
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(String::from)
            .collect(),
        _ => Vec::new(),
    }
}

/// A leaderboard-mode upload that produced no assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkippedFile {
    pub filename: String,
    pub reason: String,
}

/// One report-mode entry. Failures are kept so the user sees them inline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NarrativeReport {
    pub filename: String,
    #[serde(flatten)]
    pub outcome: ReportOutcome,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    Report {
        markdown: String,
        score_out_of_ten: Option<u8>,
    },
    ReadError {
        message: String,
    },
    ModelError {
        message: String,
    },
}

impl NarrativeReport {
    pub fn report(filename: impl Into<String>, markdown: String) -> Self {
        let score_out_of_ten = parse_ten_point_score(&markdown);
        Self {
            filename: filename.into(),
            outcome: ReportOutcome::Report {
                markdown,
                score_out_of_ten,
            },
        }
    }
}

/// First `X/10` in the report, clamped into 0–10.
pub fn parse_ten_point_score(markdown: &str) -> Option<u8> {
    let captures = TEN_POINT_SCORE.captures(markdown)?;
    let score: f64 = captures.get(1)?.as_str().parse().ok()?;
    Some(score.clamp(0.0, 10.0).round() as u8)
}
