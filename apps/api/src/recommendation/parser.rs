//! AI-response parser. Scrapes a JSON object out of free model text and
//! validates it before anything reaches a caller.
//!
//! Extraction order: fenced code block first, then the first balanced
//! top-level `{...}` in the text. Validation is all-or-nothing: one malformed
//! item rejects the whole payload. Ids that do not resolve to a known employee
//! are not malformed and are dropped silently.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::employee::{Employee, EmployeeSummary};
use crate::recommendation::{Recommendation, RecommendationSource};

static FENCED_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z]*[ \t]*\r?\n?(.*?)```").expect("Invalid fenced block regex")
});

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("no JSON object found in model output")]
    NoJson,

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("payload failed validation: {0}")]
    Schema(String),

    #[error("no recommended employee matched a known candidate")]
    NoResolvedEmployees,
}

/// Returns the JSON object text embedded in `text`, if any.
pub fn extract_json_block(text: &str) -> Option<&str> {
    for caps in FENCED_BLOCK.captures_iter(text) {
        if let Some(body) = caps.get(1) {
            if let Some(obj) = first_object(body.as_str()) {
                return Some(obj);
            }
        }
    }
    first_object(text)
}

/// First balanced `{...}` substring. Braces inside JSON strings are ignored.
fn first_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in text[start..].char_indices() {
        if in_string {
            match ch {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&text[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Extracts and deserializes the embedded object as `T`.
pub fn parse_json_payload<T: DeserializeOwned>(text: &str) -> Result<T, ParseError> {
    let block = extract_json_block(text).ok_or(ParseError::NoJson)?;
    Ok(serde_json::from_str(block)?)
}

#[derive(Debug, Deserialize)]
struct RawPayload {
    recommendations: Vec<RawRecommendation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawRecommendation {
    #[serde(alias = "employee_id")]
    employee_id: String,
    score: f64,
    #[serde(default, alias = "matched_skills")]
    matched_skills: Vec<String>,
    #[serde(default)]
    reasons: Vec<String>,
}

fn validate(payload: &RawPayload) -> Result<(), ParseError> {
    for (i, item) in payload.recommendations.iter().enumerate() {
        if item.employee_id.trim().is_empty() {
            return Err(ParseError::Schema(format!(
                "recommendations[{i}].employeeId is empty"
            )));
        }
        if !item.score.is_finite() || !(0.0..=100.0).contains(&item.score) {
            return Err(ParseError::Schema(format!(
                "recommendations[{i}].score {} is outside 0..=100",
                item.score
            )));
        }
    }
    Ok(())
}

/// Parses a recommendation reply against the candidate list.
///
/// The result is sorted best-first (stable). Employees appear at most once;
/// the first mention wins.
pub fn parse_recommendations(
    text: &str,
    candidates: &[Employee],
) -> Result<Vec<Recommendation>, ParseError> {
    let payload: RawPayload = parse_json_payload(text)?;
    validate(&payload)?;

    let by_id: HashMap<Uuid, &Employee> = candidates.iter().map(|e| (e.id, e)).collect();
    let mut seen = HashSet::new();

    let mut recommendations: Vec<Recommendation> = payload
        .recommendations
        .into_iter()
        .filter_map(|item| {
            let id = Uuid::parse_str(item.employee_id.trim()).ok()?;
            let employee = by_id.get(&id)?;
            if !seen.insert(id) {
                return None;
            }
            Some(Recommendation {
                employee: EmployeeSummary::from(*employee),
                score: item.score.round() as u32,
                matched_skills: item.matched_skills,
                reasons: item.reasons,
                availability_status: employee.availability.label().to_string(),
                source: RecommendationSource::Ai,
            })
        })
        .collect();

    if recommendations.is_empty() {
        return Err(ParseError::NoResolvedEmployees);
    }

    recommendations.sort_by(|a, b| b.score.cmp(&a.score));
    Ok(recommendations)
}
