// Manager-facing portfolio insights.
// The model writes the narrative from computed metrics; analysis.rs writes a
// rule-based one whenever the model cannot.

pub mod analysis;
pub mod handlers;
pub mod prompts;
pub mod service;

use serde::{Deserialize, Serialize};

/// Which path wrote the narrative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightSource {
    Ai,
    Fallback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub severity: Severity,
    pub title: String,
    pub detail: String,
}

/// The `{summary, insights[]}` body, from either source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightPayload {
    pub summary: String,
    pub insights: Vec<Insight>,
}
