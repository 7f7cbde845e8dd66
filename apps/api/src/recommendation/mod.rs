// Employee-to-project recommendations.
// Primary path asks the model through llm_client; every failure degrades to
// the deterministic scorer in scoring.rs.

pub mod handlers;
pub mod parser;
pub mod prompts;
pub mod scoring;
pub mod service;

use serde::{Deserialize, Serialize};

use crate::models::employee::EmployeeSummary;

/// Which path produced a recommendation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationSource {
    Ai,
    Fallback,
}

/// One ranked candidate. Derived on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub employee: EmployeeSummary,
    /// 0 – 100
    pub score: u32,
    pub matched_skills: Vec<String>,
    pub reasons: Vec<String>,
    pub availability_status: String,
    pub source: RecommendationSource,
}
