// Prompt constants and builders for portfolio insights.

use crate::insights::analysis::WorkforceMetrics;
use crate::llm_client::prompts::{fill_template, JSON_ONLY_SYSTEM};

/// Replace `{metrics}` and `{today}`.
pub const INSIGHTS_PROMPT_TEMPLATE: &str = r#"You are advising an engineering manager on their project portfolio.
Today is {today}.

METRICS (computed from live data, JSON)
{metrics}

Write a short assessment. Return a JSON object with this EXACT schema:
{
  "summary": "Two or three sentences on overall delivery health.",
  "insights": [
    {
      "severity": "info | warning | critical",
      "title": "Short headline",
      "detail": "One or two sentences with a concrete next step."
    }
  ]
}

Rules:
- Base every insight on the metrics above; do not invent projects or people.
- Put critical items first. At most 6 insights.
"#;

pub fn insights_system() -> String {
    format!("You are a pragmatic delivery lead. {JSON_ONLY_SYSTEM}")
}

pub fn build_insights_prompt(metrics: &WorkforceMetrics, today: chrono::NaiveDate) -> String {
    let metrics_json = serde_json::to_string_pretty(metrics).unwrap_or_else(|_| "{}".to_string());
    let today = today.to_string();
    fill_template(
        INSIGHTS_PROMPT_TEMPLATE,
        &[("today", today.as_str()), ("metrics", metrics_json.as_str())],
    )
}
