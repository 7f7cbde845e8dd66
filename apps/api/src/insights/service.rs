//! Insights pipeline: metrics → (cache | model → validate | rules).
//!
//! Metrics are always recomputed; only the model's narrative is cached.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::TtlCache;
use crate::insights::analysis::{fallback_insights, WorkforceMetrics};
use crate::insights::prompts::{build_insights_prompt, insights_system};
use crate::insights::{InsightPayload, InsightSource};
use crate::llm_client::TextGenerator;
use crate::recommendation::parser::{parse_json_payload, ParseError};

const MAX_INSIGHTS: usize = 6;

#[derive(Debug, Clone, Serialize)]
pub struct InsightReport {
    #[serde(flatten)]
    pub payload: InsightPayload,
    pub metrics: WorkforceMetrics,
    pub source: InsightSource,
    pub cached: bool,
    pub generated_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct InsightsService {
    generator: Arc<dyn TextGenerator>,
    cache: TtlCache<InsightPayload>,
}

/// Rejects replies that parsed but say nothing.
fn validate_payload(mut payload: InsightPayload) -> Result<InsightPayload, ParseError> {
    if payload.summary.trim().is_empty() {
        return Err(ParseError::Schema("summary is empty".to_string()));
    }
    for (i, insight) in payload.insights.iter().enumerate() {
        if insight.title.trim().is_empty() {
            return Err(ParseError::Schema(format!("insights[{i}].title is empty")));
        }
    }
    payload.insights.truncate(MAX_INSIGHTS);
    Ok(payload)
}

pub fn cache_key(manager_id: Uuid) -> String {
    format!("insights:{manager_id}")
}

impl InsightsService {
    pub fn new(generator: Arc<dyn TextGenerator>, cache: TtlCache<InsightPayload>) -> Self {
        Self { generator, cache }
    }

    pub async fn insights(
        &self,
        manager_id: Uuid,
        metrics: WorkforceMetrics,
        today: NaiveDate,
        refresh: bool,
    ) -> InsightReport {
        let key = cache_key(manager_id);
        let report = |payload, source, cached| InsightReport {
            payload,
            metrics: metrics.clone(),
            source,
            cached,
            generated_at: Utc::now(),
        };

        if refresh {
            self.cache.invalidate(&key);
        } else if let Some(payload) = self.cache.get(&key) {
            info!("Insights cache hit for manager {manager_id}");
            return report(payload, InsightSource::Ai, true);
        }

        let prompt = build_insights_prompt(&metrics, today);
        let parsed = match self.generator.generate(&prompt, &insights_system()).await {
            Ok(text) => parse_json_payload::<InsightPayload>(&text)
                .and_then(validate_payload)
                .map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match parsed {
            Ok(payload) => {
                info!(
                    "AI insights for manager {manager_id}: {} item(s)",
                    payload.insights.len()
                );
                self.cache.insert(key, payload.clone());
                report(payload, InsightSource::Ai, false)
            }
            Err(reason) => {
                warn!("AI insights unavailable for manager {manager_id}, using rules: {reason}");
                report(fallback_insights(&metrics), InsightSource::Fallback, false)
            }
        }
    }
}
