//! Recommendation pipeline.
//!
//! Flow: cache lookup → prompt → model call → parse/validate → (fallback on
//! any failure) → cache AI results → truncate.
//!
//! Nothing in here returns an error to the caller. A missing key, a network
//! failure, or an unusable reply all end in the deterministic scorer.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::TtlCache;
use crate::llm_client::TextGenerator;
use crate::models::employee::Employee;
use crate::recommendation::parser::parse_recommendations;
use crate::recommendation::prompts::{build_recommendation_prompt, recommendation_system};
use crate::recommendation::scoring::fallback_recommendations;
use crate::recommendation::{Recommendation, RecommendationSource};

/// What to recommend for: an existing project or a draft.
#[derive(Debug, Clone)]
pub struct RecommendationQuery {
    pub title: String,
    pub description: String,
    pub required_skills: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecommendationOutcome {
    pub recommendations: Vec<Recommendation>,
    pub source: RecommendationSource,
    pub cached: bool,
}

impl RecommendationOutcome {
    pub fn truncate(mut self, limit: usize) -> Self {
        self.recommendations.truncate(limit);
        self
    }
}

#[derive(Clone)]
pub struct RecommendationService {
    generator: Arc<dyn TextGenerator>,
    cache: TtlCache<Vec<Recommendation>>,
}

impl RecommendationService {
    pub fn new(generator: Arc<dyn TextGenerator>, cache: TtlCache<Vec<Recommendation>>) -> Self {
        Self { generator, cache }
    }

    /// Ranks `candidates` for `query`. `cache_key` scopes reuse to one
    /// caller and one request; `refresh` skips the lookup.
    pub async fn recommend(
        &self,
        cache_key: &str,
        query: &RecommendationQuery,
        candidates: &[Employee],
        refresh: bool,
    ) -> RecommendationOutcome {
        if candidates.is_empty() {
            return RecommendationOutcome {
                recommendations: vec![],
                source: RecommendationSource::Fallback,
                cached: false,
            };
        }

        if refresh {
            self.cache.invalidate(cache_key);
        } else if let Some(recommendations) = self.cache.get(cache_key) {
            info!("Recommendation cache hit for '{cache_key}'");
            return RecommendationOutcome {
                recommendations,
                source: RecommendationSource::Ai,
                cached: true,
            };
        }

        let prompt = build_recommendation_prompt(
            &query.title,
            &query.description,
            &query.required_skills,
            candidates,
        );

        let parsed = match self.generator.generate(&prompt, &recommendation_system()).await {
            Ok(text) => parse_recommendations(&text, candidates).map_err(|e| e.to_string()),
            Err(e) => Err(e.to_string()),
        };

        match parsed {
            Ok(recommendations) => {
                info!(
                    "AI recommendations for '{}': {} candidates ranked",
                    query.title,
                    recommendations.len()
                );
                self.cache.insert(cache_key, recommendations.clone());
                debug!("Recommendation cache holds {} entries", self.cache.len());
                RecommendationOutcome {
                    recommendations,
                    source: RecommendationSource::Ai,
                    cached: false,
                }
            }
            Err(reason) => {
                warn!(
                    "AI recommendations unavailable for '{}', using fallback scorer: {reason}",
                    query.title
                );
                RecommendationOutcome {
                    recommendations: fallback_recommendations(&query.required_skills, candidates),
                    source: RecommendationSource::Fallback,
                    cached: false,
                }
            }
        }
    }
}

/// Cache key for a draft: normalized skills and title, per user.
pub fn draft_cache_key(user_id: uuid::Uuid, query: &RecommendationQuery) -> String {
    let mut skills: Vec<String> = query
        .required_skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    skills.sort();
    skills.dedup();
    format!(
        "draft:{user_id}:{}:{}",
        query.title.trim().to_lowercase(),
        skills.join(",")
    )
}
