use sqlx::PgPool;

use crate::auth::JwtKeys;
use crate::config::Config;
use crate::insights::service::InsightsService;
use crate::recommendation::service::RecommendationService;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Config,
    pub jwt: JwtKeys,
    /// Model-backed ranking with deterministic fallback and a per-user TTL cache.
    pub recommendations: RecommendationService,
    pub insights: InsightsService,
}
