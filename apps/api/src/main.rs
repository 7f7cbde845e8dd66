mod auth;
mod cache;
mod config;
mod db;
mod employees;
mod errors;
mod insights;
mod llm_client;
mod models;
mod pagination;
mod projects;
mod recommendation;
mod reports;
mod routes;
mod state;

use anyhow::Result;
use chrono::Duration;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::auth::JwtKeys;
use crate::cache::TtlCache;
use crate::config::Config;
use crate::db::create_pool;
use crate::insights::service::InsightsService;
use crate::llm_client::{LlmClient, TextGenerator};
use crate::recommendation::service::RecommendationService;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Allocator API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;

    // Initialize LLM client
    let llm = LlmClient::new(config.gemini_api_key.clone(), config.gemini_model.clone())?;
    if llm.is_configured() {
        info!("LLM client initialized (model: {})", llm.model());
    } else {
        warn!("GEMINI_API_KEY not set; recommendations and insights will use the fallback rules");
    }
    let generator: Arc<dyn TextGenerator> = Arc::new(llm);

    // AI result caches (process-local)
    let ttl = Duration::hours(config.ai_cache_ttl_hours);
    info!("AI result cache TTL: {} hour(s)", config.ai_cache_ttl_hours);
    let recommendations = RecommendationService::new(generator.clone(), TtlCache::in_memory(ttl));
    let insights = InsightsService::new(generator, TtlCache::in_memory(ttl));

    // Build app state
    let state = AppState {
        db,
        jwt: JwtKeys::from_secret(&config.jwt_secret),
        config: config.clone(),
        recommendations,
        insights,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the frontend host is fixed

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
