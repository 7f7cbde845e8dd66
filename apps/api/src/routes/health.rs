use axum::{extract::State, Json};
use serde_json::{json, Value};

use crate::state::AppState;

/// GET /health
/// Liveness plus whether AI features are backed by a configured model.
pub async fn health_handler(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service": "allocator-api",
        "ai_configured": state.config.gemini_api_key.is_some(),
        "ai_model": state.config.gemini_model,
    }))
}
