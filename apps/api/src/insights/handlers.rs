use axum::{
    extract::{Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;

use crate::auth::AuthUser;
use crate::employees::repository::list_all_employees;
use crate::errors::AppError;
use crate::insights::analysis::compute_metrics;
use crate::insights::service::InsightReport;
use crate::projects::repository::{active_assignment_counts, list_all_projects, ProjectScope};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct InsightsQuery {
    #[serde(default)]
    pub refresh: bool,
}

/// GET /api/v1/insights
///
/// Portfolio insights for the calling manager. `refresh=true` skips the cache.
pub async fn handle_get_insights(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<InsightsQuery>,
) -> Result<Json<InsightReport>, AppError> {
    user.require_manager()?;

    let projects = list_all_projects(&state.db, ProjectScope::ManagedBy(user.user_id)).await?;
    let employees = list_all_employees(&state.db).await?;
    let counts = active_assignment_counts(&state.db).await?;
    let today = Utc::now().date_naive();

    let metrics = compute_metrics(&projects, &employees, &counts, today);
    let report = state
        .insights
        .insights(user.user_id, metrics, today, params.refresh)
        .await;
    Ok(Json(report))
}
