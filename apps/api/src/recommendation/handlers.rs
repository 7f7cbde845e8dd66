//! Axum route handlers for employee recommendations.

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::employees::repository::list_all_employees;
use crate::errors::AppError;
use crate::projects::handlers::load_visible_project;
use crate::recommendation::service::{draft_cache_key, RecommendationOutcome, RecommendationQuery};
use crate::state::AppState;

pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_LIMIT: usize = 50;

#[derive(Debug, Default, Deserialize)]
pub struct ProjectRecommendationRequest {
    /// Overrides the project's tags as the skill requirements.
    pub required_skills: Option<Vec<String>>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub refresh: bool,
}

#[derive(Debug, Deserialize)]
pub struct DraftRecommendationRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required_skills: Vec<String>,
    pub limit: Option<usize>,
    #[serde(default)]
    pub refresh: bool,
}

fn resolve_limit(limit: Option<usize>) -> Result<usize, AppError> {
    match limit {
        None => Ok(DEFAULT_LIMIT),
        Some(n) if (1..=MAX_LIMIT).contains(&n) => Ok(n),
        Some(_) => Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_LIMIT}"
        ))),
    }
}

fn project_cache_key(user_id: Uuid, project_id: Uuid, skills: &[String]) -> String {
    let mut normalized: Vec<String> = skills
        .iter()
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect();
    normalized.sort();
    normalized.dedup();
    format!("project:{user_id}:{project_id}:{}", normalized.join(","))
}

/// POST /api/v1/projects/:id/recommendations
///
/// Ranks every employee for an existing project. Always 200: when the model
/// is unavailable the deterministic scorer answers instead.
pub async fn handle_project_recommendations(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    body: Option<Json<ProjectRecommendationRequest>>,
) -> Result<Json<RecommendationOutcome>, AppError> {
    user.require_manager()?;
    let req = body.map(|Json(r)| r).unwrap_or_default();
    let limit = resolve_limit(req.limit)?;

    let project = load_visible_project(&state, &user, id).await?;
    let required_skills = req.required_skills.unwrap_or_else(|| project.tags.clone());

    let query = RecommendationQuery {
        title: project.title,
        description: project.description,
        required_skills,
    };
    let candidates = list_all_employees(&state.db).await?;
    let cache_key = project_cache_key(user.user_id, id, &query.required_skills);

    let outcome = state
        .recommendations
        .recommend(&cache_key, &query, &candidates, req.refresh)
        .await;
    Ok(Json(outcome.truncate(limit)))
}

/// POST /api/v1/recommendations
///
/// Same ranking for a project that has not been saved yet.
pub async fn handle_draft_recommendations(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<DraftRecommendationRequest>,
) -> Result<Json<RecommendationOutcome>, AppError> {
    user.require_manager()?;
    let limit = resolve_limit(req.limit)?;
    if req.title.trim().is_empty() && req.required_skills.iter().all(|s| s.trim().is_empty()) {
        return Err(AppError::Validation(
            "provide a title or at least one required skill".to_string(),
        ));
    }

    let query = RecommendationQuery {
        title: req.title.trim().to_string(),
        description: req.description,
        required_skills: req.required_skills,
    };
    let candidates = list_all_employees(&state.db).await?;
    let cache_key = draft_cache_key(user.user_id, &query);

    let outcome = state
        .recommendations
        .recommend(&cache_key, &query, &candidates, req.refresh)
        .await;
    Ok(Json(outcome.truncate(limit)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_limit_bounds() {
        assert_eq!(resolve_limit(None).unwrap(), DEFAULT_LIMIT);
        assert_eq!(resolve_limit(Some(MAX_LIMIT)).unwrap(), MAX_LIMIT);
        assert!(resolve_limit(Some(0)).is_err());
        assert!(resolve_limit(Some(MAX_LIMIT + 1)).is_err());
    }

    #[test]
    fn test_project_cache_key_normalizes_skills() {
        let user = Uuid::new_v4();
        let project = Uuid::new_v4();
        let a = project_cache_key(user, project, &["React".to_string(), "node".to_string()]);
        let b = project_cache_key(user, project, &[" NODE ".to_string(), "react".to_string()]);
        assert_eq!(a, b);
        assert_ne!(a, project_cache_key(user, Uuid::new_v4(), &["react".to_string()]));
    }
}
