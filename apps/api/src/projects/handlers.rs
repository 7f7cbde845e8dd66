//! Axum route handlers for the Projects API.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::employees::repository::missing_employee_ids;
use crate::errors::AppError;
use crate::models::deserialize_nullable;
use crate::models::project::{Priority, Project, ProjectStatus};
use crate::models::user::Role;
use crate::pagination::{validate_pagination, Page};
use crate::projects::repository::{self, NewProject, ProjectScope, ProjectUpdate};
use crate::projects::status::{allowed_next, check_transition, TransitionError};
use crate::state::AppState;

const MAX_TITLE_LEN: usize = 200;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateProjectRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<ProjectStatus>,
    pub priority: Option<Priority>,
    pub progress: Option<u8>,
    pub deadline: Option<NaiveDate>,
    pub budget: Option<f64>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub assigned_employee_ids: Vec<Uuid>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateProjectRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub progress: Option<u8>,
    /// `null` clears the deadline.
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub deadline: Option<Option<NaiveDate>>,
    /// `null` clears the budget.
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub budget: Option<Option<f64>>,
    pub tags: Option<Vec<String>>,
}

impl UpdateProjectRequest {
    fn touches_more_than_progress(&self) -> bool {
        self.title.is_some()
            || self.description.is_some()
            || self.priority.is_some()
            || self.deadline.is_some()
            || self.budget.is_some()
            || self.tags.is_some()
    }
}

#[derive(Debug, Deserialize)]
pub struct AssignmentsRequest {
    pub employee_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChangeRequest {
    pub status: ProjectStatus,
}

#[derive(Debug, Deserialize)]
pub struct ListProjectsQuery {
    pub status: Option<ProjectStatus>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct ProjectDetailResponse {
    pub project: Project,
    /// Status changes the caller may perform right now.
    pub allowed_transitions: Vec<ProjectStatus>,
}

#[derive(Debug, Serialize)]
pub struct StatusChangeResponse {
    pub project: Project,
    pub action: String,
    pub allowed_transitions: Vec<ProjectStatus>,
}

// ────────────────────────────────────────────────────────────────────────────
// Shared checks
// ────────────────────────────────────────────────────────────────────────────

/// Loads a project the caller may see: its manager or an assigned employee.
pub async fn load_visible_project(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> Result<Project, AppError> {
    let project = repository::get_project(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))?;

    let visible = match user.role {
        Role::Manager => project.manager_id == user.user_id,
        Role::Employee => project.is_assigned(user.user_id),
    };
    if !visible {
        return Err(AppError::Forbidden(
            "You do not have access to this project".to_string(),
        ));
    }
    Ok(project)
}

async fn load_owned_project(
    state: &AppState,
    user: &AuthUser,
    id: Uuid,
) -> Result<Project, AppError> {
    user.require_manager()?;
    load_visible_project(state, user, id).await
}

fn validate_title(title: &str) -> Result<String, AppError> {
    let title = title.trim();
    if title.is_empty() {
        return Err(AppError::Validation("title cannot be empty".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(AppError::Validation(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(title.to_string())
}

fn validate_progress(progress: u8) -> Result<u8, AppError> {
    if progress > 100 {
        return Err(AppError::Validation(
            "progress must be between 0 and 100".to_string(),
        ));
    }
    Ok(progress)
}

fn validate_budget(budget: f64) -> Result<f64, AppError> {
    if !budget.is_finite() || budget < 0.0 {
        return Err(AppError::Validation(
            "budget must be a non-negative number".to_string(),
        ));
    }
    Ok(budget)
}

/// Trims, drops blanks and case-insensitive duplicates, keeps first spelling.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .collect()
}

fn dedup_ids(ids: Vec<Uuid>) -> Vec<Uuid> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

async fn ensure_employees_exist(state: &AppState, ids: &[Uuid]) -> Result<(), AppError> {
    if ids.is_empty() {
        return Ok(());
    }
    let missing = missing_employee_ids(&state.db, ids).await?;
    if !missing.is_empty() {
        let list: Vec<String> = missing.iter().map(Uuid::to_string).collect();
        return Err(AppError::Validation(format!(
            "unknown employee id(s): {}",
            list.join(", ")
        )));
    }
    Ok(())
}

/// A role violation is forbidden; every other rejected change conflicts with
/// the project's current status.
fn transition_error_response(err: TransitionError) -> AppError {
    match err {
        TransitionError::RoleNotPermitted { .. } => AppError::Forbidden(err.to_string()),
        TransitionError::Unchanged(_)
        | TransitionError::Terminal
        | TransitionError::Illegal { .. } => AppError::Conflict(err.to_string()),
    }
}

async fn reload(state: &AppState, id: Uuid) -> Result<Project, AppError> {
    repository::get_project(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Project {id} not found")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/projects
pub async fn handle_create_project(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<CreateProjectRequest>,
) -> Result<(StatusCode, Json<ProjectDetailResponse>), AppError> {
    user.require_manager()?;

    let title = validate_title(&req.title)?;
    let status = req.status.unwrap_or_default();
    if status == ProjectStatus::Completed {
        return Err(AppError::Validation(
            "a project cannot be created as completed".to_string(),
        ));
    }
    let progress = validate_progress(req.progress.unwrap_or(0))?;
    let budget = req.budget.map(validate_budget).transpose()?;
    let assigned_employee_ids = dedup_ids(req.assigned_employee_ids);
    ensure_employees_exist(&state, &assigned_employee_ids).await?;

    let id = repository::create_project(
        &state.db,
        NewProject {
            manager_id: user.user_id,
            title,
            description: req.description.trim().to_string(),
            status,
            priority: req.priority.unwrap_or_default(),
            progress,
            deadline: req.deadline,
            budget,
            tags: normalize_tags(req.tags),
            assigned_employee_ids,
        },
    )
    .await?;

    let project = reload(&state, id).await?;
    let allowed_transitions = allowed_next(project.status, user.role);
    Ok((
        StatusCode::CREATED,
        Json(ProjectDetailResponse {
            project,
            allowed_transitions,
        }),
    ))
}

/// GET /api/v1/projects
///
/// Managers see the projects they own; employees see their assignments.
pub async fn handle_list_projects(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListProjectsQuery>,
) -> Result<Json<Page<Project>>, AppError> {
    let (limit, offset) = validate_pagination(params.limit, params.offset)?;
    let scope = match user.role {
        Role::Manager => ProjectScope::ManagedBy(user.user_id),
        Role::Employee => ProjectScope::AssignedTo(user.user_id),
    };
    let (items, total) =
        repository::list_projects_page(&state.db, scope, params.status, limit, offset).await?;
    Ok(Json(Page {
        items,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/projects/:id
pub async fn handle_get_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ProjectDetailResponse>, AppError> {
    let project = load_visible_project(&state, &user, id).await?;
    let allowed_transitions = allowed_next(project.status, user.role);
    Ok(Json(ProjectDetailResponse {
        project,
        allowed_transitions,
    }))
}

/// PATCH /api/v1/projects/:id
///
/// The owning manager may change any field; an assigned employee may only
/// report progress.
pub async fn handle_update_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<ProjectDetailResponse>, AppError> {
    let project = load_visible_project(&state, &user, id).await?;
    if user.role == Role::Employee && req.touches_more_than_progress() {
        return Err(AppError::Forbidden(
            "Employees may only update project progress".to_string(),
        ));
    }
    if project.status == ProjectStatus::Completed && req.progress.is_some_and(|p| p < 100) {
        return Err(AppError::Conflict(
            "progress of a completed project is fixed at 100".to_string(),
        ));
    }

    let update = ProjectUpdate {
        title: req.title.as_deref().map(validate_title).transpose()?,
        description: req.description.map(|d| d.trim().to_string()),
        priority: req.priority,
        progress: req.progress.map(validate_progress).transpose()?,
        deadline: req.deadline,
        budget: req
            .budget
            .map(|b| b.map(validate_budget).transpose())
            .transpose()?,
        tags: req.tags.map(normalize_tags),
    };

    if !repository::update_project(&state.db, id, update).await? {
        return Err(AppError::NotFound(format!("Project {id} not found")));
    }

    let project = reload(&state, id).await?;
    let allowed_transitions = allowed_next(project.status, user.role);
    Ok(Json(ProjectDetailResponse {
        project,
        allowed_transitions,
    }))
}

/// PUT /api/v1/projects/:id/assignments
pub async fn handle_replace_assignments(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AssignmentsRequest>,
) -> Result<Json<Project>, AppError> {
    load_owned_project(&state, &user, id).await?;
    let employee_ids = dedup_ids(req.employee_ids);
    ensure_employees_exist(&state, &employee_ids).await?;

    repository::replace_assignments(&state.db, id, &employee_ids).await?;
    Ok(Json(reload(&state, id).await?))
}

/// POST /api/v1/projects/:id/status
///
/// Every change is checked against the transition table for the caller's
/// role; the write only lands if no one changed the status in between.
pub async fn handle_change_status(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<StatusChangeRequest>,
) -> Result<Json<StatusChangeResponse>, AppError> {
    let project = load_visible_project(&state, &user, id).await?;
    let from = project.status;

    let transition =
        check_transition(from, req.status, user.role).map_err(transition_error_response)?;

    if !repository::transition_status(&state.db, id, from, req.status).await? {
        return Err(AppError::Conflict(format!(
            "project {id} changed status concurrently; reload and retry"
        )));
    }

    info!(
        "Project {id}: {} by {} {} ({from} -> {})",
        transition.action, user.role, user.user_id, req.status
    );

    let project = reload(&state, id).await?;
    let allowed_transitions = allowed_next(project.status, user.role);
    Ok(Json(StatusChangeResponse {
        project,
        action: transition.action.to_string(),
        allowed_transitions,
    }))
}

/// DELETE /api/v1/projects/:id
pub async fn handle_delete_project(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    load_owned_project(&state, &user, id).await?;
    if !repository::delete_project(&state.db, id).await? {
        return Err(AppError::NotFound(format!("Project {id} not found")));
    }
    info!("Deleted project {id}");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags_trims_and_dedups_case_insensitively() {
        let tags = vec![
            " Rust ".to_string(),
            "rust".to_string(),
            "".to_string(),
            "PostgreSQL".to_string(),
        ];
        assert_eq!(normalize_tags(tags), vec!["Rust", "PostgreSQL"]);
    }

    #[test]
    fn test_validate_title_rejects_blank_and_long() {
        assert!(validate_title("   ").is_err());
        assert!(validate_title(&"x".repeat(MAX_TITLE_LEN + 1)).is_err());
        assert_eq!(validate_title("  Apollo ").unwrap(), "Apollo");
    }

    #[test]
    fn test_validate_progress_and_budget() {
        assert!(validate_progress(100).is_ok());
        assert!(validate_progress(101).is_err());
        assert!(validate_budget(0.0).is_ok());
        assert!(validate_budget(-1.0).is_err());
        assert!(validate_budget(f64::NAN).is_err());
    }

    #[test]
    fn test_dedup_ids_keeps_first_order() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        assert_eq!(dedup_ids(vec![a, b, a]), vec![a, b]);
    }

    #[test]
    fn test_employee_progress_only_update_detection() {
        let progress_only = UpdateProjectRequest {
            progress: Some(50),
            ..Default::default()
        };
        assert!(!progress_only.touches_more_than_progress());
        let with_title = UpdateProjectRequest {
            title: Some("New".to_string()),
            ..Default::default()
        };
        assert!(with_title.touches_more_than_progress());
    }

    #[test]
    fn test_update_request_can_clear_deadline_and_budget() {
        let req: UpdateProjectRequest =
            serde_json::from_str(r#"{"deadline": null, "budget": null}"#).unwrap();
        assert_eq!(req.deadline, Some(None));
        assert_eq!(req.budget, Some(None));
        assert!(req.touches_more_than_progress());

        let req: UpdateProjectRequest = serde_json::from_str(r#"{"progress": 40}"#).unwrap();
        assert_eq!(req.deadline, None);
        assert_eq!(req.budget, None);
    }

    #[test]
    fn test_illegal_transition_is_conflict_listing_allowed_states() {
        let (from, to) = (ProjectStatus::Planning, ProjectStatus::Completed);
        let err = check_transition(from, to, Role::Manager).unwrap_err();
        match transition_error_response(err) {
            AppError::Conflict(message) => {
                assert!(message.contains("in-progress, on-hold"), "{message}");
            }
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[test]
    fn test_terminal_and_unchanged_transitions_are_conflicts() {
        let (from, to) = (ProjectStatus::Completed, ProjectStatus::Review);
        let terminal = check_transition(from, to, Role::Manager).unwrap_err();
        assert!(matches!(
            transition_error_response(terminal),
            AppError::Conflict(_)
        ));
        let unchanged = TransitionError::Unchanged(ProjectStatus::Review);
        assert!(matches!(
            transition_error_response(unchanged),
            AppError::Conflict(_)
        ));
    }

    #[test]
    fn test_role_violation_is_forbidden() {
        let (from, to) = (ProjectStatus::Review, ProjectStatus::Completed);
        let err = check_transition(from, to, Role::Employee).unwrap_err();
        assert!(matches!(
            transition_error_response(err),
            AppError::Forbidden(_)
        ));
    }

    #[test]
    fn test_transition_errors_map_to_http_status() {
        use axum::response::IntoResponse;

        let (from, to) = (ProjectStatus::InProgress, ProjectStatus::Completed);
        let illegal = check_transition(from, to, Role::Manager).unwrap_err();
        let response = transition_error_response(illegal).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        let (from, to) = (ProjectStatus::InProgress, ProjectStatus::OnHold);
        let role = check_transition(from, to, Role::Employee).unwrap_err();
        let response = transition_error_response(role).into_response();
        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
