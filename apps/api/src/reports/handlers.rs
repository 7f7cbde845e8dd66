//! Axum route handlers for downloads and the dashboard summary.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;

use crate::auth::AuthUser;
use crate::employees::repository::list_all_employees;
use crate::errors::AppError;
use crate::projects::repository::{list_all_projects, ProjectScope};
use crate::reports::dashboard::{dashboard_stats, DashboardStats};
use crate::reports::export::{employee_table, project_table, ExportFormat, Table};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExportFormat,
}

fn attachment(table: &Table, stem: &str, format: ExportFormat) -> Response {
    let filename = format!(
        "{stem}-{}.{}",
        Utc::now().format("%Y-%m-%d"),
        format.extension()
    );
    info!("Exporting {} row(s) as {filename}", table.rows.len());
    (
        [
            (header::CONTENT_TYPE, format.content_type().to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        table.render(format),
    )
        .into_response()
}

/// GET /api/v1/reports/projects?format=csv|xls
pub async fn handle_export_projects(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ExportQuery>,
) -> Result<Response, AppError> {
    user.require_manager()?;
    let projects = list_all_projects(&state.db, ProjectScope::ManagedBy(user.user_id)).await?;
    Ok(attachment(&project_table(&projects), "projects", params.format))
}

/// GET /api/v1/reports/employees?format=csv|xls
pub async fn handle_export_employees(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ExportQuery>,
) -> Result<Response, AppError> {
    user.require_manager()?;
    let employees = list_all_employees(&state.db).await?;
    Ok(attachment(&employee_table(&employees), "employees", params.format))
}

/// GET /api/v1/dashboard/stats
pub async fn handle_dashboard_stats(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<DashboardStats>, AppError> {
    user.require_manager()?;
    let projects = list_all_projects(&state.db, ProjectScope::ManagedBy(user.user_id)).await?;
    let employees = list_all_employees(&state.db).await?;
    Ok(Json(dashboard_stats(&projects, &employees)))
}
