pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::auth::handlers as auth;
use crate::employees::handlers as employees;
use crate::insights::handlers as insights;
use crate::projects::handlers as projects;
use crate::recommendation::handlers as recommendation;
use crate::reports::handlers as reports;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Auth
        .route("/api/v1/auth/register", post(auth::handle_register))
        .route("/api/v1/auth/login", post(auth::handle_login))
        // Employees
        .route(
            "/api/v1/employees/me",
            get(employees::handle_get_me).put(employees::handle_update_me),
        )
        .route(
            "/api/v1/employees/me/projects",
            get(employees::handle_my_projects),
        )
        .route("/api/v1/employees", get(employees::handle_list_employees))
        .route("/api/v1/employees/:id", get(employees::handle_get_employee))
        // Projects
        .route(
            "/api/v1/projects",
            get(projects::handle_list_projects).post(projects::handle_create_project),
        )
        .route(
            "/api/v1/projects/:id",
            get(projects::handle_get_project)
                .patch(projects::handle_update_project)
                .delete(projects::handle_delete_project),
        )
        .route(
            "/api/v1/projects/:id/assignments",
            put(projects::handle_replace_assignments),
        )
        .route(
            "/api/v1/projects/:id/status",
            post(projects::handle_change_status),
        )
        // Recommendations
        .route(
            "/api/v1/projects/:id/recommendations",
            post(recommendation::handle_project_recommendations),
        )
        .route(
            "/api/v1/recommendations",
            post(recommendation::handle_draft_recommendations),
        )
        // Insights, reports, dashboard
        .route("/api/v1/insights", get(insights::handle_get_insights))
        .route(
            "/api/v1/reports/projects",
            get(reports::handle_export_projects),
        )
        .route(
            "/api/v1/reports/employees",
            get(reports::handle_export_employees),
        )
        .route(
            "/api/v1/dashboard/stats",
            get(reports::handle_dashboard_stats),
        )
        .with_state(state)
}
