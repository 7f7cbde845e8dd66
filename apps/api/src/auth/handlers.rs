//! Axum route handlers for registration and login.

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password, MIN_PASSWORD_LEN};
use crate::auth::repository::{self, NewAccount};
use crate::employees::repository::get_employee;
use crate::errors::AppError;
use crate::models::employee::Employee;
use crate::models::user::{Manager, Role};
use crate::state::AppState;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub role: Role,
    pub department: Option<String>,
    pub position: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
}

/// Profile of the signed-in account, tagged by role.
#[derive(Debug, Serialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Profile {
    Employee(Employee),
    Manager(Manager),
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub profile: Profile,
}

fn normalize_email(email: &str) -> Result<String, AppError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && domain.contains('.'));
    if !valid {
        return Err(AppError::Validation("a valid email is required".to_string()));
    }
    Ok(email)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

async fn load_profile(state: &AppState, id: Uuid, role: Role) -> Result<Profile, AppError> {
    let profile = match role {
        Role::Employee => get_employee(&state.db, id).await?.map(Profile::Employee),
        Role::Manager => repository::get_manager(&state.db, id)
            .await?
            .map(Profile::Manager),
    };
    profile.ok_or_else(|| AppError::NotFound(format!("No {role} profile for account {id}")))
}

/// POST /api/v1/auth/register
pub async fn handle_register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let email = normalize_email(&req.email)?;
    let name = req.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    if req.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    if let Some(existing) = repository::find_user_by_email(&state.db, &email).await? {
        return Err(AppError::Conflict(format!(
            "{email} is already registered as {}",
            existing.role
        )));
    }

    // argon2 is CPU-bound; keep it off the async workers.
    let password = req.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("hashing task failed: {e}")))??;

    let department = non_blank(req.department);
    let position = non_blank(req.position);
    let id = repository::create_account(
        &state.db,
        NewAccount {
            email: &email,
            password_hash: &password_hash,
            name: &name,
            role: req.role,
            department: department.as_deref(),
            position: position.as_deref(),
        },
    )
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(format!("{email} is already registered"))
        }
        other => AppError::Database(other),
    })?;

    let token = state.jwt.issue(id, req.role)?;
    let profile = load_profile(&state, id, req.role).await?;
    Ok((StatusCode::CREATED, Json(AuthResponse { token, profile })))
}

/// POST /api/v1/auth/login
pub async fn handle_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let email = req.email.trim().to_lowercase();
    let user = repository::find_user_by_email(&state.db, &email)
        .await?
        .ok_or_else(|| AppError::Auth(INVALID_CREDENTIALS.to_string()))?;

    let stored_hash = user.password_hash.clone();
    let password = req.password;
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("verification task failed: {e}")))?;
    if !verified {
        warn!("Failed login for {email}");
        return Err(AppError::Auth(INVALID_CREDENTIALS.to_string()));
    }

    let role: Role = user.role.parse()?;
    if role != req.role {
        return Err(AppError::Auth(format!(
            "This account is registered as {role}, not {}",
            req.role
        )));
    }

    let token = state.jwt.issue(user.id, role)?;
    let profile = load_profile(&state, user.id, role).await?;
    info!("{role} {} ({}) signed in", user.id, user.email);
    Ok(Json(AuthResponse { token, profile }))
}
