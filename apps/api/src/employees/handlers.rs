//! Axum route handlers for employee profiles.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::AuthUser;
use crate::employees::repository::{self, ProfileUpdate};
use crate::errors::AppError;
use crate::models::deserialize_nullable;
use crate::models::employee::{Availability, Employee, Skill};
use crate::models::project::Project;
use crate::models::user::Role;
use crate::pagination::{validate_pagination, Page};
use crate::projects::repository::{list_all_projects, ProjectScope};
use crate::state::AppState;

pub const MAX_YEARS_OF_EXPERIENCE: u32 = 60;

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub department: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_nullable")]
    pub position: Option<Option<String>>,
    pub skills: Option<Vec<Skill>>,
    pub availability: Option<Availability>,
}

#[derive(Debug, Deserialize)]
pub struct ListEmployeesQuery {
    pub availability: Option<Availability>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Trims skill names, rejects blanks and implausible experience, and drops
/// case-insensitive duplicates (first entry wins).
fn validate_skills(skills: Vec<Skill>) -> Result<Vec<Skill>, AppError> {
    let mut seen = std::collections::HashSet::new();
    let mut cleaned = Vec::with_capacity(skills.len());
    for mut skill in skills {
        skill.name = skill.name.trim().to_string();
        if skill.name.is_empty() {
            return Err(AppError::Validation("skill names cannot be empty".to_string()));
        }
        if skill.years_of_experience > MAX_YEARS_OF_EXPERIENCE {
            return Err(AppError::Validation(format!(
                "years_of_experience for '{}' must be at most {MAX_YEARS_OF_EXPERIENCE}",
                skill.name
            )));
        }
        if seen.insert(skill.name.to_lowercase()) {
            cleaned.push(skill);
        }
    }
    Ok(cleaned)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

/// Trims a clearable field; `null` and blank strings both clear it.
fn clearable(value: Option<Option<String>>) -> Option<Option<String>> {
    value.map(|inner| trimmed(inner).filter(|v| !v.is_empty()))
}

async fn fetch_employee(state: &AppState, id: Uuid) -> Result<Employee, AppError> {
    repository::get_employee(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {id} not found")))
}

/// GET /api/v1/employees/me
pub async fn handle_get_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Employee>, AppError> {
    user.require_employee()?;
    Ok(Json(fetch_employee(&state, user.user_id).await?))
}

/// PUT /api/v1/employees/me
pub async fn handle_update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<Employee>, AppError> {
    user.require_employee()?;

    let name = trimmed(req.name);
    if name.as_deref().is_some_and(str::is_empty) {
        return Err(AppError::Validation("name cannot be empty".to_string()));
    }
    let update = ProfileUpdate {
        name,
        department: clearable(req.department),
        position: clearable(req.position),
        skills: req.skills.map(validate_skills).transpose()?,
        availability: req.availability,
    };

    let employee = repository::update_profile(&state.db, user.user_id, update)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Employee {} not found", user.user_id)))?;
    Ok(Json(employee))
}

/// GET /api/v1/employees/me/projects
pub async fn handle_my_projects(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Json<Vec<Project>>, AppError> {
    user.require_employee()?;
    let projects = list_all_projects(&state.db, ProjectScope::AssignedTo(user.user_id)).await?;
    Ok(Json(projects))
}

/// GET /api/v1/employees
pub async fn handle_list_employees(
    State(state): State<AppState>,
    user: AuthUser,
    Query(params): Query<ListEmployeesQuery>,
) -> Result<Json<Page<Employee>>, AppError> {
    user.require_manager()?;
    let (limit, offset) = validate_pagination(params.limit, params.offset)?;
    let (items, total) =
        repository::list_employees_page(&state.db, params.availability, limit, offset).await?;
    Ok(Json(Page {
        items,
        total,
        limit,
        offset,
    }))
}

/// GET /api/v1/employees/:id
///
/// Managers may read any profile; an employee only their own.
pub async fn handle_get_employee(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<Employee>, AppError> {
    if user.role == Role::Employee && user.user_id != id {
        return Err(AppError::Forbidden(
            "Employees can only view their own profile".to_string(),
        ));
    }
    Ok(Json(fetch_employee(&state, id).await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::employee::ProficiencyLevel;

    fn skill(name: &str, years: u32) -> Skill {
        Skill {
            name: name.to_string(),
            level: ProficiencyLevel::Advanced,
            years_of_experience: years,
        }
    }

    #[test]
    fn test_validate_skills_trims_and_dedups() {
        let skills = vec![skill(" Rust ", 3), skill("rust", 9), skill("Go", 1)];
        let cleaned = validate_skills(skills).unwrap();
        let names: Vec<&str> = cleaned.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Rust", "Go"]);
        assert_eq!(cleaned[0].years_of_experience, 3);
    }

    #[test]
    fn test_validate_skills_rejects_blank_name() {
        assert!(matches!(
            validate_skills(vec![skill("   ", 1)]),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn test_validate_skills_caps_years() {
        assert!(validate_skills(vec![skill("COBOL", MAX_YEARS_OF_EXPERIENCE)]).is_ok());
        assert!(validate_skills(vec![skill("COBOL", MAX_YEARS_OF_EXPERIENCE + 1)]).is_err());
    }

    #[test]
    fn test_blank_or_null_department_clears_it() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"department": "  ", "position": null}"#).unwrap();
        assert_eq!(clearable(req.department), Some(None));
        assert_eq!(clearable(req.position), Some(None));
    }

    #[test]
    fn test_absent_department_is_untouched() {
        let req: UpdateProfileRequest = serde_json::from_str(r#"{"name": "Ada"}"#).unwrap();
        assert_eq!(clearable(req.department), None);
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"department": " Platform "}"#).unwrap();
        assert_eq!(clearable(req.department), Some(Some("Platform".to_string())));
    }
}
