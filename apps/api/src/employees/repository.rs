use anyhow::Result;
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::models::employee::{Availability, Employee, EmployeeRow, Skill};

const EMPLOYEE_COLUMNS: &str =
    "id, name, email, skills, availability, department, position, created_at, updated_at";

fn into_employees(rows: Vec<EmployeeRow>) -> Result<Vec<Employee>> {
    rows.into_iter().map(Employee::try_from).collect()
}

pub async fn get_employee(pool: &PgPool, id: Uuid) -> Result<Option<Employee>> {
    let row = sqlx::query_as::<_, EmployeeRow>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    row.map(Employee::try_from).transpose()
}

/// Every employee, in name order. Candidate pool for recommendations.
pub async fn list_all_employees(pool: &PgPool) -> Result<Vec<Employee>> {
    let rows = sqlx::query_as::<_, EmployeeRow>(&format!(
        "SELECT {EMPLOYEE_COLUMNS} FROM employees ORDER BY name, id"
    ))
    .fetch_all(pool)
    .await?;
    into_employees(rows)
}

pub async fn list_employees_page(
    pool: &PgPool,
    availability: Option<Availability>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Employee>, i64)> {
    let filter = availability.map(|a| a.as_str());

    let rows = sqlx::query_as::<_, EmployeeRow>(&format!(
        r#"
        SELECT {EMPLOYEE_COLUMNS} FROM employees
        WHERE ($1::TEXT IS NULL OR availability = $1)
        ORDER BY name, id
        LIMIT $2 OFFSET $3
        "#
    ))
    .bind(filter)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM employees WHERE ($1::TEXT IS NULL OR availability = $1)",
    )
    .bind(filter)
    .fetch_one(pool)
    .await?;

    Ok((into_employees(rows)?, total))
}

/// Ids from `ids` that have no employee row.
pub async fn missing_employee_ids(pool: &PgPool, ids: &[Uuid]) -> Result<Vec<Uuid>> {
    let existing: Vec<Uuid> = sqlx::query_scalar("SELECT id FROM employees WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    Ok(ids
        .iter()
        .filter(|id| !existing.contains(id))
        .copied()
        .collect())
}

/// Present fields are written. For `department` and `position`,
/// `Some(None)` clears the stored value.
pub struct ProfileUpdate {
    pub name: Option<String>,
    pub department: Option<Option<String>>,
    pub position: Option<Option<String>>,
    pub skills: Option<Vec<Skill>>,
    pub availability: Option<Availability>,
}

/// Applies the present fields; absent fields keep their stored value.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    update: ProfileUpdate,
) -> Result<Option<Employee>> {
    let row = sqlx::query_as::<_, EmployeeRow>(&format!(
        r#"
        UPDATE employees SET
            name = COALESCE($2, name),
            department = CASE WHEN $3 THEN $4 ELSE department END,
            position = CASE WHEN $5 THEN $6 ELSE position END,
            skills = COALESCE($7, skills),
            availability = COALESCE($8, availability),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {EMPLOYEE_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(update.name)
    .bind(update.department.is_some())
    .bind(update.department.flatten())
    .bind(update.position.is_some())
    .bind(update.position.flatten())
    .bind(update.skills.map(Json))
    .bind(update.availability.map(|a| a.as_str()))
    .fetch_optional(pool)
    .await?;
    row.map(Employee::try_from).transpose()
}
