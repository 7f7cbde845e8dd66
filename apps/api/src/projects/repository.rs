use std::collections::HashMap;

use anyhow::Result;
use chrono::NaiveDate;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::info;
use uuid::Uuid;

use crate::models::project::{
    AssignedEmployee, AssignmentRow, Priority, Project, ProjectRow, ProjectStatus,
};

const PROJECT_COLUMNS: &str = "id, manager_id, title, description, status, priority, progress, \
    deadline, budget, tags, created_at, updated_at";

/// Whose projects a listing covers.
#[derive(Debug, Clone, Copy)]
pub enum ProjectScope {
    ManagedBy(Uuid),
    AssignedTo(Uuid),
}

/// Attaches assignments (joined names, assignment order) to project rows.
async fn hydrate(pool: &PgPool, rows: Vec<ProjectRow>) -> Result<Vec<Project>> {
    let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let assignments = sqlx::query_as::<_, AssignmentRow>(
        r#"
        SELECT pa.project_id, pa.employee_id, e.name
        FROM project_assignments pa
        JOIN employees e ON e.id = pa.employee_id
        WHERE pa.project_id = ANY($1)
        ORDER BY pa.project_id, pa.position
        "#,
    )
    .bind(&ids)
    .fetch_all(pool)
    .await?;

    let mut by_project: HashMap<Uuid, Vec<AssignedEmployee>> = HashMap::new();
    for a in assignments {
        by_project.entry(a.project_id).or_default().push(AssignedEmployee {
            id: a.employee_id,
            name: a.name,
        });
    }

    rows.into_iter()
        .map(|row| {
            let assigned = by_project.remove(&row.id).unwrap_or_default();
            Project::from_row(row, assigned)
        })
        .collect()
}

pub async fn get_project(pool: &PgPool, id: Uuid) -> Result<Option<Project>> {
    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    match row {
        Some(row) => Ok(hydrate(pool, vec![row]).await?.pop()),
        None => Ok(None),
    }
}

fn scope_clause(scope: ProjectScope) -> (&'static str, Uuid) {
    match scope {
        ProjectScope::ManagedBy(id) => ("manager_id = $1", id),
        ProjectScope::AssignedTo(id) => (
            "id IN (SELECT project_id FROM project_assignments WHERE employee_id = $1)",
            id,
        ),
    }
}

pub async fn list_projects_page(
    pool: &PgPool,
    scope: ProjectScope,
    status: Option<ProjectStatus>,
    limit: i64,
    offset: i64,
) -> Result<(Vec<Project>, i64)> {
    let (clause, owner) = scope_clause(scope);
    let filter = status.map(|s| s.as_str());

    let rows = sqlx::query_as::<_, ProjectRow>(&format!(
        r#"
        SELECT {PROJECT_COLUMNS} FROM projects
        WHERE {clause} AND ($2::TEXT IS NULL OR status = $2)
        ORDER BY deadline NULLS LAST, created_at DESC
        LIMIT $3 OFFSET $4
        "#
    ))
    .bind(owner)
    .bind(filter)
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let total: i64 = sqlx::query_scalar(&format!(
        "SELECT COUNT(*) FROM projects WHERE {clause} AND ($2::TEXT IS NULL OR status = $2)"
    ))
    .bind(owner)
    .bind(filter)
    .fetch_one(pool)
    .await?;

    Ok((hydrate(pool, rows).await?, total))
}

/// Every project in scope, unpaginated. Feeds reports and insights.
pub async fn list_all_projects(pool: &PgPool, scope: ProjectScope) -> Result<Vec<Project>> {
    let (clause, owner) = scope_clause(scope);
    let rows = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {PROJECT_COLUMNS} FROM projects WHERE {clause} ORDER BY deadline NULLS LAST, created_at DESC"
    ))
    .bind(owner)
    .fetch_all(pool)
    .await?;
    hydrate(pool, rows).await
}

/// Number of active (planning / in-progress / review) projects per employee,
/// across all managers.
pub async fn active_assignment_counts(pool: &PgPool) -> Result<HashMap<Uuid, i64>> {
    let rows: Vec<(Uuid, i64)> = sqlx::query_as(
        r#"
        SELECT pa.employee_id, COUNT(*)
        FROM project_assignments pa
        JOIN projects p ON p.id = pa.project_id
        WHERE p.status IN ('planning', 'in-progress', 'review')
        GROUP BY pa.employee_id
        "#,
    )
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().collect())
}

pub struct NewProject {
    pub manager_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub progress: u8,
    pub deadline: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub tags: Vec<String>,
    pub assigned_employee_ids: Vec<Uuid>,
}

async fn write_assignments(
    tx: &mut Transaction<'_, Postgres>,
    project_id: Uuid,
    employee_ids: &[Uuid],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM project_assignments WHERE project_id = $1")
        .bind(project_id)
        .execute(&mut **tx)
        .await?;
    for (position, employee_id) in employee_ids.iter().enumerate() {
        sqlx::query(
            "INSERT INTO project_assignments (project_id, employee_id, position) VALUES ($1, $2, $3)",
        )
        .bind(project_id)
        .bind(employee_id)
        .bind(position as i32)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

pub async fn create_project(pool: &PgPool, new: NewProject) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO projects
            (id, manager_id, title, description, status, priority, progress, deadline, budget, tags)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        "#,
    )
    .bind(id)
    .bind(new.manager_id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.status.as_str())
    .bind(new.priority.as_str())
    .bind(new.progress as i16)
    .bind(new.deadline)
    .bind(new.budget)
    .bind(&new.tags)
    .execute(&mut *tx)
    .await?;

    write_assignments(&mut tx, id, &new.assigned_employee_ids).await?;
    tx.commit().await?;

    info!("Created project {id} '{}' for manager {}", new.title, new.manager_id);
    Ok(id)
}

/// Present fields are written. For `deadline` and `budget`, `Some(None)`
/// clears the stored value.
#[derive(Debug, Default)]
pub struct ProjectUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<Priority>,
    pub progress: Option<u8>,
    pub deadline: Option<Option<NaiveDate>>,
    pub budget: Option<Option<f64>>,
    pub tags: Option<Vec<String>>,
}

/// Field-level last-write-wins update of the present fields.
pub async fn update_project(pool: &PgPool, id: Uuid, update: ProjectUpdate) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE projects SET
            title = COALESCE($2, title),
            description = COALESCE($3, description),
            priority = COALESCE($4, priority),
            progress = COALESCE($5, progress),
            deadline = CASE WHEN $6 THEN $7 ELSE deadline END,
            budget = CASE WHEN $8 THEN $9 ELSE budget END,
            tags = COALESCE($10, tags),
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(update.title)
    .bind(update.description)
    .bind(update.priority.map(|p| p.as_str()))
    .bind(update.progress.map(|p| p as i16))
    .bind(update.deadline.is_some())
    .bind(update.deadline.flatten())
    .bind(update.budget.is_some())
    .bind(update.budget.flatten())
    .bind(update.tags)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn replace_assignments(
    pool: &PgPool,
    project_id: Uuid,
    employee_ids: &[Uuid],
) -> Result<()> {
    let mut tx = pool.begin().await?;
    write_assignments(&mut tx, project_id, employee_ids).await?;
    sqlx::query("UPDATE projects SET updated_at = NOW() WHERE id = $1")
        .bind(project_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;
    info!(
        "Project {project_id} now has {} assigned employee(s)",
        employee_ids.len()
    );
    Ok(())
}

/// Moves `from` → `to` only if the stored status is still `from`.
/// Returns false when another writer got there first.
pub async fn transition_status(
    pool: &PgPool,
    id: Uuid,
    from: ProjectStatus,
    to: ProjectStatus,
) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE projects SET
            status = $3,
            progress = CASE WHEN $3 = 'completed' THEN 100 ELSE progress END,
            updated_at = NOW()
        WHERE id = $1 AND status = $2
        "#,
    )
    .bind(id)
    .bind(from.as_str())
    .bind(to.as_str())
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}

pub async fn delete_project(pool: &PgPool, id: Uuid) -> Result<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() == 1)
}
