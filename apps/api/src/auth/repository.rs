use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::models::user::{Manager, Role, UserRow};

/// Profile fields collected at registration.
pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub name: &'a str,
    pub role: Role,
    pub department: Option<&'a str>,
    pub position: Option<&'a str>,
}

pub async fn find_user_by_email(
    pool: &PgPool,
    email: &str,
) -> Result<Option<UserRow>, sqlx::Error> {
    sqlx::query_as::<_, UserRow>(
        "SELECT id, email, password_hash, role FROM users WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(pool)
    .await
}

/// Inserts the login row and the matching profile row in one transaction.
pub async fn create_account(pool: &PgPool, account: NewAccount<'_>) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    let mut tx = pool.begin().await?;

    sqlx::query("INSERT INTO users (id, email, password_hash, role) VALUES ($1, $2, $3, $4)")
        .bind(id)
        .bind(account.email)
        .bind(account.password_hash)
        .bind(account.role.as_str())
        .execute(&mut *tx)
        .await?;

    match account.role {
        Role::Employee => {
            sqlx::query(
                r#"
                INSERT INTO employees (id, name, email, department, position)
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(id)
            .bind(account.name)
            .bind(account.email)
            .bind(account.department)
            .bind(account.position)
            .execute(&mut *tx)
            .await?;
        }
        Role::Manager => {
            sqlx::query(
                "INSERT INTO managers (id, name, email, department) VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(account.name)
            .bind(account.email)
            .bind(account.department)
            .execute(&mut *tx)
            .await?;
        }
    }

    tx.commit().await?;
    info!("Registered {} account {id}", account.role);
    Ok(id)
}

pub async fn get_manager(pool: &PgPool, id: Uuid) -> Result<Option<Manager>, sqlx::Error> {
    sqlx::query_as::<_, Manager>(
        "SELECT id, name, email, department, created_at FROM managers WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await
}
