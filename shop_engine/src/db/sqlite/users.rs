use chrono::Utc;
use sqlx::SqliteConnection;

use crate::db_types::{NewUser, Role, User, UserId};

pub async fn insert_user(user: NewUser, conn: &mut SqliteConnection) -> Result<User, sqlx::Error> {
    sqlx::query_as(
        r#"
            INSERT INTO users (user_id, username, role, marketing_consent, created_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(user.user_id.as_str())
    .bind(user.username)
    .bind(user.role.to_string())
    .bind(user.marketing_consent)
    .bind(Utc::now())
    .fetch_one(conn)
    .await
}

pub async fn fetch_user_by_id(id: i64, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(conn).await
}

pub async fn fetch_user(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE user_id = $1").bind(user_id.as_str()).fetch_optional(conn).await
}

pub async fn fetch_by_role(role: Role, conn: &mut SqliteConnection) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE role = $1 ORDER BY id").bind(role.to_string()).fetch_all(conn).await
}

pub async fn fetch_active(conn: &mut SqliteConnection) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE active = TRUE ORDER BY id").fetch_all(conn).await
}

pub async fn fetch_active_excluding_role(role: Role, conn: &mut SqliteConnection) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE active = TRUE AND role <> $1 ORDER BY id")
        .bind(role.to_string())
        .fetch_all(conn)
        .await
}

pub async fn fetch_marketing_consenting(conn: &mut SqliteConnection) -> Result<Vec<User>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM users WHERE marketing_consent = TRUE AND role <> $1 ORDER BY id")
        .bind(Role::Admin.to_string())
        .fetch_all(conn)
        .await
}

pub async fn deactivate(user_id: &UserId, conn: &mut SqliteConnection) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as("UPDATE users SET active = FALSE WHERE user_id = $1 RETURNING *")
        .bind(user_id.as_str())
        .fetch_optional(conn)
        .await
}

pub async fn delete_user(user_id: &UserId, conn: &mut SqliteConnection) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE user_id = $1").bind(user_id.as_str()).execute(conn).await?;
    Ok(result.rows_affected())
}
