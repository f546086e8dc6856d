use chrono::Utc;
use sqlx::Row;
use uuid::Uuid;

use crate::db::Database;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
}

pub async fn insert_user(
    db: &Database,
    email: &str,
    username: &str,
    password_hash: &str,
) -> Result<UserRecord, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    sqlx::query(
        r#"
        INSERT INTO users (id, email, username, password_hash, created_at)
        VALUES (?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(email)
    .bind(username)
    .bind(password_hash)
    .bind(Utc::now().to_rfc3339())
    .execute(db.pool())
    .await?;

    Ok(UserRecord {
        id,
        email: email.to_string(),
        username: username.to_string(),
        password_hash: password_hash.to_string(),
    })
}

pub async fn find_by_email(db: &Database, email: &str) -> Result<Option<UserRecord>, sqlx::Error> {
    let row = sqlx::query(
        "SELECT id, email, username, password_hash FROM users WHERE email = ? LIMIT 1",
    )
    .bind(email)
    .fetch_optional(db.pool())
    .await?;

    Ok(row.map(|row| map_user(&row)))
}

pub async fn find_by_id(db: &Database, id: &str) -> Result<Option<UserRecord>, sqlx::Error> {
    let row =
        sqlx::query("SELECT id, email, username, password_hash FROM users WHERE id = ? LIMIT 1")
            .bind(id)
            .fetch_optional(db.pool())
            .await?;

    Ok(row.map(|row| map_user(&row)))
}

fn map_user(row: &sqlx::sqlite::SqliteRow) -> UserRecord {
    UserRecord {
        id: row.get("id"),
        email: row.get("email"),
        username: row.get("username"),
        password_hash: row.get("password_hash"),
    }
}
