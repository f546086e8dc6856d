use chrono::Utc;
use sqlx::Row;

use crate::db::Database;
use crate::services::session::{PersistError, SessionPersister};

/// Current mastery for one (deck, user) pair; zero when never studied.
pub async fn get_mastery(db: &Database, deck_id: &str, user_id: &str) -> Result<f64, sqlx::Error> {
    let row = sqlx::query("SELECT mastery FROM progress WHERE deck_id = ? AND user_id = ? LIMIT 1")
        .bind(deck_id)
        .bind(user_id)
        .fetch_optional(db.pool())
        .await?;

    Ok(row.map(|row| row.get::<f64, _>("mastery")).unwrap_or(0.0))
}

/// Progress write-back for ended sessions. The upsert overwrites both
/// fields, so replaying the same final values on a retry cannot corrupt
/// the record (last write wins).
#[derive(Clone)]
pub struct SqlProgressStore {
    db: Database,
}

impl SqlProgressStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl SessionPersister for SqlProgressStore {
    async fn save(
        &self,
        deck_id: &str,
        user_id: &str,
        mastery: f64,
        seconds_studied: u64,
    ) -> Result<(), PersistError> {
        sqlx::query(
            r#"
            INSERT INTO progress (deck_id, user_id, mastery, seconds_studied, updated_at)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT (deck_id, user_id) DO UPDATE SET
                mastery = excluded.mastery,
                seconds_studied = excluded.seconds_studied,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(deck_id)
        .bind(user_id)
        .bind(mastery.clamp(0.0, 100.0))
        .bind(seconds_studied as i64)
        .bind(Utc::now().to_rfc3339())
        .execute(self.db.pool())
        .await
        .map_err(|e| PersistError(e.to_string()))?;

        Ok(())
    }
}
