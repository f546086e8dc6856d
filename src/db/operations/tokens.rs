use chrono::{DateTime, TimeZone, Utc};
use sqlx::Row;

use crate::db::Database;
use crate::services::quiz_token::{QuizAccessToken, TokenStore, TokenStoreError};

/// Token storage over `quiz_access_tokens`. `consume` is one conditional
/// UPDATE so two concurrent redemptions cannot both win.
#[derive(Clone)]
pub struct SqlTokenStore {
    db: Database,
}

impl SqlTokenStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl TokenStore for SqlTokenStore {
    async fn insert(&self, token: &QuizAccessToken) -> Result<(), TokenStoreError> {
        sqlx::query(
            r#"
            INSERT INTO quiz_access_tokens
                (token, deck_id, user_id, num_questions, issued_at, expires_at, consumed)
            VALUES (?, ?, ?, ?, ?, ?, 0)
            "#,
        )
        .bind(&token.token)
        .bind(&token.deck_id)
        .bind(&token.user_id)
        .bind(token.num_questions)
        .bind(token.issued_at.timestamp())
        .bind(token.expires_at.timestamp())
        .execute(self.db.pool())
        .await
        .map_err(|e| TokenStoreError(e.to_string()))?;
        Ok(())
    }

    async fn fetch(&self, token: &str) -> Result<Option<QuizAccessToken>, TokenStoreError> {
        let row = sqlx::query(
            r#"
            SELECT token, deck_id, user_id, num_questions, issued_at, expires_at, consumed
            FROM quiz_access_tokens
            WHERE token = ?
            LIMIT 1
            "#,
        )
        .bind(token)
        .fetch_optional(self.db.pool())
        .await
        .map_err(|e| TokenStoreError(e.to_string()))?;

        Ok(row.map(|row| QuizAccessToken {
            token: row.get("token"),
            deck_id: row.get("deck_id"),
            user_id: row.get("user_id"),
            num_questions: row.get("num_questions"),
            issued_at: epoch(row.get("issued_at")),
            expires_at: epoch(row.get("expires_at")),
            consumed: row.get::<i64, _>("consumed") != 0,
        }))
    }

    async fn consume(&self, token: &str, now: DateTime<Utc>) -> Result<bool, TokenStoreError> {
        let result = sqlx::query(
            r#"
            UPDATE quiz_access_tokens
            SET consumed = 1
            WHERE token = ? AND consumed = 0 AND expires_at > ?
            "#,
        )
        .bind(token)
        .bind(now.timestamp())
        .execute(self.db.pool())
        .await
        .map_err(|e| TokenStoreError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn delete_expired(&self, now: DateTime<Utc>) -> Result<u64, TokenStoreError> {
        let result = sqlx::query("DELETE FROM quiz_access_tokens WHERE expires_at < ?")
            .bind(now.timestamp())
            .execute(self.db.pool())
            .await
            .map_err(|e| TokenStoreError(e.to_string()))?;

        Ok(result.rows_affected())
    }
}

fn epoch(seconds: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(seconds, 0).single().unwrap_or_default()
}
