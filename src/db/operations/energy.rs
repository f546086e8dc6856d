use sqlx::Row;

use crate::db::Database;
use crate::services::energy::{EnergyError, EnergyLedger};

/// Ledger over the `energy_balances` table. The deduction is a single
/// conditional UPDATE, so the balance check and the spend can never be
/// separated by a concurrent writer.
#[derive(Clone)]
pub struct SqlEnergyLedger {
    db: Database,
}

impl SqlEnergyLedger {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub async fn grant(&self, user_id: &str, amount: i64) -> Result<(), EnergyError> {
        sqlx::query(
            r#"
            INSERT INTO energy_balances (user_id, amount)
            VALUES (?, ?)
            ON CONFLICT (user_id) DO UPDATE SET amount = amount + excluded.amount
            "#,
        )
        .bind(user_id)
        .bind(amount)
        .execute(self.db.pool())
        .await
        .map_err(|e| EnergyError(e.to_string()))?;
        Ok(())
    }
}

impl EnergyLedger for SqlEnergyLedger {
    async fn balance(&self, user_id: &str) -> Result<i64, EnergyError> {
        let row = sqlx::query("SELECT amount FROM energy_balances WHERE user_id = ? LIMIT 1")
            .bind(user_id)
            .fetch_optional(self.db.pool())
            .await
            .map_err(|e| EnergyError(e.to_string()))?;

        Ok(row.map(|row| row.get::<i64, _>("amount")).unwrap_or(0))
    }

    async fn try_deduct(&self, user_id: &str, amount: i64) -> Result<bool, EnergyError> {
        let result = sqlx::query(
            r#"
            UPDATE energy_balances
            SET amount = amount - ?1
            WHERE user_id = ?2 AND amount >= ?1
            "#,
        )
        .bind(amount)
        .bind(user_id)
        .execute(self.db.pool())
        .await
        .map_err(|e| EnergyError(e.to_string()))?;

        Ok(result.rows_affected() == 1)
    }

    async fn credit(&self, user_id: &str, amount: i64) -> Result<(), EnergyError> {
        self.grant(user_id, amount).await
    }
}
