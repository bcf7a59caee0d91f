use std::sync::Arc;

use sqlx::PgPool;

use crate::db::models::{MedicationHistory, NewMedicationHistory};
use crate::db::sql::{bind_values, sql_for_partial_update, ColumnMap, UpdateData};
use crate::error::AppError;

const RETURNING: &str = "RETURNING id, username, drug_name, status, start_date, stop_date";

/// Resource manager for medication-history entries.
pub struct MedicationHistoryStore {
    pool: Arc<PgPool>,
}

impl MedicationHistoryStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub async fn create(&self, data: &NewMedicationHistory) -> Result<MedicationHistory, AppError> {
        let sql = format!(
            "INSERT INTO medication_history (username, drug_name, status, start_date, stop_date)
             VALUES ($1, $2, $3, $4, $5) {}",
            RETURNING
        );

        let entry = sqlx::query_as::<_, MedicationHistory>(&sql)
            .bind(&data.username)
            .bind(&data.drug_name)
            .bind(&data.status)
            .bind(data.start_date)
            .bind(data.stop_date)
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(entry)
    }

    /// All entries owned by a username, oldest first.
    pub async fn find_all(&self, username: &str) -> Result<Vec<MedicationHistory>, AppError> {
        let entries = sqlx::query_as::<_, MedicationHistory>(
            "SELECT id, username, drug_name, status, start_date, stop_date
             FROM medication_history
             WHERE username = $1
             ORDER BY id",
        )
        .bind(username)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(entries)
    }

    pub async fn get(&self, id: i32) -> Result<MedicationHistory, AppError> {
        let entry = sqlx::query_as::<_, MedicationHistory>(
            "SELECT id, username, drug_name, status, start_date, stop_date
             FROM medication_history
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No medication history: {}", id)))?;

        Ok(entry)
    }

    /// Partial update over `status`, `start_date` and `stop_date`. The row
    /// id binds after the compiled values, at `$N+1`.
    pub async fn update(&self, id: i32, data: UpdateData) -> Result<MedicationHistory, AppError> {
        let update = sql_for_partial_update(data, &ColumnMap::default())?;
        let id_idx = update.values.len() + 1;

        let sql = format!(
            "UPDATE medication_history SET {} WHERE id = ${} {}",
            update.set_clause, id_idx, RETURNING
        );

        let query = sqlx::query_as::<_, MedicationHistory>(&sql);
        let entry = bind_values(query, &update.values)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No medication history: {}", id)))?;

        Ok(entry)
    }

    pub async fn remove(&self, id: i32) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM medication_history WHERE id = $1")
            .bind(id)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("No medication history: {}", id)));
        }

        Ok(())
    }
}
