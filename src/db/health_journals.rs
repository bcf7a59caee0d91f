use std::sync::Arc;

use sqlx::PgPool;

use crate::db::models::HealthJournal;
use crate::db::sql::{bind_values, sql_for_partial_update, ColumnMap, UpdateData};
use crate::db::users::classify_unique_violation;
use crate::error::AppError;

/// Resource manager for health journals. One row per user, keyed by
/// username.
pub struct HealthJournalStore {
    pool: Arc<PgPool>,
}

impl HealthJournalStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Insert a user's journal. A second insert for the same user trips the
    /// unique constraint and comes back as a duplicate-record error.
    pub async fn create(&self, username: &str, journal: &str) -> Result<HealthJournal, AppError> {
        let entry = sqlx::query_as::<_, HealthJournal>(
            "INSERT INTO health_journals (username, journal)
             VALUES ($1, $2)
             RETURNING username, journal",
        )
        .bind(username)
        .bind(journal)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(classify_unique_violation)?;

        Ok(entry)
    }

    pub async fn get(&self, username: &str) -> Result<HealthJournal, AppError> {
        let entry = sqlx::query_as::<_, HealthJournal>(
            "SELECT username, journal FROM health_journals WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No health journal: {}", username)))?;

        Ok(entry)
    }

    /// Partial update over `journal`; the username binds at `$N+1`.
    pub async fn update(&self, username: &str, data: UpdateData) -> Result<HealthJournal, AppError> {
        let update = sql_for_partial_update(data, &ColumnMap::default())?;
        let username_idx = update.values.len() + 1;

        let sql = format!(
            "UPDATE health_journals SET {} WHERE username = ${} RETURNING username, journal",
            update.set_clause, username_idx
        );

        let query = sqlx::query_as::<_, HealthJournal>(&sql);
        let entry = bind_values(query, &update.values)
            .bind(username)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No health journal: {}", username)))?;

        Ok(entry)
    }

    pub async fn remove(&self, username: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM health_journals WHERE username = $1")
            .bind(username)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("No health journal: {}", username)));
        }

        Ok(())
    }
}
