use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::service::{hash_password, verify_password};
use crate::db::models::{NewUser, User, UserDetail};
use crate::db::sql::{bind_values, sql_for_partial_update, ColumnMap, SqlValue, UpdateData};
use crate::error::{AppError, DatabaseError};

/// Resource manager for user accounts.
pub struct UserStore {
    pool: Arc<PgPool>,
}

impl UserStore {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    fn update_columns() -> ColumnMap {
        ColumnMap::new(&[("isAdmin", "is_admin")])
    }

    /// Register a new user, hashing the password before it is stored.
    /// A duplicate username is a bad request, not a storage failure.
    pub async fn register(&self, data: &NewUser) -> Result<User, AppError> {
        let duplicate = sqlx::query_as::<_, User>(
            "SELECT username, is_admin FROM users WHERE username = $1",
        )
        .bind(&data.username)
        .fetch_optional(self.pool.as_ref())
        .await?;

        if duplicate.is_some() {
            return Err(AppError::BadRequest(format!(
                "Duplicate username: {}",
                data.username
            )));
        }

        let hashed = hash_password(&data.password);

        let user = sqlx::query_as::<_, User>(
            "INSERT INTO users (username, password, is_admin)
             VALUES ($1, $2, $3)
             RETURNING username, is_admin",
        )
        .bind(&data.username)
        .bind(&hashed)
        .bind(data.is_admin)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(classify_unique_violation)?;

        Ok(user)
    }

    /// Check a username/password pair. Wrong username and wrong password
    /// produce the same denial.
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<User, AppError> {
        let row = sqlx::query_as::<_, (String, String, bool)>(
            "SELECT username, password, is_admin FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?;

        if let Some((username, stored_hash, is_admin)) = row {
            if verify_password(password, &stored_hash) {
                return Ok(User { username, is_admin });
            }
        }

        Err(AppError::Unauthorized)
    }

    pub async fn find_all(&self) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            "SELECT username, is_admin FROM users ORDER BY username",
        )
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(users)
    }

    /// Fetch one user plus their medication-history ids and journal bodies.
    pub async fn get(&self, username: &str) -> Result<UserDetail, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT username, is_admin FROM users WHERE username = $1",
        )
        .bind(username)
        .fetch_optional(self.pool.as_ref())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No user: {}", username)))?;

        let medication_history: Vec<(i32,)> = sqlx::query_as(
            "SELECT m.id FROM medication_history AS m WHERE m.username = $1",
        )
        .bind(username)
        .fetch_all(self.pool.as_ref())
        .await?;

        let health_journal: Vec<(String,)> = sqlx::query_as(
            "SELECT h.journal FROM health_journals AS h WHERE h.username = $1",
        )
        .bind(username)
        .fetch_all(self.pool.as_ref())
        .await?;

        Ok(UserDetail {
            username: user.username,
            is_admin: user.is_admin,
            medication_history: medication_history.into_iter().map(|(id,)| id).collect(),
            health_journal: health_journal.into_iter().map(|(j,)| j).collect(),
        })
    }

    /// Partial update over `password` and `isAdmin`. A supplied password is
    /// re-hashed before it reaches the statement.
    pub async fn update(&self, username: &str, mut data: UpdateData) -> Result<User, AppError> {
        let plaintext = match data.get("password") {
            Some(SqlValue::Text(password)) => Some(password.clone()),
            _ => None,
        };
        if let Some(password) = plaintext {
            data.insert("password", hash_password(&password));
        }

        let update = sql_for_partial_update(data, &Self::update_columns())?;
        let username_idx = update.values.len() + 1;

        let sql = format!(
            "UPDATE users SET {} WHERE username = ${} RETURNING username, is_admin",
            update.set_clause, username_idx
        );

        let query = sqlx::query_as::<_, User>(&sql);
        let user = bind_values(query, &update.values)
            .bind(username)
            .fetch_optional(self.pool.as_ref())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No user: {}", username)))?;

        Ok(user)
    }

    pub async fn remove(&self, username: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM users WHERE username = $1")
            .bind(username)
            .execute(self.pool.as_ref())
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("No user: {}", username)));
        }

        Ok(())
    }
}

// Surfacing the unique-constraint violation distinctly lets register()
// stay race-safe even though it pre-checks for duplicates.
pub(crate) fn classify_unique_violation(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(ref db_err) = err {
        if db_err.code().as_deref() == Some("23505") {
            return AppError::DatabaseError(DatabaseError::Duplicate);
        }
    }
    err.into()
}
