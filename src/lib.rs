pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod external;
pub mod routes;

use std::sync::Arc;

use actix_web::HttpResponse;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;

pub use config::Settings;
pub use error::AppError;
pub type Result<T> = std::result::Result<T, AppError>;

pub use auth::{AuthService, Principal};
pub use db::{HealthJournalStore, MedicationHistoryStore, UserStore};
use external::{DrugInfoClient, NewsClient};

/// Health check endpoint handler
/// Returns a JSON response with server status and timestamp
pub async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// Application state shared across all request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Settings>,
    pub db_pool: Arc<PgPool>,
    pub users: Arc<UserStore>,
    pub medications: Arc<MedicationHistoryStore>,
    pub journals: Arc<HealthJournalStore>,
    pub auth: Arc<AuthService>,
    pub drug_info: DrugInfoClient,
    pub news: NewsClient,
}

impl AppState {
    pub async fn new(config: Settings) -> Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(config.database.max_connections)
            .connect(&config.database.url)
            .await
            .map_err(|e| {
                AppError::DatabaseError(error::DatabaseError::ConnectionError(e.to_string()))
            })?;
        let db_pool = Arc::new(db_pool);

        Ok(Self::with_pool(config, db_pool))
    }

    /// Assemble state over an existing pool. Used by tests that bring their
    /// own database.
    pub fn with_pool(config: Settings, db_pool: Arc<PgPool>) -> Self {
        let auth = Arc::new(AuthService::new(
            config.auth.jwt_secret.clone(),
            config.auth.token_expiry_hours,
        ));
        let drug_info = DrugInfoClient::new(
            config.external.fda_base_url.clone(),
            config.external.dailymed_base_url.clone(),
        );
        let news = NewsClient::new(
            config.external.news_base_url.clone(),
            config.external.news_api_key.clone(),
        );

        Self {
            config: Arc::new(config),
            users: Arc::new(UserStore::new(db_pool.clone())),
            medications: Arc::new(MedicationHistoryStore::new(db_pool.clone())),
            journals: Arc::new(HealthJournalStore::new(db_pool.clone())),
            auth,
            drug_info,
            news,
            db_pool,
        }
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.db_pool.close().await;
        Ok(())
    }
}
