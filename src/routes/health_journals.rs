use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::guards::{ensure_correct_user_or_admin, Principal};
use crate::db::sql::UpdateData;
use crate::error::AppError;
use crate::AppState;

/// GET /users/{username}/health_journal
pub async fn get_health_journal(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let principal = Principal::from_request(&req, &state.auth);
    ensure_correct_user_or_admin(&principal, &username)?;

    let health_journal = state.journals.get(&username).await?;
    Ok(HttpResponse::Ok().json(json!({ "health_journal": health_journal })))
}

#[derive(Debug, Deserialize)]
pub struct JournalRequest {
    pub journal: String,
}

/// POST /users/{username}/health_journal — one journal per user; a second
/// create is rejected as a duplicate.
pub async fn create_health_journal(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<JournalRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let principal = Principal::from_request(&req, &state.auth);
    ensure_correct_user_or_admin(&principal, &username)?;

    let health_journal = state.journals.create(&username, &body.journal).await?;
    info!("Created health journal for {}", username);
    Ok(HttpResponse::Created().json(json!({ "health_journal": health_journal })))
}

#[derive(Debug, Deserialize)]
pub struct JournalUpdateRequest {
    pub journal: Option<String>,
}

/// PATCH /users/{username}/health_journal
pub async fn update_health_journal(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<JournalUpdateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let principal = Principal::from_request(&req, &state.auth);
    ensure_correct_user_or_admin(&principal, &username)?;

    let data = UpdateData::new().set_opt("journal", body.journal.clone());

    let health_journal = state.journals.update(&username, data).await?;
    info!("Updated health journal for {}", username);
    Ok(HttpResponse::Ok().json(json!({ "health_journal": health_journal })))
}

/// DELETE /users/{username}/health_journal
pub async fn delete_health_journal(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let principal = Principal::from_request(&req, &state.auth);
    ensure_correct_user_or_admin(&principal, &username)?;

    state.journals.remove(&username).await?;
    info!("Deleted health journal for {}", username);
    Ok(HttpResponse::Ok().json(json!({ "deleted": username })))
}
