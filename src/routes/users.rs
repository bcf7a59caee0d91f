use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::guards::{ensure_admin, ensure_correct_user_or_admin, Principal};
use crate::db::models::NewUser;
use crate::db::sql::UpdateData;
use crate::error::AppError;
use crate::AppState;

/// POST /users — admin-only user creation. Unlike self-registration the new
/// account may itself be an admin. Returns the user and a token for them.
pub async fn create_user(
    req: HttpRequest,
    body: web::Json<NewUser>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let principal = Principal::from_request(&req, &state.auth);
    ensure_admin(&principal)?;

    let user = state.users.register(&body).await?;
    let token = state.auth.create_token(&user)?;
    info!("Admin created user: {}", user.username);
    Ok(HttpResponse::Created().json(json!({ "user": user, "token": token })))
}

/// GET /users — admin-only listing.
pub async fn list_users(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let principal = Principal::from_request(&req, &state.auth);
    ensure_admin(&principal)?;

    let users = state.users.find_all().await?;
    Ok(HttpResponse::Ok().json(json!({ "users": users })))
}

/// GET /users/{username} — detail view with owned medication ids and
/// journal bodies. Self or admin.
pub async fn get_user(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let principal = Principal::from_request(&req, &state.auth);
    ensure_correct_user_or_admin(&principal, &username)?;

    let user = state.users.get(&username).await?;
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

#[derive(Debug, Deserialize)]
pub struct UserUpdateRequest {
    pub password: Option<String>,
    #[serde(rename = "isAdmin")]
    pub is_admin: Option<bool>,
}

/// PATCH /users/{username} — partial update over password and the admin
/// flag. Self or admin.
pub async fn update_user(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<UserUpdateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let principal = Principal::from_request(&req, &state.auth);
    ensure_correct_user_or_admin(&principal, &username)?;

    let data = UpdateData::new()
        .set_opt("password", body.password.clone())
        .set_opt("isAdmin", body.is_admin);

    let user = state.users.update(&username, data).await?;
    info!("Updated user: {}", username);
    Ok(HttpResponse::Ok().json(json!({ "user": user })))
}

/// DELETE /users/{username} — self or admin.
pub async fn delete_user(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let principal = Principal::from_request(&req, &state.auth);
    ensure_correct_user_or_admin(&principal, &username)?;

    state.users.remove(&username).await?;
    info!("Deleted user: {}", username);
    Ok(HttpResponse::Ok().json(json!({ "deleted": username })))
}
