use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::db::models::NewUser;
use crate::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
}

/// POST /auth/token — exchange username/password for a bearer token.
pub async fn login(
    req: web::Json<LoginRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received login request for username: {}", req.username);
    match state.users.authenticate(&req.username, &req.password).await {
        Ok(user) => {
            let token = state.auth.create_token(&user)?;
            info!("Login successful for username: {}", req.username);
            Ok(HttpResponse::Ok().json(AuthResponse { token }))
        }
        Err(e) => {
            error!("Login failed for username: {}: {}", req.username, e);
            Err(e)
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub password: String,
}

/// POST /auth/register — self-registration. Never creates an admin; admin
/// accounts go through the admin-only POST /users route.
pub async fn register(
    req: web::Json<RegisterRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    info!("Received registration request for username: {}", req.username);

    let new_user = NewUser {
        username: req.username.clone(),
        password: req.password.clone(),
        is_admin: false,
    };

    let user = match state.users.register(&new_user).await {
        Ok(user) => {
            info!("Registration successful for username: {}", req.username);
            user
        }
        Err(e) => {
            error!("Registration failed for username: {}: {}", req.username, e);
            return Err(e);
        }
    };

    let token = state.auth.create_token(&user)?;
    Ok(HttpResponse::Created().json(AuthResponse { token }))
}
