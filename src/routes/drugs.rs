use actix_web::{web, HttpRequest, HttpResponse};
use serde_json::json;
use tracing::info;

use crate::auth::guards::{ensure_logged_in, Principal};
use crate::error::AppError;
use crate::AppState;

/// GET /drugs/{name} — drug-label lookup, proxied from the drug-information
/// API. Any authenticated user.
pub async fn get_drug_info(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let principal = Principal::from_request(&req, &state.auth);
    ensure_logged_in(&principal)?;

    let drug = path.into_inner();
    info!("Drug info lookup: {}", drug);
    let label = state.drug_info.get_drug_info(&drug).await?;
    Ok(HttpResponse::Ok().json(json!({ "drug": label })))
}

/// GET /spls/{set_id} — full SPL document for a DailyMed set id, returned
/// as the XML the upstream serves. Any authenticated user.
pub async fn get_spl_document(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let principal = Principal::from_request(&req, &state.auth);
    ensure_logged_in(&principal)?;

    let set_id = path.into_inner();
    info!("SPL document lookup: {}", set_id);
    let document = state.drug_info.get_spl_document(&set_id).await?;
    Ok(HttpResponse::Ok()
        .content_type("application/xml")
        .body(document))
}

/// GET /news — current health headlines, proxied from the news API. Any
/// authenticated user.
pub async fn get_health_news(
    req: HttpRequest,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let principal = Principal::from_request(&req, &state.auth);
    ensure_logged_in(&principal)?;

    let headlines = state.news.top_health_headlines().await?;
    Ok(HttpResponse::Ok().json(headlines))
}
