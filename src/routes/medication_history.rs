use actix_web::{web, HttpRequest, HttpResponse};
use chrono::NaiveDate;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::auth::guards::{ensure_correct_user_or_admin, Principal};
use crate::db::models::NewMedicationHistory;
use crate::db::sql::{SqlValue, UpdateData};
use crate::error::AppError;
use crate::AppState;

/// GET /users/{username}/med_history — all entries owned by the user.
pub async fn list_medication_history(
    req: HttpRequest,
    path: web::Path<String>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let principal = Principal::from_request(&req, &state.auth);
    ensure_correct_user_or_admin(&principal, &username)?;

    let medication_history = state.medications.find_all(&username).await?;
    Ok(HttpResponse::Ok().json(json!({ "medication_history": medication_history })))
}

/// GET /users/{username}/med_history/{id}
pub async fn get_medication_history(
    req: HttpRequest,
    path: web::Path<(String, i32)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (username, id) = path.into_inner();
    let principal = Principal::from_request(&req, &state.auth);
    // Authorization is decided on the path owner before the row is read; an
    // unauthorized caller gets the same denial whether or not the id exists.
    ensure_correct_user_or_admin(&principal, &username)?;

    let medication_history = state.medications.get(id).await?;
    Ok(HttpResponse::Ok().json(json!({ "medication_history": medication_history })))
}

#[derive(Debug, Deserialize)]
pub struct MedicationHistoryRequest {
    #[serde(rename = "drugName")]
    pub drug_name: String,
    pub status: String,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "stopDate")]
    pub stop_date: Option<NaiveDate>,
}

/// POST /users/{username}/med_history — the owner comes from the path, not
/// the body.
pub async fn create_medication_history(
    req: HttpRequest,
    path: web::Path<String>,
    body: web::Json<MedicationHistoryRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let username = path.into_inner();
    let principal = Principal::from_request(&req, &state.auth);
    ensure_correct_user_or_admin(&principal, &username)?;

    let data = NewMedicationHistory {
        username: username.clone(),
        drug_name: body.drug_name.clone(),
        status: body.status.clone(),
        start_date: body.start_date,
        stop_date: body.stop_date,
    };

    let medication_history = state.medications.create(&data).await?;
    info!("Created medication history {} for {}", medication_history.id, username);
    Ok(HttpResponse::Created().json(json!({ "medication_history": medication_history })))
}

#[derive(Debug, Deserialize)]
pub struct MedicationHistoryUpdateRequest {
    pub status: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<NaiveDate>,
    // Double Option: absent leaves the column untouched, an explicit JSON
    // null clears it.
    #[serde(rename = "stopDate", default, deserialize_with = "double_option")]
    pub stop_date: Option<Option<NaiveDate>>,
}

fn double_option<'de, D>(deserializer: D) -> Result<Option<Option<NaiveDate>>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Option::<NaiveDate>::deserialize(deserializer).map(Some)
}

/// PATCH /users/{username}/med_history/{id} — partial update; absent fields
/// are left untouched, an entirely empty body is a bad request.
pub async fn update_medication_history(
    req: HttpRequest,
    path: web::Path<(String, i32)>,
    body: web::Json<MedicationHistoryUpdateRequest>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (username, id) = path.into_inner();
    let principal = Principal::from_request(&req, &state.auth);
    ensure_correct_user_or_admin(&principal, &username)?;

    let data = UpdateData::new()
        .set_opt("status", body.status.clone())
        .set_opt("start_date", body.start_date)
        .set_opt(
            "stop_date",
            body.stop_date
                .map(|date| date.map(SqlValue::from).unwrap_or(SqlValue::Null)),
        );

    let medication_history = state.medications.update(id, data).await?;
    info!("Updated medication history {} for {}", id, username);
    Ok(HttpResponse::Ok().json(json!({ "medication_history": medication_history })))
}

/// DELETE /users/{username}/med_history/{id}
pub async fn delete_medication_history(
    req: HttpRequest,
    path: web::Path<(String, i32)>,
    state: web::Data<AppState>,
) -> Result<HttpResponse, AppError> {
    let (username, id) = path.into_inner();
    let principal = Principal::from_request(&req, &state.auth);
    ensure_correct_user_or_admin(&principal, &username)?;

    state.medications.remove(id).await?;
    info!("Deleted medication history {} for {}", id, username);
    Ok(HttpResponse::Ok().json(json!({ "deleted": id })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sql::{sql_for_partial_update, ColumnMap};

    fn payload(body: &str) -> UpdateData {
        let req: MedicationHistoryUpdateRequest = serde_json::from_str(body).unwrap();
        UpdateData::new()
            .set_opt("status", req.status.clone())
            .set_opt("start_date", req.start_date)
            .set_opt(
                "stop_date",
                req.stop_date
                    .map(|date| date.map(SqlValue::from).unwrap_or(SqlValue::Null)),
            )
    }

    #[test]
    fn test_absent_stop_date_is_left_untouched() {
        let data = payload(r#"{"status": "inactive"}"#);
        let update = sql_for_partial_update(data, &ColumnMap::default()).unwrap();
        assert_eq!(update.set_clause, "status = $1");
    }

    #[test]
    fn test_explicit_null_clears_stop_date() {
        let data = payload(r#"{"status": "active", "stopDate": null}"#);
        let update = sql_for_partial_update(data, &ColumnMap::default()).unwrap();
        assert_eq!(update.set_clause, "status = $1, stop_date = $2");
        assert_eq!(update.values[1], SqlValue::Null);
    }

    #[test]
    fn test_supplied_stop_date_binds_as_date() {
        let data = payload(r#"{"stopDate": "2023-01-02"}"#);
        let update = sql_for_partial_update(data, &ColumnMap::default()).unwrap();
        assert_eq!(update.set_clause, "stop_date = $1");
        assert_eq!(
            update.values[0],
            SqlValue::Date(NaiveDate::from_ymd_opt(2023, 1, 2).unwrap())
        );
    }
}
