use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user row, minus the password hash. This is the shape every API
/// response uses; the hash never leaves the database layer.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub username: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
}

/// Detail view for a single user: the user row plus the ids of their
/// medication-history entries and the bodies of their journals.
#[derive(Debug, Clone, Serialize)]
pub struct UserDetail {
    pub username: String,
    #[serde(rename = "isAdmin")]
    pub is_admin: bool,
    pub medication_history: Vec<i32>,
    pub health_journal: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    #[serde(rename = "isAdmin", default)]
    pub is_admin: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MedicationHistory {
    pub id: i32,
    pub username: String,
    #[serde(rename = "drugName")]
    pub drug_name: String,
    pub status: String,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "stopDate")]
    pub stop_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewMedicationHistory {
    pub username: String,
    #[serde(rename = "drugName")]
    pub drug_name: String,
    pub status: String,
    #[serde(rename = "startDate")]
    pub start_date: NaiveDate,
    #[serde(rename = "stopDate")]
    pub stop_date: Option<NaiveDate>,
}

/// At most one journal row exists per user; `username` is the key.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct HealthJournal {
    pub username: String,
    pub journal: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_serializes_with_camel_case_admin_flag() {
        let user = User {
            username: "u1".to_string(),
            is_admin: true,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert_eq!(json["username"], "u1");
        assert_eq!(json["isAdmin"], true);
        assert!(json.get("is_admin").is_none());
    }

    #[test]
    fn test_new_user_admin_flag_defaults_to_false() {
        let user: NewUser =
            serde_json::from_str(r#"{"username": "u1", "password": "secret"}"#).unwrap();
        assert!(!user.is_admin);
    }

    #[test]
    fn test_medication_history_json_field_names() {
        let json = r#"{
            "username": "u1",
            "drugName": "amlodipine",
            "status": "active",
            "startDate": "2023-01-01",
            "stopDate": null
        }"#;
        let entry: NewMedicationHistory = serde_json::from_str(json).unwrap();
        assert_eq!(entry.drug_name, "amlodipine");
        assert_eq!(entry.start_date, NaiveDate::from_ymd_opt(2023, 1, 1).unwrap());
        assert!(entry.stop_date.is_none());
    }
}
