//! Thin clients for the third-party drug-information and news APIs.
//!
//! These are opaque fetchers: one request, one JSON response, no retry or
//! backoff. Base URLs come from configuration so tests can point them at a
//! local mock server.

use serde_json::Value;

use crate::error::AppError;

/// Client for the drug-information APIs: openFDA label search and DailyMed
/// SPL documents.
#[derive(Clone)]
pub struct DrugInfoClient {
    http: reqwest::Client,
    fda_base_url: String,
    dailymed_base_url: String,
}

impl DrugInfoClient {
    pub fn new(fda_base_url: String, dailymed_base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            fda_base_url,
            dailymed_base_url,
        }
    }

    /// Look up the first drug-label record matching a drug name.
    pub async fn get_drug_info(&self, drug: &str) -> Result<Value, AppError> {
        let url = format!("{}/drug/label.json", self.fda_base_url);
        let res = self
            .http
            .get(&url)
            .query(&[
                ("search", format!("description:{}", drug.to_lowercase())),
                ("limit", "1".to_string()),
            ])
            .send()
            .await?;

        let body: Value = res.json().await?;
        match body["results"].as_array().and_then(|r| r.first()) {
            Some(result) => Ok(result.clone()),
            None => Err(AppError::BadRequest("Drug information not found".to_string())),
        }
    }

    /// Fetch the SPL document for a DailyMed set id. The document is XML;
    /// it is passed through verbatim for the client to render.
    pub async fn get_spl_document(&self, set_id: &str) -> Result<String, AppError> {
        let url = format!(
            "{}/dailymed/services/v2/spls/{}.xml",
            self.dailymed_base_url, set_id
        );
        let res = self.http.get(&url).send().await?;

        if !res.status().is_success() {
            return Err(AppError::NotFound(format!("No SPL document: {}", set_id)));
        }

        Ok(res.text().await?)
    }
}

/// Client for the news API's health-headline endpoint.
#[derive(Clone)]
pub struct NewsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl NewsClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
            api_key,
        }
    }

    /// Top US health headlines about drugs, passed through verbatim.
    pub async fn top_health_headlines(&self) -> Result<Value, AppError> {
        let url = format!("{}/v2/top-headlines", self.base_url);
        let res = self
            .http
            .get(&url)
            .header("X-Api-Key", &self.api_key)
            .query(&[
                ("q", "drug"),
                ("category", "health"),
                ("language", "en"),
                ("country", "us"),
            ])
            .send()
            .await?;

        let body: Value = res.json().await?;
        Ok(body)
    }
}
