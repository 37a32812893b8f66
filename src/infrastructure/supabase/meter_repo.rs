use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn, error};
use crate::domain::{
    error::IngestionError,
    models::{CleanReading, MeterReading, ReadingsPage},
    ports::{MeterDataRepository, PreviewReader},
};

// Postgres error code PostgREST reports for a violated unique constraint.
const UNIQUE_VIOLATION_CODE: &str = "23505";

pub struct SupabaseMeterRepository {
    client: Client,
    base_url: String,
    api_key: String,
    table: String,
}

#[derive(Deserialize)]
struct PostgrestErrorBody {
    code: Option<String>,
    message: Option<String>,
}

impl SupabaseMeterRepository {
    pub fn new(base_url: String, api_key: String, table: String) -> Self {
        debug!("Initializing Supabase repository for table: {}", table);
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            table,
        }
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.base_url, self.table)
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }
}

#[async_trait]
impl MeterDataRepository for SupabaseMeterRepository {
    async fn insert_readings(&self, readings: &[CleanReading]) -> Result<usize, IngestionError> {
        debug!("Inserting {} reading(s) into table: {}", readings.len(), self.table);

        let response = self.client
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .header("Prefer", "return=minimal")
            .json(readings)
            .send()
            .await
            .map_err(|e| {
                error!("Insert request to {} failed: {}", self.table, e);
                IngestionError::Database(e.to_string())
            })?;

        let status = response.status();
        if status.is_success() {
            info!("✅ Successfully inserted {} reading(s) into table: {}", readings.len(), self.table);
            return Ok(readings.len());
        }

        let body = response.text().await.unwrap_or_default();
        if is_unique_violation(status.as_u16(), &body) {
            warn!("Store rejected batch for {}: unique constraint violated", self.table);
            return Err(IngestionError::DuplicateEntry);
        }

        error!("Insert into {} failed with {}: {}", self.table, status, body);
        Err(IngestionError::Database(format!("{}: {}", status, postgrest_message(&body))))
    }
}

#[async_trait]
impl PreviewReader for SupabaseMeterRepository {
    async fn recent_readings(&self, limit: usize) -> Result<Vec<MeterReading>, IngestionError> {
        let url = format!("{}?select=*&order=id.desc&limit={}", self.table_url(), limit);
        debug!("Fetching {} most recent reading(s) from {}", limit, self.table);

        let response = self.get(&url).send().await.map_err(|e| {
            error!("Preview request failed: {}", e);
            IngestionError::Database(e.to_string())
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Preview query on {} failed with {}: {}", self.table, status, body);
            return Err(IngestionError::Database(format!("{}: {}", status, postgrest_message(&body))));
        }

        let readings: Vec<MeterReading> = response.json().await.map_err(|e| {
            error!("Failed to decode preview response: {}", e);
            IngestionError::Database(e.to_string())
        })?;

        debug!("Fetched {} recent reading(s)", readings.len());
        Ok(readings)
    }

    async fn readings_page(&self, page: usize, page_size: usize) -> Result<ReadingsPage, IngestionError> {
        let page = page.max(1);
        let from = (page - 1) * page_size;
        let to = from + page_size - 1;
        let url = format!("{}?select=*&order=id.desc", self.table_url());
        debug!("Fetching page {} (items {}-{}) from {}", page, from, to, self.table);

        let response = self.get(&url)
            .header("Range-Unit", "items")
            .header("Range", format!("{}-{}", from, to))
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|e| {
                error!("Paginated request failed: {}", e);
                IngestionError::Database(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Paginated query on {} failed with {}: {}", self.table, status, body);
            return Err(IngestionError::Database(format!("{}: {}", status, postgrest_message(&body))));
        }

        let total_count = response
            .headers()
            .get("content-range")
            .and_then(|v| v.to_str().ok())
            .and_then(content_range_total)
            .unwrap_or(0);

        let readings: Vec<MeterReading> = response.json().await.map_err(|e| {
            error!("Failed to decode page response: {}", e);
            IngestionError::Database(e.to_string())
        })?;

        debug!("Fetched {} reading(s), {} total in store", readings.len(), total_count);
        Ok(ReadingsPage { readings, total_count })
    }
}

fn is_unique_violation(status: u16, body: &str) -> bool {
    if status != 409 {
        return false;
    }
    serde_json::from_str::<PostgrestErrorBody>(body)
        .ok()
        .and_then(|b| b.code)
        .is_some_and(|code| code == UNIQUE_VIOLATION_CODE)
}

fn postgrest_message(body: &str) -> String {
    serde_json::from_str::<PostgrestErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or_else(|| body.to_string())
}

// Content-Range comes back as "0-9/57" (or "*/57" past the end of the data).
fn content_range_total(header: &str) -> Option<usize> {
    header.rsplit('/').next()?.trim().parse().ok()
}
