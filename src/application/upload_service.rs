use std::sync::Arc;
use chrono::{DateTime, NaiveDate};
use tracing::{info, debug, error, warn};
use crate::domain::{
    error::IngestionError,
    models::{CleanReading, RawReading, UploadStatus},
    ports::MeterDataRepository,
};

const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

pub struct UploadService {
    meter_repo: Arc<dyn MeterDataRepository>,
}

impl UploadService {
    pub fn new(meter_repo: Arc<dyn MeterDataRepository>) -> Self {
        Self { meter_repo }
    }

    pub async fn ingest(&self, rows: Vec<RawReading>) -> UploadStatus {
        info!("Starting ingestion of {} raw row(s)", rows.len());

        // Step 1: Drop rows missing any of the three fields
        debug!("Step 1: Filtering incomplete rows");
        let total = rows.len();
        let candidates: Vec<RawReading> = rows.into_iter().filter(RawReading::is_complete).collect();
        let dropped = total - candidates.len();
        if dropped > 0 {
            warn!("Dropped {} incomplete row(s) out of {}", dropped, total);
        }

        // Step 2: Validate and normalize survivors in source order.
        // One bad field rejects the whole batch, nothing reaches the store.
        debug!("Step 2: Validating {} row(s)", candidates.len());
        let mut clean = Vec::with_capacity(candidates.len());
        for row in &candidates {
            match validate_reading(row) {
                Ok(reading) => clean.push(reading),
                Err(e) => {
                    error!("Validation failed: {}", e);
                    return UploadStatus::Invalid { reason: e.to_string() };
                }
            }
        }

        // Step 3: Nothing survived
        if clean.is_empty() {
            info!("No valid rows to insert");
            return UploadStatus::NoValidData;
        }

        // Step 4: Submit the full batch as one bulk insert
        debug!("Step 4: Inserting batch of {} reading(s)", clean.len());
        match self.meter_repo.insert_readings(&clean).await {
            Ok(count) => {
                info!("✅ Successfully inserted {} reading(s)", count);
                UploadStatus::Inserted { count }
            }
            Err(IngestionError::DuplicateEntry) => {
                warn!("Batch rejected by store: duplicate (customer_id, date) pair");
                UploadStatus::Duplicate
            }
            Err(e) => {
                error!("Failed to insert batch: {}", e);
                UploadStatus::Failed { reason: e.to_string() }
            }
        }
    }
}

fn validate_reading(raw: &RawReading) -> Result<CleanReading, IngestionError> {
    let date_text = raw.date.as_deref().unwrap_or_default();
    let date = parse_reading_date(date_text)
        .ok_or_else(|| IngestionError::InvalidDate(date_text.to_string()))?;

    let kwh_text = raw.consumption_kwh.as_deref().unwrap_or_default();
    let consumption = kwh_text.trim().parse::<f64>().ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
        .ok_or_else(|| IngestionError::InvalidConsumption(kwh_text.to_string()))?;

    Ok(CleanReading {
        customer_id: raw.customer_id.as_deref().unwrap_or_default().trim().to_string(),
        date,
        consumption_kwh: consumption,
    })
}

// Calendar-date formats first, then RFC 3339 timestamps (date component only).
fn parse_reading_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    DateTime::parse_from_rfc3339(trimmed).ok().map(|dt| dt.date_naive())
}
