use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawReading {
    pub customer_id: Option<String>,
    pub date: Option<String>,
    pub consumption_kwh: Option<String>,
}

impl RawReading {
    pub fn is_complete(&self) -> bool {
        fn filled(field: &Option<String>) -> bool {
            field.as_deref().is_some_and(|v| !v.trim().is_empty())
        }
        filled(&self.customer_id) && filled(&self.date) && filled(&self.consumption_kwh)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanReading {
    pub customer_id: String,
    pub date: NaiveDate,
    pub consumption_kwh: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MeterReading {
    pub id: i64,
    pub customer_id: String,
    pub date: NaiveDate,
    pub consumption_kwh: f64,
}

#[derive(Debug, Clone)]
pub struct ReadingsPage {
    pub readings: Vec<MeterReading>,
    pub total_count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UploadStatus {
    Inserted { count: usize },
    NoValidData,
    Duplicate,
    Invalid { reason: String },
    Failed { reason: String },
}
