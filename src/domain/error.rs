use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestionError {
    #[error("Failed to parse CSV file: {0}")]
    Parse(String),

    #[error("Invalid date format: {0}")]
    InvalidDate(String),

    #[error("Invalid consumption value: {0}")]
    InvalidConsumption(String),

    #[error("Duplicate entry found. Each customer can only have one record per date.")]
    DuplicateEntry,

    #[error("Database error: {0}")]
    Database(String),
}
