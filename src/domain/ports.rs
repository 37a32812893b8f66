use async_trait::async_trait;
use crate::domain::{
    error::IngestionError,
    models::{CleanReading, MeterReading, ReadingsPage},
};

#[async_trait]
pub trait MeterDataRepository: Send + Sync {
    async fn insert_readings(&self, readings: &[CleanReading]) -> Result<usize, IngestionError>;
}

#[async_trait]
pub trait PreviewReader: Send + Sync {
    async fn recent_readings(&self, limit: usize) -> Result<Vec<MeterReading>, IngestionError>;

    async fn readings_page(&self, page: usize, page_size: usize) -> Result<ReadingsPage, IngestionError>;
}
