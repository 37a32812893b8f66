use std::sync::Arc;
use tracing::{info, error, debug, warn};
use crate::{
    application::upload_service::UploadService,
    domain::{
        models::{RawReading, UploadStatus},
        ports::PreviewReader,
    },
    infrastructure::{
        parsers::csv_parser::parse_csv,
        supabase::meter_repo::SupabaseMeterRepository,
    },
};

const RECENT_PREVIEW_LIMIT: usize = 5;
const PREVIEW_PAGE_SIZE: usize = 10;

pub struct CollectService {
    service: UploadService,
    preview: Arc<dyn PreviewReader>,
}

impl CollectService {
    pub fn new() -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        debug!("Initializing collect service");

        let base_url = std::env::var("SUPABASE_URL")
            .expect("SUPABASE_URL environment variable is required");
        let api_key = std::env::var("SUPABASE_ANON_KEY")
            .expect("SUPABASE_ANON_KEY environment variable is required");
        let table = std::env::var("METER_TABLE").unwrap_or_else(|_| "meter_data".to_string());
        info!("Using Supabase endpoint: {}, table: {}", base_url, table);

        let repo = Arc::new(SupabaseMeterRepository::new(base_url, api_key, table));
        let service = UploadService::new(repo.clone());
        debug!("Supabase repository and upload service initialized");

        Ok(Self { service, preview: repo })
    }

    pub async fn run(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let args: Vec<String> = std::env::args().skip(1).collect();

        let rows = match args.as_slice() {
            [flag, customer_id, date, kwh] if flag == "--manual" => {
                info!("Manual entry: customer_id={}, date={}, consumption_kwh={}", customer_id, date, kwh);
                vec![RawReading {
                    customer_id: Some(customer_id.clone()),
                    date: Some(date.clone()),
                    consumption_kwh: Some(kwh.clone()),
                }]
            }
            [path] => {
                info!("Reading CSV file: {}", path);
                let bytes = tokio::fs::read(path).await.map_err(|e| {
                    error!("Failed to read {}: {}", path, e);
                    e
                })?;
                debug!("Read {} bytes from {}", bytes.len(), path);

                match parse_csv(&bytes) {
                    Ok(rows) => rows,
                    Err(e) => {
                        error!("CSV parse failed: {}", e);
                        println!("❌ Failed to parse CSV file");
                        return Ok(());
                    }
                }
            }
            _ => {
                eprintln!("Usage: meter_ingestion <readings.csv>");
                eprintln!("       meter_ingestion --manual <customer_id> <date> <consumption_kwh>");
                return Ok(());
            }
        };

        let status = self.service.ingest(rows).await;
        println!("{}", render_status(&status));

        self.print_preview().await;
        Ok(())
    }

    async fn print_preview(&self) {
        match self.preview.recent_readings(RECENT_PREVIEW_LIMIT).await {
            Ok(readings) if readings.is_empty() => println!("No data available yet."),
            Ok(readings) => {
                println!("Recent readings:");
                for reading in &readings {
                    println!(
                        "  {:>6}  {:<16} {}  {:.2} kWh",
                        reading.id, reading.customer_id, reading.date, reading.consumption_kwh
                    );
                }
            }
            Err(e) => warn!("Failed to fetch recent preview: {}", e),
        }

        match self.preview.readings_page(1, PREVIEW_PAGE_SIZE).await {
            Ok(page) => println!("Showing {} of {} record(s)", page.readings.len(), page.total_count),
            Err(e) => warn!("Failed to fetch paginated preview: {}", e),
        }
    }
}

fn render_status(status: &UploadStatus) -> String {
    match status {
        UploadStatus::Inserted { count } => format!("✅ Successfully uploaded {} record(s)!", count),
        UploadStatus::NoValidData => "❌ No valid data found to upload.".to_string(),
        UploadStatus::Duplicate => {
            "❌ Duplicate entry found. Each customer can only have one record per date.".to_string()
        }
        UploadStatus::Invalid { reason } | UploadStatus::Failed { reason } => {
            format!("❌ Failed to upload data: {}", reason)
        }
    }
}
