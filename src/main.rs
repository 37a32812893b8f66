use meter_ingestion::collect_service::CollectService;
use tracing::{info, debug};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env()
            .add_directive("meter_ingestion=debug".parse().unwrap())
            .add_directive("reqwest=warn".parse().unwrap())
            .add_directive("hyper=warn".parse().unwrap()))
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting meter data collection");
    debug!("Environment variables: SUPABASE_URL={}, METER_TABLE={}",
        std::env::var("SUPABASE_URL").unwrap_or_else(|_| "not set".to_string()),
        std::env::var("METER_TABLE").unwrap_or_else(|_| "not set".to_string())
    );

    let service = CollectService::new()?;
    info!("Collect service initialized successfully");

    service.run().await
}
