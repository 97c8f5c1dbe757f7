use portfolio_dashboard::{
    api::{start_server, ApiState},
    config::Config,
    dashboard::DashboardService,
    etl::{EtlPipeline, HttpEtlClient, NoopEtl},
    forecast::HttpForecaster,
    news::NewsClient,
    pipeline::ChatPipeline,
    qa::GroqClient,
    store::PgMarketStore,
};
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    // Load environment variables
    dotenv::dotenv().ok();

    let config = Config::from_env();
    config.validate();

    info!("Portfolio Dashboard API");
    info!("Port: {}", config.port);

    // Create collaborators
    let etl: Arc<dyn EtlPipeline> = if config.etl_base_url.is_empty() {
        warn!("ETL_BASE_URL not set, refreshes will be skipped");
        Arc::new(NoopEtl)
    } else {
        Arc::new(HttpEtlClient::new(config.etl_base_url.clone())?)
    };

    let forecaster = Arc::new(HttpForecaster::new(config.forecast_base_url.clone())?);
    let store = Arc::new(PgMarketStore::connect(&config.database_url)?);
    let answerer = Arc::new(GroqClient::new(config.groq_api_key.clone())?);

    let pipeline = Arc::new(ChatPipeline::new(
        etl,
        forecaster,
        store.clone(),
        answerer,
    ));

    let state = ApiState {
        pipeline,
        dashboard: Arc::new(DashboardService::new(store)),
        news: Arc::new(NewsClient::new(config.news_api_key.clone())?),
    };

    info!("Pipeline initialized");
    info!("Starting API server...");

    start_server(state, config.port).await?;

    Ok(())
}
