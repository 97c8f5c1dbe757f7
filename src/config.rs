//! Runtime configuration
//!
//! Built once at startup from the environment and threaded explicitly into
//! every component that needs it. Components never read env vars themselves.

use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct Config {
    /// Postgres connection string for the market data store.
    pub database_url: String,
    /// Base URL of the ETL service that refreshes stored time series.
    /// Empty means refreshes are skipped (best-effort policy still holds).
    pub etl_base_url: String,
    /// Base URL of the forecasting service.
    pub forecast_base_url: String,
    /// API key for the Groq chat-completions backend.
    pub groq_api_key: String,
    /// API key for the news headlines provider.
    pub news_api_key: String,
    /// Port the HTTP server binds to.
    pub port: u16,
}

impl Config {
    /// Load configuration from the environment. Missing values fall back to
    /// development defaults; `validate` reports what is absent.
    pub fn from_env() -> Self {
        let port = env::var("PORT")
            .or_else(|_| env::var("API_PORT"))
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(8000);

        Self {
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/financial_data".to_string()),
            etl_base_url: env::var("ETL_BASE_URL").unwrap_or_default(),
            forecast_base_url: env::var("FORECAST_BASE_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:8001".to_string()),
            groq_api_key: env::var("GROQ_API_KEY").unwrap_or_default(),
            news_api_key: env::var("NEWS_API_KEY").unwrap_or_default(),
            port,
        }
    }

    /// Log every essential key that is missing. Returns false if any are,
    /// but never aborts: endpoints degrade per-collaborator instead.
    pub fn validate(&self) -> bool {
        let mut missing = Vec::new();

        if self.database_url.is_empty() {
            missing.push("DATABASE_URL");
        }
        if self.etl_base_url.is_empty() {
            missing.push("ETL_BASE_URL");
        }
        if self.groq_api_key.is_empty() {
            missing.push("GROQ_API_KEY");
        }
        if self.news_api_key.is_empty() {
            missing.push("NEWS_API_KEY");
        }

        if missing.is_empty() {
            return true;
        }

        warn!("Missing configuration keys: {}", missing.join(", "));
        false
    }
}
