//! Data refresh trigger
//!
//! Delegates time-series refreshes to the external ETL service before a
//! forecast runs. Refreshes are best-effort: callers log failures and keep
//! going against whatever data already exists.

use crate::error::{DashboardError, Result};
use crate::models::DataDomain;
use reqwest::Client;
use serde_json::json;
use std::time::Duration;

/// Trait for requesting a refresh of stored time series.
#[async_trait::async_trait]
pub trait EtlPipeline: Send + Sync {
    async fn refresh(&self, domain: DataDomain, symbols: &[String]) -> Result<()>;
}

/// HTTP-backed ETL client. Posts refresh requests to the configured service.
pub struct HttpEtlClient {
    client: Client,
    base_url: String,
}

impl HttpEtlClient {
    pub fn new(base_url: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(60))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait::async_trait]
impl EtlPipeline for HttpEtlClient {
    async fn refresh(&self, domain: DataDomain, symbols: &[String]) -> Result<()> {
        let url = format!("{}/refresh", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({
                "domain": domain,
                "symbols": symbols,
            }))
            .send()
            .await
            .map_err(|e| DashboardError::Refresh(format!("ETL request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::Refresh(format!(
                "ETL service returned {}: {}",
                status, body
            )));
        }

        Ok(())
    }
}

/// Inert ETL stand-in for development & testing.
/// Keeps the pipeline functional when no ETL service is configured.
pub struct NoopEtl;

#[async_trait::async_trait]
impl EtlPipeline for NoopEtl {
    async fn refresh(&self, _domain: DataDomain, _symbols: &[String]) -> Result<()> {
        Ok(())
    }
}
