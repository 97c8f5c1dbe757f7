//! HTTP client for the external forecasting service
//!
//! Uses a long-lived reqwest::Client for connection pooling. Responses are
//! expected as a mapping from symbol to forecast payload.

use crate::error::DashboardError;
use crate::models::ForecastResults;
use crate::Result;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::info;

use super::Forecaster;

/// Forecasting service client (connection-pooled).
pub struct HttpForecaster {
    client: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct ForecastRequest<'a> {
    symbols: &'a [String],
    days: u32,
    currency: &'a str,
}

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    results: ForecastResults,
}

impl HttpForecaster {
    pub fn new(base_url: String) -> Result<Self> {
        // Model fits can take a while on cold symbols.
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl Forecaster for HttpForecaster {
    async fn forecast(
        &self,
        symbols: &[String],
        days: u32,
        currency: &str,
    ) -> Result<ForecastResults> {
        let url = format!("{}/forecast", self.base_url);

        info!("Requesting {}-day forecast for {:?}", days, symbols);

        let response = self
            .client
            .post(&url)
            .json(&ForecastRequest {
                symbols,
                days,
                currency,
            })
            .send()
            .await
            .map_err(|e| DashboardError::Forecast(format!("forecast request failed: {}", e)))?;

        let status = response.status();

        if status == StatusCode::NOT_FOUND || status == StatusCode::UNPROCESSABLE_ENTITY {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::NoData(format!(
                "{} ({})",
                symbols.join(","),
                body
            )));
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::Forecast(format!(
                "forecast service returned {}: {}",
                status, body
            )));
        }

        let parsed: ForecastResponse = response
            .json()
            .await
            .map_err(|e| DashboardError::Forecast(format!("invalid forecast payload: {}", e)))?;

        if parsed.results.is_empty() {
            return Err(DashboardError::NoData(symbols.join(",")));
        }

        Ok(parsed.results)
    }
}
