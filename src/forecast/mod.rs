//! Forecaster trait and implementations
//!
//! The forecaster is an external collaborator that turns stored time series
//! into a forecast curve per symbol. The pipeline only requires that its
//! failures distinguish "no data for this symbol" from "forecasting broke".

use crate::models::ForecastResults;
use crate::Result;
use async_trait::async_trait;

pub mod http;
pub use http::HttpForecaster;

/// Trait for forecast generation.
#[async_trait]
pub trait Forecaster: Send + Sync {
    /// Produce a forecast curve per symbol over `days` future days,
    /// denominated in `currency`.
    async fn forecast(
        &self,
        symbols: &[String],
        days: u32,
        currency: &str,
    ) -> Result<ForecastResults>;
}

/// Mock forecaster for development & testing.
/// Produces a deterministic linear curve so the pipeline stays functional
/// without the forecasting service.
pub struct MockForecaster {
    pub start: f64,
    pub step: f64,
}

impl MockForecaster {
    pub fn new(start: f64, step: f64) -> Self {
        Self { start, step }
    }

    /// Curve that rises well past the buy threshold over any horizon.
    pub fn rising(start: f64) -> Self {
        Self::new(start, start * 0.01)
    }
}

impl Default for MockForecaster {
    fn default() -> Self {
        Self::new(100.0, 0.5)
    }
}

#[async_trait]
impl Forecaster for MockForecaster {
    async fn forecast(
        &self,
        symbols: &[String],
        days: u32,
        currency: &str,
    ) -> Result<ForecastResults> {
        use crate::models::{ForecastPoint, SymbolForecast};
        use chrono::Utc;

        let today = Utc::now().date_naive();

        let results = symbols
            .iter()
            .map(|symbol| {
                let forecast = (1..=days as u64)
                    .map(|i| ForecastPoint {
                        date: today + chrono::Days::new(i),
                        price: self.start + self.step * i as f64,
                    })
                    .collect();

                (
                    symbol.clone(),
                    SymbolForecast {
                        symbol: symbol.clone(),
                        currency: currency.to_string(),
                        forecast,
                    },
                )
            })
            .collect();

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_forecaster_curve_shape() {
        let forecaster = MockForecaster::new(100.0, 1.0);
        let results = forecaster
            .forecast(&["AAPL".to_string()], 5, "USD")
            .await
            .unwrap();

        let payload = results.get("AAPL").unwrap();
        assert_eq!(payload.forecast.len(), 5);
        assert_eq!(payload.end_value(), Some(105.0));
        assert_eq!(payload.currency, "USD");
    }
}
