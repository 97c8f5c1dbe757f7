//! Chat pipeline - implements the orchestration flow
//!
//! PARSE → REFRESH → FORECAST → DECIDE → RESPOND
//!
//! Every failure branch terminates in a well-formed [`ChatResponse`]; nothing
//! on the chat path propagates an error to the HTTP layer. The dedicated
//! forecast entry point reports failures directly instead.

use crate::decision;
use crate::error::{DashboardError, Result};
use crate::etl::EtlPipeline;
use crate::forecast::Forecaster;
use crate::models::{
    AllocationDecision, ChatResponse, DataDomain, ForecastCommand, ForecastResults,
};
use crate::parser::{self, ChatIntent};
use crate::qa::QuestionAnswerer;
use crate::store::MarketStore;
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Shown when a forecast command violates the template.
pub const USAGE_HINT: &str =
    "Invalid forecast format. Please use: 'forecast [TICKER] for [DAYS] days in [CURRENCY]'";

/// Shown when the assistant returns an empty answer.
pub const REPHRASE_PROMPT: &str =
    "I'm here to help with your financial questions. Could you please rephrase your question?";

/// Shown when refresh/forecast/decision fails on the chat path.
pub const FORECAST_APOLOGY: &str =
    "Sorry, I couldn't generate that forecast right now. Please try again later.";

/// Shown when the assistant backend fails.
pub const TECHNICAL_DIFFICULTIES: &str =
    "I'm experiencing some technical difficulties. Please try again later.";

/// Drives one chat or forecast request through its collaborators.
/// All state is request-scoped; the pipeline itself holds only handles.
pub struct ChatPipeline {
    etl: Arc<dyn EtlPipeline>,
    forecaster: Arc<dyn Forecaster>,
    store: Arc<dyn MarketStore>,
    answerer: Arc<dyn QuestionAnswerer>,
}

impl ChatPipeline {
    pub fn new(
        etl: Arc<dyn EtlPipeline>,
        forecaster: Arc<dyn Forecaster>,
        store: Arc<dyn MarketStore>,
        answerer: Arc<dyn QuestionAnswerer>,
    ) -> Self {
        Self {
            etl,
            forecaster,
            store,
            answerer,
        }
    }

    /// Handle one chat message. Never returns an error: every branch,
    /// including collaborator failures, ends in a response.
    pub async fn handle_message(&self, message: &str) -> ChatResponse {
        let request_id = Uuid::new_v4();

        match parser::classify(message) {
            ChatIntent::Forecast(command) => {
                info!(
                    %request_id,
                    symbol = %command.symbol,
                    days = command.horizon_days,
                    "Handling forecast command"
                );

                match self.forecast_and_decide(&command).await {
                    Ok(decision) => ChatResponse::forecast(format!(
                        "Forecast completed for {}.\n\nDecision: {}\nJustification: {}",
                        command.symbol, decision.action, decision.justification
                    )),
                    Err(e) => {
                        // Operator-side record only; the user gets an apology
                        // without internals.
                        error!(%request_id, "Forecast branch failed: {}", e);
                        ChatResponse::general(FORECAST_APOLOGY)
                    }
                }
            }

            ChatIntent::Malformed { reason } => {
                info!(%request_id, "Rejected forecast command: {}", reason);
                ChatResponse::general(USAGE_HINT)
            }

            ChatIntent::General(text) => {
                info!(%request_id, "Handling general question");
                self.general_reply(request_id, &text).await
            }
        }
    }

    /// Forecast path for the chat boundary: refresh first (best-effort, one
    /// attempt, awaited before forecasting starts), then forecast, then
    /// compare against the last stored close.
    async fn forecast_and_decide(&self, command: &ForecastCommand) -> Result<AllocationDecision> {
        let symbols = vec![command.symbol.clone()];

        if let Err(e) = self.etl.refresh(DataDomain::Market, &symbols).await {
            warn!(
                "Refresh failed, forecasting against existing data: {}",
                e
            );
        }

        let results = self
            .forecaster
            .forecast(&symbols, command.horizon_days, &command.currency)
            .await?;

        let payload = results
            .get(&command.symbol)
            .ok_or_else(|| DashboardError::NoData(command.symbol.clone()))?;

        let last_close = self
            .store
            .last_close(&command.symbol)
            .await?
            .ok_or_else(|| {
                DashboardError::DecisionUnavailable(format!(
                    "no stored close for {}",
                    command.symbol
                ))
            })?;

        decision::decide(&payload.forecast, last_close, command.horizon_days)
    }

    async fn general_reply(&self, request_id: Uuid, text: &str) -> ChatResponse {
        match self.answerer.answer(text).await {
            Ok(answer) if answer.trim().is_empty() => ChatResponse::general(REPHRASE_PROMPT),
            Ok(answer) => ChatResponse::general(answer),
            Err(e) => {
                error!(%request_id, "Assistant backend failed: {}", e);
                ChatResponse::general(TECHNICAL_DIFFICULTIES)
            }
        }
    }

    /// Forecast path for the dedicated endpoint: the refresh is scheduled as
    /// a background task and the forecast runs immediately against current
    /// data. Forecasting failures propagate to the caller.
    pub async fn submit_forecast(&self, command: &ForecastCommand) -> Result<ForecastResults> {
        let symbols = vec![command.symbol.clone()];

        let etl = Arc::clone(&self.etl);
        let background_symbols = symbols.clone();
        tokio::spawn(async move {
            if let Err(e) = etl.refresh(DataDomain::Market, &background_symbols).await {
                warn!("Background refresh failed: {}", e);
            }
        });

        self.forecaster
            .forecast(&symbols, command.horizon_days, &command.currency)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forecast::MockForecaster;
    use crate::models::ResponseKind;
    use crate::qa::StaticAnswerer;
    use crate::store::{Bar, InMemoryMarketStore};
    use async_trait::async_trait;
    use chrono::NaiveDate;

    struct FailingEtl;

    #[async_trait]
    impl EtlPipeline for FailingEtl {
        async fn refresh(&self, _domain: DataDomain, _symbols: &[String]) -> Result<()> {
            Err(DashboardError::Refresh("ETL service unreachable".into()))
        }
    }

    struct FailingForecaster;

    #[async_trait]
    impl Forecaster for FailingForecaster {
        async fn forecast(
            &self,
            symbols: &[String],
            _days: u32,
            _currency: &str,
        ) -> Result<ForecastResults> {
            Err(DashboardError::NoData(symbols.join(",")))
        }
    }

    struct FailingAnswerer;

    #[async_trait]
    impl QuestionAnswerer for FailingAnswerer {
        async fn answer(&self, _question: &str) -> Result<String> {
            Err(DashboardError::Answer("rate limited".into()))
        }
    }

    async fn store_with_close(symbol: &str, close: f64) -> Arc<InMemoryMarketStore> {
        let store = InMemoryMarketStore::new();
        store
            .insert_series(
                symbol,
                vec![Bar {
                    date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
                    close,
                    volume: 100.0,
                }],
            )
            .await;
        Arc::new(store)
    }

    fn pipeline(
        etl: Arc<dyn EtlPipeline>,
        forecaster: Arc<dyn Forecaster>,
        store: Arc<dyn MarketStore>,
        answerer: Arc<dyn QuestionAnswerer>,
    ) -> ChatPipeline {
        ChatPipeline::new(etl, forecaster, store, answerer)
    }

    #[tokio::test]
    async fn test_forecast_command_yields_buy_response() {
        let pipeline = pipeline(
            Arc::new(crate::etl::NoopEtl),
            Arc::new(MockForecaster::rising(150.0)),
            store_with_close("AAPL", 150.0).await,
            Arc::new(StaticAnswerer::new("unused")),
        );

        let response = pipeline
            .handle_message("forecast AAPL for 30 days in USD")
            .await;

        assert_eq!(response.kind, ResponseKind::Forecast);
        assert!(response.text.contains("AAPL"));
        assert!(response.text.contains("BUY"));
    }

    #[tokio::test]
    async fn test_malformed_command_yields_usage_text() {
        let pipeline = pipeline(
            Arc::new(crate::etl::NoopEtl),
            Arc::new(MockForecaster::default()),
            Arc::new(InMemoryMarketStore::new()),
            Arc::new(StaticAnswerer::new("unused")),
        );

        let response = pipeline.handle_message("forecast AAPL for days in USD").await;

        assert_eq!(response.kind, ResponseKind::General);
        assert_eq!(response.text, USAGE_HINT);
    }

    #[tokio::test]
    async fn test_empty_answer_yields_rephrase_prompt() {
        let pipeline = pipeline(
            Arc::new(crate::etl::NoopEtl),
            Arc::new(MockForecaster::default()),
            Arc::new(InMemoryMarketStore::new()),
            Arc::new(StaticAnswerer::new("   ")),
        );

        let response = pipeline.handle_message("what is a P/E ratio?").await;

        assert_eq!(response.kind, ResponseKind::General);
        assert_eq!(response.text, REPHRASE_PROMPT);
    }

    #[tokio::test]
    async fn test_general_answer_passes_through() {
        let pipeline = pipeline(
            Arc::new(crate::etl::NoopEtl),
            Arc::new(MockForecaster::default()),
            Arc::new(InMemoryMarketStore::new()),
            Arc::new(StaticAnswerer::new("Price over earnings.")),
        );

        let response = pipeline.handle_message("what is a P/E ratio?").await;

        assert_eq!(response.kind, ResponseKind::General);
        assert_eq!(response.text, "Price over earnings.");
    }

    #[tokio::test]
    async fn test_assistant_failure_yields_apology() {
        let pipeline = pipeline(
            Arc::new(crate::etl::NoopEtl),
            Arc::new(MockForecaster::default()),
            Arc::new(InMemoryMarketStore::new()),
            Arc::new(FailingAnswerer),
        );

        let response = pipeline.handle_message("what is alpha?").await;

        assert_eq!(response.kind, ResponseKind::General);
        assert_eq!(response.text, TECHNICAL_DIFFICULTIES);
    }

    #[tokio::test]
    async fn test_refresh_failure_does_not_abort_forecast() {
        let pipeline = pipeline(
            Arc::new(FailingEtl),
            Arc::new(MockForecaster::rising(150.0)),
            store_with_close("AAPL", 150.0).await,
            Arc::new(StaticAnswerer::new("unused")),
        );

        let response = pipeline
            .handle_message("forecast AAPL for 30 days in USD")
            .await;

        assert_eq!(response.kind, ResponseKind::Forecast);
    }

    #[tokio::test]
    async fn test_forecaster_failure_yields_general_apology() {
        let pipeline = pipeline(
            Arc::new(crate::etl::NoopEtl),
            Arc::new(FailingForecaster),
            store_with_close("AAPL", 150.0).await,
            Arc::new(StaticAnswerer::new("unused")),
        );

        let response = pipeline
            .handle_message("forecast AAPL for 30 days in USD")
            .await;

        assert_eq!(response.kind, ResponseKind::General);
        assert_eq!(response.text, FORECAST_APOLOGY);
    }

    #[tokio::test]
    async fn test_missing_last_close_yields_general_apology() {
        let pipeline = pipeline(
            Arc::new(crate::etl::NoopEtl),
            Arc::new(MockForecaster::rising(150.0)),
            Arc::new(InMemoryMarketStore::new()),
            Arc::new(StaticAnswerer::new("unused")),
        );

        let response = pipeline
            .handle_message("forecast AAPL for 30 days in USD")
            .await;

        assert_eq!(response.kind, ResponseKind::General);
        assert_eq!(response.text, FORECAST_APOLOGY);
    }

    #[tokio::test]
    async fn test_submit_forecast_returns_results_directly() {
        let pipeline = pipeline(
            Arc::new(crate::etl::NoopEtl),
            Arc::new(MockForecaster::new(100.0, 1.0)),
            Arc::new(InMemoryMarketStore::new()),
            Arc::new(StaticAnswerer::new("unused")),
        );

        let command = ForecastCommand {
            symbol: "MSFT".to_string(),
            horizon_days: 5,
            currency: "USD".to_string(),
        };

        let results = pipeline.submit_forecast(&command).await.unwrap();
        assert_eq!(results.get("MSFT").unwrap().forecast.len(), 5);
    }

    #[tokio::test]
    async fn test_submit_forecast_surfaces_errors() {
        let pipeline = pipeline(
            Arc::new(crate::etl::NoopEtl),
            Arc::new(FailingForecaster),
            Arc::new(InMemoryMarketStore::new()),
            Arc::new(StaticAnswerer::new("unused")),
        );

        let command = ForecastCommand {
            symbol: "MSFT".to_string(),
            horizon_days: 5,
            currency: "USD".to_string(),
        };

        let err = pipeline.submit_forecast(&command).await.unwrap_err();
        assert!(err.is_no_data());
    }
}
