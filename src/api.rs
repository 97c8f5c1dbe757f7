//! REST API server for the portfolio dashboard
//!
//! Exposes the chat pipeline and dashboard reads via HTTP endpoints
//! Integrates with the frontend UI

use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::dashboard::DashboardService;
use crate::models::{ForecastCommand, ResponseKind, Sourced};
use crate::news::NewsClient;
use crate::pipeline::ChatPipeline;

/// =============================
/// Request / Response Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct ChatMessageBody {
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponseBody {
    pub response: String,
    #[serde(rename = "type")]
    pub kind: ResponseKind,
}

#[derive(Debug, Deserialize)]
pub struct ForecastRequestBody {
    pub ticker: String,
    pub days: u32,
    pub currency: String,
}

#[derive(Debug, Deserialize)]
pub struct TradeRequestBody {
    pub symbol: String,
    pub quantity: u32,
    pub action: String,
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub pipeline: Arc<ChatPipeline>,
    pub dashboard: Arc<DashboardService>,
    pub news: Arc<NewsClient>,
}

/// =============================
/// Helpers
/// =============================

fn error_body(status: StatusCode, detail: String) -> (StatusCode, Json<Value>) {
    (status, Json(json!({ "detail": detail })))
}

fn sourced_body<T: Serialize>(sourced: &Sourced<T>) -> Json<Value> {
    Json(json!({
        "source": sourced.source_label(),
        "data": sourced.data(),
    }))
}

/// =============================
/// Liveness
/// =============================

async fn root() -> Json<Value> {
    Json(json!({ "message": "Portfolio Dashboard API is running" }))
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": Utc::now().to_rfc3339(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    Json(body): Json<ChatMessageBody>,
) -> Json<ChatResponseBody> {
    let response = state.pipeline.handle_message(&body.message).await;

    Json(ChatResponseBody {
        response: response.text,
        kind: response.kind,
    })
}

/// =============================
/// Forecast Endpoint
/// =============================

async fn forecast_handler(
    State(state): State<ApiState>,
    Json(body): Json<ForecastRequestBody>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if body.days == 0 {
        return Err(error_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            "days must be at least 1".to_string(),
        ));
    }

    let command = ForecastCommand {
        symbol: body.ticker.to_uppercase(),
        horizon_days: body.days,
        currency: body.currency.to_uppercase(),
    };

    match state.pipeline.submit_forecast(&command).await {
        Ok(results) => Ok(Json(json!({
            "status": "success",
            "results": results,
        }))),
        Err(e) => Err(error_body(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Error generating forecast: {}", e),
        )),
    }
}

/// =============================
/// Dashboard Endpoints
/// =============================

async fn portfolio_handler(State(state): State<ApiState>) -> Json<Value> {
    sourced_body(&state.dashboard.portfolio_overview().await)
}

async fn portfolio_history_handler(State(state): State<ApiState>) -> Json<Value> {
    sourced_body(&state.dashboard.portfolio_history().await)
}

async fn market_data_handler(State(state): State<ApiState>) -> Json<Value> {
    sourced_body(&state.dashboard.market_quotes().await)
}

async fn news_handler(
    State(state): State<ApiState>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    match state.news.top_headlines().await {
        Ok(items) => Ok(Json(json!(items))),
        Err(e) => Err(error_body(
            StatusCode::BAD_GATEWAY,
            format!("News fetch failed: {}", e),
        )),
    }
}

async fn sentiment_handler() -> Json<Value> {
    // Static snapshot; the sentiment scoring service lives elsewhere.
    Json(json!({
        "sentiment": "Bullish",
        "confidence": 85,
        "factors": [
            "Strong earnings reports from tech sector",
            "Positive GDP growth indicators",
            "Stable inflation rates",
        ],
    }))
}

/// =============================
/// Trade Endpoint (mock execution)
/// =============================

async fn trade_handler(Json(body): Json<TradeRequestBody>) -> Json<Value> {
    let now = Utc::now();

    Json(json!({
        "status": "success",
        "message": format!(
            "Successfully {} {} shares of {}",
            body.action, body.quantity, body.symbol
        ),
        "orderId": format!("ORD{}", now.format("%Y%m%d%H%M%S")),
        "timestamp": now.to_rfc3339(),
    }))
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/chat", post(chat_handler))
        .route("/api/forecast", post(forecast_handler))
        .route("/api/portfolio", get(portfolio_handler))
        .route("/api/portfolio/history", get(portfolio_history_handler))
        .route("/api/market-data", get(market_data_handler))
        .route("/api/news", get(news_handler))
        .route("/api/analytics/sentiment", get(sentiment_handler))
        .route("/api/trade", post(trade_handler))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
