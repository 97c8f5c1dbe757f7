//! Core data models for the dashboard backend

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

//
// ================= Enums =================
//

/// Discrete recommendation produced by the allocation decision engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum Action {
    Buy,
    Hold,
    Sell,
}

/// Which branch of the chat pipeline produced a response.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ResponseKind {
    General,
    Forecast,
}

/// Data domain tag handed to the ETL collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DataDomain {
    Market,
    Macro,
    News,
}

//
// ================= Chat =================
//

/// Structured form of `forecast <TICKER> for <DAYS> days in <CURRENCY>`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ForecastCommand {
    pub symbol: String,
    pub horizon_days: u32,
    pub currency: String,
}

/// Terminal output of the chat pipeline. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub text: String,
    pub kind: ResponseKind,
}

impl ChatResponse {
    pub fn general(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ResponseKind::General,
        }
    }

    pub fn forecast(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            kind: ResponseKind::Forecast,
        }
    }
}

//
// ================= Forecast =================
//

/// One predicted price on the forecast curve.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// Forecast payload for a single symbol. Owned transiently by the request
/// that produced it; nothing here is persisted by this crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolForecast {
    pub symbol: String,
    pub currency: String,
    pub forecast: Vec<ForecastPoint>,
}

impl SymbolForecast {
    /// Horizon-end value of the curve.
    pub fn end_value(&self) -> Option<f64> {
        self.forecast.last().map(|p| p.price)
    }
}

/// Mapping from symbol to forecast payload, as returned by the forecaster.
pub type ForecastResults = HashMap<String, SymbolForecast>;

//
// ================= Decision =================
//

/// Recommendation plus a human-readable account of the comparison behind it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AllocationDecision {
    pub action: Action,
    pub justification: String,
}

//
// ================= Dashboard Reads =================
//

/// Marks whether a dashboard read came from the live store or from the
/// known-good sample data substituted after a store failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum Sourced<T> {
    Live { data: T },
    Fallback { data: T, reason: String },
}

impl<T> Sourced<T> {
    pub fn data(&self) -> &T {
        match self {
            Sourced::Live { data } => data,
            Sourced::Fallback { data, .. } => data,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Sourced::Fallback { .. })
    }

    pub fn source_label(&self) -> &'static str {
        match self {
            Sourced::Live { .. } => "live",
            Sourced::Fallback { .. } => "fallback",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioOverview {
    #[serde(rename = "totalValue")]
    pub total_value: f64,
    #[serde(rename = "dailyChange")]
    pub daily_change: f64,
    #[serde(rename = "dailyChangePercent")]
    pub daily_change_percent: f64,
    #[serde(rename = "totalReturn")]
    pub total_return: f64,
    #[serde(rename = "totalReturnPercent")]
    pub total_return_percent: f64,
    pub allocation: HashMap<String, f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketQuote {
    pub symbol: String,
    pub price: f64,
    pub change: Option<f64>,
    #[serde(rename = "changePercent")]
    pub change_percent: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryPoint {
    pub date: NaiveDate,
    pub total_value: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub summary: String,
    pub sentiment: String,
    pub time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

//
// ================= Display =================
//

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Action::Buy => "BUY",
            Action::Hold => "HOLD",
            Action::Sell => "SELL",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for ResponseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ResponseKind::General => "general",
            ResponseKind::Forecast => "forecast",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for DataDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DataDomain::Market => "market",
            DataDomain::Macro => "macro",
            DataDomain::News => "news",
        };
        write!(f, "{}", s)
    }
}
