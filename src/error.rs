//! Error types for the dashboard backend

use thiserror::Error;

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

#[derive(Error, Debug)]
pub enum DashboardError {

    // =============================
    // Chat Pipeline Errors
    // =============================

    #[error("Invalid forecast command: {0}")]
    InvalidCommand(String),

    #[error("Data refresh failed: {0}")]
    Refresh(String),

    #[error("No stored data for symbol: {0}")]
    NoData(String),

    #[error("Forecasting failed: {0}")]
    Forecast(String),

    #[error("Decision unavailable: {0}")]
    DecisionUnavailable(String),

    #[error("Assistant backend failed: {0}")]
    Answer(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("News fetch failed: {0}")]
    News(String),

    // =============================
    // External Library Conversions
    // =============================

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Whether the backing store simply has nothing for the requested symbol,
    /// as opposed to the forecasting routine itself failing.
    pub fn is_no_data(&self) -> bool {
        matches!(self, DashboardError::NoData(_))
    }
}
