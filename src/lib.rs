//! Portfolio Dashboard Backend
//!
//! Serves portfolio, market, news and chat data to the web frontend. The
//! chat path orchestrates the forecast flow:
//!
//! PARSE → REFRESH → FORECAST → DECIDE → RESPOND
//!
//! External collaborators (ETL service, forecasting service, market store,
//! question-answering backend) sit behind traits so every branch of the
//! pipeline is testable without them.

pub mod api;
pub mod config;
pub mod dashboard;
pub mod decision;
pub mod error;
pub mod etl;
pub mod forecast;
pub mod models;
pub mod news;
pub mod parser;
pub mod pipeline;
pub mod qa;
pub mod store;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use parser::{classify, ChatIntent};
