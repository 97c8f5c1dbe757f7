//! Market data store
//!
//! Read-side access to the stored time series: the last-close lookup the
//! decision engine needs plus the aggregates behind the dashboard endpoints.
//! Writes belong to the external ETL service; this crate never inserts.

use crate::error::{DashboardError, Result};
use crate::models::{HistoryPoint, MarketQuote};
use chrono::NaiveDate;
use sqlx::postgres::PgPoolOptions;
use sqlx::{PgPool, Row};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for reading stored market data.
#[async_trait::async_trait]
pub trait MarketStore: Send + Sync {
    /// Most recent closing price for a symbol, if any rows exist.
    async fn last_close(&self, symbol: &str) -> Result<Option<f64>>;

    /// Latest quote per symbol with day-over-day change.
    async fn latest_quotes(&self) -> Result<Vec<MarketQuote>>;

    /// Total value (close * volume summed) on the most recent stored date.
    async fn portfolio_total(&self) -> Result<Option<f64>>;

    /// Total value per stored date, oldest first.
    async fn daily_totals(&self) -> Result<Vec<HistoryPoint>>;
}

/// Postgres-backed store over the `market_data` table.
pub struct PgMarketStore {
    pool: PgPool,
}

impl PgMarketStore {
    /// Connect lazily so startup succeeds without a reachable database;
    /// individual reads fail instead and the dashboard layer degrades.
    pub fn connect(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect_lazy(database_url)
            .map_err(|e| DashboardError::Database(format!("invalid database URL: {}", e)))?;

        Ok(Self { pool })
    }
}

fn db_err(context: &str, e: sqlx::Error) -> DashboardError {
    DashboardError::Database(format!("{}: {}", context, e))
}

#[async_trait::async_trait]
impl MarketStore for PgMarketStore {
    async fn last_close(&self, symbol: &str) -> Result<Option<f64>> {
        let row = sqlx::query(
            "SELECT close FROM market_data WHERE symbol = $1 ORDER BY date DESC LIMIT 1",
        )
        .bind(symbol)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_err("failed to load last close", e))?;

        match row {
            Some(row) => {
                let close: f64 = row
                    .try_get("close")
                    .map_err(|e| db_err("bad close column", e))?;
                Ok(Some(close))
            }
            None => Ok(None),
        }
    }

    async fn latest_quotes(&self) -> Result<Vec<MarketQuote>> {
        let rows = sqlx::query(
            r#"
            SELECT symbol, close, change, change_percent FROM (
              SELECT symbol, date, close,
                     close - LAG(close) OVER (PARTITION BY symbol ORDER BY date) AS change,
                     (close / NULLIF(LAG(close) OVER (PARTITION BY symbol ORDER BY date), 0) - 1) * 100
                       AS change_percent
              FROM market_data
            ) latest
            WHERE date = (SELECT MAX(date) FROM market_data)
            ORDER BY symbol
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("failed to load quotes", e))?;

        let mut quotes = Vec::with_capacity(rows.len());
        for row in rows {
            quotes.push(MarketQuote {
                symbol: row
                    .try_get("symbol")
                    .map_err(|e| db_err("bad symbol column", e))?,
                price: row
                    .try_get("close")
                    .map_err(|e| db_err("bad close column", e))?,
                change: row.try_get("change").ok(),
                change_percent: row.try_get("change_percent").ok(),
            });
        }

        Ok(quotes)
    }

    async fn portfolio_total(&self) -> Result<Option<f64>> {
        let row = sqlx::query(
            r#"
            SELECT SUM(close * volume)::DOUBLE PRECISION AS total_value
            FROM market_data
            WHERE date = (SELECT MAX(date) FROM market_data)
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_err("failed to load portfolio total", e))?;

        Ok(row.try_get("total_value").ok())
    }

    async fn daily_totals(&self) -> Result<Vec<HistoryPoint>> {
        let rows = sqlx::query(
            r#"
            SELECT date, SUM(close * volume)::DOUBLE PRECISION AS total_value
            FROM market_data
            GROUP BY date
            ORDER BY date ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_err("failed to load portfolio history", e))?;

        let mut points = Vec::with_capacity(rows.len());
        for row in rows {
            points.push(HistoryPoint {
                date: row
                    .try_get("date")
                    .map_err(|e| db_err("bad date column", e))?,
                total_value: row
                    .try_get("total_value")
                    .map_err(|e| db_err("bad total column", e))?,
            });
        }

        Ok(points)
    }
}

/// One stored bar in the in-memory store.
#[derive(Debug, Clone, Copy)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
    pub volume: f64,
}

/// In-memory store for development & testing.
#[derive(Default)]
pub struct InMemoryMarketStore {
    series: Arc<RwLock<HashMap<String, Vec<Bar>>>>,
}

impl InMemoryMarketStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert bars for a symbol, keeping them ordered by date.
    pub async fn insert_series(&self, symbol: &str, mut bars: Vec<Bar>) {
        bars.sort_by_key(|b| b.date);
        let mut series = self.series.write().await;
        series.insert(symbol.to_string(), bars);
    }
}

#[async_trait::async_trait]
impl MarketStore for InMemoryMarketStore {
    async fn last_close(&self, symbol: &str) -> Result<Option<f64>> {
        let series = self.series.read().await;
        Ok(series
            .get(symbol)
            .and_then(|bars| bars.last())
            .map(|bar| bar.close))
    }

    async fn latest_quotes(&self) -> Result<Vec<MarketQuote>> {
        let series = self.series.read().await;

        let mut quotes: Vec<MarketQuote> = series
            .iter()
            .filter_map(|(symbol, bars)| {
                let last = bars.last()?;
                let prev = bars.len().checked_sub(2).and_then(|i| bars.get(i));
                let change = prev.map(|p| last.close - p.close);
                let change_percent = prev.and_then(|p| {
                    if p.close == 0.0 {
                        None
                    } else {
                        Some((last.close / p.close - 1.0) * 100.0)
                    }
                });
                Some(MarketQuote {
                    symbol: symbol.clone(),
                    price: last.close,
                    change,
                    change_percent,
                })
            })
            .collect();

        quotes.sort_by(|a, b| a.symbol.cmp(&b.symbol));
        Ok(quotes)
    }

    async fn portfolio_total(&self) -> Result<Option<f64>> {
        let series = self.series.read().await;

        let max_date = series
            .values()
            .filter_map(|bars| bars.last())
            .map(|bar| bar.date)
            .max();

        let Some(max_date) = max_date else {
            return Ok(None);
        };

        let total = series
            .values()
            .filter_map(|bars| bars.iter().find(|b| b.date == max_date))
            .map(|bar| bar.close * bar.volume)
            .sum();

        Ok(Some(total))
    }

    async fn daily_totals(&self) -> Result<Vec<HistoryPoint>> {
        let series = self.series.read().await;

        let mut by_date: HashMap<NaiveDate, f64> = HashMap::new();
        for bars in series.values() {
            for bar in bars {
                *by_date.entry(bar.date).or_insert(0.0) += bar.close * bar.volume;
            }
        }

        let mut points: Vec<HistoryPoint> = by_date
            .into_iter()
            .map(|(date, total_value)| HistoryPoint { date, total_value })
            .collect();

        points.sort_by_key(|p| p.date);
        Ok(points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    #[tokio::test]
    async fn test_last_close_is_latest_bar() {
        let store = InMemoryMarketStore::new();
        store
            .insert_series(
                "AAPL",
                vec![
                    Bar { date: d(2), close: 151.0, volume: 10.0 },
                    Bar { date: d(1), close: 150.0, volume: 10.0 },
                ],
            )
            .await;

        assert_eq!(store.last_close("AAPL").await.unwrap(), Some(151.0));
        assert_eq!(store.last_close("MSFT").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_quotes_carry_day_over_day_change() {
        let store = InMemoryMarketStore::new();
        store
            .insert_series(
                "AAPL",
                vec![
                    Bar { date: d(1), close: 100.0, volume: 1.0 },
                    Bar { date: d(2), close: 110.0, volume: 1.0 },
                ],
            )
            .await;

        let quotes = store.latest_quotes().await.unwrap();
        assert_eq!(quotes.len(), 1);
        assert_eq!(quotes[0].price, 110.0);
        assert_eq!(quotes[0].change, Some(10.0));
        assert!((quotes[0].change_percent.unwrap() - 10.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_daily_totals_aggregate_across_symbols() {
        let store = InMemoryMarketStore::new();
        store
            .insert_series("A", vec![Bar { date: d(1), close: 10.0, volume: 2.0 }])
            .await;
        store
            .insert_series("B", vec![Bar { date: d(1), close: 5.0, volume: 4.0 }])
            .await;

        let totals = store.daily_totals().await.unwrap();
        assert_eq!(totals.len(), 1);
        assert_eq!(totals[0].total_value, 40.0);
    }
}
