//! Business headlines client
//!
//! Fetches top business headlines from a NewsAPI-compatible service and maps
//! them to the dashboard's news items. No fallback here: the endpoint
//! surfaces fetch failures to the frontend.

use crate::error::DashboardError;
use crate::models::NewsItem;
use crate::Result;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const PAGE_SIZE: u8 = 8;

pub struct NewsClient {
    client: Client,
    api_key: String,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct HeadlinesResponse {
    #[serde(default)]
    articles: Vec<Article>,
}

#[derive(Debug, Deserialize)]
struct Article {
    title: String,
    description: Option<String>,
    #[serde(rename = "publishedAt")]
    published_at: String,
    url: Option<String>,
}

impl NewsClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .timeout(Duration::from_secs(7))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://newsapi.org/v2/top-headlines".to_string(),
        })
    }

    pub async fn top_headlines(&self) -> Result<Vec<NewsItem>> {
        if self.api_key.is_empty() {
            return Err(DashboardError::News(
                "NEWS_API_KEY not configured".to_string(),
            ));
        }

        let page_size = PAGE_SIZE.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("category", "business"),
                ("language", "en"),
                ("pageSize", page_size.as_str()),
                ("apiKey", self.api_key.as_str()),
            ])
            .send()
            .await
            .map_err(|e| DashboardError::News(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::News(format!(
                "news provider returned {}",
                status
            )));
        }

        let parsed: HeadlinesResponse = response
            .json()
            .await
            .map_err(|e| DashboardError::News(format!("invalid payload: {}", e)))?;

        let items = parsed
            .articles
            .into_iter()
            .map(|a| NewsItem {
                title: a.title,
                summary: a.description.unwrap_or_default(),
                // Sentiment scoring lives in a separate service; headlines
                // arrive unscored.
                sentiment: "neutral".to_string(),
                time: a.published_at,
                url: a.url,
            })
            .collect();

        Ok(items)
    }
}
