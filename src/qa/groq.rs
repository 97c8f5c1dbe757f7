//! Groq API client for the general chat branch
//!
//! Calls the OpenAI-compatible chat-completions endpoint with a long-lived
//! reqwest::Client for connection pooling.

use crate::error::DashboardError;
use crate::Result;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

use super::QuestionAnswerer;

const SYSTEM_PROMPT: &str = "You are a concise financial assistant for a \
portfolio dashboard. Answer questions about markets, instruments and \
portfolio concepts in a few sentences. Do not give personalized investment \
advice.";

/// Reusable Groq client (connection-pooled).
pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct Message {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Message,
}

impl GroqClient {
    pub fn new(api_key: String) -> Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://api.groq.com/openai/v1/chat/completions".to_string(),
            model: "llama-3.3-70b-versatile".to_string(),
        })
    }
}

#[async_trait]
impl QuestionAnswerer for GroqClient {
    async fn answer(&self, question: &str) -> Result<String> {
        if self.api_key.is_empty() {
            return Err(DashboardError::Answer(
                "GROQ_API_KEY not configured".to_string(),
            ));
        }

        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                Message {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                Message {
                    role: "user".to_string(),
                    content: question.to_string(),
                },
            ],
            temperature: 0.3,
            max_tokens: 512,
        };

        info!("Calling Groq API");

        let response = self
            .client
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                error!("Groq API request failed: {}", e);
                DashboardError::Answer(format!("Groq API error: {}", e))
            })?;

        if !response.status().is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("Groq API error response: {}", error_text);
            return Err(DashboardError::Answer(format!(
                "Groq API error: {}",
                error_text
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Groq response: {}", e);
            DashboardError::Answer(format!("Groq parse error: {}", e))
        })?;

        let answer = completion
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();

        Ok(answer)
    }
}
