//! Question-answering collaborator
//!
//! Handles the general branch of the chat pipeline. The answer comes back as
//! a plain return value; an empty string is a legitimate outcome the caller
//! substitutes with a rephrase prompt.

use crate::Result;
use async_trait::async_trait;

pub mod groq;
pub use groq::GroqClient;

/// Trait for answering free-form financial questions.
#[async_trait]
pub trait QuestionAnswerer: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String>;
}

/// Canned answerer for development & testing.
pub struct StaticAnswerer {
    pub reply: String,
}

impl StaticAnswerer {
    pub fn new(reply: impl Into<String>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl QuestionAnswerer for StaticAnswerer {
    async fn answer(&self, _question: &str) -> Result<String> {
        Ok(self.reply.clone())
    }
}
