use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::source::Source;

/// Body shared by `POST /api/v1/chat` and `POST /api/v1/chat/stream`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatRequest {
    pub question: String,
    #[serde(flatten)]
    pub options: ChatOptions,
}

impl ChatRequest {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            options: ChatOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ChatOptions) -> Self {
        self.options = options;
        self
    }
}

/// Retrieval/generation knobs sent with every question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatOptions {
    pub top_k: u32,
    pub temperature: f32,
    pub use_cache: bool,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            top_k: 5,
            temperature: 0.1,
            use_cache: true,
        }
    }
}

impl ChatOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn top_k(mut self, top_k: u32) -> Self {
        self.top_k = top_k;
        self
    }

    pub fn temperature(mut self, temp: f32) -> Self {
        self.temperature = temp;
        self
    }

    pub fn use_cache(mut self, enabled: bool) -> Self {
        self.use_cache = enabled;
        self
    }
}

/// Single-shot answer from `POST /api/v1/chat`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
    #[serde(default)]
    pub cached: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processing_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl ChatResponse {
    /// Cited sources, `None` when the server sent none
    pub fn into_sources(self) -> Option<Vec<Source>> {
        self.sources.filter(|s| !s.is_empty())
    }
}
