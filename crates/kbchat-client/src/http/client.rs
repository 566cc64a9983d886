// HTTP client for the knowledge-base chat API

use crate::streaming::decode_event_stream;
use crate::traits::{ChatClient, EventStream};
use crate::types::{ChatRequest, ChatResponse};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use std::time::Duration;

/// API base used when none is configured
pub const DEFAULT_API_BASE: &str = "http://localhost:8000";

const CHAT_PATH: &str = "/api/v1/chat";
const CHAT_STREAM_PATH: &str = "/api/v1/chat/stream";

/// Chat API client (plain HTTP + JSON)
#[derive(Debug, Clone)]
pub struct HttpChatClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl HttpChatClient {
    /// Create a client for the given API base, e.g. `http://localhost:8000`
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::builder().base_url(base_url).build()
    }

    pub fn builder() -> HttpChatClientBuilder {
        HttpChatClientBuilder::default()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST the request and fail on any non-success status
    async fn post(&self, path: &str, request: &ChatRequest) -> Result<reqwest::Response> {
        let url = self.endpoint(path);
        tracing::debug!(url = %url, top_k = request.options.top_k, "Sending chat request");

        let response = self
            .http_client
            .post(&url)
            .json(request)
            .send()
            .await
            .with_context(|| format!("Failed to send request to {}", url))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat API error ({}): {}", status, error_text);
        }

        Ok(response)
    }
}

#[async_trait]
impl ChatClient for HttpChatClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let response = self.post(CHAT_PATH, &request).await?;

        let body: ChatResponse = response
            .json()
            .await
            .context("Failed to parse chat response")?;

        tracing::debug!(
            cached = body.cached,
            processing_time = ?body.processing_time,
            request_id = ?body.request_id,
            "Chat response received"
        );

        Ok(body)
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        let response = self.post(CHAT_STREAM_PATH, &request).await?;
        Ok(decode_event_stream(response.bytes_stream()))
    }
}

/// Builder for [`HttpChatClient`]
#[derive(Debug, Default)]
pub struct HttpChatClientBuilder {
    base_url: Option<String>,
    connect_timeout: Option<Duration>,
}

impl HttpChatClientBuilder {
    /// API base; a trailing slash is dropped
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Connection timeout (streamed bodies are not time-limited)
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HttpChatClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim()
            .trim_end_matches('/')
            .to_string();

        if base_url.is_empty() {
            anyhow::bail!("API base URL must not be empty");
        }
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            anyhow::bail!("API base URL must start with http:// or https://: {}", base_url);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/event-stream"),
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }

        let http_client = builder.build().context("Failed to create HTTP client")?;

        Ok(HttpChatClient {
            http_client,
            base_url,
        })
    }
}
