use crate::streaming::StreamEvent;
use crate::types::{ChatRequest, ChatResponse};
use anyhow::Result;
use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

/// Lazily decoded response stream
///
/// `Err` items are transport failures; malformed records never surface here.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent>> + Send>>;

/// Question-answering API
///
/// Provides both the single-shot and the streaming endpoint.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Non-streaming answer
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse>;

    /// Streaming answer
    ///
    /// Fails before yielding anything when the server rejects the request.
    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream>;
}
