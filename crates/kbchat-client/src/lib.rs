pub mod types;
pub mod traits;
pub mod streaming;
pub mod buffer_utils;
pub mod http;
pub mod config;

pub use traits::{ChatClient, EventStream};
pub use streaming::{decode_event_stream, StreamEvent, StreamPayload};
pub use buffer_utils::{CircularLineBuffer, StreamDecoder};
pub use http::{HttpChatClient, HttpChatClientBuilder, DEFAULT_API_BASE};
pub use config::ClientConfig;
pub use types::{ChatOptions, ChatRequest, ChatResponse, Source, SourceMetadata, UNKNOWN_FILENAME};
