//! # kbchat
//!
//! Conversation session engine for chat clients of a knowledge-base
//! question-answering service.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use kbchat::prelude::*;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = HttpChatClient::new("http://localhost:8000")?;
//!     let store = FileStore::open(".kbchat").await?;
//!
//!     let (observer, mut events) = ChannelObserver::new();
//!     let session = SessionManager::builder()
//!         .client(Arc::new(client))
//!         .store(LocalStore::new(Arc::new(store)))
//!         .observer(Arc::new(observer))
//!         .build()
//!         .await?;
//!
//!     tokio::spawn(async move {
//!         while let Some(event) = events.recv().await {
//!             if let SessionEvent::MessageUpdated { message, .. } = event {
//!                 println!("{}", message.content);
//!             }
//!         }
//!     });
//!
//!     let outcome = session
//!         .send_question("What is the refund policy?", &ExchangeConfig::default())
//!         .await?;
//!     for source in outcome.message().sources.iter().flatten() {
//!         println!("{} ({})", source.filename(), source.score_label());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **`kbchat-client`**: HTTP client and `data:` event-stream decoder
//! - **`kbchat-persist`**: history index and message logs over a key/value store
//! - **`kbchat-session`**: exchange state machine, transcript and notifications

pub mod prelude;

pub use kbchat_client::{
    decode_event_stream, ChatClient, ChatOptions, ChatRequest, ChatResponse, ClientConfig,
    EventStream, HttpChatClient, HttpChatClientBuilder, Source, SourceMetadata, StreamDecoder,
    StreamEvent, DEFAULT_API_BASE,
};

pub use kbchat_persist::{
    truncate_title, ChatMessage, ConversationId, FileStore, HistoryEntry, HistoryIndex,
    KeyValueStore, LocalStore, MemoryStore, MessageRole, PersistError,
};

pub use kbchat_session::{
    ChannelObserver, ExchangeConfig, ExchangeOutcome, SessionError, SessionEvent, SessionManager,
    SessionManagerBuilder, SessionObserver, ERROR_MESSAGE,
};
