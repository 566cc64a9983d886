//! Prelude module for convenient imports
//!
//! ```rust
//! use kbchat::prelude::*;
//! ```

pub use crate::{
    ChannelObserver, ChatClient, ChatMessage, ConversationId, ExchangeConfig, ExchangeOutcome,
    FileStore, HistoryEntry, HttpChatClient, LocalStore, MemoryStore, MessageRole, SessionError,
    SessionEvent, SessionManager, SessionObserver, Source, StreamEvent,
};
