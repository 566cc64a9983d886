use chrono::{DateTime, Utc};
use kbchat_client::Source;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

/// One turn of a conversation
///
/// Assistant messages start out pending while their answer streams in and
/// are finalized exactly once. Pending state is in-memory only: it is not
/// serialized, so everything read back from storage is final.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(skip)]
    pending: bool,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
            sources: None,
            timestamp: super::now_millis(),
            pending: false,
        }
    }

    /// Finalized assistant answer; an empty source list is stored as none
    pub fn assistant(content: impl Into<String>, sources: Option<Vec<Source>>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
            sources: sources.filter(|s| !s.is_empty()),
            timestamp: super::now_millis(),
            pending: false,
        }
    }

    /// Empty assistant placeholder awaiting its answer
    pub fn pending_assistant() -> Self {
        Self {
            pending: true,
            ..Self::assistant(String::new(), None)
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending
    }

    /// Append streamed text; ignored once finalized
    pub fn push_content(&mut self, delta: &str) -> bool {
        if !self.pending {
            return false;
        }
        self.content.push_str(delta);
        true
    }

    /// Freeze the message with its final text and sources
    pub fn finalize(&mut self, content: String, sources: Option<Vec<Source>>) {
        self.content = content;
        self.sources = sources.filter(|s| !s.is_empty());
        self.pending = false;
    }
}
