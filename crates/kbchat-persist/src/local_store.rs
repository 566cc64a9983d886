use std::sync::Arc;

use crate::dbs::MemoryStore;
use crate::error::{PersistError, Result};
use crate::models::{ChatMessage, ConversationId, HistoryEntry};
use crate::store::KeyValueStore;

/// Key holding the serialized history index
pub const INDEX_KEY: &str = "chatHistory";

/// Prefix of the per-conversation message log keys
pub const MESSAGES_KEY_PREFIX: &str = "chat_msgs_";

/// Typed access to the history index and message logs
///
/// Reads fail soft: a missing or unreadable value is logged and treated as
/// empty. Writes report their errors to the caller.
#[derive(Clone)]
pub struct LocalStore {
    backend: Arc<dyn KeyValueStore>,
}

impl LocalStore {
    pub fn new(backend: Arc<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    pub fn messages_key(id: &ConversationId) -> String {
        format!("{}{}", MESSAGES_KEY_PREFIX, id)
    }

    /// History index, newest first; empty when absent or unreadable
    pub async fn get_index(&self) -> Vec<HistoryEntry> {
        self.try_get_index().await.unwrap_or_else(|e| {
            tracing::warn!(error = %e, key = INDEX_KEY, "Unreadable history index, treating as empty");
            Vec::new()
        })
    }

    pub async fn try_get_index(&self) -> Result<Vec<HistoryEntry>> {
        match self.backend.get(INDEX_KEY).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    pub async fn set_index(&self, entries: &[HistoryEntry]) -> Result<()> {
        let raw = serde_json::to_string(entries)?;
        self.backend.set(INDEX_KEY, raw).await
    }

    /// Message log in append order; empty when absent or unreadable
    pub async fn get_messages(&self, id: &ConversationId) -> Vec<ChatMessage> {
        self.try_get_messages(id).await.unwrap_or_else(|e| {
            tracing::warn!(
                error = %e,
                conversation_id = %id,
                "Unreadable message log, treating as empty"
            );
            Vec::new()
        })
    }

    pub async fn try_get_messages(&self, id: &ConversationId) -> Result<Vec<ChatMessage>> {
        match self.backend.get(&Self::messages_key(id)).await? {
            Some(raw) => Ok(serde_json::from_str(&raw)?),
            None => Ok(Vec::new()),
        }
    }

    /// Append one finalized message to a conversation's log
    ///
    /// An unreadable existing log is replaced by a log holding only this
    /// message.
    pub async fn append_message(&self, id: &ConversationId, message: &ChatMessage) -> Result<()> {
        if message.is_pending() {
            return Err(PersistError::PendingMessage);
        }

        let mut messages = self.get_messages(id).await;
        messages.push(message.clone());

        let raw = serde_json::to_string(&messages)?;
        self.backend.set(&Self::messages_key(id), raw).await?;

        tracing::debug!(conversation_id = %id, count = messages.len(), "Message appended");
        Ok(())
    }

    pub async fn delete_messages(&self, id: &ConversationId) -> Result<()> {
        self.backend.remove(&Self::messages_key(id)).await
    }
}
