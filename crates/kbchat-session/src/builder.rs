use anyhow::{anyhow, Result};
use std::sync::Arc;

use kbchat_client::ChatClient;
use kbchat_persist::{HistoryIndex, LocalStore};

use crate::observer::SessionObserver;
use crate::session::SessionManager;

/// Builder for [`SessionManager`]
pub struct SessionManagerBuilder {
    client: Option<Arc<dyn ChatClient>>,
    store: Option<LocalStore>,
    observers: Vec<Arc<dyn SessionObserver>>,
}

impl SessionManagerBuilder {
    pub fn new() -> Self {
        Self {
            client: None,
            store: None,
            observers: Vec::new(),
        }
    }

    /// Set the question-answering client
    pub fn client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the history store; defaults to an in-memory store
    pub fn store(mut self, store: LocalStore) -> Self {
        self.store = Some(store);
        self
    }

    /// Subscribe an observer; may be called several times
    pub fn observer(mut self, observer: Arc<dyn SessionObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    /// Build the manager, loading the stored history index
    pub async fn build(self) -> Result<SessionManager> {
        let client = self.client.ok_or_else(|| anyhow!("Chat client is required"))?;
        let store = self.store.unwrap_or_else(|| {
            tracing::debug!("No store configured, history will not outlive the session");
            LocalStore::in_memory()
        });

        let history = HistoryIndex::from_entries(store.get_index().await);
        tracing::info!(conversations = history.len(), "Session history loaded");

        Ok(SessionManager::new(client, store, history, self.observers))
    }
}

impl Default for SessionManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
