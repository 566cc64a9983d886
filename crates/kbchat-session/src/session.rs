use anyhow::{anyhow, Result};
use futures::StreamExt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;
use uuid::Uuid;

use kbchat_client::{ChatClient, ChatRequest, Source};
use kbchat_persist::{
    truncate_title, ChatMessage, ConversationId, HistoryEntry, HistoryIndex, LocalStore,
};

use crate::accumulator::{AccumulatorStep, AnswerAccumulator};
use crate::builder::SessionManagerBuilder;
use crate::error::SessionError;
use crate::observer::SessionObserver;
use crate::types::state::{InFlight, SessionState};
use crate::types::{ExchangeConfig, ExchangeOutcome, SessionEvent, ERROR_MESSAGE};

/// Owns the active conversation and runs question/answer exchanges
///
/// At most one exchange is outstanding per session. All state sits behind a
/// single mutex that is never held across an await point; observers are
/// notified after the lock is released.
pub struct SessionManager {
    client: Arc<dyn ChatClient>,
    store: LocalStore,
    state: Mutex<SessionState>,
    observers: Vec<Arc<dyn SessionObserver>>,
}

/// Clears the in-flight flag when the exchange ends, however it ends
struct ProcessingGuard<'a> {
    manager: &'a SessionManager,
}

impl Drop for ProcessingGuard<'_> {
    fn drop(&mut self) {
        let mut events = Vec::new();
        {
            let mut state = self.manager.lock_state();
            // Only set if the exchange future was dropped before committing
            if let Some(in_flight) = state.in_flight.take() {
                if let Some(slot) = in_flight.slot {
                    if let Some(message) = state.transcript.get_mut(slot) {
                        message.finalize(ERROR_MESSAGE.to_string(), None);
                        events.push(SessionEvent::MessageUpdated {
                            conversation_id: in_flight.conversation_id,
                            index: Some(slot),
                            message: message.clone(),
                        });
                    }
                }
            }
            state.processing = false;
        }
        events.push(SessionEvent::ProcessingChanged { processing: false });
        self.manager.emit_all(events);
    }
}

impl SessionManager {
    pub(crate) fn new(
        client: Arc<dyn ChatClient>,
        store: LocalStore,
        history: HistoryIndex,
        observers: Vec<Arc<dyn SessionObserver>>,
    ) -> Self {
        Self {
            client,
            store,
            state: Mutex::new(SessionState::with_history(history)),
            observers,
        }
    }

    pub fn builder() -> SessionManagerBuilder {
        SessionManagerBuilder::new()
    }

    pub fn active_conversation(&self) -> Option<ConversationId> {
        self.lock_state().active.clone()
    }

    /// Snapshot of the active transcript
    pub fn transcript(&self) -> Vec<ChatMessage> {
        self.lock_state().transcript.clone()
    }

    pub fn is_processing(&self) -> bool {
        self.lock_state().processing
    }

    /// History index, newest first
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.lock_state().history.list().to_vec()
    }

    pub fn store(&self) -> &LocalStore {
        &self.store
    }

    /// Begin an empty conversation; history is untouched until it gets an answer
    pub fn start_new_conversation(&self) -> ConversationId {
        let id = ConversationId::generate();
        self.lock_state().reset(id.clone());

        tracing::info!(conversation_id = %id, "New conversation started");
        self.emit(SessionEvent::ConversationChanged {
            conversation_id: id.clone(),
            transcript: Vec::new(),
        });
        id
    }

    /// Make a stored conversation active and return its transcript
    ///
    /// An unknown or empty conversation yields an empty transcript. An
    /// exchange in flight elsewhere keeps running.
    pub async fn switch_to_conversation(&self, id: &ConversationId) -> Vec<ChatMessage> {
        let commits_seen = self.lock_state().commits;
        let loaded = self.store.get_messages(id).await;

        let transcript = {
            let mut state = self.lock_state();
            state.attach_loaded(id.clone(), loaded, commits_seen);
            state.transcript.clone()
        };

        tracing::info!(conversation_id = %id, messages = transcript.len(), "Switched conversation");
        self.emit(SessionEvent::ConversationChanged {
            conversation_id: id.clone(),
            transcript: transcript.clone(),
        });
        transcript
    }

    /// Remove a conversation from the index and delete its messages
    ///
    /// Deleting the active conversation starts a new one.
    pub async fn delete_conversation(&self, id: &ConversationId) {
        let (removed, entries, was_active) = {
            let mut state = self.lock_state();
            let removed = state.history.remove(id).is_some();
            state.discard_in_flight(id);
            let was_active = state.active.as_ref() == Some(id);
            (removed, state.history.list().to_vec(), was_active)
        };

        if removed {
            self.emit(SessionEvent::HistoryChanged {
                entries: entries.clone(),
            });
            self.persist_index(&entries).await;
        }
        self.delete_log(id).await;

        tracing::info!(conversation_id = %id, removed, "Conversation deleted");

        if was_active {
            self.start_new_conversation();
        }
    }

    /// Delete every indexed conversation and start a new one
    pub async fn clear_all_history(&self) {
        let cleared = {
            let mut state = self.lock_state();
            if state.history.is_empty() {
                return;
            }
            let cleared = state.history.clear();
            for entry in &cleared {
                state.discard_in_flight(&entry.id);
            }
            cleared
        };

        self.emit(SessionEvent::HistoryChanged {
            entries: Vec::new(),
        });
        for entry in &cleared {
            self.delete_log(&entry.id).await;
        }
        self.persist_index(&[]).await;

        tracing::info!(conversations = cleared.len(), "History cleared");
        self.start_new_conversation();
    }

    /// Ask a question in the active conversation
    ///
    /// Rejections happen before any state changes. Once accepted, the
    /// exchange always ends with exactly one finalized assistant message,
    /// which is the fixed [`ERROR_MESSAGE`] when the API call fails.
    pub async fn send_question(
        &self,
        text: &str,
        config: &ExchangeConfig,
    ) -> Result<ExchangeOutcome, SessionError> {
        let question = text.trim();
        if question.is_empty() {
            return Err(SessionError::EmptyQuestion);
        }
        config.validate()?;

        let mut events = Vec::new();
        let (conversation_id, user_message) = {
            let mut state = self.lock_state();
            if state.processing {
                return Err(SessionError::ExchangeInFlight);
            }
            state.processing = true;
            events.push(SessionEvent::ProcessingChanged { processing: true });

            let conversation_id = match state.active.clone() {
                Some(id) => id,
                None => {
                    let id = ConversationId::generate();
                    state.reset(id.clone());
                    events.push(SessionEvent::ConversationChanged {
                        conversation_id: id.clone(),
                        transcript: Vec::new(),
                    });
                    id
                }
            };

            let user_message = ChatMessage::user(question);
            state.transcript.push(user_message.clone());
            events.push(SessionEvent::MessageAppended {
                conversation_id: conversation_id.clone(),
                index: state.transcript.len() - 1,
                message: user_message.clone(),
            });

            let placeholder = ChatMessage::pending_assistant();
            state.transcript.push(placeholder.clone());
            let slot = state.transcript.len() - 1;
            events.push(SessionEvent::MessageAppended {
                conversation_id: conversation_id.clone(),
                index: slot,
                message: placeholder.clone(),
            });

            state.in_flight = Some(InFlight {
                conversation_id: conversation_id.clone(),
                question: user_message.clone(),
                message: placeholder,
                slot: Some(slot),
                discarded: false,
            });

            (conversation_id, user_message)
        };
        let _guard = ProcessingGuard { manager: self };
        self.emit_all(events);

        let exchange_id = Uuid::new_v4();
        let started = Instant::now();
        tracing::info!(
            %exchange_id,
            conversation_id = %conversation_id,
            stream = config.stream_mode,
            "Exchange started"
        );

        if let Err(e) = self.store.append_message(&conversation_id, &user_message).await {
            tracing::warn!(error = %e, conversation_id = %conversation_id, "Failed to persist question");
        }

        let request = ChatRequest::new(question).with_options(config.chat_options());
        let result = if config.stream_mode {
            self.run_streaming(&conversation_id, request).await
        } else {
            self.run_normal(request).await
        };

        let outcome = match result {
            Ok((content, sources)) => {
                let (message, discarded) = self.commit(&conversation_id, content, sources);
                if !discarded {
                    self.persist_answer(&conversation_id, &message).await;
                    self.register_history(&conversation_id, question).await;
                }
                tracing::info!(
                    %exchange_id,
                    conversation_id = %conversation_id,
                    elapsed = ?started.elapsed(),
                    sources = message.sources.as_ref().map_or(0, Vec::len),
                    "Exchange answered"
                );
                ExchangeOutcome::Answered {
                    conversation_id,
                    message,
                }
            }
            Err(e) => {
                tracing::error!(
                    %exchange_id,
                    conversation_id = %conversation_id,
                    error = %e,
                    "Exchange failed"
                );
                let (message, discarded) =
                    self.commit(&conversation_id, ERROR_MESSAGE.to_string(), None);
                if !discarded {
                    self.persist_answer(&conversation_id, &message).await;
                }
                ExchangeOutcome::Failed {
                    conversation_id,
                    message,
                    reason: format!("{:#}", e),
                }
            }
        };

        Ok(outcome)
    }

    async fn run_normal(&self, request: ChatRequest) -> Result<(String, Option<Vec<Source>>)> {
        let mut response = self.client.chat(request).await?;

        tracing::debug!(
            cached = response.cached,
            processing_time = ?response.processing_time,
            request_id = ?response.request_id,
            usage = ?response.usage,
            "Answer received"
        );

        let answer = std::mem::take(&mut response.answer);
        Ok((answer, response.into_sources()))
    }

    async fn run_streaming(
        &self,
        conversation_id: &ConversationId,
        request: ChatRequest,
    ) -> Result<(String, Option<Vec<Source>>)> {
        let mut stream = self.client.chat_stream(request).await?;
        let mut accumulator = AnswerAccumulator::new();

        while let Some(item) = stream.next().await {
            match accumulator.push(item?) {
                AccumulatorStep::Delta(delta) => self.apply_delta(conversation_id, &delta),
                AccumulatorStep::Continue => {}
                AccumulatorStep::Failed(message) => {
                    return Err(anyhow!("Server reported an error: {}", message));
                }
                AccumulatorStep::Finished => break,
            }
        }

        Ok(accumulator.into_answer())
    }

    fn apply_delta(&self, conversation_id: &ConversationId, delta: &str) {
        let event = {
            let mut state = self.lock_state();
            let SessionState {
                transcript,
                in_flight,
                ..
            } = &mut *state;
            let Some(in_flight) = in_flight.as_mut() else {
                return;
            };

            in_flight.message.push_content(delta);
            if let Some(message) = in_flight.slot.and_then(|slot| transcript.get_mut(slot)) {
                message.push_content(delta);
            }

            SessionEvent::MessageUpdated {
                conversation_id: conversation_id.clone(),
                index: in_flight.slot,
                message: in_flight.message.clone(),
            }
        };
        self.emit(event);
    }

    /// Finalize the in-flight answer; returns it and whether it was discarded
    fn commit(
        &self,
        conversation_id: &ConversationId,
        content: String,
        sources: Option<Vec<Source>>,
    ) -> (ChatMessage, bool) {
        let (message, slot, discarded) = {
            let mut state = self.lock_state();
            match state.in_flight.take() {
                Some(mut in_flight) => {
                    in_flight.message.finalize(content, sources);
                    if let Some(slot) = in_flight.slot {
                        if let Some(entry) = state.transcript.get_mut(slot) {
                            *entry = in_flight.message.clone();
                        }
                    }
                    state.record_commit(&in_flight);
                    (in_flight.message, in_flight.slot, in_flight.discarded)
                }
                None => (ChatMessage::assistant(content, sources), None, false),
            }
        };

        self.emit(SessionEvent::MessageUpdated {
            conversation_id: conversation_id.clone(),
            index: slot,
            message: message.clone(),
        });
        (message, discarded)
    }

    async fn persist_answer(&self, conversation_id: &ConversationId, message: &ChatMessage) {
        if let Err(e) = self.store.append_message(conversation_id, message).await {
            tracing::warn!(error = %e, conversation_id = %conversation_id, "Failed to persist answer");
        }
    }

    /// List the conversation on its first answer; drops logs of evicted entries
    async fn register_history(&self, conversation_id: &ConversationId, question: &str) {
        let (outcome, entries) = {
            let mut state = self.lock_state();
            let outcome = state
                .history
                .record(conversation_id.clone(), truncate_title(question));
            (outcome, state.history.list().to_vec())
        };

        if !outcome.inserted {
            return;
        }

        self.emit(SessionEvent::HistoryChanged {
            entries: entries.clone(),
        });
        self.persist_index(&entries).await;

        for evicted in &outcome.evicted {
            tracing::debug!(conversation_id = %evicted.id, "Evicting conversation from history");
            self.delete_log(&evicted.id).await;
        }
    }

    async fn persist_index(&self, entries: &[HistoryEntry]) {
        if let Err(e) = self.store.set_index(entries).await {
            tracing::warn!(error = %e, "Failed to persist history index");
        }
    }

    async fn delete_log(&self, id: &ConversationId) {
        if let Err(e) = self.store.delete_messages(id).await {
            tracing::warn!(error = %e, conversation_id = %id, "Failed to delete message log");
        }
    }

    fn lock_state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SessionEvent) {
        for observer in &self.observers {
            observer.on_event(&event);
        }
    }

    fn emit_all(&self, events: Vec<SessionEvent>) {
        for event in events {
            self.emit(event);
        }
    }
}
