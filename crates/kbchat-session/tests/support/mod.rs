#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

use kbchat_client::{ChatClient, ChatRequest, ChatResponse, EventStream, Source, StreamEvent};
use kbchat_persist::{KeyValueStore, LocalStore, MemoryStore, PersistError};
use kbchat_session::{SessionEvent, SessionManager, SessionObserver};

/// Canned reply for one API call
pub enum Script {
    Answer(ChatResponse),
    Stream(Vec<Result<StreamEvent>>),
    Fail(String),
}

/// Chat client replaying scripted replies in order
///
/// With a gate, every call waits for one `release()` before replying.
#[derive(Default)]
pub struct ScriptedClient {
    scripts: Mutex<VecDeque<Script>>,
    requests: Mutex<Vec<ChatRequest>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedClient {
    pub fn new(scripts: Vec<Script>) -> Self {
        Self {
            scripts: Mutex::new(scripts.into()),
            ..Self::default()
        }
    }

    pub fn gated(scripts: Vec<Script>) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        let client = Self {
            gate: Some(gate.clone()),
            ..Self::new(scripts)
        };
        (client, gate)
    }

    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    async fn next_script(&self, request: ChatRequest) -> Script {
        self.requests.lock().unwrap().push(request);
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        self.scripts
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Script::Fail("no scripted reply left".to_string()))
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        match self.next_script(request).await {
            Script::Answer(response) => Ok(response),
            Script::Stream(_) => Err(anyhow!("stream scripted for a normal call")),
            Script::Fail(message) => Err(anyhow!(message)),
        }
    }

    async fn chat_stream(&self, request: ChatRequest) -> Result<EventStream> {
        match self.next_script(request).await {
            Script::Stream(events) => Ok(Box::pin(futures::stream::iter(events))),
            Script::Answer(_) => Err(anyhow!("answer scripted for a stream call")),
            Script::Fail(message) => Err(anyhow!(message)),
        }
    }
}

/// Store whose writes always fail
pub struct ReadOnlyStore;

#[async_trait]
impl KeyValueStore for ReadOnlyStore {
    async fn get(&self, _key: &str) -> kbchat_persist::error::Result<Option<String>> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String) -> kbchat_persist::error::Result<()> {
        Err(PersistError::Unavailable("quota exceeded".to_string()))
    }

    async fn remove(&self, _key: &str) -> kbchat_persist::error::Result<()> {
        Err(PersistError::Unavailable("quota exceeded".to_string()))
    }
}

/// Memory store whose next read, once armed, returns its snapshot only on release
///
/// The value is captured when the read starts, so writes landing while it is
/// held back are not seen by it.
#[derive(Default)]
pub struct StalledReadStore {
    inner: MemoryStore,
    armed: AtomicBool,
    started: Notify,
    release: Notify,
}

impl StalledReadStore {
    pub fn stall_next_read(&self) {
        self.armed.store(true, Ordering::SeqCst);
    }

    /// Wait until the stalled read has taken its snapshot
    pub async fn read_started(&self) {
        self.started.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl KeyValueStore for StalledReadStore {
    async fn get(&self, key: &str) -> kbchat_persist::error::Result<Option<String>> {
        let snapshot = self.inner.get(key).await?;
        if self.armed.swap(false, Ordering::SeqCst) {
            self.started.notify_one();
            self.release.notified().await;
        }
        Ok(snapshot)
    }

    async fn set(&self, key: &str, value: String) -> kbchat_persist::error::Result<()> {
        self.inner.set(key, value).await
    }

    async fn remove(&self, key: &str) -> kbchat_persist::error::Result<()> {
        self.inner.remove(key).await
    }
}

/// Observer recording every event
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<SessionEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl SessionObserver for RecordingObserver {
    fn on_event(&self, event: &SessionEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

pub fn answer(text: &str, sources: Vec<Source>) -> Script {
    Script::Answer(ChatResponse {
        answer: text.to_string(),
        sources: Some(sources),
        cached: false,
        usage: None,
        processing_time: Some(0.42),
        request_id: Some("req-1".to_string()),
    })
}

pub fn stream(events: Vec<StreamEvent>) -> Script {
    Script::Stream(events.into_iter().map(Ok).collect())
}

pub fn delta(text: &str) -> StreamEvent {
    StreamEvent::ContentDelta {
        content: text.to_string(),
    }
}

pub fn doc_source() -> Source {
    Source::new(0.92, "X is Y because...").with_filename("doc.pdf")
}

pub struct Harness {
    pub manager: Arc<SessionManager>,
    pub client: Arc<ScriptedClient>,
    pub store: LocalStore,
    pub backend: Arc<MemoryStore>,
}

pub async fn harness(client: ScriptedClient) -> Harness {
    let backend = Arc::new(MemoryStore::new());
    harness_with_backend(client, backend).await
}

pub async fn harness_with_backend(client: ScriptedClient, backend: Arc<MemoryStore>) -> Harness {
    let client = Arc::new(client);
    let store = LocalStore::new(backend.clone());
    let manager = SessionManager::builder()
        .client(client.clone())
        .store(store.clone())
        .build()
        .await
        .unwrap();

    Harness {
        manager: Arc::new(manager),
        client,
        store,
        backend,
    }
}
