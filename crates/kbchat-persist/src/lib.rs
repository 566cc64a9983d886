pub mod models;
pub mod store;
pub mod dbs;
pub mod local_store;
pub mod history;
pub mod error;

pub use models::{now_millis, ChatMessage, ConversationId, HistoryEntry, MessageRole};
pub use store::KeyValueStore;
pub use dbs::{FileStore, MemoryStore};
pub use local_store::{LocalStore, INDEX_KEY, MESSAGES_KEY_PREFIX};
pub use history::{truncate_title, HistoryIndex, RecordOutcome, HISTORY_CAPACITY, TITLE_MAX_CHARS};
pub use error::PersistError;
