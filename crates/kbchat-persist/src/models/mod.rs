mod conversation_id;
mod history_entry;
mod message;

pub use conversation_id::ConversationId;
pub use history_entry::HistoryEntry;
pub use message::{ChatMessage, MessageRole};

use chrono::{DateTime, Duration, DurationRound, Utc};

/// Current time at millisecond precision (the on-disk resolution)
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    now.duration_trunc(Duration::milliseconds(1)).unwrap_or(now)
}
