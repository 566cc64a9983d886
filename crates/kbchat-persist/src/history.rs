use crate::models::{ConversationId, HistoryEntry};

/// Maximum number of conversations kept in the index
pub const HISTORY_CAPACITY: usize = 20;

/// Characters of the first question kept in a conversation title
pub const TITLE_MAX_CHARS: usize = 30;

/// Title derived from a conversation's first question
pub fn truncate_title(question: &str) -> String {
    if question.chars().count() > TITLE_MAX_CHARS {
        let head: String = question.chars().take(TITLE_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        question.to_string()
    }
}

/// Result of [`HistoryIndex::record`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordOutcome {
    /// False when the conversation was already listed
    pub inserted: bool,

    /// Entries pushed out by the capacity bound, oldest last
    pub evicted: Vec<HistoryEntry>,
}

/// Bounded, newest-first list of conversations
///
/// Ids are unique. An existing entry is never moved or retitled.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryIndex {
    entries: Vec<HistoryEntry>,
    capacity: usize,
}

impl HistoryIndex {
    pub fn new() -> Self {
        Self::with_capacity(HISTORY_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    /// Rebuild from stored entries, dropping duplicate ids and overflow
    pub fn from_entries(entries: Vec<HistoryEntry>) -> Self {
        let mut index = Self::new();
        for entry in entries {
            if index.entries.len() == index.capacity {
                break;
            }
            if !index.contains(&entry.id) {
                index.entries.push(entry);
            }
        }
        index
    }

    /// Insert a conversation at the front unless it is already listed
    pub fn record(&mut self, id: ConversationId, title: impl Into<String>) -> RecordOutcome {
        if self.contains(&id) {
            return RecordOutcome::default();
        }

        self.entries.insert(0, HistoryEntry::new(id, title));
        let evicted = if self.entries.len() > self.capacity {
            self.entries.split_off(self.capacity)
        } else {
            Vec::new()
        };

        RecordOutcome { inserted: true, evicted }
    }

    pub fn remove(&mut self, id: &ConversationId) -> Option<HistoryEntry> {
        let position = self.entries.iter().position(|e| &e.id == id)?;
        Some(self.entries.remove(position))
    }

    /// Drop every entry, returning them newest first
    pub fn clear(&mut self) -> Vec<HistoryEntry> {
        std::mem::take(&mut self.entries)
    }

    pub fn contains(&self, id: &ConversationId) -> bool {
        self.entries.iter().any(|e| &e.id == id)
    }

    pub fn get(&self, id: &ConversationId) -> Option<&HistoryEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    pub fn list(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for HistoryIndex {
    fn default() -> Self {
        Self::new()
    }
}
