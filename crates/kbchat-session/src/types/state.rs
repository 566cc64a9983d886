use kbchat_persist::{ChatMessage, ConversationId, HistoryIndex};
use std::collections::VecDeque;

/// Committed exchanges remembered for loads that race with a commit
const RECENT_COMMITS: usize = 8;

/// Assistant answer still being produced
#[derive(Debug)]
pub(crate) struct InFlight {
    pub conversation_id: ConversationId,
    pub question: ChatMessage,
    pub message: ChatMessage,
    /// Index in the transcript while its conversation is active
    pub slot: Option<usize>,
    /// Set when its conversation is deleted mid-exchange
    pub discarded: bool,
}

#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub active: Option<ConversationId>,
    pub transcript: Vec<ChatMessage>,
    pub processing: bool,
    pub history: HistoryIndex,
    pub in_flight: Option<InFlight>,
    /// Number of exchanges committed so far
    pub commits: u64,
    recent: VecDeque<Committed>,
}

/// Finalized exchange, kept until enough later commits push it out
#[derive(Debug)]
struct Committed {
    sequence: u64,
    conversation_id: ConversationId,
    question: ChatMessage,
    answer: ChatMessage,
}

impl SessionState {
    pub fn with_history(history: HistoryIndex) -> Self {
        Self {
            history,
            ..Self::default()
        }
    }

    /// Make `id` active with an empty transcript
    pub fn reset(&mut self, id: ConversationId) {
        self.attach(id, Vec::new());
    }

    /// Make `id` active with a loaded transcript
    ///
    /// An answer in flight for `id` is re-attached at the end.
    pub fn attach(&mut self, id: ConversationId, transcript: Vec<ChatMessage>) {
        self.transcript = transcript;

        if let Some(in_flight) = self.in_flight.as_mut() {
            in_flight.slot = None;
            if in_flight.conversation_id == id && !in_flight.discarded {
                self.transcript.push(in_flight.message.clone());
                in_flight.slot = Some(self.transcript.len() - 1);
            }
        }

        self.active = Some(id);
    }

    /// Make `id` active with a transcript loaded while the lock was released
    ///
    /// Exchanges for `id` committed after `commits_seen` may be missing from
    /// `loaded`; their messages are appended when absent.
    pub fn attach_loaded(
        &mut self,
        id: ConversationId,
        mut loaded: Vec<ChatMessage>,
        commits_seen: u64,
    ) {
        for committed in self
            .recent
            .iter()
            .filter(|c| c.sequence > commits_seen && c.conversation_id == id)
        {
            for message in [&committed.question, &committed.answer] {
                if !loaded.contains(message) {
                    loaded.push(message.clone());
                }
            }
        }
        self.attach(id, loaded);
    }

    /// Remember a finalized exchange
    pub fn record_commit(&mut self, in_flight: &InFlight) {
        self.commits += 1;
        if in_flight.discarded {
            return;
        }
        if self.recent.len() == RECENT_COMMITS {
            self.recent.pop_front();
        }
        self.recent.push_back(Committed {
            sequence: self.commits,
            conversation_id: in_flight.conversation_id.clone(),
            question: in_flight.question.clone(),
            answer: in_flight.message.clone(),
        });
    }

    /// Mark the in-flight answer as discarded if it belongs to `id`
    pub fn discard_in_flight(&mut self, id: &ConversationId) {
        if let Some(in_flight) = self.in_flight.as_mut() {
            if &in_flight.conversation_id == id {
                in_flight.discarded = true;
            }
        }
        self.recent.retain(|c| &c.conversation_id != id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed_exchange(
        state: &mut SessionState,
        id: &ConversationId,
    ) -> (ChatMessage, ChatMessage) {
        let question = ChatMessage::user("Q");
        let mut answer = ChatMessage::pending_assistant();
        answer.finalize("A".to_string(), None);
        state.record_commit(&InFlight {
            conversation_id: id.clone(),
            question: question.clone(),
            message: answer.clone(),
            slot: None,
            discarded: false,
        });
        (question, answer)
    }

    #[test]
    fn test_attach_loaded_appends_commit_missing_from_load() {
        let mut state = SessionState::default();
        let id = ConversationId::from("1");
        let seen = state.commits;
        let (question, answer) = committed_exchange(&mut state, &id);

        state.attach_loaded(id, vec![question.clone()], seen);
        assert_eq!(state.transcript, vec![question, answer]);
    }

    #[test]
    fn test_attach_loaded_skips_commit_already_loaded() {
        let mut state = SessionState::default();
        let id = ConversationId::from("1");
        let seen = state.commits;
        let (question, answer) = committed_exchange(&mut state, &id);

        state.attach_loaded(id, vec![question.clone(), answer.clone()], seen);
        assert_eq!(state.transcript, vec![question, answer]);
    }

    #[test]
    fn test_attach_loaded_ignores_older_and_foreign_commits() {
        let mut state = SessionState::default();
        let id = ConversationId::from("1");
        committed_exchange(&mut state, &id);
        let seen = state.commits;
        committed_exchange(&mut state, &ConversationId::from("2"));

        state.attach_loaded(id, Vec::new(), seen);
        assert!(state.transcript.is_empty());
    }

    #[test]
    fn test_deleted_conversation_commits_are_forgotten() {
        let mut state = SessionState::default();
        let id = ConversationId::from("1");
        let seen = state.commits;
        committed_exchange(&mut state, &id);
        state.discard_in_flight(&id);

        state.attach_loaded(id, Vec::new(), seen);
        assert!(state.transcript.is_empty());
    }
}
