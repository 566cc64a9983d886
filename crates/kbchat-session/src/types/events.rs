use kbchat_persist::{ChatMessage, ConversationId, HistoryEntry};
use serde::Serialize;

/// State change notification delivered to every [`SessionObserver`]
///
/// Message events carry the conversation they belong to, which is not
/// necessarily the active one. `index` is the position in the active
/// transcript, `None` when that conversation is not on screen.
///
/// [`SessionObserver`]: crate::SessionObserver
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    MessageAppended {
        conversation_id: ConversationId,
        index: usize,
        message: ChatMessage,
    },

    /// Content delta or finalization of an assistant message
    MessageUpdated {
        conversation_id: ConversationId,
        index: Option<usize>,
        message: ChatMessage,
    },

    HistoryChanged {
        entries: Vec<HistoryEntry>,
    },

    /// Active conversation replaced (new, switch or reset)
    ConversationChanged {
        conversation_id: ConversationId,
        transcript: Vec<ChatMessage>,
    },

    ProcessingChanged {
        processing: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_events_serialize_with_snake_case_type_tag() {
        let message = ChatMessage::assistant("Partial", None);
        let event = SessionEvent::MessageUpdated {
            conversation_id: ConversationId::from("1700000000000"),
            index: None,
            message: message.clone(),
        };

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "message_updated");
        assert_eq!(value["conversation_id"], "1700000000000");
        assert!(value["index"].is_null());
        assert_eq!(value["message"]["role"], "assistant");
        assert_eq!(value["message"]["content"], "Partial");
        assert_eq!(
            value["message"]["timestamp"],
            json!(message.timestamp.timestamp_millis())
        );
    }

    #[test]
    fn test_processing_event_shape() {
        let value = serde_json::to_value(SessionEvent::ProcessingChanged { processing: true }).unwrap();
        assert_eq!(value, json!({ "type": "processing_changed", "processing": true }));
    }
}
