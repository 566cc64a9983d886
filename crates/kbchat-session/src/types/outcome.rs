use kbchat_persist::{ChatMessage, ConversationId};

/// Assistant text shown when an exchange fails
pub const ERROR_MESSAGE: &str = "Sorry, something went wrong. Please try again later.";

/// How an accepted question ended
#[derive(Debug, Clone, PartialEq)]
pub enum ExchangeOutcome {
    Answered {
        conversation_id: ConversationId,
        message: ChatMessage,
    },
    Failed {
        conversation_id: ConversationId,
        message: ChatMessage,
        reason: String,
    },
}

impl ExchangeOutcome {
    pub fn conversation_id(&self) -> &ConversationId {
        match self {
            Self::Answered { conversation_id, .. } | Self::Failed { conversation_id, .. } => {
                conversation_id
            }
        }
    }

    /// Final assistant message
    pub fn message(&self) -> &ChatMessage {
        match self {
            Self::Answered { message, .. } | Self::Failed { message, .. } => message,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Self::Answered { .. })
    }
}
