use thiserror::Error;

/// Reasons a question is refused before any state changes
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SessionError {
    #[error("Question is empty")]
    EmptyQuestion,

    #[error("Invalid exchange configuration: {0}")]
    InvalidConfig(String),

    #[error("Another question is still being answered")]
    ExchangeInFlight,
}
