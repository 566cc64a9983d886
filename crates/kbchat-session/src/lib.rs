pub mod types;
pub mod error;
pub mod observer;
pub mod accumulator;
pub mod builder;
pub mod session;

pub use types::{ExchangeConfig, ExchangeOutcome, SessionEvent, ERROR_MESSAGE};
pub use error::SessionError;
pub use observer::{ChannelObserver, SessionObserver};
pub use accumulator::{AccumulatorStep, AnswerAccumulator};
pub use builder::SessionManagerBuilder;
pub use session::SessionManager;
