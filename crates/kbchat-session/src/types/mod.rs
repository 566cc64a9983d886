pub mod config;
pub mod events;
pub mod outcome;
pub(crate) mod state;

pub use config::ExchangeConfig;
pub use events::SessionEvent;
pub use outcome::{ExchangeOutcome, ERROR_MESSAGE};
