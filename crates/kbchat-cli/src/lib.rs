pub mod command;
pub mod config;
pub mod logging;
pub mod render;
pub mod repl;

pub use command::Command;
pub use config::Config;
pub use render::TerminalRenderer;
pub use repl::Repl;
