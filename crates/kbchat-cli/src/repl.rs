use anyhow::Result;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use kbchat_session::{ExchangeConfig, SessionManager};

use crate::command::{Command, HELP};
use crate::render::format_history;

/// Whether the loop keeps reading input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Line-oriented front end over a [`SessionManager`]
///
/// Answers are drawn by the renderer subscribed to the manager; the loop
/// itself only prints command feedback.
pub struct Repl {
    manager: Arc<SessionManager>,
    exchange: ExchangeConfig,
}

impl Repl {
    pub fn new(manager: Arc<SessionManager>, exchange: ExchangeConfig) -> Self {
        Self { manager, exchange }
    }

    pub fn exchange(&self) -> &ExchangeConfig {
        &self.exchange
    }

    /// Read commands until `/quit` or end of input
    pub async fn run<R>(&mut self, input: R) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match Command::parse(&line) {
                Ok(Some(command)) => {
                    if self.execute(command).await == Flow::Quit {
                        break;
                    }
                }
                Ok(None) => {}
                Err(usage) => eprintln!("{}", usage),
            }
        }
        Ok(())
    }

    pub async fn execute(&mut self, command: Command) -> Flow {
        match command {
            Command::Ask(question) => {
                if let Err(e) = self.manager.send_question(&question, &self.exchange).await {
                    eprintln!("! {}", e);
                }
            }
            Command::New => {
                self.manager.start_new_conversation();
            }
            Command::History => {
                let active = self.manager.active_conversation();
                print!("{}", format_history(&self.manager.history(), active.as_ref()));
            }
            Command::Open(id) => {
                self.manager.switch_to_conversation(&id).await;
            }
            Command::Delete(id) => {
                self.manager.delete_conversation(&id).await;
                println!("Deleted conversation {}", id);
            }
            Command::Clear => {
                if self.manager.history().is_empty() {
                    println!("No saved conversations.");
                } else {
                    self.manager.clear_all_history().await;
                    println!("History cleared.");
                }
            }
            Command::Stream(enabled) => {
                self.exchange.stream_mode = enabled;
                println!("Streaming {}", if enabled { "on" } else { "off" });
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => return Flow::Quit,
        }
        Flow::Continue
    }
}
