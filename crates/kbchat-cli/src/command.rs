use kbchat_persist::ConversationId;

pub const HELP: &str = "\
Type a question and press enter.
  /new            start a new conversation
  /history        list saved conversations
  /open <id>      switch to a saved conversation
  /delete <id>    delete a conversation
  /clear          delete every saved conversation
  /stream on|off  toggle streamed answers
  /help           show this help
  /quit           exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ask(String),
    New,
    History,
    Open(ConversationId),
    Delete(ConversationId),
    Clear,
    Stream(bool),
    Help,
    Quit,
}

impl Command {
    /// Parse one input line; `Ok(None)` for a blank line
    pub fn parse(line: &str) -> Result<Option<Self>, String> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let Some(rest) = line.strip_prefix('/') else {
            return Ok(Some(Command::Ask(line.to_string())));
        };

        let mut parts = rest.split_whitespace();
        let name = parts.next().unwrap_or_default();
        let arg = parts.next();

        let command = match (name, arg) {
            ("new", None) => Command::New,
            ("history", None) => Command::History,
            ("open", Some(id)) => Command::Open(ConversationId::from(id)),
            ("delete", Some(id)) => Command::Delete(ConversationId::from(id)),
            ("clear", None) => Command::Clear,
            ("stream", Some("on")) => Command::Stream(true),
            ("stream", Some("off")) => Command::Stream(false),
            ("help", None) => Command::Help,
            ("quit" | "exit", None) => Command::Quit,
            ("open", None) => return Err("Usage: /open <id>".to_string()),
            ("delete", None) => return Err("Usage: /delete <id>".to_string()),
            ("stream", _) => return Err("Usage: /stream on|off".to_string()),
            _ => return Err(format!("Unknown command: /{} (try /help)", name)),
        };

        Ok(Some(command))
    }
}
