use std::io::{self, Write};
use std::sync::Mutex;

use kbchat_client::Source;
use kbchat_persist::{ChatMessage, ConversationId, HistoryEntry, MessageRole};
use kbchat_session::{SessionEvent, SessionObserver};

pub const WELCOME: &str = "New conversation. Ask anything about the knowledge base.";

/// Prints session events as a plain-text transcript
///
/// Only the active conversation is drawn; answers finishing in the
/// background show up when their conversation is opened again.
pub struct TerminalRenderer<W: Write + Send = io::Stdout> {
    inner: Mutex<RenderState<W>>,
}

struct RenderState<W> {
    out: W,
    /// Answer text already written for the message being streamed
    shown: String,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self {
            inner: Mutex::new(RenderState {
                out,
                shown: String::new(),
            }),
        }
    }

    pub fn into_inner(self) -> W {
        match self.inner.into_inner() {
            Ok(state) => state.out,
            Err(poisoned) => poisoned.into_inner().out,
        }
    }

    fn render(&self, event: &SessionEvent) -> io::Result<()> {
        let mut guard = match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let state = &mut *guard;

        match event {
            SessionEvent::MessageAppended { message, .. } => {
                if message.role == MessageRole::Assistant {
                    state.shown.clear();
                    write!(state.out, "assistant> ")?;
                }
            }
            SessionEvent::MessageUpdated {
                index: Some(_),
                message,
                ..
            } => {
                if message.is_pending() {
                    if let Some(delta) = message.content.strip_prefix(state.shown.as_str()) {
                        write!(state.out, "{}", delta)?;
                        state.shown = message.content.clone();
                    }
                } else {
                    match message.content.strip_prefix(state.shown.as_str()) {
                        Some(rest) => writeln!(state.out, "{}", rest)?,
                        None => writeln!(state.out, "\n{}", message.content)?,
                    }
                    state.shown.clear();
                    if let Some(sources) = &message.sources {
                        write!(state.out, "{}", format_sources(sources))?;
                    }
                }
            }
            SessionEvent::ConversationChanged {
                conversation_id,
                transcript,
            } => {
                state.shown.clear();
                write!(state.out, "{}", format_transcript(conversation_id, transcript))?;
            }
            _ => {}
        }

        state.out.flush()
    }
}

impl<W: Write + Send> SessionObserver for TerminalRenderer<W> {
    fn on_event(&self, event: &SessionEvent) {
        if let Err(e) = self.render(event) {
            tracing::warn!(error = %e, "Failed to render session event");
        }
    }
}

/// Numbered source list with filename, score and snippet preview
pub fn format_sources(sources: &[Source]) -> String {
    let mut out = String::from("Sources:\n");
    for (i, source) in sources.iter().enumerate() {
        out.push_str(&format!(
            "  [{}] {} ({})\n      {}\n",
            i + 1,
            source.filename(),
            source.score_label(),
            source.preview()
        ));
    }
    out
}

pub fn format_transcript(id: &ConversationId, transcript: &[ChatMessage]) -> String {
    let mut out = format!("-- conversation {} --\n", id);
    if transcript.is_empty() {
        out.push_str(WELCOME);
        out.push('\n');
        return out;
    }

    for message in transcript {
        let speaker = match message.role {
            MessageRole::User => "you",
            MessageRole::Assistant => "assistant",
        };
        out.push_str(&format!("{}> {}\n", speaker, message.content));
        if let Some(sources) = &message.sources {
            out.push_str(&format_sources(sources));
        }
    }
    out
}

/// History list, active conversation marked with `*`
pub fn format_history(entries: &[HistoryEntry], active: Option<&ConversationId>) -> String {
    if entries.is_empty() {
        return "No saved conversations.\n".to_string();
    }

    entries
        .iter()
        .map(|entry| {
            let marker = if Some(&entry.id) == active { '*' } else { ' ' };
            format!("{} {}  {}\n", marker, entry.id, entry.title)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(renderer: TerminalRenderer<Vec<u8>>) -> String {
        String::from_utf8(renderer.into_inner()).unwrap()
    }

    fn updated(message: &ChatMessage) -> SessionEvent {
        SessionEvent::MessageUpdated {
            conversation_id: ConversationId::new("1"),
            index: Some(1),
            message: message.clone(),
        }
    }

    #[test]
    fn test_format_sources() {
        let sources = vec![
            Source::new(0.92, "X is Y because...").with_filename("doc.pdf"),
            Source::new(0.5, "no metadata"),
        ];

        let text = format_sources(&sources);
        assert!(text.contains("[1] doc.pdf (92.0%)"));
        assert!(text.contains("[2] unknown (50.0%)"));
        assert!(text.contains("X is Y because..."));
    }

    #[test]
    fn test_streamed_answer_printed_incrementally() {
        let renderer = TerminalRenderer::new(Vec::new());
        let mut message = ChatMessage::pending_assistant();

        renderer.on_event(&SessionEvent::MessageAppended {
            conversation_id: ConversationId::new("1"),
            index: 1,
            message: message.clone(),
        });
        message.push_content("The ");
        renderer.on_event(&updated(&message));
        message.push_content("answer.");
        renderer.on_event(&updated(&message));
        message.finalize(
            "The answer.".to_string(),
            Some(vec![Source::new(0.92, "s").with_filename("doc.pdf")]),
        );
        renderer.on_event(&updated(&message));

        let text = output(renderer);
        assert!(text.starts_with("assistant> The answer.\nSources:\n"));
        assert_eq!(text.matches("The answer.").count(), 1);
    }

    #[test]
    fn test_failed_answer_replaces_partial_text() {
        let renderer = TerminalRenderer::new(Vec::new());
        let mut message = ChatMessage::pending_assistant();
        message.push_content("partial");
        renderer.on_event(&updated(&message));
        message.finalize("Sorry".to_string(), None);
        renderer.on_event(&updated(&message));

        assert_eq!(output(renderer), "partial\nSorry\n");
    }

    #[test]
    fn test_background_updates_are_ignored() {
        let renderer = TerminalRenderer::new(Vec::new());
        renderer.on_event(&SessionEvent::MessageUpdated {
            conversation_id: ConversationId::new("9"),
            index: None,
            message: ChatMessage::assistant("elsewhere", None),
        });

        assert!(output(renderer).is_empty());
    }

    #[test]
    fn test_empty_conversation_shows_welcome() {
        let text = format_transcript(&ConversationId::new("7"), &[]);
        assert!(text.contains("-- conversation 7 --"));
        assert!(text.contains(WELCOME));
    }

    #[test]
    fn test_format_history_marks_active() {
        let entries = vec![
            HistoryEntry::new(ConversationId::new("2"), "second"),
            HistoryEntry::new(ConversationId::new("1"), "first"),
        ];
        let active = ConversationId::new("1");

        let text = format_history(&entries, Some(&active));
        assert_eq!(text, "  2  second\n* 1  first\n");
        assert_eq!(format_history(&[], None), "No saved conversations.\n");
    }
}
