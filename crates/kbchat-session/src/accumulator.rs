use kbchat_client::{Source, StreamEvent};

/// What the caller should do after pushing one stream event
#[derive(Debug, Clone, PartialEq)]
pub enum AccumulatorStep {
    /// New text was appended to the answer
    Delta(String),
    Continue,
    /// The server reported an in-band error
    Failed(String),
    Finished,
}

/// Folds decoded stream events into a final answer
#[derive(Debug, Default)]
pub struct AnswerAccumulator {
    content: String,
    sources: Option<Vec<Source>>,
}

impl AnswerAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: StreamEvent) -> AccumulatorStep {
        match event {
            StreamEvent::ContentDelta { content } => {
                self.content.push_str(&content);
                AccumulatorStep::Delta(content)
            }
            StreamEvent::SourcesReady { sources } => {
                self.sources = Some(sources);
                AccumulatorStep::Continue
            }
            StreamEvent::Backend { backend, model } => {
                tracing::info!(
                    backend = backend.as_deref().unwrap_or("unknown"),
                    model = model.as_deref().unwrap_or("unknown"),
                    "Answer backend selected"
                );
                AccumulatorStep::Continue
            }
            StreamEvent::Error { message } => AccumulatorStep::Failed(message),
            StreamEvent::Done => AccumulatorStep::Finished,
        }
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Accumulated text and the last source list received
    pub fn into_answer(self) -> (String, Option<Vec<Source>>) {
        (self.content, self.sources)
    }
}
