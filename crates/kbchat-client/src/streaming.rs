use anyhow::Result;
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::buffer_utils::StreamDecoder;
use crate::traits::EventStream;
use crate::types::Source;

/// Typed event decoded from one stream record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StreamEvent {
    /// Next piece of answer text
    ContentDelta {
        content: String,
    },

    /// Sources the answer is grounded on
    SourcesReady {
        sources: Vec<Source>,
    },

    /// Which generation backend is serving the answer
    Backend {
        #[serde(skip_serializing_if = "Option::is_none")]
        backend: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        model: Option<String>,
    },

    /// Server-side failure reported in-band
    Error {
        message: String,
    },

    /// End of answer
    Done,
}

/// Wire payload of a `data:` record
///
/// Every field is optional; one record may carry several of them.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StreamPayload {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub sources: Option<Vec<Source>>,
    #[serde(default)]
    pub backend: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: bool,
    #[serde(default)]
    pub message: Option<String>,
}

impl StreamPayload {
    /// Events in the order a consumer should apply them: backend, sources, content, done
    pub fn into_events(self) -> Vec<StreamEvent> {
        if self.error {
            return vec![StreamEvent::Error {
                message: self
                    .message
                    .unwrap_or_else(|| "unknown server error".to_string()),
            }];
        }

        let mut events = Vec::new();

        if self.backend.is_some() || self.model.is_some() {
            events.push(StreamEvent::Backend {
                backend: self.backend,
                model: self.model,
            });
        }

        if let Some(sources) = self.sources {
            events.push(StreamEvent::SourcesReady { sources });
        }

        if let Some(content) = self.content {
            if !content.is_empty() {
                events.push(StreamEvent::ContentDelta { content });
            }
        }

        if self.done {
            events.push(StreamEvent::Done);
        }

        events
    }
}

/// Decode a chunked byte stream into [`StreamEvent`]s
///
/// Ends after the terminal record, at end-of-data, or after the first
/// transport error (which is yielded as `Err`).
pub fn decode_event_stream<S, B, E>(byte_stream: S) -> EventStream
where
    S: Stream<Item = std::result::Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut byte_chunks = Box::pin(byte_stream);
        let mut decoder = StreamDecoder::new();
        let mut failed = false;

        while let Some(chunk_result) = byte_chunks.next().await {
            match chunk_result {
                Ok(bytes) => {
                    let events = decoder.feed(bytes.as_ref());
                    for event in events {
                        yield Ok::<StreamEvent, anyhow::Error>(event);
                    }
                    if decoder.is_done() {
                        break;
                    }
                }
                Err(e) => {
                    yield Err(anyhow::anyhow!("Stream error: {}", e));
                    failed = true;
                    break;
                }
            }
        }

        if !failed {
            for event in decoder.finish() {
                yield Ok(event);
            }
            if decoder.skipped_records() > 0 {
                tracing::debug!(skipped = decoder.skipped_records(), "Stream finished with skipped records");
            }
        }
    })
}
