use super::buffering::CircularLineBuffer;
use crate::streaming::{StreamEvent, StreamPayload};

/// Record prefix carrying an event payload
pub const DATA_PREFIX: &str = "data:";

/// Reserved payload that terminates the stream
pub const DONE_MARKER: &str = "[DONE]";

/// Incremental decoder for `data: {...}` event records
///
/// Feed it raw body chunks in arrival order; records split across chunks are
/// buffered until their newline arrives. Payloads that fail to parse are
/// logged and skipped. Once the terminal record is seen the decoder ignores
/// all further input.
pub struct StreamDecoder {
    buffer: CircularLineBuffer,
    done: bool,
    skipped: usize,
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self {
            buffer: CircularLineBuffer::with_capacity(4096),
            done: false,
            skipped: 0,
        }
    }

    /// Push one chunk and return the events of every record it completed
    pub fn feed(&mut self, bytes: &[u8]) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }

        self.buffer.extend(bytes);

        while !self.done {
            match self.buffer.next_line() {
                Some(Ok(line)) => self.decode_record(&line, &mut events),
                Some(Err(e)) => {
                    tracing::warn!(error = %e, "Skipping undecodable stream record");
                    self.skipped += 1;
                }
                None => break,
            }
        }

        events
    }

    /// Flush an unterminated trailing record at end-of-data
    pub fn finish(&mut self) -> Vec<StreamEvent> {
        let mut events = Vec::new();
        if self.done {
            return events;
        }

        match self.buffer.take_remainder() {
            Some(Ok(line)) => self.decode_record(&line, &mut events),
            Some(Err(e)) => {
                tracing::warn!(error = %e, "Skipping undecodable trailing record");
                self.skipped += 1;
            }
            None => {}
        }

        self.done = true;
        events
    }

    /// Whether the terminal record has been seen (or `finish` was called)
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Number of records dropped because they could not be parsed
    pub fn skipped_records(&self) -> usize {
        self.skipped
    }

    fn decode_record(&mut self, line: &str, events: &mut Vec<StreamEvent>) {
        if line.is_empty() {
            return;
        }

        let Some(data) = line.strip_prefix(DATA_PREFIX) else {
            tracing::debug!(record = %line, "Ignoring non-data record");
            return;
        };
        let data = data.trim_start();

        if data == DONE_MARKER {
            events.push(StreamEvent::Done);
            self.done = true;
            return;
        }

        match serde_json::from_str::<StreamPayload>(data) {
            Ok(payload) => {
                for event in payload.into_events() {
                    if event == StreamEvent::Done {
                        self.done = true;
                    }
                    events.push(event);
                    if self.done {
                        break;
                    }
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, payload = %data, "Skipping malformed stream record");
                self.skipped += 1;
            }
        }
    }
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}
