use anyhow::Result;
use std::collections::VecDeque;

/// Circular buffer for line-based parsing of chunked bodies
///
/// Bytes are appended as chunks arrive; complete lines are drained from the front.
pub struct CircularLineBuffer {
    buffer: VecDeque<u8>,
    /// Bytes before this offset are known to hold no newline
    scanned: usize,
}

impl CircularLineBuffer {
    /// Create a new buffer with specified capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: VecDeque::with_capacity(capacity),
            scanned: 0,
        }
    }

    /// Add bytes to the buffer
    pub fn extend(&mut self, bytes: &[u8]) {
        self.buffer.extend(bytes);
    }

    /// Extract next line (up to \n) from buffer, trimmed
    /// Returns None if no complete line is available
    pub fn next_line(&mut self) -> Option<Result<String>> {
        let Some(offset) = self.buffer.range(self.scanned..).position(|&b| b == b'\n') else {
            self.scanned = self.buffer.len();
            return None;
        };
        let newline_pos = self.scanned + offset;
        self.scanned = 0;
        let line_bytes: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
        Some(Self::decode(line_bytes))
    }

    /// Drain whatever is left (an unterminated last line)
    pub fn take_remainder(&mut self) -> Option<Result<String>> {
        if self.buffer.is_empty() {
            return None;
        }
        self.scanned = 0;
        let line_bytes: Vec<u8> = self.buffer.drain(..).collect();
        Some(Self::decode(line_bytes))
    }

    fn decode(line_bytes: Vec<u8>) -> Result<String> {
        match String::from_utf8(line_bytes) {
            Ok(line) => Ok(line.trim().to_string()),
            Err(e) => Err(anyhow::anyhow!("Invalid UTF-8: {}", e)),
        }
    }

    /// Current buffer size
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_buffer_basic() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"line1\nline2\r\n");

        assert_eq!(buffer.next_line().unwrap().unwrap(), "line1");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "line2");
        assert!(buffer.next_line().is_none());
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_partial_line() {
        let mut buffer = CircularLineBuffer::with_capacity(64);

        buffer.extend(b"partial");
        assert!(buffer.next_line().is_none());
        assert_eq!(buffer.len(), 7);

        buffer.extend(b" line\n");
        assert_eq!(buffer.next_line().unwrap().unwrap(), "partial line");
    }

    #[test]
    fn test_line_fed_in_small_chunks() {
        let mut buffer = CircularLineBuffer::with_capacity(8);
        let record = format!("data: {}\n", "x".repeat(300));

        for chunk in record.as_bytes().chunks(7) {
            if let Some(line) = buffer.next_line() {
                panic!("line split early: {:?}", line);
            }
            buffer.extend(chunk);
        }
        buffer.extend(b"next\n");

        assert_eq!(buffer.next_line().unwrap().unwrap(), record.trim());
        assert_eq!(buffer.next_line().unwrap().unwrap(), "next");
        assert!(buffer.next_line().is_none());
    }

    #[test]
    fn test_multibyte_char_split_across_chunks() {
        let mut buffer = CircularLineBuffer::with_capacity(64);
        let text = "答案\n".as_bytes();

        buffer.extend(&text[..2]);
        assert!(buffer.next_line().is_none());
        buffer.extend(&text[2..]);
        assert_eq!(buffer.next_line().unwrap().unwrap(), "答案");
    }

    #[test]
    fn test_take_remainder() {
        let mut buffer = CircularLineBuffer::with_capacity(64);
        buffer.extend(b"data: tail");
        assert_eq!(buffer.take_remainder().unwrap().unwrap(), "data: tail");
        assert!(buffer.take_remainder().is_none());
    }

    #[test]
    fn test_invalid_utf8_line_is_an_error() {
        let mut buffer = CircularLineBuffer::with_capacity(64);
        buffer.extend(&[0xff, 0xfe, b'\n', b'o', b'k', b'\n']);
        assert!(buffer.next_line().unwrap().is_err());
        assert_eq!(buffer.next_line().unwrap().unwrap(), "ok");
    }
}
