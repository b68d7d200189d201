//! Line framing for the serial channels.
//!
//! Bytes are accumulated until the `\n` terminator. Framing rules:
//! - `\n` completes the pending line; the buffer is emptied before the
//!   completed line is handed back, so the next byte always starts fresh
//! - `\r` is dropped (peers printing with CRLF line endings)
//! - a line longer than [`MAX_LINE_LEN`] is rejected once with
//!   [`LineError::Overflow`]; everything up to the next terminator is then
//!   discarded and framing resumes on the following line

use heapless::{String, Vec};

/// Message terminator byte
pub const LINE_TERMINATOR: u8 = b'\n';

/// Carriage return, ignored wherever it appears
const CARRIAGE_RETURN: u8 = b'\r';

/// Maximum line length in bytes, terminator excluded
pub const MAX_LINE_LEN: usize = 30;

/// A completed line, owned by the caller
pub type Line = String<MAX_LINE_LEN>;

/// Errors that can occur while framing lines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LineError {
    /// Line exceeded the buffer capacity before a terminator arrived
    Overflow,
    /// Completed line is not valid UTF-8
    InvalidEncoding,
}

impl LineError {
    /// Diagnostic text reported on the operator console
    pub fn message(&self) -> &'static str {
        match self {
            LineError::Overflow => "message too long",
            LineError::InvalidEncoding => "invalid characters",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FramerState {
    /// Appending bytes to the current line
    Receiving,
    /// Dropping bytes until the next terminator after an overflow
    Discarding,
}

/// Line buffer for one serial channel
#[derive(Debug, Clone)]
pub struct LineFramer {
    state: FramerState,
    buffer: Vec<u8, MAX_LINE_LEN>,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    /// Create an empty framer
    pub fn new() -> Self {
        Self {
            state: FramerState::Receiving,
            buffer: Vec::new(),
        }
    }

    /// Drop any partial line and leave discard mode
    pub fn reset(&mut self) {
        self.state = FramerState::Receiving;
        self.buffer.clear();
    }

    /// Number of bytes buffered for the pending line
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Check whether no partial line is buffered
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    /// Check whether the framer is skipping the remainder of an oversized line
    pub fn is_discarding(&self) -> bool {
        self.state == FramerState::Discarding
    }

    /// Feed a single byte to the framer
    ///
    /// Returns `Ok(Some(line))` when the byte completed a line, `Ok(None)`
    /// when more bytes are needed, or `Err` when the pending line had to be
    /// dropped.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Line>, LineError> {
        match (self.state, byte) {
            (_, CARRIAGE_RETURN) => Ok(None),
            (FramerState::Discarding, LINE_TERMINATOR) => {
                self.reset();
                Ok(None)
            }
            (FramerState::Discarding, _) => Ok(None),
            (FramerState::Receiving, LINE_TERMINATOR) => self.complete().map(Some),
            (FramerState::Receiving, _) => {
                if self.buffer.push(byte).is_err() {
                    self.buffer.clear();
                    self.state = FramerState::Discarding;
                    return Err(LineError::Overflow);
                }
                Ok(None)
            }
        }
    }

    /// Feed multiple bytes to the framer
    ///
    /// Returns the first complete line found, if any.
    /// Remaining bytes after a complete line are not consumed.
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Result<Option<Line>, LineError> {
        for &byte in bytes {
            if let Some(line) = self.feed(byte)? {
                return Ok(Some(line));
            }
        }
        Ok(None)
    }

    /// Hand out the buffered line and empty the buffer
    fn complete(&mut self) -> Result<Line, LineError> {
        let result = core::str::from_utf8(&self.buffer)
            .map_err(|_| LineError::InvalidEncoding)
            .and_then(|text| {
                let mut line = Line::new();
                line.push_str(text).map_err(|_| LineError::Overflow)?;
                Ok(line)
            });
        self.buffer.clear();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_completes_on_terminator() {
        let mut framer = LineFramer::new();
        assert_eq!(framer.feed_bytes(b"start").unwrap(), None);
        assert_eq!(framer.len(), 5);

        let line = framer.feed(b'\n').unwrap().unwrap();
        assert_eq!(line.as_str(), "start");
        assert!(framer.is_empty());
    }

    #[test]
    fn test_buffer_empty_between_lines() {
        let mut framer = LineFramer::new();
        let first = framer.feed_bytes(b"finished\n").unwrap().unwrap();
        assert_eq!(first.as_str(), "finished");
        assert!(framer.is_empty());

        let second = framer.feed_bytes(b"go\n").unwrap().unwrap();
        assert_eq!(second.as_str(), "go");
    }

    #[test]
    fn test_shorter_line_does_not_see_stale_bytes() {
        let mut framer = LineFramer::new();
        framer.feed_bytes(b"stepper-rotate 360 2\n").unwrap();
        let line = framer.feed_bytes(b"help\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "help");
    }

    #[test]
    fn test_carriage_return_dropped() {
        let mut framer = LineFramer::new();
        let line = framer.feed_bytes(b"finished\r\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "finished");
    }

    #[test]
    fn test_empty_line() {
        let mut framer = LineFramer::new();
        let line = framer.feed(b'\n').unwrap().unwrap();
        assert!(line.is_empty());
    }

    #[test]
    fn test_line_at_capacity_is_accepted() {
        let mut framer = LineFramer::new();
        let exact = [b'a'; MAX_LINE_LEN];
        assert_eq!(framer.feed_bytes(&exact).unwrap(), None);
        let line = framer.feed(b'\n').unwrap().unwrap();
        assert_eq!(line.len(), MAX_LINE_LEN);
    }

    #[test]
    fn test_overflow_reported_once_then_resyncs() {
        let mut framer = LineFramer::new();
        let exact = [b'x'; MAX_LINE_LEN];
        framer.feed_bytes(&exact).unwrap();

        assert_eq!(framer.feed(b'y'), Err(LineError::Overflow));
        assert!(framer.is_discarding());
        assert!(framer.is_empty());

        // Rest of the oversized line is dropped silently
        assert_eq!(framer.feed_bytes(b"yyyy\n").unwrap(), None);
        assert!(!framer.is_discarding());

        let line = framer.feed_bytes(b"start\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "start");
    }

    #[test]
    fn test_invalid_utf8_rejected_and_cleared() {
        let mut framer = LineFramer::new();
        framer.feed_bytes(&[0xFF, 0xFE]).unwrap();
        assert_eq!(framer.feed(b'\n'), Err(LineError::InvalidEncoding));
        assert!(framer.is_empty());
    }

    #[test]
    fn test_reset_drops_partial_line() {
        let mut framer = LineFramer::new();
        framer.feed_bytes(b"fini").unwrap();
        framer.reset();
        let line = framer.feed_bytes(b"start\n").unwrap().unwrap();
        assert_eq!(line.as_str(), "start");
    }
}
