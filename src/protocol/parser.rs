//! Stream parser
//!
//! Reassembles response frames from an arbitrarily chunked byte stream.
//!
//! ## State Machine
//! ```text
//!            size line "N"               N bytes + "\n"
//!   ┌──────┐ ──────────────▶ ┌──────┐ ─────────────────┐
//!   │ Size │                 │ Data │                  │
//!   └──────┘ ◀────────────── └──────┘ ◀────────────────┘
//!      │        field pushed
//!      │ blank line
//!      ▼
//!   frame emitted, state reset
//! ```
//!
//! Consumed bytes are dropped from the front of the buffer as soon as they
//! are parsed; everything that has not been parsed stays buffered verbatim.

use bytes::{Buf, Bytes, BytesMut};

use crate::error::{Result, SsdbError};
use super::Frame;

/// Initial capacity of the input buffer
const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Parser stage for the next field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Waiting for a size line (or the blank terminator line)
    Size,
    /// Waiting for `pending_block_size` bytes plus their newline
    Data,
}

/// Incremental parser state for one connection
#[derive(Debug)]
pub struct ParserState {
    stage: Stage,
    pending_block_size: usize,
    assembled_fields: Vec<Bytes>,
    buffer: BytesMut,
}

impl ParserState {
    pub fn new() -> Self {
        Self {
            stage: Stage::Size,
            pending_block_size: 0,
            assembled_fields: Vec::new(),
            buffer: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
        }
    }

    /// Append freshly received bytes
    pub fn extend(&mut self, data: &[u8]) {
        self.buffer.extend_from_slice(data);
    }

    /// Start a new response: back to `Size` with no fields, buffer untouched
    pub fn reset(&mut self) {
        self.stage = Stage::Size;
        self.pending_block_size = 0;
        self.assembled_fields.clear();
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// Number of bytes received but not yet parsed
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Number of fields of the current frame parsed so far
    pub fn pending_fields(&self) -> usize {
        self.assembled_fields.len()
    }

    /// Try to complete a frame from the buffered bytes
    ///
    /// Returns `Ok(None)` when more input is required. A size line that is
    /// not a decimal length, or a field not followed by a newline, is a
    /// protocol error.
    pub fn parse(&mut self) -> Result<Option<Frame>> {
        loop {
            match self.stage {
                Stage::Size => {
                    let Some(pos) = self.buffer.iter().position(|&b| b == b'\n') else {
                        return Ok(None);
                    };
                    let line = self.buffer.split_to(pos + 1);
                    let text = std::str::from_utf8(&line)
                        .map_err(|_| SsdbError::Protocol("size line is not UTF-8".to_string()))?
                        .trim();

                    if text.is_empty() {
                        self.stage = Stage::Size;
                        let fields = std::mem::take(&mut self.assembled_fields);
                        return Ok(Some(Frame::new(fields)));
                    }

                    self.pending_block_size = text.parse().map_err(|_| {
                        SsdbError::Protocol(format!("invalid size line: {:?}", text))
                    })?;
                    self.stage = Stage::Data;
                }
                Stage::Data => {
                    let size = self.pending_block_size;
                    let Some(terminator) = self.terminator_len(size)? else {
                        return Ok(None);
                    };

                    let field = self.buffer.split_to(size).freeze();
                    self.buffer.advance(terminator);
                    self.assembled_fields.push(field);
                    self.stage = Stage::Size;
                }
            }
        }
    }

    /// Length of the newline after a `size`-byte field, once it is buffered
    fn terminator_len(&self, size: usize) -> Result<Option<usize>> {
        match self.buffer.get(size) {
            None => Ok(None),
            Some(b'\n') => Ok(Some(1)),
            Some(b'\r') => match self.buffer.get(size + 1) {
                None => Ok(None),
                Some(b'\n') => Ok(Some(2)),
                Some(_) => Err(missing_terminator(size)),
            },
            Some(_) => Err(missing_terminator(size)),
        }
    }
}

impl Default for ParserState {
    fn default() -> Self {
        Self::new()
    }
}

fn missing_terminator(size: usize) -> SsdbError {
    SsdbError::Protocol(format!("{}-byte field not followed by a newline", size))
}

/// Feed bytes into a parser state, handing the state back to the caller
///
/// ```
/// use ssdbkv::protocol::{feed, ParserState};
///
/// let (frame, state) = feed(ParserState::new(), b"2\nok\n").unwrap();
/// assert!(frame.is_none());
///
/// let (frame, _state) = feed(state, b"\n").unwrap();
/// assert_eq!(frame.unwrap().fields(), &[&b"ok"[..]]);
/// ```
pub fn feed(mut state: ParserState, input: &[u8]) -> Result<(Option<Frame>, ParserState)> {
    state.extend(input);
    let frame = state.parse()?;
    Ok((frame, state))
}
