//! Connection
//!
//! Owns the byte stream and the parser state for one server connection.

use std::io::{ErrorKind, Read, Write};
use std::net::TcpStream;
use std::time::Duration;

use bytes::Bytes;

use crate::config::{millis, Config, DEFAULT_READ_BUFFER_SIZE};
use crate::error::{Result, SsdbError};
use crate::protocol::{escape, io_error, write_request, Frame, ParserState};

/// A single blocking connection
///
/// Generic over the stream so the protocol engine can run against
/// in-memory transports; production code uses `TcpStream`.
pub struct Connection<S = TcpStream> {
    /// None once closed
    stream: Option<S>,

    /// Incremental response parser (keeps leftover bytes between reads)
    parser: ParserState,

    /// Scratch space for one socket read
    read_buf: Vec<u8>,

    /// Peer address for logging
    peer_addr: String,
}

impl Connection<TcpStream> {
    /// Connect to the configured server and apply its timeouts
    pub fn connect(config: &Config) -> Result<Self> {
        let addr = config.socket_addr()?;

        let stream = match config.connect_timeout() {
            Some(timeout) => TcpStream::connect_timeout(&addr, timeout),
            None => TcpStream::connect(addr),
        }
        .map_err(|e| {
            tracing::warn!("Failed to connect to {}: {}", addr, e);
            SsdbError::Io(e)
        })?;

        // Disable Nagle's algorithm for low latency
        stream.set_nodelay(true)?;

        let mut conn = Self::from_stream(stream, config.read_buffer_size);
        conn.peer_addr = addr.to_string();
        conn.apply_timeouts(config.read_timeout(), config.write_timeout())?;

        tracing::debug!("Connected to {}", conn.peer_addr);
        Ok(conn)
    }

    /// Configure socket timeouts (0 = block forever)
    pub fn set_timeouts(&mut self, read_ms: u64, write_ms: u64) -> Result<()> {
        self.apply_timeouts(millis(read_ms), millis(write_ms))
    }

    fn apply_timeouts(&mut self, read: Option<Duration>, write: Option<Duration>) -> Result<()> {
        let stream = self.stream.as_ref().ok_or(SsdbError::ConnectionClosed)?;
        stream.set_read_timeout(read)?;
        stream.set_write_timeout(write)?;
        Ok(())
    }
}

impl<S: Read + Write> Connection<S> {
    /// Wrap an already-connected stream
    pub fn from_stream(stream: S, read_buffer_size: usize) -> Self {
        let size = if read_buffer_size == 0 {
            DEFAULT_READ_BUFFER_SIZE
        } else {
            read_buffer_size
        };
        Self {
            stream: Some(stream),
            parser: ParserState::new(),
            read_buf: vec![0; size],
            peer_addr: "stream".to_string(),
        }
    }

    /// Write one request frame
    ///
    /// Every write failure closes the connection, timeouts included: part
    /// of the frame may already be on the wire.
    pub fn send(&mut self, fields: &[Bytes]) -> Result<usize> {
        let stream = self.stream.as_mut().ok_or(SsdbError::ConnectionClosed)?;
        match write_request(stream, fields) {
            Ok(n) => Ok(n),
            Err(SsdbError::Timeout) => Err(self.fail(SsdbError::ConnectionLost(
                "write timed out".to_string(),
            ))),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Read one complete response frame
    ///
    /// Blocks for at most the read timeout per socket read. A timeout
    /// leaves the connection open; end-of-stream or any other error
    /// closes it.
    pub fn recv(&mut self) -> Result<Frame> {
        if self.stream.is_none() {
            return Err(SsdbError::ConnectionClosed);
        }
        self.parser.reset();

        loop {
            match self.parser.parse() {
                Ok(Some(frame)) => return Ok(frame),
                Ok(None) => {}
                Err(e) => return Err(self.fail(e)),
            }

            let stream = self.stream.as_mut().ok_or(SsdbError::ConnectionClosed)?;
            match stream.read(&mut self.read_buf) {
                Ok(0) => {
                    return Err(self.fail(SsdbError::ConnectionLost(
                        "peer closed the connection".to_string(),
                    )))
                }
                Ok(n) => {
                    tracing::trace!("< {}", escape(&self.read_buf[..n]));
                    self.parser.extend(&self.read_buf[..n]);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(self.fail(io_error(e))),
            }
        }
    }

    /// Close the connection; further I/O fails with `ConnectionClosed`
    pub fn close(&mut self) {
        if self.stream.take().is_some() {
            tracing::debug!("Connection to {} closed", self.peer_addr);
        }
    }

    pub fn is_closed(&self) -> bool {
        self.stream.is_none()
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    /// Close on fatal errors and hand the error back
    fn fail(&mut self, e: SsdbError) -> SsdbError {
        match e {
            SsdbError::Timeout => {
                tracing::debug!("Timeout talking to {}", self.peer_addr);
            }
            ref fatal => {
                tracing::warn!("Connection to {} failed: {}", self.peer_addr, fatal);
                self.close();
            }
        }
        e
    }
}
