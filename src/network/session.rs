//! Session
//!
//! Request/response sequencing on top of a [`Connection`]: deferred auth,
//! batch pipelining, and the strict/non-strict error policy.
//!
//! ## Batch Mode
//! ```text
//!   begin_batch()          exec_batch()
//! Idle ─────────▶ Batching ─────────▶ Idle
//!                  │   ▲
//!                  └───┘ call(): queued
//! ```
//! The protocol has no request ids; responses are matched to requests
//! purely by order.

use std::io::{Read, Write};
use std::net::TcpStream;

use bytes::Bytes;

use crate::config::Config;
use crate::error::{Result, SsdbError};
use crate::protocol::{flatten_args, interpret, Arg, Command, Reply, Status, Value};
use super::Connection;

/// A queued batch entry: command and flattened arguments
type Pending = (Command, Vec<Bytes>);

/// One client session over one connection
pub struct Session<S = TcpStream> {
    conn: Connection<S>,

    /// Fold transport failures into `error` replies unless set
    strict: bool,

    /// Password to send before the next real command
    pending_auth: Option<String>,

    /// Some while in batch mode
    batch: Option<Vec<Pending>>,

    last_reply: Option<Reply>,
}

impl Session<TcpStream> {
    /// Connect using the given configuration
    pub fn connect(config: &Config) -> Result<Self> {
        let conn = Connection::connect(config)?;
        let mut session = Self::new(conn, config.strict);
        if let Some(password) = &config.password {
            session.auth(password.clone());
        }
        Ok(session)
    }

    /// Set both read and write timeouts (milliseconds, 0 = blocking)
    pub fn set_timeout(&mut self, ms: u64) -> Result<()> {
        self.conn.set_timeouts(ms, ms)
    }
}

impl<S: Read + Write> Session<S> {
    pub fn new(conn: Connection<S>, strict: bool) -> Self {
        Self {
            conn,
            strict,
            pending_auth: None,
            batch: None,
            last_reply: None,
        }
    }

    pub fn is_strict(&self) -> bool {
        self.strict
    }

    /// Stage a password; it is sent before the next command, not now
    pub fn auth(&mut self, password: impl Into<String>) {
        self.pending_auth = Some(password.into());
    }

    /// Whether a staged password is still waiting to be sent
    pub fn has_pending_auth(&self) -> bool {
        self.pending_auth.is_some()
    }

    /// Issue a command, or queue it while batching
    ///
    /// Returns `Ok(None)` when the command was queued.
    pub fn call(&mut self, command: Command, args: &[Arg]) -> Result<Option<Reply>> {
        if self.is_batching() {
            self.queue(command, args);
            return Ok(None);
        }
        self.request(command, args).map(Some)
    }

    /// Issue a command by name; unknown names are rejected
    pub fn call_str(&mut self, name: &str, args: &[Arg]) -> Result<Option<Reply>> {
        let command = name.parse()?;
        self.call(command, args)
    }

    /// Send one command and read its reply, ignoring batch mode
    pub fn request(&mut self, command: Command, args: &[Arg]) -> Result<Reply> {
        self.flush_auth()?;

        let args = flatten_args(args);
        let reply = match self.round_trip(command, &args) {
            Ok(reply) => reply,
            Err(e) => self.fold(command, e)?,
        };

        if reply.status == Status::NoAuth {
            let message = reply.message.clone().unwrap_or_default();
            self.last_reply = Some(reply);
            return Err(SsdbError::NoAuth(message));
        }

        self.last_reply = Some(reply.clone());
        Ok(reply)
    }

    // =========================================================================
    // Batch Mode
    // =========================================================================

    /// Enter batch mode, dropping anything queued before
    pub fn begin_batch(&mut self) {
        self.batch = Some(Vec::new());
    }

    pub fn is_batching(&self) -> bool {
        self.batch.is_some()
    }

    /// Number of queued commands
    pub fn queued(&self) -> usize {
        self.batch.as_ref().map_or(0, Vec::len)
    }

    /// Queue a command (enters batch mode if needed)
    pub fn queue(&mut self, command: Command, args: &[Arg]) {
        self.batch
            .get_or_insert_with(Vec::new)
            .push((command, flatten_args(args)));
    }

    /// Leave batch mode without sending anything
    pub fn discard_batch(&mut self) {
        self.batch = None;
    }

    /// Send every queued request, then read one reply per request in order
    ///
    /// Batch mode ends and the queue is cleared whatever happens. Error
    /// statuses stay per reply; a transport failure fails the remaining
    /// replies (or the whole call in strict mode).
    pub fn exec_batch(&mut self) -> Result<Vec<Reply>> {
        let queue = self.batch.take().unwrap_or_default();
        if queue.is_empty() {
            return Ok(Vec::new());
        }
        self.flush_auth()?;

        tracing::debug!("Executing batch of {} commands", queue.len());

        let mut sent = 0;
        let mut send_error = None;
        for (command, args) in &queue {
            match self.conn.send(&request_fields(*command, args)) {
                Ok(_) => sent += 1,
                Err(e) => {
                    send_error = Some(e);
                    break;
                }
            }
        }

        let unsent_message = match send_error {
            Some(e) if self.strict || !foldable(&e) => return Err(e),
            Some(e) => e.to_string(),
            None => String::new(),
        };

        let mut replies = Vec::with_capacity(queue.len());
        for (i, (command, args)) in queue.into_iter().enumerate() {
            let reply = if i < sent {
                match self.conn.recv() {
                    Ok(frame) => interpret(command, frame, &args),
                    Err(e) => self.fold(command, e)?,
                }
            } else {
                Reply::error(command, unsent_message.clone())
            };
            replies.push(reply);
        }

        self.last_reply = replies.last().cloned();
        Ok(replies)
    }

    // =========================================================================
    // Connection
    // =========================================================================

    pub fn last_reply(&self) -> Option<&Reply> {
        self.last_reply.as_ref()
    }

    pub fn close(&mut self) {
        self.conn.close();
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_closed()
    }

    fn round_trip(&mut self, command: Command, args: &[Bytes]) -> Result<Reply> {
        self.conn.send(&request_fields(command, args))?;
        let frame = self.conn.recv()?;
        Ok(interpret(command, frame, args))
    }

    /// Send the staged password; the real command must not go out on failure
    fn flush_auth(&mut self) -> Result<()> {
        let Some(password) = self.pending_auth.take() else {
            return Ok(());
        };

        let reply = self
            .round_trip(Command::Auth, &[Bytes::from(password)])
            .map_err(|e| SsdbError::AuthFailed(e.to_string()))?;

        match reply.value {
            Some(Value::Bool(true)) => {
                tracing::debug!("Authenticated with {}", self.conn.peer_addr());
                Ok(())
            }
            _ => {
                let message = reply
                    .message
                    .unwrap_or_else(|| format!("server replied {}", reply.status));
                tracing::warn!("Authentication rejected: {}", message);
                Err(SsdbError::AuthFailed(message))
            }
        }
    }

    /// Non-strict mode turns transport and protocol failures into replies
    fn fold(&self, command: Command, e: SsdbError) -> Result<Reply> {
        if self.strict || !foldable(&e) {
            return Err(e);
        }
        let reply = match e {
            SsdbError::Protocol(message) => {
                Reply::failure(command, Status::ServerError, Some(message))
            }
            other => Reply::error(command, other.to_string()),
        };
        Ok(reply)
    }
}

fn foldable(e: &SsdbError) -> bool {
    e.is_transport() || matches!(e, SsdbError::Protocol(_))
}

/// `[name, args...]`
fn request_fields(command: Command, args: &[Bytes]) -> Vec<Bytes> {
    let mut fields = Vec::with_capacity(args.len() + 1);
    fields.push(Bytes::from_static(command.name().as_bytes()));
    fields.extend(args.iter().cloned());
    fields
}
