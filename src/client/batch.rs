//! Batch handles
//!
//! Chainable builders that queue commands on a session and pipeline them
//! on `exec`. Dropping a handle without executing discards the queue.

use std::io::{Read, Write};
use std::net::TcpStream;

use crate::error::{Result, SsdbError};
use crate::network::Session;
use crate::protocol::{Arg, Command, Outcome, Reply, Status};

/// Pipelined batch returning structured replies
pub struct Batch<'a, S: Read + Write = TcpStream> {
    session: &'a mut Session<S>,
}

impl<'a, S: Read + Write> Batch<'a, S> {
    pub(crate) fn new(session: &'a mut Session<S>) -> Self {
        session.begin_batch();
        Self { session }
    }

    /// Queue a command
    pub fn cmd(&mut self, command: Command, args: &[Arg]) -> &mut Self {
        self.session.queue(command, args);
        self
    }

    /// Queue a command looked up by name
    pub fn call(&mut self, name: &str, args: &[Arg]) -> Result<&mut Self> {
        let command = name.parse()?;
        Ok(self.cmd(command, args))
    }

    /// Number of queued commands
    pub fn len(&self) -> usize {
        self.session.queued()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Send everything, then read one reply per command in queue order
    pub fn exec(self) -> Result<Vec<Reply>> {
        self.session.exec_batch()
    }
}

impl<S: Read + Write> Drop for Batch<'_, S> {
    fn drop(&mut self) {
        if self.session.queued() > 0 {
            tracing::debug!("Discarding {} unexecuted batch commands", self.session.queued());
        }
        self.session.discard_batch();
    }
}

/// Pipelined batch returning simplified outcomes
pub struct EasyBatch<'a, S: Read + Write = TcpStream> {
    inner: Batch<'a, S>,
}

impl<'a, S: Read + Write> EasyBatch<'a, S> {
    pub(crate) fn new(session: &'a mut Session<S>) -> Self {
        Self {
            inner: Batch::new(session),
        }
    }

    /// Queue a command
    pub fn cmd(&mut self, command: Command, args: &[Arg]) -> &mut Self {
        self.inner.cmd(command, args);
        self
    }

    /// Queue a command looked up by name
    pub fn call(&mut self, name: &str, args: &[Arg]) -> Result<&mut Self> {
        self.inner.call(name, args)?;
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Send everything and collapse each reply
    ///
    /// A `noauth` reply anywhere in the batch fails the whole call, since
    /// `Outcome` has no way to tell it apart from an ordinary failure.
    pub fn exec(self) -> Result<Vec<Outcome>> {
        let replies = self.inner.exec()?;
        if let Some(denied) = replies.iter().find(|r| r.status == Status::NoAuth) {
            return Err(SsdbError::NoAuth(denied.message.clone().unwrap_or_default()));
        }
        Ok(replies.into_iter().map(Reply::into_outcome).collect())
    }
}
