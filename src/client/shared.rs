//! Shared client
//!
//! The session (socket plus parser state) is order-dependent, so sharing
//! across threads locks the whole client for each use.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::Result;
use crate::protocol::{Arg, Command, Reply};
use super::Client;

/// A [`Client`] behind a mutex, cheap to clone across threads
pub struct SharedClient<S = TcpStream> {
    inner: Arc<Mutex<Client<S>>>,
}

impl<S: Read + Write> SharedClient<S> {
    pub fn new(client: Client<S>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(client)),
        }
    }

    /// Run `f` with exclusive access to the client
    ///
    /// Use this for batches so no other thread can interleave requests.
    pub fn with<R>(&self, f: impl FnOnce(&mut Client<S>) -> R) -> R {
        let mut guard = self.inner.lock();
        f(&mut guard)
    }

    /// Send one command under the lock
    pub fn call(&self, command: Command, args: &[Arg]) -> Result<Reply> {
        self.inner.lock().call(command, args)
    }
}

impl<S> Clone for SharedClient<S> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S: Read + Write> From<Client<S>> for SharedClient<S> {
    fn from(client: Client<S>) -> Self {
        Self::new(client)
    }
}
