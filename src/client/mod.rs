//! Client facades
//!
//! Two views over the same [`Session`], chosen at construction:
//!
//! - [`Client`] returns structured [`Reply`] values (status, value, message)
//! - [`EasyClient`] returns simplified [`Outcome`] values and always
//!   propagates transport errors
//!
//! ```no_run
//! use ssdbkv::{Client, Commands, Config};
//!
//! # fn main() -> ssdbkv::Result<()> {
//! let mut client = Client::connect(Config::builder().port(8888).build())?;
//! client.set("greeting", "hello")?;
//! let reply = client.get("greeting")?;
//! println!("{}", reply);
//! # Ok(())
//! # }
//! ```

mod batch;
mod commands;
mod shared;

use std::io::{Read, Write};
use std::net::TcpStream;

use crate::config::Config;
use crate::error::Result;
use crate::network::Session;
use crate::protocol::{Arg, Command, Outcome, Reply};

pub use batch::{Batch, EasyBatch};
pub use commands::Commands;
pub use shared::SharedClient;

// =============================================================================
// Structured client
// =============================================================================

/// Client returning structured replies
pub struct Client<S = TcpStream> {
    session: Session<S>,
}

impl Client<TcpStream> {
    /// Connect using the given configuration
    pub fn connect(config: Config) -> Result<Self> {
        Ok(Self {
            session: Session::connect(&config)?,
        })
    }

    /// Connect to `host:port` with default settings
    pub fn open(host: &str, port: u16) -> Result<Self> {
        Self::connect(Config::builder().host(host).port(port).build())
    }

    /// Set both read and write timeouts (milliseconds, 0 = blocking)
    pub fn set_timeout(&mut self, ms: u64) -> Result<()> {
        self.session.set_timeout(ms)
    }
}

impl<S: Read + Write> Client<S> {
    pub fn from_session(session: Session<S>) -> Self {
        Self { session }
    }

    /// Send a command and read its reply
    pub fn call(&mut self, command: Command, args: &[Arg]) -> Result<Reply> {
        self.session.request(command, args)
    }

    /// Send a command looked up by name
    pub fn call_str(&mut self, name: &str, args: &[Arg]) -> Result<Reply> {
        self.call(name.parse()?, args)
    }

    /// Stage a password for the next command
    pub fn auth(&mut self, password: impl Into<String>) {
        self.session.auth(password);
    }

    /// Start a pipelined batch
    pub fn batch(&mut self) -> Batch<'_, S> {
        Batch::new(&mut self.session)
    }

    /// The reply of the most recent request
    pub fn last_reply(&self) -> Option<&Reply> {
        self.session.last_reply()
    }

    pub fn close(&mut self) {
        self.session.close();
    }

    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }
}

impl<S: Read + Write> Commands for Client<S> {
    type Output = Reply;

    fn dispatch(&mut self, command: Command, args: &[Arg]) -> Result<Reply> {
        self.call(command, args)
    }
}

// =============================================================================
// Simplified client
// =============================================================================

/// Client returning simplified outcomes
///
/// `not_found` becomes [`Outcome::Absent`], any other non-`ok` status
/// becomes [`Outcome::Failed`]. Transport failures are returned as errors.
pub struct EasyClient<S = TcpStream> {
    session: Session<S>,
}

impl EasyClient<TcpStream> {
    /// Connect using the given configuration (strict mode is forced)
    pub fn connect(config: Config) -> Result<Self> {
        let config = Config {
            strict: true,
            ..config
        };
        Ok(Self {
            session: Session::connect(&config)?,
        })
    }

    /// Connect to `host:port` with default settings
    pub fn open(host: &str, port: u16) -> Result<Self> {
        Self::connect(Config::builder().host(host).port(port).build())
    }

    /// Set both read and write timeouts (milliseconds, 0 = blocking)
    pub fn set_timeout(&mut self, ms: u64) -> Result<()> {
        self.session.set_timeout(ms)
    }
}

impl<S: Read + Write> EasyClient<S> {
    /// Wrap a connection; the session is always strict
    pub fn from_connection(conn: crate::network::Connection<S>) -> Self {
        Self {
            session: Session::new(conn, true),
        }
    }

    /// Send a command and collapse its reply
    pub fn call(&mut self, command: Command, args: &[Arg]) -> Result<Outcome> {
        Ok(self.session.request(command, args)?.into_outcome())
    }

    /// Send a command looked up by name
    pub fn call_str(&mut self, name: &str, args: &[Arg]) -> Result<Outcome> {
        self.call(name.parse()?, args)
    }

    /// Stage a password for the next command
    pub fn auth(&mut self, password: impl Into<String>) {
        self.session.auth(password);
    }

    /// Start a pipelined batch
    pub fn batch(&mut self) -> EasyBatch<'_, S> {
        EasyBatch::new(&mut self.session)
    }

    /// The full reply behind the most recent outcome
    pub fn last_reply(&self) -> Option<&Reply> {
        self.session.last_reply()
    }

    pub fn close(&mut self) {
        self.session.close();
    }

    pub fn is_closed(&self) -> bool {
        self.session.is_closed()
    }
}

impl<S: Read + Write> Commands for EasyClient<S> {
    type Output = Outcome;

    fn dispatch(&mut self, command: Command, args: &[Arg]) -> Result<Outcome> {
        self.call(command, args)
    }
}
