//! Network Module
//!
//! Blocking TCP transport and session handling.
//!
//! ## Architecture
//! - One connection per session, one caller at a time
//! - Requests are written in full before any read
//! - Responses are read in request order (no request ids on the wire)

mod connection;
mod session;

pub use connection::Connection;
pub use session::Session;
