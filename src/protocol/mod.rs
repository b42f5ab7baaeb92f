//! Protocol Module
//!
//! Defines the wire protocol spoken between client and server.
//!
//! ## Frame Format
//!
//! Requests and responses share one shape: a list of length-prefixed fields
//! closed by a blank line.
//!
//! ```text
//! ┌──────────┬────┬──────────────┬────┐
//! │ len (10) │ \n │ field bytes  │ \n │   repeated per field
//! └──────────┴────┴──────────────┴────┘
//! ┌────┐
//! │ \n │                                  frame terminator
//! └────┘
//! ```
//!
//! `len` is the decimal ASCII byte length of the field. Field bytes are
//! arbitrary binary data, so a field may contain newlines.
//!
//! ### Requests
//! Field 1 is the lower-cased command name, the rest are its arguments.
//!
//! ### Responses
//! Field 1 is the status code:
//! - `ok`
//! - `not_found`
//! - `error`, `server_error`, `client_error`
//! - `noauth`
//!
//! The remaining fields are decoded per command family, see [`interpret`].

mod codec;
mod command;
mod frame;
mod interpret;
mod parser;
mod response;
mod status;

pub use codec::{encode, write_request};
pub(crate) use codec::{escape, io_error};
pub use command::{flatten_args, Arg, Command, Family};
pub use frame::Frame;
pub use interpret::{interpret, parse_float, parse_int};
pub use parser::{feed, ParserState, Stage};
pub use response::{Outcome, Reply, Value};
pub use status::Status;
