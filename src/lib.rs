//! # ssdbkv
//!
//! A blocking client for SSDB-style key-value stores:
//! - Length-prefixed text protocol with an incremental stream parser
//! - Typed replies per command family (integers, scalars, lists, maps)
//! - Deferred authentication
//! - Pipelined batch mode
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │          Client (Reply)        EasyClient (Outcome)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │ command + args
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                      Session                                 │
//! │           (deferred auth, batch queue, strict mode)          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │    Codec    │          │   Parser    │──▶ Interpreter
//!   │  (encode)   │          │ (reassemble)│     (per family)
//!   └──────┬──────┘          └──────▲──────┘
//!          │                        │
//!          ▼                        │
//!   ┌──────────────────────────────────────┐
//!   │              Connection              │
//!   │              (TcpStream)             │
//!   └──────────────────────────────────────┘
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod client;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SsdbError, Result};
pub use config::Config;
pub use client::{Batch, Client, Commands, EasyBatch, EasyClient, SharedClient};
pub use protocol::{Arg, Command, Outcome, Reply, Status, Value};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of ssdbkv
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
