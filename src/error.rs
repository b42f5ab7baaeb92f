//! Error types for ssdbkv
//!
//! Provides a unified error type for all client operations.
//!
//! Application statuses returned by the server (`not_found`, `error`, ...)
//! are not errors; they travel inside a [`Reply`](crate::protocol::Reply).

use thiserror::Error;

/// Result type alias using SsdbError
pub type Result<T> = std::result::Result<T, SsdbError>;

/// Unified error type for ssdbkv operations
#[derive(Debug, Error)]
pub enum SsdbError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Connection Errors
    // -------------------------------------------------------------------------
    #[error("Connection lost: {0}")]
    ConnectionLost(String),

    #[error("Connection closed")]
    ConnectionClosed,

    #[error("Connection timeout")]
    Timeout,

    // -------------------------------------------------------------------------
    // Protocol Errors
    // -------------------------------------------------------------------------
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Unknown command: {0}")]
    UnknownCommand(String),

    // -------------------------------------------------------------------------
    // Authentication Errors
    // -------------------------------------------------------------------------
    #[error("Not authenticated: {0}")]
    NoAuth(String),

    #[error("Authentication failed: {0}")]
    AuthFailed(String),

    // -------------------------------------------------------------------------
    // Serialization Errors
    // -------------------------------------------------------------------------
    #[error("Serialization error: {0}")]
    Serialization(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl SsdbError {
    /// Whether the connection is unusable after this error
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            SsdbError::Io(_)
                | SsdbError::ConnectionLost(_)
                | SsdbError::ConnectionClosed
                | SsdbError::Protocol(_)
        )
    }

    /// Transport-level failures, the ones a non-strict client folds into an
    /// `error` reply instead of returning
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            SsdbError::Io(_)
                | SsdbError::ConnectionLost(_)
                | SsdbError::ConnectionClosed
                | SsdbError::Timeout
        )
    }
}
