//! Response status codes

use std::fmt;

/// Status code carried in the first field of a response
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    NotFound,
    Error,
    ServerError,
    ClientError,
    Disconnected,
    NoAuth,
    /// Any status this client does not know by name
    Other(String),
}

impl Status {
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match bytes {
            b"ok" => Status::Ok,
            b"not_found" => Status::NotFound,
            b"error" => Status::Error,
            b"server_error" => Status::ServerError,
            b"client_error" => Status::ClientError,
            b"disconnected" => Status::Disconnected,
            b"noauth" => Status::NoAuth,
            other => Status::Other(String::from_utf8_lossy(other).into_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Status::Ok => "ok",
            Status::NotFound => "not_found",
            Status::Error => "error",
            Status::ServerError => "server_error",
            Status::ClientError => "client_error",
            Status::Disconnected => "disconnected",
            Status::NoAuth => "noauth",
            Status::Other(s) => s,
        }
    }

    pub fn is_ok(&self) -> bool {
        *self == Status::Ok
    }

    pub fn is_not_found(&self) -> bool {
        *self == Status::NotFound
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // pad() so width/alignment specifiers apply
        f.pad(self.as_str())
    }
}
