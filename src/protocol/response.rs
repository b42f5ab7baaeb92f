//! Response definitions
//!
//! Typed replies produced from response frames.

use std::fmt;

use bytes::Bytes;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use super::{Command, Status};

/// A decoded payload value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Float(f64),
    Bool(bool),
    Bytes(Bytes),
    List(Vec<Bytes>),
    /// Ordered key/value pairs, in response order
    Map(Vec<(Bytes, Value)>),
}

impl Value {
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Bytes]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&[(Bytes, Value)]> {
        match self {
            Value::Map(pairs) => Some(pairs),
            _ => None,
        }
    }

    /// Look up a key in a map value
    pub fn get(&self, key: impl AsRef<[u8]>) -> Option<&Value> {
        let key = key.as_ref();
        self.as_map()?
            .iter()
            .find(|(k, _)| k.as_ref() == key)
            .map(|(_, v)| v)
    }
}

/// Insert keeping first-seen order; a repeated key overwrites in place
pub(crate) fn insert_pair(pairs: &mut Vec<(Bytes, Value)>, key: Bytes, value: Value) {
    match pairs.iter_mut().find(|(k, _)| *k == key) {
        Some(slot) => slot.1 = value,
        None => pairs.push((key, value)),
    }
}

fn lossy(b: &[u8]) -> std::borrow::Cow<'_, str> {
    String::from_utf8_lossy(b)
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Int(n) => serializer.serialize_i64(*n),
            Value::Float(f) => serializer.serialize_f64(*f),
            Value::Bool(b) => serializer.serialize_bool(*b),
            Value::Bytes(b) => serializer.serialize_str(&lossy(b)),
            Value::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(&lossy(item))?;
                }
                seq.end()
            }
            Value::Map(pairs) => {
                let mut map = serializer.serialize_map(Some(pairs.len()))?;
                for (k, v) in pairs {
                    map.serialize_entry(&lossy(k), v)?;
                }
                map.end()
            }
        }
    }
}

/// The typed result of one request
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Command that produced this reply
    pub command: Command,

    /// Status code
    pub status: Status,

    /// Decoded payload (only for `ok`)
    pub value: Option<Value>,

    /// Human-readable message (only for non-`ok`)
    pub message: Option<String>,
}

impl Reply {
    /// Create an OK reply
    pub fn ok(command: Command, value: Value) -> Self {
        Self {
            command,
            status: Status::Ok,
            value: Some(value),
            message: None,
        }
    }

    /// Create a non-OK reply with an optional message
    pub fn failure(command: Command, status: Status, message: Option<String>) -> Self {
        Self {
            command,
            status,
            value: None,
            message,
        }
    }

    /// The reply used when a response does not match its family's shape
    pub fn invalid(command: Command) -> Self {
        Self::failure(
            command,
            Status::ServerError,
            Some("Invalid response".to_string()),
        )
    }

    /// A transport failure folded into a reply
    pub fn error(command: Command, message: impl Into<String>) -> Self {
        Self::failure(command, Status::Error, Some(message.into()))
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    pub fn is_not_found(&self) -> bool {
        self.status.is_not_found()
    }

    /// Collapse into the simplified-mode outcome
    pub fn into_outcome(self) -> Outcome {
        match (self.status, self.value) {
            (Status::NotFound, _) => Outcome::Absent,
            (Status::Ok, Some(value)) => Outcome::Value(value),
            _ => Outcome::Failed,
        }
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let detail = if self.status.is_ok() {
            match &self.value {
                Some(v) => serde_json::to_string(v).map_err(|_| fmt::Error)?,
                None => String::new(),
            }
        } else {
            self.message.clone().unwrap_or_default()
        };
        write!(f, "{:<13} {:>12} {}", self.command, self.status, detail)
    }
}

/// Simplified-mode result
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// `ok` with its decoded value
    Value(Value),
    /// `not_found`
    Absent,
    /// Any other status
    Failed,
}

impl Outcome {
    pub fn value(&self) -> Option<&Value> {
        match self {
            Outcome::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<Value> {
        match self {
            Outcome::Value(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed)
    }
}

impl Serialize for Outcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Outcome::Value(v) => v.serialize(serializer),
            Outcome::Absent => serializer.serialize_none(),
            Outcome::Failed => serializer.serialize_bool(false),
        }
    }
}
