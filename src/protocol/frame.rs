//! Frame definition
//!
//! One complete request or response unit.

use bytes::Bytes;

/// An ordered list of opaque byte-string fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    fields: Vec<Bytes>,
}

impl Frame {
    pub fn new(fields: Vec<Bytes>) -> Self {
        Self { fields }
    }

    /// Build a frame from anything byte-like, mostly for tests
    pub fn from_parts<I, T>(parts: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: AsRef<[u8]>,
    {
        Self {
            fields: parts
                .into_iter()
                .map(|p| Bytes::copy_from_slice(p.as_ref()))
                .collect(),
        }
    }

    /// The status code field, if any
    pub fn status(&self) -> Option<&Bytes> {
        self.fields.first()
    }

    /// Every field after the status
    pub fn payload(&self) -> &[Bytes] {
        self.fields.get(1..).unwrap_or(&[])
    }

    pub fn fields(&self) -> &[Bytes] {
        &self.fields
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
