//! Protocol codec
//!
//! Request encoding and the write side of the wire protocol.
//!
//! ## Wire Format
//!
//! ```text
//! ["set", "foo", "bar"]
//!
//! 3\nset\n3\nfoo\n3\nbar\n\n
//! ```
//!
//! Lengths are explicit, so no escaping is applied to field bytes.

use std::io::{ErrorKind, Write};

use bytes::{BufMut, BytesMut};

use crate::error::{Result, SsdbError};

// =============================================================================
// Encoding
// =============================================================================

/// Encode a list of fields into one request frame
pub fn encode<T: AsRef<[u8]>>(fields: &[T]) -> BytesMut {
    let body: usize = fields.iter().map(|f| f.as_ref().len() + 12).sum();
    let mut message = BytesMut::with_capacity(body + 1);

    for field in fields {
        let field = field.as_ref();
        message.put_slice(field.len().to_string().as_bytes());
        message.put_u8(b'\n');
        message.put_slice(field);
        message.put_u8(b'\n');
    }
    message.put_u8(b'\n');

    message
}

// =============================================================================
// Stream-based I/O helpers
// =============================================================================

/// Encode and write a request, retrying partial writes until flushed
///
/// Returns the number of bytes written. A write that accepts zero bytes
/// means the peer is gone.
pub fn write_request<W: Write, T: AsRef<[u8]>>(writer: &mut W, fields: &[T]) -> Result<usize> {
    let bytes = encode(fields);
    tracing::trace!("> {}", escape(&bytes));

    let mut remaining = &bytes[..];
    while !remaining.is_empty() {
        match writer.write(remaining) {
            Ok(0) => {
                return Err(SsdbError::ConnectionLost(
                    "write returned zero bytes".to_string(),
                ))
            }
            Ok(n) => remaining = &remaining[n..],
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(io_error(e)),
        }
    }
    writer.flush().map_err(io_error)?;

    Ok(bytes.len())
}

/// Map a socket error onto the client taxonomy
pub(crate) fn io_error(e: std::io::Error) -> SsdbError {
    match e.kind() {
        // Windows reports TimedOut where Unix reports WouldBlock
        ErrorKind::WouldBlock | ErrorKind::TimedOut => SsdbError::Timeout,
        ErrorKind::WriteZero
        | ErrorKind::UnexpectedEof
        | ErrorKind::BrokenPipe
        | ErrorKind::ConnectionReset
        | ErrorKind::ConnectionAborted => SsdbError::ConnectionLost(e.to_string()),
        _ => SsdbError::Io(e),
    }
}

/// Render raw protocol bytes on one log line
pub(crate) fn escape(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes)
        .replace('\r', "\\r")
        .replace('\n', "\\n")
}
