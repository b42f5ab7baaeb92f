//! Response interpreter
//!
//! Turns a raw response frame into a typed [`Reply`] according to the
//! command's [`Family`]. Shape mismatches never fail; they become
//! `server_error` replies so callers can inspect them.

use bytes::Bytes;

use super::response::insert_pair;
use super::{Command, Family, Frame, Reply, Status, Value};

/// Decode a response frame for `command`
///
/// `args` are the flattened request arguments (command name excluded);
/// pop commands read their requested count from `args[1]`.
pub fn interpret(command: Command, frame: Frame, args: &[Bytes]) -> Reply {
    let Some(status) = frame.status() else {
        return Reply::failure(
            command,
            Status::Disconnected,
            Some("Connection closed".to_string()),
        );
    };
    let status = Status::from_bytes(status);

    if !status.is_ok() {
        let message = frame
            .payload()
            .first()
            .map(|m| String::from_utf8_lossy(m).into_owned());
        return Reply::failure(command, status, message);
    }

    let payload = frame.payload();
    match command.family() {
        Family::Integer => {
            let n = payload.first().map(|f| parse_int(f)).unwrap_or(0);
            Reply::ok(command, Value::Int(n))
        }
        Family::Float => {
            let f = payload.first().map(|f| parse_float(f)).unwrap_or(0.0);
            Reply::ok(command, Value::Float(f))
        }
        Family::Scalar => scalar(command, payload),
        Family::Pop => {
            let count = args.get(1).map(|a| parse_int(a)).unwrap_or(1);
            if count <= 1 {
                scalar(command, payload)
            } else {
                Reply::ok(command, Value::List(payload.to_vec()))
            }
        }
        Family::FlatList | Family::Default => Reply::ok(command, Value::List(payload.to_vec())),
        Family::Bool => match payload {
            [flag] => Reply::ok(command, Value::Bool(parse_bool(flag))),
            _ => Reply::invalid(command),
        },
        Family::MultiBool => pairs(command, payload, |v| Value::Bool(parse_bool(v))),
        Family::Paired if command.is_sorted_set() => {
            pairs(command, payload, |v| Value::Int(parse_int(v)))
        }
        Family::Paired => pairs(command, payload, |v| Value::Bytes(v.clone())),
    }
}

fn scalar(command: Command, payload: &[Bytes]) -> Reply {
    match payload {
        [value] => Reply::ok(command, Value::Bytes(value.clone())),
        _ => Reply::invalid(command),
    }
}

fn pairs(command: Command, payload: &[Bytes], decode: impl Fn(&Bytes) -> Value) -> Reply {
    if payload.len() % 2 != 0 {
        return Reply::invalid(command);
    }

    let mut map = Vec::with_capacity(payload.len() / 2);
    for pair in payload.chunks_exact(2) {
        insert_pair(&mut map, pair[0].clone(), decode(&pair[1]));
    }
    Reply::ok(command, Value::Map(map))
}

// =============================================================================
// Lenient scalar parsing
// =============================================================================

/// `"0"` and the empty string are false, anything else is true
fn parse_bool(field: &[u8]) -> bool {
    !matches!(field, b"" | b"0")
}

/// Parse the leading integer of a field, 0 when there is none
///
/// Leading whitespace and a sign are accepted; parsing stops at the first
/// non-digit. Out-of-range values saturate.
pub fn parse_int(field: &[u8]) -> i64 {
    let text = String::from_utf8_lossy(field);
    let text = text.trim_start();
    let (negative, digits) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };

    let mut n: i64 = 0;
    for b in digits.bytes().take_while(u8::is_ascii_digit) {
        let d = i64::from(b - b'0');
        n = if negative {
            n.saturating_mul(10).saturating_sub(d)
        } else {
            n.saturating_mul(10).saturating_add(d)
        };
    }
    n
}

/// Parse the leading decimal number of a field, 0.0 when there is none
pub fn parse_float(field: &[u8]) -> f64 {
    let text = String::from_utf8_lossy(field);
    let text = text.trim_start();
    let bytes = text.as_bytes();

    // longest prefix shaped like [+-]digits[.digits][(e|E)[+-]digits]
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end += 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    let mut mantissa = end > int_start;
    if bytes.get(end) == Some(&b'.') {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while bytes.get(frac_end).is_some_and(u8::is_ascii_digit) {
            frac_end += 1;
        }
        if mantissa || frac_end > frac_start {
            mantissa = true;
            end = frac_end;
        }
    }
    if !mantissa {
        return 0.0;
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let digits_start = exp_end;
        while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            exp_end += 1;
        }
        if exp_end > digits_start {
            end = exp_end;
        }
    }

    text[..end].parse().unwrap_or(0.0)
}
