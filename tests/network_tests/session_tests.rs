//! Tests for Session
//!
//! These tests verify, against an in-memory stream:
//! - Request/response sequencing over fragmented reads
//! - Deferred authentication
//! - Batch pipelining and FIFO reply order
//! - Strict and non-strict transport error handling

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io::{self, Read, Write};
use std::rc::Rc;

use ssdbkv::network::{Connection, Session};
use ssdbkv::protocol::encode;
use ssdbkv::{Arg, Client, Command, Commands, EasyClient, Outcome, SsdbError, Status, Value};

// =============================================================================
// Mock Stream
// =============================================================================

enum Step {
    Data(Vec<u8>),
    Timeout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Read,
    Write,
}

/// Scripted stream: reads replay `steps` (EOF once exhausted), writes are
/// recorded until `write_limit` bytes, then time out
struct MockStream {
    steps: VecDeque<Step>,
    chunk: usize,
    write_limit: Option<usize>,
    written: Rc<RefCell<Vec<u8>>>,
    events: Rc<RefCell<Vec<Event>>>,
}

impl Read for MockStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.events.borrow_mut().push(Event::Read);
        match self.steps.pop_front() {
            None => Ok(0),
            Some(Step::Timeout) => Err(io::Error::new(io::ErrorKind::WouldBlock, "timed out")),
            Some(Step::Data(data)) => {
                let n = data.len().min(buf.len()).min(self.chunk);
                buf[..n].copy_from_slice(&data[..n]);
                if n < data.len() {
                    self.steps.push_front(Step::Data(data[n..].to_vec()));
                }
                Ok(n)
            }
        }
    }
}

impl Write for MockStream {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.events.borrow_mut().push(Event::Write);
        let n = match self.write_limit {
            Some(0) => return Err(io::Error::new(io::ErrorKind::WouldBlock, "timed out")),
            Some(limit) => buf.len().min(limit),
            None => buf.len(),
        };
        if let Some(limit) = self.write_limit.as_mut() {
            *limit -= n;
        }
        self.written.borrow_mut().extend_from_slice(&buf[..n]);
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

struct Harness {
    written: Rc<RefCell<Vec<u8>>>,
    events: Rc<RefCell<Vec<Event>>>,
}

impl Harness {
    fn written(&self) -> Vec<u8> {
        self.written.borrow().clone()
    }

    fn events(&self) -> Vec<Event> {
        self.events.borrow().clone()
    }
}

fn mock(steps: Vec<Step>, chunk: usize) -> (MockStream, Harness) {
    let written = Rc::new(RefCell::new(Vec::new()));
    let events = Rc::new(RefCell::new(Vec::new()));
    let stream = MockStream {
        steps: steps.into(),
        chunk,
        write_limit: None,
        written: Rc::clone(&written),
        events: Rc::clone(&events),
    };
    (stream, Harness { written, events })
}

fn session(steps: Vec<Step>, strict: bool) -> (Session<MockStream>, Harness) {
    let (stream, harness) = mock(steps, usize::MAX);
    (Session::new(Connection::from_stream(stream, 64), strict), harness)
}

/// Session whose stream accepts only `limit` written bytes
fn limited_session(steps: Vec<Step>, limit: usize, strict: bool) -> (Session<MockStream>, Harness) {
    let (mut stream, harness) = mock(steps, usize::MAX);
    stream.write_limit = Some(limit);
    (Session::new(Connection::from_stream(stream, 64), strict), harness)
}

fn resp(fields: &[&str]) -> Step {
    Step::Data(encode(fields).to_vec())
}

fn req(fields: &[&str]) -> Vec<u8> {
    encode(fields).to_vec()
}

fn args(items: &[&str]) -> Vec<Arg> {
    items.iter().map(|s| Arg::from(*s)).collect()
}

// =============================================================================
// Request / Response Tests
// =============================================================================

#[test]
fn test_set_roundtrip() {
    let (mut session, harness) = session(vec![resp(&["ok", "1"])], false);

    let reply = session.request(Command::Set, &args(&["foo", "bar"])).unwrap();

    assert_eq!(reply.status, Status::Ok);
    assert_eq!(reply.value, Some(Value::Int(1)));
    assert_eq!(harness.written(), b"3\nset\n3\nfoo\n3\nbar\n\n");
}

#[test]
fn test_nested_args_are_flattened() {
    let (mut session, harness) = session(vec![resp(&["ok", "2"])], false);

    let call_args = vec![Arg::from(vec!["a", "1", "b", "2"])];
    session.request(Command::MultiSet, &call_args).unwrap();

    assert_eq!(harness.written(), req(&["multi_set", "a", "1", "b", "2"]));
}

#[test]
fn test_response_split_across_reads() {
    let (stream, _harness) = mock(vec![resp(&["ok", "hello world"])], 1);
    let mut session = Session::new(Connection::from_stream(stream, 64), false);

    let reply = session.request(Command::Get, &args(&["k"])).unwrap();
    assert_eq!(reply.value.unwrap().as_bytes().unwrap(), "hello world");
}

#[test]
fn test_leftover_bytes_serve_next_request() {
    // Both responses arrive in a single read
    let mut both = req(&["ok", "1"]);
    both.extend_from_slice(&req(&["ok", "v"]));
    let (mut session, harness) = session(vec![Step::Data(both)], false);

    let first = session.request(Command::Set, &args(&["k", "v"])).unwrap();
    let second = session.request(Command::Get, &args(&["k"])).unwrap();

    assert_eq!(first.value, Some(Value::Int(1)));
    assert_eq!(second.value.unwrap().as_bytes().unwrap(), "v");
    assert_eq!(harness.events().iter().filter(|e| **e == Event::Read).count(), 1);
}

#[test]
fn test_call_str_rejects_unknown_command() {
    let (mut session, harness) = session(vec![], false);

    let err = session.call_str("flushall", &[]).unwrap_err();
    assert!(matches!(err, SsdbError::UnknownCommand(_)));
    assert!(harness.written().is_empty());
}

#[test]
fn test_last_reply_tracks_latest() {
    let (mut session, _h) = session(vec![resp(&["ok", "1"]), resp(&["not_found"])], false);

    session.request(Command::Set, &args(&["k", "v"])).unwrap();
    session.request(Command::Get, &args(&["x"])).unwrap();

    assert_eq!(session.last_reply().unwrap().status, Status::NotFound);
}

// =============================================================================
// Authentication Tests
// =============================================================================

#[test]
fn test_auth_is_deferred() {
    let (mut session, harness) = session(vec![resp(&["ok", "1"]), resp(&["ok", "v"])], false);

    session.auth("secret");
    assert!(harness.written().is_empty());
    assert!(session.has_pending_auth());

    let reply = session.request(Command::Get, &args(&["k"])).unwrap();
    assert_eq!(reply.value.unwrap().as_bytes().unwrap(), "v");

    let mut expected = req(&["auth", "secret"]);
    expected.extend_from_slice(&req(&["get", "k"]));
    assert_eq!(harness.written(), expected);
    assert!(!session.has_pending_auth());
}

#[test]
fn test_auth_sent_only_once() {
    let (mut session, harness) = session(
        vec![resp(&["ok", "1"]), resp(&["ok", "1"]), resp(&["ok", "2"])],
        false,
    );

    session.auth("secret");
    session.request(Command::Set, &args(&["a", "1"])).unwrap();
    session.request(Command::Set, &args(&["b", "2"])).unwrap();

    let mut expected = req(&["auth", "secret"]);
    expected.extend_from_slice(&req(&["set", "a", "1"]));
    expected.extend_from_slice(&req(&["set", "b", "2"]));
    assert_eq!(harness.written(), expected);
}

#[test]
fn test_failed_auth_blocks_command() {
    let (mut session, harness) = session(vec![resp(&["error", "invalid password"])], false);

    session.auth("wrong");
    let err = session.request(Command::Get, &args(&["k"])).unwrap_err();

    assert!(matches!(err, SsdbError::AuthFailed(ref m) if m == "invalid password"));
    assert_eq!(harness.written(), req(&["auth", "wrong"]));
    assert!(!session.has_pending_auth());
}

#[test]
fn test_noauth_is_always_an_error() {
    let (mut session, _h) = session(vec![resp(&["noauth", "authentication required"])], false);

    let err = session.request(Command::Get, &args(&["k"])).unwrap_err();
    assert!(matches!(err, SsdbError::NoAuth(ref m) if m == "authentication required"));
    assert_eq!(session.last_reply().unwrap().status, Status::NoAuth);
}

// =============================================================================
// Batch Tests
// =============================================================================

#[test]
fn test_batch_replies_in_order() {
    let (mut session, harness) = session(
        vec![
            resp(&["ok", "1"]),
            resp(&["error", "bad key"]),
            resp(&["ok", "v"]),
        ],
        false,
    );

    session.begin_batch();
    assert!(session.call(Command::Set, &args(&["k", "v"])).unwrap().is_none());
    assert!(session.call(Command::Hget, &args(&["h", "f"])).unwrap().is_none());
    assert!(session.call(Command::Get, &args(&["k"])).unwrap().is_none());
    assert_eq!(session.queued(), 3);

    let replies = session.exec_batch().unwrap();

    assert_eq!(replies.len(), 3);
    assert_eq!(replies[0].command, Command::Set);
    assert_eq!(replies[0].value, Some(Value::Int(1)));
    assert_eq!(replies[1].status, Status::Error);
    assert_eq!(replies[1].message.as_deref(), Some("bad key"));
    assert_eq!(replies[2].value.as_ref().unwrap().as_bytes().unwrap(), "v");

    assert!(!session.is_batching());
    assert_eq!(session.queued(), 0);

    let mut expected = req(&["set", "k", "v"]);
    expected.extend_from_slice(&req(&["hget", "h", "f"]));
    expected.extend_from_slice(&req(&["get", "k"]));
    assert_eq!(harness.written(), expected);
}

#[test]
fn test_batch_writes_everything_before_reading() {
    let (mut session, harness) = session(
        vec![resp(&["ok", "1"]), resp(&["ok", "1"]), resp(&["ok", "1"])],
        false,
    );

    session.begin_batch();
    for key in ["a", "b", "c"] {
        session.call(Command::Del, &args(&[key])).unwrap();
    }
    session.exec_batch().unwrap();

    let events = harness.events();
    let first_read = events.iter().position(|e| *e == Event::Read).unwrap();
    assert!(events[..first_read].iter().all(|e| *e == Event::Write));
    assert!(events[first_read..].iter().all(|e| *e == Event::Read));
    assert_eq!(first_read, 3);
}

#[test]
fn test_begin_batch_clears_queue() {
    let (mut session, _h) = session(vec![resp(&["ok", "5"])], false);

    session.begin_batch();
    session.call(Command::Incr, &args(&["x"])).unwrap();
    session.begin_batch();
    session.call(Command::Dbsize, &[]).unwrap();

    let replies = session.exec_batch().unwrap();
    assert_eq!(replies.len(), 1);
    assert_eq!(replies[0].command, Command::Dbsize);
}

#[test]
fn test_empty_batch_sends_nothing() {
    let (mut session, harness) = session(vec![], false);

    session.begin_batch();
    assert!(session.exec_batch().unwrap().is_empty());
    assert!(harness.written().is_empty());
    assert!(!session.is_batching());
}

#[test]
fn test_batch_flushes_pending_auth_first() {
    let (mut session, harness) = session(vec![resp(&["ok", "1"]), resp(&["ok", "3"])], false);

    session.auth("pw");
    session.begin_batch();
    session.call(Command::Qsize, &args(&["q"])).unwrap();
    let replies = session.exec_batch().unwrap();

    assert_eq!(replies[0].value, Some(Value::Int(3)));
    let mut expected = req(&["auth", "pw"]);
    expected.extend_from_slice(&req(&["qsize", "q"]));
    assert_eq!(harness.written(), expected);
}

#[test]
fn test_batch_timeout_folds_into_reply() {
    let (mut session, _h) = session(vec![resp(&["ok", "1"]), Step::Timeout], false);

    session.begin_batch();
    session.call(Command::Set, &args(&["a", "1"])).unwrap();
    session.call(Command::Get, &args(&["a"])).unwrap();
    let replies = session.exec_batch().unwrap();

    assert_eq!(replies[0].status, Status::Ok);
    assert_eq!(replies[1].status, Status::Error);
    assert_eq!(replies[1].message.as_deref(), Some("Connection timeout"));
    assert!(!session.is_closed());
}

#[test]
fn test_batch_strict_propagates_and_resets() {
    let (mut session, _h) = session(vec![Step::Timeout], true);

    session.begin_batch();
    session.call(Command::Get, &args(&["a"])).unwrap();
    let err = session.exec_batch().unwrap_err();

    assert!(matches!(err, SsdbError::Timeout));
    assert!(!session.is_batching());
}

// =============================================================================
// Transport Failure Tests
// =============================================================================

#[test]
fn test_timeout_non_strict_keeps_connection() {
    let (mut session, _h) = session(vec![Step::Timeout, resp(&["ok", "1"])], false);

    let reply = session.request(Command::Get, &args(&["k"])).unwrap();
    assert_eq!(reply.status, Status::Error);
    assert_eq!(reply.message.as_deref(), Some("Connection timeout"));
    assert!(!session.is_closed());
}

#[test]
fn test_timeout_strict_is_error() {
    let (mut session, _h) = session(vec![Step::Timeout], true);
    assert!(session.is_strict());

    let err = session.request(Command::Get, &args(&["k"])).unwrap_err();
    assert!(matches!(err, SsdbError::Timeout));
    assert!(!session.is_closed());
}

#[test]
fn test_eof_closes_connection() {
    let (mut session, _h) = session(vec![], false);

    let reply = session.request(Command::Get, &args(&["k"])).unwrap();
    assert_eq!(reply.status, Status::Error);
    assert!(reply.message.unwrap().starts_with("Connection lost"));
    assert!(session.is_closed());

    // permanently unusable
    let reply = session.request(Command::Get, &args(&["k"])).unwrap();
    assert_eq!(reply.message.as_deref(), Some("Connection closed"));
}

#[test]
fn test_eof_strict_then_closed() {
    let (mut session, _h) = session(vec![], true);

    let err = session.request(Command::Get, &args(&["k"])).unwrap_err();
    assert!(matches!(err, SsdbError::ConnectionLost(_)));

    let err = session.request(Command::Get, &args(&["k"])).unwrap_err();
    assert!(matches!(err, SsdbError::ConnectionClosed));
}

#[test]
fn test_malformed_size_line_is_server_error() {
    let (mut session, _h) = session(vec![Step::Data(b"ok\n".to_vec())], false);

    let reply = session.request(Command::Get, &args(&["k"])).unwrap();
    assert_eq!(reply.status, Status::ServerError);
    assert!(session.is_closed());
}

#[test]
fn test_bare_blank_line_is_disconnected() {
    let (mut session, _h) = session(vec![Step::Data(b"\n".to_vec())], false);

    let reply = session.request(Command::Get, &args(&["k"])).unwrap();
    assert_eq!(reply.status, Status::Disconnected);
}

// =============================================================================
// Write Failure Tests
// =============================================================================

#[test]
fn test_short_write_then_timeout_closes() {
    // A reply is waiting, but the truncated request must never be followed
    let (mut session, harness) = limited_session(vec![resp(&["ok", "1"])], 4, false);

    let reply = session.request(Command::Set, &args(&["foo", "bar"])).unwrap();
    assert_eq!(reply.status, Status::Error);
    assert!(reply.message.unwrap().starts_with("Connection lost"));
    assert!(session.is_closed());

    let reply = session.request(Command::Get, &args(&["foo"])).unwrap();
    assert_eq!(reply.status, Status::Error);
    assert_eq!(reply.message.as_deref(), Some("Connection closed"));
    assert_eq!(harness.written(), b"3
se");
}

#[test]
fn test_write_timeout_strict_is_connection_lost() {
    let (mut session, _h) = limited_session(vec![resp(&["ok", "1"])], 0, true);

    let err = session.request(Command::Set, &args(&["foo", "bar"])).unwrap_err();
    assert!(matches!(err, SsdbError::ConnectionLost(_)));
    assert!(err.is_fatal());
    assert!(session.is_closed());
}

#[test]
fn test_batch_write_timeout_closes() {
    let first = req(&["set", "a", "1"]);
    let (mut session, harness) = limited_session(vec![resp(&["ok", "1"])], first.len(), false);

    session.begin_batch();
    session.call(Command::Set, &args(&["a", "1"])).unwrap();
    session.call(Command::Get, &args(&["a"])).unwrap();
    let replies = session.exec_batch().unwrap();

    assert_eq!(replies.len(), 2);
    assert!(replies.iter().all(|r| r.status == Status::Error));
    assert!(replies[1].message.as_deref().unwrap().starts_with("Connection lost"));
    assert!(session.is_closed());
    assert_eq!(harness.written(), first);
}

// =============================================================================
// Facade Tests
// =============================================================================

#[test]
fn test_client_batch_handle() {
    let (s, harness) = session(vec![resp(&["ok", "1"]), resp(&["ok", "a", "b"])], false);
    let mut client = Client::from_session(s);

    let replies = {
        let mut batch = client.batch();
        batch
            .cmd(Command::Set, &args(&["k", "v"]))
            .cmd(Command::Keys, &args(&["", "", "10"]));
        assert_eq!(batch.len(), 2);
        batch.exec().unwrap()
    };

    assert_eq!(replies.len(), 2);
    assert_eq!(replies[1].value.as_ref().unwrap().as_list().unwrap().len(), 2);
    assert!(harness.written().starts_with(b"3\nset\n"));
}

#[test]
fn test_dropped_batch_is_discarded() {
    let (s, harness) = session(vec![resp(&["ok", "7"])], false);
    let mut client = Client::from_session(s);

    {
        let mut batch = client.batch();
        batch.cmd(Command::Set, &args(&["k", "v"]));
    }

    let reply = client.dbsize().unwrap();
    assert_eq!(reply.value, Some(Value::Int(7)));
    assert_eq!(harness.written(), req(&["dbsize"]));
}

#[test]
fn test_commands_trait_builds_requests() {
    let (s, harness) = session(
        vec![resp(&["ok", "1"]), resp(&["ok", "1"]), resp(&["ok", "2"])],
        false,
    );
    let mut client = Client::from_session(s);

    client.zadd("board", 50, "alice").unwrap();
    client.setx("k", "v", 60).unwrap();
    client.multi_set(&[("a", "1"), ("b", "2")]).unwrap();

    let mut expected = req(&["zset", "board", "alice", "50"]);
    expected.extend_from_slice(&req(&["setx", "k", "v", "60"]));
    expected.extend_from_slice(&req(&["multi_set", "a", "1", "b", "2"]));
    assert_eq!(harness.written(), expected);
}

#[test]
fn test_easy_client_outcomes() {
    let (stream, _h) = mock(
        vec![
            resp(&["ok", "v"]),
            resp(&["not_found"]),
            resp(&["error", "oops"]),
        ],
        usize::MAX,
    );
    let mut client = EasyClient::from_connection(Connection::from_stream(stream, 64));

    assert_eq!(
        client.get("a").unwrap(),
        Outcome::Value(Value::Bytes("v".into()))
    );
    assert_eq!(client.get("b").unwrap(), Outcome::Absent);
    assert_eq!(client.get("c").unwrap(), Outcome::Failed);
    assert_eq!(client.last_reply().unwrap().message.as_deref(), Some("oops"));
}

#[test]
fn test_easy_client_is_strict() {
    let (stream, _h) = mock(vec![Step::Timeout], usize::MAX);
    let mut client = EasyClient::from_connection(Connection::from_stream(stream, 64));

    let err = client.get("a").unwrap_err();
    assert!(matches!(err, SsdbError::Timeout));
}

#[test]
fn test_easy_batch() {
    let (stream, _h) = mock(
        vec![resp(&["ok", "1"]), resp(&["not_found"])],
        usize::MAX,
    );
    let mut client = EasyClient::from_connection(Connection::from_stream(stream, 64));

    let mut batch = client.batch();
    batch.call("set", &args(&["k", "v"])).unwrap();
    batch.call("get", &args(&["missing"])).unwrap();
    let outcomes = batch.exec().unwrap();

    assert_eq!(outcomes, vec![Outcome::Value(Value::Int(1)), Outcome::Absent]);
}

#[test]
fn test_easy_batch_noauth_is_an_error() {
    let (stream, _h) = mock(
        vec![resp(&["ok", "1"]), resp(&["noauth", "authentication required"])],
        usize::MAX,
    );
    let mut client = EasyClient::from_connection(Connection::from_stream(stream, 64));

    let mut batch = client.batch();
    batch.call("set", &args(&["k", "v"])).unwrap();
    batch.call("get", &args(&["k"])).unwrap();
    let err = batch.exec().unwrap_err();

    assert!(matches!(err, SsdbError::NoAuth(ref m) if m == "authentication required"));
}

#[test]
fn test_client_batch_keeps_noauth_status() {
    let (s, _h) = session(vec![resp(&["noauth", "authentication required"])], false);
    let mut client = Client::from_session(s);

    let mut batch = client.batch();
    batch.cmd(Command::Get, &args(&["k"]));
    let replies = batch.exec().unwrap();

    assert_eq!(replies[0].status, Status::NoAuth);
}
