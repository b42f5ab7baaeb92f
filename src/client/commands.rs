//! Typed convenience commands
//!
//! Thin wrappers that build argument lists for common commands. Every
//! method goes through [`Commands::dispatch`], so the same helpers serve
//! both facades.

use bytes::Bytes;

use crate::error::Result;
use crate::protocol::{Arg, Command};

/// Typed helpers over a command dispatcher
pub trait Commands {
    /// What one command produces (`Reply` or `Outcome`)
    type Output;

    /// Send one command and return its decoded output
    fn dispatch(&mut self, command: Command, args: &[Arg]) -> Result<Self::Output>;

    fn ping(&mut self) -> Result<Self::Output> {
        self.dispatch(Command::Ping, &[])
    }

    fn dbsize(&mut self) -> Result<Self::Output> {
        self.dispatch(Command::Dbsize, &[])
    }

    fn info(&mut self) -> Result<Self::Output> {
        self.dispatch(Command::Info, &[])
    }

    // -------------------------------------------------------------------------
    // Key/value
    // -------------------------------------------------------------------------

    fn get(&mut self, key: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Get, &[key.into()])
    }

    fn set(&mut self, key: impl Into<Arg>, value: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Set, &[key.into(), value.into()])
    }

    /// Set with a time-to-live in seconds
    fn setx(
        &mut self,
        key: impl Into<Arg>,
        value: impl Into<Arg>,
        ttl: i64,
    ) -> Result<Self::Output> {
        self.dispatch(Command::Setx, &[key.into(), value.into(), ttl.into()])
    }

    fn setnx(&mut self, key: impl Into<Arg>, value: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Setnx, &[key.into(), value.into()])
    }

    fn expire(&mut self, key: impl Into<Arg>, ttl: i64) -> Result<Self::Output> {
        self.dispatch(Command::Expire, &[key.into(), ttl.into()])
    }

    fn ttl(&mut self, key: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Ttl, &[key.into()])
    }

    fn del(&mut self, key: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Del, &[key.into()])
    }

    fn incr(&mut self, key: impl Into<Arg>, by: i64) -> Result<Self::Output> {
        self.dispatch(Command::Incr, &[key.into(), by.into()])
    }

    fn decr(&mut self, key: impl Into<Arg>, by: i64) -> Result<Self::Output> {
        self.dispatch(Command::Decr, &[key.into(), by.into()])
    }

    fn exists(&mut self, key: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Exists, &[key.into()])
    }

    fn multi_set<K, V>(&mut self, pairs: &[(K, V)]) -> Result<Self::Output>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        self.dispatch(Command::MultiSet, &[flatten_pairs(pairs)])
    }

    fn multi_get<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<Self::Output> {
        self.dispatch(Command::MultiGet, &[many(keys)])
    }

    fn multi_del<K: AsRef<[u8]>>(&mut self, keys: &[K]) -> Result<Self::Output> {
        self.dispatch(Command::MultiDel, &[many(keys)])
    }

    // -------------------------------------------------------------------------
    // Hashes
    // -------------------------------------------------------------------------

    fn hset(
        &mut self,
        name: impl Into<Arg>,
        key: impl Into<Arg>,
        value: impl Into<Arg>,
    ) -> Result<Self::Output> {
        self.dispatch(Command::Hset, &[name.into(), key.into(), value.into()])
    }

    fn hget(&mut self, name: impl Into<Arg>, key: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Hget, &[name.into(), key.into()])
    }

    fn hdel(&mut self, name: impl Into<Arg>, key: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Hdel, &[name.into(), key.into()])
    }

    fn hincr(&mut self, name: impl Into<Arg>, key: impl Into<Arg>, by: i64) -> Result<Self::Output> {
        self.dispatch(Command::Hincr, &[name.into(), key.into(), by.into()])
    }

    fn hexists(&mut self, name: impl Into<Arg>, key: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Hexists, &[name.into(), key.into()])
    }

    fn hsize(&mut self, name: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Hsize, &[name.into()])
    }

    fn hgetall(&mut self, name: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Hgetall, &[name.into()])
    }

    fn multi_hset<K, V>(&mut self, name: impl Into<Arg>, pairs: &[(K, V)]) -> Result<Self::Output>
    where
        K: AsRef<[u8]>,
        V: AsRef<[u8]>,
    {
        self.dispatch(Command::MultiHset, &[name.into(), flatten_pairs(pairs)])
    }

    // -------------------------------------------------------------------------
    // Sorted sets
    // -------------------------------------------------------------------------

    fn zset(&mut self, name: impl Into<Arg>, key: impl Into<Arg>, score: i64) -> Result<Self::Output> {
        self.dispatch(Command::Zset, &[name.into(), key.into(), score.into()])
    }

    /// Score-before-member form of [`zset`](Commands::zset)
    fn zadd(&mut self, name: impl Into<Arg>, score: i64, member: impl Into<Arg>) -> Result<Self::Output> {
        self.zset(name, member, score)
    }

    fn zget(&mut self, name: impl Into<Arg>, key: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Zget, &[name.into(), key.into()])
    }

    fn zincr(&mut self, name: impl Into<Arg>, key: impl Into<Arg>, by: i64) -> Result<Self::Output> {
        self.dispatch(Command::Zincr, &[name.into(), key.into(), by.into()])
    }

    fn zrank(&mut self, name: impl Into<Arg>, key: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Zrank, &[name.into(), key.into()])
    }

    fn zrevrank(&mut self, name: impl Into<Arg>, key: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Zrrank, &[name.into(), key.into()])
    }

    fn zrange(&mut self, name: impl Into<Arg>, offset: i64, limit: i64) -> Result<Self::Output> {
        self.dispatch(Command::Zrange, &[name.into(), offset.into(), limit.into()])
    }

    fn zrevrange(&mut self, name: impl Into<Arg>, offset: i64, limit: i64) -> Result<Self::Output> {
        self.dispatch(Command::Zrrange, &[name.into(), offset.into(), limit.into()])
    }

    // -------------------------------------------------------------------------
    // Queues
    // -------------------------------------------------------------------------

    fn qpush(&mut self, name: impl Into<Arg>, item: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Qpush, &[name.into(), item.into()])
    }

    /// Pop `count` items; a count of 1 yields a single value
    fn qpop(&mut self, name: impl Into<Arg>, count: i64) -> Result<Self::Output> {
        self.dispatch(Command::Qpop, &[name.into(), count.into()])
    }

    fn qsize(&mut self, name: impl Into<Arg>) -> Result<Self::Output> {
        self.dispatch(Command::Qsize, &[name.into()])
    }
}

fn many<K: AsRef<[u8]>>(keys: &[K]) -> Arg {
    Arg::Many(keys.iter().map(|k| Bytes::copy_from_slice(k.as_ref())).collect())
}

fn flatten_pairs<K: AsRef<[u8]>, V: AsRef<[u8]>>(pairs: &[(K, V)]) -> Arg {
    let mut items = Vec::with_capacity(pairs.len() * 2);
    for (k, v) in pairs {
        items.push(Bytes::copy_from_slice(k.as_ref()));
        items.push(Bytes::copy_from_slice(v.as_ref()));
    }
    Arg::Many(items)
}
