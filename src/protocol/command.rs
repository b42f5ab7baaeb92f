//! Command definitions
//!
//! The closed table of commands this client speaks, each tied to exactly
//! one response family.

use std::fmt;
use std::str::FromStr;

use bytes::Bytes;

use crate::error::SsdbError;

/// Response shape of a command, drives how `ok` payloads are decoded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Integer parse of field 2, 0 if absent
    Integer,
    /// Float parse of field 2, 0.0 if absent
    Float,
    /// Exactly one value
    Scalar,
    /// Scalar or list depending on the requested count
    Pop,
    /// All payload fields as a list
    FlatList,
    /// Exactly one boolean
    Bool,
    /// key -> boolean pairs
    MultiBool,
    /// key -> value pairs (scores for sorted-set commands)
    Paired,
    /// Unclassified: all payload fields as a list
    Default,
}

macro_rules! command_table {
    ($($variant:ident => $name:literal, $family:ident;)*) => {
        /// A command known to the client
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum Command {
            $($variant,)*
        }

        impl Command {
            /// Every command, in table order
            pub const ALL: &'static [Command] = &[$(Command::$variant,)*];

            /// Wire name of the command
            pub fn name(self) -> &'static str {
                match self {
                    $(Command::$variant => $name,)*
                }
            }

            pub fn family(self) -> Family {
                match self {
                    $(Command::$variant => Family::$family,)*
                }
            }

            fn lookup(name: &str) -> Option<Command> {
                match name {
                    $($name => Some(Command::$variant),)*
                    _ => None,
                }
            }
        }
    };
}

command_table! {
    // -------------------------------------------------------------------------
    // Integer family
    // -------------------------------------------------------------------------
    Dbsize => "dbsize", Integer;
    Ping => "ping", Integer;
    Qset => "qset", Integer;
    Getbit => "getbit", Integer;
    Setbit => "setbit", Integer;
    Countbit => "countbit", Integer;
    Strlen => "strlen", Integer;
    Set => "set", Integer;
    Setx => "setx", Integer;
    Setnx => "setnx", Integer;
    Zset => "zset", Integer;
    Hset => "hset", Integer;
    Qpush => "qpush", Integer;
    QpushFront => "qpush_front", Integer;
    QpushBack => "qpush_back", Integer;
    QtrimFront => "qtrim_front", Integer;
    QtrimBack => "qtrim_back", Integer;
    Del => "del", Integer;
    Zdel => "zdel", Integer;
    Hdel => "hdel", Integer;
    Hsize => "hsize", Integer;
    Zsize => "zsize", Integer;
    Qsize => "qsize", Integer;
    Hclear => "hclear", Integer;
    Zclear => "zclear", Integer;
    Qclear => "qclear", Integer;
    MultiSet => "multi_set", Integer;
    MultiDel => "multi_del", Integer;
    MultiHset => "multi_hset", Integer;
    MultiHdel => "multi_hdel", Integer;
    MultiZset => "multi_zset", Integer;
    MultiZdel => "multi_zdel", Integer;
    Incr => "incr", Integer;
    Decr => "decr", Integer;
    Zincr => "zincr", Integer;
    Zdecr => "zdecr", Integer;
    Hincr => "hincr", Integer;
    Hdecr => "hdecr", Integer;
    Zget => "zget", Integer;
    Zrank => "zrank", Integer;
    Zrrank => "zrrank", Integer;
    Zcount => "zcount", Integer;
    Zsum => "zsum", Integer;
    Zremrangebyrank => "zremrangebyrank", Integer;
    Zremrangebyscore => "zremrangebyscore", Integer;
    Ttl => "ttl", Integer;
    Expire => "expire", Integer;

    // -------------------------------------------------------------------------
    // Float family
    // -------------------------------------------------------------------------
    Zavg => "zavg", Float;

    // -------------------------------------------------------------------------
    // Scalar family
    // -------------------------------------------------------------------------
    Get => "get", Scalar;
    Substr => "substr", Scalar;
    Getset => "getset", Scalar;
    Hget => "hget", Scalar;
    Qget => "qget", Scalar;
    Qfront => "qfront", Scalar;
    Qback => "qback", Scalar;

    // -------------------------------------------------------------------------
    // Pop family
    // -------------------------------------------------------------------------
    Qpop => "qpop", Pop;
    QpopFront => "qpop_front", Pop;
    QpopBack => "qpop_back", Pop;

    // -------------------------------------------------------------------------
    // Flat-list family
    // -------------------------------------------------------------------------
    Keys => "keys", FlatList;
    Rkeys => "rkeys", FlatList;
    Zkeys => "zkeys", FlatList;
    Hkeys => "hkeys", FlatList;
    Hlist => "hlist", FlatList;
    Hrlist => "hrlist", FlatList;
    Zlist => "zlist", FlatList;
    Zrlist => "zrlist", FlatList;
    Qlist => "qlist", FlatList;
    Qrlist => "qrlist", FlatList;
    Qrange => "qrange", FlatList;
    Qslice => "qslice", FlatList;

    // -------------------------------------------------------------------------
    // Boolean families
    // -------------------------------------------------------------------------
    Auth => "auth", Bool;
    Exists => "exists", Bool;
    Hexists => "hexists", Bool;
    Zexists => "zexists", Bool;
    MultiExists => "multi_exists", MultiBool;
    MultiHexists => "multi_hexists", MultiBool;
    MultiZexists => "multi_zexists", MultiBool;

    // -------------------------------------------------------------------------
    // Paired family
    // -------------------------------------------------------------------------
    Scan => "scan", Paired;
    Rscan => "rscan", Paired;
    Zscan => "zscan", Paired;
    Zrscan => "zrscan", Paired;
    Zrange => "zrange", Paired;
    Zrrange => "zrrange", Paired;
    Hscan => "hscan", Paired;
    Hrscan => "hrscan", Paired;
    Hgetall => "hgetall", Paired;
    MultiHsize => "multi_hsize", Paired;
    MultiZsize => "multi_zsize", Paired;
    MultiGet => "multi_get", Paired;
    MultiHget => "multi_hget", Paired;
    MultiZget => "multi_zget", Paired;
    ZpopFront => "zpop_front", Paired;
    ZpopBack => "zpop_back", Paired;

    // -------------------------------------------------------------------------
    // Administrative / introspection
    // -------------------------------------------------------------------------
    Info => "info", Default;
    Version => "version", Default;
    Bitcount => "bitcount", Default;
    Compact => "compact", Default;
    KeyRange => "key_range", Default;
}

impl Command {
    /// Sorted-set commands carry integer scores in paired replies
    pub fn is_sorted_set(self) -> bool {
        self.name().starts_with('z')
    }
}

impl FromStr for Command {
    type Err = SsdbError;

    /// Case-insensitive lookup in the command table
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        Command::lookup(&name).ok_or(SsdbError::UnknownCommand(name))
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

// =============================================================================
// Arguments
// =============================================================================

/// One positional argument: a single field or a list flattened in place
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    One(Bytes),
    Many(Vec<Bytes>),
}

/// Flatten arguments into the request field list (command name excluded)
pub fn flatten_args(args: &[Arg]) -> Vec<Bytes> {
    let mut fields = Vec::with_capacity(args.len());
    for arg in args {
        match arg {
            Arg::One(b) => fields.push(b.clone()),
            Arg::Many(items) => fields.extend(items.iter().cloned()),
        }
    }
    fields
}

impl From<Bytes> for Arg {
    fn from(b: Bytes) -> Self {
        Arg::One(b)
    }
}

impl From<&str> for Arg {
    fn from(s: &str) -> Self {
        Arg::One(Bytes::copy_from_slice(s.as_bytes()))
    }
}

impl From<String> for Arg {
    fn from(s: String) -> Self {
        Arg::One(Bytes::from(s))
    }
}

impl From<&String> for Arg {
    fn from(s: &String) -> Self {
        Arg::from(s.as_str())
    }
}

impl From<&[u8]> for Arg {
    fn from(b: &[u8]) -> Self {
        Arg::One(Bytes::copy_from_slice(b))
    }
}

impl<const N: usize> From<&[u8; N]> for Arg {
    fn from(b: &[u8; N]) -> Self {
        Arg::One(Bytes::copy_from_slice(b))
    }
}

impl From<Vec<u8>> for Arg {
    fn from(b: Vec<u8>) -> Self {
        Arg::One(Bytes::from(b))
    }
}

macro_rules! arg_from_number {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Arg {
                fn from(n: $t) -> Self {
                    Arg::One(Bytes::from(n.to_string()))
                }
            }
        )*
    };
}

arg_from_number!(i32, i64, u32, u64, usize, f64);

impl From<Vec<Bytes>> for Arg {
    fn from(items: Vec<Bytes>) -> Self {
        Arg::Many(items)
    }
}

impl From<Vec<&str>> for Arg {
    fn from(items: Vec<&str>) -> Self {
        Arg::from(&items[..])
    }
}

impl From<&[&str]> for Arg {
    fn from(items: &[&str]) -> Self {
        Arg::Many(
            items
                .iter()
                .map(|s| Bytes::copy_from_slice(s.as_bytes()))
                .collect(),
        )
    }
}

impl From<Vec<String>> for Arg {
    fn from(items: Vec<String>) -> Self {
        Arg::Many(items.into_iter().map(Bytes::from).collect())
    }
}

impl From<Vec<Vec<u8>>> for Arg {
    fn from(items: Vec<Vec<u8>>) -> Self {
        Arg::Many(items.into_iter().map(Bytes::from).collect())
    }
}
