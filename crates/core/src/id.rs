//! Newtype identifiers and id generators.
//!
//! Grounded on `oj-core::id` (`groblegark-oddjobs/crates/core/src/id.rs`):
//! the same `define_id!` boilerplate macro and the same
//! generator/short-id traits, retargeted at Loom's own id types.

use std::borrow::Borrow;
use std::fmt;

/// Truncate an id-like string to its first `n` characters, for log lines.
pub trait ShortId {
    fn short(&self, n: usize) -> &str;
}

impl ShortId for str {
    fn short(&self, n: usize) -> &str {
        match self.char_indices().nth(n) {
            Some((idx, _)) => &self[..idx],
            None => self,
        }
    }
}

macro_rules! define_id {
    ($name:ident) => {
        #[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self(value)
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                Self(value.to_string())
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

define_id!(TaskId);
define_id!(SessionId);
define_id!(ShepherdSlot);

/// Produces fresh identifiers. Production code uses [`UuidIdGen`]; tests use
/// [`SequentialIdGen`] for deterministic output.
pub trait IdGen: Send + Sync {
    fn next(&self, prefix: &str) -> String;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGen;

impl IdGen for UuidIdGen {
    fn next(&self, prefix: &str) -> String {
        format!("{prefix}-{}", uuid::Uuid::new_v4())
    }
}

#[derive(Debug, Default)]
pub struct SequentialIdGen {
    counter: std::sync::atomic::AtomicU64,
}

impl IdGen for SequentialIdGen {
    fn next(&self, prefix: &str) -> String {
        let n = self
            .counter
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        format!("{prefix}-{n}")
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
