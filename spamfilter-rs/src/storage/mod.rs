//! Statistics storage module
//!
//! Key/value backends holding token counts, cached probabilities and
//! training records:
//! - [`memory`]: in-memory backend, also the reference semantics for the
//!   contract and the store used by the test suites

pub mod memory;

pub use memory::MemoryStore;

use std::collections::HashMap;
use std::fmt;

use serde_json::Value;

use crate::error::Result;

/// Namespaces the classifier keeps its state under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Namespace {
    /// Per-token spam evidence counts
    Spam,
    /// Per-token ham evidence counts
    Ham,
    /// Spam category total
    SpamTotal,
    /// Ham category total
    HamTotal,
    /// Cached per-token probabilities
    Prob,
    /// Training records, keyed by content hash
    TrainRec,
}

impl Namespace {
    pub fn as_str(self) -> &'static str {
        match self {
            Namespace::Spam => "spam",
            Namespace::Ham => "ham",
            Namespace::SpamTotal => "spamtotal",
            Namespace::HamTotal => "hamtotal",
            Namespace::Prob => "prob",
            Namespace::TrainRec => "trainrec",
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Abstract key/value store for classifier statistics.
///
/// This is the only boundary the classifier depends on; persistence,
/// replication and transport live behind it. Counters are plain JSON
/// integers and may go negative, decrementing past zero is not prevented.
///
/// `update` fails with `NotFound` on an absent key in every backend. The
/// original contract left this implementation-defined (a plain map
/// assignment would succeed unconditionally); it is pinned down here so
/// that the `save` fallback path is reachable.
#[async_trait::async_trait]
pub trait StatsStore: Send + Sync {
    /// Increment a counter, initializing an absent key to 0 first, and
    /// return the new value.
    async fn incr(&self, ns: Namespace, key: &str) -> Result<i64>;

    /// Decrement a counter, initializing an absent key to 0 first, and
    /// return the new value.
    async fn decr(&self, ns: Namespace, key: &str) -> Result<i64>;

    /// Read one value; `NotFound` if the key is absent.
    async fn read(&self, ns: Namespace, key: &str) -> Result<Value>;

    /// Bulk-read; the result only contains the keys that were found. An
    /// empty key list returns an empty map without touching the backend.
    async fn read_all(&self, ns: Namespace, keys: &[String]) -> Result<HashMap<String, Value>>;

    /// Overwrite an existing value; `NotFound` if the key is absent.
    async fn update(&self, ns: Namespace, key: &str, value: &Value) -> Result<()>;

    /// Write a new value; `AlreadyExists` if the key is present.
    async fn create(&self, ns: Namespace, key: &str, value: &Value) -> Result<()>;

    /// Upsert: `update`, falling back to `create` when the key is absent.
    /// Two writers can race between those two calls; losing the create
    /// race is resolved by a final `update`, never surfaced as an error.
    async fn save(&self, ns: Namespace, key: &str, value: &Value) -> Result<()> {
        match self.update(ns, key, value).await {
            Err(e) if e.is_not_found() => match self.create(ns, key, value).await {
                Err(e) if e.is_already_exists() => self.update(ns, key, value).await,
                other => other,
            },
            other => other,
        }
    }
}
