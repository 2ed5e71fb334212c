//! Interfaces the registry consumes from the host document.
//!
//! The registry never talks to storage or entities directly; everything goes
//! through these two traits, implemented by whatever owns the current
//! transaction (see [`crate::doc`] for the SQLite reference host). All calls
//! are synchronous and assumed to run inside one caller-scoped atomic
//! transaction — the registry performs no locking and no compensation on
//! abort.

use anyhow::Result;

use crate::models::{EntityId, GroupMarker};

/// Handle to a named dictionary node inside the host's persistent store.
///
/// Only meaningful to the session that produced it; not persisted by the
/// registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DictNode(i64);

impl DictNode {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> i64 {
        self.0
    }
}

/// Persistent-dictionary surface of the host transaction.
///
/// Records are flat ordered lists of strings; the registry's codec owns their
/// meaning. Errors from these methods are genuine infrastructure failures and
/// propagate unmodified — a missing node or key is `Ok(None)` / `Ok(false)`,
/// never an `Err`.
pub trait HostSession {
    /// Get or create the dictionary node with the given name.
    fn ensure_dictionary(&self, name: &str) -> Result<DictNode>;

    /// Look up a dictionary node without creating it.
    fn dictionary(&self, name: &str) -> Result<Option<DictNode>>;

    /// Read the record stored under `key`, if any.
    fn read_record(&self, node: DictNode, key: &str) -> Result<Option<Vec<String>>>;

    /// Write (or replace) the record stored under `key`.
    fn write_record(&self, node: DictNode, key: &str, values: &[String]) -> Result<()>;

    /// Erase the record stored under `key`. Returns whether one existed.
    fn erase_record(&self, node: DictNode, key: &str) -> Result<bool>;

    /// Every `(key, record)` pair in the node, in unspecified order.
    fn entries(&self, node: DictNode) -> Result<Vec<(String, Vec<String>)>>;
}

/// Entity side of the host transaction: weak-reference resolution plus the
/// redundant marker side-channel.
pub trait EntityResolver {
    /// Whether `id` currently resolves to a live entity. `false` is the
    /// expected answer for stale references, not a failure.
    fn is_alive(&self, id: &EntityId) -> Result<bool>;

    /// The redundant identity marker carried on the entity, if the entity is
    /// alive and carries one.
    fn marker(&self, id: &EntityId) -> Result<Option<GroupMarker>>;
}
