use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::member::EntityId;

/// Payload schema version written into every encoded record.
pub const SCHEMA_VERSION: u32 = 2;

/// A persisted group: one privileged *mother* member plus zero or more
/// children, keyed in storage by the mother's identifier.
///
/// Member references are weak. The mother may stop resolving at any time;
/// the record stays valid storage-wise and is healed lazily by election
/// (promote the first resolving child) or deleted when no member survives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRecord {
    /// Payload schema version this record was decoded from (or will be
    /// encoded with). New records use [`SCHEMA_VERSION`].
    pub schema_version: u32,
    /// Identifier of the privileged member; doubles as the storage key.
    pub mother: EntityId,
    /// Child members in insertion order. Never contains the mother,
    /// never contains duplicates.
    pub children: Vec<EntityId>,
    /// Human-facing name. Stored verbatim; historically also used as a
    /// storage key, which the registry now only ever deletes.
    pub display_name: String,
    /// Logical group identifier, shared with the members' redundant markers.
    pub logical_label: String,
    pub classification: Classification,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl GroupRecord {
    /// A fresh record with current timestamps and the current schema version.
    pub fn new(
        mother: EntityId,
        children: Vec<EntityId>,
        display_name: impl Into<String>,
        logical_label: impl Into<String>,
        classification: Classification,
    ) -> Self {
        let now = Utc::now();
        Self {
            schema_version: SCHEMA_VERSION,
            mother,
            children,
            display_name: display_name.into(),
            logical_label: logical_label.into(),
            classification,
            created_at: now,
            modified_at: now,
        }
    }

    /// Whether `id` is the mother or one of the children.
    pub fn contains(&self, id: &EntityId) -> bool {
        self.mother == *id || self.children.contains(id)
    }
}

/// Group classification as supplied by the surrounding workflow.
///
/// The registry stores and returns these fields verbatim and never interprets
/// them; `kind` and `axis` are free-form on purpose.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: String,
    /// Orientation axis label (e.g. `"X"`, `"Y"`).
    pub axis: String,
    pub level: i64,
    pub width: f64,
    pub height: f64,
}

/// Counters reported by [`crate::registry::GroupRegistry::stats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Decodable group entries in the category.
    pub group_count: usize,
    /// Total child references across those groups.
    pub child_count: usize,
    /// Groups whose mother no longer resolves.
    pub orphaned_count: usize,
}

/// Outcome of one election attempt on a single group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElectionOutcome {
    /// No entry exists under the given mother key.
    NotFound,
    /// The mother still resolves; nothing to do.
    Stable,
    /// A child was promoted; carries the new mother's identifier.
    Elected(EntityId),
    /// No member resolved; the group was deleted.
    Deleted,
}

/// Counters from one [`crate::registry::GroupRegistry::heal_orphans`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HealReport {
    pub stable: usize,
    pub elected: usize,
    pub deleted: usize,
}
