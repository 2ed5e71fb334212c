//! The group registry: membership management plus the self-healing engines.
//!
//! One [`GroupRegistry`] is constructed per host transaction and scoped to a
//! single category (e.g. all beam lines). Every mutating operation is
//! expressed as read-modify-write through [`GroupRegistry::register`], the
//! sole write path, which keeps the storage invariants in one place:
//!
//! - exactly one entry per group, keyed by the mother's identifier;
//! - the child list never contains the mother or duplicates;
//! - any legacy entry keyed by the display name is purged whenever the
//!   canonical entry is written.

mod election;
mod resurrect;
mod sweep;

use anyhow::Result;

use crate::codec;
use crate::host::{DictNode, HostSession};
use crate::models::{EntityId, GroupRecord, SCHEMA_VERSION};
use crate::store::RegistryStore;

pub struct GroupRegistry<'a, S> {
    session: &'a S,
    category: String,
}

impl<'a, S: HostSession> GroupRegistry<'a, S> {
    /// A registry view over `category`, bound to the current transaction.
    pub fn new(session: &'a S, category: impl Into<String>) -> Self {
        Self {
            session,
            category: category.into(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    fn store(&self) -> RegistryStore<'a, S> {
        RegistryStore::new(self.session)
    }

    /// The category node, if the category has ever been written to.
    fn node(&self) -> Result<Option<DictNode>> {
        self.store().category(&self.category)
    }

    // ============================================================
    // Write path
    // ============================================================

    /// Write the canonical entry for a group, keyed by its mother.
    ///
    /// The stored child list is normalized (mother and duplicates dropped),
    /// `modified_at` is refreshed, and the record is stamped with the current
    /// schema version. If a legacy entry keyed by the display name survives
    /// from an older document, it is deleted here.
    pub fn register(&self, record: &GroupRecord) -> Result<()> {
        let node = self.store().ensure_category(&self.category)?;

        let mut canonical = record.clone();
        canonical.schema_version = SCHEMA_VERSION;
        canonical.children = normalize_children(&canonical.mother, &canonical.children);
        canonical.modified_at = chrono::Utc::now();

        self.session
            .write_record(node, canonical.mother.as_str(), &codec::encode(&canonical))?;

        self.purge_alias(node, &canonical.display_name, &canonical.mother)?;
        Ok(())
    }

    /// Delete a surviving display-name-keyed entry. Legacy entries are only
    /// ever deleted, never read as a source of truth.
    fn purge_alias(&self, node: DictNode, display_name: &str, mother: &EntityId) -> Result<()> {
        if !display_name.is_empty() && display_name != mother.as_str() {
            if self.session.erase_record(node, display_name)? {
                tracing::debug!(alias = display_name, "purged legacy alias entry");
            }
        }
        Ok(())
    }

    // ============================================================
    // Lookups
    // ============================================================

    /// Direct key lookup. A stored entry that fails to decode is treated as
    /// absent.
    pub fn lookup_by_mother(&self, id: &EntityId) -> Result<Option<GroupRecord>> {
        let Some(node) = self.node()? else {
            return Ok(None);
        };
        match self.session.read_record(node, id.as_str())? {
            Some(values) => Ok(codec::decode(&values)),
            None => Ok(None),
        }
    }

    /// Find the group containing `id` as mother or child.
    ///
    /// Tries the direct key first, then linearly scans the category. O(n) in
    /// the number of groups, which stays small relative to the document.
    pub fn lookup_by_member(&self, id: &EntityId) -> Result<Option<GroupRecord>> {
        if let Some(record) = self.lookup_by_mother(id)? {
            return Ok(Some(record));
        }
        let Some(node) = self.node()? else {
            return Ok(None);
        };
        for (_, values) in self.session.entries(node)? {
            if let Some(record) = codec::decode(&values) {
                if record.children.contains(id) {
                    return Ok(Some(record));
                }
            }
        }
        Ok(None)
    }

    /// Find the group carrying the given logical label. Linear scan, same
    /// cost profile as [`Self::lookup_by_member`].
    pub fn lookup_by_label(&self, label: &str) -> Result<Option<GroupRecord>> {
        let Some(node) = self.node()? else {
            return Ok(None);
        };
        for (_, values) in self.session.entries(node)? {
            if let Some(record) = codec::decode(&values) {
                if record.logical_label == label {
                    return Ok(Some(record));
                }
            }
        }
        Ok(None)
    }

    /// Every decodable group in the category. Best-effort: an entry that
    /// fails to decode is skipped, not surfaced.
    pub fn enumerate(&self) -> Result<Vec<GroupRecord>> {
        let Some(node) = self.node()? else {
            return Ok(Vec::new());
        };
        let records = self
            .session
            .entries(node)?
            .iter()
            .filter_map(|(_, values)| codec::decode(values))
            .collect();
        Ok(records)
    }

    // ============================================================
    // Mutations (read-modify-write through `register`)
    // ============================================================

    /// Append a child to an existing group. No-op returning `false` if no
    /// entry exists under `mother`.
    pub fn add_child(&self, mother: &EntityId, child: &EntityId) -> Result<bool> {
        let Some(mut record) = self.lookup_by_mother(mother)? else {
            return Ok(false);
        };
        record.children.push(child.clone());
        self.register(&record)?;
        Ok(true)
    }

    /// Remove a child from an existing group. No-op returning `false` if no
    /// entry exists under `mother`.
    pub fn remove_child(&self, mother: &EntityId, child: &EntityId) -> Result<bool> {
        let Some(mut record) = self.lookup_by_mother(mother)? else {
            return Ok(false);
        };
        record.children.retain(|c| c != child);
        self.register(&record)?;
        Ok(true)
    }

    /// Change a group's display name. Purges any legacy entry keyed by the
    /// old name as well as the new one.
    pub fn rename(&self, mother: &EntityId, new_name: &str) -> Result<bool> {
        let Some(mut record) = self.lookup_by_mother(mother)? else {
            return Ok(false);
        };
        if let Some(node) = self.node()? {
            let old_name = record.display_name.clone();
            self.purge_alias(node, &old_name, mother)?;
        }
        record.display_name = new_name.to_string();
        self.register(&record)?;
        Ok(true)
    }

    /// Erase a group's canonical entry (and its legacy alias, if any).
    ///
    /// If no canonical entry exists under `key`, falls back to scanning for a
    /// single entry whose display name equals `key`, for callers that still
    /// pass a legacy name as the key.
    pub fn unregister(&self, key: &EntityId) -> Result<bool> {
        let Some(node) = self.node()? else {
            return Ok(false);
        };

        if let Some(values) = self.session.read_record(node, key.as_str())? {
            let display_name = codec::decode(&values).map(|r| r.display_name);
            self.session.erase_record(node, key.as_str())?;
            if let Some(name) = display_name {
                self.purge_alias(node, &name, key)?;
            }
            return Ok(true);
        }

        // Legacy path: the caller handed us a display name.
        for (entry_key, values) in self.session.entries(node)? {
            if let Some(record) = codec::decode(&values) {
                if record.display_name == key.as_str() {
                    self.session.erase_record(node, &entry_key)?;
                    return Ok(true);
                }
            }
        }
        Ok(false)
    }
}

/// Drop the mother and duplicates, preserving first-occurrence order.
fn normalize_children(mother: &EntityId, children: &[EntityId]) -> Vec<EntityId> {
    let mut out: Vec<EntityId> = Vec::with_capacity(children.len());
    for child in children {
        if child != mother && !out.contains(child) {
            out.push(child.clone());
        }
    }
    out
}
