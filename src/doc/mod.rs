//! SQLite-backed reference host document.
//!
//! The registry itself only sees the [`HostSession`] and [`EntityResolver`]
//! traits; this module provides one real host implementing them, so the crate
//! is usable (and testable) without embedding it in a larger application.
//! The document holds named dictionary nodes with keyed positional records
//! (stored as JSON string arrays) and a `members` table standing in for the
//! host's entities: members can be soft-deleted to invalidate references, and
//! carry the redundant `{label, ordinal}` group marker.

mod schema;

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, Transaction};
use uuid::Uuid;

use crate::host::{DictNode, EntityResolver, HostSession};
use crate::models::{EntityId, GroupMarker};

pub struct Document {
    conn: Arc<Mutex<Connection>>,
}

impl Document {
    pub fn open(path: PathBuf) -> Result<Self> {
        let parent = path
            .parent()
            .ok_or_else(|| anyhow::anyhow!("Document path has no parent directory"))?;
        std::fs::create_dir_all(parent)?;
        let conn = Connection::open(&path)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().expect("document lock poisoned");
        schema::run_migrations(&conn)
    }

    /// Run `f` inside one atomic transaction.
    ///
    /// Commits when `f` returns `Ok`, rolls back when it returns `Err` —
    /// mutations made by a failed closure are never visible to later
    /// transactions. The document serializes transactions; the registry is
    /// single-writer by construction.
    pub fn transact<T>(&self, f: impl FnOnce(&DocSession) -> Result<T>) -> Result<T> {
        let mut conn = self.conn.lock().expect("document lock poisoned");
        let txn = conn.transaction()?;
        let session = DocSession { txn };
        let out = f(&session);
        let DocSession { txn } = session;
        match out {
            Ok(value) => {
                txn.commit()?;
                Ok(value)
            }
            Err(err) => {
                txn.rollback()?;
                Err(err)
            }
        }
    }
}

impl Clone for Document {
    fn clone(&self) -> Self {
        Self {
            conn: self.conn.clone(),
        }
    }
}

/// One open transaction on a [`Document`].
pub struct DocSession<'c> {
    txn: Transaction<'c>,
}

impl DocSession<'_> {
    // ============================================================
    // Member entities (host side of the weak references)
    // ============================================================

    /// Create a live member entity and return its identifier.
    pub fn create_member(&self) -> Result<EntityId> {
        let id = Uuid::new_v4().to_string();
        self.txn.execute(
            "INSERT INTO members (id, created_at) VALUES (?, ?)",
            (&id, Utc::now().to_rfc3339()),
        )?;
        Ok(EntityId::from(id))
    }

    /// Delete a member. Its identifier stops resolving but any registry
    /// entries referencing it are left in place, exactly like a host
    /// deleting an entity behind the registry's back.
    pub fn erase_member(&self, id: &EntityId) -> Result<bool> {
        let rows = self.txn.execute(
            "UPDATE members SET deleted = 1 WHERE id = ? AND deleted = 0",
            [id.as_str()],
        )?;
        Ok(rows > 0)
    }

    /// Write the redundant group marker onto a live member.
    pub fn set_marker(&self, id: &EntityId, label: &str, ordinal: Option<u32>) -> Result<bool> {
        let rows = self.txn.execute(
            "UPDATE members SET group_label = ?, group_ordinal = ? WHERE id = ? AND deleted = 0",
            (label, ordinal, id.as_str()),
        )?;
        Ok(rows > 0)
    }

    /// Remove the marker from a member.
    pub fn clear_marker(&self, id: &EntityId) -> Result<bool> {
        let rows = self.txn.execute(
            "UPDATE members SET group_label = NULL, group_ordinal = NULL
             WHERE id = ? AND deleted = 0",
            [id.as_str()],
        )?;
        Ok(rows > 0)
    }
}

impl HostSession for DocSession<'_> {
    fn ensure_dictionary(&self, name: &str) -> Result<DictNode> {
        self.txn.execute(
            "INSERT OR IGNORE INTO dictionaries (name) VALUES (?)",
            [name],
        )?;
        let id: i64 = self.txn.query_row(
            "SELECT id FROM dictionaries WHERE name = ?",
            [name],
            |row| row.get(0),
        )?;
        Ok(DictNode::new(id))
    }

    fn dictionary(&self, name: &str) -> Result<Option<DictNode>> {
        let id: Option<i64> = self
            .txn
            .query_row("SELECT id FROM dictionaries WHERE name = ?", [name], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(id.map(DictNode::new))
    }

    fn read_record(&self, node: DictNode, key: &str) -> Result<Option<Vec<String>>> {
        let payload: Option<String> = self
            .txn
            .query_row(
                "SELECT payload FROM dictionary_records WHERE dictionary_id = ? AND key = ?",
                (node.raw(), key),
                |row| row.get(0),
            )
            .optional()?;
        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn write_record(&self, node: DictNode, key: &str, values: &[String]) -> Result<()> {
        let payload = serde_json::to_string(values)?;
        self.txn.execute(
            "INSERT INTO dictionary_records (dictionary_id, key, payload) VALUES (?, ?, ?)
             ON CONFLICT(dictionary_id, key) DO UPDATE SET payload = excluded.payload",
            (node.raw(), key, &payload),
        )?;
        Ok(())
    }

    fn erase_record(&self, node: DictNode, key: &str) -> Result<bool> {
        let rows = self.txn.execute(
            "DELETE FROM dictionary_records WHERE dictionary_id = ? AND key = ?",
            (node.raw(), key),
        )?;
        Ok(rows > 0)
    }

    fn entries(&self, node: DictNode) -> Result<Vec<(String, Vec<String>)>> {
        let mut stmt = self.txn.prepare(
            "SELECT key, payload FROM dictionary_records WHERE dictionary_id = ? ORDER BY key",
        )?;
        let rows = stmt
            .query_map([node.raw()], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut entries = Vec::with_capacity(rows.len());
        for (key, json) in rows {
            entries.push((key, serde_json::from_str(&json)?));
        }
        Ok(entries)
    }
}

impl EntityResolver for DocSession<'_> {
    fn is_alive(&self, id: &EntityId) -> Result<bool> {
        let count: i64 = self.txn.query_row(
            "SELECT COUNT(*) FROM members WHERE id = ? AND deleted = 0",
            [id.as_str()],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn marker(&self, id: &EntityId) -> Result<Option<GroupMarker>> {
        let row: Option<(Option<String>, Option<u32>)> = self
            .txn
            .query_row(
                "SELECT group_label, group_ordinal FROM members WHERE id = ? AND deleted = 0",
                [id.as_str()],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;
        Ok(row.and_then(|(label, ordinal)| label.map(|label| GroupMarker { label, ordinal })))
    }
}
