use std::fmt;

use serde::{Deserialize, Serialize};

/// An opaque stable identifier assigned by the host document to an entity.
///
/// The registry treats these as weak references: it records them, compares
/// them, and uses them as storage keys, but never creates, deletes, or keeps
/// alive the entity behind one. A stored `EntityId` may stop resolving at any
/// time (entity deleted, or never copied into an exported fragment) — callers
/// must re-check liveness through the host before dereferencing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// The redundant identity marker carried on a member entity itself, outside
/// the registry's own storage.
///
/// When a document fragment is exported without the registry's dictionary,
/// these markers are all that survives of a group. Resurrection reads them to
/// rebuild the record: members sort ascending by `ordinal`, and a member whose
/// marker lost its ordinal sorts after every member that kept one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupMarker {
    /// Logical group identifier shared by every member of the group.
    pub label: String,
    /// Position of the member within the group, if still present.
    pub ordinal: Option<u32>,
}
