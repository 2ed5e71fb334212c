//! Domain models for the group registry.
//!
//! # Core Concepts
//!
//! - [`GroupRecord`]: the persisted unit — one mother, ordered children, and
//!   a verbatim display payload. Keyed in storage by the mother's identifier.
//! - [`EntityId`]: an opaque, host-assigned identifier used as a weak
//!   reference. Resolution failure is a normal condition, not an error.
//! - [`GroupMarker`]: the redundant `{label, ordinal}` tag carried on member
//!   entities themselves, used to resurrect a group whose record was lost.

mod group;
mod member;

pub use group::*;
pub use member::*;
