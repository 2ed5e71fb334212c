//! Self-healing registry for persistent member groups.
//!
//! A *group* is one privileged **mother** member plus ordered children,
//! persisted as a single record inside the host document and keyed by the
//! mother's identifier. Member references are weak — the host may invalidate
//! them at any time — so corruption is detected lazily and healed in place:
//! election promotes the first surviving child when the mother dies,
//! resurrection rebuilds a lost record from the redundant markers carried on
//! the members themselves, and the sweeper clears entries nothing can heal.
//!
//! The host document is consumed through the narrow traits in [`host`]; the
//! [`doc`] module ships a SQLite-backed reference host.

pub mod codec;
pub mod doc;
pub mod host;
pub mod models;
pub mod registry;
pub mod store;

pub use registry::GroupRegistry;
