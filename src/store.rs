//! Namespace plumbing between the registry and the host's persistent
//! dictionaries.
//!
//! The registry owns one root dictionary; each group category lives in a
//! sub-dictionary under it. Pure storage plumbing — no group semantics here.

use anyhow::Result;
use chrono::Utc;

use crate::host::{DictNode, HostSession};
use crate::models::SCHEMA_VERSION;

/// Name of the registry's root dictionary inside the host document.
pub const ROOT_DICTIONARY: &str = "BEAMLINE_REGISTRY";

/// Reserved key for the root metadata record. Category dictionaries never
/// carry it, so group scans need no special casing.
const META_KEY: &str = "__registry_meta";

pub struct RegistryStore<'a, S> {
    session: &'a S,
}

impl<'a, S: HostSession> RegistryStore<'a, S> {
    pub fn new(session: &'a S) -> Self {
        Self { session }
    }

    /// Get or create the dictionary node for a category, creating the root
    /// on the way if needed.
    pub fn ensure_category(&self, name: &str) -> Result<DictNode> {
        self.ensure_root()?;
        self.session.ensure_dictionary(&category_path(name))
    }

    /// Look up a category node without creating anything.
    pub fn category(&self, name: &str) -> Result<Option<DictNode>> {
        self.session.dictionary(&category_path(name))
    }

    /// The root metadata record `[schema version, created timestamp]`, if the
    /// root exists.
    pub fn meta(&self) -> Result<Option<Vec<String>>> {
        match self.session.dictionary(ROOT_DICTIONARY)? {
            Some(root) => self.session.read_record(root, META_KEY),
            None => Ok(None),
        }
    }

    /// Get or create the root dictionary. First creation stamps the metadata
    /// record; the stamp is never rewritten afterwards.
    fn ensure_root(&self) -> Result<DictNode> {
        if let Some(root) = self.session.dictionary(ROOT_DICTIONARY)? {
            return Ok(root);
        }
        let root = self.session.ensure_dictionary(ROOT_DICTIONARY)?;
        let stamp = vec![SCHEMA_VERSION.to_string(), Utc::now().to_rfc3339()];
        self.session.write_record(root, META_KEY, &stamp)?;
        tracing::info!(schema_version = SCHEMA_VERSION, "created registry root dictionary");
        Ok(root)
    }
}

fn category_path(name: &str) -> String {
    format!("{ROOT_DICTIONARY}/{name}")
}
