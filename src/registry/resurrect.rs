//! Group resurrection from redundant per-member markers.
//!
//! Used on load when a document fragment carries group members but not the
//! registry dictionary itself. Each member entity carries a `{label,
//! ordinal}` marker written when the group was formed; that is enough to
//! rebuild membership and ordering, though not the display metadata — the
//! caller re-derives and re-registers that later through the normal path.

use anyhow::Result;

use crate::host::{EntityResolver, HostSession};
use crate::models::{Classification, EntityId, GroupRecord};

use super::GroupRegistry;

impl<'a, S: HostSession + EntityResolver> GroupRegistry<'a, S> {
    /// Rebuild the record for logical group `label` from marker ordinals.
    ///
    /// Candidates that no longer resolve are excluded. Survivors sort
    /// ascending by their marker ordinal; a member whose ordinal is missing
    /// sorts after every member that kept one, and input order is the stable
    /// tie-break. The first survivor becomes mother. Returns `false` when no
    /// candidate resolves, leaving storage untouched.
    pub fn resurrect(&self, label: &str, candidates: &[EntityId]) -> Result<bool> {
        let mut survivors: Vec<(u64, EntityId)> = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            if !self.session.is_alive(candidate)? {
                continue;
            }
            let ordinal = self
                .session
                .marker(candidate)?
                .and_then(|m| m.ordinal)
                .map_or(u64::MAX, u64::from);
            survivors.push((ordinal, candidate.clone()));
        }

        if survivors.is_empty() {
            tracing::warn!(group = label, "resurrection found no surviving member");
            return Ok(false);
        }

        // Stable, so missing-ordinal members keep their input order.
        survivors.sort_by_key(|(ordinal, _)| *ordinal);

        let mut members = survivors.into_iter().map(|(_, id)| id);
        let mother = members.next().expect("at least one survivor");
        let children: Vec<EntityId> = members.collect();

        tracing::info!(
            group = label,
            mother = %mother,
            children = children.len(),
            "resurrected group from member markers"
        );

        // Display metadata is unknown here; the caller re-registers it.
        self.register(&GroupRecord::new(
            mother,
            children,
            "",
            label,
            Classification::default(),
        ))?;
        Ok(true)
    }
}
