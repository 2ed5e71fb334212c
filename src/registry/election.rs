//! Mother election: promoting a valid child when the mother reference has
//! gone stale.
//!
//! A group moves through Stable → Orphaned (mother no longer resolves,
//! detected lazily) → Elected, or → Deleted when no member survives. The
//! tie-break is strictly "first resolving child in stored order"; stored
//! order is insertion order, which is deterministic but carries no spatial
//! meaning.

use anyhow::Result;

use crate::host::{EntityResolver, HostSession};
use crate::models::{ElectionOutcome, EntityId, HealReport};

use super::GroupRegistry;

impl<'a, S: HostSession + EntityResolver> GroupRegistry<'a, S> {
    /// Re-key an orphaned group under its first resolving child.
    ///
    /// Metadata is carried over unchanged; children that no longer resolve
    /// are dropped and the survivors keep their relative order. When nothing
    /// resolves, the group is deleted outright. Checks liveness first, so
    /// calling this on a healthy group is a no-op.
    pub fn elect_new_mother(&self, mother: &EntityId) -> Result<ElectionOutcome> {
        let Some(record) = self.lookup_by_mother(mother)? else {
            return Ok(ElectionOutcome::NotFound);
        };
        if self.session.is_alive(mother)? {
            return Ok(ElectionOutcome::Stable);
        }

        let mut survivors = Vec::with_capacity(record.children.len());
        for child in &record.children {
            if self.session.is_alive(child)? {
                survivors.push(child.clone());
            }
        }

        if survivors.is_empty() {
            self.unregister(mother)?;
            tracing::info!(
                group = %record.logical_label,
                "no member survived, group deleted"
            );
            return Ok(ElectionOutcome::Deleted);
        }

        let new_mother = survivors.remove(0);
        self.unregister(mother)?;

        let mut healed = record;
        healed.mother = new_mother.clone();
        healed.children = survivors;
        self.register(&healed)?;

        tracing::info!(
            group = %healed.logical_label,
            old_mother = %mother,
            new_mother = %new_mother,
            "elected replacement mother"
        );
        Ok(ElectionOutcome::Elected(new_mother))
    }

    /// Maintenance pass: run election over every group in the category.
    ///
    /// Idempotent — repeated passes converge, since each group either stays
    /// stable, gets re-keyed under a live mother, or disappears.
    pub fn heal_orphans(&self) -> Result<HealReport> {
        let mut report = HealReport::default();
        for record in self.enumerate()? {
            match self.elect_new_mother(&record.mother)? {
                ElectionOutcome::Stable => report.stable += 1,
                ElectionOutcome::Elected(_) => report.elected += 1,
                ElectionOutcome::Deleted => report.deleted += 1,
                ElectionOutcome::NotFound => {}
            }
        }
        Ok(report)
    }
}
