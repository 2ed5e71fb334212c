//! Integrity sweep: drop entries whose storage key no longer resolves.

use anyhow::Result;

use crate::codec;
use crate::host::{EntityResolver, HostSession};
use crate::models::{EntityId, RegistryStats};

use super::GroupRegistry;

impl<'a, S: HostSession + EntityResolver> GroupRegistry<'a, S> {
    /// Erase every entry whose key — always a mother identifier, or a legacy
    /// display-name alias — fails to resolve. Returns the number removed.
    ///
    /// Only the key is checked: a group whose mother is alive but whose
    /// children have all gone stale is left alone here, that is election's
    /// job. Entries the sweep removes are gone for good; groups that should
    /// survive a dead mother must be healed before sweeping.
    pub fn sweep(&self) -> Result<usize> {
        let Some(node) = self.node()? else {
            return Ok(0);
        };

        let mut removed = 0;
        for (key, _) in self.session.entries(node)? {
            if self.session.is_alive(&EntityId::from(key.as_str()))? {
                continue;
            }
            if self.session.erase_record(node, &key)? {
                tracing::debug!(key = %key, "swept entry with dead key");
                removed += 1;
            }
        }
        if removed > 0 {
            tracing::info!(category = self.category(), removed, "integrity sweep");
        }
        Ok(removed)
    }

    /// Diagnostic counters over the category. Corrupt entries are invisible
    /// here, same as in [`Self::enumerate`].
    pub fn stats(&self) -> Result<RegistryStats> {
        let Some(node) = self.node()? else {
            return Ok(RegistryStats::default());
        };

        let mut stats = RegistryStats::default();
        for (_, values) in self.session.entries(node)? {
            let Some(record) = codec::decode(&values) else {
                continue;
            };
            stats.group_count += 1;
            stats.child_count += record.children.len();
            if !self.session.is_alive(&record.mother)? {
                stats.orphaned_count += 1;
            }
        }
        Ok(stats)
    }
}
