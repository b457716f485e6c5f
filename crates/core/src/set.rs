//! Live snapshot inventory for one target

use crate::{SnapshotName, Tier, Timestamp};
use std::collections::BTreeSet;
use tracing::debug;

/// Snapshots of one target, as listed by the store at the start of a pass
///
/// Managed snapshots are kept as parsed [`SnapshotName`]s. Anything else the
/// store reports (manual snapshots, other tools, descendant datasets) is kept
/// verbatim as foreign and never participates in retention.
#[derive(Debug, Clone, Default)]
pub struct SnapshotSet {
    target: String,
    managed: Vec<SnapshotName>,
    foreign: BTreeSet<String>,
}

impl SnapshotSet {
    /// Empty inventory for `target`
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            ..Self::default()
        }
    }

    /// Build an inventory from raw names reported by the store
    pub fn from_names<I, S>(target: &str, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::new(target);
        for raw in names {
            let raw = raw.as_ref().trim();
            if raw.is_empty() {
                continue;
            }
            match SnapshotName::parse(raw) {
                Ok(name) if name.target() == target => {
                    set.insert(name);
                }
                Ok(_) => {
                    set.foreign.insert(raw.to_string());
                }
                Err(e) => {
                    debug!("Ignoring unmanaged snapshot {}: {}", raw, e);
                    set.foreign.insert(raw.to_string());
                }
            }
        }
        set
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn contains(&self, name: &SnapshotName) -> bool {
        self.managed.contains(name)
    }

    /// Add a name; returns false if it was already present
    pub fn insert(&mut self, name: SnapshotName) -> bool {
        if self.contains(&name) {
            return false;
        }
        self.managed.push(name);
        true
    }

    /// Remove a name; returns false if it was absent
    pub fn remove(&mut self, name: &SnapshotName) -> bool {
        let before = self.managed.len();
        self.managed.retain(|n| n != name);
        self.managed.len() != before
    }

    /// Snapshots of one tier, newest first
    pub fn tier_newest_first(&self, tier: Tier) -> Vec<&SnapshotName> {
        let mut names: Vec<_> = self.managed.iter().filter(|n| n.tier() == tier).collect();
        names.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));
        names
    }

    /// Timestamp of the most recent snapshot of a tier
    pub fn latest(&self, tier: Tier) -> Option<Timestamp> {
        self.managed
            .iter()
            .filter(|n| n.tier() == tier)
            .map(SnapshotName::timestamp)
            .max()
    }

    pub fn count(&self, tier: Tier) -> usize {
        self.managed.iter().filter(|n| n.tier() == tier).count()
    }

    /// Number of managed snapshots across all tiers
    pub fn len(&self) -> usize {
        self.managed.len()
    }

    /// Names that are not managed snapshots of this target
    pub fn foreign(&self) -> impl Iterator<Item = &str> {
        self.foreign.iter().map(String::as_str)
    }
}
