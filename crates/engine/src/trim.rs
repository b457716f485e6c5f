//! Per-tier retention trimming

use snap_core::{RetentionPolicy, SnapshotName, SnapshotSet, SnapshotStore, StoreError, Tier};
use tracing::{debug, info, warn};

/// Result of trimming one or more tiers
#[derive(Debug, Default)]
pub struct TrimOutcome {
    /// Snapshots that are gone (destroyed now, or already absent)
    pub destroyed: Vec<SnapshotName>,
    /// Destroys that failed; these stay in the inventory
    pub failed: Vec<(SnapshotName, StoreError)>,
}

impl TrimOutcome {
    fn merge(&mut self, other: TrimOutcome) {
        self.destroyed.extend(other.destroyed);
        self.failed.extend(other.failed);
    }
}

/// Snapshots of `tier` beyond the `max_count` newest, oldest first
pub fn excess(set: &SnapshotSet, tier: Tier, max_count: usize) -> Vec<SnapshotName> {
    let mut surplus: Vec<SnapshotName> = set
        .tier_newest_first(tier)
        .into_iter()
        .skip(max_count)
        .cloned()
        .collect();
    surplus.reverse();
    surplus
}

/// Destroy the snapshots of `tier` beyond the `max_count` newest
///
/// A snapshot that is already gone counts as destroyed.
pub fn trim_tier<S: SnapshotStore + ?Sized>(
    store: &S,
    set: &mut SnapshotSet,
    tier: Tier,
    max_count: usize,
) -> TrimOutcome {
    let mut outcome = TrimOutcome::default();

    for name in excess(set, tier, max_count) {
        match store.destroy(&name) {
            Ok(()) => {
                info!("Destroyed snapshot {}", name);
            }
            Err(StoreError::NotFound { .. }) => {
                debug!("Snapshot {} already gone", name);
            }
            Err(e) => {
                warn!("Failed to destroy snapshot {}: {}", name, e);
                outcome.failed.push((name, e));
                continue;
            }
        }
        set.remove(&name);
        outcome.destroyed.push(name);
    }

    outcome
}

/// Trim every tier to the counts of `policy`
pub fn trim_all<S: SnapshotStore + ?Sized>(
    store: &S,
    set: &mut SnapshotSet,
    policy: &RetentionPolicy,
) -> TrimOutcome {
    let mut outcome = TrimOutcome::default();
    for tier in Tier::ALL {
        outcome.merge(trim_tier(store, set, tier, policy.max_for(tier)));
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use rand::{Rng, SeedableRng};
    use rand_chacha::ChaCha8Rng;
    use snap_core::{MemoryStore, StoreOp, Timestamp};

    const TARGET: &str = "tank/data";

    fn base() -> Timestamp {
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    /// Seed `count` snapshots of `tier`, one hour apart
    fn seed(store: &MemoryStore, tier: Tier, count: usize) {
        for i in 0..count {
            let name = SnapshotName::new(TARGET, tier, base() + Duration::hours(i as i64));
            store.add_raw(&name.to_string());
        }
    }

    fn inventory(store: &MemoryStore) -> SnapshotSet {
        SnapshotSet::from_names(TARGET, store.list(TARGET).unwrap())
    }

    #[test]
    fn test_trim_keeps_newest() {
        let store = MemoryStore::new();
        seed(&store, Tier::Regular, 6);
        let mut set = inventory(&store);

        let outcome = trim_tier(&store, &mut set, Tier::Regular, 4);

        assert_eq!(outcome.destroyed.len(), 2);
        assert!(outcome.failed.is_empty());
        assert_eq!(
            store.names(TARGET),
            vec![
                "tank/data@snap-2024-01-01_02:00",
                "tank/data@snap-2024-01-01_03:00",
                "tank/data@snap-2024-01-01_04:00",
                "tank/data@snap-2024-01-01_05:00",
            ]
        );
        assert_eq!(set.count(Tier::Regular), 4);
    }

    #[test]
    fn test_trim_deletes_oldest_first() {
        let store = MemoryStore::new();
        seed(&store, Tier::Daily, 5);
        let mut set = inventory(&store);

        trim_tier(&store, &mut set, Tier::Daily, 2);

        let destroyed: Vec<String> = store
            .calls()
            .into_iter()
            .filter(|(op, _)| *op == StoreOp::Destroy)
            .map(|(_, name)| name)
            .collect();
        assert_eq!(
            destroyed,
            vec![
                "tank/data@daily-2024-01-01_00:00",
                "tank/data@daily-2024-01-01_01:00",
                "tank/data@daily-2024-01-01_02:00",
            ]
        );
    }

    #[test]
    fn test_trim_under_limit_is_no_op() {
        let store = MemoryStore::new();
        seed(&store, Tier::Weekly, 3);
        let mut set = inventory(&store);

        let outcome = trim_tier(&store, &mut set, Tier::Weekly, 4);
        assert!(outcome.destroyed.is_empty());
        assert_eq!(store.count_calls(StoreOp::Destroy), 0);
    }

    #[test]
    fn test_trim_to_zero_removes_tier() {
        let store = MemoryStore::new();
        seed(&store, Tier::Monthly, 3);
        seed(&store, Tier::Regular, 2);
        let mut set = inventory(&store);

        trim_tier(&store, &mut set, Tier::Monthly, 0);
        assert_eq!(set.count(Tier::Monthly), 0);
        assert_eq!(set.count(Tier::Regular), 2);
    }

    #[test]
    fn test_trim_is_tier_scoped() {
        let store = MemoryStore::new();
        seed(&store, Tier::Regular, 5);
        seed(&store, Tier::Daily, 5);
        let mut set = inventory(&store);

        trim_tier(&store, &mut set, Tier::Regular, 1);
        assert_eq!(set.count(Tier::Regular), 1);
        assert_eq!(set.count(Tier::Daily), 5);
    }

    #[test]
    fn test_trim_never_touches_foreign_snapshots() {
        let store = MemoryStore::new();
        store.add_raw("tank/data@before-upgrade");
        store.add_raw("tank/data@snap-old");
        seed(&store, Tier::Regular, 3);
        let mut set = inventory(&store);

        trim_tier(&store, &mut set, Tier::Regular, 0);
        assert_eq!(
            store.names(TARGET),
            vec!["tank/data@before-upgrade", "tank/data@snap-old"]
        );
    }

    #[test]
    fn test_already_absent_counts_as_destroyed() {
        let store = MemoryStore::new();
        // Inventory says three, store only holds one
        let mut set = SnapshotSet::from_names(
            TARGET,
            [
                "tank/data@snap-2024-01-01_00:00",
                "tank/data@snap-2024-01-01_01:00",
                "tank/data@snap-2024-01-01_02:00",
            ],
        );
        store.add_raw("tank/data@snap-2024-01-01_02:00");

        let outcome = trim_tier(&store, &mut set, Tier::Regular, 1);
        assert_eq!(outcome.destroyed.len(), 2);
        assert!(outcome.failed.is_empty());
        assert_eq!(set.count(Tier::Regular), 1);
    }

    #[test]
    fn test_failed_destroy_is_reported_and_kept() {
        let store = MemoryStore::new();
        seed(&store, Tier::Regular, 3);
        store.fail_on("tank/data@snap-2024-01-01_00:00");
        let mut set = inventory(&store);

        let outcome = trim_tier(&store, &mut set, Tier::Regular, 1);
        assert_eq!(outcome.destroyed.len(), 1);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0.to_string(), "tank/data@snap-2024-01-01_00:00");
        assert_eq!(set.count(Tier::Regular), 2);
    }

    #[test]
    fn test_trim_all_uses_policy_counts() {
        let store = MemoryStore::new();
        seed(&store, Tier::Regular, 30);
        seed(&store, Tier::Daily, 10);
        seed(&store, Tier::Weekly, 6);
        seed(&store, Tier::Monthly, 13);
        let mut set = inventory(&store);

        let outcome = trim_all(&store, &mut set, &RetentionPolicy::default());
        assert_eq!(outcome.destroyed.len(), 6 + 3 + 2 + 1);
        assert_eq!(set.count(Tier::Regular), 24);
        assert_eq!(set.count(Tier::Daily), 7);
        assert_eq!(set.count(Tier::Weekly), 4);
        assert_eq!(set.count(Tier::Monthly), 12);
    }

    #[test]
    fn test_trim_bound_and_newest_kept_randomized() {
        let mut rng = ChaCha8Rng::seed_from_u64(0x5eed);

        for _ in 0..200 {
            let store = MemoryStore::new();
            let mut stamps = Vec::new();
            for _ in 0..rng.gen_range(0..40) {
                let minutes = rng.gen_range(0..60 * 24 * 90);
                stamps.push(base() + Duration::minutes(minutes));
            }
            for ts in &stamps {
                store.add_raw(&SnapshotName::new(TARGET, Tier::Regular, *ts).to_string());
            }
            let mut set = inventory(&store);
            let original = set.count(Tier::Regular);
            let max_count = rng.gen_range(0..30);

            let outcome = trim_tier(&store, &mut set, Tier::Regular, max_count);

            let remaining = inventory(&store);
            assert_eq!(remaining.count(Tier::Regular), original.min(max_count));

            let oldest_kept = remaining
                .tier_newest_first(Tier::Regular)
                .last()
                .map(|n| n.timestamp());
            if let Some(oldest_kept) = oldest_kept {
                for gone in &outcome.destroyed {
                    assert!(gone.timestamp() < oldest_kept);
                }
            }
        }
    }
}
