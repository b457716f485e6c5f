//! Schedule driver: one pass over all targets

use crate::report::{Failure, PassReport, TargetOutcome, TargetReport};
use crate::{classify, ensure_snapshot, trim_all};
use snap_core::{
    truncate_to_minute, Alert, AlertSink, HealthCheck, PoolHealth, SnapshotName, SnapshotSet,
    SnapshotStore, StoreOp, Target, Tier, Timestamp,
};
use tracing::{debug, info, warn};

/// Runs passes against a store, gated by a health check, alerting on trouble
///
/// Holds no state between passes: every pass re-reads the inventory from
/// the store.
pub struct ScheduleDriver<S, H, A> {
    store: S,
    health: H,
    alerts: A,
}

impl<S, H, A> ScheduleDriver<S, H, A>
where
    S: SnapshotStore,
    H: HealthCheck,
    A: AlertSink,
{
    pub fn new(store: S, health: H, alerts: A) -> Self {
        Self {
            store,
            health,
            alerts,
        }
    }

    /// Process every target in order
    ///
    /// Failures are contained per target and collected in the report.
    pub fn run_pass(&self, now: Timestamp, targets: &[Target]) -> PassReport {
        let now = truncate_to_minute(now);
        info!("Starting pass at {} over {} target(s)", now, targets.len());

        let reports = targets
            .iter()
            .map(|target| self.run_target(now, target))
            .collect();

        PassReport {
            now,
            targets: reports,
        }
    }

    /// Process a single target
    pub fn run_target(&self, now: Timestamp, target: &Target) -> TargetReport {
        let path = target.path();

        // 1. Pool health gate
        let health = self.health.check(target.pool()).unwrap_or_else(|e| PoolHealth::Unhealthy {
            detail: format!("health check failed: {}", e),
        });
        if let PoolHealth::Unhealthy { detail } = health {
            warn!("Pool {} is unhealthy, skipping {}", target.pool(), path);
            self.alerts.alert(&Alert::new(
                path,
                format!("pool {} is unhealthy", target.pool()),
                detail.clone(),
            ));
            return TargetReport::new(path, TargetOutcome::SkippedUnhealthy { detail });
        }

        // 2. Live inventory
        let names = match self.store.list(path) {
            Ok(names) => names,
            Err(e) => {
                warn!("Cannot list snapshots of {}: {}", path, e);
                self.alerts.alert(&Alert::new(
                    path,
                    format!("cannot list snapshots of {}", path),
                    e.to_string(),
                ));
                return TargetReport::new(path, TargetOutcome::Unavailable { reason: e.to_string() });
            }
        };
        let mut set = SnapshotSet::from_names(path, names);

        // 3. Classify
        let policy = target.policy();
        let last_regular = set.latest(Tier::Regular);
        let due = classify(now, last_regular, policy.interval_minutes);
        debug!(
            "{}: last regular {:?}, due {:?}",
            set.target(), last_regular, due
        );

        let mut report = TargetReport::new(path, TargetOutcome::Completed);
        report.due = due;

        // 4. Create due snapshots
        let mut regular_created = false;
        for tier in due.tiers() {
            let name = SnapshotName::new(path, tier, now);
            match ensure_snapshot(&self.store, &name, &mut set) {
                Ok(true) => {
                    regular_created |= tier == Tier::Regular;
                    report.created.push(name);
                }
                Ok(false) => report.already_present.push(name),
                Err(e) => {
                    warn!("Failed to create snapshot {}: {}", name, e);
                    report.failures.push(Failure::new(StoreOp::Create, &name, &e));
                }
            }
        }

        // 5. Trim only when new inventory was added
        if regular_created {
            let outcome = trim_all(&self.store, &mut set, policy);
            report.trimmed = true;
            report.destroyed = outcome.destroyed;
            report.failures.extend(
                outcome
                    .failed
                    .iter()
                    .map(|(name, e)| Failure::new(StoreOp::Destroy, name, e)),
            );
        }

        report
    }
}
