//! Pass reports

use crate::DueTiers;
use snap_core::{SnapshotName, StoreError, StoreOp, Timestamp};

/// How processing of a target ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    /// The target was evaluated (individual operations may still have failed)
    Completed,
    /// Pool health gate failed; nothing was attempted
    SkippedUnhealthy { detail: String },
    /// The inventory could not be listed; nothing was attempted
    Unavailable { reason: String },
}

/// A failed create or destroy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub operation: StoreOp,
    pub name: String,
    pub reason: String,
}

impl Failure {
    pub fn new(operation: StoreOp, name: &SnapshotName, error: &StoreError) -> Self {
        Self {
            operation,
            name: name.to_string(),
            reason: error.to_string(),
        }
    }
}

/// What happened to one target during a pass
#[derive(Debug, Clone)]
pub struct TargetReport {
    pub target: String,
    pub outcome: TargetOutcome,
    pub due: DueTiers,
    pub created: Vec<SnapshotName>,
    /// Due snapshots whose name already existed
    pub already_present: Vec<SnapshotName>,
    pub destroyed: Vec<SnapshotName>,
    pub failures: Vec<Failure>,
    /// Whether retention trimming ran
    pub trimmed: bool,
}

impl TargetReport {
    pub fn new(target: &str, outcome: TargetOutcome) -> Self {
        Self {
            target: target.to_string(),
            outcome,
            due: DueTiers::default(),
            created: Vec::new(),
            already_present: Vec::new(),
            destroyed: Vec::new(),
            failures: Vec::new(),
            trimmed: false,
        }
    }

    /// Completed with no failed operations
    pub fn is_ok(&self) -> bool {
        self.outcome == TargetOutcome::Completed && self.failures.is_empty()
    }
}

/// Summary of one pass over all targets
#[derive(Debug, Clone)]
pub struct PassReport {
    pub now: Timestamp,
    pub targets: Vec<TargetReport>,
}

impl PassReport {
    pub fn has_failures(&self) -> bool {
        self.targets.iter().any(|t| !t.is_ok())
    }

    pub fn created_count(&self) -> usize {
        self.targets.iter().map(|t| t.created.len()).sum()
    }

    pub fn destroyed_count(&self) -> usize {
        self.targets.iter().map(|t| t.destroyed.len()).sum()
    }

    pub fn failure_count(&self) -> usize {
        self.targets
            .iter()
            .map(|t| match t.outcome {
                TargetOutcome::Completed => t.failures.len(),
                _ => 1 + t.failures.len(),
            })
            .sum()
    }

    pub fn target(&self, path: &str) -> Option<&TargetReport> {
        self.targets.iter().find(|t| t.target == path)
    }
}
