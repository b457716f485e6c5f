//! Snapshot store abstraction
//!
//! The engine only ever lists, creates and destroys snapshots. How that maps
//! to the storage subsystem lives behind [`SnapshotStore`]; the `zfs` crate
//! provides the real implementation.

use crate::SnapshotName;
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::time::Duration;
use thiserror::Error;
use tracing::info;

/// Errors reported by a snapshot store
#[derive(Debug, Error)]
pub enum StoreError {
    /// Listing failed; the inventory of the target is unknown
    #[error("target {target} unavailable: {reason}")]
    Unavailable { target: String, reason: String },

    /// A create or destroy command failed
    #[error("{operation} {name} failed: {reason}")]
    CommandFailed {
        operation: StoreOp,
        name: String,
        reason: String,
    },

    /// Destroy of a snapshot that does not exist
    #[error("snapshot {name} does not exist")]
    NotFound { name: String },

    #[error("command `{command}` timed out after {after:?}")]
    Timeout { command: String, after: Duration },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Store operation, for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOp {
    List,
    Create,
    Destroy,
}

impl std::fmt::Display for StoreOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            StoreOp::List => "list",
            StoreOp::Create => "create",
            StoreOp::Destroy => "destroy",
        })
    }
}

/// Storage backend holding the snapshots
pub trait SnapshotStore {
    /// Full names of the existing snapshots of `target`
    fn list(&self, target: &str) -> Result<Vec<String>, StoreError>;

    /// Create a snapshot. Callers check for existence first.
    fn create(&self, name: &SnapshotName) -> Result<(), StoreError>;

    /// Destroy a snapshot. Reports [`StoreError::NotFound`] if it is absent.
    fn destroy(&self, name: &SnapshotName) -> Result<(), StoreError>;
}

impl<S: SnapshotStore + ?Sized> SnapshotStore for &S {
    fn list(&self, target: &str) -> Result<Vec<String>, StoreError> {
        (**self).list(target)
    }

    fn create(&self, name: &SnapshotName) -> Result<(), StoreError> {
        (**self).create(name)
    }

    fn destroy(&self, name: &SnapshotName) -> Result<(), StoreError> {
        (**self).destroy(name)
    }
}

/// In-memory store with call recording and failure injection
///
/// Cloning is not supported; share it by reference.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Debug, Default)]
struct MemoryInner {
    snapshots: BTreeMap<String, BTreeSet<String>>,
    unavailable: HashSet<String>,
    failing: HashSet<String>,
    calls: Vec<(StoreOp, String)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw snapshot name (for test setup)
    pub fn add_raw(&self, full_name: &str) {
        let target = full_name.split('@').next().unwrap_or(full_name).to_string();
        self.inner
            .lock()
            .snapshots
            .entry(target)
            .or_default()
            .insert(full_name.to_string());
    }

    /// Make `list` fail for a target
    pub fn set_unavailable(&self, target: &str) {
        self.inner.lock().unavailable.insert(target.to_string());
    }

    /// Make create/destroy of one full name fail
    pub fn fail_on(&self, full_name: &str) {
        self.inner.lock().failing.insert(full_name.to_string());
    }

    /// Current names for a target, sorted
    pub fn names(&self, target: &str) -> Vec<String> {
        self.inner
            .lock()
            .snapshots
            .get(target)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Every call made so far
    pub fn calls(&self) -> Vec<(StoreOp, String)> {
        self.inner.lock().calls.clone()
    }

    pub fn count_calls(&self, op: StoreOp) -> usize {
        self.inner.lock().calls.iter().filter(|(o, _)| *o == op).count()
    }
}

impl SnapshotStore for MemoryStore {
    fn list(&self, target: &str) -> Result<Vec<String>, StoreError> {
        let mut inner = self.inner.lock();
        inner.calls.push((StoreOp::List, target.to_string()));

        if inner.unavailable.contains(target) {
            return Err(StoreError::Unavailable {
                target: target.to_string(),
                reason: "dataset does not exist".to_string(),
            });
        }

        Ok(inner
            .snapshots
            .get(target)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default())
    }

    fn create(&self, name: &SnapshotName) -> Result<(), StoreError> {
        let full = name.to_string();
        let mut inner = self.inner.lock();
        inner.calls.push((StoreOp::Create, full.clone()));

        if inner.failing.contains(&full) {
            return Err(StoreError::CommandFailed {
                operation: StoreOp::Create,
                name: full,
                reason: "injected failure".to_string(),
            });
        }

        inner
            .snapshots
            .entry(name.target().to_string())
            .or_default()
            .insert(full);
        Ok(())
    }

    fn destroy(&self, name: &SnapshotName) -> Result<(), StoreError> {
        let full = name.to_string();
        let mut inner = self.inner.lock();
        inner.calls.push((StoreOp::Destroy, full.clone()));

        if inner.failing.contains(&full) {
            return Err(StoreError::CommandFailed {
                operation: StoreOp::Destroy,
                name: full,
                reason: "injected failure".to_string(),
            });
        }

        let removed = inner
            .snapshots
            .get_mut(name.target())
            .map(|names| names.remove(&full))
            .unwrap_or(false);

        if removed {
            Ok(())
        } else {
            Err(StoreError::NotFound { name: full })
        }
    }
}

/// Store wrapper that lists for real but only logs mutations
pub struct DryRunStore<S> {
    inner: S,
}

impl<S: SnapshotStore> DryRunStore<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }
}

impl<S: SnapshotStore> SnapshotStore for DryRunStore<S> {
    fn list(&self, target: &str) -> Result<Vec<String>, StoreError> {
        self.inner.list(target)
    }

    fn create(&self, name: &SnapshotName) -> Result<(), StoreError> {
        info!("[dry-run] would create {}", name);
        Ok(())
    }

    fn destroy(&self, name: &SnapshotName) -> Result<(), StoreError> {
        info!("[dry-run] would destroy {}", name);
        Ok(())
    }
}
