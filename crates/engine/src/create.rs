//! Idempotent snapshot creation

use snap_core::{SnapshotName, SnapshotSet, SnapshotStore, StoreError};
use tracing::{debug, info};

/// Create `name` unless it is already in the inventory
///
/// Returns `Ok(false)` for a name that already exists, which makes re-running
/// a pass within the same minute harmless. On success the inventory is
/// updated so later steps of the pass see the new snapshot.
pub fn ensure_snapshot<S: SnapshotStore + ?Sized>(
    store: &S,
    name: &SnapshotName,
    set: &mut SnapshotSet,
) -> Result<bool, StoreError> {
    if set.contains(name) {
        debug!("Snapshot {} already exists, skipping", name);
        return Ok(false);
    }

    store.create(name)?;
    set.insert(name.clone());
    info!("Created snapshot {}", name);
    Ok(true)
}
