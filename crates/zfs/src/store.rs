//! Snapshot store backed by the `zfs` command

use crate::command::{CommandOutput, Runner, SystemRunner};
use snap_core::{SnapshotName, SnapshotStore, StoreError, StoreOp};
use std::time::Duration;
use tracing::debug;

/// `zfs` messages meaning the snapshot to destroy is already gone
const NOT_FOUND_MARKERS: [&str; 2] = ["could not find any snapshots to destroy", "does not exist"];

/// [`SnapshotStore`] driving `zfs list`, `zfs snapshot` and `zfs destroy`
pub struct ZfsStore<R = SystemRunner> {
    runner: R,
    /// Snapshot and destroy descendant datasets too (`-r`)
    recursive: bool,
}

impl ZfsStore<SystemRunner> {
    pub fn new(timeout: Duration, recursive: bool) -> Self {
        Self::with_runner(SystemRunner::new(timeout), recursive)
    }
}

impl<R: Runner> ZfsStore<R> {
    pub fn with_runner(runner: R, recursive: bool) -> Self {
        Self { runner, recursive }
    }

    fn mutate(&self, op: StoreOp, verb: &str, name: &SnapshotName) -> Result<CommandOutput, StoreError> {
        let full = name.to_string();
        let mut args = vec![verb];
        if self.recursive {
            args.push("-r");
        }
        args.push(&full);

        self.runner.run("zfs", &args).map_err(|e| match e {
            StoreError::Io(io) => StoreError::CommandFailed {
                operation: op,
                name: full.clone(),
                reason: io.to_string(),
            },
            other => other,
        })
    }
}

impl<R: Runner> SnapshotStore for ZfsStore<R> {
    fn list(&self, target: &str) -> Result<Vec<String>, StoreError> {
        let output = self
            .runner
            .run("zfs", &["list", "-H", "-o", "name", "-t", "snapshot", "-d", "1", target])
            .map_err(|e| StoreError::Unavailable {
                target: target.to_string(),
                reason: e.to_string(),
            })?;

        if !output.success() {
            return Err(StoreError::Unavailable {
                target: target.to_string(),
                reason: failure_reason(&output),
            });
        }

        let names: Vec<String> = output
            .stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        debug!("{} has {} snapshot(s)", target, names.len());
        Ok(names)
    }

    fn create(&self, name: &SnapshotName) -> Result<(), StoreError> {
        let output = self.mutate(StoreOp::Create, "snapshot", name)?;
        if output.success() {
            Ok(())
        } else {
            Err(StoreError::CommandFailed {
                operation: StoreOp::Create,
                name: name.to_string(),
                reason: failure_reason(&output),
            })
        }
    }

    fn destroy(&self, name: &SnapshotName) -> Result<(), StoreError> {
        let output = self.mutate(StoreOp::Destroy, "destroy", name)?;
        if output.success() {
            return Ok(());
        }

        if NOT_FOUND_MARKERS.iter().any(|m| output.stderr.contains(m)) {
            return Err(StoreError::NotFound {
                name: name.to_string(),
            });
        }

        Err(StoreError::CommandFailed {
            operation: StoreOp::Destroy,
            name: name.to_string(),
            reason: failure_reason(&output),
        })
    }
}

fn failure_reason(output: &CommandOutput) -> String {
    let stderr = output.stderr.trim();
    if !stderr.is_empty() {
        return stderr.to_string();
    }
    match output.code {
        Some(code) => format!("exit status {}", code),
        None => "terminated by signal".to_string(),
    }
}
