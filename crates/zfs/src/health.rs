//! Pool health through `zpool status -x`

use crate::command::{Runner, SystemRunner};
use snap_core::{HealthCheck, PoolHealth, StoreError};
use std::time::Duration;

/// [`HealthCheck`] asking `zpool status -x <pool>`
///
/// `-x` prints a one-line "is healthy" message for a healthy pool and the
/// full status report otherwise; that report becomes the alert detail.
pub struct ZpoolHealth<R = SystemRunner> {
    runner: R,
}

impl ZpoolHealth<SystemRunner> {
    pub fn new(timeout: Duration) -> Self {
        Self::with_runner(SystemRunner::new(timeout))
    }
}

impl<R: Runner> ZpoolHealth<R> {
    pub fn with_runner(runner: R) -> Self {
        Self { runner }
    }
}

impl<R: Runner> HealthCheck for ZpoolHealth<R> {
    fn check(&self, pool: &str) -> Result<PoolHealth, StoreError> {
        let output = self.runner.run("zpool", &["status", "-x", pool])?;
        let stdout = output.stdout.trim();

        if output.success() && is_healthy_message(stdout, pool) {
            return Ok(PoolHealth::Healthy);
        }

        let mut detail = stdout.to_string();
        let stderr = output.stderr.trim();
        if !stderr.is_empty() {
            if !detail.is_empty() {
                detail.push('\n');
            }
            detail.push_str(stderr);
        }
        Ok(PoolHealth::Unhealthy { detail })
    }
}

fn is_healthy_message(stdout: &str, pool: &str) -> bool {
    stdout == format!("pool '{}' is healthy", pool) || stdout == "all pools are healthy"
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::CommandOutput;

    struct Canned(CommandOutput);

    impl Runner for Canned {
        fn run(&self, program: &str, args: &[&str]) -> Result<CommandOutput, StoreError> {
            assert_eq!(program, "zpool");
            assert_eq!(args[..2], ["status", "-x"]);
            Ok(self.0.clone())
        }
    }

    fn health(code: i32, stdout: &str, stderr: &str) -> ZpoolHealth<Canned> {
        ZpoolHealth::with_runner(Canned(CommandOutput {
            code: Some(code),
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        }))
    }

    #[test]
    fn test_healthy_pool() {
        let check = health(0, "pool 'tank' is healthy\n", "");
        assert_eq!(check.check("tank").unwrap(), PoolHealth::Healthy);
    }

    #[test]
    fn test_all_pools_healthy() {
        let check = health(0, "all pools are healthy\n", "");
        assert!(check.check("tank").unwrap().is_healthy());
    }

    #[test]
    fn test_degraded_pool_reports_status() {
        let report = "  pool: tank\n state: DEGRADED\nstatus: One or more devices has been removed.\n";
        let check = health(0, report, "");

        match check.check("tank").unwrap() {
            PoolHealth::Unhealthy { detail } => {
                assert!(detail.contains("state: DEGRADED"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_pool_is_unhealthy() {
        let check = health(1, "", "cannot open 'tank': no such pool\n");

        match check.check("tank").unwrap() {
            PoolHealth::Unhealthy { detail } => {
                assert_eq!(detail, "cannot open 'tank': no such pool");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_other_pool_name_is_not_healthy() {
        let check = health(0, "pool 'backup' is healthy", "");
        assert!(!check.check("tank").unwrap().is_healthy());
    }
}
