//! One snapshot and retention pass

use anyhow::{Context, Result};
use cli_lib::{Config, FanoutAlertSink, PassLock};
use engine::{PassReport, ScheduleDriver, TargetOutcome, TargetReport};
use owo_colors::OwoColorize;
use snap_core::{DryRunStore, SnapshotStore, Target};
use std::path::Path;
use tracing::{info, warn};
use zfs::{ZfsStore, ZpoolHealth};

pub fn run(config_path: &Path, dry_run: bool) -> Result<()> {
    let config = cli_lib::load(config_path)?;
    let targets = config
        .validate()
        .with_context(|| format!("Invalid config file {}", config_path.display()))?;

    if targets.is_empty() {
        info!("No targets configured in {}", config_path.display());
        return Ok(());
    }

    // A dry run changes nothing, so it may overlap a real pass
    let _lock = if dry_run {
        None
    } else {
        match PassLock::acquire(&config.lock_file)? {
            Some(lock) => Some(lock),
            None => {
                warn!("Another pass is still running, skipping this one");
                return Ok(());
            }
        }
    };

    let store = ZfsStore::new(config.command_timeout(), config.recursive);
    let now = config.clock.now();
    let report = if dry_run {
        execute(DryRunStore::new(store), &config, now, &targets)
    } else {
        execute(store, &config, now, &targets)
    };

    print_report(&report, dry_run);

    if report.has_failures() {
        anyhow::bail!("{} problem(s) during pass", report.failure_count());
    }
    Ok(())
}

fn execute<S: SnapshotStore>(
    store: S,
    config: &Config,
    now: snap_core::Timestamp,
    targets: &[Target],
) -> PassReport {
    let health = ZpoolHealth::new(config.command_timeout());
    let alerts = FanoutAlertSink::from_config(config.alert.as_ref(), config.command_timeout());
    ScheduleDriver::new(store, health, alerts).run_pass(now, targets)
}

fn print_report(report: &PassReport, dry_run: bool) {
    let heading = if dry_run { "Pass (dry run)" } else { "Pass" };
    println!("{} {}", heading.bold(), report.now.to_string().dimmed());

    for target in &report.targets {
        print_target(target);
    }

    println!(
        "{} created, {} destroyed, {} problem(s)",
        report.created_count(),
        report.destroyed_count(),
        report.failure_count()
    );
}

fn print_target(target: &TargetReport) {
    match &target.outcome {
        TargetOutcome::Completed if target.failures.is_empty() => {
            println!("  {} {}", "✓".green(), target.target.cyan());
        }
        TargetOutcome::Completed => {
            println!("  {} {}", "!".yellow(), target.target.cyan());
        }
        TargetOutcome::SkippedUnhealthy { detail } => {
            println!(
                "  {} {} {}",
                "✗".red(),
                target.target.cyan(),
                "skipped, pool unhealthy".red()
            );
            print_detail(detail);
        }
        TargetOutcome::Unavailable { reason } => {
            println!(
                "  {} {} {}",
                "✗".red(),
                target.target.cyan(),
                "skipped, cannot list snapshots".red()
            );
            print_detail(reason);
        }
    }

    for name in &target.created {
        println!("      {} {}", "+".green(), name);
    }
    for name in &target.destroyed {
        println!("      {} {}", "-".yellow(), name);
    }
    for failure in &target.failures {
        println!(
            "      {} {} {}: {}",
            "✗".red(),
            failure.operation,
            failure.name,
            failure.reason.dimmed()
        );
    }
}

fn print_detail(text: &str) {
    for line in text.lines().filter(|l| !l.trim().is_empty()) {
        println!("      {}", line.dimmed());
    }
}
