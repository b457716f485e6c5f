//! Configuration file
//!
//! TOML, one `[[targets]]` entry per dataset. Per-target keys fall back to
//! `[defaults]`, then to the built-in retention defaults.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use snap_core::{PolicyError, RetentionPolicy, Target, Timestamp};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default location of the configuration file
pub const DEFAULT_CONFIG_PATH: &str = "/etc/snapbot.toml";

/// Configuration problems found by [`Config::validate`]
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error("target {0} is configured more than once")]
    DuplicateTarget(String),

    #[error("command_timeout_secs must be at least 1")]
    ZeroTimeout,

    #[error("alert command must not be empty")]
    EmptyAlertCommand,
}

/// Which wall clock names snapshots and decides boundaries
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClockSource {
    #[default]
    Local,
    Utc,
}

impl ClockSource {
    pub fn now(self) -> Timestamp {
        match self {
            ClockSource::Local => chrono::Local::now().naive_local(),
            ClockSource::Utc => chrono::Utc::now().naive_utc(),
        }
    }
}

/// Retention keys shared by `[defaults]` and each target
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PolicyOverrides {
    pub snap_interval: Option<u32>,
    pub max_snaps: Option<usize>,
    pub max_days: Option<usize>,
    pub max_weeks: Option<usize>,
    pub max_months: Option<usize>,
}

impl PolicyOverrides {
    /// Fill unset keys from `fallback`
    pub fn or(self, fallback: PolicyOverrides) -> PolicyOverrides {
        PolicyOverrides {
            snap_interval: self.snap_interval.or(fallback.snap_interval),
            max_snaps: self.max_snaps.or(fallback.max_snaps),
            max_days: self.max_days.or(fallback.max_days),
            max_weeks: self.max_weeks.or(fallback.max_weeks),
            max_months: self.max_months.or(fallback.max_months),
        }
    }

    /// Resolve against the built-in defaults
    pub fn to_policy(self) -> RetentionPolicy {
        let base = RetentionPolicy::default();
        RetentionPolicy {
            interval_minutes: self.snap_interval.unwrap_or(base.interval_minutes),
            max_regular: self.max_snaps.unwrap_or(base.max_regular),
            max_daily: self.max_days.unwrap_or(base.max_daily),
            max_weekly: self.max_weeks.unwrap_or(base.max_weekly),
            max_monthly: self.max_months.unwrap_or(base.max_monthly),
        }
    }
}

/// One `[[targets]]` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    pub path: String,
    pub snap_interval: Option<u32>,
    pub max_snaps: Option<usize>,
    pub max_days: Option<usize>,
    pub max_weeks: Option<usize>,
    pub max_months: Option<usize>,
}

impl TargetConfig {
    fn overrides(&self) -> PolicyOverrides {
        PolicyOverrides {
            snap_interval: self.snap_interval,
            max_snaps: self.max_snaps,
            max_days: self.max_days,
            max_weeks: self.max_weeks,
            max_months: self.max_months,
        }
    }
}

/// `[alert]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AlertConfig {
    /// Program and arguments; the alert text is written to its stdin
    pub command: Vec<String>,
}

/// Whole configuration file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default = "default_lock_file")]
    pub lock_file: PathBuf,

    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    #[serde(default)]
    pub clock: ClockSource,

    /// Snapshot and destroy descendant datasets too
    #[serde(default = "default_recursive")]
    pub recursive: bool,

    #[serde(default)]
    pub defaults: PolicyOverrides,

    #[serde(default)]
    pub alert: Option<AlertConfig>,

    #[serde(default)]
    pub targets: Vec<TargetConfig>,
}

fn default_lock_file() -> PathBuf {
    PathBuf::from("/run/snapbot.lock")
}

fn default_command_timeout_secs() -> u64 {
    60
}

fn default_recursive() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lock_file: default_lock_file(),
            command_timeout_secs: default_command_timeout_secs(),
            clock: ClockSource::default(),
            recursive: default_recursive(),
            defaults: PolicyOverrides::default(),
            alert: None,
            targets: Vec::new(),
        }
    }
}

impl Config {
    /// Parse configuration text
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("Failed to parse configuration")
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// Check every setting and resolve the targets, in file order
    pub fn validate(&self) -> Result<Vec<Target>, ConfigError> {
        if self.command_timeout_secs == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        if let Some(alert) = &self.alert {
            if alert.command.first().map_or(true, |p| p.trim().is_empty()) {
                return Err(ConfigError::EmptyAlertCommand);
            }
        }

        let mut seen = HashSet::new();
        let mut targets = Vec::with_capacity(self.targets.len());
        for entry in &self.targets {
            let path = entry.path.trim();
            if !seen.insert(path.to_string()) {
                return Err(ConfigError::DuplicateTarget(path.to_string()));
            }
            let policy = entry.overrides().or(self.defaults).to_policy();
            targets.push(Target::new(path, policy)?);
        }

        Ok(targets)
    }
}

/// Load configuration from `path`
pub fn load(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;
    Config::parse(&text).with_context(|| format!("Invalid config file {}", path.display()))
}

/// Annotated example configuration
pub fn example_config() -> &'static str {
    r#"# snapbot configuration

# Advisory lock preventing overlapping passes
lock_file = "/run/snapbot.lock"

# Kill any zfs/zpool/alert command running longer than this
command_timeout_secs = 60

# Clock used for snapshot names and day boundaries: "local" or "utc"
clock = "local"

# Snapshot (and destroy) descendant datasets too
recursive = true

# Fallbacks for every target
[defaults]
snap_interval = 15   # minutes between regular snapshots
max_snaps = 24       # regular snapshots kept
max_days = 7         # daily snapshots kept
max_weeks = 4        # weekly snapshots kept (taken on Mondays)
max_months = 12      # monthly snapshots kept (taken on the 1st)

# Alert text is written to this command's stdin
# [alert]
# command = ["mail", "-s", "snapbot alert", "root"]

[[targets]]
path = "tank/home"

[[targets]]
path = "tank/vm"
snap_interval = 60
max_snaps = 12
"#
}
