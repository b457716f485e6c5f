//! Retention policies and targets

use crate::Tier;
use thiserror::Error;

/// Configuration errors for a target or its policy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("target {target}: snapshot interval must be at least 1 minute")]
    ZeroInterval { target: String },

    #[error("target {target}: max_snaps must be at least 1")]
    ZeroRegularRetention { target: String },

    #[error("invalid target path {target:?}: {reason}")]
    InvalidTarget { target: String, reason: &'static str },
}

/// Retention policy for one target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    /// Minutes between regular snapshots (default: 15)
    pub interval_minutes: u32,
    /// Regular snapshots to keep (default: 24)
    pub max_regular: usize,
    /// Daily snapshots to keep (default: 7)
    pub max_daily: usize,
    /// Weekly snapshots to keep (default: 4)
    pub max_weekly: usize,
    /// Monthly snapshots to keep (default: 12)
    pub max_monthly: usize,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            interval_minutes: 15,
            max_regular: 24,
            max_daily: 7,
            max_weekly: 4,
            max_monthly: 12,
        }
    }
}

impl RetentionPolicy {
    /// Retention count for a tier
    pub fn max_for(&self, tier: Tier) -> usize {
        match tier {
            Tier::Regular => self.max_regular,
            Tier::Daily => self.max_daily,
            Tier::Weekly => self.max_weekly,
            Tier::Monthly => self.max_monthly,
        }
    }

    pub fn validate(&self, target: &str) -> Result<(), PolicyError> {
        if self.interval_minutes == 0 {
            return Err(PolicyError::ZeroInterval {
                target: target.to_string(),
            });
        }
        // The newest regular snapshot is the only record of the last run
        if self.max_regular == 0 {
            return Err(PolicyError::ZeroRegularRetention {
                target: target.to_string(),
            });
        }
        Ok(())
    }
}

/// A dataset under snapshot management
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    path: String,
    policy: RetentionPolicy,
}

impl Target {
    /// Create a target, validating the path and the policy
    pub fn new(path: impl Into<String>, policy: RetentionPolicy) -> Result<Self, PolicyError> {
        let path = path.into();
        validate_path(&path)?;
        policy.validate(&path)?;
        Ok(Self { path, policy })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn policy(&self) -> &RetentionPolicy {
        &self.policy
    }

    /// Pool name: first segment of the path
    pub fn pool(&self) -> &str {
        self.path.split('/').next().unwrap_or(&self.path)
    }
}

fn validate_path(path: &str) -> Result<(), PolicyError> {
    let invalid = |reason| PolicyError::InvalidTarget {
        target: path.to_string(),
        reason,
    };

    if path.is_empty() {
        return Err(invalid("path is empty"));
    }
    if path.contains('@') {
        return Err(invalid("path must not contain '@'"));
    }
    if path.chars().any(char::is_whitespace) {
        return Err(invalid("path must not contain whitespace"));
    }
    if path.split('/').any(str::is_empty) {
        return Err(invalid("path has an empty segment"));
    }
    Ok(())
}
