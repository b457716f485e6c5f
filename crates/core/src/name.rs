//! Snapshot naming
//!
//! Snapshot names are the only record of what exists: the full name
//! `<target>@<prefix><YYYY-MM-DD_HH:MM>` encodes the target, the tier and the
//! creation minute. This module is the one place that formats and parses
//! those strings; everything else works with [`SnapshotName`].

use crate::{Tier, Timestamp};
use chrono::Timelike;
use std::fmt;
use thiserror::Error;

/// Fixed-width timestamp suffix; lexicographic order equals chronological order
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%H:%M";

/// Reasons a string is not a managed snapshot name
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    #[error("missing '@' separator in {0:?}")]
    MissingSeparator(String),

    #[error("empty target path in {0:?}")]
    EmptyTarget(String),

    #[error("unknown tier prefix in {0:?}")]
    UnknownTier(String),

    #[error("malformed timestamp in {0:?}")]
    BadTimestamp(String),
}

/// Typed snapshot name
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SnapshotName {
    target: String,
    tier: Tier,
    timestamp: Timestamp,
}

impl SnapshotName {
    /// Build a name; the timestamp is truncated to the minute
    pub fn new(target: impl Into<String>, tier: Tier, timestamp: Timestamp) -> Self {
        Self {
            target: target.into(),
            tier,
            timestamp: truncate_to_minute(timestamp),
        }
    }

    /// Parse a full snapshot name as reported by the store
    pub fn parse(full: &str) -> Result<Self, NameError> {
        let (target, rest) = full
            .split_once('@')
            .ok_or_else(|| NameError::MissingSeparator(full.to_string()))?;

        if target.is_empty() {
            return Err(NameError::EmptyTarget(full.to_string()));
        }

        let (tier, suffix) =
            Tier::from_prefixed(rest).ok_or_else(|| NameError::UnknownTier(full.to_string()))?;

        let timestamp = Timestamp::parse_from_str(suffix, TIMESTAMP_FORMAT)
            .map_err(|_| NameError::BadTimestamp(full.to_string()))?;

        // chrono accepts unpadded fields; only the canonical spelling is ours
        if timestamp.format(TIMESTAMP_FORMAT).to_string() != suffix {
            return Err(NameError::BadTimestamp(full.to_string()));
        }

        Ok(Self {
            target: target.to_string(),
            tier,
            timestamp,
        })
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn tier(&self) -> Tier {
        self.tier
    }

    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }
}

impl fmt::Display for SnapshotName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}@{}{}",
            self.target,
            self.tier.prefix(),
            self.timestamp.format(TIMESTAMP_FORMAT)
        )
    }
}

/// Drop seconds and sub-second precision
pub fn truncate_to_minute(ts: Timestamp) -> Timestamp {
    ts.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(ts)
}
