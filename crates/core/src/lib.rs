//! Core data model for snapbot
//!
//! This crate provides:
//! - Retention tiers and their name prefixes
//! - Typed snapshot names (`<target>@<prefix><YYYY-MM-DD_HH:MM>`)
//! - Per-target snapshot inventories
//! - Retention policies and targets
//! - The collaborator traits the engine drives: snapshot store, pool health, alerts

pub mod alert;
pub mod health;
pub mod name;
pub mod policy;
pub mod set;
pub mod store;
pub mod tier;

// Re-exports
pub use alert::{Alert, AlertSink, RecordingAlertSink};
pub use health::{AssumeHealthy, HealthCheck, PoolHealth};
pub use name::{truncate_to_minute, NameError, SnapshotName, TIMESTAMP_FORMAT};
pub use policy::{PolicyError, RetentionPolicy, Target};
pub use set::SnapshotSet;
pub use store::{DryRunStore, MemoryStore, SnapshotStore, StoreError, StoreOp};
pub use tier::Tier;

/// Timestamps are naive wall-clock times at minute resolution
pub type Timestamp = chrono::NaiveDateTime;
