//! Snapshot lifecycle decision engine
//!
//! This crate provides:
//! - Tier classification (interval due check and calendar boundary crossings)
//! - Idempotent snapshot creation
//! - Per-tier retention trimming
//! - The schedule driver running one pass over all targets

pub mod classify;
pub mod create;
pub mod driver;
pub mod report;
pub mod trim;

// Re-exports
pub use classify::{classify, DueTiers};
pub use create::ensure_snapshot;
pub use driver::ScheduleDriver;
pub use report::{Failure, PassReport, TargetOutcome, TargetReport};
pub use trim::{excess, trim_all, trim_tier, TrimOutcome};
