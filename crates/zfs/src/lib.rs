//! ZFS backend for snapbot
//!
//! This crate provides:
//! - `ZfsStore`: snapshot list/create/destroy through the `zfs` command
//! - `ZpoolHealth`: pool health gate through `zpool status -x`
//! - A command runner that kills commands exceeding their deadline

pub mod command;
pub mod health;
pub mod store;

// Re-exports
pub use command::{run_with_timeout, CommandOutput, Runner, SystemRunner};
pub use health::ZpoolHealth;
pub use store::ZfsStore;
