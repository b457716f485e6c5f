//! snapbot command-line support
//!
//! Configuration loading, the pass lock, alert sinks and logging setup used
//! by the `snapbot` binary.

pub mod alert;
pub mod config;
pub mod locks;
pub mod logging;

pub use alert::{CommandAlertSink, FanoutAlertSink, LogAlertSink};
pub use config::{load, ClockSource, Config, ConfigError, DEFAULT_CONFIG_PATH};
pub use locks::PassLock;
