//! Alert delivery

use crate::config::AlertConfig;
use snap_core::{Alert, AlertSink};
use std::time::Duration;
use tracing::{error, warn};

/// Writes alerts to the log at error level
#[derive(Debug, Default, Clone, Copy)]
pub struct LogAlertSink;

impl AlertSink for LogAlertSink {
    fn alert(&self, alert: &Alert) {
        error!(dataset = %alert.target, "{}: {}", alert.subject, alert.detail);
    }
}

/// Pipes the alert text into an external command such as `mail`
#[derive(Debug, Clone)]
pub struct CommandAlertSink {
    program: String,
    args: Vec<String>,
    timeout: Duration,
}

impl CommandAlertSink {
    /// `command` is the program followed by its arguments; `None` if empty
    pub fn new(command: &[String], timeout: Duration) -> Option<Self> {
        let (program, args) = command.split_first()?;
        Some(Self {
            program: program.clone(),
            args: args.to_vec(),
            timeout,
        })
    }

    pub fn message(alert: &Alert) -> String {
        format!(
            "{}\n\nTarget: {}\n\n{}\n",
            alert.subject, alert.target, alert.detail
        )
    }
}

impl AlertSink for CommandAlertSink {
    fn alert(&self, alert: &Alert) {
        let args: Vec<&str> = self.args.iter().map(String::as_str).collect();
        let message = Self::message(alert);

        // Delivery problems are logged and never abort the pass
        match zfs::run_with_timeout(&self.program, &args, Some(&message), self.timeout) {
            Ok(output) if output.success() => {}
            Ok(output) => warn!(
                "Alert command {} exited with {:?}: {}",
                self.program,
                output.code,
                output.stderr.trim()
            ),
            Err(e) => warn!("Alert command {} failed: {}", self.program, e),
        }
    }
}

/// Delivers every alert to each inner sink in turn
#[derive(Default)]
pub struct FanoutAlertSink {
    sinks: Vec<Box<dyn AlertSink>>,
}

impl FanoutAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, sink: impl AlertSink + 'static) {
        self.sinks.push(Box::new(sink));
    }

    pub fn len(&self) -> usize {
        self.sinks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sinks.is_empty()
    }

    /// Log sink, plus a command sink when `[alert]` is configured
    pub fn from_config(alert: Option<&AlertConfig>, timeout: Duration) -> Self {
        let mut fanout = Self::new();
        fanout.push(LogAlertSink);
        if let Some(sink) = alert.and_then(|a| CommandAlertSink::new(&a.command, timeout)) {
            fanout.push(sink);
        }
        fanout
    }
}

impl AlertSink for FanoutAlertSink {
    fn alert(&self, alert: &Alert) {
        for sink in &self.sinks {
            sink.alert(alert);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use snap_core::RecordingAlertSink;
    use std::sync::Arc;
    use tempfile::TempDir;

    struct Shared(Arc<RecordingAlertSink>);

    impl AlertSink for Shared {
        fn alert(&self, alert: &Alert) {
            self.0.alert(alert);
        }
    }

    fn sample() -> Alert {
        Alert::new("tank/home", "Pool tank is not healthy", "state: DEGRADED")
    }

    #[test]
    fn test_message_layout() {
        assert_eq!(
            CommandAlertSink::message(&sample()),
            "Pool tank is not healthy\n\nTarget: tank/home\n\nstate: DEGRADED\n"
        );
    }

    #[test]
    fn test_empty_command_has_no_sink() {
        assert!(CommandAlertSink::new(&[], Duration::from_secs(1)).is_none());
    }

    #[test]
    fn test_command_receives_message_on_stdin() {
        let dir = TempDir::new().unwrap();
        let out = dir.path().join("alert.txt");
        let command = vec![
            "sh".to_string(),
            "-c".to_string(),
            format!("cat > {}", out.display()),
        ];

        let sink = CommandAlertSink::new(&command, Duration::from_secs(10)).unwrap();
        sink.alert(&sample());

        let written = std::fs::read_to_string(&out).unwrap();
        assert_eq!(written, CommandAlertSink::message(&sample()));
    }

    #[test]
    fn test_failing_command_does_not_panic() {
        let command = vec!["definitely-not-a-real-program-xyz".to_string()];
        let sink = CommandAlertSink::new(&command, Duration::from_secs(1)).unwrap();
        sink.alert(&sample());

        let command = vec!["false".to_string()];
        let sink = CommandAlertSink::new(&command, Duration::from_secs(1)).unwrap();
        sink.alert(&sample());
    }

    #[test]
    fn test_fanout_delivers_to_all() {
        let first = Arc::new(RecordingAlertSink::default());
        let second = Arc::new(RecordingAlertSink::default());

        let mut fanout = FanoutAlertSink::new();
        fanout.push(Shared(first.clone()));
        fanout.push(Shared(second.clone()));
        fanout.alert(&sample());

        assert_eq!(first.alerts(), vec![sample()]);
        assert_eq!(second.alerts(), vec![sample()]);
    }

    #[test]
    fn test_from_config() {
        let timeout = Duration::from_secs(5);
        assert_eq!(FanoutAlertSink::from_config(None, timeout).len(), 1);

        let alert = AlertConfig {
            command: vec!["mail".to_string(), "root".to_string()],
        };
        assert_eq!(FanoutAlertSink::from_config(Some(&alert), timeout).len(), 2);
    }
}
