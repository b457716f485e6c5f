//! Alert delivery seam

use parking_lot::Mutex;

/// A problem worth telling an operator about
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub target: String,
    pub subject: String,
    pub detail: String,
}

impl Alert {
    pub fn new(target: impl Into<String>, subject: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            subject: subject.into(),
            detail: detail.into(),
        }
    }
}

/// Destination for alerts
///
/// Delivery is best effort: implementations log their own failures.
pub trait AlertSink {
    fn alert(&self, alert: &Alert);
}

impl<A: AlertSink + ?Sized> AlertSink for &A {
    fn alert(&self, alert: &Alert) {
        (**self).alert(alert)
    }
}

/// Sink that keeps alerts in memory
#[derive(Debug, Default)]
pub struct RecordingAlertSink {
    alerts: Mutex<Vec<Alert>>,
}

impl RecordingAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().clone()
    }
}

impl AlertSink for RecordingAlertSink {
    fn alert(&self, alert: &Alert) {
        self.alerts.lock().push(alert.clone());
    }
}
