use std::sync::mpsc::{channel, Receiver, Sender};

/// Raised when a scan is classified as a duplicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateAlert {
    pub barcode: String,
    pub sequence_number: i64,
}

/// Receiver of duplicate alerts.
///
/// Called inline by the classifier, so implementations must hand the work
/// off and return immediately. Failures are the sink's own business.
pub trait AlertSink: Send + Sync {
    fn on_duplicate(&self, _alert: &DuplicateAlert) {}
}

/// Discards every alert.
pub struct SilentAlerts;

impl AlertSink for SilentAlerts {}

/// Forwards alerts onto an mpsc channel for a consumer running elsewhere.
pub struct ChannelAlerts {
    sender: Sender<DuplicateAlert>,
}

impl ChannelAlerts {
    pub fn new() -> (Self, Receiver<DuplicateAlert>) {
        let (sender, receiver) = channel();
        (Self { sender }, receiver)
    }
}

impl AlertSink for ChannelAlerts {
    fn on_duplicate(&self, alert: &DuplicateAlert) {
        // A dropped receiver just means nobody is listening.
        let _ = self.sender.send(alert.clone());
    }
}
