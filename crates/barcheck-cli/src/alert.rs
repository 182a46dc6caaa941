use barcheck_core::{AlertSink, DuplicateAlert};
use colored::*;
use std::io::{self, Write};
use std::thread;
use tracing::warn;

/// Rings the terminal bell for every duplicate, off the scanning thread.
pub struct TerminalAlerts;

impl AlertSink for TerminalAlerts {
    fn on_duplicate(&self, alert: &DuplicateAlert) {
        let alert = alert.clone();
        thread::spawn(move || {
            warn!("Duplicate scan {} (STT {})", alert.barcode, alert.sequence_number);
            let mut stderr = io::stderr();
            let _ = writeln!(stderr, "\x07{}", "DUPLICATE".red().bold());
            let _ = stderr.flush();
        });
    }
}
