use crate::alert::{AlertSink, DuplicateAlert};
use crate::error::Error;
use crate::registry::{normalize_barcode, Model, ModelRegistry, ScanSession};
use std::fmt;
use tracing::debug;

/// Outcome of checking one scan against the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    Ok,
    Duplicate,
    Invalid,
}

impl ScanOutcome {
    /// The `KetQua` text stored for this outcome.
    pub const fn label(self) -> &'static str {
        match self {
            ScanOutcome::Ok => "OK",
            ScanOutcome::Duplicate => "Trùng barcode",
            ScanOutcome::Invalid => "Sai model",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "OK" => Some(ScanOutcome::Ok),
            "Trùng barcode" => Some(ScanOutcome::Duplicate),
            "Sai model" => Some(ScanOutcome::Invalid),
            _ => None,
        }
    }
}

impl fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Barcodes already processed in the current view, in scan order and with
/// every outcome included. Its length drives the STT numbering.
#[derive(Debug, Default, Clone)]
pub struct WorkingSet {
    barcodes: Vec<String>,
}

impl WorkingSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, barcode: &str) {
        self.barcodes.push(normalize_barcode(barcode));
    }

    pub fn contains(&self, barcode: &str) -> bool {
        let normalized = normalize_barcode(barcode);
        self.barcodes.iter().any(|b| *b == normalized)
    }

    pub fn len(&self) -> usize {
        self.barcodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.barcodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.barcodes.clear();
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// The scan as entered, surrounding whitespace removed.
    pub barcode: String,
    pub outcome: ScanOutcome,
    pub sequence_number: i64,
    pub model: Option<Model>,
}

/// Parse the operator-entered STT baseline.
pub fn parse_start_value(text: &str) -> Result<i64, Error> {
    let trimmed = text.trim();
    trimmed
        .parse::<i64>()
        .map_err(|_| Error::Validation(format!("start value '{}' is not a whole number", trimmed)))
}

/// Decides OK / duplicate / invalid for single scans. Persists nothing.
pub struct Classifier<'a> {
    registry: &'a ModelRegistry,
    alerts: &'a dyn AlertSink,
}

impl<'a> Classifier<'a> {
    pub fn new(registry: &'a ModelRegistry, alerts: &'a dyn AlertSink) -> Self {
        Self { registry, alerts }
    }

    /// Classify `raw` against the registry.
    ///
    /// An accepted scan is marked in `session`. The caller stores the
    /// result and appends it to `working_set`.
    pub fn classify(
        &self,
        session: &mut ScanSession,
        working_set: &WorkingSet,
        raw: &str,
        start_value: i64,
    ) -> Result<Classification, Error> {
        let barcode = raw.trim();
        if barcode.is_empty() {
            return Err(Error::Validation("barcode is empty".to_string()));
        }
        let normalized = normalize_barcode(barcode);
        let sequence_number = start_value + working_set.len() as i64;

        let model = self.registry.try_match_model(&normalized).cloned();
        let outcome = match &model {
            None => ScanOutcome::Invalid,
            Some(_) => {
                if self.registry.is_barcode_scanned(session, &normalized)
                    || working_set.contains(&normalized)
                {
                    ScanOutcome::Duplicate
                } else {
                    self.registry.mark_scanned(session, &normalized);
                    ScanOutcome::Ok
                }
            }
        };

        match outcome {
            ScanOutcome::Duplicate => {
                debug!("Duplicate barcode {} at STT {}", barcode, sequence_number);
                self.alerts.on_duplicate(&DuplicateAlert {
                    barcode: barcode.to_string(),
                    sequence_number,
                });
            }
            _ => debug!("Barcode {} classified {} at STT {}", barcode, outcome, sequence_number),
        }

        Ok(Classification {
            barcode: barcode.to_string(),
            outcome,
            sequence_number,
            model,
        })
    }
}
