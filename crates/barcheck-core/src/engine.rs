use crate::alert::{AlertSink, SilentAlerts};
use crate::classifier::{Classifier, ScanOutcome, WorkingSet};
use crate::config::AppConfig;
use crate::error::Error;
use crate::registry::{ModelRegistry, ScanSession};
use crate::storage::{ScanRecord, ScanStore};
use chrono::{Local, Timelike};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Format of the `NgayGio` column shown to operators.
pub const DISPLAY_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// One scanning station: classifies each scan, records it, and keeps the
/// session state that duplicate detection depends on.
pub struct ScanEngine {
    registry: ModelRegistry,
    store: ScanStore,
    session: ScanSession,
    working_set: WorkingSet,
    start_value: i64,
    shift: String,
    alerts: Arc<dyn AlertSink>,
}

impl ScanEngine {
    pub fn new(registry: ModelRegistry, store: ScanStore) -> Self {
        Self {
            registry,
            store,
            session: ScanSession::new(),
            working_set: WorkingSet::new(),
            start_value: 1,
            shift: String::new(),
            alerts: Arc::new(SilentAlerts),
        }
    }

    /// Registry from the configured models, store at the configured path.
    pub fn from_config(config: &AppConfig) -> Self {
        let registry = ModelRegistry::from_config(&config.models);
        if registry.is_empty() {
            warn!("No models configured, every scan will be rejected");
        }
        Self::new(registry, ScanStore::open_default(config))
            .with_start_value(config.start_value)
            .with_shift(&config.shift)
    }

    pub fn with_start_value(mut self, start_value: i64) -> Self {
        self.start_value = start_value;
        self
    }

    pub fn with_shift(mut self, shift: &str) -> Self {
        self.shift = shift.to_string();
        self
    }

    pub fn with_alerts(mut self, alerts: Arc<dyn AlertSink>) -> Self {
        self.alerts = alerts;
        self
    }

    pub fn registry(&self) -> &ModelRegistry {
        &self.registry
    }

    pub fn store(&self) -> &ScanStore {
        &self.store
    }

    pub fn session(&self) -> &ScanSession {
        &self.session
    }

    pub fn working_set(&self) -> &WorkingSet {
        &self.working_set
    }

    pub fn start_value(&self) -> i64 {
        self.start_value
    }

    /// Classify one raw scan, persist it, and add it to the working set.
    ///
    /// Empty input is a validation error and produces nothing. A store
    /// failure does not stop the scan: the returned record then has id 0.
    pub fn process(&mut self, raw: &str) -> Result<ScanRecord, Error> {
        let classification = Classifier::new(&self.registry, self.alerts.as_ref()).classify(
            &mut self.session,
            &self.working_set,
            raw,
            self.start_value,
        )?;

        let now = Local::now().naive_local();
        let now = now.with_nanosecond(0).unwrap_or(now);
        let mut record = ScanRecord {
            id: 0,
            sequence_number: classification.sequence_number,
            barcode: classification.barcode,
            timestamp_display: now.format(DISPLAY_TIME_FORMAT).to_string(),
            result: classification.outcome.label().to_string(),
            shift: self.shift.clone(),
            scan_time: Some(now),
        };

        match self.store.save(&record) {
            Some(id) => record.id = id,
            None => warn!("Scan {} was not persisted", record.barcode),
        }
        self.working_set.push(&record.barcode);

        if classification.outcome == ScanOutcome::Ok {
            debug!("STT {}: {} OK", record.sequence_number, record.barcode);
        }
        Ok(record)
    }

    /// Forget every accepted barcode and restart STT numbering.
    pub fn reset_session(&mut self) {
        self.session.reset();
        self.working_set.clear();
        info!("Scan session reset");
    }
}
