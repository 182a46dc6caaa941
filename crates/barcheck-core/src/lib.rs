pub mod alert;
pub mod classifier;
pub mod config;
pub mod engine;
pub mod error;
pub mod registry;
pub mod storage;

pub use alert::{AlertSink, ChannelAlerts, DuplicateAlert, SilentAlerts};
pub use classifier::{parse_start_value, Classification, Classifier, ScanOutcome, WorkingSet};
pub use config::AppConfig;
pub use engine::ScanEngine;
pub use error::Error;
pub use registry::{normalize_barcode, Model, ModelRegistry, ScanSession};
pub use storage::{ScanRecord, ScanStore};
