use crate::error::Error;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File as ConfigFile};
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_RECENT_LIMIT: usize = 1000;
pub const DEFAULT_QUERY_LIMIT: usize = 10000;

const DATA_DIR_NAME: &str = "barcheck";
const DB_FILE_NAME: &str = "scan_records.db";

/// One accepted barcode model as written in `Config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    pub name: String,
    pub pattern: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub database_path: Option<String>,
    #[serde(default = "default_start_value")]
    pub start_value: i64,
    #[serde(default)]
    pub shift: String,
    #[serde(default = "default_recent_limit")]
    pub recent_limit: usize,
    #[serde(default = "default_query_limit")]
    pub query_limit: usize,
    #[serde(default)]
    pub retention_days: Option<u32>,
    #[serde(default)]
    pub models: Vec<ModelConfig>,
}

fn default_start_value() -> i64 {
    1
}

fn default_recent_limit() -> usize {
    DEFAULT_RECENT_LIMIT
}

fn default_query_limit() -> usize {
    DEFAULT_QUERY_LIMIT
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: None,
            start_value: default_start_value(),
            shift: String::new(),
            recent_limit: DEFAULT_RECENT_LIMIT,
            query_limit: DEFAULT_QUERY_LIMIT,
            retention_days: None,
            models: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Resolved location of the scan record store.
    pub fn database_path(&self) -> PathBuf {
        match &self.database_path {
            Some(path) if !path.trim().is_empty() => PathBuf::from(path),
            _ => default_database_path(),
        }
    }
}

/// `<local data dir>/barcheck/scan_records.db`, or the working directory
/// when the platform has no per-user data directory.
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATA_DIR_NAME)
        .join(DB_FILE_NAME)
}

pub fn load_configuration() -> Result<AppConfig, Error> {
    from_sources(
        Config::builder()
            .add_source(ConfigFile::with_name("Config").required(false))
            .add_source(Environment::with_prefix("BARCHECK")),
    )
}

fn from_sources(builder: ConfigBuilder<DefaultState>) -> Result<AppConfig, Error> {
    let config = builder.build()?.try_deserialize::<AppConfig>()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn parse(toml: &str) -> Result<AppConfig, Error> {
        from_sources(Config::builder().add_source(ConfigFile::from_str(toml, FileFormat::Toml)))
    }

    #[test]
    fn test_defaults_when_empty() {
        let config = parse("").unwrap();
        assert_eq!(config.start_value, 1);
        assert_eq!(config.shift, "");
        assert_eq!(config.recent_limit, DEFAULT_RECENT_LIMIT);
        assert_eq!(config.query_limit, DEFAULT_QUERY_LIMIT);
        assert!(config.retention_days.is_none());
        assert!(config.models.is_empty());
        assert!(config.database_path().ends_with("barcheck/scan_records.db"));
    }

    #[test]
    fn test_models_and_overrides() {
        let config = parse(
            r#"
            database_path = "/tmp/line3.db"
            start_value = 50
            shift = "Ca 2"
            retention_days = 90

            [[models]]
            name = "Panel A"
            pattern = "ABC*"

            [[models]]
            name = "Panel B"
            pattern = "XYZ-???"
            "#,
        )
        .unwrap();
        assert_eq!(config.database_path(), PathBuf::from("/tmp/line3.db"));
        assert_eq!(config.start_value, 50);
        assert_eq!(config.shift, "Ca 2");
        assert_eq!(config.retention_days, Some(90));
        assert_eq!(config.models.len(), 2);
        assert_eq!(config.models[1].pattern, "XYZ-???");
    }

    #[test]
    fn test_bad_value_is_a_config_error() {
        let result = parse("start_value = \"first\"");
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
