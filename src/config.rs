//! Configuration types for a pipeline run
//!
//! `PipelineConfig` carries the run-level flags coming from the command line.
//! `Settings` groups the per-stage configuration (source, file output, database)
//! and can be loaded from a YAML file. Database credentials are read from the
//! environment with fallback defaults.

use crate::error::{Error, Result};
use crate::types::{Coordinates, DatabaseEngine, OutputFormat};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fixed Open-Meteo forecast endpoint
pub const DEFAULT_ENDPOINT: &str = "https://api.open-meteo.com/v1/forecast";

/// Hourly variables requested by default
pub const DEFAULT_HOURLY: [&str; 2] = ["temperature_2m", "relativehumidity_2m"];

/// Default batch size
pub const DEFAULT_BATCH_SIZE: usize = 32;

// ============================================================================
// Pipeline Config
// ============================================================================

/// Run-level configuration. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    debug: bool,
    verbose: bool,
    output_format: OutputFormat,
    batch_size: usize,
}

impl PipelineConfig {
    /// Build a config, validating the output format literal and the batch size.
    pub fn new(debug: bool, verbose: bool, output_format: &str, batch_size: usize) -> Result<Self> {
        let output_format = output_format.parse::<OutputFormat>()?;
        if batch_size == 0 {
            return Err(Error::invalid_value(
                "batch_size",
                "must be a positive integer",
            ));
        }

        Ok(Self {
            debug,
            verbose,
            output_format,
            batch_size,
        })
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    /// Declared batch size. No stage consumes it yet.
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            debug: false,
            verbose: false,
            output_format: OutputFormat::default(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// Configuration for the weather API source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Forecast endpoint URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Latitude in decimal degrees
    #[serde(default = "default_latitude")]
    pub latitude: f64,

    /// Longitude in decimal degrees
    #[serde(default = "default_longitude")]
    pub longitude: f64,

    /// Hourly variable names, sent comma-joined
    #[serde(default = "default_hourly")]
    pub hourly: Vec<String>,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}

fn default_latitude() -> f64 {
    52.52
}

fn default_longitude() -> f64 {
    13.41
}

fn default_hourly() -> Vec<String> {
    DEFAULT_HOURLY.iter().map(ToString::to_string).collect()
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            latitude: default_latitude(),
            longitude: default_longitude(),
            hourly: default_hourly(),
        }
    }
}

impl SourceConfig {
    /// The configured coordinate pair
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// Hourly variables as the comma-joined query value
    pub fn hourly_param(&self) -> String {
        self.hourly.join(",")
    }

    /// Validate the endpoint and the variable list
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.endpoint)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(Error::invalid_value(
                "source.endpoint",
                format!("unsupported scheme '{}'", url.scheme()),
            ));
        }
        if self.hourly.iter().all(|v| v.trim().is_empty()) {
            return Err(Error::invalid_value(
                "source.hourly",
                "at least one hourly variable is required",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// File Sink Config
// ============================================================================

/// Configuration for the file sink
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSinkConfig {
    /// Output directory, created if absent
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// File name without extension
    #[serde(default = "default_filename")]
    pub filename: String,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

fn default_filename() -> String {
    "weather_data".to_string()
}

impl Default for FileSinkConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            filename: default_filename(),
        }
    }
}

impl FileSinkConfig {
    /// Full target path for a file format
    pub fn path_for(&self, format: OutputFormat) -> Result<PathBuf> {
        let extension = format.extension().ok_or_else(|| {
            Error::config(format!("Output format '{format}' does not write a file"))
        })?;
        Ok(self.dir.join(format!("{}.{extension}", self.filename)))
    }
}

// ============================================================================
// Database Config
// ============================================================================

/// Configuration for the relational sink
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Backend engine
    #[serde(default)]
    pub engine: DatabaseEngine,

    #[serde(default = "default_host")]
    pub host: String,

    /// Port (defaults to the engine's port)
    #[serde(default)]
    pub port: Option<u16>,

    /// Database name, or a file path for DuckDB
    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_user")]
    pub user: String,

    #[serde(default)]
    pub password: String,

    /// Target table
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_host() -> String {
    "localhost".to_string()
}

fn default_database() -> String {
    "weather".to_string()
}

fn default_user() -> String {
    "postgres".to_string()
}

fn default_table() -> String {
    "weather_data".to_string()
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            engine: DatabaseEngine::default(),
            host: default_host(),
            port: None,
            database: default_database(),
            user: default_user(),
            password: String::new(),
            table: default_table(),
        }
    }
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("engine", &self.engine)
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .field("user", &self.user)
            .field("password", &"****")
            .field("table", &self.table)
            .finish()
    }
}

impl DatabaseConfig {
    /// Local DuckDB file target
    pub fn duckdb(path: impl AsRef<Path>) -> Self {
        Self {
            engine: DatabaseEngine::Duckdb,
            database: path.as_ref().to_string_lossy().to_string(),
            ..Self::default()
        }
    }

    /// Effective port
    pub fn port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.engine.default_port())
    }

    /// Override fields from the process environment
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_lookup(|key| std::env::var(key).ok())
    }

    /// Override fields from a variable lookup function
    pub fn apply_lookup<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("POSTGRES_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("POSTGRES_PORT") {
            let port = port.trim().parse::<u16>().map_err(|e| {
                Error::invalid_value("POSTGRES_PORT", format!("'{port}' is not a port: {e}"))
            })?;
            self.port = Some(port);
        }
        if let Some(database) = lookup("POSTGRES_DB") {
            self.database = database;
        }
        if let Some(user) = lookup("POSTGRES_USER") {
            self.user = user;
        }
        if let Some(password) = lookup("POSTGRES_PASSWORD") {
            self.password = password;
        }
        if let Some(table) = lookup("POSTGRES_TABLE") {
            self.table = table;
        }
        Ok(())
    }

    /// Validate the table name. It is interpolated into DDL, so only plain
    /// identifiers are accepted.
    pub fn validate(&self) -> Result<()> {
        if !is_identifier(&self.table) {
            return Err(Error::invalid_value(
                "database.table",
                format!("'{}' is not a plain SQL identifier", self.table),
            ));
        }
        if self.database.trim().is_empty() {
            return Err(Error::invalid_value("database.database", "must not be empty"));
        }
        Ok(())
    }
}

/// `[A-Za-z_][A-Za-z0-9_]*`
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

// ============================================================================
// Settings
// ============================================================================

/// Per-stage settings, loadable from YAML
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub output: FileSinkConfig,

    #[serde(default)]
    pub database: DatabaseConfig,
}

impl Settings {
    /// Parse settings from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(yaml)?)
    }

    /// Load settings from a YAML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading settings from {}", path.display());
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!(
                "Failed to read settings file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_yaml(&content)
    }

    /// Validate every section
    pub fn validate(&self) -> Result<()> {
        self.source.validate()?;
        self.database.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::HashMap;

    #[test]
    fn test_pipeline_config_valid() {
        let config = PipelineConfig::new(true, false, "postgres", 64).unwrap();
        assert!(config.debug());
        assert!(!config.verbose());
        assert_eq!(config.output_format(), OutputFormat::Postgres);
        assert_eq!(config.batch_size(), 64);
    }

    #[test]
    fn test_pipeline_config_rejects_xml() {
        let err = PipelineConfig::new(false, false, "xml", 32).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "output_format"));
    }

    #[test]
    fn test_pipeline_config_rejects_zero_batch_size() {
        let err = PipelineConfig::new(false, false, "csv", 0).unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { ref field, .. } if field == "batch_size"));
    }

    #[test]
    fn test_pipeline_config_default() {
        let config = PipelineConfig::default();
        assert_eq!(config.output_format(), OutputFormat::Csv);
        assert_eq!(config.batch_size(), DEFAULT_BATCH_SIZE);
    }

    #[test]
    fn test_source_config_defaults() {
        let config = SourceConfig::default();
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.hourly_param(), "temperature_2m,relativehumidity_2m");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_source_config_invalid_endpoint() {
        let config = SourceConfig {
            endpoint: "not a url".to_string(),
            ..SourceConfig::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));

        let config = SourceConfig {
            endpoint: "ftp://example.com/forecast".to_string(),
            ..SourceConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_file_sink_path() {
        let config = FileSinkConfig {
            dir: PathBuf::from("/tmp/out"),
            filename: "obs".to_string(),
        };
        assert_eq!(
            config.path_for(OutputFormat::Csv).unwrap(),
            PathBuf::from("/tmp/out/obs.csv")
        );
        assert_eq!(
            config.path_for(OutputFormat::Json).unwrap(),
            PathBuf::from("/tmp/out/obs.json")
        );
        assert!(config.path_for(OutputFormat::Postgres).is_err());
    }

    #[test]
    fn test_database_config_env_overrides() {
        let vars: HashMap<&str, &str> = [
            ("POSTGRES_HOST", "db.internal"),
            ("POSTGRES_PORT", "6543"),
            ("POSTGRES_USER", "etl"),
            ("POSTGRES_PASSWORD", "secret"),
        ]
        .into_iter()
        .collect();

        let mut config = DatabaseConfig::default();
        config
            .apply_lookup(|key| vars.get(key).map(ToString::to_string))
            .unwrap();

        assert_eq!(config.host, "db.internal");
        assert_eq!(config.port(), 6543);
        assert_eq!(config.user, "etl");
        assert_eq!(config.password, "secret");
        assert_eq!(config.database, "weather");
        assert_eq!(config.table, "weather_data");
    }

    #[test]
    fn test_database_config_fallback_port() {
        let mut config = DatabaseConfig::default();
        config.apply_lookup(|_| None).unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port(), 5432);
    }

    #[test]
    fn test_database_config_bad_port() {
        let mut config = DatabaseConfig::default();
        let err = config
            .apply_lookup(|key| (key == "POSTGRES_PORT").then(|| "abc".to_string()))
            .unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_database_config_table_validation() {
        let mut config = DatabaseConfig::default();
        assert!(config.validate().is_ok());

        config.table = "weather; DROP TABLE x".to_string();
        assert!(config.validate().is_err());

        config.table = "1weather".to_string();
        assert!(config.validate().is_err());

        config.table = "_weather_2024".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_database_config_debug_masks_password() {
        let config = DatabaseConfig {
            password: "hunter2".to_string(),
            ..DatabaseConfig::default()
        };
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("****"));
    }

    #[test]
    fn test_settings_from_yaml() {
        let yaml = r"
source:
  latitude: -23.55
  longitude: -46.63
output:
  dir: data
database:
  engine: duckdb
  database: weather.duckdb
";
        let settings = Settings::from_yaml(yaml).unwrap();
        assert_eq!(settings.source.latitude, -23.55);
        assert_eq!(settings.source.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(settings.output.dir, PathBuf::from("data"));
        assert_eq!(settings.output.filename, "weather_data");
        assert_eq!(settings.database.engine, DatabaseEngine::Duckdb);
        assert_eq!(settings.database.port(), 0);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_settings_empty_yaml() {
        assert_eq!(Settings::from_yaml("").unwrap(), Settings::default());
    }

    #[test]
    fn test_settings_invalid_yaml() {
        let err = Settings::from_yaml("source: [unclosed").unwrap_err();
        assert!(matches!(err, Error::YamlParse(_)));
    }

    #[test]
    fn test_settings_missing_file() {
        let err = Settings::from_file("/definitely/not/here.yaml").unwrap_err();
        assert!(matches!(err, Error::Config { .. }));
    }
}
