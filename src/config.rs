//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.
//!
//! The connection string has no built-in default: a process without one
//! refuses to start.

use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::source::{ConnectionPolicy, RetryPolicy, DEFAULT_MAX_ATTEMPTS};

/// Environment variable holding the connection string
pub const CONNECTION_STRING_ENV: &str = "MONGO_URI";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub refresh: RefreshConfig,

    #[serde(default)]
    pub table: TableConfig,

    #[serde(default)]
    pub charts: ChartsConfig,

    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Document store configuration
#[derive(Clone, Deserialize)]
pub struct SourceConfig {
    /// Connection string; usually supplied through `MONGO_URI`
    #[serde(default)]
    pub uri: Option<String>,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_collection")]
    pub collection: String,

    #[serde(default = "default_app_name")]
    pub app_name: String,

    #[serde(default)]
    pub connection: ConnectionPolicy,

    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    #[serde(default = "default_retry_delay")]
    pub retry_delay_ms: u64,

    /// Documents returned by the diagnostic endpoint
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,
}

fn default_database() -> String {
    "AnimatedFilms".to_string()
}

fn default_collection() -> String {
    "Films".to_string()
}

fn default_app_name() -> String {
    "filmboard".to_string()
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

fn default_retry_delay() -> u64 {
    1000 // 1 second, squared per attempt
}

fn default_sample_size() -> usize {
    1
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            uri: None,
            database: default_database(),
            collection: default_collection(),
            app_name: default_app_name(),
            connection: ConnectionPolicy::default(),
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay(),
            sample_size: default_sample_size(),
        }
    }
}

impl SourceConfig {
    /// The configured connection string, or an error if there is none
    pub fn connection_string(&self) -> Result<&str, ConfigError> {
        match self.uri.as_deref().map(str::trim) {
            Some(uri) if !uri.is_empty() => Ok(uri),
            _ => Err(ConfigError::MissingConnectionString),
        }
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.retry_delay_ms),
        )
    }
}

// Hand-written so the connection string never reaches a log line.
impl fmt::Debug for SourceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceConfig")
            .field("uri", &self.uri.as_deref().map(crate::source::redact_uri))
            .field("database", &self.database)
            .field("collection", &self.collection)
            .field("app_name", &self.app_name)
            .field("connection", &self.connection)
            .field("max_attempts", &self.max_attempts)
            .field("retry_delay_ms", &self.retry_delay_ms)
            .field("sample_size", &self.sample_size)
            .finish()
    }
}

/// Refresh scheduling configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    #[serde(default = "default_refresh_interval")]
    pub interval_secs: u64,

    /// Run a refresh cycle as soon as the scheduler starts
    #[serde(default = "default_on_start")]
    pub on_start: bool,
}

fn default_refresh_interval() -> u64 {
    7 * 24 * 3600 // weekly
}

fn default_on_start() -> bool {
    true
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_refresh_interval(),
            on_start: default_on_start(),
        }
    }
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Table materialization configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TableConfig {
    /// Identifier column, rendered as a string and never editable
    #[serde(default = "default_id_field")]
    pub id_field: String,
}

fn default_id_field() -> String {
    "_id".to_string()
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            id_field: default_id_field(),
        }
    }
}

/// Chart field projections
#[derive(Debug, Clone, Deserialize)]
pub struct ChartsConfig {
    #[serde(default = "default_scatter")]
    pub scatter: ChartFieldsConfig,

    #[serde(default = "default_histogram")]
    pub histogram: ChartFieldsConfig,
}

/// Fields and title of one chart
#[derive(Debug, Clone, Deserialize)]
pub struct ChartFieldsConfig {
    pub x: String,
    pub y: String,
    pub title: String,
}

fn default_scatter() -> ChartFieldsConfig {
    ChartFieldsConfig {
        x: "Title".to_string(),
        y: "Worldwide gross".to_string(),
        title: "Title vs Worldwide Gross".to_string(),
    }
}

fn default_histogram() -> ChartFieldsConfig {
    ChartFieldsConfig {
        x: "Year".to_string(),
        y: "Worldwide gross".to_string(),
        title: "Year vs Worldwide Gross".to_string(),
    }
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            scatter: default_scatter(),
            histogram: default_histogram(),
        }
    }
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default)]
    pub cors_origins: Vec<String>,

    #[serde(default = "default_enable_export")]
    pub enable_export: bool,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8050
}

fn default_enable_export() -> bool {
    true
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            enable_export: default_enable_export(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Self::parse(&content).map_err(|error| ConfigError::Parse {
            path: path.to_path_buf(),
            error,
        })
    }

    /// Parse configuration from TOML text
    pub fn parse(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from an explicit path, default locations, or the environment.
    ///
    /// An explicit path that fails to load is an error; default locations
    /// that fail are skipped with a warning.
    pub fn load_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load_with_env(path);
        }

        let config_paths = [
            dirs::config_dir().map(|p| p.join("filmboard").join("config.toml")),
            Some(PathBuf::from("/etc/filmboard/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return Ok(config);
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Ok(Self::from_env())
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from an arbitrary key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // Source overrides
        if let Some(uri) = lookup(CONNECTION_STRING_ENV) {
            self.source.uri = Some(uri);
        }
        if let Some(database) = lookup("FILMBOARD_DATABASE") {
            self.source.database = database;
        }
        if let Some(collection) = lookup("FILMBOARD_COLLECTION") {
            self.source.collection = collection;
        }
        if let Some(policy) = lookup("FILMBOARD_CONNECTION") {
            match policy.to_lowercase().as_str() {
                "shared" => self.source.connection = ConnectionPolicy::Shared,
                "per_refresh" | "per-refresh" => {
                    self.source.connection = ConnectionPolicy::PerRefresh
                }
                other => tracing::warn!("Ignoring unknown FILMBOARD_CONNECTION value {:?}", other),
            }
        }
        if let Some(attempts) = lookup("FILMBOARD_MAX_ATTEMPTS").and_then(|s| s.parse().ok()) {
            self.source.max_attempts = attempts;
        }

        // Refresh overrides
        if let Some(secs) = lookup("FILMBOARD_REFRESH_INTERVAL_SECS").and_then(|s| s.parse().ok())
        {
            self.refresh.interval_secs = secs;
        }

        // API overrides
        if let Some(host) = lookup("FILMBOARD_API_HOST") {
            self.api.host = host;
        }
        if let Some(port) = lookup("FILMBOARD_API_PORT").and_then(|s| s.parse().ok()) {
            self.api.port = port;
        }

        // Logging overrides
        if let Some(level) = lookup("FILMBOARD_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("FILMBOARD_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Check invariants that do not depend on the data source being used
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.max_attempts == 0 {
            return Err(ConfigError::Invalid(
                "source.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.refresh.interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "refresh.interval_secs must be at least 1".to_string(),
            ));
        }
        if self.table.id_field.is_empty() {
            return Err(ConfigError::Invalid(
                "table.id_field must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("No connection string configured; set {} or source.uri", CONNECTION_STRING_ENV)]
    MissingConnectionString,

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Filmboard Configuration
#
# Environment variables override these settings:
# - MONGO_URI (required unless source.uri is set)
# - FILMBOARD_DATABASE
# - FILMBOARD_COLLECTION
# - FILMBOARD_CONNECTION
# - FILMBOARD_MAX_ATTEMPTS
# - FILMBOARD_REFRESH_INTERVAL_SECS
# - FILMBOARD_API_HOST
# - FILMBOARD_API_PORT
# - FILMBOARD_LOG_LEVEL
# - FILMBOARD_LOG_FORMAT

[source]
# Connection string. Prefer MONGO_URI so credentials stay out of files.
# uri = "mongodb://localhost:27017"

database = "AnimatedFilms"
collection = "Films"

# "shared" reuses one client for the life of the process,
# "per_refresh" opens a fresh client for every fetch
connection = "shared"

# Attempts per fetch before giving up, and the base backoff (squared per attempt)
max_attempts = 3
retry_delay_ms = 1000

# Documents returned by /test-connection
sample_size = 1

[refresh]
# Weekly
interval_secs = 604800
on_start = true

[table]
# Identifier column; rendered as text and never editable
id_field = "_id"

[charts.scatter]
x = "Title"
y = "Worldwide gross"
title = "Title vs Worldwide Gross"

[charts.histogram]
x = "Year"
y = "Worldwide gross"
title = "Year vs Worldwide Gross"

[api]
host = "0.0.0.0"
port = 8050
cors_origins = []
enable_export = true

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
