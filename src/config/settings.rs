//! Configuration settings structures for certcache
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use serde::{Deserialize, Serialize};

use crate::cache::firestore::{DEFAULT_COLLECTION, EMULATOR_HOST_ENV, ValueEncoding};
use crate::config::error::ConfigError;
use crate::logger::{LogFormat, LoggerConfig};

// ============================================================================
// Default value functions
// ============================================================================

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_format() -> String {
    "full".to_string()
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_collection() -> String {
    DEFAULT_COLLECTION.to_string()
}

fn default_endpoint() -> String {
    "https://firestore.googleapis.com".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Whether to use colored output when attached to a terminal
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            colored: default_true(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to the runtime LoggerConfig
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let format = self
            .format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::validation("logger.format".to_string(), e.to_string()))?;

        LoggerConfig::new(self.level, format, self.colored)
            .map_err(|e| ConfigError::validation("logger".to_string(), e.to_string()))
    }
}

// ============================================================================
// Cache Configuration
// ============================================================================

/// Cache backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum CacheBackend {
    #[default]
    Firestore,
    Memory,
}

impl CacheBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheBackend::Firestore => "firestore",
            CacheBackend::Memory => "memory",
        }
    }
}

/// Firestore cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirestoreConfig {
    /// Path to a service account JSON key file
    #[serde(default)]
    pub credentials_path: Option<String>,

    /// Google Cloud project id
    #[serde(default)]
    pub project_id: String,

    /// Firestore database id
    #[serde(default = "default_database")]
    pub database: String,

    /// Collection holding one document per cache key
    #[serde(default = "default_collection")]
    pub collection: String,

    /// Encoding of the stored `data` field
    #[serde(default)]
    pub encoding: ValueEncoding,

    /// Emulator `host:port`; when set, credentials are not used
    #[serde(default)]
    pub emulator_host: Option<String>,

    /// Firestore API endpoint
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request HTTP timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
}

impl FirestoreConfig {
    /// Configuration for `project_id` using the default collection.
    pub fn new(credentials_path: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            credentials_path: Some(credentials_path.into()),
            project_id: project_id.into(),
            ..Default::default()
        }
    }

    pub fn with_collection(mut self, collection: impl Into<String>) -> Self {
        self.collection = collection.into();
        self
    }

    /// Emulator `host:port` in effect: the `emulator_host` setting, or
    /// `FIRESTORE_EMULATOR_HOST` when the setting is absent or empty.
    pub fn resolved_emulator_host(&self) -> Option<String> {
        self.emulator_host
            .clone()
            .filter(|host| !host.is_empty())
            .or_else(|| std::env::var(EMULATOR_HOST_ENV).ok().filter(|host| !host.is_empty()))
    }

    /// Whether requests go to an emulator instead of Google.
    pub fn uses_emulator(&self) -> bool {
        self.resolved_emulator_host().is_some()
    }
}

impl Default for FirestoreConfig {
    fn default() -> Self {
        Self {
            credentials_path: None,
            project_id: String::new(),
            database: default_database(),
            collection: default_collection(),
            encoding: ValueEncoding::default(),
            emulator_host: None,
            endpoint: default_endpoint(),
            request_timeout: default_request_timeout(),
        }
    }
}

/// Cache configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct CacheConfig {
    /// Cache backend type
    #[serde(default)]
    pub backend: CacheBackend,

    /// Firestore cache settings
    #[serde(default)]
    pub firestore: FirestoreConfig,
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
///
/// This structure represents the entire configuration that can be loaded
/// from TOML files and environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Logger configuration
    #[serde(default)]
    pub logger: LoggerSettings,

    /// Cache configuration
    #[serde(default)]
    pub cache: CacheConfig,
}
