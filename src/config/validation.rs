//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use crate::config::error::ConfigError;
use crate::config::settings::{CacheBackend, CacheConfig, FirestoreConfig, LoggerSettings, Settings};

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

impl LoggerSettings {
    /// Validate logger configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl FirestoreConfig {
    /// Validate Firestore configuration
    ///
    /// # Validation Rules
    /// - Project id must not be empty
    /// - Credentials path is required unless an emulator host is in effect
    /// - Collection must be non-empty and must not contain '/'
    /// - Database id must not be empty
    /// - Request timeout must be greater than 0
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::validation(
                "cache.firestore.project_id",
                "Project id is required for the Firestore backend.",
            ));
        }

        let has_credentials = self
            .credentials_path
            .as_deref()
            .is_some_and(|p| !p.trim().is_empty());
        if !has_credentials && !self.uses_emulator() {
            return Err(ConfigError::validation(
                "cache.firestore.credentials_path",
                "A service account key file is required unless emulator_host or FIRESTORE_EMULATOR_HOST is set.",
            ));
        }

        if self.collection.is_empty() || self.collection.contains('/') {
            return Err(ConfigError::ValidationError {
                field: "cache.firestore.collection".to_string(),
                message: format!(
                    "Collection name '{}' must be non-empty and must not contain '/'.",
                    self.collection
                ),
            });
        }

        if self.database.is_empty() {
            return Err(ConfigError::validation(
                "cache.firestore.database",
                "Database id must not be empty.",
            ));
        }

        if self.request_timeout == 0 {
            return Err(ConfigError::validation(
                "cache.firestore.request_timeout",
                "Request timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl CacheConfig {
    /// Validate the settings of the selected backend only
    pub fn validate(&self) -> Result<(), ConfigError> {
        match self.backend {
            CacheBackend::Firestore => self.firestore.validate(),
            CacheBackend::Memory => Ok(()),
        }
    }
}

impl Settings {
    /// Validate all configuration sections
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logger.validate()?;
        self.cache.validate()?;
        Ok(())
    }
}
