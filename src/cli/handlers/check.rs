//! Check command handler
//!
//! Validates the configuration and constructs the configured backend, which
//! for Firestore includes loading credentials and obtaining a token.

use crate::cache::CacheManager;
use crate::config::settings::Settings;
use crate::error::AppResult;

/// Handler for the check command
pub struct CheckCommandHandler {
    config: Settings,
}

impl CheckCommandHandler {
    /// Create a new check command handler
    pub fn new(config: Settings) -> Self {
        Self { config }
    }

    /// Validate and connect, printing a short report to stdout
    ///
    /// # Errors
    /// - Configuration validation errors
    /// - Backend construction errors (credentials, token exchange)
    pub async fn execute(&self) -> AppResult<CacheManager> {
        self.config.validate()?;
        println!("✓ Configuration is valid");

        let manager = CacheManager::new(self.config.cache.clone()).await?;
        println!("✓ Backend ready: {}", self.describe());

        Ok(manager)
    }

    fn describe(&self) -> String {
        let cache = &self.config.cache;
        match cache.backend {
            crate::cache::CacheBackend::Memory => "memory".to_string(),
            crate::cache::CacheBackend::Firestore => format!(
                "firestore project={} database={} collection={} encoding={}",
                cache.firestore.project_id,
                cache.firestore.database,
                cache.firestore.collection,
                cache.firestore.encoding
            ),
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &Settings {
        &self.config
    }
}
