//! Configuration merger for CLI arguments and config files
//!
//! This module handles merging CLI argument overrides with file-based configuration,
//! implementing the configuration precedence logic.

use std::path::Path;

use super::parser::Cli;
use crate::config::error::ConfigError;
use crate::config::{ConfigLoader, Environment, settings::Settings};

/// Applies CLI overrides on top of file-based settings
pub struct ConfigurationMerger {
    base_config: Settings,
}

impl ConfigurationMerger {
    /// Create a new configuration merger with base configuration
    pub fn new(base_config: Settings) -> Self {
        Self { base_config }
    }

    /// Load the base configuration, either from a single file or from the
    /// layered `config/` directory
    ///
    /// # Errors
    /// Returns ConfigError if loading or parsing fails
    pub fn load(config_path: Option<&Path>, env: Option<Environment>) -> Result<Self, ConfigError> {
        let loader = match config_path {
            Some(path) => ConfigLoader::with_file(path),
            None => ConfigLoader::new()?,
        };
        let loader = match env {
            Some(env) => loader.with_environment(env),
            None => loader,
        };

        Ok(Self::new(loader.load()?))
    }

    /// Merge CLI arguments with the base configuration and validate the result
    ///
    /// `--verbose` and `--quiet` replace the configured log level.
    pub fn merge_cli_args(&self, cli: &Cli) -> Result<Settings, ConfigError> {
        let mut config = self.base_config.clone();

        if cli.verbose {
            config.logger.level = "debug".to_string();
        } else if cli.quiet {
            config.logger.level = "error".to_string();
        }

        config.validate()?;

        Ok(config)
    }

    /// Get the current configuration (useful for inspection)
    pub fn config(&self) -> &Settings {
        &self.base_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::settings::CacheBackend;
    use clap::Parser;

    fn memory_config() -> Settings {
        let mut config = Settings::default();
        config.cache.backend = CacheBackend::Memory;
        config
    }

    #[test]
    fn test_configuration_merger_new() {
        let base_config = memory_config();
        let merger = ConfigurationMerger::new(base_config.clone());
        assert_eq!(merger.config(), &base_config);
    }

    #[test]
    fn test_merge_verbose_flag() {
        let merger = ConfigurationMerger::new(memory_config());
        let cli = Cli::try_parse_from(["certcache", "--verbose", "check"]).unwrap();
        assert_eq!(merger.merge_cli_args(&cli).unwrap().logger.level, "debug");
    }

    #[test]
    fn test_merge_quiet_flag() {
        let merger = ConfigurationMerger::new(memory_config());
        let cli = Cli::try_parse_from(["certcache", "--quiet", "check"]).unwrap();
        assert_eq!(merger.merge_cli_args(&cli).unwrap().logger.level, "error");
    }

    #[test]
    fn test_merge_validates() {
        // Firestore without a project id
        let merger = ConfigurationMerger::new(Settings::default());
        let cli = Cli::try_parse_from(["certcache", "check"]).unwrap();
        let err = merger.merge_cli_args(&cli).unwrap_err();
        assert_eq!(err.field(), Some("cache.firestore.project_id"));
    }

    #[test]
    fn test_load_single_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("certcache.toml");
        std::fs::write(
            &path,
            "[logger]\nformat = \"json\"\n\n[cache]\nbackend = \"memory\"\n",
        )
        .unwrap();

        let merger = ConfigurationMerger::load(Some(path.as_path()), Some(Environment::Test)).unwrap();
        assert_eq!(merger.config().cache.backend, CacheBackend::Memory);
        assert_eq!(merger.config().logger.format, "json");
    }
}
