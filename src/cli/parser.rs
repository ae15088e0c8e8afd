//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;

use crate::build;
use crate::config::Environment;

/// Inspect and maintain a TLS certificate cache
#[derive(Parser, Debug)]
#[command(name = "certcache")]
#[command(about = "Inspect and maintain a TLS certificate cache")]
#[command(long_about = "
certcache reads, writes and removes entries of the certificate cache used by
an automatic certificate manager. Entries are opaque bytes (PEM certificates,
account keys) stored under string keys in the configured backend.

EXAMPLES:
    # Print the cached certificate for a domain
    certcache get example.com

    # Save it to a file instead
    certcache get example.com --output example.com.pem

    # Store a value read from a file, or from stdin
    certcache put example.com --file example.com.pem
    cat acme_account+key | certcache put acme_account+key

    # Remove an entry (succeeds when it is already gone)
    certcache delete example.com

    # Validate configuration and connect to the backend
    certcache --config /etc/certcache/production.toml check

EXIT STATUS:
    0 on success, 3 when `get` finds no entry, 1 on any other error.
")]
#[command(version = build::CLAP_LONG_VERSION)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration file path
    ///
    /// Load exactly this TOML file instead of the layered `config/` directory.
    /// `CERTCACHE_*` environment variables still override it.
    ///
    /// Example: --config /etc/certcache/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_config_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `{environment}.toml` layer is loaded.
    ///
    /// Available values: development (dev), test, staging (stage), production (prod)
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Deadline in seconds for the whole operation
    ///
    /// Without it the operation is bounded only by the per-request timeout
    /// of the backend.
    #[arg(short, long, value_name = "SECS", value_parser = super::validation::validate_timeout)]
    pub timeout: Option<u64>,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Write the cached value for KEY to stdout or a file
    Get {
        /// Cache key, e.g. a domain name
        #[arg(value_parser = super::validation::validate_key)]
        key: String,

        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Store a value under KEY, replacing any previous one
    Put {
        /// Cache key, e.g. a domain name
        #[arg(value_parser = super::validation::validate_key)]
        key: String,

        /// Read the value from this file instead of stdin
        #[arg(short, long, value_name = "FILE")]
        file: Option<PathBuf>,
    },
    /// Remove KEY from the cache
    Delete {
        /// Cache key, e.g. a domain name
        #[arg(value_parser = super::validation::validate_key)]
        key: String,
    },
    /// Validate configuration and construct the backend
    Check,
}

impl Cli {
    /// Operation deadline from `--timeout`
    pub fn deadline(&self) -> Option<Duration> {
        self.timeout.map(Duration::from_secs)
    }
}
