//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use super::handlers::{CheckCommandHandler, EntryCommandHandler};
use super::parser::{Cli, Commands};
use crate::cache::CacheManager;
use crate::config::settings::Settings;
use crate::error::AppResult;

/// Execute a CLI command with the given settings
///
/// Backend construction happens here for every command; a failure to
/// construct is returned before any cache operation is attempted.
///
/// # Errors
/// Returns errors from backend construction or the command handlers. A `get`
/// of an absent key yields an error for which `AppError::is_miss` holds.
pub async fn execute_command(cli: &Cli, settings: Settings) -> AppResult<()> {
    let handler = match &cli.command {
        Commands::Check => {
            CheckCommandHandler::new(settings).execute().await?;
            return Ok(());
        }
        _ => EntryCommandHandler::new(CacheManager::new(settings.cache).await?, cli.deadline()),
    };

    match &cli.command {
        Commands::Get { key, output } => handler.get(key, output.as_deref()).await,
        Commands::Put { key, file } => handler.put(key, file.as_deref()).await,
        Commands::Delete { key } => handler.delete(key).await,
        Commands::Check => Ok(()),
    }
}
