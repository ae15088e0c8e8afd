use clap::Parser;

use certcache::cli::{self, Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let settings = match cli::load_and_merge_config(&cli) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(e) = cli::init_logger_from_settings(&settings) {
        eprintln!("Logger initialization error: {e}");
        std::process::exit(1);
    }

    tracing::debug!(
        version = certcache::pkg_version(),
        backend = settings.cache.backend.as_str(),
        "starting"
    );

    if let Err(e) = cli::execute_command(&cli, settings).await {
        match &cli.command {
            Commands::Get { key, .. } if e.is_miss() => {
                eprintln!("certcache: no cache entry for '{key}'");
            }
            _ => eprintln!("Error: {e}"),
        }
        std::process::exit(e.exit_code());
    }
}
