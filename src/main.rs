//! DocVault CLI entry point.
//!
//! Loads configuration, initializes logging, and runs one command against
//! a JSON-seeded document store.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use docvault_core::config::{AppConfig, LoggingConfig};

mod commands;
mod output;
mod workspace;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.env) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = cli.execute(config).await {
        output::print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

/// Initialize tracing. Logs go to stderr so JSON output stays parseable.
fn init_logging(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.is_json() {
        fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}
