//! StudyStore administration CLI.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

mod commands;
mod output;

use commands::Cli;
use studystore_core::config::AppConfig;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match AppConfig::load(&cli.config, &cli.env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("✗ Failed to load configuration: {e}");
            std::process::exit(2);
        }
    };
    init_logging(&config);

    if let Err(e) = cli.execute(&config).await {
        eprintln!("✗ {e}");
        std::process::exit(1);
    }
}

/// Install the global tracing subscriber from the `[logging]` section.
/// `RUST_LOG` takes precedence over the configured level.
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
