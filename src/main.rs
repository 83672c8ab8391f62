// Tessera - batch vector layer exporter
// Copyright (c) 2025 Tessera Contributors
// Licensed under the MIT License

use clap::Parser;
use std::process;
use tessera::cli::{Cli, Commands};
use tessera::config::{load_config_or_default, LoggingConfig, TesseraConfig};
use tessera::core::export::EXIT_FATAL;
use tessera::log_run_aborted;
use tessera::logging::{init_logging, LoggingGuard};

fn main() {
    // Load environment variables from .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let command = cli.requested_command();

    // init and validate-config must work without a loadable configuration
    let config = match &command {
        Commands::Init(_) | Commands::ValidateConfig(_) => None,
        Commands::Export(_) | Commands::Layers(_) => {
            match load_config_or_default(cli.config.as_deref()) {
                Ok(config) => Some(config),
                Err(e) => {
                    let _guard = start_logging(&cli, None, &LoggingConfig::console_only());
                    log_run_aborted!(&e);
                    eprintln!("Error: {e}");
                    process::exit(EXIT_FATAL);
                }
            }
        }
    };

    // Only an export run appends to the event log file
    let logging_config = match (&command, &config) {
        (Commands::Export(_), Some(config)) => config.logging.clone(),
        _ => LoggingConfig::console_only(),
    };
    let guard = start_logging(&cli, config.as_ref(), &logging_config);

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        "Tessera - batch vector layer exporter"
    );

    let exit_code = match execute_command(&cli, command, config) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "Command execution failed");
            eprintln!("Error: {e}");
            EXIT_FATAL
        }
    };

    // process::exit skips destructors; flush the file writer first
    drop(guard);
    process::exit(exit_code);
}

fn start_logging(
    cli: &Cli,
    config: Option<&TesseraConfig>,
    logging_config: &LoggingConfig,
) -> LoggingGuard {
    let log_level = cli
        .log_level
        .as_deref()
        .or_else(|| config.map(|c| c.application.log_level.as_str()))
        .unwrap_or("info");

    match init_logging(log_level, logging_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            process::exit(EXIT_FATAL);
        }
    }
}

/// Execute the CLI command
fn execute_command(
    cli: &Cli,
    command: Commands,
    config: Option<TesseraConfig>,
) -> anyhow::Result<i32> {
    match command {
        Commands::Export(args) => args.execute(config.unwrap_or_default()),
        Commands::Layers(args) => args.execute(config.unwrap_or_default()),
        Commands::ValidateConfig(args) => args.execute(cli.config.as_deref()),
        Commands::Init(args) => args.execute(),
    }
}
