//! Validate config command implementation
//!
//! This module implements the `validate-config` command, which loads the
//! configuration the same way `export` would and prints the effective result.

use crate::config::{load_config_or_default, DEFAULT_CONFIG_FILE};
use crate::core::export::{EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug, Clone, Default)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub fn execute(&self, config_path: Option<&str>) -> anyhow::Result<i32> {
        let shown_path = config_path.unwrap_or(DEFAULT_CONFIG_FILE);
        tracing::info!(config_path = %shown_path, "Validating configuration");

        println!("Validating configuration: {shown_path}");
        println!();

        let config = match load_config_or_default(config_path) {
            Ok(config) => config,
            Err(e) => {
                println!("Configuration is invalid");
                println!("  Error: {e}");
                return Ok(EXIT_FATAL);
            }
        };

        println!("Configuration is valid");
        println!();
        println!("Configuration Summary:");
        println!("  Project: {}", config.project.path);
        println!("  Output Base Directory: {}", config.output.base_dir);
        println!("  Engine Root: {}", config.engine.root);
        println!("  Log File: {}", config.logging.path);
        println!("  Log Level: {}", config.application.log_level);
        println!("  On Name Collision: {}", config.export.on_name_collision);
        println!("  Dry Run: {}", config.export.dry_run);
        println!("  Verification: {}", config.verification.enable_verification);
        println!();
        println!("Effective configuration:");
        println!("{}", toml::to_string_pretty(&config)?);

        Ok(EXIT_SUCCESS)
    }
}
