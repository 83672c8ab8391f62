//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Tessera using clap.
//! Running `tessera` without a subcommand performs an export.

pub mod commands;

use clap::{Parser, Subcommand};

/// Tessera - batch vector layer exporter
#[derive(Parser, Debug)]
#[command(name = "tessera")]
#[command(version, about, long_about = None)]
#[command(author = "Tessera Contributors")]
pub struct Cli {
    /// Path to configuration file (defaults to tessera.toml when present)
    #[arg(short, long, env = "TESSERA_CONFIG")]
    pub config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "TESSERA_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The requested command, `export` when none was given
    pub fn requested_command(&self) -> Commands {
        self.command.clone().unwrap_or_default()
    }
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Export every vector layer of the project to shapefiles
    Export(commands::export::ExportArgs),

    /// Validate configuration and print the effective settings
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),

    /// List the layers of the project
    Layers(commands::layers::LayersArgs),
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Export(commands::export::ExportArgs::default())
    }
}
