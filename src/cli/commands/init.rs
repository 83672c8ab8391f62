//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use crate::config::DEFAULT_CONFIG_FILE;
use crate::core::export::{EXIT_FATAL, EXIT_SUCCESS};
use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug, Clone)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("Configuration file already exists: {}", self.output);
            println!("  Use --force to overwrite");
            return Ok(EXIT_FATAL);
        }

        match fs::write(&self.output, Self::sample_config()) {
            Ok(()) => {
                println!("Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Point [project] path at your project document");
                println!("  2. Validate configuration: tessera validate-config");
                println!("  3. Run export: tessera export");
                Ok(EXIT_SUCCESS)
            }
            Err(e) => {
                println!("Failed to write configuration file");
                println!("  Error: {e}");
                Ok(EXIT_FATAL)
            }
        }
    }

    /// Sample configuration with every setting at its default
    fn sample_config() -> &'static str {
        r#"# Tessera Configuration File
# Batch export of project vector layers to ESRI Shapefiles
#
# Every setting is optional. Values may reference environment variables
# as ${VAR_NAME}, and TESSERA_<SECTION>_<KEY> variables override this file.

[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

[project]
# Project document listing the layers to export
path = "exporter.json"

[output]
# Each run writes to <base_dir>/output_<YYYY-MM-DD_hh-mm-ss_AM|PM>
base_dir = "."

[engine]
# Engine root directory; an optional crs.toml here adds CRS definitions
root = "."

[export]
# What to do when two layers map to the same file name:
# - disambiguate: write roads.shp, roads_2.shp, ...
# - overwrite: the later layer replaces the earlier one
# - error: the later layer fails without being written
on_name_collision = "disambiguate"

# Plan destinations without writing anything
dry_run = false

[verification]
# Re-read every exported layer and compare CRS and feature count
enable_verification = false

[logging]
# Append-only event log
path = "export_layers.log"

# Log file format: text or json
format = "text"

# Mirror events to stderr
console_enabled = true
"#
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TesseraConfig;
    use tempfile::TempDir;

    #[test]
    fn test_sample_config_is_loadable() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tessera.toml");
        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            force: false,
        };

        assert_eq!(args.execute().unwrap(), EXIT_SUCCESS);

        let config: TesseraConfig = toml::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(config.project.path, "exporter.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_refuses_to_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tessera.toml");
        fs::write(&path, "# mine").unwrap();

        let args = InitArgs {
            output: path.to_string_lossy().to_string(),
            force: false,
        };
        assert_eq!(args.execute().unwrap(), EXIT_FATAL);
        assert_eq!(fs::read_to_string(&path).unwrap(), "# mine");

        let args = InitArgs { force: true, ..args };
        assert_eq!(args.execute().unwrap(), EXIT_SUCCESS);
        assert!(fs::read_to_string(&path).unwrap().contains("[export]"));
    }
}
