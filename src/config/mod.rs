//! Configuration management for Tessera.
//!
//! # Overview
//!
//! Tessera uses an optional TOML configuration file with support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `TESSERA_<SECTION>_<KEY>` environment overrides
//! - Compiled-in defaults for every setting
//! - Validation on load
//!
//! Running without any configuration file exports `exporter.json` from the
//! working directory into `./output_<timestamp>` and logs to
//! `export_layers.log`.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use tessera::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("tessera.toml")?;
//!
//! println!("Project: {}", config.project.path);
//! println!("Output root: {}", config.output.base_dir);
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration Structure
//!
//! - [`ApplicationConfig`] - log level
//! - [`ProjectConfig`] - project document path
//! - [`OutputConfig`] - output base directory
//! - [`EngineConfig`] - GIS engine root
//! - [`ExportConfig`] - collision policy, dry run
//! - [`VerificationConfig`] - post-export verification
//! - [`LoggingConfig`] - event log path, format, console mirroring
//!
//! # Example Configuration
//!
//! ```toml
//! [project]
//! path = "${GIS_DATA}/city/exporter.json"
//!
//! [output]
//! base_dir = "/srv/exports"
//!
//! [engine]
//! root = "/opt/tessera"
//!
//! [export]
//! on_name_collision = "disambiguate"
//! ```

pub mod loader;
pub mod schema;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, CollisionPolicy, EngineConfig, ExportConfig, LoggingConfig, OutputConfig,
    ProjectConfig, TesseraConfig, VerificationConfig, DEFAULT_CONFIG_FILE,
};
