//! Configuration schema types
//!
//! Every section has compiled-in defaults, so an empty (or absent)
//! configuration file yields a runnable configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Default configuration file looked up in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "tessera.toml";

/// Default project document
pub const DEFAULT_PROJECT_PATH: &str = "exporter.json";

/// Default root under which timestamped output directories are created
pub const DEFAULT_OUTPUT_BASE_DIR: &str = ".";

/// Default event log file
pub const DEFAULT_LOG_PATH: &str = "export_layers.log";

/// Default engine installation root
pub const DEFAULT_ENGINE_ROOT: &str = ".";

/// Main Tessera configuration
///
/// This is the root configuration structure that maps to the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TesseraConfig {
    /// Application-level settings
    #[serde(default)]
    pub application: ApplicationConfig,

    /// Project document to export
    #[serde(default)]
    pub project: ProjectConfig,

    /// Output location
    #[serde(default)]
    pub output: OutputConfig,

    /// GIS engine settings
    #[serde(default)]
    pub engine: EngineConfig,

    /// Export behaviour
    #[serde(default)]
    pub export: ExportConfig,

    /// Post-export verification
    #[serde(default)]
    pub verification: VerificationConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TesseraConfig {
    /// Validates the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid
    pub fn validate(&self) -> Result<(), String> {
        self.application.validate()?;
        self.project.validate()?;
        self.output.validate()?;
        self.engine.validate()?;
        self.logging.validate()?;
        Ok(())
    }
}

/// Application-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl ApplicationConfig {
    fn validate(&self) -> Result<(), String> {
        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.as_str()) {
            return Err(format!(
                "Invalid log_level '{}'. Must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

/// Project document configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Path of the project document
    #[serde(default = "default_project_path")]
    pub path: String,
}

impl ProjectConfig {
    fn validate(&self) -> Result<(), String> {
        if self.path.trim().is_empty() {
            return Err("project.path cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn path_buf(&self) -> PathBuf {
        PathBuf::from(&self.path)
    }
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            path: default_project_path(),
        }
    }
}

/// Output location configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Root under which `output_<timestamp>` directories are created
    #[serde(default = "default_output_base_dir")]
    pub base_dir: String,
}

impl OutputConfig {
    fn validate(&self) -> Result<(), String> {
        if self.base_dir.trim().is_empty() {
            return Err("output.base_dir cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn base_dir_buf(&self) -> PathBuf {
        PathBuf::from(&self.base_dir)
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            base_dir: default_output_base_dir(),
        }
    }
}

/// GIS engine configuration
///
/// Passed by reference to the engine when a session is opened.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Installation root of the geospatial runtime
    #[serde(default = "default_engine_root")]
    pub root: String,
}

impl EngineConfig {
    fn validate(&self) -> Result<(), String> {
        if self.root.trim().is_empty() {
            return Err("engine.root cannot be empty".to_string());
        }
        Ok(())
    }

    pub fn root_buf(&self) -> PathBuf {
        PathBuf::from(&self.root)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root: default_engine_root(),
        }
    }
}

/// What to do when two vector layers map to the same destination file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// Append `_2`, `_3`, ... to later layers
    #[default]
    Disambiguate,
    /// Later layers overwrite earlier ones
    Overwrite,
    /// Later layers fail with a name-collision error
    Error,
}

impl fmt::Display for CollisionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CollisionPolicy::Disambiguate => "disambiguate",
            CollisionPolicy::Overwrite => "overwrite",
            CollisionPolicy::Error => "error",
        };
        f.write_str(label)
    }
}

impl FromStr for CollisionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disambiguate" => Ok(CollisionPolicy::Disambiguate),
            "overwrite" => Ok(CollisionPolicy::Overwrite),
            "error" => Ok(CollisionPolicy::Error),
            other => Err(format!(
                "Invalid name collision policy '{other}'. Must be one of: disambiguate, overwrite, error"
            )),
        }
    }
}

/// Export settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Destination collision handling
    #[serde(default)]
    pub on_name_collision: CollisionPolicy,

    /// Plan the export without writing anything
    #[serde(default)]
    pub dry_run: bool,
}

/// Data verification configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct VerificationConfig {
    /// Re-read every exported layer and compare CRS and feature count
    #[serde(default)]
    pub enable_verification: bool,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Append-only event log file; empty disables file logging
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Event log line format (`text` or `json`)
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Mirror events to stderr
    #[serde(default = "default_true")]
    pub console_enabled: bool,
}

impl LoggingConfig {
    /// Console-only logging, used by commands that do not export
    pub fn console_only() -> Self {
        Self {
            path: String::new(),
            format: default_log_format(),
            console_enabled: true,
        }
    }

    /// Whether events are written to a log file
    pub fn file_enabled(&self) -> bool {
        !self.path.trim().is_empty()
    }

    fn validate(&self) -> Result<(), String> {
        let valid_formats = ["text", "json"];
        if !valid_formats.contains(&self.format.as_str()) {
            return Err(format!(
                "Invalid logging.format '{}'. Must be one of: {}",
                self.format,
                valid_formats.join(", ")
            ));
        }
        Ok(())
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            path: default_log_path(),
            format: default_log_format(),
            console_enabled: true,
        }
    }
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_project_path() -> String {
    DEFAULT_PROJECT_PATH.to_string()
}

fn default_output_base_dir() -> String {
    DEFAULT_OUTPUT_BASE_DIR.to_string()
}

fn default_engine_root() -> String {
    DEFAULT_ENGINE_ROOT.to_string()
}

fn default_log_path() -> String {
    DEFAULT_LOG_PATH.to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = TesseraConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.project.path, DEFAULT_PROJECT_PATH);
        assert_eq!(config.output.base_dir, DEFAULT_OUTPUT_BASE_DIR);
        assert_eq!(config.logging.path, DEFAULT_LOG_PATH);
        assert_eq!(config.engine.root, DEFAULT_ENGINE_ROOT);
        assert_eq!(config.export.on_name_collision, CollisionPolicy::Disambiguate);
        assert!(!config.export.dry_run);
        assert!(!config.verification.enable_verification);
    }

    #[test]
    fn test_empty_toml_uses_defaults() {
        let config: TesseraConfig = toml::from_str("").unwrap();
        assert_eq!(config.application.log_level, "info");
        assert_eq!(config.logging.format, "text");
        assert!(config.logging.console_enabled);
    }

    #[test]
    fn test_invalid_log_level() {
        let mut config = TesseraConfig::default();
        config.application.log_level = "verbose".to_string();
        let err = config.validate().unwrap_err();
        assert!(err.contains("Invalid log_level"));
    }

    #[test]
    fn test_invalid_log_format() {
        let mut config = TesseraConfig::default();
        config.logging.format = "xml".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_project_path_rejected() {
        let mut config = TesseraConfig::default();
        config.project.path = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_collision_policy_parsing() {
        assert_eq!(
            "overwrite".parse::<CollisionPolicy>().unwrap(),
            CollisionPolicy::Overwrite
        );
        assert_eq!(
            "Error".parse::<CollisionPolicy>().unwrap(),
            CollisionPolicy::Error
        );
        assert!("rename".parse::<CollisionPolicy>().is_err());
    }

    #[test]
    fn test_collision_policy_from_toml() {
        let config: TesseraConfig = toml::from_str(
            r#"
[export]
on_name_collision = "overwrite"
"#,
        )
        .unwrap();
        assert_eq!(config.export.on_name_collision, CollisionPolicy::Overwrite);
    }

    #[test]
    fn test_console_only_logging() {
        let config = LoggingConfig::console_only();
        assert!(!config.file_enabled());
        assert!(LoggingConfig::default().file_enabled());
    }
}
