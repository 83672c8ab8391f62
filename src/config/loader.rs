//! Resolves the effective [`TesseraConfig`] for a run
//!
//! Settings come from three places, later ones winning:
//!
//! | Source | Example |
//! |--------|---------|
//! | compiled-in defaults | `project.path = "exporter.json"` |
//! | `tessera.toml`, with `${VAR}` placeholders expanded | `base_dir = "${GIS_EXPORTS}"` |
//! | `TESSERA_<SECTION>_<KEY>` variables | `TESSERA_EXPORT_DRY_RUN=true` |
//!
//! The merged result is validated before it is handed out.

use super::schema::{TesseraConfig, DEFAULT_CONFIG_FILE};
use crate::domain::errors::TesseraError;
use crate::domain::result::Result;
use regex::{Captures, Regex};
use std::fs;
use std::path::Path;
use std::str::FromStr;

const ENV_PREFIX: &str = "TESSERA_";
const PLACEHOLDER_PATTERN: &str = r"\$\{([A-Z_][A-Z0-9_]*)\}";

/// Reads, expands, overrides and validates the configuration file at `path`
///
/// # Errors
///
/// [`TesseraError::Configuration`] names the file that is missing or
/// unreadable, the TOML syntax error, every unset `${VAR}`, or the first
/// setting that fails validation.
///
/// # Examples
///
/// ```no_run
/// use tessera::config::loader::load_config;
///
/// let config = load_config("tessera.toml")?;
/// println!("exporting {}", config.project.path);
/// # Ok::<(), tessera::domain::TesseraError>(())
/// ```
pub fn load_config(path: impl AsRef<Path>) -> Result<TesseraConfig> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(config_error(format!(
            "Configuration file not found: {}",
            path.display()
        )));
    }

    let raw = fs::read_to_string(path)
        .map_err(|e| config_error(format!("Cannot read {}: {e}", path.display())))?;
    let expanded = expand_placeholders(&raw)?;
    let config = toml::from_str::<TesseraConfig>(&expanded)
        .map_err(|e| config_error(format!("Invalid TOML in {}: {e}", path.display())))?;

    finalize(config)
}

/// Resolves the effective configuration for a run
///
/// An explicit path must exist. Without one, `tessera.toml` in the working
/// directory is used when present, otherwise the compiled-in defaults.
/// Environment overrides and validation apply in every case.
///
/// # Errors
///
/// Returns an error if an explicit file is missing or the resulting
/// configuration is invalid.
pub fn load_config_or_default(path: Option<&str>) -> Result<TesseraConfig> {
    match path {
        Some(path) => load_config(path),
        None if Path::new(DEFAULT_CONFIG_FILE).is_file() => load_config(DEFAULT_CONFIG_FILE),
        None => finalize(TesseraConfig::default()),
    }
}

fn finalize(mut config: TesseraConfig) -> Result<TesseraConfig> {
    apply_env_overrides(&mut config)?;
    config
        .validate()
        .map_err(|e| config_error(format!("Configuration validation failed: {e}")))?;
    Ok(config)
}

fn config_error(message: String) -> TesseraError {
    TesseraError::Configuration(message)
}

/// Expands `${VAR}` from the process environment, leaving `#` comment lines alone
fn expand_placeholders(input: &str) -> Result<String> {
    let pattern = Regex::new(PLACEHOLDER_PATTERN)
        .map_err(|e| config_error(format!("Invalid placeholder pattern: {e}")))?;
    let mut unset: Vec<String> = Vec::new();

    let expanded: Vec<String> = input
        .lines()
        .map(|line| {
            if line.trim_start().starts_with('#') {
                return line.to_string();
            }
            pattern
                .replace_all(line, |caps: &Captures<'_>| {
                    let name = &caps[1];
                    std::env::var(name).unwrap_or_else(|_| {
                        if !unset.iter().any(|seen| seen == name) {
                            unset.push(name.to_string());
                        }
                        caps[0].to_string()
                    })
                })
                .into_owned()
        })
        .collect();

    if !unset.is_empty() {
        return Err(config_error(format!(
            "Missing required environment variables: {}",
            unset.join(", ")
        )));
    }

    let mut out = expanded.join("\n");
    out.push('\n');
    Ok(out)
}

/// Value of `TESSERA_<key>`, if set
fn env_override(key: &str) -> Option<String> {
    std::env::var(format!("{ENV_PREFIX}{key}")).ok()
}

/// Parses `TESSERA_<key>` into `T`; a malformed value is a configuration error
fn parsed_override<T: FromStr>(key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    env_override(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| config_error(format!("{ENV_PREFIX}{key}={raw}: {e}")))
        })
        .transpose()
}

fn apply_env_overrides(config: &mut TesseraConfig) -> Result<()> {
    if let Some(level) = env_override("APPLICATION_LOG_LEVEL") {
        config.application.log_level = level;
    }
    if let Some(path) = env_override("PROJECT_PATH") {
        config.project.path = path;
    }
    if let Some(dir) = env_override("OUTPUT_BASE_DIR") {
        config.output.base_dir = dir;
    }
    if let Some(root) = env_override("ENGINE_ROOT") {
        config.engine.root = root;
    }

    if let Some(policy) = env_override("EXPORT_ON_NAME_COLLISION") {
        config.export.on_name_collision = policy.parse().map_err(config_error)?;
    }
    if let Some(dry_run) = parsed_override("EXPORT_DRY_RUN")? {
        config.export.dry_run = dry_run;
    }
    if let Some(enabled) = parsed_override("VERIFICATION_ENABLE_VERIFICATION")? {
        config.verification.enable_verification = enabled;
    }

    if let Some(path) = env_override("LOGGING_PATH") {
        config.logging.path = path;
    }
    if let Some(format) = env_override("LOGGING_FORMAT") {
        config.logging.format = format;
    }
    if let Some(enabled) = parsed_override("LOGGING_CONSOLE_ENABLED")? {
        config.logging.console_enabled = enabled;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::CollisionPolicy;
    use std::io::Write;
    use std::sync::Mutex;
    use tempfile::NamedTempFile;

    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn config_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_placeholders_expanded() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("TESSERA_TEST_DATA_DIR", "/srv/gis");
        let result = expand_placeholders("path = \"${TESSERA_TEST_DATA_DIR}/exporter.json\"");
        std::env::remove_var("TESSERA_TEST_DATA_DIR");
        assert_eq!(result.unwrap(), "path = \"/srv/gis/exporter.json\"\n");
    }

    #[test]
    fn test_unset_placeholders_listed_once() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::remove_var("TESSERA_TEST_MISSING");
        let err = expand_placeholders(
            "a = \"${TESSERA_TEST_MISSING}\"\nb = \"${TESSERA_TEST_MISSING}\"",
        )
        .unwrap_err()
        .to_string();
        assert_eq!(err.matches("TESSERA_TEST_MISSING").count(), 1);
    }

    #[test]
    fn test_comment_lines_not_expanded() {
        let input = "# path = \"${NOT_SET_ANYWHERE}\"";
        assert_eq!(expand_placeholders(input).unwrap(), format!("{input}\n"));
    }

    #[test]
    fn test_missing_file() {
        let result = load_config("nonexistent-tessera.toml");
        assert!(matches!(result, Err(TesseraError::Configuration(_))));
    }

    #[test]
    fn test_all_sections_read() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let file = config_file(
            r#"
[application]
log_level = "debug"

[project]
path = "maps/city.json"

[output]
base_dir = "exports"

[engine]
root = "/opt/gis"

[export]
on_name_collision = "error"

[logging]
path = "logs/export_layers.log"
format = "json"
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.application.log_level, "debug");
        assert_eq!(config.project.path, "maps/city.json");
        assert_eq!(config.output.base_dir, "exports");
        assert_eq!(config.engine.root, "/opt/gis");
        assert_eq!(config.export.on_name_collision, CollisionPolicy::Error);
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_invalid_setting_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap();
        let file = config_file("[logging]\nformat = \"yaml\"\n");
        let err = load_config(file.path()).unwrap_err();
        assert!(err.to_string().contains("validation failed"));
    }

    #[test]
    fn test_overrides_applied_to_defaults() {
        let _guard = ENV_MUTEX.lock().unwrap();
        std::env::set_var("TESSERA_OUTPUT_BASE_DIR", "/tmp/exports");
        std::env::set_var("TESSERA_EXPORT_DRY_RUN", "true");

        let config = load_config_or_default(None);

        std::env::remove_var("TESSERA_OUTPUT_BASE_DIR");
        std::env::remove_var("TESSERA_EXPORT_DRY_RUN");

        let config = config.unwrap();
        assert_eq!(config.output.base_dir, "/tmp/exports");
        assert!(config.export.dry_run);
    }

    #[test]
    fn test_malformed_overrides_rejected() {
        let _guard = ENV_MUTEX.lock().unwrap();

        std::env::set_var("TESSERA_EXPORT_ON_NAME_COLLISION", "rename");
        let collision = load_config_or_default(None);
        std::env::remove_var("TESSERA_EXPORT_ON_NAME_COLLISION");
        assert!(matches!(collision, Err(TesseraError::Configuration(_))));

        std::env::set_var("TESSERA_EXPORT_DRY_RUN", "sometimes");
        let dry_run = load_config_or_default(None);
        std::env::remove_var("TESSERA_EXPORT_DRY_RUN");
        let err = dry_run.unwrap_err().to_string();
        assert!(err.contains("TESSERA_EXPORT_DRY_RUN=sometimes"));
    }
}
