//! Output location allocation
//!
//! Every run writes into `base/output_<timestamp>`, the timestamp formatted
//! `YYYY-MM-DD_hh-mm-ss_AM|PM` on a 12-hour clock. Two runs in the same
//! second share a directory.

use crate::domain::{Result, TesseraError};
use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};

/// Prefix of every output directory name
pub const OUTPUT_DIR_PREFIX: &str = "output_";

/// chrono format of the timestamp part
pub const OUTPUT_TIMESTAMP_FORMAT: &str = "%Y-%m-%d_%I-%M-%S_%p";

/// Path of the output directory for a run started at `now`
///
/// Nothing is created on disk.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use std::path::Path;
/// use tessera::core::output::output_dir_path;
///
/// let now = NaiveDate::from_ymd_opt(2024, 7, 9)
///     .unwrap()
///     .and_hms_opt(15, 4, 5)
///     .unwrap();
/// assert_eq!(
///     output_dir_path(Path::new("exports"), now),
///     Path::new("exports/output_2024-07-09_03-04-05_PM")
/// );
/// ```
pub fn output_dir_path(base: &Path, now: NaiveDateTime) -> PathBuf {
    base.join(format!(
        "{OUTPUT_DIR_PREFIX}{}",
        now.format(OUTPUT_TIMESTAMP_FORMAT)
    ))
}

/// Creates the output directory for a run started at `now`
///
/// Missing ancestors are created. An existing directory is reused.
///
/// # Errors
///
/// Returns [`TesseraError::DirectoryCreation`] when storage denies creation
/// or the path exists but is not a directory.
pub fn allocate(base: &Path, now: NaiveDateTime) -> Result<PathBuf> {
    let path = output_dir_path(base, now);

    if path.exists() && !path.is_dir() {
        return Err(TesseraError::DirectoryCreation {
            path,
            reason: "path exists and is not a directory".to_string(),
        });
    }

    fs::create_dir_all(&path).map_err(|e| TesseraError::DirectoryCreation {
        path: path.clone(),
        reason: e.to_string(),
    })?;

    tracing::info!(path = %path.display(), "Created output directory");
    Ok(path)
}
