//! Destination planning
//!
//! Maps layer names to `.shp` paths inside the output directory and applies
//! the configured collision policy. Collisions are detected case-insensitively
//! so that `Roads` and `roads` never share a file on case-insensitive storage.
//!
//! A planned destination stays claimed until its write fails; a layer that
//! never produced a file does not reserve the name.

use crate::config::CollisionPolicy;
use crate::domain::LayerExportError;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

const RESERVED: &[char] = &['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
const FALLBACK_STEM: &str = "layer";

/// Turns a layer name into a file stem that stays inside the output directory
///
/// # Examples
///
/// ```
/// use tessera::core::export::destination::file_stem;
///
/// assert_eq!(file_stem("roads"), "roads");
/// assert_eq!(file_stem("../etc/passwd"), ".._etc_passwd");
/// assert_eq!(file_stem(".."), "layer");
/// ```
pub fn file_stem(name: &str) -> String {
    let stem: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_control() || RESERVED.contains(&c) {
                '_'
            } else {
                c
            }
        })
        .collect();

    match stem.as_str() {
        "" | "." | ".." => FALLBACK_STEM.to_string(),
        _ => stem,
    }
}

/// Assigns destinations for one run
#[derive(Debug)]
pub struct DestinationPlanner {
    output_dir: PathBuf,
    policy: CollisionPolicy,
    claimed: HashMap<String, String>,
    written: HashSet<String>,
}

impl DestinationPlanner {
    pub fn new(output_dir: impl Into<PathBuf>, policy: CollisionPolicy) -> Self {
        Self {
            output_dir: output_dir.into(),
            policy,
            claimed: HashMap::new(),
            written: HashSet::new(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Destination for the layer called `layer_name`
    ///
    /// # Errors
    ///
    /// Returns [`LayerExportError::NameCollision`] under
    /// [`CollisionPolicy::Error`] when an earlier layer claimed the file.
    pub fn plan(&mut self, layer_name: &str) -> Result<PathBuf, LayerExportError> {
        let stem = file_stem(layer_name);

        let chosen = match self.claimed.get(&stem.to_lowercase()) {
            None => stem,
            Some(claimed_by) => match self.policy {
                CollisionPolicy::Overwrite => {
                    tracing::warn!(
                        layer = %layer_name,
                        claimed_by = %claimed_by,
                        stem = %stem,
                        "Destination already written in this run; overwriting"
                    );
                    stem
                }
                CollisionPolicy::Error => {
                    return Err(LayerExportError::NameCollision {
                        destination: self.path_for(&stem),
                        claimed_by: claimed_by.clone(),
                    });
                }
                CollisionPolicy::Disambiguate => {
                    let unique = self.next_free(&stem);
                    tracing::debug!(
                        layer = %layer_name,
                        stem = %unique,
                        "Destination renamed to avoid collision"
                    );
                    unique
                }
            },
        };

        self.claimed
            .entry(chosen.to_lowercase())
            .or_insert_with(|| layer_name.to_string());
        Ok(self.path_for(&chosen))
    }

    /// Records that a file now exists at `destination`
    pub fn mark_written(&mut self, destination: &Path) {
        if let Some(key) = claim_key(destination) {
            self.written.insert(key);
        }
    }

    /// Gives back the claim on `destination` after a failed write
    ///
    /// Has no effect once an earlier layer wrote the same file.
    pub fn release(&mut self, destination: &Path) {
        if let Some(key) = claim_key(destination) {
            if !self.written.contains(&key) && self.claimed.remove(&key).is_some() {
                tracing::debug!(
                    destination = %destination.display(),
                    "Destination released after failed write"
                );
            }
        }
    }

    fn next_free(&self, stem: &str) -> String {
        (2usize..)
            .map(|n| format!("{stem}_{n}"))
            .find(|candidate| !self.claimed.contains_key(&candidate.to_lowercase()))
            .unwrap_or_else(|| stem.to_string())
    }

    fn path_for(&self, stem: &str) -> PathBuf {
        self.output_dir.join(format!("{stem}.shp"))
    }
}

fn claim_key(destination: &Path) -> Option<String> {
    destination
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_lowercase())
}
