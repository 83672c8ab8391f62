//! Project loading
//!
//! Loading goes through an open engine session; the returned [`Project`] is a
//! snapshot used for the rest of the run.

use crate::adapters::engine::EngineSession;
use crate::domain::{LayerKind, Project, Result, TesseraError};
use std::path::Path;

/// Loads the project document at `path`
///
/// # Errors
///
/// Returns [`TesseraError::ProjectLoad`] when the path does not exist, is
/// unreadable, or is not a valid project document.
pub fn load_project(session: &EngineSession<'_>, path: &Path) -> Result<Project> {
    if !path.exists() {
        return Err(TesseraError::ProjectLoad {
            path: path.to_path_buf(),
            reason: "file does not exist".to_string(),
        });
    }

    let project = session
        .engine()
        .read_project(path)
        .map_err(|e| TesseraError::ProjectLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

    tracing::info!(
        project = %path.display(),
        layers = project.layers().len(),
        vector_layers = project.count_of(LayerKind::Vector),
        "Project loaded"
    );

    Ok(project)
}
