//! Layers command implementation
//!
//! Lists the layers of the configured project without exporting anything.

use crate::adapters::engine::EngineSession;
use crate::adapters::native::NativeEngine;
use crate::config::TesseraConfig;
use crate::core::export::{file_stem, EXIT_FATAL, EXIT_SUCCESS};
use crate::core::project::load_project;
use crate::domain::{LayerKind, Project, TesseraError};
use crate::log_run_aborted;
use clap::Args;

/// Arguments for the layers command
#[derive(Args, Debug, Clone, Default)]
pub struct LayersArgs {
    /// Override the project document to inspect
    #[arg(short, long)]
    pub project: Option<String>,
}

impl LayersArgs {
    /// Execute the layers command
    pub fn execute(&self, mut config: TesseraConfig) -> anyhow::Result<i32> {
        if let Some(project) = &self.project {
            config.project.path = project.clone();
        }

        let mut engine = NativeEngine::new();
        let session = match EngineSession::open(&mut engine, &config.engine) {
            Ok(session) => session,
            Err(e) => {
                let error = TesseraError::EngineInit(e);
                log_run_aborted!(&error);
                eprintln!("{error}");
                return Ok(EXIT_FATAL);
            }
        };

        let loaded = load_project(&session, &config.project.path_buf());
        if let Err(e) = session.close() {
            tracing::warn!(error = %e, "Engine teardown failed");
        }

        match loaded {
            Ok(project) => {
                println!("{}", format_layers(&project));
                Ok(EXIT_SUCCESS)
            }
            Err(error) => {
                log_run_aborted!(&error);
                eprintln!("{error}");
                Ok(EXIT_FATAL)
            }
        }
    }
}

/// Renders the project's layers as a fixed-width table
fn format_layers(project: &Project) -> String {
    let mut lines = vec![format!(
        "Project: {} ({} layers, {} vector)",
        project.path().display(),
        project.layers().len(),
        project.count_of(LayerKind::Vector)
    )];

    if let Some(title) = &project.title {
        lines.push(format!("Title: {title}"));
    }

    lines.push(String::new());
    lines.push(format!(
        "{:<20} {:<24} {:<8} {:<12} {}",
        "ID", "NAME", "KIND", "CRS", "FILE"
    ));

    for layer in project.layers() {
        let file = if layer.is_vector() {
            format!("{}.shp", file_stem(&layer.name))
        } else {
            "-".to_string()
        };
        lines.push(format!(
            "{:<20} {:<24} {:<8} {:<12} {}",
            layer.id.as_str(),
            layer.name,
            layer.kind.to_string(),
            layer.crs_label(),
            file
        ));
    }

    lines.join("\n")
}
