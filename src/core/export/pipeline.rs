//! Layer export pipeline
//!
//! Walks the project's layers in order and hands every vector layer to the
//! engine's shapefile writer. One layer failing, or the engine panicking
//! mid-conversion, is recorded in the summary and the walk continues.

use crate::adapters::engine::EngineSession;
use crate::config::CollisionPolicy;
use crate::core::export::destination::DestinationPlanner;
use crate::core::export::job::ExportJob;
use crate::core::export::summary::{ExportSummary, LayerOutcome};
use crate::domain::{Layer, LayerExportError, Project};
use crate::{log_layer_exported, log_layer_failed};
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};

/// Exports every vector layer of a project into one output directory
pub struct LayerExportPipeline<'s, 'e> {
    session: &'s EngineSession<'e>,
    planner: DestinationPlanner,
    dry_run: bool,
}

impl<'s, 'e> LayerExportPipeline<'s, 'e> {
    pub fn new(
        session: &'s EngineSession<'e>,
        output_dir: impl Into<PathBuf>,
        policy: CollisionPolicy,
        dry_run: bool,
    ) -> Self {
        Self {
            session,
            planner: DestinationPlanner::new(output_dir, policy),
            dry_run,
        }
    }

    /// Runs the pipeline over `project`
    ///
    /// Never fails: per-layer errors end up in the returned summary.
    pub fn run(mut self, project: &Project) -> ExportSummary {
        let mut summary = ExportSummary::new(self.planner.output_dir());
        summary.dry_run = self.dry_run;

        tracing::info!(
            project = %project.path().display(),
            layers = project.layers().len(),
            output_dir = %self.planner.output_dir().display(),
            dry_run = self.dry_run,
            "Exporting vector layers"
        );

        for layer in project.layers() {
            let outcome = self.export_layer(layer);
            summary.record(outcome);
        }

        summary
    }

    fn export_layer(&mut self, layer: &Layer) -> LayerOutcome {
        let name = layer.name.clone();
        let crs = layer.crs.clone();

        if !layer.is_vector() {
            tracing::debug!(layer = %name, kind = %layer.kind, "Skipping non-vector layer");
            return LayerOutcome::Skipped {
                layer_id: layer.id.clone(),
                layer: name,
                kind: layer.kind,
            };
        }

        let destination = match self.planner.plan(&name) {
            Ok(destination) => destination,
            Err(error) => return failed(layer, error),
        };

        if self.dry_run {
            tracing::info!(
                layer = %name,
                crs = %layer.crs_label(),
                destination = %destination.display(),
                "Would export vector layer"
            );
            return LayerOutcome::Planned {
                layer_id: layer.id.clone(),
                layer: name,
                crs,
                destination,
            };
        }

        let job = ExportJob::for_layer(layer, destination);
        match self.write(&job) {
            Ok(features) => {
                self.planner.mark_written(&job.destination);
                log_layer_exported!(name, layer.crs_label(), job.destination, features);
                LayerOutcome::Exported {
                    layer_id: layer.id.clone(),
                    layer: name,
                    crs,
                    destination: job.destination,
                    features,
                }
            }
            Err(error) => {
                self.planner.release(&job.destination);
                failed(layer, error)
            }
        }
    }

    fn write(&self, job: &ExportJob<'_>) -> Result<usize, LayerExportError> {
        let engine = self.session.engine();
        let attempt = panic::catch_unwind(AssertUnwindSafe(|| {
            engine.write_vector_layer(job.layer, &job.destination, &job.options, &job.transform)
        }));

        match attempt {
            Ok(Ok(written)) => {
                tracing::debug!(
                    layer = %job.layer.name,
                    files = ?written.files,
                    "Writer finished"
                );
                Ok(written.features_written)
            }
            Ok(Err(error)) => Err(error.into()),
            Err(payload) => Err(LayerExportError::EngineFault(panic_message(
                payload.as_ref(),
                &job.destination,
            ))),
        }
    }
}

fn failed(layer: &Layer, error: LayerExportError) -> LayerOutcome {
    log_layer_failed!(layer.name, error);
    LayerOutcome::Failed {
        layer_id: layer.id.clone(),
        layer: layer.name.clone(),
        error,
    }
}

fn panic_message(payload: &(dyn Any + Send), destination: &Path) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    format!("writer panicked while writing {}: {detail}", destination.display())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_panic_message_from_str() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        let message = panic_message(payload.as_ref(), Path::new("out/roads.shp"));
        assert_eq!(message, "writer panicked while writing out/roads.shp: boom");
    }

    #[test]
    fn test_panic_message_from_string() {
        let payload: Box<dyn Any + Send> = Box::new(String::from("index out of bounds"));
        let message = panic_message(payload.as_ref(), Path::new("roads.shp"));
        assert!(message.ends_with("index out of bounds"));
    }

    #[test]
    fn test_panic_message_unknown_payload() {
        let payload: Box<dyn Any + Send> = Box::new(42u32);
        let message = panic_message(payload.as_ref(), Path::new("roads.shp"));
        assert!(message.ends_with("unknown panic"));
    }
}
