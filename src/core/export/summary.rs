//! Export summary and reporting
//!
//! This module defines structures for tracking and reporting export results.

use crate::core::verification::report::VerificationReport;
use crate::domain::{CrsId, LayerExportError, LayerId, LayerKind};
use std::path::PathBuf;
use std::time::Duration;

/// What happened to one layer of the project
#[derive(Debug, Clone)]
pub enum LayerOutcome {
    /// The layer was written to `destination`
    Exported {
        layer_id: LayerId,
        layer: String,
        crs: Option<CrsId>,
        destination: PathBuf,
        features: usize,
    },

    /// The conversion failed; the batch continued
    Failed {
        layer_id: LayerId,
        layer: String,
        error: LayerExportError,
    },

    /// The layer is not a vector layer
    Skipped {
        layer_id: LayerId,
        layer: String,
        kind: LayerKind,
    },

    /// Dry run: the layer would be written to `destination`
    Planned {
        layer_id: LayerId,
        layer: String,
        crs: Option<CrsId>,
        destination: PathBuf,
    },
}

impl LayerOutcome {
    /// Display name of the layer
    pub fn layer_name(&self) -> &str {
        match self {
            LayerOutcome::Exported { layer, .. }
            | LayerOutcome::Failed { layer, .. }
            | LayerOutcome::Skipped { layer, .. }
            | LayerOutcome::Planned { layer, .. } => layer,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, LayerOutcome::Failed { .. })
    }
}

/// Summary of an export run
#[derive(Debug, Clone)]
pub struct ExportSummary {
    /// Output directory of the run
    pub output_dir: PathBuf,

    /// Total number of layers in the project
    pub total_layers: usize,

    /// Number of layers written
    pub exported: usize,

    /// Number of vector layers whose conversion failed
    pub failed: usize,

    /// Number of non-vector layers skipped
    pub skipped: usize,

    /// Number of layers planned in a dry run
    pub planned: usize,

    /// Whether the run was a dry run
    pub dry_run: bool,

    /// Duration of the export
    pub duration: Duration,

    /// Per-layer outcomes in project order
    pub outcomes: Vec<LayerOutcome>,

    /// Verification report (if verification was run)
    pub verification_report: Option<VerificationReport>,
}

impl ExportSummary {
    /// Create a new empty export summary
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            total_layers: 0,
            exported: 0,
            failed: 0,
            skipped: 0,
            planned: 0,
            dry_run: false,
            duration: Duration::from_secs(0),
            outcomes: Vec::new(),
            verification_report: None,
        }
    }

    /// Set the duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Record the outcome of one layer
    pub fn record(&mut self, outcome: LayerOutcome) {
        self.total_layers += 1;
        match &outcome {
            LayerOutcome::Exported { .. } => self.exported += 1,
            LayerOutcome::Failed { .. } => self.failed += 1,
            LayerOutcome::Skipped { .. } => self.skipped += 1,
            LayerOutcome::Planned { .. } => self.planned += 1,
        }
        self.outcomes.push(outcome);
    }

    /// Number of vector layers the writer was asked to convert
    pub fn attempted(&self) -> usize {
        self.exported
            + self
                .failures()
                .filter(|(_, error)| !matches!(error, LayerExportError::NameCollision { .. }))
                .count()
    }

    /// Failed layers with their errors
    pub fn failures(&self) -> impl Iterator<Item = (&str, &LayerExportError)> {
        self.outcomes.iter().filter_map(|outcome| match outcome {
            LayerOutcome::Failed { layer, error, .. } => Some((layer.as_str(), error)),
            _ => None,
        })
    }

    /// Set the verification report
    pub fn set_verification_report(&mut self, report: VerificationReport) {
        self.verification_report = Some(report);
    }

    /// Check if the export was successful (no failed layers, verification passed)
    pub fn is_successful(&self) -> bool {
        self.failed == 0
            && self
                .verification_report
                .as_ref()
                .map_or(true, VerificationReport::is_success)
    }

    /// Get success rate over vector layers as a percentage
    pub fn success_rate(&self) -> f64 {
        let vector_layers = self.exported + self.failed;
        if vector_layers == 0 {
            return 100.0;
        }
        (self.exported as f64 / vector_layers as f64) * 100.0
    }

    /// Log the summary
    pub fn log_summary(&self) {
        tracing::info!(
            output_dir = %self.output_dir.display(),
            total_layers = self.total_layers,
            exported = self.exported,
            failed = self.failed,
            skipped = self.skipped,
            planned = self.planned,
            dry_run = self.dry_run,
            duration_ms = self.duration.as_millis() as u64,
            success_rate = format!("{:.2}%", self.success_rate()),
            "Export completed"
        );

        if self.failed > 0 {
            tracing::warn!(
                failed = self.failed,
                "Export completed with failed layers"
            );
        }
    }
}
