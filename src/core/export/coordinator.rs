//! Export coordinator - main orchestrator for the export run
//!
//! Acquires the engine session, allocates the output directory, loads the
//! project, runs the layer pipeline and optional verification, and releases
//! the session on every path out.

use super::{EXIT_FATAL, EXIT_PARTIAL, EXIT_SUCCESS};
use crate::adapters::engine::{EngineSession, GisEngine};
use crate::config::TesseraConfig;
use crate::core::export::pipeline::LayerExportPipeline;
use crate::core::export::summary::ExportSummary;
use crate::core::verification::Verifier;
use crate::core::{output, project};
use crate::domain::{Result, TesseraError};
use crate::log_run_aborted;
use chrono::NaiveDateTime;
use std::time::Instant;

/// How a run ended
#[derive(Debug)]
pub enum RunOutcome {
    /// The pipeline ran; individual layers may still have failed
    Completed(ExportSummary),

    /// A fatal error stopped the run before or while loading the project
    Aborted(TesseraError),
}

impl RunOutcome {
    /// Process exit code for this outcome
    pub fn exit_code(&self) -> i32 {
        match self {
            RunOutcome::Completed(summary) if summary.is_successful() => EXIT_SUCCESS,
            RunOutcome::Completed(_) => EXIT_PARTIAL,
            RunOutcome::Aborted(_) => EXIT_FATAL,
        }
    }

    pub fn summary(&self) -> Option<&ExportSummary> {
        match self {
            RunOutcome::Completed(summary) => Some(summary),
            RunOutcome::Aborted(_) => None,
        }
    }
}

/// Export coordinator
pub struct ExportCoordinator {
    config: TesseraConfig,
}

impl ExportCoordinator {
    /// Create a new export coordinator
    pub fn new(config: TesseraConfig) -> Self {
        Self { config }
    }

    /// Execute the export
    ///
    /// This is the outermost run boundary. It:
    /// 1. Opens the engine session
    /// 2. Allocates `output_<timestamp>` under the configured base directory
    /// 3. Loads the project
    /// 4. Exports every vector layer
    /// 5. Verifies the written files (if enabled)
    /// 6. Closes the session
    ///
    /// Fatal errors are logged and returned as [`RunOutcome::Aborted`].
    pub fn execute(&self, engine: &mut dyn GisEngine, started_at: NaiveDateTime) -> RunOutcome {
        let start_time = Instant::now();

        tracing::info!(
            project = %self.config.project.path,
            output_base_dir = %self.config.output.base_dir,
            dry_run = self.config.export.dry_run,
            "Starting export process"
        );

        let session = match EngineSession::open(engine, &self.config.engine) {
            Ok(session) => session,
            Err(e) => return abort(TesseraError::EngineInit(e)),
        };

        let result = self.run(&session, started_at);

        if let Err(e) = session.close() {
            let error = TesseraError::EngineTeardown(e);
            tracing::warn!(kind = error.kind(), error = %error, "Engine teardown failed");
        }

        match result {
            Ok(summary) => {
                let summary = summary.with_duration(start_time.elapsed());
                summary.log_summary();
                RunOutcome::Completed(summary)
            }
            Err(e) => abort(e),
        }
    }

    fn run(&self, session: &EngineSession<'_>, started_at: NaiveDateTime) -> Result<ExportSummary> {
        let base_dir = self.config.output.base_dir_buf();
        let output_dir = if self.config.export.dry_run {
            output::output_dir_path(&base_dir, started_at)
        } else {
            output::allocate(&base_dir, started_at)?
        };

        let project = project::load_project(session, &self.config.project.path_buf())?;

        if project.is_empty() {
            tracing::info!(project = %project.path().display(), "Project has no layers");
        }

        let mut summary = LayerExportPipeline::new(
            session,
            output_dir,
            self.config.export.on_name_collision,
            self.config.export.dry_run,
        )
        .run(&project);

        if self.config.verification.enable_verification && !self.config.export.dry_run {
            let report = Verifier::new(session).verify_export(&summary);
            summary.set_verification_report(report);
        }

        Ok(summary)
    }
}

fn abort(error: TesseraError) -> RunOutcome {
    log_run_aborted!(&error);
    RunOutcome::Aborted(error)
}
