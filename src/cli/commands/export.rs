//! Export command implementation
//!
//! This module implements the `export` command, which writes every vector
//! layer of the configured project to a shapefile.

use crate::adapters::native::NativeEngine;
use crate::config::TesseraConfig;
use crate::core::export::{ExportCoordinator, ExportSummary, LayerOutcome, RunOutcome};
use clap::Args;

/// Maximum number of failures listed in the printed summary
const MAX_LISTED_FAILURES: usize = 10;

/// Arguments for the export command
#[derive(Args, Debug, Clone, Default)]
pub struct ExportArgs {
    /// Override the project document to export
    #[arg(short, long)]
    pub project: Option<String>,

    /// Override the directory the timestamped output directory is created in
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// Dry run mode - plan destinations without writing any file
    #[arg(long)]
    pub dry_run: bool,

    /// Re-read every exported layer and compare CRS and feature count
    #[arg(long)]
    pub verify: bool,
}

impl ExportArgs {
    /// Apply CLI overrides on top of the loaded configuration
    pub fn apply_overrides(&self, config: &mut TesseraConfig) {
        if let Some(project) = &self.project {
            tracing::info!(project = %project, "Overriding project path from CLI");
            config.project.path = project.clone();
        }

        if let Some(output_dir) = &self.output_dir {
            tracing::info!(output_dir = %output_dir, "Overriding output base directory from CLI");
            config.output.base_dir = output_dir.clone();
        }

        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.export.dry_run = true;
        }

        if self.verify {
            tracing::info!("Enabling verification from CLI");
            config.verification.enable_verification = true;
        }
    }

    /// Execute the export command
    pub fn execute(&self, mut config: TesseraConfig) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        self.apply_overrides(&mut config);

        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(crate::core::export::EXIT_FATAL);
        }

        if config.export.dry_run {
            tracing::info!("Dry run mode enabled - no files will be written");
            println!("DRY RUN MODE - no files will be written");
            println!();
        }

        let mut engine = NativeEngine::new();
        let coordinator = ExportCoordinator::new(config);
        let outcome = coordinator.execute(&mut engine, chrono::Local::now().naive_local());

        match &outcome {
            RunOutcome::Completed(summary) => print_summary(summary),
            RunOutcome::Aborted(error) => {
                eprintln!("Export aborted: {error}");
            }
        }

        Ok(outcome.exit_code())
    }
}

fn print_summary(summary: &ExportSummary) {
    println!();
    println!("Export Summary:");
    println!("  Output Directory: {}", summary.output_dir.display());
    println!("  Total Layers: {}", summary.total_layers);
    if summary.dry_run {
        println!("  Planned: {}", summary.planned);
    } else {
        println!("  Exported: {}", summary.exported);
    }
    println!("  Failed: {}", summary.failed);
    println!("  Skipped (non-vector): {}", summary.skipped);
    println!("  Duration: {:.2}s", summary.duration.as_secs_f64());
    println!("  Success Rate: {:.2}%", summary.success_rate());
    println!();

    if summary.dry_run {
        for outcome in &summary.outcomes {
            if let LayerOutcome::Planned {
                layer, destination, ..
            } = outcome
            {
                println!("  {} -> {}", layer, destination.display());
            }
        }
        println!();
    }

    if summary.failed > 0 {
        println!("Failed layers:");
        for (layer, error) in summary.failures().take(MAX_LISTED_FAILURES) {
            println!("  - {layer}: {error}");
        }
        if summary.failed > MAX_LISTED_FAILURES {
            println!("  ... and {} more", summary.failed - MAX_LISTED_FAILURES);
        }
        println!();
    }

    if let Some(report) = &summary.verification_report {
        println!("{}", report.format_summary());
        println!();
    }

    if summary.is_successful() {
        println!("Export completed successfully");
    } else {
        println!("Export completed with failures");
    }
}
