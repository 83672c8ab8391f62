//! Verification logic for post-export validation
//!
//! Re-reads every exported layer through the engine and compares the CRS and
//! feature count with what the export reported.

use crate::adapters::engine::EngineSession;
use crate::core::export::summary::{ExportSummary, LayerOutcome};
use crate::core::verification::checksum::calculate_checksum_file;
use crate::core::verification::report::{FileChecksum, VerificationFailure, VerificationReport};
use crate::domain::CrsId;
use std::path::Path;
use std::time::Instant;

/// Verifier for post-export validation
pub struct Verifier<'s, 'e> {
    session: &'s EngineSession<'e>,
}

impl<'s, 'e> Verifier<'s, 'e> {
    /// Create a new verifier
    pub fn new(session: &'s EngineSession<'e>) -> Self {
        Self { session }
    }

    /// Verify the exported layers of `summary`
    ///
    /// Failures are reported, never returned as errors.
    pub fn verify_export(&self, summary: &ExportSummary) -> VerificationReport {
        let start = Instant::now();
        let mut report = VerificationReport::new();

        tracing::info!(
            exported = summary.exported,
            "Starting post-export verification"
        );

        for outcome in &summary.outcomes {
            let LayerOutcome::Exported {
                layer,
                crs,
                destination,
                features,
                ..
            } = outcome
            else {
                continue;
            };

            match self.verify_layer(crs.as_ref(), destination, *features) {
                Ok(()) => report.record_pass(),
                Err(reason) => {
                    tracing::warn!(
                        layer = %layer,
                        destination = %destination.display(),
                        reason = %reason,
                        "Verification failed"
                    );
                    report.record_failure(VerificationFailure {
                        layer: layer.clone(),
                        destination: destination.clone(),
                        reason,
                    });
                }
            }

            match calculate_checksum_file(destination) {
                Ok(sha256) => report.record_checksum(FileChecksum {
                    layer: layer.clone(),
                    path: destination.clone(),
                    sha256,
                }),
                Err(e) => tracing::debug!(
                    destination = %destination.display(),
                    error = %e,
                    "Checksum unavailable"
                ),
            }
        }

        report.set_duration(start.elapsed().as_millis() as u64);

        tracing::info!(
            passed = report.passed,
            failed = report.failed,
            duration_ms = report.duration_ms,
            "Verification completed"
        );

        report
    }

    fn verify_layer(
        &self,
        expected_crs: Option<&CrsId>,
        destination: &Path,
        expected_features: usize,
    ) -> Result<(), String> {
        let dataset = self
            .session
            .engine()
            .read_vector_file(destination, expected_crs)
            .map_err(|e| format!("cannot re-read exported file: {e}"))?;

        if dataset.crs.as_ref() != expected_crs {
            return Err(format!(
                "CRS mismatch: expected {}, found {}",
                crs_label(expected_crs),
                crs_label(dataset.crs.as_ref())
            ));
        }

        if dataset.feature_count() != expected_features {
            return Err(format!(
                "feature count mismatch: expected {}, found {}",
                expected_features,
                dataset.feature_count()
            ));
        }

        Ok(())
    }
}

fn crs_label(crs: Option<&CrsId>) -> &str {
    crs.map(CrsId::as_str).unwrap_or("unknown")
}
