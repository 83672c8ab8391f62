//! Export orchestration
//!
//! This module provides the core export logic for Tessera, including:
//! - Destination planning and collision handling
//! - The per-layer export pipeline
//! - Run coordination and summary reporting

pub mod coordinator;
pub mod destination;
pub mod job;
pub mod pipeline;
pub mod summary;

pub use coordinator::{ExportCoordinator, RunOutcome};
pub use destination::{file_stem, DestinationPlanner};
pub use job::ExportJob;
pub use pipeline::LayerExportPipeline;
pub use summary::{ExportSummary, LayerOutcome};

/// Every vector layer was exported (or the project had none)
pub const EXIT_SUCCESS: i32 = 0;

/// The run aborted before the layer pipeline could finish
pub const EXIT_FATAL: i32 = 1;

/// At least one layer failed to export or failed verification
pub const EXIT_PARTIAL: i32 = 2;
