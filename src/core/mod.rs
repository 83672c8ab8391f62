//! Core business logic for Tessera.
//!
//! # Modules
//!
//! - [`output`] - Timestamped output directory allocation
//! - [`project`] - Project loading through an open engine session
//! - [`export`] - Export pipeline, collision handling and run coordination
//! - [`verification`] - Post-export read-back with checksums
//!
//! # Export Workflow
//!
//! 1. **Open Session**: Initialize the GIS engine
//! 2. **Allocate**: Create `output_<timestamp>` under the base directory
//! 3. **Load Project**: Snapshot the project's layer collection
//! 4. **Export**: Write each vector layer to `<name>.shp`, keeping its CRS
//! 5. **Verify** (optional): Re-read every written layer
//! 6. **Close Session**: Release the engine
//!
//! # Example
//!
//! ```rust,no_run
//! use tessera::adapters::native::NativeEngine;
//! use tessera::config::load_config_or_default;
//! use tessera::core::export::ExportCoordinator;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config_or_default(None)?;
//! let mut engine = NativeEngine::new();
//!
//! let outcome = ExportCoordinator::new(config)
//!     .execute(&mut engine, chrono::Local::now().naive_local());
//!
//! if let Some(summary) = outcome.summary() {
//!     println!("Exported: {}", summary.exported);
//!     println!("Failed: {}", summary.failed);
//! }
//! std::process::exit(outcome.exit_code());
//! # }
//! ```

pub mod export;
pub mod output;
pub mod project;
pub mod verification;
