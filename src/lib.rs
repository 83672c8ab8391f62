// Tessera - batch vector layer exporter
// Copyright (c) 2025 Tessera Contributors
// Licensed under the MIT License

//! # Tessera - batch vector layer exporter
//!
//! Tessera opens a project document, finds every vector layer in it and writes
//! each one to an ESRI Shapefile in a fresh timestamped output directory,
//! keeping the layer's coordinate reference system.
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Loading** project documents and their layer collections
//! - **Converting** vector layers to shapefiles (`.shp`, `.shx`, `.dbf`,
//!   `.cpg`, `.prj`)
//! - **Isolating** per-layer failures so one bad layer never stops a batch
//! - **Verifying** exported files by reading them back
//!
//! ## Architecture
//!
//! Tessera follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (output allocation, export pipeline, verification)
//! - [`adapters`] - GIS engine abstraction and the native shapefile engine
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and the event log
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tessera::adapters::native::NativeEngine;
//! use tessera::config::load_config_or_default;
//! use tessera::core::export::ExportCoordinator;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default(Some("tessera.toml"))?;
//!     let mut engine = NativeEngine::new();
//!
//!     let outcome = ExportCoordinator::new(config)
//!         .execute(&mut engine, chrono::Local::now().naive_local());
//!
//!     if let Some(summary) = outcome.summary() {
//!         println!("Exported {} layers", summary.exported);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Errors travel on two channels. [`domain::TesseraError`] aborts a run;
//! [`domain::LayerExportError`] is recorded against one layer in the
//! [`core::export::ExportSummary`] while the batch continues.
//!
//! ## Logging
//!
//! Every exported or failed layer produces one event in the append-only log:
//!
//! ```rust,no_run
//! use std::path::Path;
//! use tessera::log_layer_exported;
//!
//! log_layer_exported!("roads", "EPSG:4326", Path::new("output/roads.shp"), 120);
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
