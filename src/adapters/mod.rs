//! External system integrations for Tessera.
//!
//! - [`engine`] - GIS engine abstraction (trait-based) and the scoped session
//! - [`native`] - the built-in engine: JSON projects, GeoJSON sources,
//!   ESRI Shapefile output
//!
//! # Design Pattern
//!
//! Adapters isolate the geospatial runtime behind the
//! [`GisEngine`](engine::GisEngine) trait so the export pipeline can run
//! against the native engine or a scripted engine in tests.
//!
//! ```rust,no_run
//! use tessera::adapters::engine::EngineSession;
//! use tessera::adapters::native::NativeEngine;
//! use tessera::config::EngineConfig;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let mut engine = NativeEngine::new();
//! let session = EngineSession::open(&mut engine, &EngineConfig::default())?;
//! // Use the session for project and layer operations
//! session.close()?;
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod native;
