//! Domain models and types for Tessera.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Strongly-typed identifiers** ([`LayerId`], [`CrsId`])
//! - **Project model** ([`Project`], [`Layer`], [`LayerKind`])
//! - **Feature model** ([`VectorDataset`], [`Feature`], [`Geometry`])
//! - **Error types** ([`TesseraError`], [`EngineError`], [`LayerExportError`])
//! - **Result type alias** ([`Result`])
//!
//! # Layer kinds
//!
//! The kind of a layer is fixed when the project is loaded and matched
//! exhaustively; only [`LayerKind::Vector`] layers are exported:
//!
//! ```rust
//! use tessera::domain::{CrsId, Layer, LayerId, LayerKind};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let roads = Layer::new(
//!     LayerId::new("roads_1")?,
//!     "roads",
//!     LayerKind::Vector,
//!     Some(CrsId::new("EPSG:4326")?),
//!     "data/roads.geojson",
//! );
//! assert!(roads.is_vector());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod feature;
pub mod ids;
pub mod layer;
pub mod result;

// Re-export commonly used types for convenience
pub use errors::{
    EngineError, LayerExportError, TesseraError, WriteError, WriterErrorCode,
};
pub use feature::{AttributeValue, Coord, Feature, Geometry, VectorDataset};
pub use ids::{CrsId, LayerId};
pub use layer::{Layer, LayerKind, Project};
pub use result::Result;
