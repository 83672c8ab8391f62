//! GIS engine abstraction layer
//!
//! The export pipeline talks to a geospatial runtime only through the
//! [`GisEngine`] trait, and only while an [`EngineSession`] is open.

pub mod session;
pub mod traits;

pub use session::EngineSession;
pub use traits::{
    GisEngine, SaveVectorOptions, TransformContext, WriteSummary, SHAPEFILE_DRIVER,
    UTF8_ENCODING,
};
