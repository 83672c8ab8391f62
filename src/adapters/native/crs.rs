//! CRS registry
//!
//! Maps CRS identifiers to the ESRI WKT written into `.prj` files, and back.
//! The common geographic systems, Web Mercator and the 120 WGS 84 UTM zones
//! are built in. More can be added through a `crs.toml` file in the engine
//! root:
//!
//! ```toml
//! [crs]
//! "EPSG:2193" = 'PROJCS["NZGD_2000_New_Zealand_Transverse_Mercator", ...]'
//! ```

use crate::domain::{CrsId, EngineError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// File name of the optional definitions file inside the engine root
pub const CRS_DEFINITIONS_FILE: &str = "crs.toml";

const WGS84_WKT: &str = r#"GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

const WEB_MERCATOR_WKT: &str = r#"PROJCS["WGS_1984_Web_Mercator_Auxiliary_Sphere",GEOGCS["GCS_WGS_1984",DATUM["D_WGS_1984",SPHEROID["WGS_1984",6378137.0,298.257223563]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]],PROJECTION["Mercator_Auxiliary_Sphere"],PARAMETER["False_Easting",0.0],PARAMETER["False_Northing",0.0],PARAMETER["Central_Meridian",0.0],PARAMETER["Standard_Parallel_1",0.0],PARAMETER["Auxiliary_Sphere_Type",0.0],UNIT["Meter",1.0]]"#;

const NAD83_WKT: &str = r#"GEOGCS["GCS_North_American_1983",DATUM["D_North_American_1983",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

const UTM_ZONES: std::ops::RangeInclusive<u32> = 1..=60;

const ETRS89_WKT: &str = r#"GEOGCS["GCS_ETRS_1989",DATUM["D_ETRS_1989",SPHEROID["GRS_1980",6378137.0,298.257222101]],PRIMEM["Greenwich",0.0],UNIT["Degree",0.0174532925199433]]"#;

#[derive(Debug, Deserialize)]
struct DefinitionsFile {
    #[serde(default)]
    crs: BTreeMap<String, String>,
}

/// Known CRS definitions
#[derive(Debug, Clone, Default)]
pub struct CrsRegistry {
    definitions: BTreeMap<CrsId, String>,
}

impl CrsRegistry {
    /// Registry with the built-in definitions
    pub fn builtin() -> Self {
        let mut registry = Self::default();
        for (id, wkt) in [
            ("EPSG:4326", WGS84_WKT),
            ("EPSG:3857", WEB_MERCATOR_WKT),
            ("EPSG:4269", NAD83_WKT),
            ("EPSG:4258", ETRS89_WKT),
        ] {
            if let Ok(id) = CrsId::new(id) {
                registry.definitions.insert(id, wkt.to_string());
            }
        }
        for zone in UTM_ZONES {
            for north in [true, false] {
                let code = if north { 32600 + zone } else { 32700 + zone };
                if let Ok(id) = CrsId::new(format!("EPSG:{code}")) {
                    registry.definitions.insert(id, utm_wkt(zone, north));
                }
            }
        }
        registry
    }

    /// Adds or replaces definitions from a `crs.toml` file
    ///
    /// Returns the number of definitions read.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::InvalidCrsDefinitions`] when the file cannot be
    /// read or parsed, or defines an empty identifier or WKT.
    pub fn load_file(&mut self, path: &Path) -> Result<usize, EngineError> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            EngineError::InvalidCrsDefinitions(format!("{}: {}", path.display(), e))
        })?;
        let file: DefinitionsFile = toml::from_str(&contents).map_err(|e| {
            EngineError::InvalidCrsDefinitions(format!("{}: {}", path.display(), e))
        })?;

        let count = file.crs.len();
        for (id, wkt) in file.crs {
            let id = CrsId::new(id).map_err(EngineError::InvalidCrsDefinitions)?;
            if wkt.trim().is_empty() {
                return Err(EngineError::InvalidCrsDefinitions(format!(
                    "empty WKT for {id}"
                )));
            }
            self.definitions.insert(id, wkt.trim().to_string());
        }
        Ok(count)
    }

    /// ESRI WKT for `id`
    pub fn wkt_for(&self, id: &CrsId) -> Option<&str> {
        self.definitions.get(id).map(String::as_str)
    }

    /// Identifier whose WKT matches `wkt`, ignoring whitespace
    ///
    /// Several identifiers may share one definition; `preferred` wins when it
    /// is one of them.
    pub fn identify(&self, wkt: &str, preferred: Option<&CrsId>) -> Option<CrsId> {
        let wanted = normalize(wkt);
        if let Some(id) = preferred {
            if self.wkt_for(id).is_some_and(|known| normalize(known) == wanted) {
                return Some(id.clone());
            }
        }
        self.definitions
            .iter()
            .find(|(_, known)| normalize(known) == wanted)
            .map(|(id, _)| id.clone())
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn utm_wkt(zone: u32, north: bool) -> String {
    let hemisphere = if north { 'N' } else { 'S' };
    let false_northing = if north { 0.0 } else { 10_000_000.0 };
    let central_meridian = f64::from(zone) * 6.0 - 183.0;
    format!(
        r#"PROJCS["WGS_1984_UTM_Zone_{zone}{hemisphere}",{WGS84_WKT},PROJECTION["Transverse_Mercator"],PARAMETER["False_Easting",500000.0],PARAMETER["False_Northing",{false_northing:.1}],PARAMETER["Central_Meridian",{central_meridian:.1}],PARAMETER["Scale_Factor",0.9996],PARAMETER["Latitude_Of_Origin",0.0],UNIT["Meter",1.0]]"#
    )
}

fn normalize(wkt: &str) -> String {
    wkt.chars().filter(|c| !c.is_whitespace()).collect()
}
