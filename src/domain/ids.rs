//! Domain identifier types with validation
//!
//! Newtype wrappers for the identifiers a project document hands out.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Layer identifier newtype wrapper
///
/// Unique within a project. Layer names are not unique, ids are.
///
/// # Examples
///
/// ```
/// use tessera::domain::ids::LayerId;
/// use std::str::FromStr;
///
/// let id = LayerId::from_str("roads_8f2c").unwrap();
/// assert_eq!(id.as_str(), "roads_8f2c");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LayerId(String);

impl LayerId {
    /// Creates a new LayerId, rejecting blank identifiers
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err("Layer ID cannot be empty".to_string());
        }
        Ok(Self(id))
    }

    /// Returns the layer ID as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LayerId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for LayerId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Coordinate reference system identifier in `AUTHORITY:CODE` form
///
/// The authority part is upper-cased on construction so that `epsg:4326`
/// and `EPSG:4326` compare equal. Identifiers without an authority prefix are
/// kept verbatim.
///
/// # Examples
///
/// ```
/// use tessera::domain::ids::CrsId;
///
/// let crs = CrsId::new("epsg:4326").unwrap();
/// assert_eq!(crs.as_str(), "EPSG:4326");
/// assert_eq!(crs.authority(), Some("EPSG"));
/// assert_eq!(crs.code(), Some("4326"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CrsId(String);

impl CrsId {
    /// Creates a new CrsId, normalizing the authority prefix
    pub fn new(id: impl Into<String>) -> Result<Self, String> {
        let id = id.into();
        let trimmed = id.trim();
        if trimmed.is_empty() {
            return Err("CRS identifier cannot be empty".to_string());
        }

        let normalized = match trimmed.split_once(':') {
            Some((authority, code))
                if !authority.is_empty()
                    && !code.is_empty()
                    && authority.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                format!("{}:{}", authority.to_ascii_uppercase(), code.trim())
            }
            _ => trimmed.to_string(),
        };

        Ok(Self(normalized))
    }

    /// Returns the identifier as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Authority part (`EPSG` in `EPSG:4326`)
    pub fn authority(&self) -> Option<&str> {
        self.0.split_once(':').map(|(authority, _)| authority)
    }

    /// Code part (`4326` in `EPSG:4326`)
    pub fn code(&self) -> Option<&str> {
        self.0.split_once(':').map(|(_, code)| code)
    }
}

impl fmt::Display for CrsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for CrsId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for CrsId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<CrsId> for String {
    fn from(crs: CrsId) -> Self {
        crs.0
    }
}

impl AsRef<str> for CrsId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
