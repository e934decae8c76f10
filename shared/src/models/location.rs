//! Location Model

use serde::{Deserialize, Serialize};

/// WGS84 coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Last known fix plus its reverse-geocoded address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationSnapshot {
    pub coordinates: Coordinates,
    /// Blank when the address lookup failed
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub street: String,
}

/// One reverse-geocoding result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    pub city: Option<String>,
    pub street: Option<String>,
}
