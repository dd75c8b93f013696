use serde::{Deserialize, Serialize};

/// A WGS84 point as reported by the map surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Where a fresh map session is centred when the draft has no location yet.
    pub const DEFAULT: Coordinate = Coordinate {
        latitude: 17.448_294_7,
        longitude: 78.375_344_7,
    };

    #[must_use]
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Parses the string pair stored on a draft's location, if both are set.
    #[must_use]
    pub fn from_location_strings(latitude: &str, longitude: &str) -> Option<Self> {
        let latitude = latitude.trim().parse::<f64>().ok()?;
        let longitude = longitude.trim().parse::<f64>().ok()?;
        Some(Self::new(latitude, longitude))
    }

    /// Fixed-precision rendering used wherever a resolved address is unavailable.
    #[must_use]
    pub fn to_fixed_string(&self) -> String {
        format!("Lat: {:.6}, Lng: {:.6}", self.latitude, self.longitude)
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6},{:.6}", self.latitude, self.longitude)
    }
}
