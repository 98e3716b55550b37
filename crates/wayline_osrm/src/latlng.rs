use serde::{Deserialize, Serialize};

use crate::error::OsrmError;

/// A geographic point in (latitude, longitude) degrees.
///
/// OSRM's wire format wants longitude first; that swap happens only when a
/// `LatLng` is converted to a `geo_types::Point` at the request boundary.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Result<Self, OsrmError> {
        let valid = lat.is_finite()
            && lng.is_finite()
            && (-90.0..=90.0).contains(&lat)
            && (-180.0..=180.0).contains(&lng);

        if !valid {
            return Err(OsrmError::InvalidCoordinate { lat, lng });
        }

        Ok(Self { lat, lng })
    }
}

impl From<&LatLng> for geo_types::Point {
    fn from(value: &LatLng) -> Self {
        geo_types::Point::new(value.lng, value.lat)
    }
}
