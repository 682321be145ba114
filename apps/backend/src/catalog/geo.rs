use serde::{Deserialize, Serialize};

use crate::errors::domain::{DomainError, ValidationKind};

/// Mean Earth radius (IUGG), kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0088;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    /// Validated point: finite, lat in [-90, 90], lon in [-180, 180].
    pub fn new(lat: f64, lon: f64) -> Result<Self, DomainError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(DomainError::validation(
                ValidationKind::Coordinates,
                "Coordinates must be finite numbers",
            ));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(DomainError::validation(
                ValidationKind::Coordinates,
                format!("Latitude {lat} is outside [-90, 90]"),
            ));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(DomainError::validation(
                ValidationKind::Coordinates,
                format!("Longitude {lon} is outside [-180, 180]"),
            ));
        }
        Ok(Self { lat, lon })
    }
}

/// Great-circle distance in kilometres.
pub fn haversine_km(a: GeoPoint, b: GeoPoint) -> f64 {
    let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
    let d_lat = lat2 - lat1;
    let d_lon = (b.lon - a.lon).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    // Clamp guards against h drifting past 1.0 for antipodal points.
    2.0 * EARTH_RADIUS_KM * h.sqrt().min(1.0).asin()
}
