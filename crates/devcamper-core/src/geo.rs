//! Great-circle helpers for the bootcamp radius search.
//!
//! Distances are angular (radians on the unit sphere). A ground distance in
//! kilometres converts to an angular radius by dividing by [`EARTH_RADIUS_KM`].

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub const EARTH_RADIUS_KM: f64 = 6378.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Haversine angular distance to `other`, in radians.
    pub fn angular_distance(&self, other: &GeoPoint) -> f64 {
        let lat1 = self.latitude.to_radians();
        let lat2 = other.latitude.to_radians();
        let dlat = lat2 - lat1;
        let dlng = (other.longitude - self.longitude).to_radians();

        let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlng / 2.0).sin().powi(2);
        2.0 * a.sqrt().min(1.0).asin()
    }

    pub fn is_within(&self, other: &GeoPoint, radius: f64) -> bool {
        self.angular_distance(other) <= radius
    }

    /// Latitude band (degrees) guaranteed to contain every point within `radius`.
    ///
    /// Used to prefilter rows in SQL before the exact distance check.
    pub fn latitude_band(&self, radius: f64) -> (f64, f64) {
        let delta = radius.to_degrees();
        (
            (self.latitude - delta).max(-90.0),
            (self.latitude + delta).min(90.0),
        )
    }
}

/// Converts a ground distance in kilometres to an angular radius.
pub fn angular_radius(distance_km: f64) -> f64 {
    distance_km / EARTH_RADIUS_KM
}
