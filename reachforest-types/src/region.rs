use crate::coordinate::Coordinate;
use serde::{Deserialize, Serialize};

/// A circular search area around an observed position.
///
/// The center is snapped to its nearest road node and every node within
/// `radius_km` of that node becomes a candidate root.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    /// The observed position.
    pub center: Coordinate,
    /// The radius of the circle in kilometers.
    pub radius_km: f64,
}

impl Region {
    pub fn new(center: Coordinate, radius_km: f64) -> Self {
        Self { center, radius_km }
    }

    /// Region around a latitude/longitude pair.
    pub fn around(lat: f64, lon: f64, radius_km: f64) -> Self {
        Self::new(Coordinate::new(lat, lon), radius_km)
    }

    /// A region is usable when its center is finite and its radius is a
    /// finite, non-negative number.
    pub fn is_valid(&self) -> bool {
        self.center.is_finite() && self.radius_km.is_finite() && self.radius_km >= 0.0
    }
}
