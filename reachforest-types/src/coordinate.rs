use geo::{Distance, Euclidean, HaversineMeasure};
use serde::{Deserialize, Serialize};

/// Equatorial earth radius in meters used for great-circle lengths.
pub const EQUATORIAL_EARTH_RADIUS_M: f64 = 6_378_137.0;

/// A geographic position given as latitude/longitude degrees.
///
/// This wraps `geo::Point` (x = longitude, y = latitude) so the rest of the
/// `geo` ecosystem can be used on it directly.
///
/// # Examples
///
/// ```
/// use reachforest_types::coordinate::Coordinate;
///
/// let c = Coordinate::new(47.6062, -122.3321);
/// assert_eq!(c.lat(), 47.6062);
/// assert_eq!(c.lon(), -122.3321);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    inner: geo::Point<f64>,
}

impl Coordinate {
    /// Create a coordinate from latitude and longitude in degrees.
    #[inline]
    pub fn new(lat: f64, lon: f64) -> Self {
        Self {
            inner: geo::Point::new(lon, lat),
        }
    }

    /// Latitude in degrees.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.inner.y()
    }

    /// Longitude in degrees.
    #[inline]
    pub fn lon(&self) -> f64 {
        self.inner.x()
    }

    /// Access the inner `geo::Point`.
    #[inline]
    pub fn inner(&self) -> &geo::Point<f64> {
        &self.inner
    }

    /// Convert into the inner `geo::Point`.
    #[inline]
    pub fn into_inner(self) -> geo::Point<f64> {
        self.inner
    }

    /// Both components are finite numbers.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.lat().is_finite() && self.lon().is_finite()
    }

    /// Great-circle (haversine) distance to another coordinate in kilometers.
    ///
    /// Uses the equatorial earth radius, matching how road edge lengths are
    /// measured.
    ///
    /// # Examples
    ///
    /// ```
    /// use reachforest_types::coordinate::Coordinate;
    ///
    /// let a = Coordinate::new(0.0, 0.0);
    /// let b = Coordinate::new(0.0, 1.0);
    /// let km = a.haversine_km(&b);
    /// assert!((km - 111.319).abs() < 0.01);
    /// ```
    #[inline]
    pub fn haversine_km(&self, other: &Coordinate) -> f64 {
        HaversineMeasure::new(EQUATORIAL_EARTH_RADIUS_M).distance(self.inner, other.inner) / 1000.0
    }

    /// Planar distance in degree space.
    ///
    /// Only meaningful for motion-geometry approximations over short spans.
    #[inline]
    pub fn euclidean_distance(&self, other: &Coordinate) -> f64 {
        Euclidean.distance(self.inner, other.inner)
    }
}

impl From<geo::Point<f64>> for Coordinate {
    fn from(inner: geo::Point<f64>) -> Self {
        Self { inner }
    }
}

impl From<Coordinate> for geo::Point<f64> {
    fn from(c: Coordinate) -> Self {
        c.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lat_lon_order() {
        let c = Coordinate::new(45.5, -122.6);
        assert_eq!(c.inner().x(), -122.6);
        assert_eq!(c.inner().y(), 45.5);
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        let c = Coordinate::new(47.0, -122.0);
        assert_eq!(c.haversine_km(&c), 0.0);
    }

    #[test]
    fn test_haversine_symmetric() {
        let a = Coordinate::new(47.6062, -122.3321);
        let b = Coordinate::new(45.5152, -122.6784);
        let ab = a.haversine_km(&b);
        let ba = b.haversine_km(&a);
        assert!((ab - ba).abs() < 1e-9);
        // Seattle to Portland is roughly 234 km
        assert!(ab > 225.0 && ab < 245.0);
    }

    #[test]
    fn test_euclidean_distance() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(3.0, 4.0);
        assert_eq!(a.euclidean_distance(&b), 5.0);
    }

    #[test]
    fn test_is_finite() {
        assert!(Coordinate::new(1.0, 2.0).is_finite());
        assert!(!Coordinate::new(f64::NAN, 2.0).is_finite());
        assert!(!Coordinate::new(1.0, f64::INFINITY).is_finite());
    }

    #[test]
    fn test_serde_roundtrip() {
        let c = Coordinate::new(47.25, -122.44);
        let json = serde_json::to_string(&c).unwrap();
        let back: Coordinate = serde_json::from_str(&json).unwrap();
        assert_eq!(c, back);
    }
}
