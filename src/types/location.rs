use serde::{Deserialize, Serialize};

use crate::error::{Result, validate};

/// A point on the WGS84 ellipsoid, in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

impl Location {
    /// Construct a validated location.
    pub fn new(lat: f64, lon: f64) -> Result<Self> {
        let location = Self { lat, lon };
        location.validate()?;
        Ok(location)
    }

    /// Check that latitude lies in [-90, 90] and longitude in [-180, 180].
    pub fn validate(&self) -> Result<()> {
        validate!(self.lat.is_finite() && (-90.0..=90.0).contains(&self.lat),
            "latitude {} is outside [-90, 90]", self.lat);
        validate!(self.lon.is_finite() && (-180.0..=180.0).contains(&self.lon),
            "longitude {} is outside [-180, 180]", self.lon);
        Ok(())
    }

    /// Convert into a `geo` point (x = lon, y = lat).
    #[inline] pub fn to_point(&self) -> geo::Point<f64> { geo::Point::new(self.lon, self.lat) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn accepts_boundaries() {
        assert!(Location::new(90.0, 180.0).is_ok());
        assert!(Location::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_nan() {
        assert!(matches!(Location::new(90.5, 0.0), Err(Error::Validation(_))));
        assert!(matches!(Location::new(0.0, -180.1), Err(Error::Validation(_))));
        assert!(matches!(Location::new(f64::NAN, 0.0), Err(Error::Validation(_))));
    }

    #[test]
    fn point_is_lon_lat() {
        let p = Location::new(-23.5, -46.6).unwrap().to_point();
        assert_eq!((p.x(), p.y()), (-46.6, -23.5));
    }
}
