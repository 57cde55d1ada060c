use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinates {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

impl From<&Coordinates> for geo_types::Point {
    fn from(coordinates: &Coordinates) -> Self {
        geo_types::Point::new(coordinates.longitude, coordinates.latitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_conversion_is_lon_lat() {
        let coordinates = Coordinates::new(36.17, -115.14);
        let point: geo_types::Point = (&coordinates).into();

        assert_eq!(point.x(), -115.14);
        assert_eq!(point.y(), 36.17);
    }

    #[test]
    fn test_finite_check() {
        assert!(Coordinates::new(0.0, 0.0).is_finite());
        assert!(!Coordinates::new(f64::NAN, 0.0).is_finite());
        assert!(!Coordinates::new(0.0, f64::INFINITY).is_finite());
    }
}
