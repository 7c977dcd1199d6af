use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Axis-aligned extent of a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    pub min: LatLon,
    pub max: LatLon,
}

impl Bounds {
    pub fn from_point(p: LatLon) -> Self {
        Self { min: p, max: p }
    }

    pub fn extend(&mut self, p: LatLon) {
        self.min.lat = self.min.lat.min(p.lat);
        self.min.lon = self.min.lon.min(p.lon);
        self.max.lat = self.max.lat.max(p.lat);
        self.max.lon = self.max.lon.max(p.lon);
    }

    /// `None` for an empty input.
    pub fn around(points: impl IntoIterator<Item = LatLon>) -> Option<Self> {
        let mut points = points.into_iter();
        let mut bounds = Bounds::from_point(points.next()?);
        for p in points {
            bounds.extend(p);
        }
        Some(bounds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_around_points() {
        let b = Bounds::around([
            LatLon::new(40.7, -74.0),
            LatLon::new(40.9, -73.9),
            LatLon::new(40.6, -74.1),
        ])
        .unwrap();
        assert_eq!(b.min, LatLon::new(40.6, -74.1));
        assert_eq!(b.max, LatLon::new(40.9, -73.9));
    }

    #[test]
    fn test_bounds_of_nothing() {
        assert!(Bounds::around(Vec::new()).is_none());
    }
}
