/// Geographic coordinate in degrees.
///
/// Longitude is in `[-180, 180]`, latitude in `[-90, 90]`; both follow the
/// GeoJSON `[lon, lat]` axis order.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct GeoCoordinate {
    pub lon_deg: f64,
    pub lat_deg: f64,
}

impl GeoCoordinate {
    pub fn new(lon_deg: f64, lat_deg: f64) -> Self {
        Self { lon_deg, lat_deg }
    }

    pub fn is_finite(&self) -> bool {
        self.lon_deg.is_finite() && self.lat_deg.is_finite()
    }
}

impl std::fmt::Display for GeoCoordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.4}, {:.4})", self.lon_deg, self.lat_deg)
    }
}
