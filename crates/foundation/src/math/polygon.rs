//! Planar point-in-polygon tests on lon/lat degrees.
//!
//! Rings are sequences of vertices; closing the ring (repeating the first
//! vertex) is optional. Containment uses the even-odd rule across every ring
//! of a polygon, so holes exclude points without needing winding order.

use super::GeoCoordinate;

pub type Ring = Vec<GeoCoordinate>;

/// Outer ring followed by zero or more holes.
pub type Polygon = Vec<Ring>;

/// Number of ring edges crossed by a ray cast from `p` towards +lon, mod 2.
pub fn ring_crossings_odd(ring: &[GeoCoordinate], p: GeoCoordinate) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let a = ring[i];
        let b = ring[j];
        if (a.lat_deg > p.lat_deg) != (b.lat_deg > p.lat_deg) {
            let t = (p.lat_deg - a.lat_deg) / (b.lat_deg - a.lat_deg);
            let lon_at = a.lon_deg + t * (b.lon_deg - a.lon_deg);
            if p.lon_deg < lon_at {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

pub fn polygon_contains(rings: &[Ring], p: GeoCoordinate) -> bool {
    rings
        .iter()
        .filter(|ring| ring_crossings_odd(ring, p))
        .count()
        % 2
        == 1
}

pub fn multi_polygon_contains(polygons: &[Polygon], p: GeoCoordinate) -> bool {
    polygons.iter().any(|rings| polygon_contains(rings, p))
}
