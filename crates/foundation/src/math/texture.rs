//! Spherical texture mapping and its geographic interpretation.
//!
//! `u` wraps around the equator with the seam on the model's back (`-Z`),
//! `v` runs from the north pole (`0`) to the south pole (`1`).

use std::f64::consts::PI;

use super::{GeoCoordinate, Vec2, Vec3};

/// Texture coordinate in `[0, 1]^2`.
pub type Uv = Vec2;

/// Model-space point to spherical texture coordinates.
///
/// Returns `None` for the zero vector, which has no direction.
pub fn model_to_texture_spherical(p: Vec3) -> Option<Uv> {
    let p = p.normalize()?;
    let u = ((-p.x).atan2(p.z) + PI) / (2.0 * PI);
    let v = p.y.clamp(-1.0, 1.0).acos() / PI;
    Some(Uv::new(u, v))
}

pub fn uv_to_lat_lon(uv: Uv) -> GeoCoordinate {
    let lon = (uv.x - 0.5) * 360.0;
    let lat = (uv.y - 0.5) * -180.0;
    GeoCoordinate::new(lon, lat)
}

/// Unit model-space direction of a geographic coordinate.
///
/// Inverse of [`model_to_texture_spherical`] followed by [`uv_to_lat_lon`].
pub fn lat_lon_to_model(geo: GeoCoordinate) -> Vec3 {
    let lon = geo.lon_deg.to_radians();
    let lat = geo.lat_deg.to_radians();
    Vec3::new(-lon.sin() * lat.cos(), lat.sin(), lon.cos() * lat.cos())
}
