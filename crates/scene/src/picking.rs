//! Camera ray to geographic coordinate.
//!
//! Pipeline: ray/sphere hit in world space, hit point into the globe's model
//! space, spherical UV, then lon/lat. A ray that misses the globe yields
//! `None`; callers must not resolve countries or score without a hit.

use foundation::math::{
    GeoCoordinate, Uv, Vec3, lat_lon_to_model, look_at_euler, model_to_texture_spherical,
    raycast_to_sphere, uv_to_lat_lon,
};

use crate::components::Transform;
use crate::prefabs::GlobeModel;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    /// Ray from a camera's position along its forward axis.
    pub fn from_camera(camera: &Transform) -> Self {
        Self::new(camera.position(), camera.forward())
    }
}

/// Every intermediate of a successful globe pick.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GlobeHit {
    pub world: Vec3,
    pub model: Vec3,
    pub uv: Uv,
    pub geo: GeoCoordinate,
}

/// Casts `ray` at a globe of `radius` placed by `globe`.
pub fn pick_globe(ray: Ray, globe: &Transform, radius: f64) -> Option<GlobeHit> {
    pick_sphere(ray, globe.position(), radius, globe)
}

fn pick_sphere(ray: Ray, center: Vec3, radius: f64, globe: &Transform) -> Option<GlobeHit> {
    let world = raycast_to_sphere(center, radius, ray.origin, ray.dir)?;
    let model = globe.world_to_model(world);
    let uv = model_to_texture_spherical(model)?;
    let geo = uv_to_lat_lon(uv);
    if !geo.is_finite() {
        return None;
    }
    Some(GlobeHit {
        world,
        model,
        uv,
        geo,
    })
}

/// Geographic coordinate under the camera ray, if it hits the globe.
pub fn locate(
    camera_origin: Vec3,
    camera_direction: Vec3,
    globe_center: Vec3,
    globe_world_radius: f64,
    globe_transform: &Transform,
) -> Option<GeoCoordinate> {
    pick_sphere(
        Ray::new(camera_origin, camera_direction),
        globe_center,
        globe_world_radius,
        globe_transform,
    )
    .map(|hit| hit.geo)
}

/// Geolocator bound to one globe mesh.
#[derive(Debug, Copy, Clone, PartialEq, Default)]
pub struct Geolocator {
    pub globe: GlobeModel,
}

impl Geolocator {
    pub fn new(globe: GlobeModel) -> Self {
        Self { globe }
    }

    pub fn pick(&self, camera: &Transform, globe_transform: &Transform) -> Option<GlobeHit> {
        pick_globe(
            Ray::from_camera(camera),
            globe_transform,
            self.globe.world_radius(globe_transform),
        )
    }

    /// Camera `distance` above `geo` on the globe, looking straight down at
    /// it. Picking through the result lands back on `geo`.
    pub fn aim(
        &self,
        globe_transform: &Transform,
        geo: GeoCoordinate,
        distance: f64,
    ) -> Option<Transform> {
        let surface_model = lat_lon_to_model(geo) * self.globe.base_radius;
        let surface = globe_transform.model_to_world(surface_model);
        let outward = (surface - globe_transform.position()).normalize()?;
        let eye = surface + outward * distance;
        let rotation = look_at_euler(eye, surface)?;
        Some(Transform::translate(eye).with_rotation(rotation))
    }
}

#[cfg(test)]
mod tests {
    use super::{Geolocator, Ray, locate, pick_globe};
    use crate::components::Transform;
    use foundation::math::{Euler, GeoCoordinate, Vec3};
    use std::f64::consts::FRAC_PI_2;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    #[test]
    fn camera_on_plus_z_sees_prime_meridian() {
        let camera = Transform::translate(Vec3::new(0.0, 0.0, 1.0));
        let globe = Transform::identity();
        let hit = pick_globe(Ray::from_camera(&camera), &globe, 0.025).expect("hit");
        assert_close(hit.world.z, 0.025, 1e-12);
        assert_close(hit.geo.lon_deg, 0.0, 1e-9);
        assert_close(hit.geo.lat_deg, 0.0, 1e-9);
    }

    #[test]
    fn globe_rotation_shifts_longitude() {
        // A quarter turn about Y brings model -X round to face +Z.
        let camera = Transform::translate(Vec3::new(0.0, 0.0, 1.0));
        let globe = Transform::identity().with_rotation(Euler::new(0.0, FRAC_PI_2, 0.0));
        let hit = pick_globe(Ray::from_camera(&camera), &globe, 0.025).expect("hit");
        assert_close(hit.geo.lon_deg, 90.0, 1e-9);
    }

    #[test]
    fn scaled_globe_uses_world_radius() {
        let camera = Transform::translate(Vec3::new(0.0, 0.0, 1.0));
        let globe = Transform::translate(Vec3::new(0.0, 0.0, -0.2)).with_uniform_scale(4.0);
        let hit = Geolocator::default().pick(&camera, &globe).expect("hit");
        assert_close(hit.world.z, -0.2 + 0.1, 1e-12);
        assert_close(hit.model.length(), 0.025, 1e-12);
    }

    #[test]
    fn looking_away_misses() {
        let camera = Transform::translate(Vec3::new(0.0, 0.0, 1.0))
            .with_rotation(Euler::new(0.0, std::f64::consts::PI, 0.0));
        let globe = Transform::identity();
        assert!(Geolocator::default().pick(&camera, &globe).is_none());
    }

    #[test]
    fn locate_from_above_hits_north_pole() {
        // Camera above the pole looking straight down.
        let globe = Transform::identity();
        let geo = locate(
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, -1.0, 0.0),
            globe.position(),
            1.0,
            &globe,
        )
        .expect("hit");
        assert_close(geo.lat_deg, 90.0, 1e-9);
    }

    #[test]
    fn aimed_camera_picks_back_its_coordinate() {
        let globe = Transform::translate(Vec3::new(0.1, -0.05, -0.4))
            .with_rotation(Euler::new(0.3, -1.1, 0.2))
            .with_uniform_scale(2.5);
        let locator = Geolocator::default();
        for (lon, lat) in [(2.0, 46.5), (-50.0, -10.0), (138.0, 36.0), (179.0, -60.0)] {
            let camera = locator
                .aim(&globe, GeoCoordinate::new(lon, lat), 0.3)
                .expect("aim");
            let hit = locator.pick(&camera, &globe).expect("hit");
            assert_close(hit.geo.lon_deg, lon, 1e-6);
            assert_close(hit.geo.lat_deg, lat, 1e-6);
        }
    }
}
