//! Ray/sphere intersection.
//!
//! "No intersection" is always `None`. Distances are in units of the ray
//! direction's length, so a non-normalized direction scales `t`.

use super::Vec3;

/// Smaller non-negative root of `a*t^2 + b*t + c = 0`.
///
/// Uses the sign of `b` to pick the cancellation-free root formula. A
/// negative discriminant, or two negative roots, yields `None`.
pub fn solve_quadratic(a: f64, b: f64, c: f64) -> Option<f64> {
    let discr = b * b - 4.0 * a * c;
    if discr < 0.0 || discr.is_nan() {
        return None;
    }

    let (x0, x1) = if discr == 0.0 {
        let x = -0.5 * b / a;
        (x, x)
    } else {
        let sqrt = discr.sqrt();
        let q = if b > 0.0 {
            -0.5 * (b + sqrt)
        } else {
            -0.5 * (b - sqrt)
        };
        (q / a, c / q)
    };

    match (x0 < 0.0, x1 < 0.0) {
        (true, true) => None,
        (false, true) => Some(x0),
        (true, false) => Some(x1),
        (false, false) => Some(x0.min(x1)),
    }
}

/// Distance along the ray to the first hit with the sphere.
pub fn intersect(center: Vec3, radius: f64, origin: Vec3, direction: Vec3) -> Option<f64> {
    let l = origin - center;
    let a = direction.dot(direction);
    let b = 2.0 * direction.dot(l);
    let c = l.dot(l) - radius * radius;
    solve_quadratic(a, b, c)
}

/// First point where the ray meets the sphere surface.
pub fn raycast_to_sphere(center: Vec3, radius: f64, origin: Vec3, direction: Vec3) -> Option<Vec3> {
    let t = intersect(center, radius, origin, direction)?;
    Some(origin + direction * t)
}
