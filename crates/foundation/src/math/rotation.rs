//! Euler-angle rotations.
//!
//! Angles are radians. The combined matrix is `Rz(z) * Ry(y) * Rx(x)`, so a
//! vector is rotated about X first, then Y, then Z. Matrices are stored as
//! three row vectors.

use super::Vec3;

/// Euler rotation in radians.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Euler {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Euler {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    pub fn as_vec3(self) -> Vec3 {
        Vec3::new(self.x, self.y, self.z)
    }
}

/// 3x3 rotation matrix, row-ordered.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RotationMatrix {
    pub rows: [Vec3; 3],
}

impl RotationMatrix {
    pub fn from_rows(r0: Vec3, r1: Vec3, r2: Vec3) -> Self {
        Self { rows: [r0, r1, r2] }
    }

    pub fn column(&self, index: usize) -> Vec3 {
        let [r0, r1, r2] = self.rows;
        match index {
            0 => Vec3::new(r0.x, r1.x, r2.x),
            1 => Vec3::new(r0.y, r1.y, r2.y),
            _ => Vec3::new(r0.z, r1.z, r2.z),
        }
    }
}

pub fn euler_to_rotation_matrix(x: f64, y: f64, z: f64) -> RotationMatrix {
    let (sx, cx) = x.sin_cos();
    let (sy, cy) = y.sin_cos();
    let (sz, cz) = z.sin_cos();

    let m00 = cy * cz;
    let m01 = cz * sx * sy - cx * sz;
    let m02 = cx * cz * sy + sx * sz;
    let m10 = cy * sz;
    let m11 = sx * sy * sz + cx * cz;
    let m12 = cx * sy * sz - cz * sx;
    let m20 = -sy;
    let m21 = cy * sx;
    let m22 = cx * cy;

    RotationMatrix::from_rows(
        Vec3::new(m00, m01, m02),
        Vec3::new(m10, m11, m12),
        Vec3::new(m20, m21, m22),
    )
}

pub fn euler_matrix(rotation: Euler) -> RotationMatrix {
    euler_to_rotation_matrix(rotation.x, rotation.y, rotation.z)
}

pub fn matrix_transpose(m: &RotationMatrix) -> RotationMatrix {
    RotationMatrix::from_rows(m.column(0), m.column(1), m.column(2))
}

pub fn matrix_mul(m: &RotationMatrix, v: Vec3) -> Vec3 {
    Vec3::new(m.rows[0].dot(v), m.rows[1].dot(v), m.rows[2].dot(v))
}

/// World-space point to model space for an object placed with `position`,
/// `rotation` and per-axis `scale`.
///
/// The inverse rotation is applied as three single-axis steps: Z, then Y,
/// then X, each with the negated angle.
pub fn world_to_model(p: Vec3, position: Vec3, rotation: Euler, scale: Vec3) -> Vec3 {
    let mut model = p - position;
    model = matrix_mul(&euler_to_rotation_matrix(0.0, 0.0, -rotation.z), model);
    model = matrix_mul(&euler_to_rotation_matrix(0.0, -rotation.y, 0.0), model);
    model = matrix_mul(&euler_to_rotation_matrix(-rotation.x, 0.0, 0.0), model);
    model.div_each(scale)
}

/// Model-space point to world space: scale, rotate, translate.
pub fn model_to_world(p: Vec3, position: Vec3, rotation: Euler, scale: Vec3) -> Vec3 {
    matrix_mul(&euler_matrix(rotation), p.mul_each(scale)) + position
}

/// Forward direction (`-Z` in model space) of an object with `rotation`.
pub fn transform_to_forward(rotation: Euler) -> Vec3 {
    matrix_mul(&euler_matrix(rotation), Vec3::FORWARD)
}

/// Rotation that points the forward axis of an object at `from` towards
/// `target`, with no roll.
///
/// Returns `None` when the two points coincide.
pub fn look_at_euler(from: Vec3, target: Vec3) -> Option<Euler> {
    let d = (target - from).normalize()?;
    let x = d.y.clamp(-1.0, 1.0).asin();
    let y = (-d.x).atan2(-d.z);
    Some(Euler::new(x, y, 0.0))
}

#[cfg(test)]
mod tests {
    use super::{
        Euler, RotationMatrix, euler_to_rotation_matrix, look_at_euler, matrix_mul,
        matrix_transpose, model_to_world, transform_to_forward, world_to_model,
    };
    use crate::math::Vec3;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::f64::consts::{FRAC_PI_2, PI};

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn assert_vec_close(a: Vec3, b: Vec3, eps: f64) {
        assert_close(a.x, b.x, eps);
        assert_close(a.y, b.y, eps);
        assert_close(a.z, b.z, eps);
    }

    #[test]
    fn zero_angles_give_identity() {
        let identity = RotationMatrix::from_rows(
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
            Vec3::new(0.0, 0.0, 1.0),
        );
        assert_eq!(euler_to_rotation_matrix(0.0, 0.0, 0.0), identity);
    }

    #[test]
    fn random_angles_give_orthonormal_matrices() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..500 {
            let m = euler_to_rotation_matrix(
                rng.gen_range(-PI..PI),
                rng.gen_range(-PI..PI),
                rng.gen_range(-PI..PI),
            );
            for i in 0..3 {
                assert_close(m.rows[i].length(), 1.0, 1e-12);
                assert_close(m.column(i).length(), 1.0, 1e-12);
                for j in (i + 1)..3 {
                    assert_close(m.rows[i].dot(m.rows[j]), 0.0, 1e-12);
                    assert_close(m.column(i).dot(m.column(j)), 0.0, 1e-12);
                }
            }
        }
    }

    #[test]
    fn yaw_quarter_turn_maps_x_to_minus_z() {
        let m = euler_to_rotation_matrix(0.0, FRAC_PI_2, 0.0);
        let v = matrix_mul(&m, Vec3::new(1.0, 0.0, 0.0));
        assert_vec_close(v, Vec3::new(0.0, 0.0, -1.0), 1e-12);
    }

    #[test]
    fn transpose_undoes_rotation() {
        let m = euler_to_rotation_matrix(0.3, -1.1, 2.0);
        let v = Vec3::new(0.2, -0.7, 1.5);
        let back = matrix_mul(&matrix_transpose(&m), matrix_mul(&m, v));
        assert_vec_close(back, v, 1e-12);
    }

    #[test]
    fn world_to_model_is_left_inverse_of_model_to_world() {
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..500 {
            let p = Vec3::new(
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
                rng.gen_range(-2.0..2.0),
            );
            let position = Vec3::new(
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
                rng.gen_range(-5.0..5.0),
            );
            let rotation = Euler::new(
                rng.gen_range(-PI..PI),
                rng.gen_range(-PI..PI),
                rng.gen_range(-PI..PI),
            );
            let scale = Vec3::new(
                rng.gen_range(0.1..3.0),
                rng.gen_range(0.1..3.0),
                rng.gen_range(0.1..3.0),
            );
            let world = model_to_world(p, position, rotation, scale);
            let back = world_to_model(world, position, rotation, scale);
            assert_vec_close(back, p, 1e-9);
        }
    }

    #[test]
    fn identity_transform_forward_is_minus_z() {
        assert_eq!(
            transform_to_forward(Euler::default()),
            Vec3::new(0.0, 0.0, -1.0)
        );
    }

    #[test]
    fn look_at_points_forward_axis_at_target() {
        let from = Vec3::new(0.3, -0.4, 1.2);
        let target = Vec3::ZERO;
        let rotation = look_at_euler(from, target).expect("distinct points");
        let expected = (target - from).normalize().expect("non-zero");
        assert_vec_close(transform_to_forward(rotation), expected, 1e-12);
        assert_close(rotation.z, 0.0, 0.0);
    }

    #[test]
    fn look_at_same_point_is_none() {
        assert!(look_at_euler(Vec3::ZERO, Vec3::ZERO).is_none());
    }
}
