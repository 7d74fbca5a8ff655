//! Light direction export.
//!
//! The renderer cannot read an object's rotation directly, so the sun's
//! Euler rotation is exported as three vectors `m0`, `m1`, `m2`: the columns
//! of its rotation matrix.

use foundation::math::{Euler, Vec3, euler_matrix, matrix_transpose};
use runtime::OutputSink;
use scene::components::Transform;

pub const SUN_MATRIX_OUTPUTS: [&str; 3] = ["m0", "m1", "m2"];

pub fn sun_basis(rotation: Euler) -> [Vec3; 3] {
    matrix_transpose(&euler_matrix(rotation)).rows
}

pub fn publish_sun_matrix(sun: &Transform, out: &mut impl OutputSink) {
    for (name, v) in SUN_MATRIX_OUTPUTS.into_iter().zip(sun_basis(sun.rotation())) {
        out.set_vector(name, v);
    }
}
