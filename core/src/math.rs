//! Math type aliases and helper functions.
//!
//! Scene data keeps plain arrays; these helpers convert at the edges where
//! transforms have to be composed or applied to vertex data.

pub use nalgebra;

/// 3D vector (f32).
pub type Vec3 = nalgebra::Vector3<f32>;

/// 3x3 matrix (f32).
pub type Mat3 = nalgebra::Matrix3<f32>;

/// 4x4 matrix (f32).
pub type Mat4 = nalgebra::Matrix4<f32>;

/// Quaternion (f32). Stored as `[x, y, z, w]` in memory.
pub type Quat = nalgebra::Quaternion<f32>;

/// Build a quaternion from glTF-ordered `[x, y, z, w]` components.
pub fn quat_from_xyzw(q: [f32; 4]) -> Quat {
    Quat::new(q[3], q[0], q[1], q[2])
}

/// Build a 4x4 TRS matrix from scale, rotation (quaternion), and translation.
pub fn mat4_from_scale_rotation_translation(
    scale: Vec3,
    rotation: Quat,
    translation: Vec3,
) -> Mat4 {
    let r = nalgebra::UnitQuaternion::from_quaternion(rotation);
    let m = r.to_rotation_matrix();
    let rm = m.matrix();
    #[rustfmt::skip]
    let result = Mat4::new(
        rm[(0, 0)] * scale.x, rm[(0, 1)] * scale.y, rm[(0, 2)] * scale.z, translation.x,
        rm[(1, 0)] * scale.x, rm[(1, 1)] * scale.y, rm[(1, 2)] * scale.z, translation.y,
        rm[(2, 0)] * scale.x, rm[(2, 1)] * scale.y, rm[(2, 2)] * scale.z, translation.z,
        0.0,                  0.0,                  0.0,                  1.0,
    );
    result
}

/// Transform a point (w = 1).
pub fn transform_point(m: &Mat4, p: [f32; 3]) -> [f32; 3] {
    let v = m.transform_point(&nalgebra::Point3::new(p[0], p[1], p[2]));
    [v.x, v.y, v.z]
}

/// Transform a direction by the upper-left 3x3 of `m` (w = 0).
pub fn transform_vector(m: &Mat4, v: [f32; 3]) -> [f32; 3] {
    let r = m.transform_vector(&Vec3::new(v[0], v[1], v[2]));
    [r.x, r.y, r.z]
}

/// Inverse-transpose of the linear part, used for normals.
///
/// Falls back to the linear part itself when the matrix is singular.
pub fn normal_matrix(m: &Mat4) -> Mat3 {
    let linear: Mat3 = m.fixed_view::<3, 3>(0, 0).into_owned();
    linear
        .try_inverse()
        .map(|inv| inv.transpose())
        .unwrap_or(linear)
}

/// Transform and renormalize a normal.
pub fn transform_normal(n: &Mat3, v: [f32; 3]) -> [f32; 3] {
    let r = n * Vec3::new(v[0], v[1], v[2]);
    let len = r.norm();
    if len > f32::EPSILON {
        [r.x / len, r.y / len, r.z / len]
    } else {
        [r.x, r.y, r.z]
    }
}
