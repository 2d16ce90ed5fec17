//! Math utilities and types
//!
//! Vectors and matrices are `nalgebra` types. Matrices are column-major, so
//! `as_slice()` can be handed to a graphics API unchanged, while indexing with
//! `m[(row, col)]` follows the usual math convention.
//!
//! Scene transforms are built with the helpers on [`Mat4Ext`]. Every
//! composing helper applies its transform after the current one
//! (`new = transform * self`), except [`Mat4Ext::translate_local_xz`] which
//! moves along the matrix's own axes.

pub use nalgebra::{Matrix2, Matrix3, Matrix4, Quaternion, Vector2, Vector3, Vector4};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 2x2 matrix type
pub type Mat2 = Matrix2<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Rotation quaternion.
///
/// Not wrapped in `Unit`: values are used as given and never renormalized.
pub type Quat = Quaternion<f32>;

/// Convert Euler angles in radians to a quaternion.
///
/// The result describes the same rotation as [`Mat4Ext::rotation_xyz`],
/// i.e. X applied first, then Y, then Z.
pub fn euler_to_quaternion(euler: Vec3) -> Quat {
    let (sx, cx) = (euler.x * 0.5).sin_cos();
    let (sy, cy) = (euler.y * 0.5).sin_cos();
    let (sz, cz) = (euler.z * 0.5).sin_cos();

    Quat::new(
        cx * cy * cz + sx * sy * sz,
        sx * cy * cz - cx * sy * sz,
        cx * sy * cz + sx * cy * sz,
        cx * cy * sz - sx * sy * cz,
    )
}

/// Extension trait for Mat4 with the engine's transform helpers
pub trait Mat4Ext {
    /// Create a rotation matrix around the X axis
    fn rotation_x(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a rotation matrix around the Z axis
    fn rotation_z(angle: f32) -> Mat4;

    /// Combined rotation `Rz(z) * Ry(y) * Rx(x)`
    fn rotation_xyz(euler: Vec3) -> Mat4;

    /// Rotation from a unit quaternion. The quaternion is not normalized.
    fn rotation_xyzw(q: &Quat) -> Mat4;

    /// Compose `T * R * S` from a position, a quaternion and a scale
    fn from_trs(position: Vec3, rotation: &Quat, scaling: Vec3) -> Mat4;

    /// Translation part (column 3)
    fn translation(&self) -> Vec3;

    /// Invert in place. A singular matrix (determinant exactly zero) is
    /// left unchanged.
    fn invert(&mut self) -> &mut Self;

    /// Inverted copy, or an unchanged copy when singular
    #[must_use]
    fn inverted(&self) -> Mat4;

    /// Apply a translation after the current transform
    fn translate(&mut self, t: Vec3) -> &mut Self;

    /// Apply a non-uniform scale after the current transform
    fn scale_by(&mut self, s: Vec3) -> &mut Self;

    /// Apply a rotation about X after the current transform
    fn rotate_x(&mut self, angle: f32) -> &mut Self;

    /// Apply a rotation about Y after the current transform
    fn rotate_y(&mut self, angle: f32) -> &mut Self;

    /// Apply a rotation about Z after the current transform
    fn rotate_z(&mut self, angle: f32) -> &mut Self;

    /// Apply an Euler rotation after the current transform
    fn rotate_xyz(&mut self, euler: Vec3) -> &mut Self;

    /// Apply a quaternion rotation after the current transform
    fn rotate_xyzw(&mut self, q: &Quat) -> &mut Self;

    /// Move along the local X/Z axes while keeping the world height
    fn translate_local_xz(&mut self, x: f32, z: f32) -> &mut Self;
}

impl Mat4Ext for Mat4 {
    fn rotation_x(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::x_axis(), angle)
    }

    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn rotation_z(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::z_axis(), angle)
    }

    fn rotation_xyz(euler: Vec3) -> Mat4 {
        Mat4::from_euler_angles(euler.x, euler.y, euler.z)
    }

    fn rotation_xyzw(q: &Quat) -> Mat4 {
        let (x, y, z, w) = (q.i, q.j, q.k, q.w);
        Mat4::new(
            1.0 - 2.0 * y * y - 2.0 * z * z,
            2.0 * x * y - 2.0 * z * w,
            2.0 * x * z + 2.0 * y * w,
            0.0,
            2.0 * x * y + 2.0 * z * w,
            1.0 - 2.0 * x * x - 2.0 * z * z,
            2.0 * y * z - 2.0 * x * w,
            0.0,
            2.0 * x * z - 2.0 * y * w,
            2.0 * y * z + 2.0 * x * w,
            1.0 - 2.0 * x * x - 2.0 * y * y,
            0.0,
            0.0,
            0.0,
            0.0,
            1.0,
        )
    }

    fn from_trs(position: Vec3, rotation: &Quat, scaling: Vec3) -> Mat4 {
        Mat4::new_translation(&position)
            * Mat4::rotation_xyzw(rotation)
            * Mat4::new_nonuniform_scaling(&scaling)
    }

    fn translation(&self) -> Vec3 {
        Vec3::new(self[(0, 3)], self[(1, 3)], self[(2, 3)])
    }

    fn invert(&mut self) -> &mut Self {
        // try_inverse_mut scribbles over a singular 4x4, so go through a copy.
        match self.try_inverse() {
            Some(inverse) => *self = inverse,
            None => log::trace!("Skipping inversion of singular matrix"),
        }
        self
    }

    fn inverted(&self) -> Mat4 {
        let mut out = *self;
        out.invert();
        out
    }

    fn translate(&mut self, t: Vec3) -> &mut Self {
        self.append_translation_mut(&t);
        self
    }

    fn scale_by(&mut self, s: Vec3) -> &mut Self {
        self.append_nonuniform_scaling_mut(&s);
        self
    }

    fn rotate_x(&mut self, angle: f32) -> &mut Self {
        *self = Mat4::rotation_x(angle) * *self;
        self
    }

    fn rotate_y(&mut self, angle: f32) -> &mut Self {
        *self = Mat4::rotation_y(angle) * *self;
        self
    }

    fn rotate_z(&mut self, angle: f32) -> &mut Self {
        *self = Mat4::rotation_z(angle) * *self;
        self
    }

    fn rotate_xyz(&mut self, euler: Vec3) -> &mut Self {
        *self = Mat4::rotation_xyz(euler) * *self;
        self
    }

    fn rotate_xyzw(&mut self, q: &Quat) -> &mut Self {
        *self = Mat4::rotation_xyzw(q) * *self;
        self
    }

    fn translate_local_xz(&mut self, x: f32, z: f32) -> &mut Self {
        let height = self[(1, 3)];
        *self *= Mat4::new_translation(&Vec3::new(x, 0.0, z));
        self[(1, 3)] = height;
        self
    }
}
