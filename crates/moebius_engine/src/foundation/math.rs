//! Math utilities and types
//!
//! Provides the vector/matrix aliases used across the renderer plus the small
//! set of GLSL-flavoured scalar helpers (`smoothstep`, `step`, `fract`, `mix`)
//! that the shading stages are written in terms of.

pub use nalgebra::{
    Vector2, Vector3, Vector4,
    Matrix3, Matrix4,
    Quaternion,
    Unit,
};

/// 2D vector type
pub type Vec2 = Vector2<f32>;

/// 3D vector type
pub type Vec3 = Vector3<f32>;

/// 4D vector type
pub type Vec4 = Vector4<f32>;

/// 3x3 matrix type
pub type Mat3 = Matrix3<f32>;

/// 4x4 matrix type
pub type Mat4 = Matrix4<f32>;

/// 3D point type
pub type Point3 = nalgebra::Point3<f32>;

/// Quaternion type for rotations
pub type Quat = Unit<Quaternion<f32>>;

/// Transform representing position, rotation, and scale
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    /// Position in 3D space
    pub position: Vec3,

    /// Rotation quaternion
    pub rotation: Quat,

    /// Scale factors
    pub scale: Vec3,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Quat::identity(),
            scale: Vec3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    /// Create a new identity transform
    pub fn identity() -> Self {
        Self::default()
    }

    /// Create a transform with only position
    pub fn from_position(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Create a transform with position and uniform scale
    pub fn from_position_scale(position: Vec3, scale: f32) -> Self {
        Self {
            position,
            scale: Vec3::new(scale, scale, scale),
            ..Default::default()
        }
    }

    /// Rotate about the local Y axis (the equivalent of `Object3D.rotateY`)
    pub fn rotate_local_y(&mut self, angle: f32) {
        let delta = Quat::from_axis_angle(&Vec3::y_axis(), angle);
        self.rotation = self.rotation * delta;
    }

    /// Convert to a transformation matrix
    pub fn to_matrix(&self) -> Mat4 {
        Mat4::new_translation(&self.position)
            * self.rotation.to_homogeneous()
            * Mat4::new_nonuniform_scaling(&self.scale)
    }

    /// Matrix for transforming normals (inverse transpose of the upper 3x3)
    pub fn normal_matrix(&self) -> Mat3 {
        normal_matrix(&self.to_matrix())
    }

    /// Apply this transform to a point
    pub fn transform_point(&self, point: Point3) -> Point3 {
        self.to_matrix().transform_point(&point)
    }

    /// Largest scale component, used for bounding-sphere radii
    pub fn max_scale(&self) -> f32 {
        self.scale.x.abs().max(self.scale.y.abs()).max(self.scale.z.abs())
    }
}

/// Inverse transpose of the linear part of `model`.
///
/// Falls back to the plain linear part when the matrix is singular.
pub fn normal_matrix(model: &Mat4) -> Mat3 {
    let linear: Mat3 = model.fixed_view::<3, 3>(0, 0).into_owned();
    linear
        .try_inverse()
        .map_or(linear, |inverse| inverse.transpose())
}

/// Math constants
pub mod constants {
    /// Pi constant
    pub const PI: f32 = std::f32::consts::PI;

    /// Degrees to radians conversion factor
    pub const DEG_TO_RAD: f32 = PI / 180.0;
}

/// Scalar helpers with GLSL semantics
pub mod utils {
    use super::constants;

    /// Convert degrees to radians
    pub fn deg_to_rad(degrees: f32) -> f32 {
        degrees * constants::DEG_TO_RAD
    }

    /// Linear interpolation (`mix` in GLSL)
    pub fn mix(a: f32, b: f32, t: f32) -> f32 {
        a + (b - a) * t
    }

    /// Cubic Hermite step: zero slope at both edges
    pub fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
        let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
        t * t * (3.0 - 2.0 * t)
    }

    /// Antialiased edge centred on `edge` with half-width `width`
    pub fn smoothstep_aa(edge: f32, x: f32, width: f32) -> f32 {
        smoothstep(edge - width, edge + width, x)
    }

    /// GLSL `step`: 0.0 when `x < edge`, else 1.0
    pub fn step(edge: f32, x: f32) -> f32 {
        if x < edge { 0.0 } else { 1.0 }
    }

    /// Fractional part, always in `[0, 1)`
    pub fn fract(x: f32) -> f32 {
        x - x.floor()
    }

    /// GLSL `mod`: result takes the sign of `y`
    pub fn glsl_mod(x: f32, y: f32) -> f32 {
        x - y * (x / y).floor()
    }
}

/// Extension trait for Mat4 with camera-matrix constructors
///
/// Conventions: right-handed, Y-up view space looking down -Z, clip depth in
/// `[0, 1]` after the perspective divide.
pub trait Mat4Ext {
    /// Create a rotation matrix around the Y axis
    fn rotation_y(angle: f32) -> Mat4;

    /// Create a perspective projection matrix
    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4;

    /// Create a look-at view matrix
    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4;
}

impl Mat4Ext for Mat4 {
    fn rotation_y(angle: f32) -> Mat4 {
        Mat4::from_axis_angle(&Vec3::y_axis(), angle)
    }

    fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
        let tan_half_fovy = (fov_y * 0.5).tan();

        let mut result = Mat4::zeros();

        // P = [1/(a·t)  0     0            0          ]
        //     [0        1/t   0            0          ]
        //     [0        0     f/(n-f)      n·f/(n-f)  ]
        //     [0        0    -1            0          ]
        result[(0, 0)] = 1.0 / (aspect * tan_half_fovy);
        result[(1, 1)] = 1.0 / tan_half_fovy;
        result[(2, 2)] = far / (near - far);
        result[(2, 3)] = (near * far) / (near - far);
        result[(3, 2)] = -1.0;

        result
    }

    fn look_at(eye: Vec3, target: Vec3, up: Vec3) -> Mat4 {
        let forward = (target - eye).normalize();
        let right = forward.cross(&up).normalize();
        let camera_up = right.cross(&forward);

        let translation = Mat4::new_translation(&-eye);

        let rotation = Mat4::new(
            right.x, right.y, right.z, 0.0,
            camera_up.x, camera_up.y, camera_up.z, 0.0,
            -forward.x, -forward.y, -forward.z, 0.0,
            0.0, 0.0, 0.0, 1.0,
        );

        rotation * translation
    }
}

#[cfg(test)]
mod tests {
    use super::utils::*;
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_smoothstep_edges_and_midpoint() {
        assert_eq!(smoothstep(0.0, 1.0, -1.0), 0.0);
        assert_eq!(smoothstep(0.0, 1.0, 2.0), 1.0);
        assert_relative_eq!(smoothstep(0.2, 0.4, 0.3), 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_step_matches_glsl() {
        assert_eq!(step(0.5, 0.5), 1.0);
        assert_eq!(step(0.5, 0.49), 0.0);
    }

    #[test]
    fn test_glsl_mod_is_positive_for_negative_input() {
        assert_relative_eq!(glsl_mod(-30.0, 360.0), 330.0);
        assert_relative_eq!(fract(-0.25), 0.75);
    }

    #[test]
    fn test_perspective_maps_near_far_to_unit_depth() {
        let proj = Mat4::perspective(deg_to_rad(90.0), 1.0, 0.5, 10.0);
        let near = proj * Vec4::new(0.0, 0.0, -0.5, 1.0);
        let far = proj * Vec4::new(0.0, 0.0, -10.0, 1.0);
        assert_relative_eq!(near.z / near.w, 0.0, epsilon = 1e-5);
        assert_relative_eq!(far.z / far.w, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_look_at_places_target_on_negative_z() {
        let view = Mat4::look_at(Vec3::new(0.0, 0.0, 5.0), Vec3::zeros(), Vec3::y());
        let target = view.transform_point(&Point3::origin());
        assert_relative_eq!(target.z, -5.0, epsilon = 1e-5);
        assert_relative_eq!(target.x, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_rotate_local_y_accumulates() {
        let mut transform = Transform::identity();
        transform.rotate_local_y(constants::PI * 0.25);
        transform.rotate_local_y(constants::PI * 0.25);
        let rotated = transform.rotation * Vec3::x();
        assert_relative_eq!(rotated, Vec3::new(0.0, 0.0, -1.0), epsilon = 1e-5);
    }
}
