//! Screen-space normal smoothing
//!
//! Interpolated normals on a coarse mesh change abruptly across triangle
//! edges. These helpers read the per-pixel derivatives of the normal and pull
//! it back against the gradient, harder where the gradient is large.
//! They must run per fragment, after interpolation.

use crate::foundation::math::{utils, Vec3};

/// Subtraction weight applied only at detected face boundaries
const BOUNDARY_WEIGHT: f32 = 0.8;
/// Subtraction weight applied everywhere
const GENERAL_WEIGHT: f32 = 0.2;
/// Gradient magnitude at which a pixel counts as fully on a boundary
const BOUNDARY_SATURATION: f32 = 2.0;

/// Screen-space derivatives of a per-fragment quantity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derivatives {
    /// Change per pixel along +x
    pub dx: Vec3,
    /// Change per pixel along +y
    pub dy: Vec3,
}

impl Derivatives {
    /// Create a derivative pair
    pub const fn new(dx: Vec3, dy: Vec3) -> Self {
        Self { dx, dy }
    }

    /// No variation (flat surfaces, single-pixel primitives)
    pub fn zero() -> Self {
        Self::new(Vec3::zeros(), Vec3::zeros())
    }

    /// `|dx| + |dy|`
    pub fn magnitude(&self) -> f32 {
        self.dx.norm() + self.dy.norm()
    }
}

/// Normalise `v`, falling back to `fallback` and then +Y when it has no length
pub fn normalize_or(v: Vec3, fallback: Vec3) -> Vec3 {
    v.try_normalize(f32::EPSILON)
        .or_else(|| fallback.try_normalize(f32::EPSILON))
        .unwrap_or_else(Vec3::y)
}

/// Blur `normal` against its screen-space gradient
///
/// Always returns a unit vector.
pub fn smooth_normal(normal: Vec3, gradient: &Derivatives, strength: f32) -> Vec3 {
    let boundary = utils::smoothstep(0.0, BOUNDARY_SATURATION, gradient.magnitude());
    let sum = gradient.dx + gradient.dy;

    let blurred = normal
        - sum * (boundary * strength * BOUNDARY_WEIGHT)
        - sum * (strength * GENERAL_WEIGHT);

    normalize_or(blurred, normal)
}

/// Inputs to [`artifact_factor`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtifactInput {
    /// Surface normal
    pub normal: Vec3,
    /// Normal derivatives
    pub normal_gradient: Derivatives,
    /// World-position derivatives
    pub position_gradient: Derivatives,
    /// Fragment position relative to the eye, in the same frame as `normal`
    pub view_position: Vec3,
}

/// Estimate how likely this fragment sits on a faceting artifact
///
/// Combines normal variation, a small share of position variation, and a
/// Fresnel rim term. Result is in `[0, reduction]`.
pub fn artifact_factor(input: &ArtifactInput, fresnel_power: f32, reduction: f32) -> f32 {
    let normal_variation = input.normal_gradient.magnitude();
    let position_variation = input.position_gradient.magnitude();

    let view_dir = normalize_or(-input.view_position, Vec3::z());
    let facing = view_dir.dot(&input.normal).abs().min(1.0);
    let fresnel = (1.0 - facing).powf(fresnel_power);

    let combined = normal_variation + position_variation * 0.05 + fresnel * 0.2;
    utils::smoothstep(0.1, 0.5, combined) * reduction
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_flat_gradient_keeps_normal() {
        let n = Vec3::new(0.3, 0.8, -0.2).normalize();
        assert_relative_eq!(smooth_normal(n, &Derivatives::zero(), 1.5), n, epsilon = 1e-6);
    }

    #[test]
    fn test_output_is_unit_length() {
        let n = Vec3::new(0.0, 0.0, 1.0);
        let gradient = Derivatives::new(Vec3::new(0.4, 0.1, 0.0), Vec3::new(-0.2, 0.3, 0.05));
        for strength in [0.0, 0.5, 1.5, 4.0] {
            assert_relative_eq!(smooth_normal(n, &gradient, strength).norm(), 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_pulls_against_gradient() {
        let n = Vec3::z();
        let gradient = Derivatives::new(Vec3::new(0.5, 0.0, 0.0), Vec3::zeros());
        let smoothed = smooth_normal(n, &gradient, 1.0);
        assert!(smoothed.x < 0.0);
    }

    #[test]
    fn test_boundary_subtracts_more_than_interior() {
        // A long input normal keeps the tilt roughly linear in the subtraction
        let n = Vec3::z() * 100.0;
        let soft = Derivatives::new(Vec3::new(0.05, 0.0, 0.0), Vec3::zeros());
        let hard = Derivatives::new(Vec3::new(1.5, 0.0, 0.0), Vec3::zeros());
        let soft_tilt = -smooth_normal(n, &soft, 1.0).x / 0.05;
        let hard_tilt = -smooth_normal(n, &hard, 1.0).x / 1.5;
        assert!(hard_tilt > 2.0 * soft_tilt, "{hard_tilt} vs {soft_tilt}");
    }

    #[test]
    fn test_degenerate_normal_falls_back() {
        assert_eq!(normalize_or(Vec3::zeros(), Vec3::zeros()), Vec3::y());
        assert_eq!(normalize_or(Vec3::zeros(), Vec3::new(0.0, 0.0, 2.0)), Vec3::z());
        let cancelled = smooth_normal(
            Vec3::new(0.2, 0.0, 0.0),
            &Derivatives::new(Vec3::new(0.2, 0.0, 0.0), Vec3::zeros()),
            1.0 / (0.8 * utils::smoothstep(0.0, 2.0, 0.2) + 0.2),
        );
        assert_relative_eq!(cancelled.norm(), 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_artifact_factor_bounds() {
        let facing = ArtifactInput {
            normal: Vec3::z(),
            normal_gradient: Derivatives::zero(),
            position_gradient: Derivatives::zero(),
            view_position: Vec3::new(0.0, 0.0, -10.0),
        };
        assert_eq!(artifact_factor(&facing, 2.0, 0.5), 0.0);

        let edge_on = ArtifactInput {
            normal: Vec3::x(),
            normal_gradient: Derivatives::new(Vec3::new(1.0, 0.0, 0.0), Vec3::zeros()),
            ..facing
        };
        assert_relative_eq!(artifact_factor(&edge_on, 2.0, 0.5), 0.5);
    }
}
