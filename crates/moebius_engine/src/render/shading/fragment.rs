//! The stylised fragment program
//!
//! Order of operations per fragment:
//! normal smoothing (at the material's perturbation strength), Lambert brightness, colour zone, optional debug ramp,
//! colour jitter, hatching, and the final multiply towards black.

use crate::foundation::math::{Vec2, Vec3, Vec4};
use crate::render::material::MaterialConfig;
use crate::render::uniforms::FrameUniforms;

use super::color;
use super::hatching::{self, HatchInput};
use super::noise;
use super::smoothing::{self, Derivatives};

/// Interpolated inputs for one fragment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FragmentInput {
    /// Window coordinate of the pixel centre, origin bottom-left
    pub frag_coord: Vec2,
    /// Interpolated world-space normal (not necessarily unit length)
    pub normal: Vec3,
    /// Screen-space derivatives of `normal`
    pub normal_gradient: Derivatives,
    /// World-space position
    pub world_position: Vec3,
    /// Screen-space derivatives of `world_position`
    pub position_gradient: Derivatives,
    /// Position relative to the eye, in the frame of `normal`
    pub view_position: Vec3,
    /// Interpolated vertex-to-camera distance
    pub camera_distance: f32,
}

/// Result of shading one fragment
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadedFragment {
    /// Output RGBA, alpha always 1
    pub color: Vec4,
    /// Lighting brightness used for hatching
    pub brightness: f32,
    /// Hatch coverage in `[0, 1]`
    pub hatch: f32,
}

const JITTER_FREQUENCY: f32 = 0.5;
const JITTER_AMPLITUDE: f32 = 0.1;

/// Shade one fragment
///
/// Pure: identical inputs give bit-identical output.
pub fn shade_fragment(
    material: &MaterialConfig,
    uniforms: &FrameUniforms,
    input: &FragmentInput,
) -> ShadedFragment {
    let normal = smoothing::smooth_normal(input.normal, &input.normal_gradient, material.normal_perturbation);

    let brightness = normal.dot(&material.light_dir()).max(0.0) * material.brightness;
    let zone_brightness = (brightness * material.color_level).clamp(0.0, 1.0);

    let mut base = if material.debug_distance {
        Vec3::repeat(material.hatching.line_spacing(input.camera_distance) * 2.0)
    } else {
        color::resolve_zone_color(&material.zones, &material.adjust, zone_brightness)
    };

    let jitter = noise::simplex3(input.world_position * JITTER_FREQUENCY) * JITTER_AMPLITUDE;
    base.add_scalar_mut(jitter * material.color_smoothing);

    let hatch = hatching::apply_hatching(
        &material.hatching,
        &HatchInput {
            screen_pos: uniforms.screen_position(input.frag_coord),
            world_pos: input.world_position,
            brightness,
            camera_distance: input.camera_distance,
        },
    );

    let rgb = base * (1.0 - hatch);
    ShadedFragment {
        color: Vec4::new(rgb.x, rgb.y, rgb.z, 1.0),
        brightness,
        hatch,
    }
}
