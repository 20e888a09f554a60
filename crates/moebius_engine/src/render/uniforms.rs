//! Per-frame and per-material uniform data
//!
//! [`FrameUniforms`] is what the CPU programs read. The `*Block` types are the
//! std140 images of the same values for a GPU host; their layout matches the
//! uniform blocks declared by the exported shaders.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::{Mat4, Vec2, Vec3};
use crate::render::material::{MaterialConfig, SilhouetteConfig};

/// Values rewritten once per frame before the draw calls
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameUniforms {
    /// Seconds since the scene started
    pub time: f32,
    /// Camera position in world space
    pub camera_position: Vec3,
    /// Viewport size in pixels
    pub resolution: Vec2,
}

impl Default for FrameUniforms {
    fn default() -> Self {
        Self {
            time: 0.0,
            camera_position: Vec3::zeros(),
            resolution: Vec2::new(1.0, 1.0),
        }
    }
}

impl FrameUniforms {
    /// Map a fragment coordinate into the `0..100` range hatching works in
    ///
    /// A zero-sized axis is treated as one pixel wide.
    pub fn screen_position(&self, frag_coord: Vec2) -> Vec2 {
        let width = self.resolution.x.max(1.0);
        let height = self.resolution.y.max(1.0);
        Vec2::new(frag_coord.x / width, frag_coord.y / height) * 100.0
    }

    /// GPU image of these values
    pub fn to_block(&self) -> FrameUniformBlock {
        FrameUniformBlock {
            camera_position_time: [
                self.camera_position.x,
                self.camera_position.y,
                self.camera_position.z,
                self.time,
            ],
            resolution: [self.resolution.x, self.resolution.y, 0.0, 0.0],
        }
    }
}

/// std140 frame block (binding 0)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct FrameUniformBlock {
    /// Camera position (xyz) and elapsed time (w)
    pub camera_position_time: [f32; 4],
    /// Viewport resolution (xy), unused (zw)
    pub resolution: [f32; 4],
}

/// std140 material block (binding 1)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct MaterialUniformBlock {
    /// Base colour (rgb) and brightness multiplier (a)
    pub base_color_brightness: [f32; 4],
    /// Unit light direction (xyz) and colour level (w)
    pub light_direction_level: [f32; 4],
    /// threshold1, threshold2, blend width, hue shift
    pub zone_params: [f32; 4],
    /// Saturation multiplier, lightness multiplier, Fresnel power, artifact reduction
    pub adjust_params: [f32; 4],
    /// Normal perturbation, colour smoothing, debug flag (0/1), unused
    pub smoothing_params: [f32; 4],
}

impl MaterialUniformBlock {
    /// Pack a material
    pub fn from_config(material: &MaterialConfig) -> Self {
        let light = material.light_dir();
        Self {
            base_color_brightness: [
                material.base_color.x,
                material.base_color.y,
                material.base_color.z,
                material.brightness,
            ],
            light_direction_level: [light.x, light.y, light.z, material.color_level],
            zone_params: [
                material.zones.threshold1,
                material.zones.threshold2,
                material.zones.blend_width,
                material.adjust.hue_shift,
            ],
            adjust_params: [
                material.adjust.saturation_multiplier,
                material.adjust.lightness_multiplier,
                material.fresnel_power,
                material.artifact_reduction,
            ],
            smoothing_params: [
                material.normal_perturbation,
                material.color_smoothing,
                if material.debug_distance { 1.0 } else { 0.0 },
                0.0,
            ],
        }
    }
}

/// std140 outline block (binding 1 of the silhouette program)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct SilhouetteUniformBlock {
    /// Outline colour (rgb) and outline width (a)
    pub color_width: [f32; 4],
}

impl SilhouetteUniformBlock {
    /// Pack outline settings
    pub fn from_config(silhouette: &SilhouetteConfig) -> Self {
        Self {
            color_width: [
                silhouette.color.x,
                silhouette.color.y,
                silhouette.color.z,
                silhouette.outline_width,
            ],
        }
    }
}

/// Per-draw push constants shared by both mesh programs
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct DrawPushConstants {
    /// Model matrix, column-major
    pub model: [[f32; 4]; 4],
    /// Projection times view, column-major
    pub view_projection: [[f32; 4]; 4],
}

impl DrawPushConstants {
    /// Pack the two matrices
    pub fn new(model: &Mat4, view_projection: &Mat4) -> Self {
        Self {
            model: (*model).into(),
            view_projection: (*view_projection).into(),
        }
    }
}
