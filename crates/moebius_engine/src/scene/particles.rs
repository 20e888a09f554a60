//! Floating dust particles
//!
//! A handful of tiny translucent dots scattered through a cube around the
//! origin. The group slowly tumbles while it is in view.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::foundation::math::{Quat, Vec3, Vec4};
use crate::render::pipeline::PipelineConfig;
use crate::render::primitives::{Camera, Frustum};
use crate::render::raster::{self, DrawStats, Framebuffer, PointShape, PointSprite};
use crate::render::shading::color;

/// Particle parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParticleConfig {
    /// Number of particles
    pub count: u32,
    /// Side of the cube they are scattered in
    pub spread: f32,
    /// World-space point size
    pub size: f32,
    /// Particle colour
    #[serde(with = "color::hex_rgb")]
    pub color: Vec3,
    /// Particle opacity
    pub opacity: f32,
    /// Radians added per frame about X
    pub spin_x: f32,
    /// Radians added per frame about Y
    pub spin_y: f32,
}

impl Default for ParticleConfig {
    fn default() -> Self {
        Self {
            count: 30,
            spread: 100.0,
            size: 0.01,
            color: Vec3::new(74.0, 60.0, 42.0) / 255.0,
            opacity: 0.8,
            spin_x: 0.0005,
            spin_y: 0.001,
        }
    }
}

/// The particle group
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleField {
    config: ParticleConfig,
    positions: Vec<Vec3>,
    angle_x: f32,
    angle_y: f32,
}

impl ParticleField {
    /// Scatter the particles
    pub fn new(config: ParticleConfig, rng: &mut StdRng) -> Self {
        let positions = (0..config.count)
            .map(|_| {
                Vec3::new(
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                    rng.gen::<f32>() - 0.5,
                ) * config.spread
            })
            .collect();
        Self {
            config,
            positions,
            angle_x: 0.0,
            angle_y: 0.0,
        }
    }

    /// Particle parameters
    pub fn config(&self) -> &ParticleConfig {
        &self.config
    }

    /// Object-space positions
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Accumulated rotation angles (x, y)
    pub fn angles(&self) -> (f32, f32) {
        (self.angle_x, self.angle_y)
    }

    /// Group rotation, X applied after Y
    pub fn rotation(&self) -> Quat {
        Quat::from_axis_angle(&Vec3::x_axis(), self.angle_x) * Quat::from_axis_angle(&Vec3::y_axis(), self.angle_y)
    }

    /// Bounding sphere around the origin; rotation does not move it
    pub fn bounds(&self) -> (Vec3, f32) {
        let radius = self.positions.iter().map(|p| p.norm()).fold(0.0, f32::max);
        (Vec3::zeros(), radius)
    }

    /// Advance one frame; returns whether the group was visible and spun
    pub fn update(&mut self, frustum: &Frustum) -> bool {
        let (center, radius) = self.bounds();
        if self.positions.is_empty() || !frustum.intersects_sphere(center, radius) {
            return false;
        }
        self.angle_x += self.config.spin_x;
        self.angle_y += self.config.spin_y;
        true
    }

    /// Point sprites for this frame; size attenuates with view depth
    pub fn sprites(&self, camera: &Camera, viewport_height: f32) -> Vec<PointSprite> {
        let view = camera.get_view_matrix();
        let projection = camera.get_projection_matrix();
        let rotation = self.rotation();
        let scale = viewport_height * 0.5;
        let c = self.config.color;

        self.positions
            .iter()
            .map(|&p| {
                let world = rotation * p;
                let view_pos = view * Vec4::new(world.x, world.y, world.z, 1.0);
                let depth = -view_pos.z;
                let size = if depth > 0.0 { self.config.size * scale / depth } else { 0.0 };
                PointSprite {
                    clip: projection * view_pos,
                    size,
                    color: Vec4::new(c.x, c.y, c.z, self.config.opacity),
                    shape: PointShape::Square,
                }
            })
            .collect()
    }

    /// Draw translucent dots without writing depth
    pub fn draw(&self, target: &mut Framebuffer, camera: &Camera) -> DrawStats {
        let sprites = self.sprites(camera, target.height() as f32);
        raster::draw_points(target, &PipelineConfig::particles(), &sprites)
    }
}
