//! Gradient sky sphere
//!
//! A large sphere around the scene seen from inside. Its colour is a
//! three-stop HSL gradient on the height of the normalised world position,
//! with a little hash noise to break up banding.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Mat4, Transform, Vec2, Vec3, Vec4};
use crate::render::pipeline::PipelineConfig;
use crate::render::primitives::{Camera, Mesh, Vertex};
use crate::render::raster::{self, DrawStats, Fragment, Framebuffer, ShaderProgram, VertexOutput};
use crate::render::shading::Hsl;
use crate::render::RenderError;

/// Sky sphere parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyConfig {
    /// Sphere centre
    pub center: Vec3,
    /// Sphere radius
    pub radius: f32,
    /// Segments around and from pole to pole
    pub segments: u32,
    /// Colour at the bottom
    pub low: Hsl,
    /// Colour at `split`
    pub mid: Hsl,
    /// Colour towards the top
    pub high: Hsl,
    /// Height where the lower ramp hands over to the upper one
    pub split: f32,
    /// Peak-to-peak amplitude of the hash noise
    pub noise: f32,
}

impl Default for SkyConfig {
    fn default() -> Self {
        Self {
            center: Vec3::new(0.0, 0.0, -100.0),
            radius: 200.0,
            segments: 16,
            low: Hsl::new(0.0, 0.4, 0.6),
            mid: Hsl::new(30.0, 0.4, 0.8),
            high: Hsl::new(70.0, 0.4, 0.9),
            split: 0.2,
            noise: 0.02,
        }
    }
}

/// Cheap per-position hash in `[0, 1)`
fn hash(p: Vec2) -> f32 {
    utils::fract((p.dot(&Vec2::new(12.9898, 78.233))).sin() * 43758.5453)
}

/// Sky colour at a world position
///
/// Both ramps run at twice the rate of the height, so the upper one keeps
/// extrapolating past its last stop near the zenith.
pub fn sky_color(config: &SkyConfig, world_position: Vec3) -> Vec3 {
    let up = world_position.try_normalize(f32::EPSILON).map_or(0.0, |dir| dir.y);
    let height = (up + 1.0) * 0.5;

    let hsl = if height < config.split {
        config.low.mix(config.mid, height * 2.0)
    } else {
        config.mid.mix(config.high, (height - config.split) * 2.0)
    };

    let grain = hash(Vec2::new(world_position.x, world_position.z) * 0.1);
    hsl.to_rgb().add_scalar((grain - 0.5) * config.noise)
}

struct SkyProgram<'a> {
    config: &'a SkyConfig,
    model: Mat4,
    view_projection: Mat4,
}

impl ShaderProgram for SkyProgram<'_> {
    type Vertex = Vertex;
    type Varying = Vec3;

    fn vertex(&self, vertex: &Vertex) -> VertexOutput<Vec3> {
        let p = vertex.position();
        let world = self.model * Vec4::new(p.x, p.y, p.z, 1.0);
        VertexOutput {
            clip: self.view_projection * world,
            varying: world.xyz(),
        }
    }

    fn fragment(&self, fragment: &Fragment<Vec3>) -> Option<Vec4> {
        let rgb = sky_color(self.config, fragment.varying);
        Some(Vec4::new(rgb.x, rgb.y, rgb.z, 1.0))
    }
}

/// The sky sphere
#[derive(Debug, Clone)]
pub struct SkyDome {
    config: SkyConfig,
    mesh: Mesh,
    transform: Transform,
}

impl SkyDome {
    /// Build the sphere
    pub fn new(config: SkyConfig) -> Self {
        let segments = config.segments.max(3);
        let mesh = Mesh::uv_sphere(Vec3::zeros(), config.radius, segments, segments);
        let transform = Transform::from_position(config.center);
        Self {
            config,
            mesh,
            transform,
        }
    }

    /// Sky parameters
    pub fn config(&self) -> &SkyConfig {
        &self.config
    }

    /// Draw the inside of the sphere
    pub fn draw(&self, target: &mut Framebuffer, camera: &Camera) -> Result<DrawStats, RenderError> {
        let program = SkyProgram {
            config: &self.config,
            model: self.transform.to_matrix(),
            view_projection: camera.get_view_projection_matrix(),
        };
        raster::draw_indexed(target, &PipelineConfig::sky(), &program, &self.mesh.vertices, &self.mesh.indices)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quiet() -> SkyConfig {
        SkyConfig {
            noise: 0.0,
            ..SkyConfig::default()
        }
    }

    #[test]
    fn test_horizon_and_nadir_colours() {
        let config = quiet();
        // Straight down: height 0, pure low stop
        assert_relative_eq!(
            sky_color(&config, Vec3::new(0.0, -5.0, 0.0)),
            config.low.to_rgb(),
            epsilon = 1e-6
        );
        // Horizon: height 0.5, a 0.6 step along the upper ramp
        let expected = config.mid.mix(config.high, 0.6).to_rgb();
        assert_relative_eq!(sky_color(&config, Vec3::new(3.0, 0.0, 0.0)), expected, epsilon = 1e-6);
    }

    #[test]
    fn test_upper_ramp_extrapolates_at_zenith() {
        let config = quiet();
        let top = config.mid.mix(config.high, 1.6);
        assert_relative_eq!(top.h, 94.0, epsilon = 1e-4);
        assert_relative_eq!(sky_color(&config, Vec3::new(0.0, 1.0, 0.0)), top.to_rgb(), epsilon = 1e-6);
    }

    #[test]
    fn test_noise_is_small() {
        let config = SkyConfig::default();
        let clean = quiet();
        for i in 0..50 {
            let p = Vec3::new(i as f32 * 3.7, 10.0, i as f32 * -2.1);
            let diff = sky_color(&config, p) - sky_color(&clean, p);
            assert!(diff.amax() <= 0.01 + 1e-6);
        }
    }

    #[test]
    fn test_sky_fills_the_view_from_inside() {
        let sky = SkyDome::new(SkyConfig::default());
        let camera = Camera::default();
        let mut fb = Framebuffer::new(32, 24).unwrap();
        let stats = sky.draw(&mut fb, &camera).unwrap();
        assert!(stats.fragments_written >= 32 * 24);
        assert!(fb.pixels().all(|c| c.x > 0.3 && c.w == 1.0));
    }

    #[test]
    fn test_sky_leaves_no_pixel_uncovered() {
        let sky = SkyDome::new(SkyConfig::default());
        let magenta = Vec4::new(1.0, 0.0, 1.0, 1.0);
        for (width, height) in [(32, 24), (97, 61)] {
            let mut fb = Framebuffer::new(width, height).unwrap();
            fb.clear(magenta);
            sky.draw(&mut fb, &Camera::default()).unwrap();
            let holes = fb.pixels().filter(|c| *c == magenta).count();
            assert_eq!(holes, 0, "{width}x{height}");
        }
    }
}
