//! Star field
//!
//! Stars sit on a spherical shell between `radius` and `radius + depth`,
//! walking inward as they are generated. Each gets a hue from its index and
//! a random size. Sprites grow with proximity and all twinkle together with
//! the scaled scene time.

use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::foundation::math::{Vec3, Vec4};
use crate::render::pipeline::PipelineConfig;
use crate::render::primitives::Camera;
use crate::render::raster::{self, DrawStats, Framebuffer, PointShape, PointSprite};
use crate::render::shading::Hsl;

/// Star field parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StarFieldConfig {
    /// Inner radius of the shell
    pub radius: f32,
    /// Shell thickness
    pub depth: f32,
    /// Number of stars
    pub count: u32,
    /// Size multiplier
    pub factor: f32,
    /// Colour saturation
    pub saturation: f32,
    /// Soft round sprites instead of squares
    pub fade: bool,
    /// Twinkle speed
    pub speed: f32,
}

impl Default for StarFieldConfig {
    fn default() -> Self {
        Self {
            radius: 100.0,
            depth: 50.0,
            count: 1500,
            factor: 4.0,
            saturation: 0.0,
            fade: true,
            speed: 0.5,
        }
    }
}

/// One star
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Star {
    /// World position
    pub position: Vec3,
    /// RGB colour
    pub color: Vec3,
    /// Base sprite size
    pub size: f32,
}

/// Edge fall-off of faded stars
const FADE: PointShape = PointShape::SoftDisc {
    sharpness: 16.0,
    radius: 0.25,
};

/// Generated stars plus their settings
#[derive(Debug, Clone, PartialEq)]
pub struct StarField {
    config: StarFieldConfig,
    stars: Vec<Star>,
}

impl StarField {
    /// Generate the field
    pub fn new(config: StarFieldConfig, rng: &mut StdRng) -> Self {
        let count = config.count;
        let step = if count > 0 { config.depth / count as f32 } else { 0.0 };
        let mut r = config.radius + config.depth;

        let stars = (0..count)
            .map(|i| {
                r -= step * rng.gen::<f32>();
                let polar = (1.0 - 2.0 * rng.gen::<f32>()).clamp(-1.0, 1.0).acos();
                let azimuth = std::f32::consts::TAU * rng.gen::<f32>();
                let position = Vec3::new(
                    r * polar.sin() * azimuth.sin(),
                    r * polar.cos(),
                    r * polar.sin() * azimuth.cos(),
                );
                let color = Hsl::new(i as f32 / count as f32 * 360.0, config.saturation, 0.9).to_rgb();
                let size = (0.5 + 0.5 * rng.gen::<f32>()) * config.factor;
                Star { position, color, size }
            })
            .collect();

        log::debug!("Generated {count} stars");
        Self { config, stars }
    }

    /// Star parameters
    pub fn config(&self) -> &StarFieldConfig {
        &self.config
    }

    /// Generated stars
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Shared twinkle factor at scene time `elapsed`
    pub fn twinkle(&self, elapsed: f32) -> f32 {
        3.0 + (elapsed * self.config.speed + 100.0).sin()
    }

    /// Point sprites for this frame
    pub fn sprites(&self, camera: &Camera, elapsed: f32) -> Vec<PointSprite> {
        let view = camera.get_view_matrix();
        let projection = camera.get_projection_matrix();
        let twinkle = self.twinkle(elapsed);
        let shape = if self.config.fade { FADE } else { PointShape::Square };

        self.stars
            .iter()
            .map(|star| {
                let p = star.position;
                let view_pos = view * Vec4::new(p.x, p.y, p.z, 1.0);
                let depth = -view_pos.z;
                let size = if depth > 0.0 { star.size * (30.0 / depth) * twinkle } else { 0.0 };
                PointSprite {
                    clip: projection * view_pos,
                    size,
                    color: Vec4::new(star.color.x, star.color.y, star.color.z, 1.0),
                    shape,
                }
            })
            .collect()
    }

    /// Draw with additive blending, without writing depth
    pub fn draw(&self, target: &mut Framebuffer, camera: &Camera, elapsed: f32) -> DrawStats {
        raster::draw_points(target, &PipelineConfig::stars(), &self.sprites(camera, elapsed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use rand::SeedableRng;

    fn field(seed: u64) -> StarField {
        StarField::new(StarFieldConfig::default(), &mut StdRng::seed_from_u64(seed))
    }

    #[test]
    fn test_same_seed_same_sky() {
        assert_eq!(field(3), field(3));
        assert_ne!(field(3), field(4));
    }

    #[test]
    fn test_stars_stay_on_the_shell() {
        let stars = field(11);
        assert_eq!(stars.stars().len(), 1500);
        for star in stars.stars() {
            let r = star.position.norm();
            assert!((100.0 - 1e-3..=150.0 + 1e-3).contains(&r), "radius {r}");
            assert!((2.0..=4.0).contains(&star.size));
        }
    }

    #[test]
    fn test_unsaturated_stars_are_light_grey() {
        let stars = field(1);
        for star in stars.stars() {
            assert_relative_eq!(star.color, Vec3::repeat(0.9), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_hue_follows_index() {
        let config = StarFieldConfig {
            count: 4,
            saturation: 1.0,
            ..StarFieldConfig::default()
        };
        let stars = StarField::new(config, &mut StdRng::seed_from_u64(0));
        // Index 0 is red, index 2 is cyan
        assert!(stars.stars()[0].color.x > stars.stars()[0].color.z);
        assert!(stars.stars()[2].color.z > stars.stars()[2].color.x);
    }

    #[test]
    fn test_twinkle_scales_every_sprite_together() {
        let stars = field(5);
        let camera = Camera::default();
        let a = stars.sprites(&camera, 0.0);
        let b = stars.sprites(&camera, 2.0);
        let ratio = stars.twinkle(2.0) / stars.twinkle(0.0);
        for (a, b) in a.iter().zip(&b).filter(|(a, _)| a.size > 0.0) {
            assert_relative_eq!(b.size / a.size, ratio, epsilon = 1e-4);
        }
    }

    #[test]
    fn test_empty_field() {
        let config = StarFieldConfig {
            count: 0,
            ..StarFieldConfig::default()
        };
        let stars = StarField::new(config, &mut StdRng::seed_from_u64(0));
        let mut fb = Framebuffer::new(4, 4).unwrap();
        assert_eq!(stars.draw(&mut fb, &Camera::default(), 1.0), DrawStats::default());
    }
}
