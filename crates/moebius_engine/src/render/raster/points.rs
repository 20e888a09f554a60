//! Screen-aligned point sprites

use crate::foundation::math::{Vec2, Vec4};
use crate::render::pipeline::{DepthState, PipelineConfig};

use super::framebuffer::Framebuffer;
use super::rasterizer::DrawStats;

/// Coverage shape of a sprite
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointShape {
    /// Fully covered square
    Square,
    /// Disc whose alpha falls off as `1 / (1 + exp(sharpness * (r - radius)))`,
    /// with `r` measured from the centre in units of the sprite size
    SoftDisc {
        /// Fall-off steepness
        sharpness: f32,
        /// Radius at half coverage
        radius: f32,
    },
}

impl PointShape {
    /// Coverage at a point coordinate in `[0, 1]²`
    pub fn coverage(self, point_coord: Vec2) -> f32 {
        match self {
            PointShape::Square => 1.0,
            PointShape::SoftDisc { sharpness, radius } => {
                let r = (point_coord - Vec2::repeat(0.5)).norm();
                1.0 / (1.0 + (sharpness * (r - radius)).exp())
            }
        }
    }
}

/// One point primitive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointSprite {
    /// Clip-space centre
    pub clip: Vec4,
    /// Diameter in pixels; anything under one pixel is drawn as one pixel
    pub size: f32,
    /// RGB plus opacity
    pub color: Vec4,
    /// Coverage shape
    pub shape: PointShape,
}

/// Smallest alpha that is still written
const MIN_ALPHA: f32 = 1.0 / 255.0;

/// Draw point sprites
///
/// Points in front of the near plane or past the far plane are dropped
/// whole, like a GPU does.
pub fn draw_points(target: &mut Framebuffer, pipeline: &PipelineConfig, sprites: &[PointSprite]) -> DrawStats {
    let (width, height) = (target.width() as f32, target.height() as f32);
    let mut stats = DrawStats::default();

    for sprite in sprites {
        if sprite.clip.z < 0.0 || sprite.clip.w <= 0.0 {
            stats.triangles_clipped += 1;
            continue;
        }
        let ndc = sprite.clip.xyz() / sprite.clip.w;
        if ndc.z > 1.0 || !ndc.iter().all(|v| v.is_finite()) {
            stats.triangles_clipped += 1;
            continue;
        }

        let center = Vec2::new((ndc.x + 1.0) * 0.5 * width, (ndc.y + 1.0) * 0.5 * height);
        let size = if sprite.size.is_finite() { sprite.size.max(1.0) } else { 1.0 };
        let origin = center - Vec2::repeat(size * 0.5);

        let x0 = origin.x.round().max(0.0) as u32;
        let y0 = origin.y.round().max(0.0) as u32;
        let x1 = ((origin.x + size).round().max(0.0) as u32).min(target.width());
        let y1 = ((origin.y + size).round().max(0.0) as u32).min(target.height());

        for y in y0..y1 {
            for x in x0..x1 {
                if pipeline.depth.contains(DepthState::TEST)
                    && target.depth_at(x, y).is_some_and(|stored| ndc.z > stored)
                {
                    continue;
                }

                let pixel = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);
                let point_coord = (pixel - origin) / size;
                let alpha = sprite.color.w * sprite.shape.coverage(point_coord);
                stats.fragments_shaded += 1;
                if alpha < MIN_ALPHA {
                    continue;
                }

                let src = [sprite.color.x, sprite.color.y, sprite.color.z, alpha];
                if let Some(dst) = target.color_mut(x, y) {
                    *dst = pipeline.blend_mode.blend(src, *dst);
                    stats.fragments_written += 1;
                }
                if pipeline.depth.contains(DepthState::WRITE) {
                    if let Some(stored) = target.depth_mut(x, y) {
                        *stored = ndc.z;
                    }
                }
            }
        }
    }

    log::trace!("{:?} points: {:?}", pipeline.pipeline_type, stats);
    stats
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sprite(clip: Vec4, size: f32) -> PointSprite {
        PointSprite {
            clip,
            size,
            color: Vec4::new(1.0, 1.0, 1.0, 1.0),
            shape: PointShape::Square,
        }
    }

    #[test]
    fn test_tiny_point_still_covers_one_pixel() {
        let mut fb = Framebuffer::new(9, 9).unwrap();
        let stats = draw_points(&mut fb, &PipelineConfig::particles(), &[sprite(Vec4::new(0.0, 0.0, 0.5, 1.0), 0.01)]);
        assert_eq!(stats.fragments_written, 1);
        assert!(fb.color_at(4, 4).unwrap().x > 0.0);
    }

    #[test]
    fn test_square_size_in_pixels() {
        let mut fb = Framebuffer::new(16, 16).unwrap();
        let stats = draw_points(&mut fb, &PipelineConfig::stars(), &[sprite(Vec4::new(0.0, 0.0, 0.5, 1.0), 4.0)]);
        assert_eq!(stats.fragments_written, 16);
    }

    #[test]
    fn test_points_behind_geometry_are_hidden() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                if let Some(depth) = fb.depth_mut(x, y) {
                    *depth = 0.3;
                }
            }
        }
        let stats = draw_points(&mut fb, &PipelineConfig::stars(), &[sprite(Vec4::new(0.0, 0.0, 0.9, 1.0), 2.0)]);
        assert_eq!(stats.fragments_written, 0);
    }

    #[test]
    fn test_clipped_points_are_dropped() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        let sprites = [
            sprite(Vec4::new(0.0, 0.0, -0.1, 1.0), 2.0),
            sprite(Vec4::new(0.0, 0.0, 2.0, 1.0), 2.0),
        ];
        let stats = draw_points(&mut fb, &PipelineConfig::stars(), &sprites);
        assert_eq!(stats.triangles_clipped, 2);
        assert_eq!(stats.fragments_written, 0);
    }

    #[test]
    fn test_soft_disc_fades_outwards() {
        let shape = PointShape::SoftDisc {
            sharpness: 16.0,
            radius: 0.25,
        };
        let centre = shape.coverage(Vec2::repeat(0.5));
        let edge = shape.coverage(Vec2::new(0.75, 0.5));
        let corner = shape.coverage(Vec2::zeros());
        assert!(centre > 0.95);
        assert!((edge - 0.5).abs() < 1e-6);
        assert!(corner < 0.05);
    }
}
