//! Triangle rasterization
//!
//! Conventions:
//! - clip space is `[-w, w]` in x/y and `[0, w]` in z; anything with `z < 0`
//!   is in front of the near plane and gets clipped away, as does anything
//!   beyond a guard band of twice the viewport on each side,
//! - window coordinates have their origin at the bottom-left and pixels are
//!   sampled at their centres,
//! - counter-clockwise triangles in window space are front facing,
//! - the depth test is `LessEqual`,
//! - varyings are interpolated perspective-correctly.
//!
//! Fragment programs also receive the change of every varying one pixel to
//! the right and one pixel up, evaluated on the same triangle's plane. That
//! is the CPU counterpart of `dFdx`/`dFdy`.

use std::ops::AddAssign;

use crate::foundation::math::{Vec2, Vec4};
use crate::render::pipeline::{DepthState, PipelineConfig};
use crate::render::RenderError;

use super::framebuffer::Framebuffer;
use super::varying::Varying;

/// Output of a vertex program
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexOutput<V> {
    /// Clip-space position
    pub clip: Vec4,
    /// Values to interpolate
    pub varying: V,
}

/// Input of a fragment program
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fragment<V> {
    /// Window coordinate of the pixel centre
    pub frag_coord: Vec2,
    /// Depth in `[0, 1]`
    pub depth: f32,
    /// Whether the primitive is counter-clockwise on screen
    pub front_facing: bool,
    /// Interpolated varyings
    pub varying: V,
    /// Change of the varyings one pixel to the right
    pub ddx: V,
    /// Change of the varyings one pixel up
    pub ddy: V,
}

/// A vertex + fragment program pair
pub trait ShaderProgram {
    /// Per-vertex input
    type Vertex;
    /// Interpolated data
    type Varying: Varying;

    /// Transform one vertex
    fn vertex(&self, vertex: &Self::Vertex) -> VertexOutput<Self::Varying>;

    /// Shade one fragment; `None` discards it
    fn fragment(&self, fragment: &Fragment<Self::Varying>) -> Option<Vec4>;
}

/// Counters for one or more draws
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrawStats {
    /// Triangles handed to the rasterizer
    pub triangles_submitted: usize,
    /// Triangles entirely outside the near plane or guard band, or with no area
    pub triangles_clipped: usize,
    /// Triangles dropped by face culling
    pub triangles_culled: usize,
    /// Fragments that passed the depth test and ran the fragment program
    pub fragments_shaded: usize,
    /// Fragments whose colour reached the target
    pub fragments_written: usize,
}

impl AddAssign for DrawStats {
    fn add_assign(&mut self, rhs: Self) {
        self.triangles_submitted += rhs.triangles_submitted;
        self.triangles_clipped += rhs.triangles_clipped;
        self.triangles_culled += rhs.triangles_culled;
        self.fragments_shaded += rhs.fragments_shaded;
        self.fragments_written += rhs.fragments_written;
    }
}

#[derive(Clone, Copy)]
struct ScreenVertex<V> {
    pos: Vec2,
    depth: f32,
    inv_w: f32,
    varying: V,
}

fn edge(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x)
}

/// Fill-rule ownership of an edge whose function is exactly zero
///
/// Antisymmetric in the edge direction, so a shared edge is drawn by exactly
/// one of its two triangles.
fn owns_edge(a: Vec2, b: Vec2) -> bool {
    let d = b - a;
    d.y < 0.0 || (d.y == 0.0 && d.x > 0.0)
}

/// Half-extent of the guard band in NDC units
///
/// Polygons are clipped to `|x|, |y| <= GUARD_BAND * w` as well as to the near
/// plane, so window coordinates stay within a few viewports of the target and
/// the f32 edge functions keep sub-pixel precision.
const GUARD_BAND: f32 = 2.0;

/// Signed distances to the clip planes: near, then the four guard-band sides
fn plane_distances(clip: &Vec4) -> [f32; 5] {
    let band = GUARD_BAND * clip.w;
    [clip.z, band - clip.x, band + clip.x, band - clip.y, band + clip.y]
}

/// Sutherland-Hodgman against one plane
///
/// New vertices are interpolated from the inside end of the edge, so an edge
/// shared by two triangles is cut at the same point in both.
fn clip_against<V: Varying>(polygon: &[VertexOutput<V>], plane: usize) -> Vec<VertexOutput<V>> {
    let mut out = Vec::with_capacity(polygon.len() + 1);
    for (i, &a) in polygon.iter().enumerate() {
        let b = polygon[(i + 1) % polygon.len()];
        let (da, db) = (plane_distances(&a.clip)[plane], plane_distances(&b.clip)[plane]);
        if da >= 0.0 {
            out.push(a);
        }
        if (da >= 0.0) != (db >= 0.0) {
            let (inside, outside, d_in, d_out) = if da >= 0.0 { (a, b, da, db) } else { (b, a, db, da) };
            let t = d_in / (d_in - d_out);
            out.push(VertexOutput {
                clip: inside.clip.lerp(&outside.clip, t),
                varying: V::lerp(inside.varying, outside.varying, t),
            });
        }
    }
    out
}

/// Clip a triangle to the near plane and the guard band
fn clip_triangle<V: Varying>(triangle: [VertexOutput<V>; 3]) -> Vec<VertexOutput<V>> {
    let mut polygon = triangle.to_vec();
    for plane in 0..5 {
        if polygon.len() < 3 {
            break;
        }
        polygon = clip_against(&polygon, plane);
    }
    polygon
}

fn to_screen<V: Varying>(vertex: &VertexOutput<V>, width: f32, height: f32) -> ScreenVertex<V> {
    let inv_w = 1.0 / vertex.clip.w;
    let ndc = vertex.clip.xyz() * inv_w;
    ScreenVertex {
        pos: Vec2::new((ndc.x + 1.0) * 0.5 * width, (ndc.y + 1.0) * 0.5 * height),
        depth: ndc.z,
        inv_w,
        varying: vertex.varying,
    }
}

struct ScreenTriangle<V> {
    v: [ScreenVertex<V>; 3],
    area: f32,
}

impl<V: Varying> ScreenTriangle<V> {
    /// Screen-space barycentrics of `p`
    fn barycentric(&self, p: Vec2) -> [f32; 3] {
        let [a, b, c] = &self.v;
        [
            edge(b.pos, c.pos, p) / self.area,
            edge(c.pos, a.pos, p) / self.area,
            edge(a.pos, b.pos, p) / self.area,
        ]
    }

    /// Perspective-correct varying at `p`; `None` past the horizon
    fn varying_at(&self, p: Vec2) -> Option<V> {
        let b = self.barycentric(p);
        let weighted = [b[0] * self.v[0].inv_w, b[1] * self.v[1].inv_w, b[2] * self.v[2].inv_w];
        let sum = weighted[0] + weighted[1] + weighted[2];
        if !(sum > f32::EPSILON) {
            return None;
        }
        let weights = [weighted[0] / sum, weighted[1] / sum, weighted[2] / sum];
        Some(V::combine(self.v[0].varying, self.v[1].varying, self.v[2].varying, weights))
    }
}

/// Draw an indexed triangle list
pub fn draw_indexed<P: ShaderProgram>(
    target: &mut Framebuffer,
    pipeline: &PipelineConfig,
    program: &P,
    vertices: &[P::Vertex],
    indices: &[u32],
) -> Result<DrawStats, RenderError> {
    if let Some(&index) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
        return Err(RenderError::IndexOutOfRange {
            index,
            vertex_count: vertices.len(),
        });
    }
    if indices.len() % 3 != 0 {
        log::warn!("Index count {} is not a multiple of 3; ignoring the tail", indices.len());
    }

    let transformed: Vec<VertexOutput<P::Varying>> = vertices.iter().map(|v| program.vertex(v)).collect();

    let mut stats = DrawStats::default();
    for tri in indices.chunks_exact(3) {
        stats.triangles_submitted += 1;
        let corners = [
            transformed[tri[0] as usize],
            transformed[tri[1] as usize],
            transformed[tri[2] as usize],
        ];
        rasterize_clipped(target, pipeline, program, corners, &mut stats);
    }

    log::trace!("{:?} draw: {:?}", pipeline.pipeline_type, stats);
    Ok(stats)
}

fn rasterize_clipped<P: ShaderProgram>(
    target: &mut Framebuffer,
    pipeline: &PipelineConfig,
    program: &P,
    corners: [VertexOutput<P::Varying>; 3],
    stats: &mut DrawStats,
) {
    let polygon = clip_triangle(corners);
    if polygon.len() < 3 {
        stats.triangles_clipped += 1;
        return;
    }

    let (width, height) = (target.width() as f32, target.height() as f32);
    let screen: Vec<ScreenVertex<P::Varying>> = polygon.iter().map(|v| to_screen(v, width, height)).collect();

    // Every fan triangle of a convex clipped polygon shares one orientation
    let area = (1..screen.len() - 1)
        .map(|k| edge(screen[0].pos, screen[k].pos, screen[k + 1].pos))
        .find(|a| *a != 0.0);
    let Some(area) = area.filter(|a| a.is_finite()) else {
        stats.triangles_clipped += 1;
        return;
    };
    let front_facing = area > 0.0;
    if pipeline.cull_mode.culls(front_facing) {
        stats.triangles_culled += 1;
        return;
    }

    for k in 1..screen.len() - 1 {
        let (a, mut b, mut c) = (screen[0], screen[k], screen[k + 1]);
        if !front_facing {
            std::mem::swap(&mut b, &mut c);
        }
        let area = edge(a.pos, b.pos, c.pos);
        if area <= 0.0 {
            continue;
        }
        let triangle = ScreenTriangle { v: [a, b, c], area };
        fill_triangle(target, pipeline, program, &triangle, front_facing, stats);
    }
}

fn fill_triangle<P: ShaderProgram>(
    target: &mut Framebuffer,
    pipeline: &PipelineConfig,
    program: &P,
    triangle: &ScreenTriangle<P::Varying>,
    front_facing: bool,
    stats: &mut DrawStats,
) {
    let [a, b, c] = &triangle.v;
    let min = a.pos.inf(&b.pos).inf(&c.pos);
    let max = a.pos.sup(&b.pos).sup(&c.pos);

    let x0 = min.x.floor().max(0.0) as u32;
    let y0 = min.y.floor().max(0.0) as u32;
    let x1 = (max.x.ceil().min(target.width() as f32) as u32).min(target.width());
    let y1 = (max.y.ceil().min(target.height() as f32) as u32).min(target.height());

    let edges = [(b.pos, c.pos), (c.pos, a.pos), (a.pos, b.pos)];
    let owned = edges.map(|(from, to)| owns_edge(from, to));

    for y in y0..y1 {
        for x in x0..x1 {
            let p = Vec2::new(x as f32 + 0.5, y as f32 + 0.5);

            let inside = edges.iter().zip(owned.iter()).all(|(&(from, to), &owns)| {
                let e = edge(from, to, p);
                e > 0.0 || (e == 0.0 && owns)
            });
            if !inside {
                continue;
            }

            let bary = triangle.barycentric(p);
            let depth = bary[0] * a.depth + bary[1] * b.depth + bary[2] * c.depth;
            if !(0.0..=1.0).contains(&depth) {
                continue;
            }
            if pipeline.depth.contains(DepthState::TEST) {
                if let Some(stored) = target.depth_at(x, y) {
                    if depth > stored {
                        continue;
                    }
                }
            }

            let Some(varying) = triangle.varying_at(p) else {
                continue;
            };
            let derivative = |offset: Vec2| {
                triangle
                    .varying_at(p + offset)
                    .map_or(varying * 0.0, |v| v - varying)
            };
            let fragment = Fragment {
                frag_coord: p,
                depth,
                front_facing,
                varying,
                ddx: derivative(Vec2::x()),
                ddy: derivative(Vec2::y()),
            };

            stats.fragments_shaded += 1;
            let Some(color) = program.fragment(&fragment) else {
                continue;
            };

            if let Some(dst) = target.color_mut(x, y) {
                *dst = pipeline.blend_mode.blend([color.x, color.y, color.z, color.w], *dst);
                stats.fragments_written += 1;
            }
            if pipeline.depth.contains(DepthState::WRITE) {
                if let Some(stored) = target.depth_mut(x, y) {
                    *stored = depth;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;
    use crate::render::pipeline::{BlendMode, CullMode, PipelineType};

    /// Passes clip positions straight through and outputs a flat colour
    struct Flat {
        color: Vec4,
    }

    impl ShaderProgram for Flat {
        type Vertex = Vec4;
        type Varying = Vec3;

        fn vertex(&self, vertex: &Vec4) -> VertexOutput<Vec3> {
            VertexOutput {
                clip: *vertex,
                varying: vertex.xyz() / vertex.w,
            }
        }

        fn fragment(&self, _fragment: &Fragment<Vec3>) -> Option<Vec4> {
            Some(self.color)
        }
    }

    fn pipeline(cull_mode: CullMode) -> PipelineConfig {
        PipelineConfig {
            pipeline_type: PipelineType::Moebius,
            depth: DepthState::TEST | DepthState::WRITE,
            blend_mode: BlendMode::Replace,
            cull_mode,
        }
    }

    fn full_screen_quad(z: f32) -> (Vec<Vec4>, Vec<u32>) {
        let vertices = vec![
            Vec4::new(-1.0, -1.0, z, 1.0),
            Vec4::new(1.0, -1.0, z, 1.0),
            Vec4::new(1.0, 1.0, z, 1.0),
            Vec4::new(-1.0, 1.0, z, 1.0),
        ];
        (vertices, vec![0, 1, 2, 0, 2, 3])
    }

    #[test]
    fn test_quad_covers_every_pixel_once() {
        let mut fb = Framebuffer::new(16, 9).unwrap();
        let (vertices, indices) = full_screen_quad(0.5);
        let program = Flat { color: Vec4::new(1.0, 0.0, 0.0, 1.0) };
        let stats = draw_indexed(&mut fb, &pipeline(CullMode::Back), &program, &vertices, &indices).unwrap();
        assert_eq!(stats.fragments_written, 16 * 9);
        assert!(fb.pixels().all(|c| c == Vec4::new(1.0, 0.0, 0.0, 1.0)));
        assert_eq!(fb.depth_at(3, 3), Some(0.5));
    }

    #[test]
    fn test_back_faces_are_culled() {
        let mut fb = Framebuffer::new(8, 8).unwrap();
        let (vertices, _) = full_screen_quad(0.5);
        let clockwise = [0, 2, 1, 0, 3, 2];
        let program = Flat { color: Vec4::repeat(1.0) };

        let stats = draw_indexed(&mut fb, &pipeline(CullMode::Back), &program, &vertices, &clockwise).unwrap();
        assert_eq!(stats.triangles_culled, 2);
        assert_eq!(stats.fragments_written, 0);

        let stats = draw_indexed(&mut fb, &pipeline(CullMode::Front), &program, &vertices, &clockwise).unwrap();
        assert_eq!(stats.triangles_culled, 0);
        assert_eq!(stats.fragments_written, 64);
    }

    #[test]
    fn test_depth_test_keeps_nearest() {
        let mut fb = Framebuffer::new(8, 8).unwrap();
        let red = Flat { color: Vec4::new(1.0, 0.0, 0.0, 1.0) };
        let blue = Flat { color: Vec4::new(0.0, 0.0, 1.0, 1.0) };
        let (near, indices) = full_screen_quad(0.2);
        let (far, _) = full_screen_quad(0.7);

        draw_indexed(&mut fb, &pipeline(CullMode::Back), &red, &near, &indices).unwrap();
        let stats = draw_indexed(&mut fb, &pipeline(CullMode::Back), &blue, &far, &indices).unwrap();
        assert_eq!(stats.fragments_written, 0);
        assert_eq!(fb.color_at(4, 4), Some(Vec4::new(1.0, 0.0, 0.0, 1.0)));
    }

    #[test]
    fn test_near_plane_clipping() {
        let mut fb = Framebuffer::new(8, 8).unwrap();
        let program = Flat { color: Vec4::repeat(1.0) };
        let behind = vec![
            Vec4::new(-1.0, -1.0, -0.5, 1.0),
            Vec4::new(1.0, -1.0, -0.5, 1.0),
            Vec4::new(0.0, 1.0, -0.5, 1.0),
        ];
        let stats = draw_indexed(&mut fb, &pipeline(CullMode::None), &program, &behind, &[0, 1, 2]).unwrap();
        assert_eq!(stats.triangles_clipped, 1);
        assert_eq!(stats.fragments_written, 0);

        let straddling = vec![
            Vec4::new(-1.0, -1.0, -0.5, 1.0),
            Vec4::new(1.0, -1.0, 0.5, 1.0),
            Vec4::new(0.0, 1.0, 0.5, 1.0),
        ];
        let stats = draw_indexed(&mut fb, &pipeline(CullMode::None), &program, &straddling, &[0, 1, 2]).unwrap();
        assert_eq!(stats.triangles_clipped, 0);
        assert!(stats.fragments_written > 0);
    }

    #[test]
    fn test_guard_band_keeps_huge_triangles_watertight() {
        // Two triangles sharing an edge, with one corner almost on the near
        // plane so its window position lands far outside the target
        let vertices = vec![
            Vec4::new(-1.5, -1.2, 0.5, 1.0),
            Vec4::new(0.9, -0.004, 0.005, 0.01),
            Vec4::new(1.3, 1.4, 0.5, 1.0),
            Vec4::new(-1.4, 1.5, 0.5, 1.0),
        ];
        let indices = [0, 1, 2, 0, 2, 3];
        let mut fb = Framebuffer::new(32, 24).unwrap();
        let program = Flat { color: Vec4::new(1.0, 0.0, 1.0, 1.0) };
        let stats = draw_indexed(&mut fb, &pipeline(CullMode::None), &program, &vertices, &indices).unwrap();

        assert_eq!(stats.triangles_clipped, 0);
        assert!(fb.pixels().all(|c| c == Vec4::new(1.0, 0.0, 1.0, 1.0)));
    }

    #[test]
    fn test_triangle_beyond_guard_band_is_clipped() {
        let mut fb = Framebuffer::new(8, 8).unwrap();
        let program = Flat { color: Vec4::repeat(1.0) };
        let far_right = vec![
            Vec4::new(3.0, -1.0, 0.5, 1.0),
            Vec4::new(5.0, -1.0, 0.5, 1.0),
            Vec4::new(4.0, 1.0, 0.5, 1.0),
        ];
        let stats = draw_indexed(&mut fb, &pipeline(CullMode::None), &program, &far_right, &[0, 1, 2]).unwrap();
        assert_eq!(stats.triangles_clipped, 1);
        assert_eq!(stats.fragments_written, 0);
    }

    #[test]
    fn test_derivatives_follow_the_plane() {
        struct Probe;
        impl ShaderProgram for Probe {
            type Vertex = Vec4;
            type Varying = Vec3;
            fn vertex(&self, vertex: &Vec4) -> VertexOutput<Vec3> {
                VertexOutput {
                    clip: *vertex,
                    varying: vertex.xyz(),
                }
            }
            fn fragment(&self, fragment: &Fragment<Vec3>) -> Option<Vec4> {
                Some(Vec4::new(fragment.ddx.x, fragment.ddy.y, 0.0, 1.0))
            }
        }

        let mut fb = Framebuffer::new(10, 20).unwrap();
        let (vertices, indices) = full_screen_quad(0.5);
        draw_indexed(&mut fb, &pipeline(CullMode::Back), &Probe, &vertices, &indices).unwrap();
        let color = fb.color_at(5, 5).unwrap();
        // NDC spans 2 units over 10 columns and 20 rows
        assert!((color.x - 0.2).abs() < 1e-5);
        assert!((color.y - 0.1).abs() < 1e-5);
    }

    #[test]
    fn test_out_of_range_index_is_an_error() {
        let mut fb = Framebuffer::new(4, 4).unwrap();
        let program = Flat { color: Vec4::repeat(1.0) };
        let (vertices, _) = full_screen_quad(0.5);
        let result = draw_indexed(&mut fb, &pipeline(CullMode::None), &program, &vertices, &[0, 1, 9]);
        assert!(matches!(result, Err(RenderError::IndexOutOfRange { index: 9, .. })));
    }
}
