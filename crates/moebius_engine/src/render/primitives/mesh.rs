//! Mesh representation for 3D models
//!
//! Plain vertex/index storage shared by every pass. The silhouette and main
//! passes of the compositor draw the same `Mesh` through an `Arc`, so nothing
//! here is mutated after construction.

use bytemuck::{Pod, Zeroable};

use crate::foundation::math::Vec3;

/// Vertex data structure with position, normal, and texture coordinates
///
/// `#[repr(C)]` keeps the layout identical to the vertex input declared by the
/// exported vertex programs (location 0 position, 1 normal, 2 uv).
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    /// Position in object space
    pub position: [f32; 3],

    /// Normal vector
    pub normal: [f32; 3],

    /// Texture coordinates
    pub tex_coord: [f32; 2],
}

impl Vertex {
    /// Create a new vertex
    pub fn new(position: [f32; 3], normal: [f32; 3], tex_coord: [f32; 2]) -> Self {
        Self {
            position,
            normal,
            tex_coord,
        }
    }

    /// Position as a vector
    pub fn position(&self) -> Vec3 {
        Vec3::from(self.position)
    }

    /// Normal as a vector
    pub fn normal(&self) -> Vec3 {
        Vec3::from(self.normal)
    }
}

/// Indexed triangle list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    /// Vertex data
    pub vertices: Vec<Vertex>,

    /// Index data for triangles
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Create a new mesh
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Self {
        Self { vertices, indices }
    }

    /// Number of whole triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// True when there is nothing to draw
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() || self.indices.len() < 3
    }

    /// Square of side `size` centred at `center`, facing +Z
    pub fn quad(center: Vec3, size: f32) -> Self {
        let h = size * 0.5;
        let corner = |dx: f32, dy: f32, u: f32, v: f32| {
            Vertex::new([center.x + dx, center.y + dy, center.z], [0.0, 0.0, 1.0], [u, v])
        };
        Self::new(
            vec![
                corner(-h, -h, 0.0, 0.0),
                corner(h, -h, 1.0, 0.0),
                corner(h, h, 1.0, 1.0),
                corner(-h, h, 0.0, 1.0),
            ],
            vec![0, 1, 2, 0, 2, 3],
        )
    }

    /// Latitude/longitude sphere, counter-clockwise when seen from outside
    ///
    /// Segment counts below 3 (around) or 2 (top to bottom) are raised to
    /// those minimums.
    pub fn uv_sphere(center: Vec3, radius: f32, width_segments: u32, height_segments: u32) -> Self {
        let width_segments = width_segments.max(3);
        let height_segments = height_segments.max(2);

        let mut vertices = Vec::with_capacity(((width_segments + 1) * (height_segments + 1)) as usize);
        for iy in 0..=height_segments {
            let v = iy as f32 / height_segments as f32;
            let (sin_theta, cos_theta) = (v * std::f32::consts::PI).sin_cos();
            for ix in 0..=width_segments {
                let u = ix as f32 / width_segments as f32;
                let (sin_phi, cos_phi) = (u * std::f32::consts::TAU).sin_cos();
                let normal = Vec3::new(-cos_phi * sin_theta, cos_theta, sin_phi * sin_theta);
                let position = center + normal * radius;
                vertices.push(Vertex::new(position.into(), normal.into(), [u, 1.0 - v]));
            }
        }

        let row = width_segments + 1;
        let mut indices = Vec::with_capacity((width_segments * height_segments * 6) as usize);
        for iy in 0..height_segments {
            for ix in 0..width_segments {
                let a = iy * row + ix + 1;
                let b = iy * row + ix;
                let c = (iy + 1) * row + ix;
                let d = (iy + 1) * row + ix + 1;
                // The pole rows collapse to one triangle per quad
                if iy != 0 {
                    indices.extend_from_slice(&[a, b, d]);
                }
                if iy != height_segments - 1 {
                    indices.extend_from_slice(&[b, c, d]);
                }
            }
        }

        Self::new(vertices, indices)
    }

    /// Reverse the winding of every triangle
    pub fn flip_winding(&mut self) {
        for tri in self.indices.chunks_exact_mut(3) {
            tri.swap(1, 2);
        }
    }

    /// Bounding sphere around the vertex positions: box centre plus the
    /// farthest vertex from it
    pub fn bounding_sphere(&self) -> (Vec3, f32) {
        let Some(first) = self.vertices.first() else {
            return (Vec3::zeros(), 0.0);
        };
        let (min, max) = self.vertices.iter().fold((first.position(), first.position()), |(min, max), v| {
            (min.inf(&v.position()), max.sup(&v.position()))
        });
        let center = (min + max) * 0.5;
        let radius = self
            .vertices
            .iter()
            .map(|v| (v.position() - center).norm())
            .fold(0.0, f32::max);
        (center, radius)
    }

    /// Replace every normal with the area-weighted average of the adjacent
    /// face normals; vertices with no usable faces get +Y
    pub fn generate_normals(&mut self) {
        let mut accumulated = vec![Vec3::zeros(); self.vertices.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            if a >= self.vertices.len() || b >= self.vertices.len() || c >= self.vertices.len() {
                continue;
            }
            let pa = self.vertices[a].position();
            let face = (self.vertices[b].position() - pa).cross(&(self.vertices[c].position() - pa));
            for index in [a, b, c] {
                accumulated[index] += face;
            }
        }
        for (vertex, normal) in self.vertices.iter_mut().zip(accumulated) {
            vertex.normal = normal.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::y).into();
        }
    }

    /// Replace zero-length or non-finite normals with +Y and normalise the rest
    ///
    /// Returns how many normals were replaced.
    pub fn repair_normals(&mut self) -> usize {
        let mut repaired = 0;
        for vertex in &mut self.vertices {
            let normal = vertex.normal();
            match normal.try_normalize(f32::EPSILON).filter(|n| n.iter().all(|c| c.is_finite())) {
                Some(unit) => vertex.normal = unit.into(),
                None => {
                    vertex.normal = [0.0, 1.0, 0.0];
                    repaired += 1;
                }
            }
        }
        repaired
    }

    /// Append another mesh, offsetting its indices
    pub fn append(&mut self, other: &Mesh) {
        let offset = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + offset));
    }
}
