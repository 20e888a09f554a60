//! Procedural neuron mesh
//!
//! A soma sphere with tapered dendrite tubes that fork a few times. Used as
//! the backdrop subject when no mesh file is supplied. Fully determined by
//! the seed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;

use super::mesh::{Mesh, Vertex};

/// Shape parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NeuronParams {
    /// RNG seed
    pub seed: u64,
    /// Radius of the cell body
    pub soma_radius: f32,
    /// Primary dendrites leaving the soma
    pub dendrites: u32,
    /// Forking generations after the primary segment
    pub branch_depth: u32,
    /// Length of a primary segment
    pub segment_length: f32,
    /// Radius where a primary dendrite leaves the soma
    pub base_radius: f32,
    /// Radius and length factor per generation
    pub taper: f32,
    /// Vertices around each tube ring
    pub ring_segments: u32,
}

impl Default for NeuronParams {
    fn default() -> Self {
        Self {
            seed: 7,
            soma_radius: 1.2,
            dendrites: 7,
            branch_depth: 2,
            segment_length: 3.0,
            base_radius: 0.3,
            taper: 0.7,
            ring_segments: 10,
        }
    }
}

/// Random direction, uniform on the sphere
fn random_direction(rng: &mut StdRng) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let phi: f32 = rng.gen_range(0.0..std::f32::consts::TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * phi.cos(), r * phi.sin(), z)
}

/// Any unit vector pair completing `axis` to a right-handed basis
fn orthonormal_basis(axis: Vec3) -> (Vec3, Vec3) {
    let helper = if axis.x.abs() < 0.9 { Vec3::x() } else { Vec3::y() };
    let u = axis.cross(&helper).normalize();
    let v = axis.cross(&u);
    (u, v)
}

struct Segment {
    start: Vec3,
    direction: Vec3,
    length: f32,
    radius: f32,
}

/// Tapered tube from `start` along `direction`, optionally capped with a cone
fn tube(mesh: &mut Mesh, segment: &Segment, end_radius: f32, ring_segments: u32, cap: bool) {
    let end = segment.start + segment.direction * segment.length;
    let (u, v) = orthonormal_basis(segment.direction);
    let base = mesh.vertices.len() as u32;

    for (center, radius, t) in [(segment.start, segment.radius, 0.0), (end, end_radius, 1.0)] {
        for k in 0..=ring_segments {
            let angle = k as f32 / ring_segments as f32 * std::f32::consts::TAU;
            let normal = u * angle.cos() + v * angle.sin();
            let position = center + normal * radius;
            let s = k as f32 / ring_segments as f32;
            mesh.vertices.push(Vertex::new(position.into(), normal.into(), [s, t]));
        }
    }

    let row = ring_segments + 1;
    for k in 0..ring_segments {
        let (a, b) = (base + k, base + k + 1);
        let (c, d) = (base + row + k + 1, base + row + k);
        mesh.indices.extend_from_slice(&[a, b, c, a, c, d]);
    }

    if cap {
        let tip = mesh.vertices.len() as u32;
        let tip_position = end + segment.direction * end_radius;
        mesh.vertices.push(Vertex::new(tip_position.into(), segment.direction.into(), [0.5, 1.0]));
        for k in 0..ring_segments {
            mesh.indices.extend_from_slice(&[base + row + k, base + row + k + 1, tip]);
        }
    }
}

fn grow(mesh: &mut Mesh, rng: &mut StdRng, params: &NeuronParams, segment: Segment, generation: u32) {
    let end_radius = segment.radius * params.taper;
    let terminal = generation >= params.branch_depth;
    tube(mesh, &segment, end_radius, params.ring_segments, terminal);
    if terminal {
        return;
    }

    let end = segment.start + segment.direction * segment.length;
    for _ in 0..2 {
        let direction = (segment.direction + random_direction(rng) * 0.6)
            .try_normalize(f32::EPSILON)
            .unwrap_or(segment.direction);
        let length = segment.length * params.taper * rng.gen_range(0.8..1.2);
        grow(
            mesh,
            rng,
            params,
            Segment {
                start: end,
                direction,
                length,
                radius: end_radius,
            },
            generation + 1,
        );
    }
}

/// Build the neuron mesh
pub fn generate(params: &NeuronParams) -> Mesh {
    let mut rng = StdRng::seed_from_u64(params.seed);
    let ring_segments = params.ring_segments.max(3);
    let params = NeuronParams {
        ring_segments,
        ..params.clone()
    };

    let mut mesh = Mesh::uv_sphere(Vec3::zeros(), params.soma_radius, 24, 16);
    for _ in 0..params.dendrites {
        let direction = random_direction(&mut rng);
        let length = params.segment_length * rng.gen_range(0.8..1.2);
        grow(
            &mut mesh,
            &mut rng,
            &params,
            Segment {
                // Start inside the soma so the joint is hidden
                start: direction * params.soma_radius * 0.8,
                direction,
                length,
                radius: params.base_radius,
            },
            0,
        );
    }

    log::debug!(
        "Generated neuron (seed {}): {} vertices, {} triangles",
        params.seed,
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    mesh
}
