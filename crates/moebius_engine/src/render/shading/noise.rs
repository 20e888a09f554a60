//! 3D simplex noise
//!
//! Gradient noise on a skewed tetrahedral lattice with a hashed permutation
//! polynomial (no lookup tables, no state), matching the GLSL kernel the
//! exported shaders use. Output is C1-continuous and stays within roughly
//! `[-1, 1]`.

use crate::foundation::math::Vec3;

const SKEW: f32 = 1.0 / 3.0;
const UNSKEW: f32 = 1.0 / 6.0;

// ns = (2/7, 0.5/7 - 1, 1/7): gradient ring parameters
const NS_X: f32 = 0.285_714_285_714;
const NS_Y: f32 = -0.928_571_428_571;
const NS_Z: f32 = 0.142_857_142_857;

// Each corner's kernel reaches zero on the far faces of every simplex that
// shares the corner, so contributions never switch on or off mid-weight
const FALLOFF_RADIUS_SQ: f32 = 0.5;
const OUTPUT_SCALE: f32 = 105.0;

fn mod289(x: f32) -> f32 {
    x - (x * (1.0 / 289.0)).floor() * 289.0
}

fn permute(x: f32) -> f32 {
    mod289(((x * 34.0) + 1.0) * x)
}

fn taylor_inv_sqrt(r: f32) -> f32 {
    1.792_842_914_001_59 - 0.853_734_720_953_14 * r
}

/// Pseudo-random unit-ish gradient for a hashed lattice corner
fn gradient(hash: f32) -> Vec3 {
    let j = hash - 49.0 * (hash * NS_Z * NS_Z).floor();
    let cell_x = (j * NS_Z).floor();
    let cell_y = (j - 7.0 * cell_x).floor();

    let mut gx = cell_x * NS_X + NS_Y;
    let mut gy = cell_y * NS_X + NS_Y;
    let gz = 1.0 - gx.abs() - gy.abs();

    // Fold the octahedron's lower half back up
    if gz <= 0.0 {
        gx -= gx.floor() * 2.0 + 1.0;
        gy -= gy.floor() * 2.0 + 1.0;
    }

    let g = Vec3::new(gx, gy, gz);
    g * taylor_inv_sqrt(g.dot(&g))
}

/// Evaluate 3D simplex noise at `v`
pub fn simplex3(v: Vec3) -> f32 {
    // Skew into lattice space and find the containing simplex
    let skew = (v.x + v.y + v.z) * SKEW;
    let cell = (v + Vec3::repeat(skew)).map(f32::floor);
    let unskew = (cell.x + cell.y + cell.z) * UNSKEW;
    let x0 = v - cell + Vec3::repeat(unskew);

    // Rank the components of x0 to pick the middle two corners. Ties go to
    // the lower axis so the three comparisons always form a total order.
    let x_ge_y = x0.x >= x0.y;
    let y_ge_z = x0.y >= x0.z;
    let x_ge_z = x0.x >= x0.z;
    let i1 = if x_ge_y && x_ge_z {
        Vec3::x()
    } else if !x_ge_y && y_ge_z {
        Vec3::y()
    } else {
        Vec3::z()
    };
    let smallest = if x_ge_z && y_ge_z {
        Vec3::z()
    } else if x_ge_y && !y_ge_z {
        Vec3::y()
    } else {
        Vec3::x()
    };
    let i2 = Vec3::repeat(1.0) - smallest;

    let corners = [Vec3::zeros(), i1, i2, Vec3::repeat(1.0)];
    let offsets = [
        x0,
        x0 - i1 + Vec3::repeat(UNSKEW),
        x0 - i2 + Vec3::repeat(SKEW),
        x0 - Vec3::repeat(0.5),
    ];

    let cell = cell.map(mod289);
    let mut total = 0.0;
    for (corner, offset) in corners.iter().zip(offsets.iter()) {
        let hash = permute(
            permute(permute(cell.z + corner.z) + cell.y + corner.y) + cell.x + corner.x,
        );
        let falloff = (FALLOFF_RADIUS_SQ - offset.dot(offset)).max(0.0);
        let falloff_sq = falloff * falloff;
        total += falloff_sq * falloff_sq * gradient(hash).dot(offset);
    }

    OUTPUT_SCALE * total
}

/// 2D slice of the 3D field at `z = 0`
pub fn simplex2(x: f32, y: f32) -> f32 {
    simplex3(Vec3::new(x, y, 0.0))
}

/// Noise quantised to quarter steps, used for hard-edged variation
pub fn quantized(v: Vec3) -> f32 {
    (simplex3(v) * 4.0 + 0.5).floor() / 4.0
}

/// Noise remapped from `[-1, 1]` into `[0, 1]`
pub fn unit(v: Vec3) -> f32 {
    simplex3(v) * 0.5 + 0.5
}

/// One term of a layered noise sum: `simplex3(p * frequency + offset) * amplitude`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseOctave {
    /// Spatial frequency multiplier
    pub frequency: f32,
    /// Phase offset added on every axis after scaling
    pub offset: f32,
    /// Output amplitude
    pub amplitude: f32,
}

impl NoiseOctave {
    /// Create an octave
    pub const fn new(frequency: f32, offset: f32, amplitude: f32) -> Self {
        Self { frequency, offset, amplitude }
    }

    /// Evaluate this octave at `p`
    pub fn sample(&self, p: Vec3) -> f32 {
        simplex3(p * self.frequency + Vec3::repeat(self.offset)) * self.amplitude
    }
}

/// Sum of several octaves at different frequencies and phase offsets
pub fn layered(p: Vec3, octaves: &[NoiseOctave]) -> f32 {
    octaves.iter().map(|octave| octave.sample(p)).sum()
}
