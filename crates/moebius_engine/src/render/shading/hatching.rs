//! Distance-quantised cross-hatching
//!
//! Two diagonal line layers darken the surface below their own brightness
//! levels. The line spacing and strength come from a band table indexed by
//! camera distance, so the engraving keeps a roughly constant density on
//! screen. Every line is bent by world-space noise and thinned by three hard
//! masks:
//!
//! - a dither mask whose density follows the distance to the layer's level,
//! - a stipple mask that removes more of the line in lighter regions,
//! - a dash mask (first layer only) that breaks the line into segments.
//!
//! Line edges are antialiased; the masks are binary.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Vec2, Vec3};

use super::noise::{self, NoiseOctave};

/// Spacing and intensity multipliers for one distance band
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandMultipliers {
    /// Multiplier applied to the base line spacing
    pub spacing: f32,
    /// Multiplier applied to the base hatch intensity
    pub intensity: f32,
}

impl BandMultipliers {
    /// Create a multiplier pair
    pub const fn new(spacing: f32, intensity: f32) -> Self {
        Self { spacing, intensity }
    }
}

/// One bounded row of the band table: distances below `upper_bound` use it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HatchBand {
    /// Exclusive upper distance bound in world units
    pub upper_bound: f32,
    /// Multipliers for this band
    pub multipliers: BandMultipliers,
}

impl HatchBand {
    /// Create a band
    pub const fn new(upper_bound: f32, spacing: f32, intensity: f32) -> Self {
        Self {
            upper_bound,
            multipliers: BandMultipliers::new(spacing, intensity),
        }
    }
}

/// Band table validation errors
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum BandTableError {
    /// A bound is NaN or infinite
    #[error("band {index} has a non-finite upper bound ({bound})")]
    NonFiniteBound {
        /// Row index
        index: usize,
        /// Offending bound
        bound: f32,
    },

    /// Bounds do not strictly increase
    #[error("band {index} upper bound {bound} does not exceed the previous bound {previous}")]
    NotIncreasing {
        /// Row index
        index: usize,
        /// Offending bound
        bound: f32,
        /// Bound of the row before it
        previous: f32,
    },
}

#[derive(Deserialize)]
struct RawBandTable {
    bands: Vec<HatchBand>,
    beyond: BandMultipliers,
}

/// Ordered distance bands plus the catch-all used beyond the last bound
///
/// The table is total: every distance maps to exactly one band. Negative and
/// NaN distances use the first band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawBandTable")]
pub struct HatchBandTable {
    bands: Vec<HatchBand>,
    beyond: BandMultipliers,
}

impl TryFrom<RawBandTable> for HatchBandTable {
    type Error = BandTableError;

    fn try_from(raw: RawBandTable) -> Result<Self, Self::Error> {
        Self::new(raw.bands, raw.beyond)
    }
}

impl Default for HatchBandTable {
    fn default() -> Self {
        Self {
            bands: vec![
                HatchBand::new(15.0, 2.0, 0.3),
                HatchBand::new(25.0, 1.5, 0.5),
                HatchBand::new(40.0, 1.0, 0.7),
                HatchBand::new(60.0, 0.7, 1.0),
                HatchBand::new(80.0, 0.5, 1.2),
            ],
            beyond: BandMultipliers::new(0.3, 1.5),
        }
    }
}

impl HatchBandTable {
    /// Build a table, rejecting bounds that are not finite and strictly increasing
    pub fn new(bands: Vec<HatchBand>, beyond: BandMultipliers) -> Result<Self, BandTableError> {
        let mut previous: Option<f32> = None;
        for (index, band) in bands.iter().enumerate() {
            let bound = band.upper_bound;
            if !bound.is_finite() {
                return Err(BandTableError::NonFiniteBound { index, bound });
            }
            if let Some(previous) = previous {
                if bound <= previous {
                    return Err(BandTableError::NotIncreasing { index, bound, previous });
                }
            }
            previous = Some(bound);
        }
        Ok(Self { bands, beyond })
    }

    /// Bounded rows, nearest first
    pub fn bands(&self) -> &[HatchBand] {
        &self.bands
    }

    /// Multipliers used past the last bound
    pub fn beyond(&self) -> BandMultipliers {
        self.beyond
    }

    /// Index of the band `distance` falls into; `bands().len()` is the catch-all
    pub fn band_index(&self, distance: f32) -> usize {
        if distance.is_nan() || distance < 0.0 {
            return 0;
        }
        self.bands
            .iter()
            .position(|band| distance < band.upper_bound)
            .unwrap_or(self.bands.len())
    }

    /// Multipliers for a camera distance
    pub fn lookup(&self, distance: f32) -> BandMultipliers {
        self.bands
            .get(self.band_index(distance))
            .map_or(self.beyond, |band| band.multipliers)
    }
}

/// Hatching parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HatchingConfig {
    /// Line spacing before band scaling, in screen units (0..100 across the viewport)
    pub base_line_spacing: f32,
    /// Nominal line thickness
    pub line_thickness: f32,
    /// Layer 1 is drawn below this brightness
    pub level1: f32,
    /// Layer 2 is drawn below this brightness
    pub level2: f32,
    /// Hatch intensity before band scaling
    pub base_intensity: f32,
    /// Antialiasing half-width of the line edges
    pub aa_width: f32,
    /// Distance bands
    pub bands: HatchBandTable,
}

impl Default for HatchingConfig {
    fn default() -> Self {
        Self {
            base_line_spacing: 0.6,
            line_thickness: 0.1,
            level1: 0.9,
            level2: 0.1,
            base_intensity: 0.9,
            aa_width: 0.05,
            bands: HatchBandTable::default(),
        }
    }
}

impl HatchingConfig {
    /// Line spacing at a camera distance
    pub fn line_spacing(&self, distance: f32) -> f32 {
        self.base_line_spacing * self.bands.lookup(distance).spacing
    }

    /// Hatch intensity at a camera distance
    pub fn intensity(&self, distance: f32) -> f32 {
        self.base_intensity * self.bands.lookup(distance).intensity
    }
}

/// Per-layer noise and mask parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerStyle {
    /// Two wave octaves evaluated at the world position
    pub wave: [NoiseOctave; 2],
    /// Stipple noise; remapped with `+ 0.5`
    pub stipple: NoiseOctave,
    /// Brightness gain for the stipple threshold
    pub stipple_gain: f32,
    /// Dither noise frequency at the layer's level
    pub dither_coarse: f32,
    /// Dither noise frequency deep in shadow
    pub dither_fine: f32,
    /// Phase offset of the dither field
    pub dither_offset: f32,
    /// Break the line into dashes
    pub segmented: bool,
}

/// First (light-shadow) layer
pub const LAYER1: LayerStyle = LayerStyle {
    wave: [NoiseOctave::new(0.8, 0.0, 0.2), NoiseOctave::new(1.5, 50.0, 0.05)],
    stipple: NoiseOctave::new(2.0, 0.0, 0.4),
    stipple_gain: 0.8,
    dither_coarse: 0.5,
    dither_fine: 2.0,
    dither_offset: 0.0,
    segmented: true,
};

/// Second (deep-shadow) layer
pub const LAYER2: LayerStyle = LayerStyle {
    wave: [NoiseOctave::new(1.2, 25.0, 0.15), NoiseOctave::new(2.0, 75.0, 0.02)],
    stipple: NoiseOctave::new(1.5, 50.0, 0.4),
    stipple_gain: 0.6,
    dither_coarse: 0.3,
    dither_fine: 1.5,
    dither_offset: 100.0,
    segmented: false,
};

/// Dash length at zero brightness; shrinks by `DASH_SHRINK * intensity`
pub const DASH_LENGTH: f32 = 0.7;
/// Dash shrink per unit of stipple intensity
pub const DASH_SHRINK: f32 = 0.4;

/// Per-fragment inputs to the hatching stage
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HatchInput {
    /// Fragment position scaled into `0..100` across the viewport
    pub screen_pos: Vec2,
    /// Interpolated world position
    pub world_pos: Vec3,
    /// Lighting brightness (before colour-level scaling)
    pub brightness: f32,
    /// Interpolated vertex-to-camera distance
    pub camera_distance: f32,
}

/// Antialiased line profile over one spacing period
///
/// The line sits at the middle of each period. Its half thickness and edge
/// width are capped relative to the spacing so the densest bands still show
/// separated lines.
pub fn line_profile(diagonal: f32, spacing: f32, thickness: f32, aa_width: f32) -> f32 {
    if spacing <= 0.0 {
        return 0.0;
    }
    let position = utils::glsl_mod(diagonal, spacing);
    let centre = spacing * 0.5;
    let half = (thickness * 0.5).min(spacing * 0.2);
    let aa = aa_width.min(spacing * 0.1);

    utils::smoothstep_aa(centre - half, position, aa)
        * (1.0 - utils::smoothstep_aa(centre + half, position, aa))
}

/// Wavy diagonal coordinate for a layer
pub fn diagonal(style: &LayerStyle, screen_pos: Vec2, world_pos: Vec3) -> f32 {
    screen_pos.x - screen_pos.y + noise::layered(world_pos, &style.wave)
}

/// Binary dither mask for a layer at `brightness` below `level`
///
/// Near the level most of the layer is masked out; deep in shadow none is.
/// The noise frequency moves from coarse to fine on the way down.
pub fn dither_mask(style: &LayerStyle, world_pos: Vec3, brightness: f32, level: f32) -> f32 {
    let depth = if level > 0.0 {
        ((level - brightness).abs() / level).clamp(0.0, 1.0)
    } else {
        1.0
    };
    let scale = utils::mix(style.dither_coarse, style.dither_fine, depth);
    let dither = noise::unit(world_pos * scale + Vec3::repeat(style.dither_offset));
    utils::step(1.0 - depth, dither)
}

/// Masked line value of one layer before intensity and dither
pub fn layer_value(config: &HatchingConfig, style: &LayerStyle, input: &HatchInput, spacing: f32) -> f32 {
    let diagonal = diagonal(style, input.screen_pos, input.world_pos);
    let line = line_profile(diagonal, spacing, config.line_thickness, config.aa_width);

    let noise_intensity = input.brightness.clamp(0.0, 1.0) * style.stipple_gain;
    let stipple = style.stipple.sample(input.world_pos) + 0.5;
    let stipple_mask = utils::step(noise_intensity, stipple);

    let dash_mask = if style.segmented {
        let segment = utils::fract(diagonal * 2.0);
        utils::step(segment, DASH_LENGTH - noise_intensity * DASH_SHRINK)
    } else {
        1.0
    };

    line * dash_mask * stipple_mask
}

/// Total hatch coverage in `[0, 1]`
pub fn apply_hatching(config: &HatchingConfig, input: &HatchInput) -> f32 {
    let spacing = config.line_spacing(input.camera_distance);
    let intensity = config.intensity(input.camera_distance);

    let mut hatch = 0.0;
    for (style, level) in [(&LAYER1, config.level1), (&LAYER2, config.level2)] {
        if input.brightness < level {
            let dither = dither_mask(style, input.world_pos, input.brightness, level);
            hatch += layer_value(config, style, input, spacing) * intensity * dither;
        }
    }

    hatch.clamp(0.0, 1.0)
}
