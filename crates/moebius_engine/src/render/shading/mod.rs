//! CPU implementations of the stylised shading stages
//!
//! Each stage is a pure function over explicit inputs. The rasterizer calls
//! them per fragment and the shader exporter emits the matching GLSL.

pub mod color;
pub mod fragment;
pub mod hatching;
pub mod noise;
pub mod smoothing;

pub use color::{ColorZones, Hsl, HslAdjust, ZoneSample};
pub use fragment::{shade_fragment, FragmentInput, ShadedFragment};
pub use hatching::{BandMultipliers, BandTableError, HatchBand, HatchBandTable, HatchingConfig};
pub use smoothing::Derivatives;
