//! # Scene Assembly
//!
//! The backdrop scene and the pieces around the outlined mesh: a gradient
//! sky sphere, a star field and floating particles.

pub mod backdrop;
pub mod particles;
pub mod sky;
pub mod stars;

pub use backdrop::{Backdrop, FrameStats, FrameUpdate};
pub use particles::{ParticleConfig, ParticleField};
pub use sky::{SkyConfig, SkyDome};
pub use stars::{Star, StarField, StarFieldConfig};
