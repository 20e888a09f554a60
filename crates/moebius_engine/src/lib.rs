//! # Moebius Engine
//!
//! A stylised renderer in the manner of a pen-and-ink comic: flat HSL colour
//! zones, distance-aware cross-hatching and a drawn outline, set in a small
//! backdrop scene with a gradient sky, stars and drifting dust.
//!
//! ## Features
//!
//! - **Pure shading stages**: noise, colour zones, hatching and normal
//!   smoothing are plain functions over explicit inputs
//! - **CPU reference rasterizer**: runs the vertex and fragment programs with
//!   screen-space derivatives and writes PNG frames
//! - **Two-pass outline**: inflated back faces behind the stylised front faces
//! - **GLSL export**: the same programs for a GPU host
//! - **Configuration**: the whole scene in one TOML or RON file
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use moebius_engine::prelude::*;
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = BackdropConfig::default();
//!     let mesh = Arc::new(neuron::generate(&config.neuron));
//!     let mut scene = Backdrop::new(&config, mesh);
//!     let mut frame = Framebuffer::new(config.output.width, config.output.height)?;
//!
//!     scene.update(0.0, Duration::ZERO);
//!     scene.render(&mut frame)?;
//!     frame.save_png("frame.png")?;
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod assets;
pub mod config;
pub mod core;
pub mod foundation;
pub mod render;
pub mod scene;

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        assets::{AssetError, ObjLoader},
        core::{BackdropConfig, Config, ConfigError},
        foundation::{
            math::{Mat4, Transform, Vec2, Vec3, Vec4},
            time::Timer,
        },
        render::{
            primitives::neuron, Camera, FrameUniforms, Framebuffer, MaterialConfig, Mesh, RenderError,
            SilhouetteConfig, TwoPassCompositor, Viewport,
        },
        scene::Backdrop,
    };
}
