//! # Rendering System
//!
//! Everything needed to turn a mesh into a Moebius-style frame:
//!
//! - **Shading**: noise, colour zones, hatching, normal smoothing and the
//!   fragment program that chains them
//! - **Raster**: a small CPU rasterizer with programmable vertex and fragment
//!   stages, used as the reference renderer and for headless output
//! - **Compositor**: the outline pass followed by the stylised pass
//! - **Shader export**: the same programs as GLSL for a GPU host
//!
//! Conventions are the usual right-handed ones: the camera looks down -Z,
//! depth runs 0 (near) to 1 (far), and counter-clockwise triangles face the
//! viewer.

pub mod compositor;
pub mod lighting;
pub mod material;
pub mod pipeline;
pub mod primitives;
pub mod raster;
pub mod shader_export;
pub mod shading;
pub mod uniforms;
pub mod viewport;

pub use compositor::{CompositorStats, TwoPassCompositor};
pub use lighting::{Light, LightType, LightingEnvironment};
pub use material::{MaterialConfig, SilhouetteConfig};
pub use pipeline::{BlendMode, CullMode, DepthState, PipelineConfig, PipelineType};
pub use primitives::{Camera, Frustum, Mesh, NeuronParams, Vertex};
pub use raster::{DrawStats, Framebuffer};
pub use shader_export::ShaderSet;
pub use uniforms::FrameUniforms;
pub use viewport::{ResizeEvent, ResizeSender, Viewport, ViewportController};

use thiserror::Error;

/// Rendering errors
#[derive(Error, Debug)]
pub enum RenderError {
    /// A render target was requested with a zero dimension
    #[error("Invalid render target size {width}x{height}")]
    InvalidSize {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
    },

    /// An index buffer refers past the end of its vertex buffer
    #[error("Index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange {
        /// Offending index
        index: u32,
        /// Length of the vertex buffer
        vertex_count: usize,
    },

    /// Encoding a frame failed
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// Writing output failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
