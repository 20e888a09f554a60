//! Software rasterization: framebuffer, triangles and point sprites

pub mod framebuffer;
pub mod points;
pub mod rasterizer;
pub mod varying;

pub use framebuffer::{Framebuffer, FAR_DEPTH};
pub use points::{draw_points, PointShape, PointSprite};
pub use rasterizer::{draw_indexed, DrawStats, Fragment, ShaderProgram, VertexOutput};
pub use varying::{NoVarying, Varying};
