//! Core primitive types for rendering
//!
//! Camera, mesh storage and the procedural neuron generator.

pub mod camera;
pub mod mesh;
pub mod neuron;

pub use camera::{Camera, Frustum};
pub use mesh::{Mesh, Vertex};
pub use neuron::NeuronParams;
