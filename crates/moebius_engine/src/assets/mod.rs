//! Asset loading
//!
//! Mesh files for the backdrop subject. When no file is given the scene
//! uses the procedural neuron from [`render::primitives::neuron`](crate::render::primitives::neuron).

pub mod obj_loader;

pub use obj_loader::ObjLoader;

use thiserror::Error;

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Reading the file failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The file could not be parsed
    #[error("Load error: {0}")]
    Load(#[from] tobj::LoadError),

    /// The file parsed but holds no triangles
    #[error("No triangles in {0}")]
    EmptyMesh(String),
}
