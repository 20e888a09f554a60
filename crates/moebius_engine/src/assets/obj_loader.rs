//! OBJ file loader for 3D models
//!
//! Parsing is done by `tobj` with triangulation and a single index stream.
//! Every model in the file is merged into one mesh. Models without normals
//! get area-weighted face normals; zero or broken normals fall back to +Y.
//! Material libraries are ignored; the stylised material replaces them.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::render::primitives::{Mesh, Vertex};

use super::AssetError;

/// OBJ loading entry points
pub struct ObjLoader;

impl ObjLoader {
    /// Load an OBJ file and return a mesh
    pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, AssetError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mesh = Self::load_from_reader(&mut BufReader::new(file), &path.display().to_string())?;
        log::info!(
            "Loaded {}: {} vertices, {} triangles",
            path.display(),
            mesh.vertices.len(),
            mesh.triangle_count()
        );
        Ok(mesh)
    }

    /// Parse OBJ text already in memory
    pub fn load_obj_from_str(source: &str) -> Result<Mesh, AssetError> {
        Self::load_from_reader(&mut source.as_bytes(), "<memory>")
    }

    fn load_from_reader<R: BufRead>(reader: &mut R, name: &str) -> Result<Mesh, AssetError> {
        let options = tobj::LoadOptions {
            triangulate: true,
            single_index: true,
            ..Default::default()
        };
        let (models, _) = tobj::load_obj_buf(reader, &options, |_| Err(tobj::LoadError::OpenFileFailed))?;

        let mut merged = Mesh::default();
        for model in models {
            let mut mesh = Self::convert(&model.mesh)?;
            if model.mesh.normals.is_empty() {
                log::debug!("{name}: model '{}' has no normals, generating them", model.name);
                mesh.generate_normals();
            }
            let repaired = mesh.repair_normals();
            if repaired > 0 {
                log::warn!("{name}: model '{}' had {repaired} unusable normals", model.name);
            }
            merged.append(&mesh);
        }

        if merged.is_empty() {
            return Err(AssetError::EmptyMesh(name.to_string()));
        }
        Ok(merged)
    }

    fn convert(source: &tobj::Mesh) -> Result<Mesh, AssetError> {
        let count = source.positions.len() / 3;
        let has_normals = source.normals.len() == source.positions.len();
        let has_tex_coords = source.texcoords.len() / 2 == count;

        let vertices = (0..count)
            .map(|i| {
                let position = [source.positions[3 * i], source.positions[3 * i + 1], source.positions[3 * i + 2]];
                let normal = if has_normals {
                    [source.normals[3 * i], source.normals[3 * i + 1], source.normals[3 * i + 2]]
                } else {
                    [0.0; 3]
                };
                let tex_coord = if has_tex_coords {
                    [source.texcoords[2 * i], source.texcoords[2 * i + 1]]
                } else {
                    [0.0; 2]
                };
                Vertex::new(position, normal, tex_coord)
            })
            .collect();

        if source.indices.iter().any(|&index| index as usize >= count) {
            return Err(AssetError::Load(tobj::LoadError::FaceVertexOutOfBounds));
        }
        let whole = source.indices.len() - source.indices.len() % 3;
        Ok(Mesh::new(vertices, source.indices[..whole].to_vec()))
    }
}
