//! Two-pass outlined mesh drawing
//!
//! The silhouette pass draws the mesh's back faces pushed outward along their
//! normals in a flat colour; the main pass then draws the front faces with
//! the stylised program. Both passes read the same `Arc<Mesh>` with the same
//! model transform, so the outline only survives the depth test along the
//! screen-space boundary of the mesh.

use std::sync::Arc;

use crate::foundation::math::{normal_matrix, Mat3, Mat4, Transform, Vec2, Vec3, Vec4};
use crate::render::material::{MaterialConfig, SilhouetteConfig};
use crate::render::pipeline::PipelineConfig;
use crate::render::primitives::{Camera, Mesh, Vertex};
use crate::render::raster::{self, DrawStats, Fragment, Framebuffer, NoVarying, ShaderProgram, VertexOutput};
use crate::render::shading::{self, noise, Derivatives, FragmentInput};
use crate::render::uniforms::FrameUniforms;
use crate::render::RenderError;

/// Matrices shared by both passes of one draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawTransforms {
    /// Object to world
    pub model: Mat4,
    /// Inverse transpose of the model's linear part
    pub normal_matrix: Mat3,
    /// World to clip
    pub view_projection: Mat4,
}

impl DrawTransforms {
    /// Build from a model matrix and the current camera
    pub fn new(model: Mat4, camera: &Camera) -> Self {
        Self {
            model,
            normal_matrix: normal_matrix(&model),
            view_projection: camera.get_view_projection_matrix(),
        }
    }
}

/// Slowly drifting per-vertex noise
pub fn vertex_noise(world_position: Vec3, time: f32) -> f32 {
    noise::simplex3(world_position + Vec3::repeat(time * 0.01)) * 0.1
        + noise::simplex3(world_position * 2.0 + Vec3::repeat(time * 0.005)) * 0.05
}

/// Values the stylised vertex program hands to the fragment program
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MoebiusVarying {
    /// World-space position
    pub world_position: Vec3,
    /// World-space normal
    pub normal: Vec3,
    /// World-space offset from the camera
    pub eye_offset: Vec3,
    /// Vertex-to-camera distance
    pub camera_distance: f32,
    /// [`vertex_noise`] at the vertex
    pub noise: f32,
}

crate::impl_varying!(MoebiusVarying {
    world_position,
    normal,
    eye_offset,
    camera_distance,
    noise,
});

/// The stylised shading program
#[derive(Debug, Clone, Copy)]
pub struct MoebiusProgram<'a> {
    /// Material parameters
    pub material: &'a MaterialConfig,
    /// This frame's uniforms
    pub uniforms: &'a FrameUniforms,
    /// Transforms of the draw
    pub transforms: DrawTransforms,
}

impl ShaderProgram for MoebiusProgram<'_> {
    type Vertex = Vertex;
    type Varying = MoebiusVarying;

    fn vertex(&self, vertex: &Vertex) -> VertexOutput<MoebiusVarying> {
        let local = vertex.position();
        let world = (self.transforms.model * Vec4::new(local.x, local.y, local.z, 1.0)).xyz();
        let normal = shading::smoothing::normalize_or(self.transforms.normal_matrix * vertex.normal(), Vec3::y());
        let eye_offset = world - self.uniforms.camera_position;
        VertexOutput {
            clip: self.transforms.view_projection * Vec4::new(world.x, world.y, world.z, 1.0),
            varying: MoebiusVarying {
                world_position: world,
                normal,
                eye_offset,
                camera_distance: eye_offset.norm(),
                noise: vertex_noise(world, self.uniforms.time),
            },
        }
    }

    fn fragment(&self, fragment: &Fragment<MoebiusVarying>) -> Option<Vec4> {
        let input = FragmentInput {
            frag_coord: fragment.frag_coord,
            normal: fragment.varying.normal,
            normal_gradient: Derivatives::new(fragment.ddx.normal, fragment.ddy.normal),
            world_position: fragment.varying.world_position,
            position_gradient: Derivatives::new(fragment.ddx.world_position, fragment.ddy.world_position),
            view_position: fragment.varying.eye_offset,
            camera_distance: fragment.varying.camera_distance,
        };
        Some(shading::shade_fragment(self.material, self.uniforms, &input).color)
    }
}

/// Flat-colour outline program
#[derive(Debug, Clone, Copy)]
pub struct SilhouetteProgram<'a> {
    /// Outline settings
    pub config: &'a SilhouetteConfig,
    /// Transforms of the draw
    pub transforms: DrawTransforms,
}

impl ShaderProgram for SilhouetteProgram<'_> {
    type Vertex = Vertex;
    type Varying = NoVarying;

    fn vertex(&self, vertex: &Vertex) -> VertexOutput<NoVarying> {
        let displaced = vertex.position() + vertex.normal() * self.config.outline_width;
        let world = self.transforms.model * Vec4::new(displaced.x, displaced.y, displaced.z, 1.0);
        VertexOutput {
            clip: self.transforms.view_projection * world,
            varying: NoVarying,
        }
    }

    fn fragment(&self, _fragment: &Fragment<NoVarying>) -> Option<Vec4> {
        let color = self.config.color;
        Some(Vec4::new(color.x, color.y, color.z, 1.0))
    }
}

/// Statistics of both passes
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct CompositorStats {
    /// Outline pass
    pub silhouette: DrawStats,
    /// Stylised pass
    pub main: DrawStats,
}

/// A mesh drawn with an outline
#[derive(Debug, Clone)]
pub struct TwoPassCompositor {
    mesh: Arc<Mesh>,
    material: MaterialConfig,
    silhouette: SilhouetteConfig,
    /// Model transform applied to both passes
    pub transform: Transform,
}

impl TwoPassCompositor {
    /// Wrap shared geometry
    pub fn new(mesh: Arc<Mesh>, material: MaterialConfig, silhouette: SilhouetteConfig) -> Self {
        Self {
            mesh,
            material,
            silhouette,
            transform: Transform::identity(),
        }
    }

    /// The shared geometry
    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    /// Material of the main pass
    pub fn material(&self) -> &MaterialConfig {
        &self.material
    }

    /// Settings of the outline pass
    pub fn silhouette(&self) -> &SilhouetteConfig {
        &self.silhouette
    }

    /// World-space bounding sphere of the mesh under the current transform
    pub fn world_bounds(&self) -> (Vec3, f32) {
        let (center, radius) = self.mesh.bounding_sphere();
        let world = self.transform.transform_point(center.into());
        (world.coords, radius * self.transform.max_scale())
    }

    /// Outline pass only
    pub fn draw_silhouette(
        &self,
        target: &mut Framebuffer,
        camera: &Camera,
    ) -> Result<DrawStats, RenderError> {
        let program = SilhouetteProgram {
            config: &self.silhouette,
            transforms: DrawTransforms::new(self.transform.to_matrix(), camera),
        };
        raster::draw_indexed(
            target,
            &PipelineConfig::silhouette(),
            &program,
            &self.mesh.vertices,
            &self.mesh.indices,
        )
    }

    /// Stylised pass only
    pub fn draw_main(
        &self,
        target: &mut Framebuffer,
        camera: &Camera,
        uniforms: &FrameUniforms,
    ) -> Result<DrawStats, RenderError> {
        let program = MoebiusProgram {
            material: &self.material,
            uniforms,
            transforms: DrawTransforms::new(self.transform.to_matrix(), camera),
        };
        raster::draw_indexed(
            target,
            &PipelineConfig::moebius(),
            &program,
            &self.mesh.vertices,
            &self.mesh.indices,
        )
    }

    /// Silhouette then main pass, same transform, same frame
    pub fn draw(
        &self,
        target: &mut Framebuffer,
        camera: &Camera,
        uniforms: &FrameUniforms,
    ) -> Result<CompositorStats, RenderError> {
        let silhouette = self.draw_silhouette(target, camera)?;
        let main = self.draw_main(target, camera, uniforms)?;
        log::trace!(
            "Outlined mesh: {} outline fragments, {} shaded fragments",
            silhouette.fragments_written,
            main.fragments_written
        );
        Ok(CompositorStats { silhouette, main })
    }
}

/// Resolution uniform matching a framebuffer
pub fn resolution_of(target: &Framebuffer) -> Vec2 {
    Vec2::new(target.width() as f32, target.height() as f32)
}
