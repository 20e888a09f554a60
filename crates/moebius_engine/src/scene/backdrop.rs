//! The assembled backdrop scene
//!
//! [`Backdrop`] owns everything one frame needs: camera, lighting rig,
//! viewport controller, sky, stars, particles and the outlined mesh. A frame
//! is `update` (resize, uniforms, animation) followed by `render`.

use std::sync::Arc;
use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::core::config::BackdropConfig;
use crate::foundation::math::Vec4;
use crate::render::compositor::{CompositorStats, TwoPassCompositor};
use crate::render::lighting::LightingEnvironment;
use crate::render::primitives::{Camera, Mesh};
use crate::render::raster::{DrawStats, Framebuffer};
use crate::render::uniforms::FrameUniforms;
use crate::render::viewport::{ResizeSender, Viewport, ViewportController};
use crate::render::RenderError;

use super::particles::ParticleField;
use super::sky::SkyDome;
use super::stars::StarField;

/// What `update` did this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameUpdate {
    /// New viewport, if a resize settled
    pub resized: Option<Viewport>,
    /// Whether the mesh was in view and turned
    pub mesh_rotated: bool,
    /// Whether the particles were in view and turned
    pub particles_rotated: bool,
}

/// Draw statistics of one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStats {
    /// Sky sphere
    pub sky: DrawStats,
    /// Star sprites
    pub stars: DrawStats,
    /// Outline and stylised passes
    pub mesh: CompositorStats,
    /// Particle sprites
    pub particles: DrawStats,
}

/// The complete scene
#[derive(Debug)]
pub struct Backdrop {
    camera: Camera,
    lighting: LightingEnvironment,
    viewport: ViewportController,
    uniforms: FrameUniforms,
    sky: SkyDome,
    stars: StarField,
    particles: ParticleField,
    mesh: TwoPassCompositor,
    mesh_rotation: f32,
    frame_count: u64,
}

impl Backdrop {
    /// Assemble the scene around `mesh`
    pub fn new(config: &BackdropConfig, mesh: Arc<Mesh>) -> Self {
        let initial = config.output.viewport();
        let camera = config.camera.build(initial.aspect());
        let mut rng = StdRng::seed_from_u64(config.seed);
        let stars = StarField::new(config.stars.clone(), &mut rng);
        let particles = ParticleField::new(config.particles.clone(), &mut rng);

        log::info!(
            "Backdrop scene: {} triangles, {} stars, {} particles, {}x{}",
            mesh.triangle_count(),
            stars.stars().len(),
            particles.positions().len(),
            initial.width,
            initial.height
        );

        let uniforms = FrameUniforms {
            time: 0.0,
            camera_position: camera.position,
            resolution: initial.resolution(),
        };

        Self {
            camera,
            lighting: LightingEnvironment::backdrop(),
            viewport: ViewportController::new(initial, config.resize_debounce()),
            uniforms,
            sky: SkyDome::new(config.sky.clone()),
            stars,
            particles,
            mesh: TwoPassCompositor::new(mesh, config.material.clone(), config.silhouette.clone()),
            mesh_rotation: config.mesh_rotation,
            frame_count: 0,
        }
    }

    /// Handle for reporting drawable size changes, from any thread
    pub fn resize_sender(&self) -> ResizeSender {
        self.viewport.sender()
    }

    /// Currently applied viewport; render targets should match it
    pub fn viewport(&self) -> Viewport {
        self.viewport.viewport()
    }

    /// Scene camera
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Lighting rig
    pub fn lighting(&self) -> &LightingEnvironment {
        &self.lighting
    }

    /// Uniforms written by the last `update`
    pub fn uniforms(&self) -> &FrameUniforms {
        &self.uniforms
    }

    /// The outlined mesh
    pub fn mesh(&self) -> &TwoPassCompositor {
        &self.mesh
    }

    /// Sky sphere
    pub fn sky(&self) -> &SkyDome {
        &self.sky
    }

    /// Star field
    pub fn stars(&self) -> &StarField {
        &self.stars
    }

    /// Particle group
    pub fn particles(&self) -> &ParticleField {
        &self.particles
    }

    /// Frames updated so far
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Advance one frame
    ///
    /// `elapsed` is the scene time in seconds fed to the shaders; `now` is the
    /// clock the resize debounce runs on. A settled resize is applied first so
    /// this frame's uniforms and camera already use it.
    pub fn update(&mut self, elapsed: f32, now: Duration) -> FrameUpdate {
        let resized = self.viewport.poll(now);
        if let Some(viewport) = resized {
            self.camera.set_aspect_ratio(viewport.aspect());
        }

        self.uniforms = FrameUniforms {
            time: elapsed,
            camera_position: self.camera.position,
            resolution: self.viewport.viewport().resolution(),
        };

        let frustum = self.camera.frustum();
        let (center, radius) = self.mesh.world_bounds();
        let mesh_rotated = frustum.intersects_sphere(center, radius);
        if mesh_rotated {
            self.mesh.transform.rotate_local_y(self.mesh_rotation);
        }
        let particles_rotated = self.particles.update(&frustum);

        self.frame_count += 1;
        FrameUpdate {
            resized,
            mesh_rotated,
            particles_rotated,
        }
    }

    /// Draw the frame: sky, stars, outline, mesh, particles
    pub fn render(&self, target: &mut Framebuffer) -> Result<FrameStats, RenderError> {
        let viewport = self.viewport.viewport();
        if (target.width(), target.height()) != (viewport.width, viewport.height) {
            log::debug!(
                "Render target {}x{} differs from viewport {}x{}",
                target.width(),
                target.height(),
                viewport.width,
                viewport.height
            );
        }

        target.clear(Vec4::new(0.0, 0.0, 0.0, 1.0));
        let sky = self.sky.draw(target, &self.camera)?;
        let stars = self.stars.draw(target, &self.camera, self.uniforms.time);
        let mesh = self.mesh.draw(target, &self.camera, &self.uniforms)?;
        let particles = self.particles.draw(target, &self.camera);

        let stats = FrameStats {
            sky,
            stars,
            mesh,
            particles,
        };
        log::trace!("Frame {}: {:?}", self.frame_count, stats);
        Ok(stats)
    }
}
