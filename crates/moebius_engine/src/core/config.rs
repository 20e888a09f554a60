//! # Backdrop Configuration
//!
//! Every tunable of the scene in one serialisable tree, loadable from TOML or
//! RON through [`Config`]. Defaults give the stock backdrop scene.
//!
//! ```toml
//! seed = 42
//! mesh_rotation = 0.0001
//!
//! [camera]
//! position = [20.0, -15.0, 0.1]
//! fov_degrees = 110.0
//!
//! [material.zones]
//! threshold1 = 0.7
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::foundation::math::Vec3;
use crate::render::material::{MaterialConfig, SilhouetteConfig};
use crate::render::primitives::{Camera, NeuronParams};
use crate::render::viewport::Viewport;
use crate::scene::{ParticleConfig, SkyConfig, StarFieldConfig};

pub use crate::config::{Config, ConfigError, ConfigFormat};

/// Camera placement and lens
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// World position
    pub position: Vec3,
    /// Point looked at
    pub target: Vec3,
    /// Vertical field of view in degrees
    pub fov_degrees: f32,
    /// Near plane distance
    pub near: f32,
    /// Far plane distance
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: Vec3::new(20.0, -15.0, 0.1),
            target: Vec3::zeros(),
            fov_degrees: 110.0,
            near: 0.01,
            far: 5000.0,
        }
    }
}

impl CameraConfig {
    /// Build a camera for a viewport aspect ratio
    pub fn build(&self, aspect: f32) -> Camera {
        let mut camera = Camera::perspective(self.position, self.fov_degrees, aspect, self.near, self.far);
        camera.look_at(self.target, Vec3::y());
        camera
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if !(self.fov_degrees > 0.0 && self.fov_degrees < 180.0) {
            return Err(ConfigError::Invalid {
                field: "camera.fov_degrees",
                reason: format!("must be between 0 and 180, got {}", self.fov_degrees),
            });
        }
        if !(self.near > 0.0 && self.far > self.near && self.far.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "camera.far",
                reason: format!("need 0 < near < far, got near {} far {}", self.near, self.far),
            });
        }
        if (self.position - self.target).norm_squared() <= f32::EPSILON {
            return Err(ConfigError::Invalid {
                field: "camera.target",
                reason: "must differ from the camera position".to_string(),
            });
        }
        Ok(())
    }
}

/// Headless output size
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            width: 960,
            height: 540,
        }
    }
}

impl OutputConfig {
    /// As a viewport
    pub fn viewport(&self) -> Viewport {
        Viewport::new(self.width, self.height)
    }
}

/// Complete scene configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackdropConfig {
    /// Seed for stars and particles
    pub seed: u64,
    /// Radians the mesh turns about its Y axis per visible frame
    pub mesh_rotation: f32,
    /// Quiet period before a resize is applied, in milliseconds
    pub resize_debounce_ms: u64,
    /// Render size
    pub output: OutputConfig,
    /// Camera
    pub camera: CameraConfig,
    /// Stylised material of the mesh
    pub material: MaterialConfig,
    /// Outline pass
    pub silhouette: SilhouetteConfig,
    /// Sky sphere
    pub sky: SkyConfig,
    /// Star field
    pub stars: StarFieldConfig,
    /// Dust particles
    pub particles: ParticleConfig,
    /// Procedural mesh used when no mesh file is given
    pub neuron: NeuronParams,
}

impl Default for BackdropConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            mesh_rotation: 0.0001,
            resize_debounce_ms: 100,
            output: OutputConfig::default(),
            camera: CameraConfig::default(),
            material: MaterialConfig::backdrop(),
            silhouette: SilhouetteConfig::default(),
            sky: SkyConfig::default(),
            stars: StarFieldConfig::default(),
            particles: ParticleConfig::default(),
            neuron: NeuronParams::default(),
        }
    }
}

impl BackdropConfig {
    /// Resize debounce as a duration
    pub fn resize_debounce(&self) -> Duration {
        Duration::from_millis(self.resize_debounce_ms)
    }
}

impl Config for BackdropConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.output.width == 0 || self.output.height == 0 {
            return Err(ConfigError::Invalid {
                field: "output",
                reason: format!("size must be non-zero, got {}x{}", self.output.width, self.output.height),
            });
        }
        if !self.mesh_rotation.is_finite() {
            return Err(ConfigError::Invalid {
                field: "mesh_rotation",
                reason: "must be finite".to_string(),
            });
        }
        self.camera.validate()?;
        self.material.validate()?;
        self.silhouette.validate()?;

        if !(self.sky.radius > 0.0 && self.sky.radius.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "sky.radius",
                reason: format!("must be positive, got {}", self.sky.radius),
            });
        }
        if !(self.stars.radius >= 0.0 && self.stars.depth >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "stars",
                reason: "radius and depth must be non-negative".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&self.particles.opacity) {
            return Err(ConfigError::Invalid {
                field: "particles.opacity",
                reason: format!("must be within 0..=1, got {}", self.particles.opacity),
            });
        }
        if !(self.particles.spread >= 0.0 && self.particles.size >= 0.0) {
            return Err(ConfigError::Invalid {
                field: "particles",
                reason: "spread and size must be non-negative".to_string(),
            });
        }
        Ok(())
    }
}
