//! Lighting rig
//!
//! The stylised material carries its own key-light direction. The rig records
//! the scene lights for hosts that draw extra lit geometry, and exposes the
//! key light so the material can be aligned with it.

use crate::foundation::math::Vec3;

/// Light types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LightType {
    /// Directional light (like sunlight)
    Directional,
    /// Point light (like a lightbulb)
    Point,
}

/// Light source
#[derive(Debug, Clone, PartialEq)]
pub struct Light {
    /// Light type
    pub light_type: LightType,
    /// Light position; for directional lights the point it shines from
    pub position: Vec3,
    /// Direction the light travels (directional lights only)
    pub direction: Vec3,
    /// Light color
    pub color: Vec3,
    /// Light intensity
    pub intensity: f32,
    /// Cut-off distance for point lights; 0 means unlimited
    pub range: f32,
}

impl Light {
    /// Directional light placed at `position` shining at the origin
    pub fn directional_from(position: Vec3, color: Vec3, intensity: f32) -> Self {
        Self {
            light_type: LightType::Directional,
            position,
            direction: (-position).try_normalize(f32::EPSILON).unwrap_or_else(|| -Vec3::y()),
            color,
            intensity,
            range: 0.0,
        }
    }

    /// Create a point light
    pub fn point(position: Vec3, color: Vec3, intensity: f32, range: f32) -> Self {
        Self {
            light_type: LightType::Point,
            position,
            direction: Vec3::zeros(),
            color,
            intensity,
            range,
        }
    }

    /// Unit vector from a surface towards a directional light
    pub fn to_light(&self) -> Vec3 {
        -self.direction
    }
}

/// Lighting environment containing multiple lights
#[derive(Debug, Clone, PartialEq)]
pub struct LightingEnvironment {
    /// List of lights in the scene
    pub lights: Vec<Light>,
    /// Ambient light color
    pub ambient_color: Vec3,
    /// Ambient light intensity
    pub ambient_intensity: f32,
}

impl LightingEnvironment {
    /// Create a new empty lighting environment
    pub fn new() -> Self {
        Self {
            lights: Vec::new(),
            ambient_color: Vec3::new(1.0, 1.0, 1.0),
            ambient_intensity: 0.1,
        }
    }

    /// Add a light to the environment
    pub fn add_light(mut self, light: Light) -> Self {
        self.lights.push(light);
        self
    }

    /// Set ambient lighting
    pub fn with_ambient(mut self, color: Vec3, intensity: f32) -> Self {
        self.ambient_color = color;
        self.ambient_intensity = intensity;
        self
    }

    /// The backdrop rig: soft white ambient, a white key light above and to
    /// the side, and a sky-blue and a violet fill from below
    pub fn backdrop() -> Self {
        let sky_blue = Vec3::new(14.0, 165.0, 233.0) / 255.0;
        let violet = Vec3::new(168.0, 85.0, 247.0) / 255.0;
        Self::new()
            .with_ambient(Vec3::repeat(1.0), 0.4)
            .add_light(Light::directional_from(Vec3::new(10.0, 10.0, 5.0), Vec3::repeat(1.0), 1.0))
            .add_light(Light::point(Vec3::new(-10.0, -10.0, -5.0), sky_blue, 0.5, 0.0))
            .add_light(Light::point(Vec3::new(10.0, -10.0, 5.0), violet, 0.5, 0.0))
    }

    /// First directional light
    pub fn key_light(&self) -> Option<&Light> {
        self.lights
            .iter()
            .find(|light| light.light_type == LightType::Directional)
    }
}

impl Default for LightingEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_backdrop_rig() {
        let rig = LightingEnvironment::backdrop();
        assert_eq!(rig.lights.len(), 3);
        assert_eq!(rig.ambient_intensity, 0.4);
        let points = rig.lights.iter().filter(|l| l.light_type == LightType::Point).count();
        assert_eq!(points, 2);

        let key = rig.key_light().unwrap();
        assert_relative_eq!(key.to_light(), Vec3::new(10.0, 10.0, 5.0).normalize(), epsilon = 1e-6);
        assert_relative_eq!(rig.lights[1].color.z, 233.0 / 255.0, epsilon = 1e-6);
    }

    #[test]
    fn test_directional_at_origin_points_down() {
        let light = Light::directional_from(Vec3::zeros(), Vec3::repeat(1.0), 1.0);
        assert_eq!(light.direction, -Vec3::y());
        assert!(LightingEnvironment::new().key_light().is_none());
    }
}
