//! Material parameters for the stylised mesh and its outline
//!
//! [`MaterialConfig`] holds every tunable input of the fragment program. It is
//! built once, validated, and then only read; per-frame values live in
//! [`FrameUniforms`](crate::render::uniforms::FrameUniforms).

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::foundation::math::Vec3;
use crate::render::shading::color::{self, ColorZones, HslAdjust};
use crate::render::shading::hatching::HatchingConfig;

/// Stylised shading parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaterialConfig {
    /// Nominal surface colour, uploaded with the material block
    #[serde(with = "color::hex_rgb")]
    pub base_color: Vec3,
    /// Multiplier on the lighting term
    pub brightness: f32,
    /// Extra multiplier applied before colour-zone lookup only
    pub color_level: f32,
    /// Brightness-indexed colours and thresholds
    pub zones: ColorZones,
    /// Global HSL adjustment
    pub adjust: HslAdjust,
    /// Exponent of the Fresnel rim term
    pub fresnel_power: f32,
    /// Scale of the artifact estimate
    pub artifact_reduction: f32,
    /// Base strength of the normal blur
    pub normal_perturbation: f32,
    /// Amount of world-space noise added to the colour
    pub color_smoothing: f32,
    /// Replace the zone colour with a grey ramp of the hatch spacing
    pub debug_distance: bool,
    /// Direction towards the key light, world space
    ///
    /// Normals are lit in world space, so the light stays fixed to the scene
    /// rather than following the camera.
    pub light_direction: Vec3,
    /// Hatching parameters
    pub hatching: HatchingConfig,
}

impl Default for MaterialConfig {
    fn default() -> Self {
        Self {
            base_color: Vec3::new(14.0 / 255.0, 165.0 / 255.0, 233.0 / 255.0),
            brightness: 1.0,
            color_level: 1.0,
            zones: ColorZones::default(),
            adjust: HslAdjust::default(),
            fresnel_power: 2.0,
            artifact_reduction: 0.5,
            normal_perturbation: 1.5,
            color_smoothing: 0.3,
            debug_distance: false,
            light_direction: Vec3::new(1.0, 1.0, 1.0).normalize(),
            hatching: HatchingConfig::default(),
        }
    }
}

impl MaterialConfig {
    /// Settings used for the background neuron: almost everything above the
    /// dark zone blends slowly into the bright colour
    pub fn backdrop() -> Self {
        Self {
            zones: ColorZones {
                threshold1: 0.7,
                threshold2: 0.0001,
                blend_width: 0.5,
                ..ColorZones::default()
            },
            ..Self::default()
        }
    }

    /// Unit light direction; +Y when the configured vector has no length
    pub fn light_dir(&self) -> Vec3 {
        self.light_direction
            .try_normalize(f32::EPSILON)
            .unwrap_or_else(Vec3::y)
    }

    /// Check value ranges
    ///
    /// Out-of-order colour thresholds are accepted with a warning; shading
    /// then inverts the zone order.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let scalars = [
            ("material.brightness", self.brightness),
            ("material.color_level", self.color_level),
            ("material.zones.threshold1", self.zones.threshold1),
            ("material.zones.threshold2", self.zones.threshold2),
            ("material.zones.blend_width", self.zones.blend_width),
            ("material.fresnel_power", self.fresnel_power),
            ("material.artifact_reduction", self.artifact_reduction),
            ("material.normal_perturbation", self.normal_perturbation),
            ("material.color_smoothing", self.color_smoothing),
        ];
        for (field, value) in scalars {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::Invalid {
                    field,
                    reason: format!("must be a finite non-negative number, got {value}"),
                });
            }
        }

        if !self.light_direction.iter().all(|v| v.is_finite())
            || self.light_direction.norm_squared() <= f32::EPSILON
        {
            return Err(ConfigError::Invalid {
                field: "material.light_direction",
                reason: "must be a finite non-zero vector".to_string(),
            });
        }

        let hatching = &self.hatching;
        if !(hatching.base_line_spacing > 0.0 && hatching.base_line_spacing.is_finite()) {
            return Err(ConfigError::Invalid {
                field: "material.hatching.base_line_spacing",
                reason: format!("must be positive, got {}", hatching.base_line_spacing),
            });
        }
        let band_multipliers = hatching
            .bands
            .bands()
            .iter()
            .map(|band| band.multipliers)
            .chain(std::iter::once(hatching.bands.beyond()));
        for multipliers in band_multipliers {
            if !(multipliers.spacing > 0.0) || !(multipliers.intensity >= 0.0) {
                return Err(ConfigError::Invalid {
                    field: "material.hatching.bands",
                    reason: format!(
                        "spacing must be positive and intensity non-negative, got {}/{}",
                        multipliers.spacing, multipliers.intensity
                    ),
                });
            }
        }

        if !self.zones.is_ordered() {
            log::warn!(
                "Colour thresholds are out of order (threshold2 {} >= threshold1 {}); zones will render inverted",
                self.zones.threshold2,
                self.zones.threshold1
            );
        }
        if hatching.level2 >= hatching.level1 {
            log::warn!(
                "Hatch level2 {} is not below level1 {}; the second layer covers the first",
                hatching.level2,
                hatching.level1
            );
        }

        Ok(())
    }
}

/// Outline pass parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SilhouetteConfig {
    /// Outward displacement along the vertex normal, object units
    pub outline_width: f32,
    /// Outline colour
    #[serde(with = "color::hex_rgb")]
    pub color: Vec3,
}

impl Default for SilhouetteConfig {
    fn default() -> Self {
        Self {
            outline_width: 0.00002,
            color: Vec3::zeros(),
        }
    }
}

impl SilhouetteConfig {
    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.outline_width.is_finite() || self.outline_width < 0.0 {
            return Err(ConfigError::Invalid {
                field: "silhouette.outline_width",
                reason: format!("must be a finite non-negative number, got {}", self.outline_width),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_defaults() {
        let material = MaterialConfig::default();
        assert_eq!(color::to_hex_rgb(material.base_color), "#0ea5e9");
        assert_relative_eq!(material.light_dir(), Vec3::repeat(1.0 / 3.0_f32.sqrt()), epsilon = 1e-6);
        assert_eq!(material.zones.threshold1, 0.6);
        assert_eq!(material.zones.threshold2, 0.3);
        assert!(material.validate().is_ok());
    }

    #[test]
    fn test_backdrop_preset_overrides_zones_only() {
        let preset = MaterialConfig::backdrop();
        assert_eq!(preset.zones.threshold1, 0.7);
        assert_eq!(preset.zones.threshold2, 0.0001);
        assert_eq!(preset.zones.blend_width, 0.5);
        assert_eq!(preset.hatching, HatchingConfig::default());
        assert!(preset.validate().is_ok());
    }

    #[test]
    fn test_reversed_thresholds_are_accepted() {
        let mut material = MaterialConfig::default();
        material.zones.threshold1 = 0.2;
        material.zones.threshold2 = 0.8;
        assert!(material.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_values() {
        let mut material = MaterialConfig::default();
        material.brightness = f32::NAN;
        assert!(matches!(
            material.validate(),
            Err(ConfigError::Invalid { field: "material.brightness", .. })
        ));

        let mut material = MaterialConfig::default();
        material.light_direction = Vec3::zeros();
        assert!(matches!(
            material.validate(),
            Err(ConfigError::Invalid { field: "material.light_direction", .. })
        ));

        let mut silhouette = SilhouetteConfig::default();
        silhouette.outline_width = -1.0;
        assert!(silhouette.validate().is_err());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let material: MaterialConfig = toml::from_str(
            "base_color = \"#a855f7\"\ncolor_level = 1.4\n[zones]\nthreshold1 = 0.8\n",
        )
        .unwrap();
        assert_eq!(material.color_level, 1.4);
        assert_eq!(material.zones.threshold1, 0.8);
        assert_eq!(material.zones.threshold2, 0.3);
        assert_eq!(color::to_hex_rgb(material.base_color), "#a855f7");
        assert!(toml::from_str::<MaterialConfig>("base_color = \"blue\"").is_err());
    }
}
