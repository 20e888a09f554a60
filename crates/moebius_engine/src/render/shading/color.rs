//! HSL colour zones
//!
//! Lighting brightness picks one of three HSL colours (dark, mid, bright).
//! Around each threshold a window of `blend_width` on either side blends the
//! neighbouring zones with a smoothstep factor so there is no visible banding.
//! Global hue/saturation/lightness adjustments are applied to the resolved
//! colour before conversion to RGB.

use serde::{Deserialize, Serialize};

use crate::foundation::math::{utils, Vec3};

/// Hue (degrees), saturation and lightness (both `0..=1`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    /// Hue in degrees
    pub h: f32,
    /// Saturation
    pub s: f32,
    /// Lightness
    pub l: f32,
}

impl Hsl {
    /// Create an HSL triple
    pub const fn new(h: f32, s: f32, l: f32) -> Self {
        Self { h, s, l }
    }

    /// Component-wise linear interpolation
    pub fn mix(self, other: Self, t: f32) -> Self {
        Self {
            h: utils::mix(self.h, other.h, t),
            s: utils::mix(self.s, other.s, t),
            l: utils::mix(self.l, other.l, t),
        }
    }

    /// Standard HSL to RGB conversion
    ///
    /// Hue is taken as-is (callers wrap it first); values outside `0..360` fall
    /// into the last sextant, as the shader does.
    pub fn to_rgb(self) -> Vec3 {
        let h = self.h / 360.0;
        let c = (1.0 - (2.0 * self.l - 1.0).abs()) * self.s;
        let x = c * (1.0 - (utils::glsl_mod(h * 6.0, 2.0) - 1.0).abs());
        let m = self.l - c / 2.0;

        let rgb = if h < 1.0 / 6.0 {
            Vec3::new(c, x, 0.0)
        } else if h < 2.0 / 6.0 {
            Vec3::new(x, c, 0.0)
        } else if h < 3.0 / 6.0 {
            Vec3::new(0.0, c, x)
        } else if h < 4.0 / 6.0 {
            Vec3::new(0.0, x, c)
        } else if h < 5.0 / 6.0 {
            Vec3::new(x, 0.0, c)
        } else {
            Vec3::new(c, 0.0, x)
        };

        rgb.add_scalar(m)
    }
}

/// Global adjustment applied after zone resolution
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HslAdjust {
    /// Degrees added to the hue, wrapped into `0..360`
    pub hue_shift: f32,
    /// Saturation multiplier (result clamped to `0..=1`)
    pub saturation_multiplier: f32,
    /// Lightness multiplier (result clamped to `0..=1`)
    pub lightness_multiplier: f32,
}

impl Default for HslAdjust {
    fn default() -> Self {
        Self {
            hue_shift: 0.0,
            saturation_multiplier: 1.0,
            lightness_multiplier: 1.0,
        }
    }
}

impl HslAdjust {
    /// Apply the adjustment to `hsl`
    pub fn apply(&self, hsl: Hsl) -> Hsl {
        Hsl {
            h: (hsl.h + self.hue_shift).rem_euclid(360.0),
            s: (hsl.s * self.saturation_multiplier).clamp(0.0, 1.0),
            l: (hsl.l * self.lightness_multiplier).clamp(0.0, 1.0),
        }
    }
}

/// The three brightness-indexed colours and their boundaries
///
/// `threshold2 < threshold1` is expected; reversed thresholds are accepted and
/// produce an inverted zone order rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColorZones {
    /// Colour above `threshold1`
    pub bright: Hsl,
    /// Colour between the thresholds
    pub mid: Hsl,
    /// Colour below `threshold2`
    pub dark: Hsl,
    /// Boundary between mid and bright
    pub threshold1: f32,
    /// Boundary between dark and mid
    pub threshold2: f32,
    /// Half-width of the blend window around each threshold
    pub blend_width: f32,
}

impl Default for ColorZones {
    fn default() -> Self {
        Self {
            bright: Hsl::new(210.0, 0.3, 0.8),
            mid: Hsl::new(220.0, 0.4, 0.75),
            dark: Hsl::new(340.0, 0.3, 0.7),
            threshold1: 0.6,
            threshold2: 0.3,
            blend_width: 0.1,
        }
    }
}

/// Which zone (or transition) a brightness value landed in
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ZoneSample {
    /// Flat dark zone
    Dark,
    /// Flat mid zone
    Mid,
    /// Flat bright zone
    Bright,
    /// Inside the window around `threshold1`, with the mid→bright blend factor
    UpperTransition(f32),
    /// Inside the window around `threshold2`, with the dark→mid blend factor
    LowerTransition(f32),
}

impl ColorZones {
    /// Whether the thresholds are in the expected order
    pub fn is_ordered(&self) -> bool {
        self.threshold2 < self.threshold1
    }

    /// Classify a brightness value that is already clamped to `0..=1`
    ///
    /// When the two blend windows overlap, the window around `threshold1` is
    /// tested first and takes precedence, so the higher transition wins even
    /// where a "later transition wins" reading would pick the `threshold2` one.
    pub fn classify(&self, brightness: f32) -> ZoneSample {
        let w = self.blend_width;
        let in_window = |t: f32| brightness > t - w && brightness < t + w;

        if in_window(self.threshold1) {
            let blend = utils::smoothstep(self.threshold1 - w, self.threshold1 + w, brightness);
            ZoneSample::UpperTransition(blend)
        } else if in_window(self.threshold2) {
            let blend = utils::smoothstep(self.threshold2 - w, self.threshold2 + w, brightness);
            ZoneSample::LowerTransition(blend)
        } else if brightness > self.threshold1 {
            ZoneSample::Bright
        } else if brightness > self.threshold2 {
            ZoneSample::Mid
        } else {
            ZoneSample::Dark
        }
    }

    /// Resolve brightness to an unadjusted HSL colour
    pub fn resolve_hsl(&self, brightness: f32) -> Hsl {
        match self.classify(brightness) {
            ZoneSample::Dark => self.dark,
            ZoneSample::Mid => self.mid,
            ZoneSample::Bright => self.bright,
            ZoneSample::UpperTransition(blend) => self.mid.mix(self.bright, blend),
            ZoneSample::LowerTransition(blend) => self.dark.mix(self.mid, blend),
        }
    }
}

/// Full colour-zone stage: zone lookup, global adjustment, RGB conversion
pub fn resolve_zone_color(zones: &ColorZones, adjust: &HslAdjust, brightness: f32) -> Vec3 {
    adjust.apply(zones.resolve_hsl(brightness)).to_rgb()
}

/// Parse `#rrggbb` (leading `#` optional) into `0..=1` RGB
pub fn parse_hex_rgb(hex: &str) -> Option<Vec3> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 {
        return None;
    }
    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(digits.get(range)?, 16).ok().map(|v| f32::from(v) / 255.0)
    };
    Some(Vec3::new(channel(0..2)?, channel(2..4)?, channel(4..6)?))
}

/// Format `0..=1` RGB as `#rrggbb`
pub fn to_hex_rgb(color: Vec3) -> String {
    let byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", byte(color.x), byte(color.y), byte(color.z))
}

/// Serde adapter storing an RGB colour as a `#rrggbb` string
pub mod hex_rgb {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    use super::{parse_hex_rgb, to_hex_rgb};
    use crate::foundation::math::Vec3;

    /// Write the colour as `#rrggbb`
    pub fn serialize<S: Serializer>(color: &Vec3, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&to_hex_rgb(*color))
    }

    /// Read a `#rrggbb` string
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec3, D::Error> {
        let text = String::deserialize(deserializer)?;
        parse_hex_rgb(&text).ok_or_else(|| D::Error::custom(format!("invalid colour '{text}', expected #rrggbb")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hsl_primaries() {
        assert_relative_eq!(Hsl::new(0.0, 1.0, 0.5).to_rgb(), Vec3::new(1.0, 0.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(Hsl::new(120.0, 1.0, 0.5).to_rgb(), Vec3::new(0.0, 1.0, 0.0), epsilon = 1e-6);
        assert_relative_eq!(Hsl::new(240.0, 1.0, 0.5).to_rgb(), Vec3::new(0.0, 0.0, 1.0), epsilon = 1e-6);
        assert_relative_eq!(Hsl::new(77.0, 0.0, 0.25).to_rgb(), Vec3::repeat(0.25), epsilon = 1e-6);
    }

    #[test]
    fn test_bright_zone_colour_is_light_blue() {
        let rgb = Hsl::new(210.0, 0.3, 0.8).to_rgb();
        assert_relative_eq!(rgb, Vec3::new(0.74, 0.8, 0.86), epsilon = 1e-5);
    }

    #[test]
    fn test_extremes_pick_outer_zones() {
        let zones = ColorZones::default();
        let adjust = HslAdjust::default();
        assert_eq!(zones.resolve_hsl(0.0), zones.dark);
        assert_eq!(zones.resolve_hsl(1.0), zones.bright);
        assert_relative_eq!(resolve_zone_color(&zones, &adjust, 1.0), zones.bright.to_rgb(), epsilon = 1e-6);
        assert_relative_eq!(resolve_zone_color(&zones, &adjust, 0.0), zones.dark.to_rgb(), epsilon = 1e-6);
    }

    #[test]
    fn test_exact_threshold_is_midpoint_blend() {
        let zones = ColorZones::default();

        let ZoneSample::UpperTransition(blend) = zones.classify(zones.threshold1) else {
            panic!("threshold1 should sit inside its blend window");
        };
        assert_relative_eq!(blend, 0.5, epsilon = 1e-5);
        let upper = zones.resolve_hsl(zones.threshold1);
        assert_relative_eq!(upper.h, (zones.mid.h + zones.bright.h) * 0.5, epsilon = 1e-3);
        assert_relative_eq!(upper.s, (zones.mid.s + zones.bright.s) * 0.5, epsilon = 1e-6);

        let ZoneSample::LowerTransition(blend) = zones.classify(zones.threshold2) else {
            panic!("threshold2 should sit inside its blend window");
        };
        assert_relative_eq!(blend, 0.5, epsilon = 1e-5);
        let lower = zones.resolve_hsl(zones.threshold2);
        assert_relative_eq!(lower.h, (zones.dark.h + zones.mid.h) * 0.5, epsilon = 1e-3);
        assert_relative_eq!(lower.l, (zones.dark.l + zones.mid.l) * 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_blend_is_continuous_across_window_edges() {
        let zones = ColorZones::default();
        let edge = zones.threshold1 + zones.blend_width;
        let inside = zones.resolve_hsl(edge - 1e-4);
        let outside = zones.resolve_hsl(edge + 1e-4);
        assert_relative_eq!(inside.h, outside.h, epsilon = 1e-2);
        assert_relative_eq!(inside.s, outside.s, epsilon = 1e-4);
    }

    #[test]
    fn test_overlapping_windows_prefer_upper_transition() {
        let zones = ColorZones {
            threshold1: 0.5,
            threshold2: 0.4,
            blend_width: 0.2,
            ..ColorZones::default()
        };
        assert!(matches!(zones.classify(0.45), ZoneSample::UpperTransition(_)));

        // Inside both windows: blended mid to bright over the upper window only
        let w = zones.blend_width;
        let expected = utils::smoothstep(zones.threshold1 - w, zones.threshold1 + w, 0.35);
        let ZoneSample::UpperTransition(blend) = zones.classify(0.35) else {
            panic!("overlap should resolve to the upper transition");
        };
        assert_relative_eq!(blend, expected, epsilon = 1e-6);
        assert_eq!(zones.resolve_hsl(0.35), zones.mid.mix(zones.bright, expected));

        // Below the upper window only the lower transition applies
        assert!(matches!(zones.classify(0.25), ZoneSample::LowerTransition(_)));
    }

    #[test]
    fn test_reversed_thresholds_invert_without_error() {
        let zones = ColorZones {
            threshold1: 0.2,
            threshold2: 0.8,
            blend_width: 0.0,
            ..ColorZones::default()
        };
        assert!(!zones.is_ordered());
        // Everything above 0.2 is "bright" even though it is below threshold2
        assert_eq!(zones.resolve_hsl(0.5), zones.bright);
        assert_eq!(zones.resolve_hsl(0.1), zones.dark);
    }

    #[test]
    fn test_hue_shift_wraps() {
        let adjust = HslAdjust { hue_shift: 40.0, ..HslAdjust::default() };
        assert_relative_eq!(adjust.apply(Hsl::new(340.0, 0.3, 0.7)).h, 20.0, epsilon = 1e-4);
        let negative = HslAdjust { hue_shift: -30.0, ..HslAdjust::default() };
        assert_relative_eq!(negative.apply(Hsl::new(10.0, 0.3, 0.7)).h, 340.0, epsilon = 1e-4);
    }

    #[test]
    fn test_multipliers_clamp() {
        let adjust = HslAdjust {
            hue_shift: 0.0,
            saturation_multiplier: 5.0,
            lightness_multiplier: -1.0,
        };
        let out = adjust.apply(Hsl::new(200.0, 0.4, 0.6));
        assert_eq!(out.s, 1.0);
        assert_eq!(out.l, 0.0);
    }

    #[test]
    fn test_parse_hex() {
        assert_relative_eq!(parse_hex_rgb("#ff8000").unwrap(), Vec3::new(1.0, 128.0 / 255.0, 0.0));
        assert!(parse_hex_rgb("#12345").is_none());
        assert!(parse_hex_rgb("#zzzzzz").is_none());
        assert_eq!(to_hex_rgb(parse_hex_rgb("#0ea5e9").unwrap()), "#0ea5e9");
    }
}
