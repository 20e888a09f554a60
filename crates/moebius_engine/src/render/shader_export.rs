//! GLSL export of the stylised programs
//!
//! The CPU programs in [`shading`](crate::render::shading) are the reference.
//! A GPU host gets the same pipeline as GLSL 450: hand-written chunks from
//! `resources/shaders` plus a generated block that bakes the values uniforms
//! cannot carry (band table, hatch levels, zone colours, layer styles).
//! Everything that changes per frame or per material tweak stays in the
//! uniform blocks of [`uniforms`](crate::render::uniforms).

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::render::material::MaterialConfig;
use crate::render::shading::color::Hsl;
use crate::render::shading::hatching::{self, HatchingConfig, LayerStyle};
use crate::render::shading::noise::NoiseOctave;
use crate::render::RenderError;

const VERSION: &str = "#version 450\n";
const COMMON: &str = include_str!("../../../../resources/shaders/moebius_common.glsl");
const NOISE: &str = include_str!("../../../../resources/shaders/noise.glsl");
const SHADING: &str = include_str!("../../../../resources/shaders/moebius_shading.glsl");
const VERTEX_MAIN: &str = include_str!("../../../../resources/shaders/moebius_vertex.glsl");
const FRAGMENT_MAIN: &str = include_str!("../../../../resources/shaders/moebius_fragment.glsl");
const SILHOUETTE_VERT: &str = include_str!("../../../../resources/shaders/silhouette.vert");
const SILHOUETTE_FRAG: &str = include_str!("../../../../resources/shaders/silhouette.frag");

/// Stand-in for unbounded values; GLSL has no infinity literal
const GLSL_FLOAT_MAX: f32 = 3.4e38;

/// Complete shader sources for one material
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSet {
    /// Stylised mesh vertex program
    pub moebius_vertex: String,
    /// Stylised mesh fragment program
    pub moebius_fragment: String,
    /// Outline vertex program
    pub silhouette_vertex: String,
    /// Outline fragment program
    pub silhouette_fragment: String,
}

impl ShaderSet {
    /// File name and source of every program
    pub fn files(&self) -> [(&'static str, &str); 4] {
        [
            ("moebius.vert", &self.moebius_vertex),
            ("moebius.frag", &self.moebius_fragment),
            ("silhouette.vert", &self.silhouette_vertex),
            ("silhouette.frag", &self.silhouette_fragment),
        ]
    }

    /// Write every program into `dir`, creating it if needed
    pub fn write_to(&self, dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
        fs::create_dir_all(dir)?;
        let mut written = Vec::with_capacity(4);
        for (name, source) in self.files() {
            let path = dir.join(name);
            fs::write(&path, source)?;
            log::debug!("Wrote shader {}", path.display());
            written.push(path);
        }
        Ok(written)
    }
}

/// Build the GLSL programs for `material`
pub fn export(material: &MaterialConfig) -> ShaderSet {
    let moebius_vertex = [VERSION, COMMON, NOISE, VERTEX_MAIN].join("\n");

    let constants = constants_block(material);
    let layers = [
        layer_function("hatchLayer1", &hatching::LAYER1),
        layer_function("hatchLayer2", &hatching::LAYER2),
    ]
    .join("\n");
    let moebius_fragment = [VERSION, COMMON, NOISE, &constants, SHADING, &layers, FRAGMENT_MAIN].join("\n");

    ShaderSet {
        moebius_vertex,
        moebius_fragment,
        silhouette_vertex: SILHOUETTE_VERT.to_owned(),
        silhouette_fragment: SILHOUETTE_FRAG.to_owned(),
    }
}

/// GLSL float literal; always carries a decimal point or exponent
fn glsl_float(value: f32) -> String {
    let value = if value.is_nan() {
        0.0
    } else {
        value.clamp(-GLSL_FLOAT_MAX, GLSL_FLOAT_MAX)
    };
    format!("{value:?}")
}

fn glsl_hsl(hsl: Hsl) -> String {
    format!("vec3({}, {}, {})", glsl_float(hsl.h), glsl_float(hsl.s), glsl_float(hsl.l))
}

fn glsl_array(values: impl ExactSizeIterator<Item = f32>, pad: f32) -> String {
    let mut items: Vec<String> = values.map(glsl_float).collect();
    if items.is_empty() {
        items.push(glsl_float(pad));
    }
    format!("float[{}]({})", items.len(), items.join(", "))
}

fn constants_block(material: &MaterialConfig) -> String {
    let HatchingConfig {
        base_line_spacing,
        line_thickness,
        level1,
        level2,
        base_intensity,
        aa_width,
        bands,
    } = &material.hatching;
    let rows = bands.bands();
    let len = rows.len().max(1);
    let zones = &material.zones;

    let mut out = String::from("// Generated material constants\n");
    let mut line = |text: String| {
        out.push_str(&text);
        out.push('\n');
    };
    line(format!("const float BASE_LINE_SPACING = {};", glsl_float(*base_line_spacing)));
    line(format!("const float LINE_THICKNESS = {};", glsl_float(*line_thickness)));
    line(format!("const float HATCH_LEVEL1 = {};", glsl_float(*level1)));
    line(format!("const float HATCH_LEVEL2 = {};", glsl_float(*level2)));
    line(format!("const float BASE_INTENSITY = {};", glsl_float(*base_intensity)));
    line(format!("const float AA_WIDTH = {};", glsl_float(*aa_width)));
    line(format!("const int BAND_COUNT = {};", rows.len()));
    line(format!(
        "const float BAND_UPPER[{len}] = {};",
        glsl_array(rows.iter().map(|band| band.upper_bound), GLSL_FLOAT_MAX)
    ));
    line(format!(
        "const float BAND_SPACING[{len}] = {};",
        glsl_array(rows.iter().map(|band| band.multipliers.spacing), bands.beyond().spacing)
    ));
    line(format!(
        "const float BAND_INTENSITY[{len}] = {};",
        glsl_array(rows.iter().map(|band| band.multipliers.intensity), bands.beyond().intensity)
    ));
    line(format!("const float BEYOND_SPACING = {};", glsl_float(bands.beyond().spacing)));
    line(format!("const float BEYOND_INTENSITY = {};", glsl_float(bands.beyond().intensity)));
    line(format!("const vec3 ZONE_BRIGHT = {};", glsl_hsl(zones.bright)));
    line(format!("const vec3 ZONE_MID = {};", glsl_hsl(zones.mid)));
    line(format!("const vec3 ZONE_DARK = {};", glsl_hsl(zones.dark)));
    for (name, style) in [("LAYER1_DITHER", &hatching::LAYER1), ("LAYER2_DITHER", &hatching::LAYER2)] {
        line(format!(
            "const vec3 {name} = vec3({}, {}, {});",
            glsl_float(style.dither_coarse),
            glsl_float(style.dither_fine),
            glsl_float(style.dither_offset)
        ));
    }
    out
}

fn octave_term(octave: &NoiseOctave) -> String {
    format!(
        "simplex3(p * {} + vec3({})) * {}",
        glsl_float(octave.frequency),
        glsl_float(octave.offset),
        glsl_float(octave.amplitude)
    )
}

fn layer_function(name: &str, style: &LayerStyle) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "float {name}(vec2 screen, vec3 p, float brightness, float spacing) {{");
    let _ = writeln!(out, "    float diagonal = screen.x - screen.y");
    for octave in &style.wave {
        let _ = writeln!(out, "        + {}", octave_term(octave));
    }
    let _ = writeln!(out, "        ;");
    let _ = writeln!(out, "    float line = linePattern(diagonal, spacing);");
    let _ = writeln!(
        out,
        "    float noiseIntensity = clamp(brightness, 0.0, 1.0) * {};",
        glsl_float(style.stipple_gain)
    );
    let _ = writeln!(out, "    float stipple = {} + 0.5;", octave_term(&style.stipple));
    let _ = writeln!(out, "    float mask = step(noiseIntensity, stipple);");
    if style.segmented {
        let _ = writeln!(out, "    float segment = fract(diagonal * 2.0);");
        let _ = writeln!(
            out,
            "    mask *= step(segment, {} - noiseIntensity * {});",
            glsl_float(hatching::DASH_LENGTH),
            glsl_float(hatching::DASH_SHRINK)
        );
    }
    let _ = writeln!(out, "    return line * mask;");
    let _ = writeln!(out, "}}");
    out
}
