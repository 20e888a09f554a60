//! Fixed-function state for each draw
//!
//! Every program the scene draws with has a preset here: which faces are
//! culled, how the depth buffer is used, and whether output is blended.

use bitflags::bitflags;

bitflags! {
    /// Depth buffer usage
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DepthState: u8 {
        /// Discard fragments that fail `LessEqual` against the stored depth
        const TEST = 1 << 0;
        /// Store the fragment depth after a passing test
        const WRITE = 1 << 1;
    }
}

/// Face culling modes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CullMode {
    /// No culling
    None,
    /// Cull front faces
    Front,
    /// Cull back faces
    Back,
}

impl CullMode {
    /// Whether a triangle with the given facing is discarded
    pub fn culls(self, front_facing: bool) -> bool {
        match self {
            Self::None => false,
            Self::Front => front_facing,
            Self::Back => !front_facing,
        }
    }
}

/// How fragment output combines with the stored colour
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendMode {
    /// Overwrite
    Replace,
    /// `src * a + dst * (1 - a)`
    Alpha,
    /// `src * a + dst`
    Additive,
}

impl BlendMode {
    /// Combine a source colour with the destination
    pub fn blend(self, src: [f32; 4], dst: [f32; 4]) -> [f32; 4] {
        let a = src[3];
        match self {
            Self::Replace => src,
            Self::Alpha => [
                src[0] * a + dst[0] * (1.0 - a),
                src[1] * a + dst[1] * (1.0 - a),
                src[2] * a + dst[2] * (1.0 - a),
                a + dst[3] * (1.0 - a),
            ],
            Self::Additive => [
                src[0] * a + dst[0],
                src[1] * a + dst[1],
                src[2] * a + dst[2],
                dst[3].max(a),
            ],
        }
    }
}

/// Which program a pipeline runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PipelineType {
    /// Stylised hatched mesh
    Moebius,
    /// Back-face outline
    Silhouette,
    /// Gradient sky sphere
    Sky,
    /// Point sprites (stars and particles)
    Points,
}

/// Configuration for a draw
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Type of pipeline
    pub pipeline_type: PipelineType,
    /// Depth test and write flags
    pub depth: DepthState,
    /// Output blending
    pub blend_mode: BlendMode,
    /// Cull mode for face culling
    pub cull_mode: CullMode,
}

impl PipelineConfig {
    /// Main stylised pass: opaque, back faces culled
    pub fn moebius() -> Self {
        Self {
            pipeline_type: PipelineType::Moebius,
            depth: DepthState::TEST | DepthState::WRITE,
            blend_mode: BlendMode::Replace,
            cull_mode: CullMode::Back,
        }
    }

    /// Outline pass: only back faces, depth tested and written
    pub fn silhouette() -> Self {
        Self {
            pipeline_type: PipelineType::Silhouette,
            depth: DepthState::TEST | DepthState::WRITE,
            blend_mode: BlendMode::Replace,
            cull_mode: CullMode::Front,
        }
    }

    /// Sky sphere seen from inside
    pub fn sky() -> Self {
        Self {
            pipeline_type: PipelineType::Sky,
            depth: DepthState::TEST | DepthState::WRITE,
            blend_mode: BlendMode::Replace,
            cull_mode: CullMode::Front,
        }
    }

    /// Glowing star sprites: additive, occluded but not occluding
    pub fn stars() -> Self {
        Self {
            pipeline_type: PipelineType::Points,
            depth: DepthState::TEST,
            blend_mode: BlendMode::Additive,
            cull_mode: CullMode::None,
        }
    }

    /// Translucent particle sprites
    pub fn particles() -> Self {
        Self {
            pipeline_type: PipelineType::Points,
            depth: DepthState::TEST,
            blend_mode: BlendMode::Alpha,
            cull_mode: CullMode::None,
        }
    }
}
