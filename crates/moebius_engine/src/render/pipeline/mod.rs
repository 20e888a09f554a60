//! Pipeline state

pub mod pipeline_config;

pub use pipeline_config::{BlendMode, CullMode, DepthState, PipelineConfig, PipelineType};
