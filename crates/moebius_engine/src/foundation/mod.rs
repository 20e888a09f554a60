//! Foundation module - Core utilities and types
//!
//! - Math types and GLSL-style scalar helpers
//! - Frame timing
//! - Logging setup

pub mod math;
pub mod time;
pub mod logging;
