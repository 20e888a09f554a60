//! # Core Module
//!
//! Shared configuration for the whole scene.

pub mod config;

pub use config::{BackdropConfig, CameraConfig, Config, ConfigError, ConfigFormat, OutputConfig};
