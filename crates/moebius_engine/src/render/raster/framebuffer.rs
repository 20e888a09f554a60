//! CPU colour + depth target
//!
//! Pixels are addressed with the origin at the bottom-left, matching the
//! window coordinates fragment programs see. Conversion to an image flips the
//! rows so the saved PNG is upright.

use std::path::Path;

use crate::foundation::math::Vec4;
use crate::render::RenderError;

/// Cleared depth value (the far plane)
pub const FAR_DEPTH: f32 = 1.0;

/// RGBA `f32` colour plus depth
#[derive(Debug, Clone)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    color: Vec<[f32; 4]>,
    depth: Vec<f32>,
}

impl Framebuffer {
    /// Allocate a cleared target
    pub fn new(width: u32, height: u32) -> Result<Self, RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::InvalidSize { width, height });
        }
        let len = width as usize * height as usize;
        Ok(Self {
            width,
            height,
            color: vec![[0.0, 0.0, 0.0, 1.0]; len],
            depth: vec![FAR_DEPTH; len],
        })
    }

    /// Width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocate for a new size, clearing contents
    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), RenderError> {
        if width == self.width && height == self.height {
            return Ok(());
        }
        *self = Self::new(width, height)?;
        Ok(())
    }

    /// Fill colour and reset depth to the far plane
    pub fn clear(&mut self, color: Vec4) {
        self.color.fill([color.x, color.y, color.z, color.w]);
        self.depth.fill(FAR_DEPTH);
    }

    fn index(&self, x: u32, y: u32) -> Option<usize> {
        (x < self.width && y < self.height).then(|| y as usize * self.width as usize + x as usize)
    }

    /// Colour at a pixel, `None` outside the target
    pub fn color_at(&self, x: u32, y: u32) -> Option<Vec4> {
        self.index(x, y).map(|i| Vec4::from(self.color[i]))
    }

    /// Depth at a pixel, `None` outside the target
    pub fn depth_at(&self, x: u32, y: u32) -> Option<f32> {
        self.index(x, y).map(|i| self.depth[i])
    }

    pub(crate) fn color_mut(&mut self, x: u32, y: u32) -> Option<&mut [f32; 4]> {
        self.index(x, y).map(move |i| &mut self.color[i])
    }

    pub(crate) fn depth_mut(&mut self, x: u32, y: u32) -> Option<&mut f32> {
        self.index(x, y).map(move |i| &mut self.depth[i])
    }

    /// Iterate colours row by row from the bottom
    pub fn pixels(&self) -> impl Iterator<Item = Vec4> + '_ {
        self.color.iter().map(|c| Vec4::from(*c))
    }

    /// Quantise to 8-bit RGBA, top row first
    pub fn to_image(&self) -> image::RgbaImage {
        let to_byte = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        image::RgbaImage::from_fn(self.width, self.height, |x, y| {
            let src = self.color[(self.height - 1 - y) as usize * self.width as usize + x as usize];
            image::Rgba([to_byte(src[0]), to_byte(src[1]), to_byte(src[2]), to_byte(src[3])])
        })
    }

    /// Write a PNG
    pub fn save_png(&self, path: impl AsRef<Path>) -> Result<(), RenderError> {
        let path = path.as_ref();
        self.to_image()
            .save_with_format(path, image::ImageFormat::Png)?;
        log::debug!("Wrote {}x{} frame to {}", self.width, self.height, path.display());
        Ok(())
    }
}
