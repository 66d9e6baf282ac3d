// Pixel buffers shared across the pipeline.

use std::sync::Arc;

use image::{RgbImage, RgbaImage};

use crate::gamma::GammaLut;

/// A captured frame: 3-channel RGB, shared read-only once published.
pub type Frame = Arc<RgbImage>;

/// Window-ready buffer: each entry is 0x00RRGGBB for minifb.
#[derive(Clone)]
pub struct FrameBuffer {
    pub width: usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

#[inline]
fn pack(r: u8, g: u8, b: u8) -> u32 {
    ((r as u32) << 16) | ((g as u32) << 8) | b as u32
}

impl FrameBuffer {
    /// A buffer filled with one color.
    pub fn filled(width: usize, height: usize, color: u32) -> Self {
        Self { width, height, pixels: vec![color; width * height] }
    }

    /// Pack an RGB frame as-is.
    pub fn from_rgb(img: &RgbImage) -> Self {
        let (w, h) = img.dimensions();
        let pixels = img.pixels().map(|p| pack(p[0], p[1], p[2])).collect();
        Self { width: w as usize, height: h as usize, pixels }
    }

    /// Flatten an RGBA image over a solid 0x00RRGGBB background, blending in linear light.
    pub fn from_rgba_over(img: &RgbaImage, background: u32, lut: &GammaLut) -> Self {
        let br = ((background >> 16) & 0xFF) as u8;
        let bg = ((background >> 8) & 0xFF) as u8;
        let bb = (background & 0xFF) as u8;

        let (w, h) = img.dimensions();
        let pixels = img
            .pixels()
            .map(|p| {
                let a = p[3];
                pack(lut.over(p[0], br, a), lut.over(p[1], bg, a), lut.over(p[2], bb, a))
            })
            .collect();
        Self { width: w as usize, height: h as usize, pixels }
    }

    /// Scale `self` to fit inside `width`x`height` (aspect preserved) and center it on
    /// a canvas of that size filled with `background`.
    pub fn letterbox(&self, width: usize, height: usize, background: u32) -> Self {
        let mut out = Self::filled(width, height, background);
        if self.width == 0 || self.height == 0 || width == 0 || height == 0 {
            return out;
        }

        let scale = (width as f64 / self.width as f64).min(height as f64 / self.height as f64);
        let tw = ((self.width as f64 * scale).round() as usize).clamp(1, width);
        let th = ((self.height as f64 * scale).round() as usize).clamp(1, height);
        let ox = (width - tw) / 2;
        let oy = (height - th) / 2;

        // Nearest-neighbour: cheap, and the window is the only consumer.
        for y in 0..th {
            let sy = (y * self.height / th).min(self.height - 1);
            for x in 0..tw {
                let sx = (x * self.width / tw).min(self.width - 1);
                out.pixels[(oy + y) * width + ox + x] = self.pixels[sy * self.width + sx];
            }
        }
        out
    }
}

/// Convert an RGB frame to RGBA with full opacity.
pub fn to_rgba(img: &RgbImage) -> RgbaImage {
    let (w, h) = img.dimensions();
    RgbaImage::from_fn(w, h, |x, y| {
        let p = img.get_pixel(x, y);
        image::Rgba([p[0], p[1], p[2], 255])
    })
}
