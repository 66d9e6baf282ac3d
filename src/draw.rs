// Window + software drawing utilities.
// 1) A window that shows the composited output.
// 2) Rectangle outlines for the debug overlays (detections, crop box).

use image::{Rgb, RgbImage};
use minifb::{Key, KeyRepeat, Window, WindowOptions};

use crate::error::{Error, Result};
use crate::rect::Rect;
use crate::types::FrameBuffer;

pub const DETECTION_COLOR: Rgb<u8> = Rgb([255, 64, 64]);
pub const SELECTED_COLOR: Rgb<u8> = Rgb([64, 255, 64]);
pub const CROP_COLOR: Rgb<u8> = Rgb([255, 204, 51]);

pub struct Drawer {
    window: Window,
}

impl Drawer {
    /// Create a window of the given size.
    pub fn new(title: &str, width: usize, height: usize) -> Result<Self> {
        let window = Window::new(title, width, height, WindowOptions::default())
            .map_err(|e| Error::WindowInit(e.to_string()))?;
        Ok(Self { window })
    }

    /// Push the pixels for this tick to the screen.
    pub fn present(&mut self, framebuffer: &FrameBuffer) -> Result<()> {
        self.window
            .update_with_buffer(&framebuffer.pixels, framebuffer.width, framebuffer.height)
            .map_err(|e| Error::WindowUpdate(e.to_string()))
    }

    pub fn size(&self) -> (usize, usize) {
        self.window.get_size()
    }

    pub fn set_title(&mut self, title: &str) {
        self.window.set_title(title);
    }

    /// False once the user closes the window.
    pub fn is_open(&self) -> bool {
        self.window.is_open() && !self.window.is_key_down(Key::Escape)
    }

    /// True on the tick a key goes down (no auto-repeat).
    pub fn pressed_once(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::No)
    }

    /// True on key down and on auto-repeat, for held pan/zoom keys.
    pub fn pressed_repeat(&self, key: Key) -> bool {
        self.window.is_key_pressed(key, KeyRepeat::Yes)
    }
}

/* ---------- Software drawing on RGB frames ---------- */

#[inline]
fn put_pixel(img: &mut RgbImage, x: i32, y: i32, color: Rgb<u8>) {
    if x < 0 || y < 0 {
        return;
    }
    let (x, y) = (x as u32, y as u32);
    if x >= img.width() || y >= img.height() {
        return;
    }
    img.put_pixel(x, y, color);
}

/// Bresenham line between (x0,y0) and (x1,y1); off-image pixels are skipped.
pub fn draw_line(img: &mut RgbImage, x0: i32, y0: i32, x1: i32, y1: i32, color: Rgb<u8>) {
    let (mut x0, mut y0) = (x0, y0);
    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    loop {
        put_pixel(img, x0, y0, color);
        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

/// Outline `rect` with a `thickness`-pixel border drawn inward.
pub fn draw_rect(img: &mut RgbImage, rect: Rect, color: Rgb<u8>, thickness: i32) {
    if rect.is_empty() {
        return;
    }
    for t in 0..thickness.max(1) {
        let r = rect.pad(-t);
        if r.is_empty() {
            break;
        }
        let (l, t, rr, b) = (r.left, r.top, r.right() - 1, r.bottom() - 1);
        draw_line(img, l, t, rr, t, color);
        draw_line(img, l, b, rr, b, color);
        draw_line(img, l, t, l, b, color);
        draw_line(img, rr, t, rr, b, color);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rect_outline_touches_only_the_border() {
        let mut img = RgbImage::new(10, 10);
        draw_rect(&mut img, Rect::new(2, 2, 5, 5), CROP_COLOR, 1);
        assert_eq!(*img.get_pixel(2, 2), CROP_COLOR);
        assert_eq!(*img.get_pixel(6, 6), CROP_COLOR);
        assert_eq!(*img.get_pixel(4, 4), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(7, 7), Rgb([0, 0, 0]));
    }

    #[test]
    fn lines_clip_at_image_edges() {
        let mut img = RgbImage::new(4, 4);
        draw_line(&mut img, -5, 1, 10, 1, DETECTION_COLOR);
        assert!((0..4).all(|x| *img.get_pixel(x, 1) == DETECTION_COLOR));
    }
}
