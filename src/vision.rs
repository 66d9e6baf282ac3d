// Pixel-level helpers shared by the detector backends.

use image::{GrayImage, RgbImage, imageops};

use crate::rect::Rect;

/// Convert an RGB frame to 8-bit luminance.
pub fn grayscale(frame: &RgbImage) -> GrayImage {
    imageops::grayscale(frame)
}

/// Resize to exactly `width`x`height` (bilinear).
pub fn downscale(frame: &RgbImage, width: u32, height: u32) -> RgbImage {
    if frame.dimensions() == (width, height) {
        return frame.clone();
    }
    imageops::resize(frame, width, height, imageops::FilterType::Triangle)
}

/// Summed-area tables over a grayscale image: plain sums and squared sums.
/// Both are (w+1)x(h+1) with a zero first row/column so any box sum is four lookups.
pub struct IntegralImage {
    width: usize,
    height: usize,
    sum: Vec<u64>,
    sq_sum: Vec<u64>,
}

impl IntegralImage {
    pub fn new(gray: &GrayImage) -> Self {
        let (w, h) = (gray.width() as usize, gray.height() as usize);
        let stride = w + 1;
        let mut sum = vec![0u64; stride * (h + 1)];
        let mut sq_sum = vec![0u64; stride * (h + 1)];

        for y in 0..h {
            let mut row = 0u64;
            let mut row_sq = 0u64;
            for x in 0..w {
                let v = gray.get_pixel(x as u32, y as u32)[0] as u64;
                row += v;
                row_sq += v * v;
                let idx = (y + 1) * stride + x + 1;
                sum[idx] = sum[idx - stride] + row;
                sq_sum[idx] = sq_sum[idx - stride] + row_sq;
            }
        }

        Self { width: w, height: h, sum, sq_sum }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    fn lookup(table: &[u64], stride: usize, x0: usize, y0: usize, x1: usize, y1: usize) -> u64 {
        table[y1 * stride + x1] + table[y0 * stride + x0]
            - table[y0 * stride + x1]
            - table[y1 * stride + x0]
    }

    /// Sum of pixel values inside `r`. `r` must lie within the image.
    #[inline]
    pub fn box_sum(&self, r: Rect) -> u64 {
        let (x0, y0) = (r.left as usize, r.top as usize);
        Self::lookup(&self.sum, self.width + 1, x0, y0, x0 + r.width as usize, y0 + r.height as usize)
    }

    /// Standard deviation of pixel values inside `r`, floored at 1.0.
    pub fn std_dev(&self, r: Rect) -> f64 {
        let n = r.area() as f64;
        if n == 0.0 {
            return 1.0;
        }
        let (x0, y0) = (r.left as usize, r.top as usize);
        let (x1, y1) = (x0 + r.width as usize, y0 + r.height as usize);
        let mean = Self::lookup(&self.sum, self.width + 1, x0, y0, x1, y1) as f64 / n;
        let sq = Self::lookup(&self.sq_sum, self.width + 1, x0, y0, x1, y1) as f64 / n;
        (sq - mean * mean).max(0.0).sqrt().max(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Luma;

    #[test]
    fn box_sums_match_brute_force() {
        let gray = GrayImage::from_fn(7, 5, |x, y| Luma([(x * 10 + y) as u8]));
        let ii = IntegralImage::new(&gray);
        let r = Rect::new(1, 2, 4, 3);
        let mut expect = 0u64;
        for y in 1..4 {
            for x in 2..6 {
                expect += gray.get_pixel(x, y)[0] as u64;
            }
        }
        assert_eq!(ii.box_sum(r), expect);
        assert_eq!(ii.box_sum(Rect::full_frame(7, 5)), gray.pixels().map(|p| p[0] as u64).sum::<u64>());
    }

    #[test]
    fn flat_region_has_unit_floor_deviation() {
        let gray = GrayImage::from_pixel(8, 8, Luma([90]));
        let ii = IntegralImage::new(&gray);
        assert_eq!(ii.std_dev(Rect::new(0, 0, 8, 8)), 1.0);
    }
}
