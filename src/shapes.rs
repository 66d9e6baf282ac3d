//! Shape masks.
//!
//! A shape is a grayscale silhouette: 255 keeps the pixel, 0 makes it transparent.
//! Masks come from a [`ShapeProvider`] as encoded image bytes, or from the
//! built-in generators.

use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};

use crate::error::{Error, Result};

/// Source of encoded shape images, addressed by id.
pub trait ShapeProvider {
    /// Available ids, sorted.
    fn list(&self) -> Result<Vec<String>>;
    /// Raw encoded bytes for `id`.
    fn load(&self, id: &str) -> Result<Vec<u8>>;
}

/// `.png` files in one directory; the id is the file stem.
pub struct ShapeDir {
    root: PathBuf,
}

impl ShapeDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ShapeProvider for ShapeDir {
    fn list(&self) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        for entry in std::fs::read_dir(&self.root)? {
            let path = entry?.path();
            let is_png = path
                .extension()
                .is_some_and(|e| e.eq_ignore_ascii_case("png"));
            if !is_png {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }
        ids.sort();
        Ok(ids)
    }

    fn load(&self, id: &str) -> Result<Vec<u8>> {
        // Ids are bare names; anything path-like is not one of ours.
        if id.is_empty() || id.contains(['/', '\\']) || id == ".." {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no shape {id:?}"),
            )));
        }
        Ok(std::fs::read(self.root.join(format!("{id}.png")))?)
    }
}

/// Decode shape bytes. Images with alpha use their alpha channel; others use luminance.
pub fn decode_mask(bytes: &[u8]) -> Result<GrayImage> {
    let img = image::load_from_memory(bytes)?;
    if img.color().has_alpha() {
        let la = img.to_luma_alpha8();
        Ok(GrayImage::from_fn(la.width(), la.height(), |x, y| Luma([la.get_pixel(x, y)[1]])))
    } else {
        Ok(img.to_luma8())
    }
}

/// Fetch and decode one shape.
pub fn load_mask(provider: &dyn ShapeProvider, id: &str) -> Result<GrayImage> {
    decode_mask(&provider.load(id)?)
}

/// Ids of the generated shapes.
pub const BUILTIN: [&str; 2] = ["circle", "rounded"];

/// Generated shape for a built-in id.
pub fn builtin(id: &str, size: u32) -> Option<GrayImage> {
    match id {
        "circle" => Some(circle(size)),
        "rounded" => Some(rounded_square(size, size / 5)),
        _ => None,
    }
}

/// Coverage of a pixel centered `d` pixels inside (positive) or outside an edge.
#[inline]
fn edge_coverage(d: f32) -> u8 {
    ((d + 0.5).clamp(0.0, 1.0) * 255.0).round() as u8
}

/// Filled disc with a one-pixel soft edge.
pub fn circle(size: u32) -> GrayImage {
    let r = size as f32 / 2.0;
    GrayImage::from_fn(size, size, |x, y| {
        let dx = x as f32 + 0.5 - r;
        let dy = y as f32 + 0.5 - r;
        Luma([edge_coverage(r - (dx * dx + dy * dy).sqrt())])
    })
}

/// Square with rounded corners of `radius`.
pub fn rounded_square(size: u32, radius: u32) -> GrayImage {
    let half = size as f32 / 2.0;
    let radius = (radius as f32).min(half);
    GrayImage::from_fn(size, size, |x, y| {
        // Signed distance to a rounded box centered in the image.
        let px = (x as f32 + 0.5 - half).abs() - (half - radius);
        let py = (y as f32 + 0.5 - half).abs() - (half - radius);
        let outside = (px.max(0.0).powi(2) + py.max(0.0).powi(2)).sqrt();
        let inside = px.max(py).min(0.0);
        Luma([edge_coverage(radius - (outside + inside))])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, LumaA, Rgb, RgbImage};
    use std::io::Cursor;

    fn png_bytes(img: image::DynamicImage) -> Vec<u8> {
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn alpha_channel_wins_over_luminance() {
        let img = image::GrayAlphaImage::from_fn(2, 1, |x, _| {
            if x == 0 { LumaA([0, 255]) } else { LumaA([255, 0]) }
        });
        let mask = decode_mask(&png_bytes(img.into())).unwrap();
        assert_eq!(mask.as_raw(), &vec![255, 0]);
    }

    #[test]
    fn opaque_images_use_luminance() {
        let img = RgbImage::from_fn(2, 1, |x, _| if x == 0 { Rgb([255, 255, 255]) } else { Rgb([0, 0, 0]) });
        let mask = decode_mask(&png_bytes(img.into())).unwrap();
        assert_eq!(mask.as_raw(), &vec![255, 0]);
    }

    #[test]
    fn garbage_is_a_shape_error() {
        assert!(matches!(decode_mask(b"not an image"), Err(Error::Shape(_))));
    }

    #[test]
    fn shape_dir_lists_and_loads_pngs() {
        let dir = tempfile::tempdir().unwrap();
        circle(16).save(dir.path().join("circle.png")).unwrap();
        rounded_square(16, 4).save(dir.path().join("blob.PNG")).unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let shapes = ShapeDir::new(dir.path());
        assert_eq!(shapes.list().unwrap(), vec!["blob", "circle"]);
        let mask = load_mask(&shapes, "circle").unwrap();
        assert_eq!(mask.dimensions(), (16, 16));
        assert!(shapes.load("../circle").is_err());
        assert!(shapes.load("missing").is_err());
    }

    #[test]
    fn circle_is_opaque_inside_transparent_outside() {
        let c = circle(32);
        assert_eq!(c.get_pixel(16, 16)[0], 255);
        assert_eq!(c.get_pixel(0, 0)[0], 0);
        assert_eq!(c.get_pixel(31, 31)[0], 0);
    }

    #[test]
    fn rounded_square_corners_are_cut() {
        let s = rounded_square(40, 10);
        assert_eq!(s.get_pixel(20, 0)[0], 255);
        assert_eq!(s.get_pixel(0, 20)[0], 255);
        assert_eq!(s.get_pixel(0, 0)[0], 0);
        assert!(builtin("rounded", 40).is_some());
        assert!(builtin("star", 40).is_none());
    }
}
