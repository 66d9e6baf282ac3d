//! Learned face detector (UltraFace-style ONNX model).
//!
//! The frame is downscaled to the model's 320x240 input, normalised to
//! `(p - 127) / 128`, and run once. The model emits per-anchor class scores
//! `[1, N, 2]` (background, face) and boxes `[1, N, 4]` as normalised corners;
//! confident boxes go through NMS and are mapped back to source pixels.

use crate::rect::Rect;

pub const INPUT_WIDTH: u32 = 320;
pub const INPUT_HEIGHT: u32 = 240;
/// Minimum face score kept.
pub const CONFIDENCE_THRESHOLD: f32 = 0.7;
/// Overlap above which the weaker of two boxes is suppressed.
pub const IOU_THRESHOLD: f32 = 0.3;

/// Map raw model outputs to scored rectangles in a `src_w`x`src_h` frame.
///
/// `scores` holds (background, face) pairs and `boxes` normalised
/// (x1, y1, x2, y2) quadruples, one per anchor.
pub fn decode(scores: &[f32], boxes: &[f32], src_w: u32, src_h: u32, threshold: f32) -> Vec<(Rect, f32)> {
    let (fw, fh) = (src_w as f32, src_h as f32);
    scores
        .chunks_exact(2)
        .zip(boxes.chunks_exact(4))
        .filter(|(s, _)| s[1] >= threshold)
        .map(|(s, b)| {
            let x1 = (b[0] * fw).clamp(0.0, fw);
            let y1 = (b[1] * fh).clamp(0.0, fh);
            let x2 = (b[2] * fw).clamp(0.0, fw);
            let y2 = (b[3] * fh).clamp(0.0, fh);
            let rect = Rect::new(
                y1.round() as i32,
                x1.round() as i32,
                (x2 - x1).round() as i32,
                (y2 - y1).round() as i32,
            );
            (rect, s[1])
        })
        .filter(|(r, _)| !r.is_empty())
        .collect()
}

/// Greedy non-maximum suppression, highest score first.
pub fn nms(mut candidates: Vec<(Rect, f32)>, iou_threshold: f32) -> Vec<Rect> {
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1));
    let mut kept: Vec<Rect> = Vec::new();
    for (rect, _) in candidates {
        if kept.iter().all(|k| k.iou(&rect) <= iou_threshold) {
            kept.push(rect);
        }
    }
    kept
}

#[cfg(feature = "backend-tract")]
pub use session::ModelDetector;

#[cfg(feature = "backend-tract")]
mod session {
    use std::path::Path;

    use image::RgbImage;
    use tract_onnx::prelude::*;

    use super::{CONFIDENCE_THRESHOLD, INPUT_HEIGHT, INPUT_WIDTH, IOU_THRESHOLD, decode, nms};
    use crate::error::{Error, Result};
    use crate::rect::Rect;
    use crate::vision::downscale;

    pub struct ModelDetector {
        model: TypedRunnableModel<TypedModel>,
    }

    impl ModelDetector {
        /// Load and optimise the ONNX model at `path` for a fixed 1x3x240x320 input.
        pub fn load(path: &Path) -> Result<Self> {
            let model = tract_onnx::onnx()
                .model_for_path(path)
                .map_err(|e| Error::Model(format!("load {}: {e}", path.display())))?
                .with_input_fact(
                    0,
                    InferenceFact::dt_shape(
                        f32::datum_type(),
                        tvec!(1, 3, INPUT_HEIGHT as usize, INPUT_WIDTH as usize),
                    ),
                )
                .map_err(|e| Error::Model(format!("input fact: {e}")))?
                .into_optimized()
                .map_err(|e| Error::Model(format!("optimise: {e}")))?
                .into_runnable()
                .map_err(|e| Error::Model(format!("plan: {e}")))?;

            log::info!("face model loaded from {}", path.display());
            Ok(Self { model })
        }

        pub fn detect(&self, frame: &RgbImage) -> Result<Vec<Rect>> {
            let small = downscale(frame, INPUT_WIDTH, INPUT_HEIGHT);
            let input = tract_ndarray::Array4::from_shape_fn(
                (1, 3, INPUT_HEIGHT as usize, INPUT_WIDTH as usize),
                |(_, c, y, x)| (small.get_pixel(x as u32, y as u32)[c] as f32 - 127.0) / 128.0,
            )
            .into_tensor();

            let outputs = self
                .model
                .run(tvec!(input.into()))
                .map_err(|e| Error::Model(format!("inference: {e}")))?;

            // Output order differs between exports; tell them apart by the last axis.
            let mut scores: Option<&[f32]> = None;
            let mut boxes: Option<&[f32]> = None;
            for out in outputs.iter() {
                let data = out
                    .as_slice::<f32>()
                    .map_err(|e| Error::Model(format!("output tensor: {e}")))?;
                match out.shape().last() {
                    Some(2) => scores = Some(data),
                    Some(4) => boxes = Some(data),
                    _ => {}
                }
            }
            let (Some(scores), Some(boxes)) = (scores, boxes) else {
                return Err(Error::Model("expected score [.., 2] and box [.., 4] outputs".into()));
            };

            let candidates = decode(scores, boxes, frame.width(), frame.height(), CONFIDENCE_THRESHOLD);
            Ok(nms(candidates, IOU_THRESHOLD))
        }
    }
}
