//! Face locator: detector + dominant-face selection + temporal smoothing.
//!
//! `locate` always answers with a rectangle. Before any face has been seen the
//! history holds the full frame, so the answer degrades to "everything".

use image::RgbImage;

use crate::config::SmoothingConfig;
use crate::detect::Detector;
use crate::draw::{DETECTION_COLOR, SELECTED_COLOR, draw_rect};
use crate::rect::Rect;
use crate::smoothing::Smoother;

/// Largest candidate by area; on ties the earliest one wins.
pub fn select_largest(candidates: &[Rect]) -> Option<Rect> {
    candidates.iter().fold(None, |best: Option<Rect>, r| match best {
        Some(b) if b.area() >= r.area() => Some(b),
        _ => Some(*r),
    })
}

pub struct FaceLocator {
    detector: Detector,
    smoother: Smoother,
    debug: bool,
    overlay: Option<RgbImage>,
}

impl FaceLocator {
    pub fn new(detector: Detector, smoothing: SmoothingConfig) -> Self {
        Self { detector, smoother: Smoother::new(smoothing), debug: false, overlay: None }
    }

    /// Toggle drawing of detection overlays. Has no effect on returned geometry.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        if !debug {
            self.overlay = None;
        }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    /// Copy of the last located frame with candidates (red) and the chosen face (green).
    /// Only produced in debug mode.
    pub fn debug_overlay(&self) -> Option<&RgbImage> {
        self.overlay.as_ref()
    }

    /// Raw candidates from one backend run. Backend failures count as "no face".
    pub fn detect(&mut self, frame: &RgbImage) -> Vec<Rect> {
        match self.detector.detect(frame) {
            Ok(faces) => faces,
            Err(e) => {
                log::warn!("{} detector failed: {e}", self.detector.kind());
                Vec::new()
            }
        }
    }

    /// Stable focus rectangle for `frame`.
    pub fn locate(&mut self, frame: &RgbImage) -> Rect {
        let full = Rect::full_frame(frame.width(), frame.height());
        if self.smoother.is_empty() {
            self.smoother.push(full);
        }

        let candidates = self.detect(frame);
        let face = select_largest(&candidates);

        if self.debug {
            let mut overlay = frame.clone();
            for c in &candidates {
                draw_rect(&mut overlay, *c, DETECTION_COLOR, 2);
            }
            if let Some(f) = face {
                draw_rect(&mut overlay, f, SELECTED_COLOR, 2);
            }
            self.overlay = Some(overlay);
        }

        if let Some(f) = face {
            self.smoother.push(f);
        }
        self.smoother.update().unwrap_or(full)
    }

    /// Forget all history, e.g. after switching cameras.
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.overlay = None;
    }
}
