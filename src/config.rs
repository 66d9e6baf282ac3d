//! Tunables for the pipeline.
//!
//! Live values (zoom, pan offsets, follow-face, selections) belong to whoever hosts
//! the pipeline; the core reads them through [`Tunables`] once per frame and never
//! stores them. Static knobs are plain structs with sensible defaults.

use std::ops::Range;
use std::time::Duration;

use crate::error::{Error, Result};

/// Read-only view of the live configuration.
pub trait Tunables {
    /// Zoom factor, > 0. 1.0 frames the face with a third of its size as margin.
    fn zoom_factor(&self) -> f64;
    /// Pan offset in pixels as (x, y).
    fn offset(&self) -> (i32, i32);
    fn follow_face(&self) -> bool;
    fn selected_shape(&self) -> Option<&str>;
    fn selected_camera(&self) -> u32;
}

pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 10.0;

/// In-memory settings, as a host would keep them between ticks.
#[derive(Clone, Debug)]
pub struct Settings {
    zoom_factor: f64,
    offset_x: i32,
    offset_y: i32,
    follow_face: bool,
    selected_shape: Option<String>,
    selected_camera: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            zoom_factor: 1.0,
            offset_x: 0,
            offset_y: 0,
            follow_face: true,
            selected_shape: None,
            selected_camera: 0,
        }
    }
}

impl Settings {
    /// Set the zoom, clamped to [MIN_ZOOM, MAX_ZOOM]. Non-finite or non-positive is rejected.
    pub fn set_zoom(&mut self, zoom: f64) -> Result<()> {
        if !zoom.is_finite() || zoom <= 0.0 {
            return Err(Error::InvalidZoom(zoom));
        }
        self.zoom_factor = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
        Ok(())
    }

    pub fn pan_by(&mut self, dx: i32, dy: i32) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    pub fn reset_pan(&mut self) {
        self.offset_x = 0;
        self.offset_y = 0;
    }

    pub fn set_follow_face(&mut self, follow: bool) {
        self.follow_face = follow;
    }

    pub fn set_selected_shape(&mut self, id: Option<String>) {
        self.selected_shape = id;
    }

    pub fn set_selected_camera(&mut self, id: u32) {
        self.selected_camera = id;
    }
}

impl Tunables for Settings {
    fn zoom_factor(&self) -> f64 {
        self.zoom_factor
    }

    fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    fn follow_face(&self) -> bool {
        self.follow_face
    }

    fn selected_shape(&self) -> Option<&str> {
        self.selected_shape.as_deref()
    }

    fn selected_camera(&self) -> u32 {
        self.selected_camera
    }
}

/// Frame source knobs.
#[derive(Clone, Debug)]
pub struct SourceConfig {
    /// Device indices probed by enumeration.
    pub probe_range: Range<u32>,
    /// How long a probe may wait for its first frame.
    pub probe_timeout: Duration,
    /// Requested resolution ceiling; the device may negotiate lower.
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Upper bound on how long `stop()` waits for the acquisition thread.
    pub stop_timeout: Duration,
    /// Size of the synthetic placeholder image.
    pub placeholder_width: u32,
    pub placeholder_height: u32,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            probe_range: 0..10,
            probe_timeout: Duration::from_secs(2),
            width: 1920,
            height: 1080,
            fps: 30,
            stop_timeout: Duration::from_secs(2),
            placeholder_width: 640,
            placeholder_height: 480,
        }
    }
}

/// Face smoothing knobs.
#[derive(Clone, Copy, Debug)]
pub struct SmoothingConfig {
    /// Number of accepted detections averaged.
    pub history: usize,
    /// Relative change below which a field is left alone.
    pub fluctuation_threshold: f64,
    /// Fraction of the remaining distance covered per frame.
    pub follow_speed: f64,
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self { history: 20, fluctuation_threshold: 0.03, follow_speed: 0.2 }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct CompositorConfig {
    /// Pixels moved by one pan step.
    pub pan_step: i32,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self { pan_step: 20 }
    }
}
