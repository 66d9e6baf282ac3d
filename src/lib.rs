//! shapecam: live camera framing into a shape.
//!
//! The pipeline, one tick at a time:
//! 1. [`source::FrameSource`] reads the camera on a background thread and hands out
//!    the newest frame.
//! 2. [`locator::FaceLocator`] finds the dominant face and smooths it over time.
//! 3. [`compositor::FrameCompositor`] crops around the face (or the frame center),
//!    applies zoom and pan, and masks the result with the selected shape.
//!
//! Live settings are read through [`config::Tunables`]; nothing here persists them.

pub mod camera;
pub mod compositor;
pub mod config;
pub mod detect;
pub mod draw;
pub mod error;
pub mod gamma;
pub mod locator;
pub mod rect;
pub mod shapes;
pub mod smoothing;
pub mod source;
pub mod types;
pub mod vision;

pub use error::{Error, Result};
pub use rect::Rect;
