//! Face detector backends.
//!
//! Exactly two strategies exist and the choice is fixed when the detector is
//! built: a learned model on a downscaled frame, and a classical cascade on the
//! grayscale frame. Both return raw candidate rectangles in source pixels.

pub mod cascade;
pub mod model;

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use image::RgbImage;

use crate::error::{Error, Result};
use crate::rect::Rect;

pub use cascade::{Cascade, CascadeDetector};
#[cfg(feature = "backend-tract")]
pub use model::ModelDetector;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DetectorKind {
    Model,
    Cascade,
}

impl FromStr for DetectorKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "model" | "dnn" => Ok(Self::Model),
            "cascade" | "haar" => Ok(Self::Cascade),
            other => Err(Error::UnsupportedDetector(other.to_string())),
        }
    }
}

impl fmt::Display for DetectorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model => f.write_str("model"),
            Self::Cascade => f.write_str("cascade"),
        }
    }
}

pub enum Detector {
    #[cfg(feature = "backend-tract")]
    Model(ModelDetector),
    Cascade(CascadeDetector),
}

impl Detector {
    /// Build the `kind` backend from the model or cascade file at `path`.
    pub fn load(kind: DetectorKind, path: &Path) -> Result<Self> {
        match kind {
            #[cfg(feature = "backend-tract")]
            DetectorKind::Model => Ok(Self::Model(ModelDetector::load(path)?)),
            #[cfg(not(feature = "backend-tract"))]
            DetectorKind::Model => {
                let _ = path;
                Err(Error::UnsupportedDetector("model (built without backend-tract)".into()))
            }
            DetectorKind::Cascade => Ok(Self::Cascade(CascadeDetector::load(path)?)),
        }
    }

    pub fn kind(&self) -> DetectorKind {
        match self {
            #[cfg(feature = "backend-tract")]
            Self::Model(_) => DetectorKind::Model,
            Self::Cascade(_) => DetectorKind::Cascade,
        }
    }

    /// Run the backend once on `frame`. Candidates come back in backend order.
    pub fn detect(&mut self, frame: &RgbImage) -> Result<Vec<Rect>> {
        match self {
            #[cfg(feature = "backend-tract")]
            Self::Model(m) => m.detect(frame),
            Self::Cascade(c) => Ok(c.detect(frame)),
        }
    }
}

impl From<CascadeDetector> for Detector {
    fn from(c: CascadeDetector) -> Self {
        Self::Cascade(c)
    }
}
