// One error type for the whole pipeline.
// Every variant states *where* things went wrong.
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A capture device could not be opened or probed.
    #[error("camera {id} unavailable: {reason}")]
    DeviceUnavailable { id: u32, reason: String },

    /// The caller drove the frame source out of order (start while running).
    #[error("invalid state: {0}")]
    InvalidState(&'static str),

    /// Unknown detector name, or a backend this build does not include.
    #[error("unsupported detector: {0}")]
    UnsupportedDetector(String),

    /// A frame with a zero dimension reached the compositor.
    #[error("invalid frame size {width}x{height}")]
    InvalidFrameSize { width: u32, height: u32 },

    #[error("invalid zoom factor {0} (must be finite and > 0)")]
    InvalidZoom(f64),

    /// Grabbing/decoding a frame failed.
    #[error("camera frame error: {0}")]
    CameraFrame(String),

    /// Loading or running a detector model failed.
    #[error("detector model error: {0}")]
    Model(String),

    #[error("shape mask error: {0}")]
    Shape(#[from] image::ImageError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Creating the window failed
    #[error("window init error: {0}")]
    WindowInit(String),

    /// Updating the window buffer failed
    #[error("window update error: {0}")]
    WindowUpdate(String),
}

pub type Result<T> = std::result::Result<T, Error>;
