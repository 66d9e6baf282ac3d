// Physical camera backend on top of nokhwa.
// Devices are opened on the thread that reads them (probe thread or acquisition
// thread), so nothing here needs to be Send.

use image::RgbImage;
use nokhwa::{
    Camera,
    pixel_format::RgbFormat,
    utils::{
        CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType, Resolution,
    },
};

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::source::{CaptureDevice, DeviceBackend};

/// Opens cameras by index through the platform's native API.
#[derive(Clone, Copy, Debug, Default)]
pub struct NokhwaBackend;

impl DeviceBackend for NokhwaBackend {
    fn open(&self, id: u32, config: &SourceConfig) -> Result<Box<dyn CaptureDevice>> {
        Ok(Box::new(NokhwaDevice::open(id, config)?))
    }
}

/// One open camera stream.
pub struct NokhwaDevice {
    cam: Camera,
    id: u32,
}

impl NokhwaDevice {
    /// Open camera `id` and start streaming.
    /// The requested format is a ceiling: the driver may pick something smaller.
    pub fn open(id: u32, config: &SourceConfig) -> Result<Self> {
        let unavailable = |reason: String| Error::DeviceUnavailable { id, reason };

        // 1) MJPEG keeps USB bandwidth low at high resolutions.
        let fmt = CameraFormat::new(
            Resolution::new(config.width, config.height),
            FrameFormat::MJPEG,
            config.fps,
        );
        let req = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(fmt));

        // 2) Create the camera (fails if no device exists at this index).
        let mut cam = Camera::new(CameraIndex::Index(id), req)
            .map_err(|e| unavailable(format!("create camera: {e}")))?;

        // 3) Start streaming.
        cam.open_stream().map_err(|e| unavailable(format!("open stream: {e}")))?;

        let actual = cam.camera_format();
        log::info!(
            "camera {id} opened: {} ({}x{} {} @ {}fps)",
            cam.info().human_name(),
            actual.resolution().width(),
            actual.resolution().height(),
            actual.format(),
            actual.frame_rate()
        );

        Ok(Self { cam, id })
    }
}

impl CaptureDevice for NokhwaDevice {
    /// Blocks until the driver hands over the next frame.
    fn read_frame(&mut self) -> Result<RgbImage> {
        let frame = self
            .cam
            .frame()
            .map_err(|e| Error::CameraFrame(format!("camera {}: fetch frame: {e}", self.id)))?;

        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|e| Error::CameraFrame(format!("camera {}: decode RGB: {e}", self.id)))?;

        let (w, h) = decoded.dimensions();
        RgbImage::from_raw(w, h, decoded.into_raw())
            .ok_or_else(|| Error::CameraFrame(format!("camera {}: short frame buffer", self.id)))
    }
}

impl Drop for NokhwaDevice {
    fn drop(&mut self) {
        if let Err(e) = self.cam.stop_stream() {
            log::warn!("camera {}: stop stream: {e}", self.id);
        }
        log::debug!("camera {} released", self.id);
    }
}
