use std::sync::Arc;
use std::time::{Duration, Instant};

use image::{Rgb, RgbImage};

use shapecam::compositor::FrameCompositor;
use shapecam::config::{CompositorConfig, Settings, SourceConfig};
use shapecam::shapes;
use shapecam::source::{CaptureDevice, DeviceBackend, FrameSource, PLACEHOLDER_ID};
use shapecam::{Error, Result};

const FRAME_COLOR: Rgb<u8> = Rgb([200, 60, 30]);

/// Index 0 opens but never delivers a frame; index 1 streams a solid frame.
struct Rig;

struct Broken;

impl CaptureDevice for Broken {
    fn read_frame(&mut self) -> Result<RgbImage> {
        Err(Error::CameraFrame("sensor unplugged".into()))
    }
}

struct Solid;

impl CaptureDevice for Solid {
    fn read_frame(&mut self) -> Result<RgbImage> {
        std::thread::sleep(Duration::from_millis(5));
        Ok(RgbImage::from_pixel(320, 240, FRAME_COLOR))
    }
}

impl DeviceBackend for Rig {
    fn open(&self, id: u32, _config: &SourceConfig) -> Result<Box<dyn CaptureDevice>> {
        match id {
            0 => Ok(Box::new(Broken)),
            1 => Ok(Box::new(Solid)),
            _ => Err(Error::DeviceUnavailable { id, reason: "no such device".into() }),
        }
    }
}

fn config() -> SourceConfig {
    SourceConfig {
        probe_range: 0..3,
        probe_timeout: Duration::from_millis(500),
        placeholder_width: 64,
        placeholder_height: 48,
        ..SourceConfig::default()
    }
}

fn wait_for_frame(source: &FrameSource, width: u32) -> bool {
    let deadline = Instant::now() + Duration::from_secs(2);
    while Instant::now() < deadline {
        if source.get_frame().width() == width {
            return true;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    false
}

#[test]
fn only_devices_that_deliver_frames_are_listed() {
    let source = FrameSource::new(Arc::new(Rig), config());
    assert_eq!(source.cameras().real_ids(), vec![1]);
    assert!(source.cameras().contains(PLACEHOLDER_ID));
}

#[test]
fn unknown_camera_falls_back_and_streams() {
    let mut source = FrameSource::new(Arc::new(Rig), config());
    // Placeholder until the first real frame lands.
    assert_eq!(source.get_frame().dimensions(), (64, 48));

    assert_eq!(source.start(0).unwrap(), 1);
    assert_eq!(source.active_device(), Some(1));
    assert!(wait_for_frame(&source, 320));
    assert_eq!(source.get_frame().get_pixel(10, 10), &FRAME_COLOR);

    assert!(matches!(source.start(1), Err(Error::InvalidState(_))));

    source.stop();
    source.stop();
    assert!(!source.is_running());
    assert_eq!(source.active_device(), None);
}

#[test]
fn camera_switch_cycles_through_the_placeholder() {
    let mut source = FrameSource::new(Arc::new(Rig), config());
    let first = source.start(1).unwrap();
    let next = source.cameras().next_after(first).unwrap();
    assert_eq!(next, PLACEHOLDER_ID);

    source.stop();
    assert_eq!(source.start(next).unwrap(), PLACEHOLDER_ID);
    assert!(source.is_running());
    source.stop();
}

#[test]
fn frames_come_out_shaped() {
    let mut source = FrameSource::new(Arc::new(Rig), config());
    source.start(1).unwrap();
    assert!(wait_for_frame(&source, 320));
    let frame = source.get_frame();
    source.stop();

    let mut compositor = FrameCompositor::new(CompositorConfig::default(), None);
    let settings = Settings::default();
    assert!(compositor.process(&frame, &settings).unwrap().is_none());

    compositor.set_shape(shapes::builtin("circle", 128));
    let out = compositor.process(&frame, &settings).unwrap().unwrap();
    let (w, h) = out.dimensions();
    assert_eq!(w, h);
    assert!(w > 0 && w <= 240);

    let center = out.get_pixel(w / 2, h / 2);
    assert_eq!([center[0], center[1], center[2]], [200, 60, 30]);
    assert!(center[3] > 250);
    assert!(out.get_pixel(0, 0)[3] < 5);
}

#[test]
fn zoom_changes_crop_size() {
    let frame = RgbImage::from_pixel(640, 480, FRAME_COLOR);
    let mut compositor = FrameCompositor::new(CompositorConfig::default(), None);
    compositor.set_shape(shapes::builtin("rounded", 100));

    let mut settings = Settings::default();
    let wide = compositor.process(&frame, &settings).unwrap().unwrap().width();
    settings.set_zoom(2.0).unwrap();
    let tight = compositor.process(&frame, &settings).unwrap().unwrap().width();
    assert!(tight < wide, "zooming in should crop less of the frame ({tight} vs {wide})");
}
