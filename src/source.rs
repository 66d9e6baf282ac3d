//! Frame source
//!
//! Owns one capture device at a time and reads it on a dedicated background
//! thread. The consumer never waits on that thread: it picks up whatever frame was
//! published last (latest wins, no queue). Devices are discovered once at
//! construction by probing a fixed range of indices; a synthetic placeholder
//! device is always available as a fallback.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::RecvTimeoutError;
use image::{Rgb, RgbImage};
use parking_lot::Mutex;

use crate::config::SourceConfig;
use crate::error::{Error, Result};
use crate::types::Frame;

/// Reserved id of the synthetic placeholder device. Sorts after every real index.
pub const PLACEHOLDER_ID: u32 = u32::MAX;

/// Number of frame timestamps the FPS estimate is computed over.
pub const FPS_WINDOW: usize = 100;

/// An open capture stream.
pub trait CaptureDevice {
    /// Read the next frame, blocking until one is available.
    fn read_frame(&mut self) -> Result<RgbImage>;
}

/// Knows how to open capture devices by index.
///
/// `open` is always called on the thread that will read the device, and the
/// returned device is dropped (released) on that same thread.
pub trait DeviceBackend: Send + Sync + 'static {
    fn open(&self, id: u32, config: &SourceConfig) -> Result<Box<dyn CaptureDevice>>;
}

/* ------------------------------ Placeholder ------------------------------ */

/// Static "no camera" picture: a head-and-shoulders silhouette on dark gray.
pub fn placeholder_image(width: u32, height: u32) -> RgbImage {
    let (w, h) = (width as f32, height as f32);
    let head = (w * 0.5, h * 0.4, h.min(w) * 0.16);
    let shoulders = (w * 0.5, h * 1.0, w.min(h * 1.4) * 0.36, h * 0.35);

    RgbImage::from_fn(width, height, |x, y| {
        let (fx, fy) = (x as f32 + 0.5, y as f32 + 0.5);
        let in_head = (fx - head.0).powi(2) + (fy - head.1).powi(2) <= head.2 * head.2;
        let in_body = ((fx - shoulders.0) / shoulders.2).powi(2)
            + ((fy - shoulders.1) / shoulders.3).powi(2)
            <= 1.0;
        if in_head || in_body { Rgb([120, 120, 128]) } else { Rgb([40, 40, 44]) }
    })
}

/// Serves the placeholder image at a fixed cadence.
pub struct PlaceholderDevice {
    image: Frame,
    interval: Duration,
}

impl PlaceholderDevice {
    pub fn new(image: Frame, fps: u32) -> Self {
        Self { image, interval: Duration::from_secs(1) / fps.max(1) }
    }
}

impl CaptureDevice for PlaceholderDevice {
    fn read_frame(&mut self) -> Result<RgbImage> {
        std::thread::sleep(self.interval);
        Ok((*self.image).clone())
    }
}

/* ------------------------------ Device table ------------------------------ */

/// Devices that answered a probe, keyed by id, with the frame they returned.
#[derive(Clone, Default)]
pub struct CameraTable {
    devices: BTreeMap<u32, Frame>,
}

impl CameraTable {
    pub fn insert(&mut self, id: u32, probe: Frame) {
        self.devices.insert(id, probe);
    }

    pub fn get(&self, id: u32) -> Option<&Frame> {
        self.devices.get(&id)
    }

    pub fn contains(&self, id: u32) -> bool {
        self.devices.contains_key(&id)
    }

    /// All ids in ascending order; the placeholder (if present) comes last.
    pub fn ids(&self) -> Vec<u32> {
        self.devices.keys().copied().collect()
    }

    /// Ids of physical devices only.
    pub fn real_ids(&self) -> Vec<u32> {
        self.devices.keys().copied().filter(|&id| id != PLACEHOLDER_ID).collect()
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Map a requested id onto a usable one: the id itself when it was enumerated,
    /// else the first enumerated id, else the placeholder.
    pub fn resolve(&self, requested: u32) -> u32 {
        if self.contains(requested) {
            return requested;
        }
        match self.devices.keys().next() {
            Some(&first) => {
                log::warn!(
                    "camera {requested} not available, falling back to camera {}",
                    display_id(first)
                );
                first
            }
            None => {
                log::warn!("no cameras available, falling back to placeholder");
                PLACEHOLDER_ID
            }
        }
    }

    /// Id following `current` in table order, wrapping around.
    pub fn next_after(&self, current: u32) -> Option<u32> {
        self.devices
            .range(current.saturating_add(1)..)
            .map(|(&id, _)| id)
            .find(|&id| id != current)
            .or_else(|| self.devices.keys().next().copied())
    }
}

/// Open `id`, read one frame, release it. Gives up after `timeout`.
fn probe(backend: &Arc<dyn DeviceBackend>, id: u32, config: &SourceConfig) -> Result<RgbImage> {
    let (tx, rx) = crossbeam_channel::bounded::<Result<RgbImage>>(1);
    let backend = Arc::clone(backend);
    let cfg = config.clone();

    // The device lives and dies on this thread, even if we stop waiting for it.
    std::thread::Builder::new()
        .name(format!("camera-probe-{id}"))
        .spawn(move || {
            let result = backend.open(id, &cfg).and_then(|mut dev| dev.read_frame());
            let _ = tx.send(result);
        })?;

    match rx.recv_timeout(config.probe_timeout) {
        Ok(result) => result,
        Err(RecvTimeoutError::Timeout) => Err(Error::DeviceUnavailable {
            id,
            reason: format!("no frame within {:?}", config.probe_timeout),
        }),
        Err(RecvTimeoutError::Disconnected) => Err(Error::DeviceUnavailable {
            id,
            reason: "probe thread died".into(),
        }),
    }
}

/// Probe every index in `config.probe_range` and add the placeholder.
/// Best effort: a device that shows up here may still be busy by the time it is started.
pub fn enumerate(backend: &Arc<dyn DeviceBackend>, config: &SourceConfig, placeholder: &Frame) -> CameraTable {
    let mut table = CameraTable::default();
    for id in config.probe_range.clone() {
        match probe(backend, id, config) {
            Ok(frame) if frame.width() > 0 && frame.height() > 0 => {
                log::debug!("camera {id}: probe ok ({}x{})", frame.width(), frame.height());
                table.insert(id, Arc::new(frame));
            }
            Ok(_) => log::debug!("camera {id}: probe returned an empty frame"),
            Err(e) => log::debug!("camera {id}: {e}"),
        }
    }
    table.insert(PLACEHOLDER_ID, Arc::clone(placeholder));
    log::info!("cameras found: {:?}", table.real_ids());
    table
}

/* ------------------------------ Shared state ------------------------------ */

/// Single-slot handoff: the writer overwrites, the reader clones the handle.
///
/// Writers publish under their own stop flag. Retiring a writer lowers its flag
/// while holding the slot lock, so once `retire` returns that writer can no longer
/// publish, even if its thread is still blocked in a read.
#[derive(Default)]
struct FrameSlot {
    latest: Mutex<Option<Frame>>,
}

impl FrameSlot {
    /// Publish `frame` and count it, unless `running` has been lowered.
    fn publish(&self, frame: RgbImage, running: &AtomicBool, fps: &Mutex<FpsMeter>) -> bool {
        let mut latest = self.latest.lock();
        if !running.load(Ordering::Acquire) {
            return false;
        }
        *latest = Some(Arc::new(frame));
        fps.lock().tick(Instant::now());
        true
    }

    fn retire(&self, running: &AtomicBool) {
        let _latest = self.latest.lock();
        running.store(false, Ordering::Release);
    }

    fn latest(&self) -> Option<Frame> {
        self.latest.lock().clone()
    }
}

/// Rolling frame-rate estimate over the last `FPS_WINDOW` frames.
#[derive(Default)]
pub struct FpsMeter {
    stamps: VecDeque<Instant>,
}

impl FpsMeter {
    pub fn tick(&mut self, now: Instant) {
        if self.stamps.len() == FPS_WINDOW {
            self.stamps.pop_front();
        }
        self.stamps.push_back(now);
    }

    pub fn fps(&self) -> f64 {
        match (self.stamps.front(), self.stamps.back()) {
            (Some(first), Some(last)) if self.stamps.len() > 1 => {
                let span = last.duration_since(*first).as_secs_f64();
                if span > 0.0 { (self.stamps.len() - 1) as f64 / span } else { 0.0 }
            }
            _ => 0.0,
        }
    }

    pub fn reset(&mut self) {
        self.stamps.clear();
    }
}

/* ------------------------------ Frame source ------------------------------ */

/// The acquisition thread of one `start`, with its own stop flag.
struct Worker {
    handle: JoinHandle<()>,
    /// Lowered by `stop`; also cleared by the thread on exit.
    running: Arc<AtomicBool>,
}

pub struct FrameSource {
    backend: Arc<dyn DeviceBackend>,
    config: SourceConfig,
    cameras: CameraTable,
    placeholder: Frame,
    slot: Arc<FrameSlot>,
    fps: Arc<Mutex<FpsMeter>>,
    worker: Option<Worker>,
    /// Threads that did not finish within `stop_timeout`. Retired: they can no longer publish.
    detached: Vec<JoinHandle<()>>,
    active: Option<u32>,
}

impl FrameSource {
    /// Enumerate devices through `backend`. Nothing is opened until `start`.
    pub fn new(backend: Arc<dyn DeviceBackend>, config: SourceConfig) -> Self {
        let placeholder = Arc::new(placeholder_image(
            config.placeholder_width,
            config.placeholder_height,
        ));
        let cameras = enumerate(&backend, &config, &placeholder);
        Self {
            backend,
            config,
            cameras,
            placeholder,
            slot: Arc::new(FrameSlot::default()),
            fps: Arc::new(Mutex::new(FpsMeter::default())),
            worker: None,
            detached: Vec::new(),
            active: None,
        }
    }

    pub fn cameras(&self) -> &CameraTable {
        &self.cameras
    }

    /// Device the acquisition thread was started on, if any.
    pub fn active_device(&self) -> Option<u32> {
        self.active
    }

    /// True while the acquisition thread is reading frames.
    pub fn is_running(&self) -> bool {
        self.worker
            .as_ref()
            .is_some_and(|w| w.running.load(Ordering::Acquire))
    }

    /// Retired threads still blocked in a device read.
    pub fn lingering_threads(&mut self) -> usize {
        self.reap_detached();
        self.detached.len()
    }

    fn reap_detached(&mut self) {
        let (done, pending): (Vec<_>, Vec<_>) =
            self.detached.drain(..).partition(|h| h.is_finished());
        for handle in done {
            if handle.join().is_err() {
                log::error!("acquisition thread panicked");
            }
        }
        self.detached = pending;
    }

    /// Open the device for `id` (or its fallback) and start reading it on a
    /// background thread. Returns the id actually opened.
    pub fn start(&mut self, id: u32) -> Result<u32> {
        if self.worker.is_some() {
            return Err(Error::InvalidState("frame source already started; call stop() first"));
        }
        self.reap_detached();

        let id = self.cameras.resolve(id);
        self.fps.lock().reset();

        let (ready_tx, ready_rx) = crossbeam_channel::bounded::<Result<()>>(1);
        let backend = Arc::clone(&self.backend);
        let config = self.config.clone();
        let placeholder = Arc::clone(&self.placeholder);
        let slot = Arc::clone(&self.slot);
        let fps = Arc::clone(&self.fps);
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);

        let spawned = std::thread::Builder::new()
            .name("frame-source".to_string())
            .spawn(move || {
                let running = thread_running;
                let opened = if id == PLACEHOLDER_ID {
                    Ok(Box::new(PlaceholderDevice::new(placeholder, config.fps)) as Box<dyn CaptureDevice>)
                } else {
                    backend.open(id, &config)
                };
                let device = match opened {
                    Ok(device) => {
                        let _ = ready_tx.send(Ok(()));
                        device
                    }
                    Err(e) => {
                        running.store(false, Ordering::Release);
                        let _ = ready_tx.send(Err(e));
                        return;
                    }
                };
                acquire(id, device, &slot, &fps, &running);
            });

        let handle = spawned?;

        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.worker = Some(Worker { handle, running });
                self.active = Some(id);
                log::info!("frame source started on camera {}", display_id(id));
                Ok(id)
            }
            Ok(Err(e)) => {
                let _ = handle.join();
                Err(e)
            }
            Err(_) => {
                let _ = handle.join();
                Err(Error::DeviceUnavailable { id, reason: "acquisition thread died while opening".into() })
            }
        }
    }

    /// `start`, but a device that fails to open is replaced by the placeholder.
    /// Enumeration is best effort, so a listed camera can still be busy or gone.
    pub fn start_or_placeholder(&mut self, id: u32) -> Result<u32> {
        match self.start(id) {
            Err(Error::DeviceUnavailable { id, reason }) if id != PLACEHOLDER_ID => {
                log::warn!("camera {id} unavailable ({reason}); showing the placeholder");
                self.start(PLACEHOLDER_ID)
            }
            other => other,
        }
    }

    /// Stop the acquisition thread and release the device. No-op when not started.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.slot.retire(&worker.running);

        // A read in progress has to finish first; wait for it, but not forever.
        let deadline = Instant::now() + self.config.stop_timeout;
        while !worker.handle.is_finished() && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(2));
        }
        if worker.handle.is_finished() {
            if worker.handle.join().is_err() {
                log::error!("acquisition thread panicked");
            }
        } else {
            log::warn!(
                "acquisition thread did not stop within {:?}; detaching it",
                self.config.stop_timeout
            );
            self.detached.push(worker.handle);
        }

        if let Some(id) = self.active.take() {
            log::info!("frame source stopped on camera {}", display_id(id));
        }
    }

    /// Newest published frame; the placeholder until the first one arrives.
    /// Never waits on the acquisition thread.
    pub fn get_frame(&self) -> Frame {
        self.slot.latest().unwrap_or_else(|| Arc::clone(&self.placeholder))
    }

    /// Rolling frames-per-second delivered by the device.
    pub fn fps(&self) -> f64 {
        self.fps.lock().fps()
    }
}

impl Drop for FrameSource {
    fn drop(&mut self) {
        self.stop();
    }
}

fn display_id(id: u32) -> String {
    if id == PLACEHOLDER_ID { "placeholder".to_string() } else { id.to_string() }
}

/// Acquisition loop: read, publish, count, until asked to stop or the device fails.
fn acquire(
    id: u32,
    mut device: Box<dyn CaptureDevice>,
    slot: &FrameSlot,
    fps: &Mutex<FpsMeter>,
    running: &AtomicBool,
) {
    log::info!("acquisition thread started (camera {})", display_id(id));
    while running.load(Ordering::Acquire) {
        match device.read_frame() {
            Ok(frame) => {
                if !slot.publish(frame, running, fps) {
                    break;
                }
            }
            Err(e) => {
                // The last frame stays published; restarting is the caller's call.
                log::error!("{e}; acquisition stopped");
                break;
            }
        }
    }
    running.store(false, Ordering::Release);
    drop(device);
    log::info!("acquisition thread stopped (camera {})", display_id(id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    /// Every device yields frames of a fixed color; `fail_after` reads then errors.
    struct Scripted {
        fail_after: Option<usize>,
    }

    struct ScriptedDevice {
        reads: usize,
        fail_after: Option<usize>,
    }

    impl CaptureDevice for ScriptedDevice {
        fn read_frame(&mut self) -> Result<RgbImage> {
            std::thread::sleep(Duration::from_millis(2));
            if self.fail_after.is_some_and(|n| self.reads >= n) {
                return Err(Error::CameraFrame("unplugged".into()));
            }
            self.reads += 1;
            Ok(RgbImage::from_pixel(8, 6, Rgb([self.reads as u8, 0, 0])))
        }
    }

    impl DeviceBackend for Scripted {
        fn open(&self, id: u32, _config: &SourceConfig) -> Result<Box<dyn CaptureDevice>> {
            if id == 0 {
                Ok(Box::new(ScriptedDevice { reads: 0, fail_after: self.fail_after }))
            } else {
                Err(Error::DeviceUnavailable { id, reason: "absent".into() })
            }
        }
    }

    fn config() -> SourceConfig {
        SourceConfig {
            probe_range: 0..3,
            probe_timeout: Duration::from_millis(500),
            placeholder_width: 16,
            placeholder_height: 12,
            ..SourceConfig::default()
        }
    }

    fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
        let deadline = Instant::now() + Duration::from_secs(2);
        while Instant::now() < deadline {
            if cond() {
                return true;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
        false
    }

    #[test]
    fn placeholder_is_always_enumerated_last() {
        let source = FrameSource::new(Arc::new(Scripted { fail_after: None }), config());
        assert_eq!(source.cameras().ids(), vec![0, PLACEHOLDER_ID]);
        assert_eq!(source.cameras().real_ids(), vec![0]);
    }

    #[test]
    fn get_frame_before_start_is_the_placeholder() {
        let source = FrameSource::new(Arc::new(Scripted { fail_after: None }), config());
        assert_eq!(source.get_frame().dimensions(), (16, 12));
    }

    #[test]
    fn stop_is_idempotent() {
        let mut source = FrameSource::new(Arc::new(Scripted { fail_after: None }), config());
        source.stop();
        source.start(0).unwrap();
        source.stop();
        source.stop();
        assert!(!source.is_running());
        assert_eq!(source.active_device(), None);
    }

    #[test]
    fn frames_flow_and_restart_works() {
        let mut source = FrameSource::new(Arc::new(Scripted { fail_after: None }), config());
        assert_eq!(source.start(0).unwrap(), 0);
        assert!(wait_until(|| source.get_frame().dimensions() == (8, 6)));
        source.stop();
        assert_eq!(source.start(0).unwrap(), 0);
        source.stop();
    }

    #[test]
    fn read_error_ends_thread_and_keeps_last_frame() {
        let mut source = FrameSource::new(Arc::new(Scripted { fail_after: Some(3) }), config());
        source.start(0).unwrap();
        assert!(wait_until(|| !source.is_running()));
        let last = source.get_frame();
        assert_eq!(last.dimensions(), (8, 6));
        assert_eq!(last.get_pixel(0, 0)[0], 3);
        // Still "started" until the caller stops it.
        assert!(matches!(source.start(0), Err(Error::InvalidState(_))));
        source.stop();
    }

    #[test]
    fn placeholder_fallback_when_nothing_answers() {
        let backend = Arc::new(Scripted { fail_after: None });
        let cfg = SourceConfig { probe_range: 1..3, ..config() };
        let mut source = FrameSource::new(backend, cfg);
        assert!(source.cameras().real_ids().is_empty());
        assert_eq!(source.start(0).unwrap(), PLACEHOLDER_ID);
        source.stop();
    }

    #[test]
    fn probe_timeout_excludes_hanging_device() {
        struct Hangs(Arc<AtomicUsize>);
        struct HangingDevice;
        impl CaptureDevice for HangingDevice {
            fn read_frame(&mut self) -> Result<RgbImage> {
                std::thread::sleep(Duration::from_millis(300));
                Ok(RgbImage::new(2, 2))
            }
        }
        impl DeviceBackend for Hangs {
            fn open(&self, _id: u32, _config: &SourceConfig) -> Result<Box<dyn CaptureDevice>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(Box::new(HangingDevice))
            }
        }

        let opened = Arc::new(AtomicUsize::new(0));
        let cfg = SourceConfig {
            probe_range: 0..1,
            probe_timeout: Duration::from_millis(20),
            ..config()
        };
        let backend: Arc<dyn DeviceBackend> = Arc::new(Hangs(Arc::clone(&opened)));
        let table = enumerate(&backend, &cfg, &Arc::new(RgbImage::new(1, 1)));
        assert_eq!(opened.load(Ordering::SeqCst), 1);
        assert!(table.real_ids().is_empty());
    }

    #[test]
    fn restart_after_detached_stop_only_shows_the_new_camera() {
        const RED: Rgb<u8> = Rgb([255, 0, 0]);
        const GREEN: Rgb<u8> = Rgb([0, 255, 0]);

        /// Camera 0 takes 150ms per read; camera 1 is fast.
        struct TwoCameras(Arc<AtomicUsize>);
        struct Slow(Arc<AtomicUsize>);
        struct Fast;
        impl CaptureDevice for Slow {
            fn read_frame(&mut self) -> Result<RgbImage> {
                std::thread::sleep(Duration::from_millis(150));
                self.0.fetch_add(1, Ordering::SeqCst);
                Ok(RgbImage::from_pixel(4, 4, RED))
            }
        }
        impl CaptureDevice for Fast {
            fn read_frame(&mut self) -> Result<RgbImage> {
                std::thread::sleep(Duration::from_millis(2));
                Ok(RgbImage::from_pixel(4, 4, GREEN))
            }
        }
        impl DeviceBackend for TwoCameras {
            fn open(&self, id: u32, _config: &SourceConfig) -> Result<Box<dyn CaptureDevice>> {
                match id {
                    0 => Ok(Box::new(Slow(Arc::clone(&self.0)))),
                    1 => Ok(Box::new(Fast)),
                    _ => Err(Error::DeviceUnavailable { id, reason: "absent".into() }),
                }
            }
        }

        let slow_reads = Arc::new(AtomicUsize::new(0));
        let cfg = SourceConfig {
            probe_range: 0..2,
            stop_timeout: Duration::from_millis(20),
            ..config()
        };
        let mut source = FrameSource::new(Arc::new(TwoCameras(Arc::clone(&slow_reads))), cfg);
        assert_eq!(source.cameras().real_ids(), vec![0, 1]);

        source.start(0).unwrap();
        assert!(wait_until(|| *source.get_frame().get_pixel(0, 0) == RED));
        source.stop();
        let reads_at_stop = slow_reads.load(Ordering::SeqCst);
        assert_eq!(source.start(1).unwrap(), 1);
        assert!(wait_until(|| *source.get_frame().get_pixel(0, 0) == GREEN));

        let mut red = 0;
        for _ in 0..100 {
            if *source.get_frame().get_pixel(0, 0) == RED {
                red += 1;
            }
            std::thread::sleep(Duration::from_millis(3));
        }
        assert_eq!(red, 0, "retired camera kept publishing");
        // The retired thread finishes its pending read and exits.
        assert!(slow_reads.load(Ordering::SeqCst) <= reads_at_stop + 1);
        assert!(wait_until(|| source.lingering_threads() == 0));
        source.stop();
    }

    #[test]
    fn busy_camera_falls_back_to_placeholder() {
        /// Answers the probe, then refuses every later open.
        struct OpensOnce(AtomicUsize);
        impl DeviceBackend for OpensOnce {
            fn open(&self, id: u32, _config: &SourceConfig) -> Result<Box<dyn CaptureDevice>> {
                if id == 0 && self.0.fetch_add(1, Ordering::SeqCst) == 0 {
                    Ok(Box::new(ScriptedDevice { reads: 0, fail_after: None }))
                } else {
                    Err(Error::DeviceUnavailable { id, reason: "busy".into() })
                }
            }
        }

        let mut source = FrameSource::new(Arc::new(OpensOnce(AtomicUsize::new(0))), config());
        assert_eq!(source.cameras().real_ids(), vec![0]);
        assert!(matches!(source.start(0), Err(Error::DeviceUnavailable { id: 0, .. })));
        assert!(!source.is_running());

        assert_eq!(source.start_or_placeholder(0).unwrap(), PLACEHOLDER_ID);
        assert!(source.is_running());
        assert!(matches!(source.start_or_placeholder(0), Err(Error::InvalidState(_))));
        source.stop();
    }

    #[test]
    fn resolve_and_cycle() {
        let mut table = CameraTable::default();
        let f = Arc::new(RgbImage::new(1, 1));
        table.insert(2, Arc::clone(&f));
        table.insert(5, Arc::clone(&f));
        table.insert(PLACEHOLDER_ID, f);
        assert_eq!(table.resolve(5), 5);
        assert_eq!(table.resolve(7), 2);
        assert_eq!(table.next_after(2), Some(5));
        assert_eq!(table.next_after(5), Some(PLACEHOLDER_ID));
        assert_eq!(table.next_after(PLACEHOLDER_ID), Some(2));
        assert_eq!(CameraTable::default().resolve(3), PLACEHOLDER_ID);
    }

    #[test]
    fn fps_meter_window() {
        let mut meter = FpsMeter::default();
        let t0 = Instant::now();
        for i in 0..(FPS_WINDOW + 50) {
            meter.tick(t0 + Duration::from_millis(10 * i as u64));
        }
        assert!((meter.fps() - 100.0).abs() < 0.5, "fps {}", meter.fps());
    }
}
