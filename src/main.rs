// Thin host around the pipeline: one window, keyboard controls, settings in memory.
//
// Keys:
// • Arrows pan (only while the crop can still move that way), R recenters.
// • = / - zoom in / out.
// • F toggles follow-face, Tab cycles shapes, C switches camera.
// • D toggles the debug view (detections + crop box on the full frame). ESC quits.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use minifb::Key;

use shapecam::camera::NokhwaBackend;
use shapecam::compositor::FrameCompositor;
use shapecam::config::{CompositorConfig, Settings, SmoothingConfig, SourceConfig, Tunables};
use shapecam::detect::{Detector, DetectorKind};
use shapecam::draw::Drawer;
use shapecam::error::Result;
use shapecam::gamma::GammaLut;
use shapecam::locator::FaceLocator;
use shapecam::shapes::{self, ShapeDir, ShapeProvider};
use shapecam::source::FrameSource;
use shapecam::types::FrameBuffer;

const WINDOW_SIZE: usize = 720;
const BACKGROUND: u32 = 0x00_20_20_24;
const BUILTIN_SHAPE_SIZE: u32 = 512;
const ZOOM_STEP: f64 = 1.1;

#[derive(Parser, Debug)]
#[command(name = "shapecam", about = "Live camera framed into a shape")]
struct Args {
    /// Camera index to start with (falls back to the first one found)
    #[arg(long, default_value_t = 0)]
    camera: u32,

    /// Face detector: "model" or "cascade"
    #[arg(long)]
    detector: Option<DetectorKind>,

    /// ONNX model (model detector) or JSON cascade (cascade detector)
    #[arg(long, requires = "detector")]
    detector_file: Option<PathBuf>,

    /// Directory of extra .png shape masks
    #[arg(long)]
    shapes: Option<PathBuf>,

    /// Start with follow-face off
    #[arg(long)]
    no_follow: bool,

    /// Start in debug view
    #[arg(long)]
    debug: bool,
}

/// Built-in shapes first, then whatever the shape directory holds.
struct ShapeCatalog {
    dir: Option<ShapeDir>,
    ids: Vec<String>,
}

impl ShapeCatalog {
    fn new(dir: Option<ShapeDir>) -> Self {
        let mut ids: Vec<String> = shapes::BUILTIN.iter().map(|s| s.to_string()).collect();
        if let Some(d) = &dir {
            match d.list() {
                Ok(found) => {
                    for id in found {
                        if !ids.contains(&id) {
                            ids.push(id);
                        }
                    }
                }
                Err(e) => log::warn!("shape directory {}: {e}", d.root().display()),
            }
        }
        Self { dir, ids }
    }

    fn mask(&self, id: &str) -> Option<image::GrayImage> {
        if let Some(m) = shapes::builtin(id, BUILTIN_SHAPE_SIZE) {
            return Some(m);
        }
        let dir = self.dir.as_ref()?;
        match shapes::load_mask(dir, id) {
            Ok(m) => Some(m),
            Err(e) => {
                log::warn!("shape {id}: {e}");
                None
            }
        }
    }

    fn next(&self, current: Option<&str>) -> Option<&str> {
        let idx = current
            .and_then(|c| self.ids.iter().position(|id| id == c))
            .map_or(0, |i| (i + 1) % self.ids.len());
        self.ids.get(idx).map(String::as_str)
    }
}

fn build_locator(args: &Args) -> Result<Option<FaceLocator>> {
    let Some(kind) = args.detector else {
        return Ok(None);
    };
    let Some(path) = &args.detector_file else {
        log::warn!("--detector {kind} given without --detector-file; face following disabled");
        return Ok(None);
    };
    let detector = Detector::load(kind, path)?;
    log::info!("{kind} detector ready");
    Ok(Some(FaceLocator::new(detector, SmoothingConfig::default())))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    /* --- Pipeline setup --- */
    let mut source = FrameSource::new(Arc::new(NokhwaBackend), SourceConfig::default());
    let mut settings = Settings::default();
    settings.set_follow_face(!args.no_follow);
    let started = source.start_or_placeholder(args.camera)?;
    settings.set_selected_camera(started);

    let catalog = ShapeCatalog::new(args.shapes.clone().map(ShapeDir::new));
    let mut compositor = FrameCompositor::new(CompositorConfig::default(), build_locator(&args)?);
    compositor.set_debug(args.debug);
    settings.set_selected_shape(catalog.next(None).map(str::to_string));
    compositor.set_shape(settings.selected_shape().and_then(|id| catalog.mask(id)));

    let mut drawer = Drawer::new("shapecam", WINDOW_SIZE, WINDOW_SIZE)?;
    let lut = GammaLut::new();

    let mut last_title = Instant::now();
    let mut ticks: u32 = 0;

    /* ------------------------------ Main loop ------------------------------ */
    while drawer.is_open() {
        let now = Instant::now();

        /* 1) Inputs -> settings */
        let step = compositor.pan_step();
        if drawer.pressed_repeat(Key::Left) && compositor.can_move_left(&settings) {
            settings.pan_by(-step, 0);
        }
        if drawer.pressed_repeat(Key::Right) && compositor.can_move_right(&settings) {
            settings.pan_by(step, 0);
        }
        if drawer.pressed_repeat(Key::Up) && compositor.can_move_up(&settings) {
            settings.pan_by(0, -step);
        }
        if drawer.pressed_repeat(Key::Down) && compositor.can_move_down(&settings) {
            settings.pan_by(0, step);
        }
        if drawer.pressed_once(Key::R) {
            settings.reset_pan();
        }
        if drawer.pressed_repeat(Key::Equal) {
            settings.set_zoom(settings.zoom_factor() * ZOOM_STEP)?;
        }
        if drawer.pressed_repeat(Key::Minus) {
            settings.set_zoom(settings.zoom_factor() / ZOOM_STEP)?;
        }
        if drawer.pressed_once(Key::F) {
            settings.set_follow_face(!settings.follow_face());
        }
        if drawer.pressed_once(Key::D) {
            compositor.set_debug(!compositor.debug());
        }
        if drawer.pressed_once(Key::Tab) {
            let next = catalog.next(settings.selected_shape()).map(str::to_string);
            compositor.set_shape(next.as_deref().and_then(|id| catalog.mask(id)));
            settings.set_selected_shape(next);
        }
        if drawer.pressed_once(Key::C) {
            if let Some(next) = source.cameras().next_after(settings.selected_camera()) {
                source.stop();
                match source.start_or_placeholder(next) {
                    Ok(opened) => settings.set_selected_camera(opened),
                    Err(e) => log::error!("camera switch failed: {e}"),
                }
                if let Some(locator) = compositor.locator_mut() {
                    locator.reset();
                }
            }
        }

        /* 2) Newest frame -> composited output */
        let frame = source.get_frame();
        let screen = match compositor.process(&frame, &settings) {
            Ok(Some(out)) => FrameBuffer::from_rgba_over(&out, BACKGROUND, &lut),
            Ok(None) => FrameBuffer::from_rgb(&frame),
            Err(e) => {
                log::error!("compositing failed: {e}");
                FrameBuffer::from_rgb(&frame)
            }
        };

        /* 3) Present */
        let (ww, wh) = drawer.size();
        drawer.present(&screen.letterbox(ww.max(1), wh.max(1), BACKGROUND))?;

        /* 4) FPS in the title once per second */
        ticks += 1;
        if now.duration_since(last_title) >= Duration::from_secs(1) {
            let secs = now.duration_since(last_title).as_secs_f64();
            let title = format!(
                "shapecam | camera {:.1} fps | display {:.1} fps | zoom {:.2}{}",
                source.fps(),
                ticks as f64 / secs,
                settings.zoom_factor(),
                if settings.follow_face() { " | following" } else { "" }
            );
            log::debug!("{title}");
            drawer.set_title(&title);
            ticks = 0;
            last_title = now;
        }
    }

    source.stop();
    Ok(())
}
