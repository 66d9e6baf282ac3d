//! Frame compositor
//!
//! Turns (frame, focus rectangle, shape mask, zoom, pan offsets) into the output
//! image: the frame cropped around the focus area to the shape's bounding box,
//! with the shape as alpha. Also answers whether another pan step would still
//! keep the crop inside the frame.

use image::{GenericImageView, GrayImage, RgbImage, RgbaImage, imageops};

use crate::config::{CompositorConfig, Tunables};
use crate::draw::{CROP_COLOR, SELECTED_COLOR, draw_rect};
use crate::error::{Error, Result};
use crate::locator::FaceLocator;
use crate::rect::Rect;
use crate::types::to_rgba;

/// The face rectangle when there is one, else a centered square a third of the
/// shorter frame side.
pub fn focus_area(face: Option<Rect>, frame_width: u32, frame_height: u32) -> Result<Rect> {
    if frame_width == 0 || frame_height == 0 {
        return Err(Error::InvalidFrameSize { width: frame_width, height: frame_height });
    }
    if let Some(face) = face {
        return Ok(face);
    }
    let side = (frame_width.min(frame_height) / 3) as i32;
    let top = (frame_height as i32 - side) / 2;
    let left = (frame_width as i32 - side) / 2;
    Ok(Rect::new(top, left, side, side))
}

/// Margin added around the focus area. Zoom 1 leaves a third of the focus size on
/// each side; larger zoom shrinks it and eventually goes negative (crop into the face).
pub fn padding(focus: Rect, zoom: f64) -> Result<i32> {
    if !zoom.is_finite() || zoom <= 0.0 {
        return Err(Error::InvalidZoom(zoom));
    }
    let base = focus.width.max(focus.height) as f64 / 3.0;
    Ok((-base + base / zoom / 0.5).round() as i32)
}

/// Geometry of one composition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Plan {
    /// Padded, panned, clamped area the shape is fitted to.
    pub area: Rect,
    /// Where the scaled shape lands in the frame; also the output size.
    pub crop: Rect,
}

/// Fit a `mask_w`x`mask_h` shape around `focus` inside a `frame_w`x`frame_h` frame.
pub fn plan(
    focus: Rect,
    frame_w: u32,
    frame_h: u32,
    mask_w: u32,
    mask_h: u32,
    zoom: f64,
    offset: (i32, i32),
) -> Result<Plan> {
    if frame_w == 0 || frame_h == 0 {
        return Err(Error::InvalidFrameSize { width: frame_w, height: frame_h });
    }
    let (fw, fh) = (frame_w as f64, frame_h as f64);

    // 1) Effective area.
    let area = focus
        .pad(padding(focus, zoom)?)
        .translate(offset.0, offset.1)
        .clamp_to(frame_w, frame_h);

    // 2) Cover the area with the mask, then shrink until it fits the frame.
    let (mw, mh) = (mask_w.max(1) as f64, mask_h.max(1) as f64);
    let mut scale = (area.height as f64 / mh).max(area.width as f64 / mw);
    if mw * scale > fw || mh * scale > fh {
        scale *= (fw / (mw * scale)).min(fh / (mh * scale));
    }
    let sw = ((mw * scale).round() as i32).clamp(1, frame_w as i32);
    let sh = ((mh * scale).round() as i32).clamp(1, frame_h as i32);

    // 3) Center on the area, keep fully inside the frame.
    let left = (area.left - (sw - area.width).div_euclid(2)).clamp(0, frame_w as i32 - sw);
    let top = (area.top - (sh - area.height).div_euclid(2)).clamp(0, frame_h as i32 - sh);

    Ok(Plan { area, crop: Rect::new(top, left, sw, sh) })
}

/// Crop `frame` to `crop` and use `mask` (already `crop`-sized) as alpha.
pub fn apply_mask(frame: &RgbImage, crop: Rect, mask: &GrayImage) -> RgbaImage {
    let region = imageops::crop_imm(frame, crop.left as u32, crop.top as u32, crop.width as u32, crop.height as u32);
    RgbaImage::from_fn(crop.width as u32, crop.height as u32, |x, y| {
        let p = region.get_pixel(x, y);
        image::Rgba([p[0], p[1], p[2], mask.get_pixel(x, y)[0]])
    })
}

pub struct FrameCompositor {
    config: CompositorConfig,
    locator: Option<FaceLocator>,
    shape: Option<GrayImage>,
    /// `shape` resized for the last crop size.
    scaled: Option<GrayImage>,
    face: Option<Rect>,
    focus: Option<Rect>,
    frame_size: Option<(u32, u32)>,
    debug: bool,
}

impl FrameCompositor {
    /// `locator` is optional: without one, follow-face has nothing to follow.
    pub fn new(config: CompositorConfig, locator: Option<FaceLocator>) -> Self {
        Self {
            config,
            locator,
            shape: None,
            scaled: None,
            face: None,
            focus: None,
            frame_size: None,
            debug: false,
        }
    }

    /// Replace the shape mask (luminance = opacity). `None` turns output off.
    pub fn set_shape(&mut self, shape: Option<GrayImage>) {
        self.shape = shape;
        self.scaled = None;
    }

    pub fn has_shape(&self) -> bool {
        self.shape.is_some()
    }

    /// Debug mode returns the whole frame with the crop drawn instead of the crop.
    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
        if let Some(locator) = &mut self.locator {
            locator.set_debug(debug);
        }
    }

    pub fn debug(&self) -> bool {
        self.debug
    }

    pub fn locator_mut(&mut self) -> Option<&mut FaceLocator> {
        self.locator.as_mut()
    }

    /// Focus area used by the last `process` call.
    pub fn focus(&self) -> Option<Rect> {
        self.focus
    }

    /// Compose one output image. `Ok(None)` when no shape is selected.
    pub fn process(&mut self, frame: &RgbImage, tunables: &dyn Tunables) -> Result<Option<RgbaImage>> {
        if self.shape.is_none() {
            return Ok(None);
        }
        let (w, h) = frame.dimensions();

        // A face from another frame size (camera switch) no longer means anything.
        if self.frame_size.is_some_and(|size| size != (w, h)) {
            self.face = None;
        }
        // Only following refreshes the face; otherwise the last one stays put.
        if tunables.follow_face() {
            if let Some(locator) = &mut self.locator {
                self.face = Some(locator.locate(frame));
            }
        }
        let focus = focus_area(self.face, w, h)?;
        self.focus = Some(focus);
        self.frame_size = Some((w, h));

        let Some(shape) = &self.shape else {
            return Ok(None);
        };
        let plan = plan(focus, w, h, shape.width(), shape.height(), tunables.zoom_factor(), tunables.offset())?;

        if self.debug {
            return Ok(Some(self.debug_view(frame, focus, &plan)));
        }

        let (cw, ch) = (plan.crop.width as u32, plan.crop.height as u32);
        if self.scaled.as_ref().is_none_or(|m| m.dimensions() != (cw, ch)) {
            self.scaled = Some(imageops::resize(shape, cw, ch, imageops::FilterType::Triangle));
        }
        let Some(mask) = &self.scaled else {
            return Ok(None);
        };
        Ok(Some(apply_mask(frame, plan.crop, mask)))
    }

    fn debug_view(&self, frame: &RgbImage, focus: Rect, plan: &Plan) -> RgbaImage {
        let mut view = self
            .locator
            .as_ref()
            .and_then(FaceLocator::debug_overlay)
            .filter(|o| o.dimensions() == frame.dimensions())
            .cloned()
            .unwrap_or_else(|| frame.clone());
        draw_rect(&mut view, focus, SELECTED_COLOR, 1);
        draw_rect(&mut view, plan.crop, CROP_COLOR, 3);
        to_rgba(&view)
    }

    /// Effective area after shifting the offset by (`dx`, `dy`), unclamped.
    fn panned_area(&self, tunables: &dyn Tunables, dx: i32, dy: i32) -> Option<Rect> {
        let focus = self.focus?;
        let (ox, oy) = tunables.offset();
        let pad = padding(focus, tunables.zoom_factor()).ok()?;
        Some(focus.pad(pad).translate(ox + dx, oy + dy))
    }

    fn can_move(&self, tunables: &dyn Tunables, dx: i32, dy: i32, fits: impl Fn(Rect, u32, u32) -> bool) -> bool {
        let (Some(_), Some((w, h))) = (self.focus, self.frame_size) else {
            return true;
        };
        self.panned_area(tunables, dx, dy).is_some_and(|a| fits(a, w, h))
    }

    pub fn can_move_left(&self, tunables: &dyn Tunables) -> bool {
        self.can_move(tunables, -self.config.pan_step, 0, |a, _, _| a.left >= 0)
    }

    pub fn can_move_right(&self, tunables: &dyn Tunables) -> bool {
        self.can_move(tunables, self.config.pan_step, 0, |a, w, _| a.right() <= w as i32)
    }

    pub fn can_move_up(&self, tunables: &dyn Tunables) -> bool {
        self.can_move(tunables, 0, -self.config.pan_step, |a, _, _| a.top >= 0)
    }

    pub fn can_move_down(&self, tunables: &dyn Tunables) -> bool {
        self.can_move(tunables, 0, self.config.pan_step, |a, _, h| a.bottom() <= h as i32)
    }

    pub fn pan_step(&self) -> i32 {
        self.config.pan_step
    }
}
