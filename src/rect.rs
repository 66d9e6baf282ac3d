// Integer rectangle used for every spatial computation in the pipeline.
// All operations return a new value; nothing is mutated in place.

/// Axis-aligned rectangle in frame pixel coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub top: i32,
    pub left: i32,
    pub width: i32,  // always >= 0
    pub height: i32, // always >= 0
}

impl Rect {
    /// Build a rectangle; negative sizes collapse to zero.
    pub const fn new(top: i32, left: i32, width: i32, height: i32) -> Self {
        Self {
            top,
            left,
            width: if width < 0 { 0 } else { width },
            height: if height < 0 { 0 } else { height },
        }
    }

    /// The whole frame as a rectangle.
    pub fn full_frame(width: u32, height: u32) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.top + self.height
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width as i64 * self.height as i64
    }

    /// Center as (x, y).
    #[inline]
    pub fn center(&self) -> (i32, i32) {
        (self.left + self.width / 2, self.top + self.height / 2)
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Grow (or shrink, when negative) by `amount` on every side.
    pub fn pad(&self, amount: i32) -> Self {
        Self::new(
            self.top - amount,
            self.left - amount,
            self.width + 2 * amount,
            self.height + 2 * amount,
        )
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self { top: self.top + dy, left: self.left + dx, ..*self }
    }

    /// Multiply every field by `factor`, rounding to the nearest pixel.
    pub fn scale(&self, factor: f64) -> Self {
        let s = |v: i32| (v as f64 * factor).round() as i32;
        Self::new(s(self.top), s(self.left), s(self.width), s(self.height))
    }

    /// Keep top/left non-negative and the size no larger than the frame.
    pub fn clamp_to(&self, frame_width: u32, frame_height: u32) -> Self {
        Self::new(
            self.top.max(0),
            self.left.max(0),
            self.width.min(frame_width as i32),
            self.height.min(frame_height as i32),
        )
    }

    /// Intersection over union, 0.0 when the rectangles do not overlap.
    pub fn iou(&self, other: &Rect) -> f32 {
        let ix = (self.right().min(other.right()) - self.left.max(other.left)).max(0) as i64;
        let iy = (self.bottom().min(other.bottom()) - self.top.max(other.top)).max(0) as i64;
        let inter = ix * iy;
        if inter == 0 {
            return 0.0;
        }
        let union = self.area() + other.area() - inter;
        inter as f32 / union as f32
    }

    /// Fields in a fixed order (top, left, width, height) for per-field filters.
    pub fn fields(&self) -> [i32; 4] {
        [self.top, self.left, self.width, self.height]
    }

    pub fn from_fields([top, left, width, height]: [i32; 4]) -> Self {
        Self::new(top, left, width, height)
    }
}
