//! Classical Viola–Jones face detector.
//!
//! Works on the grayscale frame through an integral image. A cascade is a list of
//! stages; each stage sums the votes of its weak classifiers and rejects the
//! window when the total falls below the stage threshold. Surviving windows from
//! all scales are grouped, and groups with too few members are dropped.
//!
//! Cascades are described in JSON:
//!
//! ```json
//! { "window": [24, 24],
//!   "stages": [ { "threshold": 0.0,
//!                 "classifiers": [ { "features": [ { "rect": [0, 0, 12, 24], "weight": -1.0 },
//!                                                  { "rect": [12, 0, 12, 24], "weight": 1.0 } ],
//!                                    "threshold": 0.5, "left": -1.0, "right": 1.0 } ] } ] }
//! ```
//!
//! Feature rectangles are `[x, y, width, height]` in base-window pixels.

use std::path::Path;

use image::RgbImage;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::rect::Rect;
use crate::vision::{IntegralImage, grayscale};

#[derive(Clone, Debug, Deserialize)]
pub struct Feature {
    pub rect: [i32; 4],
    pub weight: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct WeakClassifier {
    pub features: Vec<Feature>,
    /// Compared against the variance-normalised feature response.
    pub threshold: f64,
    /// Vote when the response is below `threshold`.
    pub left: f64,
    /// Vote otherwise.
    pub right: f64,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Stage {
    pub threshold: f64,
    pub classifiers: Vec<WeakClassifier>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Cascade {
    /// Base window as (width, height).
    pub window: (u32, u32),
    pub stages: Vec<Stage>,
}

impl Cascade {
    pub fn from_json(text: &str) -> Result<Self> {
        let cascade: Cascade =
            serde_json::from_str(text).map_err(|e| Error::Model(format!("cascade: {e}")))?;
        if cascade.window.0 == 0 || cascade.window.1 == 0 {
            return Err(Error::Model("cascade: window must be non-empty".into()));
        }
        if cascade.stages.is_empty() {
            return Err(Error::Model("cascade: no stages".into()));
        }
        let (bw, bh) = (cascade.window.0 as i64, cascade.window.1 as i64);
        let features = cascade.stages.iter().flat_map(|s| &s.classifiers).flat_map(|c| &c.features);
        for f in features {
            let [x, y, w, h] = f.rect.map(i64::from);
            if x < 0 || y < 0 || w <= 0 || h <= 0 || x + w > bw || y + h > bh {
                return Err(Error::Model(format!(
                    "cascade: feature {:?} outside the {bw}x{bh} window",
                    f.rect
                )));
            }
        }
        Ok(cascade)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    /// Run every stage on the window at (`x`, `y`) scaled by `scale`.
    fn accepts(&self, ii: &IntegralImage, x: i32, y: i32, scale: f64, window: Rect) -> bool {
        let norm = window.area() as f64 * ii.std_dev(window);

        self.stages.iter().all(|stage| {
            let votes: f64 = stage
                .classifiers
                .iter()
                .map(|weak| {
                    let response: f64 = weak
                        .features
                        .iter()
                        .map(|f| {
                            let r = Rect::new(f.rect[1], f.rect[0], f.rect[2], f.rect[3])
                                .scale(scale)
                                .translate(x, y);
                            f.weight * ii.box_sum(r) as f64
                        })
                        .sum();
                    if response / norm < weak.threshold { weak.left } else { weak.right }
                })
                .sum();
            votes >= stage.threshold
        })
    }
}

pub struct CascadeDetector {
    cascade: Cascade,
    /// Window growth between scan passes.
    pub scale_factor: f64,
    /// Hits a group needs to count as a face.
    pub min_neighbors: usize,
    /// Smallest face side considered, in pixels. 0 means the base window.
    pub min_size: u32,
}

impl CascadeDetector {
    pub fn new(cascade: Cascade) -> Self {
        Self { cascade, scale_factor: 1.1, min_neighbors: 3, min_size: 0 }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(Self::new(Cascade::load(path)?))
    }

    /// All grouped detections in frame coordinates.
    pub fn detect(&self, frame: &RgbImage) -> Vec<Rect> {
        let gray = grayscale(frame);
        let ii = IntegralImage::new(&gray);
        let hits = self.scan(&ii);
        group(&hits, self.min_neighbors)
    }

    fn scan(&self, ii: &IntegralImage) -> Vec<Rect> {
        let (bw, bh) = self.cascade.window;
        let (iw, ih) = (ii.width() as f64, ii.height() as f64);
        let mut hits = Vec::new();

        let mut scale = (self.min_size as f64 / bw.min(bh) as f64).max(1.0);
        loop {
            let ww = (bw as f64 * scale).round() as i32;
            let wh = (bh as f64 * scale).round() as i32;
            if ww as f64 > iw || wh as f64 > ih {
                break;
            }
            // Scaled feature rects may round one pixel past the window; keep a margin.
            let margin = scale.ceil() as i32;
            let step = ((2.0 * scale).round() as i32).max(1);

            let mut y = 0;
            while y + wh + margin <= ih as i32 {
                let mut x = 0;
                while x + ww + margin <= iw as i32 {
                    let window = Rect::new(y, x, ww, wh);
                    if self.cascade.accepts(ii, x, y, scale, window) {
                        hits.push(window);
                    }
                    x += step;
                }
                y += step;
            }
            scale *= self.scale_factor;
        }
        hits
    }
}

/// Relative tolerance for two hits to count as the same object.
const GROUP_EPS: f64 = 0.2;

/// Hits are alike when every edge lies within a tolerance proportional to the
/// smaller of the two sizes, so windows of clearly different scale never match.
fn similar(a: &Rect, b: &Rect) -> bool {
    let delta = GROUP_EPS * 0.5 * (a.width.min(b.width) + a.height.min(b.height)) as f64;
    let close = |p: i32, q: i32| ((p - q).abs() as f64) <= delta;
    close(a.left, b.left) && close(a.top, b.top) && close(a.right(), b.right()) && close(a.bottom(), b.bottom())
}

/// Union-find root with path halving.
fn root(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Partition hits into classes of pairwise-chained similar windows, average each
/// class, drop classes with fewer than `min_neighbors` hits, then drop small
/// groups sitting inside a better-supported larger one.
fn group(hits: &[Rect], min_neighbors: usize) -> Vec<Rect> {
    let mut parent: Vec<usize> = (0..hits.len()).collect();
    for i in 0..hits.len() {
        for j in (i + 1)..hits.len() {
            if similar(&hits[i], &hits[j]) {
                let (ri, rj) = (root(&mut parent, i), root(&mut parent, j));
                if ri != rj {
                    parent[rj] = ri;
                }
            }
        }
    }

    // Classes keyed by root, in order of first appearance.
    let mut classes: Vec<(usize, [i64; 4], usize)> = Vec::new();
    for (i, hit) in hits.iter().enumerate() {
        let r = root(&mut parent, i);
        let fields = hit.fields().map(i64::from);
        match classes.iter_mut().find(|(key, _, _)| *key == r) {
            Some((_, sum, count)) => {
                for (s, v) in sum.iter_mut().zip(fields) {
                    *s += v;
                }
                *count += 1;
            }
            None => classes.push((r, fields, 1)),
        }
    }

    let groups: Vec<(Rect, usize)> = classes
        .into_iter()
        .filter(|(_, _, count)| *count >= min_neighbors)
        .map(|(_, sum, count)| {
            let n = count as f64;
            (Rect::from_fields(sum.map(|s| (s as f64 / n).round() as i32)), count)
        })
        .collect();

    groups
        .iter()
        .enumerate()
        .filter(|&(i, (inner, n_inner))| {
            !groups.iter().enumerate().any(|(j, (outer, n_outer))| {
                if i == j {
                    return false;
                }
                let dx = (outer.width as f64 * GROUP_EPS).round() as i32;
                let dy = (outer.height as f64 * GROUP_EPS).round() as i32;
                let inside = inner.left >= outer.left - dx
                    && inner.top >= outer.top - dy
                    && inner.right() <= outer.right() + dx
                    && inner.bottom() <= outer.bottom() + dy;
                inside && inner.area() < outer.area() && (*n_outer > (*n_inner).max(3) || *n_inner < 3)
            })
        })
        .map(|(_, (r, _))| *r)
        .collect()
}
