// Temporal smoothing of detected face rectangles.
//
// Stage 1: mean over the last `history` accepted rectangles.
// Stage 2: per field, ignore changes within `fluctuation_threshold` of the previous
// value, otherwise move toward the mean by a fraction (`follow_speed`) of the gap,
// at least one pixel.

use std::collections::VecDeque;

use crate::config::SmoothingConfig;
use crate::rect::Rect;

pub struct Smoother {
    config: SmoothingConfig,
    history: VecDeque<Rect>,
    smoothed: Option<Rect>,
}

impl Smoother {
    pub fn new(config: SmoothingConfig) -> Self {
        Self {
            config,
            history: VecDeque::with_capacity(config.history.max(1)),
            smoothed: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    /// Append an accepted rectangle, evicting the oldest when full.
    pub fn push(&mut self, rect: Rect) {
        if self.history.len() >= self.config.history.max(1) {
            self.history.pop_front();
        }
        self.history.push_back(rect);
    }

    /// Integer mean of each field over the history.
    pub fn mean(&self) -> Option<Rect> {
        let n = self.history.len() as i64;
        if n == 0 {
            return None;
        }
        let mut sum = [0i64; 4];
        for r in &self.history {
            for (s, v) in sum.iter_mut().zip(r.fields()) {
                *s += v as i64;
            }
        }
        Some(Rect::from_fields(sum.map(|s| (s / n) as i32)))
    }

    /// Fold the current mean into the smoothed rectangle and return it.
    /// The first value is taken as-is.
    pub fn update(&mut self) -> Option<Rect> {
        let target = self.mean()?;
        let next = match self.smoothed {
            None => target,
            Some(prev) => {
                let old = prev.fields();
                let new = target.fields();
                Rect::from_fields(std::array::from_fn(|i| follow(old[i], new[i], &self.config)))
            }
        };
        self.smoothed = Some(next);
        Some(next)
    }

    pub fn reset(&mut self) {
        self.history.clear();
        self.smoothed = None;
    }
}

/// One field of the rate-limited filter.
fn follow(old: i32, new: i32, config: &SmoothingConfig) -> i32 {
    let gap = (new - old).abs();
    if gap == 0 || gap as f64 <= old as f64 * config.fluctuation_threshold {
        return old;
    }
    let step = ((gap as f64 * config.follow_speed).round() as i32).clamp(1, gap);
    if new > old { old + step } else { old - step }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn smoother() -> Smoother {
        Smoother::new(SmoothingConfig::default())
    }

    #[test]
    fn first_value_is_accepted_as_is() {
        let mut s = smoother();
        s.push(Rect::new(10, 20, 30, 40));
        assert_eq!(s.update(), Some(Rect::new(10, 20, 30, 40)));
    }

    #[test]
    fn empty_history_yields_nothing() {
        assert_eq!(smoother().update(), None);
    }

    #[test]
    fn same_rect_converges_exactly() {
        let r = Rect::new(120, 200, 96, 110);
        let mut s = smoother();
        let mut last = None;
        for _ in 0..30 {
            s.push(r);
            last = s.update();
        }
        assert_eq!(s.len(), 20);
        assert_eq!(last, Some(r));
    }

    #[test]
    fn history_evicts_oldest() {
        let mut s = smoother();
        s.push(Rect::new(1000, 1000, 1000, 1000));
        for _ in 0..20 {
            s.push(Rect::new(10, 10, 10, 10));
        }
        assert_eq!(s.mean(), Some(Rect::new(10, 10, 10, 10)));
    }

    #[test]
    fn jitter_below_threshold_is_ignored() {
        let mut s = smoother();
        s.push(Rect::new(200, 200, 100, 100));
        s.update();
        // Mean moves to (201, 199, 102, 98): every gap is within 3% of the old value.
        s.push(Rect::new(202, 198, 104, 96));
        assert_eq!(s.update(), Some(Rect::new(200, 200, 100, 100)));
    }

    #[test]
    fn large_jump_is_rate_limited() {
        let v = Rect::new(100, 100, 100, 100);
        let mut s = smoother();
        s.push(v);
        s.update();
        s.push(Rect::new(200, 150, 100, 60));
        let mean = s.mean().unwrap();
        let next = s.update().unwrap();

        for ((n, m), o) in next.fields().iter().zip(mean.fields()).zip(v.fields()) {
            let bound = (((m - o).abs() as f64 * 0.2).round() as i32).max(1);
            assert!((n - o).abs() <= bound, "moved {} > {bound}", (n - o).abs());
        }
        assert_eq!(next, Rect::new(110, 105, 100, 96));
    }

    #[test]
    fn small_gap_still_moves_one_pixel() {
        let cfg = SmoothingConfig { fluctuation_threshold: 0.0, ..SmoothingConfig::default() };
        assert_eq!(follow(50, 52, &cfg), 51);
        assert_eq!(follow(50, 48, &cfg), 49);
        assert_eq!(follow(50, 50, &cfg), 50);
    }
}
