//! Motion trail of the tracked fingertip.
//!
//! A bounded polyline in surface space.  Points are only ever appended at
//! the back and evicted from the front, so chronological order is preserved.
//! While a hand is visible the alphas form a ramp from old (dim) to new
//! (bright); while no hand is visible every alpha decays geometrically until
//! the point drops out.

use std::time::Instant;

/// Maximum number of points kept.
pub const TRAIL_LENGTH: usize = 100;
/// Per-frame alpha multiplier while no hand is detected.
pub const TRAIL_DECAY:  f32   = 0.95;
/// Points whose alpha decays to this value or below are dropped.
pub const ALPHA_FLOOR:  f32   = 0.01;
/// Lowest alpha in the visible-hand ramp.
pub const MIN_ALPHA:    f32   = 0.1;

/// One sample of the trail.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TrailPoint {
    pub x:          f32,
    pub y:          f32,
    /// Opacity in (0, 1].
    pub alpha:      f32,
    pub created_at: Instant,
}

/// Bounded, time-decaying polyline.
#[derive(Clone, Debug)]
pub struct Trail {
    points:   Vec<TrailPoint>,
    capacity: usize,
}

impl Default for Trail {
    fn default() -> Self { Trail::new() }
}

impl Trail {
    pub fn new() -> Self {
        Trail::with_capacity(TRAIL_LENGTH)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Trail { points: Vec::with_capacity(capacity + 1), capacity: capacity.max(1) }
    }

    /// Advance one frame.  `Some((x, y))` is the tracked point in surface
    /// pixels; `None` means no hand was detected.
    pub fn update(&mut self, point: Option<(f32, f32)>) -> &[TrailPoint] {
        self.update_at(point, Instant::now())
    }

    pub fn update_at(&mut self, point: Option<(f32, f32)>, now: Instant) -> &[TrailPoint] {
        match point {
            Some((x, y)) => self.push(x, y, now),
            None         => self.fade(),
        }
        &self.points
    }

    fn push(&mut self, x: f32, y: f32, now: Instant) {
        self.points.push(TrailPoint { x, y, alpha: 1.0, created_at: now });
        if self.points.len() > self.capacity {
            let excess = self.points.len() - self.capacity;
            self.points.drain(..excess);
        }
        let len = self.points.len() as f32;
        for (i, p) in self.points.iter_mut().enumerate() {
            p.alpha = (i as f32 / len).max(MIN_ALPHA);
        }
    }

    fn fade(&mut self) {
        for p in self.points.iter_mut() {
            p.alpha *= TRAIL_DECAY;
        }
        self.points.retain(|p| p.alpha > ALPHA_FLOOR);
    }

    pub fn points(&self) -> &[TrailPoint] { &self.points }

    pub fn len(&self) -> usize { self.points.len() }

    pub fn is_empty(&self) -> bool { self.points.is_empty() }

    pub fn capacity(&self) -> usize { self.capacity }

    /// Most recent point.
    pub fn head(&self) -> Option<&TrailPoint> { self.points.last() }

    /// Consecutive (older, newer) pairs, oldest first.
    pub fn segments(&self) -> impl Iterator<Item = (&TrailPoint, &TrailPoint)> {
        self.points.windows(2).map(|w| (&w[0], &w[1]))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn trail_capacity() {
        let mut t = Trail::new();
        for i in 0..250 {
            t.update(Some((i as f32, 0.0)));
            assert!(t.len() <= TRAIL_LENGTH);
        }
        assert_eq!(t.len(), TRAIL_LENGTH);
        assert_eq!(t.points()[0].x, 150.0);
        assert_eq!(t.head().unwrap().x, 249.0);
    }

    #[test]
    fn alpha_ramp() {
        let mut t = Trail::new();
        for i in 0..4 { t.update(Some((i as f32, i as f32))); }
        let alphas: Vec<f32> = t.points().iter().map(|p| p.alpha).collect();
        assert_eq!(alphas, vec![0.1, 0.25, 0.5, 0.75]);
    }

    #[test]
    fn single_point_gets_floor_alpha() {
        let mut t = Trail::new();
        t.update(Some((3.0, 4.0)));
        assert_eq!(t.points()[0].alpha, MIN_ALPHA);
    }

    #[test]
    fn fade_never_increases_alpha() {
        let mut t = Trail::new();
        for i in 0..30 { t.update(Some((i as f32, 0.0))); }
        for _ in 0..200 {
            let before: Vec<(f32, f32)> = t.points().iter().map(|p| (p.x, p.alpha)).collect();
            t.update(None);
            for p in t.points() {
                let prior = before.iter().find(|(x, _)| *x == p.x).unwrap().1;
                assert!(p.alpha <= prior);
            }
        }
        assert!(t.is_empty());
    }

    #[test]
    fn fade_on_empty_trail() {
        let mut t = Trail::new();
        assert!(t.update(None).is_empty());
    }

    #[test]
    fn order_preserved() {
        let mut t = Trail::with_capacity(5);
        let start = Instant::now();
        for i in 0..12u64 {
            let now = start + Duration::from_millis(i * 16);
            if i % 3 == 2 {
                t.update_at(None, now);
            } else {
                t.update_at(Some((i as f32, 0.0)), now);
            }
        }
        let xs: Vec<f32> = t.points().iter().map(|p| p.x).collect();
        assert!(xs.windows(2).all(|w| w[0] < w[1]));
        assert!(t.points().windows(2).all(|w| w[0].created_at <= w[1].created_at));
    }

    #[test]
    fn segments_pair_neighbours() {
        let mut t = Trail::new();
        for i in 0..3 { t.update(Some((i as f32, 0.0))); }
        let segs: Vec<(f32, f32)> = t.segments().map(|(a, b)| (a.x, b.x)).collect();
        assert_eq!(segs, vec![(0.0, 1.0), (1.0, 2.0)]);
    }
}
