//! Window layout.
//!
//! ```text
//! ┌────────────────────────────────────┬──────────────────┐
//! │                                    │  SKELETON        │
//! │  CAMERA + OVERLAY                  │                  │
//! │  (mirrored, cover-fitted)          ├──────────────────┤
//! │                                    │  TRAJECTORY      │
//! │                                    │                  │
//! ├──────────┬──────────┬──────────────┴─────┬────────────┤
//! │ GESTURE  │ FINGERS  │ COORDS / METRICS   │ HISTORY    │
//! ├──────────┴──────────┴────────────────────┴────────────┤
//! │ status bar                                            │
//! └───────────────────────────────────────────────────────┘
//! ```

use crate::session::SurfaceLayout;

pub const STATUS_H: usize = 20;

/// Pixel rectangle inside the window.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rect {
    pub x: usize,
    pub y: usize,
    pub w: usize,
    pub h: usize,
}

impl Rect {
    pub const fn new(x: usize, y: usize, w: usize, h: usize) -> Self {
        Rect { x, y, w, h }
    }

    /// Split into `n` equal columns (the last one takes the remainder).
    pub fn columns(&self, n: usize) -> Vec<Rect> {
        let n = n.max(1);
        let cw = self.w / n;
        (0..n)
            .map(|i| {
                let w = if i + 1 == n { self.w - cw * (n - 1) } else { cw };
                Rect::new(self.x + i * cw, self.y, w, self.h)
            })
            .collect()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Layout {
    pub width:    usize,
    pub height:   usize,
    pub main:     Rect,
    pub skeleton: Rect,
    pub trail:    Rect,
    pub info:     Rect,
    pub status:   Rect,
}

impl Layout {
    pub fn new(width: usize, height: usize) -> Self {
        let info_h = height / 4;
        let top_h  = height.saturating_sub(info_h + STATUS_H);
        let side_w = width * 3 / 8;
        let main_w = width - side_w;
        let skel_h = top_h / 2;

        Layout {
            width,
            height,
            main:     Rect::new(0, 0, main_w, top_h),
            skeleton: Rect::new(main_w, 0, side_w, skel_h),
            trail:    Rect::new(main_w, skel_h, side_w, top_h - skel_h),
            info:     Rect::new(0, top_h, width, info_h),
            status:   Rect::new(0, top_h + info_h, width, height.saturating_sub(top_h + info_h)),
        }
    }

    /// Sizes of the three drawing surfaces, for the session's mappings.
    pub fn surfaces(&self) -> SurfaceLayout {
        let size = |r: Rect| (r.w as f32, r.h as f32);
        SurfaceLayout {
            main:     size(self.main),
            skeleton: size(self.skeleton),
            trail:    size(self.trail),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_window_split() {
        let l = Layout::new(1280, 720);
        assert_eq!(l.main, Rect::new(0, 0, 800, 520));
        assert_eq!(l.skeleton, Rect::new(800, 0, 480, 260));
        assert_eq!(l.trail, Rect::new(800, 260, 480, 260));
        assert_eq!(l.info, Rect::new(0, 520, 1280, 180));
        assert_eq!(l.status, Rect::new(0, 700, 1280, 20));
    }

    #[test]
    fn panels_cover_window_height() {
        let l = Layout::new(1000, 613);
        assert_eq!(l.main.h + l.info.h + l.status.h, 613);
        assert_eq!(l.skeleton.h + l.trail.h, l.main.h);
        assert_eq!(l.main.w + l.skeleton.w, 1000);
    }

    #[test]
    fn columns_fill_width() {
        let cols = Rect::new(10, 0, 101, 5).columns(4);
        assert_eq!(cols.len(), 4);
        assert_eq!(cols[0], Rect::new(10, 0, 25, 5));
        assert_eq!(cols[3].x + cols[3].w, 111);
    }
}
