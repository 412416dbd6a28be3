//! Coordinate mapping between detector space and display surfaces.
//!
//! Detector coordinates are normalized to the full, un-mirrored video frame.
//! The camera view shows that frame mirrored and "cover"-fitted: scaled to
//! fill the surface, with the overflowing axis cropped symmetrically.  A
//! [`CropRect`] describes the part of the frame that survives the crop.

use crate::landmark::{Landmark, LANDMARK_COUNT, MIDDLE_MCP, WRIST};

// ════════════════════════════════════════════════════════════════════════════
// CropRect
// ════════════════════════════════════════════════════════════════════════════

/// Normalized sub-rectangle of the (mirrored) source frame that is visible
/// after a cover fit.  `w` and `h` are never zero.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CropRect {
    pub x0: f32,
    pub y0: f32,
    pub w:  f32,
    pub h:  f32,
}

impl CropRect {
    /// No crop: the whole frame is visible.
    pub const FULL: CropRect = CropRect { x0: 0.0, y0: 0.0, w: 1.0, h: 1.0 };

    pub fn is_full(&self) -> bool {
        *self == CropRect::FULL
    }

    /// Inverse of [`map_to_surface`]: the un-mirrored, full-frame normalized
    /// source coordinate shown at crop-relative position (`vx`, `vy`).
    pub fn source_at(&self, vx: f32, vy: f32) -> (f32, f32) {
        let mx = self.x0 + vx * self.w;
        (1.0 - mx, self.y0 + vy * self.h)
    }
}

impl Default for CropRect {
    fn default() -> Self { CropRect::FULL }
}

// ════════════════════════════════════════════════════════════════════════════
// map_to_surface
// ════════════════════════════════════════════════════════════════════════════

/// A point on a drawing surface, in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfacePoint {
    pub x:       f32,
    pub y:       f32,
    /// False when the point falls in the cropped-away part of the frame.
    /// The point is still returned so callers can decide what to skip.
    pub visible: bool,
}

/// Mirror `point` horizontally, remap it into `crop`-relative space and scale
/// it to a `surface_w` × `surface_h` surface.
pub fn map_to_surface(
    point:     Landmark,
    surface_w: f32,
    surface_h: f32,
    crop:      &CropRect,
) -> SurfacePoint {
    let mx = 1.0 - point.x;
    let vx = (mx - crop.x0) / crop.w;
    let vy = (point.y - crop.y0) / crop.h;
    SurfacePoint {
        x:       vx * surface_w,
        y:       vy * surface_h,
        visible: (0.0..=1.0).contains(&vx) && (0.0..=1.0).contains(&vy),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CoverFit (computed once per resize)
// ════════════════════════════════════════════════════════════════════════════

/// How a source frame is scaled and cropped to fill a target surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CoverFit {
    /// Size of the scaled frame in target pixels (≥ the target on both axes).
    pub draw_width:  f32,
    pub draw_height: f32,
    /// Top-left of the scaled frame relative to the target (≤ 0).
    pub offset_x:    f32,
    pub offset_y:    f32,
    pub crop:        CropRect,
}

impl CoverFit {
    /// Fit a `source_w` × `source_h` frame onto a `target_w` × `target_h`
    /// surface.  A proportionally wider target fits width and crops top and
    /// bottom; otherwise height is fitted and the sides are cropped.
    pub fn new(source_w: f32, source_h: f32, target_w: f32, target_h: f32) -> Self {
        let positive = |v: f32| v.is_finite() && v > 0.0;
        if !(positive(source_w) && positive(source_h) && positive(target_w) && positive(target_h)) {
            return CoverFit::identity(target_w.max(0.0), target_h.max(0.0));
        }

        let source_aspect = source_w / source_h;
        let target_aspect = target_w / target_h;

        if target_aspect > source_aspect {
            let draw_height = target_w / source_aspect;
            let visible     = target_h / draw_height;
            CoverFit {
                draw_width:  target_w,
                draw_height,
                offset_x:    0.0,
                offset_y:    (target_h - draw_height) / 2.0,
                crop: CropRect { x0: 0.0, y0: (1.0 - visible) / 2.0, w: 1.0, h: visible },
            }
        } else {
            let draw_width = target_h * source_aspect;
            let visible    = target_w / draw_width;
            CoverFit {
                draw_width,
                draw_height: target_h,
                offset_x:    (target_w - draw_width) / 2.0,
                offset_y:    0.0,
                crop: CropRect { x0: (1.0 - visible) / 2.0, y0: 0.0, w: visible, h: 1.0 },
            }
        }
    }

    fn identity(target_w: f32, target_h: f32) -> Self {
        CoverFit {
            draw_width:  target_w,
            draw_height: target_h,
            offset_x:    0.0,
            offset_y:    0.0,
            crop:        CropRect::FULL,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SkeletonFit
// ════════════════════════════════════════════════════════════════════════════

/// Places a hand inside a square occupying 70% of the shorter side of the
/// skeleton surface, centered and mirrored.  No crop is applied.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SkeletonFit {
    pub scale:    f32,
    pub offset_x: f32,
    pub offset_y: f32,
}

impl SkeletonFit {
    pub fn new(surface_w: f32, surface_h: f32) -> Self {
        let scale = surface_w.min(surface_h) * 0.7;
        SkeletonFit {
            scale,
            offset_x: (surface_w - scale) / 2.0,
            offset_y: (surface_h - scale) / 2.0,
        }
    }

    pub fn place(&self, l: Landmark) -> (f32, f32) {
        ((1.0 - l.x) * self.scale + self.offset_x, l.y * self.scale + self.offset_y)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandOrientation
// ════════════════════════════════════════════════════════════════════════════

/// Coarse hand orientation from the wrist → middle-MCP vector, in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HandOrientation {
    /// Rotation in the image plane; 0 = fingers pointing up.
    pub roll_deg:  f32,
    /// Tilt toward (+) or away from (−) the camera.
    pub pitch_deg: f32,
}

impl HandOrientation {
    pub fn from_landmarks(landmarks: &[Landmark; LANDMARK_COUNT]) -> Self {
        let wrist = landmarks[WRIST];
        let mcp   = landmarks[MIDDLE_MCP];
        let dx = mcp.x - wrist.x;
        let dy = mcp.y - wrist.y;
        let dz = mcp.z - wrist.z;
        HandOrientation {
            roll_deg:  dx.atan2(-dy).to_degrees(),
            pitch_deg: dz.atan2((dx * dx + dy * dy).sqrt()).to_degrees(),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
