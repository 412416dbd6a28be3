//! Frame composition.
//!
//! Everything here draws a [`FrameReport`] (plus the session's trail and
//! history) onto a [`Canvas`].  No window is involved, so every panel can be
//! rendered and inspected in tests.

use hand_pose::landmark::{is_fingertip, HAND_CONNECTIONS, SKELETON_CONNECTIONS};
use hand_pose::{CropRect, Finger, FingerStates, GestureHistory, Handedness, Trail};

use crate::canvas::{blend, text_width, Canvas, Viewport};
use crate::detector::VideoFrame;
use crate::layout::{Layout, Rect};
use crate::session::{FrameReport, HandView, Session};

// ════════════════════════════════════════════════════════════════════════════
// Colours
// ════════════════════════════════════════════════════════════════════════════

const VIDEO_BG:      u32 = 0xFF101018;
const SKELETON_BG:   u32 = 0xFF0A0A12;
const SKELETON_GRID: u32 = 0xFF181826;
const TRAIL_BG:      u32 = 0xFF12121C;
const TRAIL_GRID:    u32 = 0xFF1E1E2C;
const INFO_BG:       u32 = 0xFF16213E;
const STATUS_BG:     u32 = 0xFF0F3460;
const PANEL_EDGE:    u32 = 0xFF2A2A40;
const TEXT:          u32 = 0xFFEEEEEE;
const TEXT_DIM:      u32 = 0xFF888899;
const ACCENT:        u32 = 0xFFFFD700;  // gold
const ERROR_BG:      u32 = 0xFF3A0A12;
const ERROR_TEXT:    u32 = 0xFFFF5566;
const TRAIL_START:   u32 = 0xFF00F0FF;
const TRAIL_END:     u32 = 0xFFFF00AA;

const SKELETON_GRID_PX: usize = 15;
const TRAIL_GRID_PX:    usize = 20;

/// Line and joint colours for one hand.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Palette {
    pub line:  u32,
    pub joint: u32,
}

pub fn palette(hand: Handedness) -> Palette {
    match hand {
        Handedness::Left  => Palette { line: 0xFF00F0FF, joint: 0xFF00A8FF },
        Handedness::Right => Palette { line: 0xFFFF00AA, joint: 0xFFFF6600 },
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Entry points
// ════════════════════════════════════════════════════════════════════════════

/// Draw one processed frame.  `image` is the latest video frame, if the
/// source supplies one.
pub fn draw_frame(
    canvas:  &mut Canvas,
    layout:  &Layout,
    session: &Session,
    report:  &FrameReport,
    image:   Option<&VideoFrame>,
) {
    {
        let mut v = canvas.view(layout.main);
        draw_video(&mut v, image, session.crop());
        for hand in &report.hands {
            draw_hand_overlay(&mut v, hand);
        }
    }
    draw_skeleton_panel(&mut canvas.view(layout.skeleton), report);
    draw_trail_panel(&mut canvas.view(layout.trail), session.trail());
    draw_info(&mut canvas.view(layout.info), report, session.history());
    draw_status(&mut canvas.view(layout.status), &report.status, TEXT);
}

/// Terminal error screen shown when the detector source could not start.
pub fn draw_failure(canvas: &mut Canvas, layout: &Layout, reason: &str) {
    canvas.clear(ERROR_BG);
    {
        let mut v = canvas.view(layout.main);
        let (w, h) = (v.width() as i32, v.height() as i32);
        let title_w = text_width("ERROR", 6) as i32;
        v.text("ERROR", (w - title_w) / 2, h / 2 - 30, 6, ERROR_TEXT);
        let reason_w = text_width(reason, 2) as i32;
        v.text(reason, ((w - reason_w) / 2).max(8), h / 2 + 12, 2, TEXT);
    }
    draw_status(&mut canvas.view(layout.status), &format!("ERROR: {reason}"), ERROR_TEXT);
}

// ════════════════════════════════════════════════════════════════════════════
// Camera view
// ════════════════════════════════════════════════════════════════════════════

/// Mirrored, cover-cropped video.  Each surface pixel looks up the source
/// pixel it shows through the crop.
fn draw_video(v: &mut Viewport, image: Option<&VideoFrame>, crop: &CropRect) {
    let Some(image) = image else {
        v.fill(VIDEO_BG);
        return;
    };
    let (w, h) = (v.width(), v.height());
    for py in 0..h {
        let vy = (py as f32 + 0.5) / h as f32;
        for px in 0..w {
            let vx = (px as f32 + 0.5) / w as f32;
            let (sx, sy) = crop.source_at(vx, vy);
            let color = image.sample(sx, sy).unwrap_or(VIDEO_BG);
            v.set_pixel(px as i32, py as i32, color);
        }
    }
}

fn draw_hand_overlay(v: &mut Viewport, hand: &HandView) {
    let pal = palette(hand.observation.handedness);
    let pts = &hand.main;

    for &(a, b) in HAND_CONNECTIONS.iter() {
        if !(pts[a].visible || pts[b].visible) {
            continue;
        }
        let (pa, pb) = ((pts[a].x, pts[a].y), (pts[b].x, pts[b].y));
        v.gradient_line(pa, pb, 9.0, pal.line, pal.line, 0.25);
        v.thick_line(pa, pb, 3.0, pal.line);
    }

    for (i, p) in pts.iter().enumerate() {
        if !p.visible {
            continue;
        }
        if is_fingertip(i) {
            v.glow(p.x, p.y, 12.0, pal.joint, 0.3);
            v.circle(p.x, p.y, 6.0, pal.joint);
        } else {
            v.circle(p.x, p.y, 4.0, pal.line);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Skeleton view
// ════════════════════════════════════════════════════════════════════════════

fn draw_skeleton_panel(v: &mut Viewport, report: &FrameReport) {
    v.fill(SKELETON_BG);
    v.grid(SKELETON_GRID_PX, SKELETON_GRID);

    for hand in &report.hands {
        let pal = palette(hand.observation.handedness);
        let pts = &hand.skeleton;
        for &(a, b) in SKELETON_CONNECTIONS.iter() {
            v.thick_line(pts[a], pts[b], 2.0, pal.line);
        }
        for (i, &(x, y)) in pts.iter().enumerate() {
            let r = if is_fingertip(i) { 5.0 } else { 3.0 };
            v.circle(x, y, r, pal.joint);
        }
    }

    let (w, h) = (v.width() as i32, v.height() as i32);
    v.text("SKELETON", 8, 8, 2, TEXT_DIM);
    let lc = if report.left_active { palette(Handedness::Left).line } else { PANEL_EDGE };
    let rc = if report.right_active { palette(Handedness::Right).line } else { PANEL_EDGE };
    v.text("L", 8, h - 18, 2, lc);
    v.text("R", w - 16, h - 18, 2, rc);
    v.border(0, 0, w, h, PANEL_EDGE);
}

// ════════════════════════════════════════════════════════════════════════════
// Trajectory view
// ════════════════════════════════════════════════════════════════════════════

fn draw_trail_panel(v: &mut Viewport, trail: &Trail) {
    v.fill(TRAIL_BG);
    v.grid(TRAIL_GRID_PX, TRAIL_GRID);

    let n = trail.len().max(2) - 1;
    for (i, (a, b)) in trail.segments().enumerate() {
        let c0 = blend(TRAIL_START, TRAIL_END, i as f32 / n as f32);
        let c1 = blend(TRAIL_START, TRAIL_END, (i + 1) as f32 / n as f32);
        v.gradient_line((a.x, a.y), (b.x, b.y), 2.0 + 3.0 * b.alpha, c0, c1, b.alpha);
    }

    if let Some(head) = trail.head() {
        v.glow(head.x, head.y, 6.0, TRAIL_END, head.alpha.max(0.5));
        v.ring(head.x, head.y, 10.0, 2.0, blend(TRAIL_BG, TRAIL_END, head.alpha));
    }

    let (w, h) = (v.width() as i32, v.height() as i32);
    v.text("TRAJECTORY", 8, 8, 2, TEXT_DIM);
    v.border(0, 0, w, h, PANEL_EDGE);
}

// ════════════════════════════════════════════════════════════════════════════
// Info strip
// ════════════════════════════════════════════════════════════════════════════

const LINE_H: i32 = 14;

fn draw_info(v: &mut Viewport, report: &FrameReport, history: &GestureHistory) {
    v.fill(INFO_BG);
    let cols = Rect::new(0, 0, v.width(), v.height()).columns(4);

    draw_gesture_column(v, cols[0], report);
    draw_finger_column(v, cols[1], report);
    draw_readout_column(v, cols[2], report);
    draw_history_column(v, cols[3], history);

    for c in &cols[1..] {
        v.line(c.x as i32, 6, c.x as i32, c.h as i32 - 6, PANEL_EDGE);
    }
}

fn draw_gesture_column(v: &mut Viewport, col: Rect, report: &FrameReport) {
    let (x, w) = (col.x as i32 + 10, col.w as i32 - 20);
    v.text("GESTURE", x, 8, 2, TEXT_DIM);

    let name = report.gesture_name();
    let colour = report.primary.as_ref().map_or(TEXT_DIM, |p| palette(p.handedness).line);
    let scale = if text_width(name, 3) as i32 <= w { 3 } else { 2 };
    v.text(name, x, 28, scale, colour);

    if let Some(p) = &report.primary {
        draw_pattern_glyph(v, x, 62, p.fingers, colour);
        let hand = format!("{} HAND", p.handedness.as_str());
        v.text(&hand, x + 60, 80, 2, TEXT);
    }

    let pct = report.confidence_pct();
    v.text(&format!("CONFIDENCE {pct}%"), x, 118, 2, TEXT);
    v.fill_rect(x, 136, w, 10, PANEL_EDGE);
    v.fill_rect(x, 136, w * pct.min(100) as i32 / 100, 10, ACCENT);
}

/// Five small bars, one per finger, tall when extended.
fn draw_pattern_glyph(v: &mut Viewport, x: i32, y: i32, fingers: FingerStates, colour: u32) {
    for f in Finger::ALL {
        let h = if fingers.is_extended(f) { 36 } else { 12 };
        let bx = x + f.index() as i32 * 9;
        v.fill_rect(bx, y + 36 - h, 6, h, colour);
    }
}

fn draw_finger_column(v: &mut Viewport, col: Rect, report: &FrameReport) {
    let x0 = col.x as i32 + 10;
    v.text("FINGERS", x0, 8, 2, TEXT_DIM);

    let bars = report.finger_bars().unwrap_or([0.0; 5]);
    let states = report.primary.as_ref().map(|p| p.fingers);
    let slot = (col.w as i32 - 20) / 5;
    let (top, max_h) = (30, col.h as i32 - 70);

    for f in Finger::ALL {
        let bx = x0 + f.index() as i32 * slot;
        let bw = (slot - 10).max(4);
        let bh = (bars[f.index()] * max_h as f32) as i32;
        v.fill_rect(bx, top, bw, max_h, PANEL_EDGE);
        let colour = if states.is_some_and(|s| s.is_extended(f)) { ACCENT } else { TEXT_DIM };
        v.fill_rect(bx, top + max_h - bh, bw, bh, colour);

        let label = &f.name()[..1];
        v.text(label, bx, top + max_h + 6, 2, TEXT);
        if let Some(s) = states {
            v.text(s.status(f), bx, top + max_h + 20, 1, colour);
        }
    }
}

fn draw_readout_column(v: &mut Viewport, col: Rect, report: &FrameReport) {
    let x = col.x as i32 + 10;
    let mut y = 8;
    let mut line = |v: &mut Viewport, text: &str, colour: u32| {
        v.text(text, x, y, 2, colour);
        y += LINE_H;
    };

    match &report.primary {
        Some(p) => {
            line(v, &format!("PALM  X {:.3} Y {:.3}", p.palm.x, p.palm.y), TEXT);
            line(v, &format!("INDEX X {:.3} Y {:.3}", p.index_tip.x, p.index_tip.y), TEXT);
            line(v, &format!("ROLL {:.1} PITCH {:.1}", p.orientation.roll_deg, p.orientation.pitch_deg), TEXT);
        }
        None => {
            line(v, "PALM  X - Y -", TEXT_DIM);
            line(v, "INDEX X - Y -", TEXT_DIM);
            line(v, "ROLL - PITCH -", TEXT_DIM);
        }
    }

    let m = &report.metrics;
    let latency_ms = report.latency.as_secs_f64() * 1000.0;
    line(v, &format!("FPS {}", m.fps), ACCENT);
    line(v, &format!("FRAMES {}", m.total_frames), TEXT);
    line(v, &format!("DETECTION {}%", m.detection_rate), TEXT);
    line(v, &format!("STABILITY {}%", m.stability), TEXT);
    line(v, &format!("ACCURACY {}%", m.accuracy), TEXT);
    line(v, &format!("LATENCY {latency_ms:.1} MS"), TEXT);
}

fn draw_history_column(v: &mut Viewport, col: Rect, history: &GestureHistory) {
    let x = col.x as i32 + 10;
    v.text("HISTORY", x, 8, 2, TEXT_DIM);
    if history.is_empty() {
        v.text("NO GESTURES YET", x, 8 + LINE_H + 4, 2, TEXT_DIM);
        return;
    }
    for (i, entry) in history.entries().enumerate() {
        let y = 8 + (i as i32 + 1) * LINE_H + 4;
        let colour = if i == 0 { ACCENT } else { TEXT };
        let adv = v.text(&entry.time, x, y, 2, TEXT_DIM);
        v.text(&entry.label, x + adv + 8, y, 2, colour);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Status bar
// ════════════════════════════════════════════════════════════════════════════

fn draw_status(v: &mut Viewport, status: &str, colour: u32) {
    v.fill(STATUS_BG);
    let y = (v.height() as i32 - 10) / 2;
    v.text(status, 10, y, 2, colour);
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
