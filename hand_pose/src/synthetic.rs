//! Synthetic upright hand poses.
//!
//! Used by the simulated detector and by tests: [`hand`] lays out 21
//! landmarks so that [`crate::classify`] returns exactly the requested
//! pattern.

use crate::fingers::{Finger, FingerStates};
use crate::landmark::{Handedness, Landmark, LANDMARK_COUNT};

/// Lateral offset of each non-thumb finger's base from the wrist.
const FINGER_BASE_X: [f32; 4] = [0.03, 0.0, -0.03, -0.06];

/// Joint offsets above the wrist (MCP, PIP, DIP, tip).
const EXTENDED_Y: [f32; 4] = [-0.12, -0.17, -0.21, -0.25];
const CURLED_Y:   [f32; 4] = [-0.12, -0.17, -0.14, -0.12];

/// Thumb joint offsets (CMC, MCP, IP, tip) as (x, y); x points away from the palm.
const THUMB_EXTENDED: [(f32, f32); 4] = [(0.04, -0.03), (0.07, -0.06), (0.10, -0.08), (0.13, -0.10)];
const THUMB_CURLED:   [(f32, f32); 4] = [(0.04, -0.03), (0.06, -0.06), (0.07, -0.09), (0.03, -0.10)];

/// Build an upright hand whose wrist sits at (`wrist_x`, `wrist_y`) in
/// normalized frame space.  `label` is the camera-relative detector label; it
/// only decides which side the thumb points to.  `scale` = 1.0 spans roughly a
/// quarter of the frame height.
pub fn hand(
    pattern: FingerStates,
    label:   Handedness,
    wrist_x: f32,
    wrist_y: f32,
    scale:   f32,
) -> [Landmark; LANDMARK_COUNT] {
    let side = match label {
        Handedness::Left  => 1.0,
        Handedness::Right => -1.0,
    };
    let at = |dx: f32, dy: f32, z: f32| {
        Landmark::new(wrist_x + dx * side * scale, wrist_y + dy * scale, z * scale)
    };

    let mut lm = [Landmark::new(wrist_x, wrist_y, 0.0); LANDMARK_COUNT];

    let thumb = if pattern.is_extended(Finger::Thumb) { &THUMB_EXTENDED } else { &THUMB_CURLED };
    for (j, &(dx, dy)) in thumb.iter().enumerate() {
        lm[1 + j] = at(dx, dy, -0.01 * (j + 1) as f32);
    }

    for (f, finger) in Finger::ALL[1..].iter().enumerate() {
        let ys = if pattern.is_extended(*finger) { &EXTENDED_Y } else { &CURLED_Y };
        for (j, &dy) in ys.iter().enumerate() {
            lm[5 + f * 4 + j] = at(FINGER_BASE_X[f], dy, -0.01 * (j + 1) as f32);
        }
    }

    lm
}
