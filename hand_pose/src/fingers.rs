//! Finger-state classification.
//!
//! Two heuristics, both inherited as-is:
//!
//! * **Thumb**: extended when its tip is farther from the wrist along x than
//!   its IP joint.  A magnitude comparison, so mirroring does not matter.
//! * **Other fingers**: extended when the tip is above (smaller y than) the
//!   PIP joint.
//!
//! Known limitation: the y test assumes an upright hand.  A sideways or
//! inverted hand is misclassified.  There is no tolerance or hysteresis.

use crate::landmark::{Landmark, FINGER_PIPS, FINGER_TIPS, LANDMARK_COUNT, WRIST};

// ════════════════════════════════════════════════════════════════════════════
// Finger
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Finger {
    Thumb,
    Index,
    Middle,
    Ring,
    Pinky,
}

impl Finger {
    /// All fingers in vector order.
    pub const ALL: [Finger; 5] = [
        Finger::Thumb, Finger::Index, Finger::Middle, Finger::Ring, Finger::Pinky,
    ];

    pub fn index(self) -> usize { self as usize }

    pub fn name(self) -> &'static str {
        match self {
            Finger::Thumb  => "thumb",
            Finger::Index  => "index",
            Finger::Middle => "middle",
            Finger::Ring   => "ring",
            Finger::Pinky  => "pinky",
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerStates
// ════════════════════════════════════════════════════════════════════════════

/// Bar height for an extended finger in the finger display.
pub const BAR_EXTENDED:  f32 = 1.0;
/// Bar height for a curled finger.
pub const BAR_CURLED:    f32 = 0.2;

/// Extended / not-extended for each finger, thumb first.  Always 5 entries.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct FingerStates(pub [bool; 5]);

impl FingerStates {
    pub const NONE: FingerStates = FingerStates([false; 5]);
    pub const ALL:  FingerStates = FingerStates([true; 5]);

    /// Build from 0/1 bits (any non-zero counts as extended).
    pub const fn from_bits(bits: [u8; 5]) -> Self {
        FingerStates([bits[0] != 0, bits[1] != 0, bits[2] != 0, bits[3] != 0, bits[4] != 0])
    }

    pub fn bits(&self) -> [u8; 5] {
        self.0.map(u8::from)
    }

    pub fn is_extended(&self, finger: Finger) -> bool {
        self.0[finger.index()]
    }

    pub fn extended_count(&self) -> usize {
        self.0.iter().filter(|&&e| e).count()
    }

    /// Display bar height (0.0–1.0) for `finger`.
    pub fn bar_height(&self, finger: Finger) -> f32 {
        if self.is_extended(finger) { BAR_EXTENDED } else { BAR_CURLED }
    }

    pub fn status(&self, finger: Finger) -> &'static str {
        if self.is_extended(finger) { "UP" } else { "DOWN" }
    }

    /// Every vector of length 5, in binary order.
    pub fn all_vectors() -> impl Iterator<Item = FingerStates> {
        (0u8..32).map(|n| {
            FingerStates::from_bits([n >> 4 & 1, n >> 3 & 1, n >> 2 & 1, n >> 1 & 1, n & 1])
        })
    }
}

impl std::fmt::Display for FingerStates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b = self.bits();
        write!(f, "[{},{},{},{},{}]", b[0], b[1], b[2], b[3], b[4])
    }
}

// ════════════════════════════════════════════════════════════════════════════
// classify
// ════════════════════════════════════════════════════════════════════════════

/// Classify each finger of one hand as extended or not.
pub fn classify(landmarks: &[Landmark; LANDMARK_COUNT]) -> FingerStates {
    let mut states = [false; 5];
    for finger in Finger::ALL {
        states[finger.index()] = is_extended(landmarks, finger);
    }
    FingerStates(states)
}

fn is_extended(landmarks: &[Landmark; LANDMARK_COUNT], finger: Finger) -> bool {
    let tip = landmarks[FINGER_TIPS[finger.index()]];
    let pip = landmarks[FINGER_PIPS[finger.index()]];

    match finger {
        Finger::Thumb => {
            let wrist = landmarks[WRIST];
            (tip.x - wrist.x).abs() > (pip.x - wrist.x).abs()
        }
        _ => tip.y < pip.y,
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
