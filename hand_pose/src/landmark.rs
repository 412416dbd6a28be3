//! Landmark data model and the detector boundary.
//!
//! The detector reports handedness from the camera's point of view.  The
//! display is mirrored, so [`HandObservation::from_detector`] flips the label
//! exactly once; nothing downstream of it may flip again.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// Landmark indices
// ════════════════════════════════════════════════════════════════════════════

/// Number of landmarks per detected hand.
pub const LANDMARK_COUNT: usize = 21;

pub const WRIST:      usize = 0;
pub const THUMB_CMC:  usize = 1;
pub const THUMB_MCP:  usize = 2;
pub const THUMB_IP:   usize = 3;
pub const THUMB_TIP:  usize = 4;
pub const INDEX_MCP:  usize = 5;
pub const INDEX_PIP:  usize = 6;
pub const INDEX_DIP:  usize = 7;
pub const INDEX_TIP:  usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP:   usize = 13;
pub const RING_PIP:   usize = 14;
pub const RING_DIP:   usize = 15;
pub const RING_TIP:   usize = 16;
pub const PINKY_MCP:  usize = 17;
pub const PINKY_PIP:  usize = 18;
pub const PINKY_DIP:  usize = 19;
pub const PINKY_TIP:  usize = 20;

/// Fingertips, thumb first.
pub const FINGER_TIPS: [usize; 5] = [THUMB_TIP, INDEX_TIP, MIDDLE_TIP, RING_TIP, PINKY_TIP];
/// The joint each tip is compared against (IP for the thumb, PIP otherwise).
pub const FINGER_PIPS: [usize; 5] = [THUMB_IP, INDEX_PIP, MIDDLE_PIP, RING_PIP, PINKY_PIP];
pub const FINGER_MCPS: [usize; 5] = [THUMB_MCP, INDEX_MCP, MIDDLE_MCP, RING_MCP, PINKY_MCP];

/// Bone topology reported by the detector, drawn on the camera overlay.
pub const HAND_CONNECTIONS: [(usize, usize); 21] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (5, 9), (9, 10), (10, 11), (11, 12),
    (9, 13), (13, 14), (14, 15), (15, 16),
    (13, 17), (0, 17), (17, 18), (18, 19), (19, 20),
];

/// Topology for the isolated skeleton view: every finger rooted at the wrist,
/// plus the knuckle line.
pub const SKELETON_CONNECTIONS: [(usize, usize); 23] = [
    (0, 1), (1, 2), (2, 3), (3, 4),
    (0, 5), (5, 6), (6, 7), (7, 8),
    (0, 9), (9, 10), (10, 11), (11, 12),
    (0, 13), (13, 14), (14, 15), (15, 16),
    (0, 17), (17, 18), (18, 19), (19, 20),
    (5, 9), (9, 13), (13, 17),
];

pub fn is_fingertip(index: usize) -> bool {
    FINGER_TIPS.contains(&index)
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One detector landmark.  `x`/`y` are normalized to the full video frame
/// (0.0–1.0, y down); `z` is depth relative to the wrist.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Handedness
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handedness {
    Left,
    Right,
}

impl Handedness {
    /// Parse a detector label ("Left" / "Right", any case).
    pub fn from_label(label: &str) -> Result<Self, PoseError> {
        match label.trim().to_ascii_lowercase().as_str() {
            "left"  => Ok(Handedness::Left),
            "right" => Ok(Handedness::Right),
            _       => Err(PoseError::UnknownHandedness(label.to_string())),
        }
    }

    /// The other hand.
    pub fn mirrored(self) -> Self {
        match self {
            Handedness::Left  => Handedness::Right,
            Handedness::Right => Handedness::Left,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Handedness::Left  => "Left",
            Handedness::Right => "Right",
        }
    }

    pub fn short(self) -> &'static str {
        match self {
            Handedness::Left  => "L",
            Handedness::Right => "R",
        }
    }
}

impl std::fmt::Display for Handedness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

/// Reasons a detector hand is rejected at the boundary.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PoseError {
    #[error("expected {expected} landmarks, found {found}")]
    LandmarkCount { expected: usize, found: usize },

    #[error("unknown handedness label {0:?}")]
    UnknownHandedness(String),

    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

// ════════════════════════════════════════════════════════════════════════════
// DetectorHand
// ════════════════════════════════════════════════════════════════════════════

fn full_score() -> f32 { 1.0 }

/// Raw per-hand detector output.  Handedness is still camera-relative.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectorHand {
    pub landmarks: Vec<Landmark>,
    #[serde(alias = "handedness")]
    pub label:     String,
    #[serde(default = "full_score")]
    pub score:     f32,
}

// ════════════════════════════════════════════════════════════════════════════
// HandObservation
// ════════════════════════════════════════════════════════════════════════════

/// A validated hand with display-relative handedness.
#[derive(Clone, Debug, PartialEq)]
pub struct HandObservation {
    pub landmarks:  [Landmark; LANDMARK_COUNT],
    pub handedness: Handedness,
    /// Detector score clamped to 0.0–1.0.
    pub confidence: f32,
}

impl HandObservation {
    /// Validate a detector hand and flip its handedness for the mirrored view.
    pub fn from_detector(hand: &DetectorHand) -> Result<Self, PoseError> {
        let landmarks: [Landmark; LANDMARK_COUNT] = hand.landmarks
            .as_slice()
            .try_into()
            .map_err(|_| PoseError::LandmarkCount {
                expected: LANDMARK_COUNT,
                found:    hand.landmarks.len(),
            })?;

        if let Some(index) = landmarks.iter().position(|l| !l.is_finite()) {
            return Err(PoseError::NonFinite { index });
        }

        let handedness = Handedness::from_label(&hand.label)?.mirrored();
        let confidence = if hand.score.is_finite() { hand.score.clamp(0.0, 1.0) } else { 0.0 };

        Ok(HandObservation { landmarks, handedness, confidence })
    }

    pub fn wrist(&self) -> Landmark { self.landmarks[WRIST] }

    /// Palm centre, taken as the middle-finger MCP.
    pub fn palm(&self) -> Landmark { self.landmarks[MIDDLE_MCP] }

    pub fn index_tip(&self) -> Landmark { self.landmarks[INDEX_TIP] }

    /// Confidence as a rounded percentage.
    pub fn confidence_pct(&self) -> u32 {
        (self.confidence * 100.0).round() as u32
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(label: &str, count: usize) -> DetectorHand {
        DetectorHand {
            landmarks: vec![Landmark::new(0.5, 0.5, 0.0); count],
            label:     label.to_string(),
            score:     0.93,
        }
    }

    #[test]
    fn handedness_inverted_once() {
        let left = HandObservation::from_detector(&raw("Left", 21)).unwrap();
        assert_eq!(left.handedness, Handedness::Right);
        let right = HandObservation::from_detector(&raw("Right", 21)).unwrap();
        assert_eq!(right.handedness, Handedness::Left);
    }

    #[test]
    fn wrong_landmark_count_rejected() {
        let err = HandObservation::from_detector(&raw("Left", 20)).unwrap_err();
        assert_eq!(err, PoseError::LandmarkCount { expected: 21, found: 20 });
    }

    #[test]
    fn unknown_label_rejected() {
        let err = HandObservation::from_detector(&raw("Both", 21)).unwrap_err();
        assert!(matches!(err, PoseError::UnknownHandedness(_)));
    }

    #[test]
    fn non_finite_rejected() {
        let mut hand = raw("Right", 21);
        hand.landmarks[7].y = f32::NAN;
        let err = HandObservation::from_detector(&hand).unwrap_err();
        assert_eq!(err, PoseError::NonFinite { index: 7 });
    }

    #[test]
    fn confidence_clamped_and_rounded() {
        let mut hand = raw("Left", 21);
        hand.score = 1.7;
        let obs = HandObservation::from_detector(&hand).unwrap();
        assert_eq!(obs.confidence, 1.0);
        hand.score = 0.934;
        let obs = HandObservation::from_detector(&hand).unwrap();
        assert_eq!(obs.confidence_pct(), 93);
    }

    #[test]
    fn detector_json_defaults() {
        let json = r#"{"landmarks":[{"x":0.1,"y":0.2}],"handedness":"right"}"#;
        let hand: DetectorHand = serde_json::from_str(json).unwrap();
        assert_eq!(hand.label, "right");
        assert_eq!(hand.score, 1.0);
        assert_eq!(hand.landmarks[0].z, 0.0);
    }

    #[test]
    fn connections_stay_in_range() {
        for &(a, b) in HAND_CONNECTIONS.iter().chain(SKELETON_CONNECTIONS.iter()) {
            assert!(a < LANDMARK_COUNT && b < LANDMARK_COUNT);
        }
    }
}
