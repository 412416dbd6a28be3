//! # hand_pose
//!
//! Interprets the per-frame output of a 21-point hand-landmark detector.
//! Everything here is pure: no drawing surface, no clock of its own, no I/O.
//!
//! ## Pipeline
//!
//! | Stage | Module | Input → Output |
//! |---|---|---|
//! | Boundary | [`landmark`] | detector hand → [`HandObservation`] (handedness inverted once) |
//! | Geometry | [`geometry`] | normalized point → surface point under mirror + cover crop |
//! | Fingers | [`fingers`] | 21 landmarks → [`FingerStates`] |
//! | Gesture | [`gesture`] | [`FingerStates`] → [`Gesture`] |
//! | Trail | [`trail`] | fingertip per frame → decaying polyline |
//! | History | [`history`] | gesture per frame → debounced, capped log |
//!
//! ## Fixed constants
//!
//! | Constant | Value |
//! |---|---|
//! | [`MAX_HANDS`] | 2 |
//! | [`trail::TRAIL_LENGTH`] | 100 |
//! | [`trail::TRAIL_DECAY`] | 0.95 |
//! | [`history::HISTORY_LENGTH`] | 10 |
//! | [`history::DEBOUNCE`] | 1000 ms |

pub mod landmark;
pub mod geometry;
pub mod fingers;
pub mod gesture;
pub mod trail;
pub mod history;
pub mod synthetic;

pub use landmark::{
    DetectorHand, HandObservation, Handedness, Landmark, PoseError, LANDMARK_COUNT,
};
pub use geometry::{CoverFit, CropRect, HandOrientation, SkeletonFit, SurfacePoint, map_to_surface};
pub use fingers::{Finger, FingerStates, classify};
pub use gesture::{Gesture, match_gesture};
pub use trail::{Trail, TrailPoint};
pub use history::{GestureHistory, HistoryEntry};

/// Maximum number of hands consumed from one detector result.
pub const MAX_HANDS: usize = 2;
