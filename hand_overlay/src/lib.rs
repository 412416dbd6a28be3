//! # hand_overlay
//!
//! Live visual interface over a 21-point hand-landmark detector: the camera
//! view with hand skeletons drawn on top, an isolated skeleton view, a
//! fingertip trajectory, and an info strip with the current gesture, finger
//! states, coordinates, metrics and a log of recent gestures.
//!
//! Pose interpretation lives in [`hand_pose`]; this crate owns the detector
//! sources, per-frame orchestration and the `minifb` window.
//!
//! ## Detector sources
//!
//! * `sim` (default): keyboard-driven synthetic hands.
//! * `replay`: JSON-lines detector results from a file, one per frame:
//!   `{"hands":[{"landmarks":[{"x":…,"y":…,"z":…}, …21],"label":"Left","score":0.93}]}`
//!
//! ### Simulation keyboard shortcuts
//!
//! | Key | Action |
//! |---|---|
//! | `1`–`9`, `0` | Pose: OPEN PALM, FIST, POINTING, PEACE, THUMBS UP, ROCK ON, THREE, FOUR, OK SIGN, CALL ME |
//! | `C` | Cycle unregistered (CUSTOM) poses |
//! | Arrows / hold | Nudge the hand |
//! | `H` | Hand in / out of view |
//! | `B` | Second hand in / out of view |
//! | `Q` / `Escape` | Quit |

pub mod error;
pub mod config;
pub mod detector;
pub mod metrics;
pub mod layout;
pub mod session;
pub mod canvas;
pub mod render;
pub mod visualizer;
pub mod app;

pub use error::{OverlayError, Result};
pub use config::OverlayConfig;
pub use session::{FrameReport, Session, SessionPhase};
