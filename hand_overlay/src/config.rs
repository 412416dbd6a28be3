//! `hand_overlay.toml`: window, video and detector-source settings.
//!
//! Every field has a default, so an empty or partial file is valid.  The
//! pipeline constants (hand count, trail length, history length, debounce,
//! trail decay) are fixed in `hand_pose` and deliberately not configurable.
//!
//! ```toml
//! [window]
//! width   = 1280
//! height  = 720
//! fps_cap = 60
//!
//! [video]
//! width  = 1280
//! height = 720
//!
//! [source]
//! kind              = "replay"
//! replay_path       = "session.jsonl"
//! frame_interval_ms = 33
//! loop_replay       = true
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{OverlayError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "hand_overlay.toml";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OverlayConfig {
    #[serde(default)]
    pub window: WindowConfig,
    #[serde(default)]
    pub video:  VideoConfig,
    #[serde(default)]
    pub source: SourceConfig,
}

// ── [window] ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct WindowConfig {
    #[serde(default = "default_window_width")]
    pub width:   usize,
    #[serde(default = "default_window_height")]
    pub height:  usize,
    /// Upper bound on redraws per second.
    #[serde(default = "default_fps_cap")]
    pub fps_cap: u32,
}

fn default_window_width() -> usize { 1280 }
fn default_window_height() -> usize { 720 }
fn default_fps_cap() -> u32 { 60 }

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            width:   default_window_width(),
            height:  default_window_height(),
            fps_cap: default_fps_cap(),
        }
    }
}

// ── [video] ───────────────────────────────────────────────────────────────

/// Size of the frames the detector analyses.  Used for the cover fit until a
/// frame carrying its own size arrives.
#[derive(Debug, Clone, Deserialize)]
pub struct VideoConfig {
    #[serde(default = "default_video_width")]
    pub width:  u32,
    #[serde(default = "default_video_height")]
    pub height: u32,
}

fn default_video_width() -> u32 { 1280 }
fn default_video_height() -> u32 { 720 }

impl Default for VideoConfig {
    fn default() -> Self {
        Self { width: default_video_width(), height: default_video_height() }
    }
}

// ── [source] ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// Keyboard-driven synthetic hands.
    #[default]
    Sim,
    /// JSON-lines detector results read from `replay_path`.
    Replay,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind:              SourceKind,
    #[serde(default)]
    pub replay_path:       Option<PathBuf>,
    #[serde(default = "default_frame_interval_ms")]
    pub frame_interval_ms: u64,
    #[serde(default)]
    pub loop_replay:       bool,
}

fn default_frame_interval_ms() -> u64 { 33 }

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind:              SourceKind::Sim,
            replay_path:       None,
            frame_interval_ms: default_frame_interval_ms(),
            loop_replay:       false,
        }
    }
}

// ── loading ───────────────────────────────────────────────────────────────

impl OverlayConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| OverlayError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content).map_err(|source| OverlayError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load `path`, falling back to defaults when it is missing or invalid.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            info!("no config at {}, using defaults", path.display());
            return Self::default();
        }
        match Self::load(path) {
            Ok(cfg) => {
                info!("loaded config from {}", path.display());
                cfg
            }
            Err(e) => {
                warn!("{e}; using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_is_all_defaults() {
        let cfg = OverlayConfig::parse("").unwrap();
        assert_eq!(cfg.window.width, 1280);
        assert_eq!(cfg.video.height, 720);
        assert_eq!(cfg.source.kind, SourceKind::Sim);
        assert_eq!(cfg.source.frame_interval_ms, 33);
    }

    #[test]
    fn partial_sections() {
        let cfg = OverlayConfig::parse(
            "[window]\nwidth = 1600\n[source]\nkind = \"replay\"\nreplay_path = \"a.jsonl\"\n",
        ).unwrap();
        assert_eq!(cfg.window.width, 1600);
        assert_eq!(cfg.window.height, 720);
        assert_eq!(cfg.source.kind, SourceKind::Replay);
        assert_eq!(cfg.source.replay_path, Some(PathBuf::from("a.jsonl")));
        assert!(!cfg.source.loop_replay);
    }

    #[test]
    fn unknown_source_kind_rejected() {
        assert!(OverlayConfig::parse("[source]\nkind = \"camera\"\n").is_err());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = OverlayConfig::load("/nonexistent/hand_overlay.toml").unwrap_err();
        assert!(matches!(err, OverlayError::Io { .. }));
        let cfg = OverlayConfig::load_or_default("/nonexistent/hand_overlay.toml");
        assert_eq!(cfg.window.fps_cap, 60);
    }
}
