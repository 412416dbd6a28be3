//! Detector input: simulated hands or a replayed detector log.
//!
//! The public interface is [`DetectorEvent`] delivered over a `mpsc` channel.
//! The render loop does not know whether results came from the keyboard
//! simulator or a recorded session, and it consumes them strictly one at a
//! time.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;
use tracing::{debug, info, warn};

use hand_pose::gesture::{match_gesture, REGISTRY};
use hand_pose::{synthetic, DetectorHand, FingerStates, Handedness};

use crate::error::{OverlayError, Result};

// ════════════════════════════════════════════════════════════════════════════
// VideoFrame / DetectorResult
// ════════════════════════════════════════════════════════════════════════════

/// The raw video image a detector result was computed from (ARGB pixels,
/// un-mirrored).
#[derive(Clone, Debug, PartialEq)]
pub struct VideoFrame {
    pub width:  usize,
    pub height: usize,
    pub pixels: Vec<u32>,
}

impl VideoFrame {
    /// Nearest pixel at normalized (`nx`, `ny`); `None` outside the frame.
    pub fn sample(&self, nx: f32, ny: f32) -> Option<u32> {
        if !(0.0..1.0).contains(&nx) || !(0.0..1.0).contains(&ny) {
            return None;
        }
        let x = ((nx * self.width as f32) as usize).min(self.width.saturating_sub(1));
        let y = ((ny * self.height as f32) as usize).min(self.height.saturating_sub(1));
        self.pixels.get(y * self.width + x).copied()
    }
}

/// Everything the detector reports for one analysed frame.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DetectorResult {
    /// Absent or empty means no hand was found.
    #[serde(default)]
    pub hands: Vec<DetectorHand>,
    #[serde(skip)]
    pub image: Option<Arc<VideoFrame>>,
}

impl DetectorResult {
    pub fn empty() -> Self { DetectorResult::default() }

    /// Parse one JSON-lines record.
    pub fn from_json(line: &str) -> serde_json::Result<Self> {
        serde_json::from_str(line)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// DetectorEvent / DetectorSource
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug)]
pub enum DetectorEvent {
    /// One analysed frame.
    Frame(DetectorResult),
    /// The user asked to quit from the source side.
    Quit,
}

/// Anything that can deliver [`DetectorEvent`]s over a channel.
pub trait DetectorSource: Send + 'static {
    fn run(self: Box<Self>, tx: Sender<DetectorEvent>);
}

/// Spawn a detector source on its own thread and return the receiving end.
pub fn spawn_detector_source(source: Box<dyn DetectorSource>) -> Receiver<DetectorEvent> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || source.run(tx));
    rx
}

// ════════════════════════════════════════════════════════════════════════════
// SimDetectorSource
// ════════════════════════════════════════════════════════════════════════════

/// Raw input event from the viewer window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimInput {
    KeyDown(SimKey),
}

/// Simulated key codes (mapped from minifb keys by the visualizer).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    /// Registry gesture by position: 1–9 → 0–8, 0 → 9.
    Pose(u8),
    /// Cycle through the poses that have no registry entry.  C
    CustomPose,
    NudgeLeft,      // ←
    NudgeRight,     // →
    NudgeUp,        // ↑
    NudgeDown,      // ↓
    /// Hand in / out of view.  H
    ToggleHand,
    /// Second hand in / out of view.  B
    ToggleSecond,
    Quit,           // Q
}

const NUDGE: f32 = 0.03;

/// Synthetic detector: one hand wandering along a slow Lissajous path in the
/// pose chosen from the keyboard, an optional second hand mirroring it, and a
/// generated backdrop image.
pub struct SimDetectorSource {
    rx:           Receiver<SimInput>,
    interval:     Duration,
    backdrop:     Arc<VideoFrame>,
    pattern:      FingerStates,
    custom_index: usize,
    present:      bool,
    second:       bool,
    offset:       (f32, f32),
}

impl SimDetectorSource {
    pub fn new(rx: Receiver<SimInput>, interval: Duration, video_w: u32, video_h: u32) -> Self {
        SimDetectorSource {
            rx,
            interval,
            backdrop:     Arc::new(backdrop(video_w as usize / 2, video_h as usize / 2)),
            pattern:      FingerStates::ALL,
            custom_index: 0,
            present:      true,
            second:       false,
            offset:       (0.0, 0.0),
        }
    }

    /// Apply one input.  Returns false on quit.
    fn apply(&mut self, input: SimInput) -> bool {
        let SimInput::KeyDown(key) = input;
        match key {
            SimKey::Pose(n) => {
                if let Some(g) = REGISTRY.get(n as usize) {
                    self.pattern = g.pattern;
                }
            }
            SimKey::CustomPose => {
                let customs: Vec<FingerStates> = FingerStates::all_vectors()
                    .filter(|v| match_gesture(*v).is_custom())
                    .collect();
                self.pattern = customs[self.custom_index % customs.len()];
                self.custom_index += 1;
            }
            SimKey::NudgeLeft    => self.offset.0 -= NUDGE,
            SimKey::NudgeRight   => self.offset.0 += NUDGE,
            SimKey::NudgeUp      => self.offset.1 -= NUDGE,
            SimKey::NudgeDown    => self.offset.1 += NUDGE,
            SimKey::ToggleHand   => self.present = !self.present,
            SimKey::ToggleSecond => self.second = !self.second,
            SimKey::Quit         => return false,
        }
        debug!(?key, pattern = %self.pattern, present = self.present, "sim input");
        true
    }

    /// The detector result at `elapsed` since the source started.
    fn frame(&self, elapsed: Duration) -> DetectorResult {
        let t = elapsed.as_secs_f32();
        let mut hands = Vec::new();

        if self.present {
            // Camera-relative coordinates: the user sees this mirrored.
            let x = (0.5 + 0.18 * (t * 0.7).sin() + self.offset.0).clamp(0.2, 0.8);
            let y = (0.72 + 0.08 * (t * 1.3).sin() + self.offset.1).clamp(0.4, 0.9);
            let score = 0.9 + 0.05 * (t * 2.1).sin();

            hands.push(sim_hand(self.pattern, Handedness::Left, x, y, score));
            if self.second {
                hands.push(sim_hand(FingerStates::ALL, Handedness::Right, 1.0 - x, y, score - 0.1));
            }
        }

        DetectorResult { hands, image: Some(Arc::clone(&self.backdrop)) }
    }
}

fn sim_hand(pattern: FingerStates, label: Handedness, x: f32, y: f32, score: f32) -> DetectorHand {
    DetectorHand {
        landmarks: synthetic::hand(pattern, label, x, y, 1.0).to_vec(),
        label:     label.as_str().to_string(),
        score,
    }
}

/// Dark gradient with a faint grid, standing in for the camera image.
fn backdrop(width: usize, height: usize) -> VideoFrame {
    let width  = width.max(1);
    let height = height.max(1);
    let mut pixels = Vec::with_capacity(width * height);
    for y in 0..height {
        let v = 0x18 + (0x30 * y / height) as u32;
        for x in 0..width {
            let grid = x % 40 == 0 || y % 40 == 0;
            let (r, g, b) = if grid { (v + 0x10, v + 0x18, v + 0x28) } else { (v / 2, v / 2 + 4, v) };
            pixels.push(0xFF000000 | (r << 16) | (g << 8) | b);
        }
    }
    VideoFrame { width, height, pixels }
}

impl DetectorSource for SimDetectorSource {
    fn run(mut self: Box<Self>, tx: Sender<DetectorEvent>) {
        let start = Instant::now();
        loop {
            loop {
                match self.rx.try_recv() {
                    Ok(input) => {
                        if !self.apply(input) {
                            let _ = tx.send(DetectorEvent::Quit);
                            return;
                        }
                    }
                    Err(TryRecvError::Empty)        => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            if tx.send(DetectorEvent::Frame(self.frame(start.elapsed()))).is_err() {
                return;
            }
            thread::sleep(self.interval);
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ReplaySource
// ════════════════════════════════════════════════════════════════════════════

/// Replays a JSON-lines file of detector results at a fixed frame interval.
pub struct ReplaySource {
    path:     PathBuf,
    frames:   Vec<DetectorResult>,
    interval: Duration,
    looping:  bool,
}

impl ReplaySource {
    /// Read and parse the whole log up front.  Malformed lines are logged
    /// and dropped here; a log with no valid record fails to open.
    pub fn open<P: AsRef<Path>>(path: P, interval: Duration, looping: bool) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let content = fs::read_to_string(&path).map_err(|source| OverlayError::Io {
            path: path.clone(),
            source,
        })?;

        let mut frames = Vec::new();
        for (n, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match DetectorResult::from_json(line) {
                Ok(r)  => frames.push(r),
                Err(e) => warn!(line = n + 1, "skipping malformed detector result in {}: {e}",
                                path.display()),
            }
        }
        if frames.is_empty() {
            return Err(OverlayError::Source(format!(
                "{} contains no detector results",
                path.display()
            )));
        }
        info!(frames = frames.len(), looping, "replay log {}", path.display());
        Ok(ReplaySource { path, frames, interval, looping })
    }

    pub fn len(&self) -> usize { self.frames.len() }

    pub fn is_empty(&self) -> bool { self.frames.is_empty() }
}

impl DetectorSource for ReplaySource {
    fn run(self: Box<Self>, tx: Sender<DetectorEvent>) {
        loop {
            for result in &self.frames {
                if tx.send(DetectorEvent::Frame(result.clone())).is_err() {
                    return;
                }
                thread::sleep(self.interval);
            }
            if !self.looping {
                info!("replay of {} finished", self.path.display());
                return;
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_pose::{classify, HandObservation};

    fn sim() -> (Sender<SimInput>, SimDetectorSource) {
        let (tx, rx) = mpsc::channel();
        (tx, SimDetectorSource::new(rx, Duration::from_millis(1), 320, 180))
    }

    fn primary_pattern(result: &DetectorResult) -> FingerStates {
        let obs = HandObservation::from_detector(&result.hands[0]).unwrap();
        classify(&obs.landmarks)
    }

    #[test]
    fn parse_result_without_hands() {
        let r = DetectorResult::from_json("{}").unwrap();
        assert!(r.hands.is_empty());
        assert!(r.image.is_none());
    }

    #[test]
    fn parse_result_with_hand() {
        let pts: Vec<String> = (0..21).map(|i| format!(r#"{{"x":0.{i:02},"y":0.5,"z":0}}"#)).collect();
        let line = format!(r#"{{"hands":[{{"landmarks":[{}],"label":"Left","score":0.8}}]}}"#, pts.join(","));
        let r = DetectorResult::from_json(&line).unwrap();
        assert_eq!(r.hands.len(), 1);
        assert_eq!(r.hands[0].landmarks.len(), 21);
        assert_eq!(r.hands[0].score, 0.8);
    }

    #[test]
    fn sim_pose_keys_select_registry_gestures() {
        let (_tx, mut src) = sim();
        assert_eq!(primary_pattern(&src.frame(Duration::ZERO)), FingerStates::ALL);
        for (n, g) in REGISTRY.iter().enumerate() {
            assert!(src.apply(SimInput::KeyDown(SimKey::Pose(n as u8))));
            assert_eq!(primary_pattern(&src.frame(Duration::from_millis(250))), g.pattern);
        }
    }

    #[test]
    fn sim_custom_pose_is_custom() {
        let (_tx, mut src) = sim();
        src.apply(SimInput::KeyDown(SimKey::CustomPose));
        assert!(match_gesture(primary_pattern(&src.frame(Duration::ZERO))).is_custom());
    }

    #[test]
    fn sim_toggles() {
        let (_tx, mut src) = sim();
        src.apply(SimInput::KeyDown(SimKey::ToggleSecond));
        assert_eq!(src.frame(Duration::ZERO).hands.len(), 2);
        src.apply(SimInput::KeyDown(SimKey::ToggleHand));
        let r = src.frame(Duration::ZERO);
        assert!(r.hands.is_empty());
        assert!(r.image.is_some());
        assert!(!src.apply(SimInput::KeyDown(SimKey::Quit)));
    }

    #[test]
    fn sim_source_quits_on_request() {
        let (tx, src) = sim();
        let rx = spawn_detector_source(Box::new(src));
        tx.send(SimInput::KeyDown(SimKey::Quit)).unwrap();
        let quit = rx.iter().any(|e| matches!(e, DetectorEvent::Quit));
        assert!(quit);
    }

    #[test]
    fn backdrop_sampling() {
        let frame = backdrop(80, 40);
        assert_eq!(frame.pixels.len(), 80 * 40);
        assert!(frame.sample(0.5, 0.5).is_some());
        assert!(frame.sample(1.0, 0.5).is_none());
        assert!(frame.sample(-0.1, 0.5).is_none());
    }

    #[test]
    fn replay_missing_file_fails_at_open() {
        let err = ReplaySource::open("/nonexistent/replay.jsonl", Duration::ZERO, false).err().unwrap();
        assert!(matches!(err, OverlayError::Io { .. }));
    }

    #[test]
    fn replay_skips_malformed_lines() {
        let path = std::env::temp_dir().join(format!("hand_overlay_replay_{}.jsonl", std::process::id()));
        fs::write(&path, "{}\nnot json\n\n{\"hands\":[]}\n").unwrap();
        let src = ReplaySource::open(&path, Duration::ZERO, false).unwrap();
        assert_eq!(src.len(), 2);

        let rx = spawn_detector_source(Box::new(src));
        let frames = rx.iter().filter(|e| matches!(e, DetectorEvent::Frame(_))).count();
        assert_eq!(frames, 2);
        fs::remove_file(&path).ok();
    }

    #[test]
    fn looping_replay_of_only_malformed_lines_is_rejected() {
        let path = std::env::temp_dir().join(format!("hand_overlay_garbage_{}.jsonl", std::process::id()));
        fs::write(&path, "not json\nalso not json\n").unwrap();
        let err = ReplaySource::open(&path, Duration::from_millis(50), true).err().unwrap();
        assert!(matches!(err, OverlayError::Source(_)));
        fs::remove_file(&path).ok();
    }

    #[test]
    fn looping_replay_repeats_and_stops_when_receiver_dropped() {
        let path = std::env::temp_dir().join(format!("hand_overlay_loop_{}.jsonl", std::process::id()));
        fs::write(&path, "{}\nbroken\n{\"hands\":[]}\n").unwrap();
        let src = ReplaySource::open(&path, Duration::from_millis(1), true).unwrap();
        fs::remove_file(&path).ok();

        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || Box::new(src).run(tx));
        // More frames than the log holds: the replay wrapped around.
        let frames = rx.iter().take(5).filter(|e| matches!(e, DetectorEvent::Frame(_))).count();
        assert_eq!(frames, 5);
        drop(rx);
        handle.join().unwrap();
    }

    #[test]
    fn replay_empty_file_is_source_error() {
        let path = std::env::temp_dir().join(format!("hand_overlay_empty_{}.jsonl", std::process::id()));
        fs::write(&path, "\n\n").unwrap();
        let err = ReplaySource::open(&path, Duration::ZERO, false).err().unwrap();
        assert!(matches!(err, OverlayError::Source(_)));
        fs::remove_file(&path).ok();
    }
}
