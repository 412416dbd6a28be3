//! Frame orchestration.
//!
//! `Session` owns all state that outlives a frame (trail, gesture history,
//! FPS samples) and turns one [`DetectorResult`] into a [`FrameReport`] for
//! the renderer.  Frames are processed one at a time, to completion, on the
//! render thread; nothing here is shared or locked.

use std::time::{Duration, Instant};

use chrono::NaiveTime;
use tracing::{debug, warn};

use hand_pose::landmark::LANDMARK_COUNT;
use hand_pose::{
    classify, map_to_surface, match_gesture, CoverFit, CropRect, FingerStates, Gesture,
    GestureHistory, HandObservation, HandOrientation, Handedness, Landmark, SkeletonFit,
    SurfacePoint, Trail, MAX_HANDS,
};

use crate::detector::DetectorResult;
use crate::metrics::{FrameMetrics, MetricsSnapshot};

pub const NO_HAND_LABEL: &str = "NO HAND DETECTED";
pub const WAITING_STATUS: &str = "Hand tracking active - Waiting for hand detection...";

// ════════════════════════════════════════════════════════════════════════════
// Surfaces
// ════════════════════════════════════════════════════════════════════════════

/// Pixel sizes (width, height) of the three drawing surfaces.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceLayout {
    /// Camera + overlay view.
    pub main:     (f32, f32),
    /// Isolated skeleton view.
    pub skeleton: (f32, f32),
    /// Trajectory view.
    pub trail:    (f32, f32),
}

// ════════════════════════════════════════════════════════════════════════════
// FrameReport
// ════════════════════════════════════════════════════════════════════════════

/// One hand, placed on every surface that shows it.
#[derive(Clone, Debug)]
pub struct HandView {
    pub observation: HandObservation,
    /// Landmarks on the camera surface (mirrored, cover-cropped).
    pub main:        [SurfacePoint; LANDMARK_COUNT],
    /// Landmarks on the skeleton surface.
    pub skeleton:    [(f32, f32); LANDMARK_COUNT],
}

/// Readout for the hand that drives gestures (the first one reported).
#[derive(Clone, Debug)]
pub struct PrimaryReadout {
    pub handedness:     Handedness,
    pub fingers:        FingerStates,
    pub gesture:        Gesture,
    pub confidence_pct: u32,
    pub palm:           Landmark,
    pub index_tip:      Landmark,
    pub orientation:    HandOrientation,
}

#[derive(Clone, Debug)]
pub struct FrameReport {
    pub hands:        Vec<HandView>,
    pub primary:      Option<PrimaryReadout>,
    pub left_active:  bool,
    pub right_active: bool,
    pub status:       String,
    /// A history entry was added this frame.
    pub recorded:     bool,
    pub metrics:      MetricsSnapshot,
    /// Time spent processing this frame.
    pub latency:      Duration,
}

impl FrameReport {
    pub fn gesture_name(&self) -> &str {
        self.primary.as_ref().map_or(NO_HAND_LABEL, |p| p.gesture.name)
    }

    pub fn confidence_pct(&self) -> u32 {
        self.primary.as_ref().map_or(0, |p| p.confidence_pct)
    }

    /// Finger display bar heights (0.0–1.0); `None` when no hand is shown.
    pub fn finger_bars(&self) -> Option<[f32; 5]> {
        self.primary.as_ref().map(|p| {
            hand_pose::Finger::ALL.map(|f| p.fingers.bar_height(f))
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Session
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Running; no hand in the last frame.
    Waiting,
    /// Running; at least one hand in the last frame.
    Tracking,
    /// Startup failed.  Terminal: frames are ignored from here on.
    Failed(String),
}

pub struct Session {
    surfaces:     SurfaceLayout,
    video_size:   (u32, u32),
    cover:        CoverFit,
    skeleton_fit: SkeletonFit,
    trail:        Trail,
    history:      GestureHistory,
    metrics:      FrameMetrics,
    phase:        SessionPhase,
    last_gesture: Option<&'static str>,
}

impl Session {
    pub fn new(surfaces: SurfaceLayout, video_w: u32, video_h: u32) -> Self {
        Session {
            surfaces,
            video_size:   (video_w, video_h),
            cover:        CoverFit::new(video_w as f32, video_h as f32, surfaces.main.0, surfaces.main.1),
            skeleton_fit: SkeletonFit::new(surfaces.skeleton.0, surfaces.skeleton.1),
            trail:        Trail::new(),
            history:      GestureHistory::new(),
            metrics:      FrameMetrics::new(),
            phase:        SessionPhase::Waiting,
            last_gesture: None,
        }
    }

    /// Recompute the surface fits.  Called once per resize, never per frame.
    pub fn resize(&mut self, surfaces: SurfaceLayout) {
        self.surfaces = surfaces;
        let (vw, vh) = self.video_size;
        self.cover = CoverFit::new(vw as f32, vh as f32, surfaces.main.0, surfaces.main.1);
        self.skeleton_fit = SkeletonFit::new(surfaces.skeleton.0, surfaces.skeleton.1);
        debug!(crop = ?self.cover.crop, "cover fit for {}x{} video", vw, vh);
    }

    /// Adopt the real video size once it is known.
    pub fn set_video_size(&mut self, width: u32, height: u32) {
        if (width, height) != self.video_size && width > 0 && height > 0 {
            self.video_size = (width, height);
            self.resize(self.surfaces);
        }
    }

    /// Enter the terminal failure state.
    pub fn fail(&mut self, reason: impl Into<String>) {
        self.phase = SessionPhase::Failed(reason.into());
    }

    pub fn phase(&self) -> &SessionPhase { &self.phase }
    pub fn cover(&self) -> &CoverFit { &self.cover }
    pub fn crop(&self) -> &CropRect { &self.cover.crop }
    pub fn surfaces(&self) -> &SurfaceLayout { &self.surfaces }
    pub fn trail(&self) -> &Trail { &self.trail }
    pub fn history(&self) -> &GestureHistory { &self.history }

    /// What to show before the first detector result arrives.
    pub fn waiting_report(&self) -> FrameReport {
        FrameReport {
            hands:        Vec::new(),
            primary:      None,
            left_active:  false,
            right_active: false,
            status:       WAITING_STATUS.to_string(),
            recorded:     false,
            metrics:      self.metrics.snapshot(),
            latency:      Duration::ZERO,
        }
    }

    /// Process one detector result now.
    pub fn process(&mut self, result: &DetectorResult) -> Option<FrameReport> {
        self.process_at(result, Instant::now(), chrono::Local::now().time())
    }

    /// Process one detector result at a given monotonic instant and wall-clock
    /// time.  Returns `None` once the session has failed.
    pub fn process_at(
        &mut self,
        result: &DetectorResult,
        now:    Instant,
        wall:   NaiveTime,
    ) -> Option<FrameReport> {
        if matches!(self.phase, SessionPhase::Failed(_)) {
            return None;
        }
        let started = Instant::now();

        self.metrics.begin_frame(now);
        if let Some(image) = &result.image {
            self.set_video_size(image.width as u32, image.height as u32);
        }

        let observations: Vec<HandObservation> = result.hands
            .iter()
            .filter_map(|hand| match HandObservation::from_detector(hand) {
                Ok(obs) => Some(obs),
                Err(e)  => {
                    warn!("rejected detector hand: {e}");
                    None
                }
            })
            .take(MAX_HANDS)
            .collect();

        let report = if observations.is_empty() {
            self.no_hand_frame()
        } else {
            self.hand_frame(observations, now, wall)
        };

        Some(FrameReport { latency: started.elapsed(), ..report })
    }

    fn no_hand_frame(&mut self) -> FrameReport {
        self.phase = SessionPhase::Waiting;
        self.trail.update(None);
        if self.last_gesture.take().is_some() {
            debug!("hand lost");
        }
        self.waiting_report()
    }

    fn hand_frame(
        &mut self,
        observations: Vec<HandObservation>,
        now:          Instant,
        wall:         NaiveTime,
    ) -> FrameReport {
        self.phase = SessionPhase::Tracking;
        self.metrics.record_detection();

        let (main_w, main_h) = self.surfaces.main;
        let hands: Vec<HandView> = observations
            .into_iter()
            .map(|observation| {
                let main = observation.landmarks
                    .map(|l| map_to_surface(l, main_w, main_h, &self.cover.crop));
                let skeleton = observation.landmarks.map(|l| self.skeleton_fit.place(l));
                HandView { observation, main, skeleton }
            })
            .collect();

        let primary_obs = &hands[0].observation;
        let fingers = classify(&primary_obs.landmarks);
        let gesture = match_gesture(fingers);
        let primary = PrimaryReadout {
            handedness:     primary_obs.handedness,
            fingers,
            gesture,
            confidence_pct: primary_obs.confidence_pct(),
            palm:           primary_obs.palm(),
            index_tip:      primary_obs.index_tip(),
            orientation:    HandOrientation::from_landmarks(&primary_obs.landmarks),
        };

        if self.last_gesture != Some(gesture.name) {
            debug!(gesture = gesture.name, symbol = gesture.symbol, fingers = %fingers,
                   hand = %primary.handedness, "gesture changed");
            self.last_gesture = Some(gesture.name);
        }

        let (trail_w, trail_h) = self.surfaces.trail;
        let tip = map_to_surface(primary.index_tip, trail_w, trail_h, &CropRect::FULL);
        self.trail.update_at(Some((tip.x, tip.y)), now);

        let recorded = self.history.record(
            &gesture,
            primary.handedness,
            now,
            wall.format("%H:%M:%S").to_string(),
        );

        let left_active  = hands.iter().any(|h| h.observation.handedness == Handedness::Left);
        let right_active = hands.iter().any(|h| h.observation.handedness == Handedness::Right);
        let names: Vec<String> = hands
            .iter()
            .map(|h| h.observation.handedness.as_str().to_lowercase())
            .collect();
        let status = format!(
            "Tracking {} hand{} ({}) - {} detected",
            hands.len(),
            if hands.len() > 1 { "s" } else { "" },
            names.join(" & "),
            gesture.name,
        );

        FrameReport {
            hands,
            primary: Some(primary),
            left_active,
            right_active,
            status,
            recorded,
            metrics: self.metrics.snapshot(),
            latency: Duration::ZERO,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_pose::gesture::{FIST, PEACE};
    use hand_pose::{synthetic, DetectorHand};

    fn surfaces() -> SurfaceLayout {
        SurfaceLayout { main: (800.0, 520.0), skeleton: (480.0, 260.0), trail: (480.0, 260.0) }
    }

    fn hand(pattern: FingerStates, label: Handedness, x: f32) -> DetectorHand {
        DetectorHand {
            landmarks: synthetic::hand(pattern, label, x, 0.7, 1.0).to_vec(),
            label:     label.as_str().to_string(),
            score:     0.87,
        }
    }

    fn result(hands: Vec<DetectorHand>) -> DetectorResult {
        DetectorResult { hands, image: None }
    }

    fn wall(s: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(12, 0, s).unwrap()
    }

    #[test]
    fn no_hand_frame_blanks_display() {
        let mut s = Session::new(surfaces(), 1280, 720);
        let r = s.process_at(&DetectorResult::empty(), Instant::now(), wall(0)).unwrap();
        assert_eq!(r.gesture_name(), NO_HAND_LABEL);
        assert_eq!(r.confidence_pct(), 0);
        assert!(r.finger_bars().is_none());
        assert_eq!(r.status, WAITING_STATUS);
        assert_eq!(*s.phase(), SessionPhase::Waiting);
        assert!(s.history().is_empty());
    }

    #[test]
    fn peace_sign_reported_with_inverted_hand() {
        let mut s = Session::new(surfaces(), 1280, 720);
        let r = s
            .process_at(&result(vec![hand(PEACE.pattern, Handedness::Right, 0.5)]), Instant::now(), wall(5))
            .unwrap();
        let p = r.primary.as_ref().unwrap();
        assert_eq!(p.gesture, PEACE);
        assert_eq!(p.handedness, Handedness::Left);
        assert_eq!(p.confidence_pct, 87);
        assert!(r.left_active && !r.right_active);
        assert_eq!(r.status, "Tracking 1 hand (left) - PEACE detected");
        assert_eq!(s.history().latest().unwrap().label, "PEACE (Left)");
        assert_eq!(s.history().latest().unwrap().time, "12:00:05");
    }

    #[test]
    fn at_most_two_hands_consumed() {
        let mut s = Session::new(surfaces(), 1280, 720);
        let hands = vec![
            hand(FIST.pattern, Handedness::Left, 0.3),
            hand(FIST.pattern, Handedness::Right, 0.6),
            hand(FIST.pattern, Handedness::Left, 0.8),
        ];
        let r = s.process_at(&result(hands), Instant::now(), wall(0)).unwrap();
        assert_eq!(r.hands.len(), 2);
        assert!(r.left_active && r.right_active);
        assert_eq!(r.status, "Tracking 2 hands (right & left) - FIST detected");
    }

    #[test]
    fn rejected_hand_is_skipped_not_fatal() {
        let mut s = Session::new(surfaces(), 1280, 720);
        let mut bad = hand(FIST.pattern, Handedness::Left, 0.5);
        bad.landmarks.truncate(12);
        let r = s.process_at(&result(vec![bad]), Instant::now(), wall(0)).unwrap();
        assert!(r.primary.is_none());

        let good = hand(PEACE.pattern, Handedness::Left, 0.5);
        let mut bad = hand(FIST.pattern, Handedness::Left, 0.5);
        bad.label = "Unknown".into();
        let r = s.process_at(&result(vec![bad, good]), Instant::now(), wall(1)).unwrap();
        assert_eq!(r.gesture_name(), "PEACE");
    }

    #[test]
    fn rejected_hand_does_not_use_up_a_slot() {
        let mut s = Session::new(surfaces(), 1280, 720);
        let mut bad = hand(FIST.pattern, Handedness::Left, 0.5);
        bad.landmarks.truncate(5);
        let hands = vec![
            bad,
            hand(PEACE.pattern, Handedness::Left, 0.3),
            hand(FIST.pattern, Handedness::Right, 0.7),
        ];
        let r = s.process_at(&result(hands), Instant::now(), wall(0)).unwrap();
        assert_eq!(r.hands.len(), 2);
        assert_eq!(r.gesture_name(), "PEACE");
        assert!(r.left_active && r.right_active);
    }

    #[test]
    fn trail_follows_mirrored_index_tip() {
        let mut s = Session::new(surfaces(), 1280, 720);
        let h = hand(PEACE.pattern, Handedness::Left, 0.4);
        let tip = h.landmarks[8];
        s.process_at(&result(vec![h]), Instant::now(), wall(0));
        let p = s.trail().head().unwrap();
        assert!((p.x - (1.0 - tip.x) * 480.0).abs() < 1e-3);
        assert!((p.y - tip.y * 260.0).abs() < 1e-3);
    }

    #[test]
    fn trail_fades_when_hand_lost() {
        let mut s = Session::new(surfaces(), 1280, 720);
        let t0 = Instant::now();
        for i in 0..5u64 {
            let r = result(vec![hand(FIST.pattern, Handedness::Left, 0.4 + i as f32 * 0.01)]);
            s.process_at(&r, t0 + Duration::from_millis(i * 33), wall(0));
        }
        let before: Vec<f32> = s.trail().points().iter().map(|p| p.alpha).collect();
        s.process_at(&DetectorResult::empty(), t0 + Duration::from_millis(200), wall(0));
        let after: Vec<f32> = s.trail().points().iter().map(|p| p.alpha).collect();
        assert_eq!(before.len(), after.len());
        assert!(before.iter().zip(&after).all(|(b, a)| a < b));
    }

    #[test]
    fn history_debounced_across_frames() {
        let mut s = Session::new(surfaces(), 1280, 720);
        let t0 = Instant::now();
        let r = result(vec![hand(PEACE.pattern, Handedness::Left, 0.5)]);
        for i in 0..30u64 {
            s.process_at(&r, t0 + Duration::from_millis(i * 33), wall(0));
        }
        // 30 frames span 957 ms.
        assert_eq!(s.history().len(), 1);
        let again = s.process_at(&r, t0 + Duration::from_millis(990), wall(0)).unwrap();
        assert!(!again.recorded);
        let later = s.process_at(&r, t0 + Duration::from_millis(1000), wall(1)).unwrap();
        assert!(later.recorded);
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn failed_session_ignores_frames() {
        let mut s = Session::new(surfaces(), 1280, 720);
        s.fail("camera unavailable");
        let r = result(vec![hand(PEACE.pattern, Handedness::Left, 0.5)]);
        assert!(s.process_at(&r, Instant::now(), wall(0)).is_none());
        assert!(s.history().is_empty());
        assert_eq!(*s.phase(), SessionPhase::Failed("camera unavailable".into()));
    }

    #[test]
    fn video_size_from_frame_refits() {
        use crate::detector::VideoFrame;
        use std::sync::Arc;

        let mut s = Session::new(surfaces(), 1280, 720);
        let before = *s.crop();
        let image = Arc::new(VideoFrame { width: 480, height: 640, pixels: vec![0; 480 * 640] });
        let r = DetectorResult { hands: Vec::new(), image: Some(image) };
        s.process_at(&r, Instant::now(), wall(0));
        assert_ne!(*s.crop(), before);
        // Portrait video on a landscape surface: fit width, crop vertically.
        assert_eq!(s.crop().w, 1.0);
        assert!(s.crop().h < 1.0);
    }

    #[test]
    fn main_surface_points_use_cover_crop() {
        let mut s = Session::new(surfaces(), 1280, 720);
        let h = hand(FIST.pattern, Handedness::Left, 0.5);
        let wrist = h.landmarks[0];
        let r = s.process_at(&result(vec![h]), Instant::now(), wall(0)).unwrap();
        let expected = map_to_surface(wrist, 800.0, 520.0, s.crop());
        assert_eq!(r.hands[0].main[0], expected);
        assert!(r.hands[0].main[0].visible);
    }
}
