//! Application loop.
//!
//! Wires the detector source, the [`Session`] and the [`Visualizer`]
//! together.  Detector results are drained from the channel and processed one
//! at a time, to completion, before the next is taken; the window is redrawn
//! once per loop iteration with the latest report.

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::time::Duration;

use tracing::{error, info};

use crate::config::{OverlayConfig, SourceConfig, SourceKind, VideoConfig};
use crate::detector::{
    spawn_detector_source, DetectorEvent, DetectorSource, ReplaySource, SimDetectorSource,
    SimInput, VideoFrame,
};
use crate::error::{OverlayError, Result};
use crate::layout::Layout;
use crate::session::{FrameReport, Session, SessionPhase};
use crate::visualizer::Visualizer;

// ════════════════════════════════════════════════════════════════════════════
// Source selection
// ════════════════════════════════════════════════════════════════════════════

/// Build the configured detector source.  The simulator also hands back the
/// sender the window uses to drive it.
pub fn open_source(
    cfg:   &SourceConfig,
    video: &VideoConfig,
) -> (Option<Sender<SimInput>>, Result<Box<dyn DetectorSource>>) {
    let interval = Duration::from_millis(cfg.frame_interval_ms.max(1));
    match cfg.kind {
        SourceKind::Sim => {
            let (tx, rx) = mpsc::channel();
            let source: Box<dyn DetectorSource> =
                Box::new(SimDetectorSource::new(rx, interval, video.width, video.height));
            (Some(tx), Ok(source))
        }
        SourceKind::Replay => {
            let source = match &cfg.replay_path {
                Some(path) => ReplaySource::open(path, interval, cfg.loop_replay)
                    .map(|s| Box::new(s) as Box<dyn DetectorSource>),
                None => Err(OverlayError::Source(
                    "replay source selected but no replay_path configured".into(),
                )),
            };
            (None, source)
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Event draining
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceState {
    Running,
    /// The source ended on its own (replay exhausted).
    Finished,
    /// The source asked the application to quit.
    Quit,
}

/// Process every pending detector event in arrival order.  Returns the report
/// of the last frame processed, if any, and the state of the source.
/// `image` keeps the most recent video frame.
pub fn drain_events(
    rx:      &Receiver<DetectorEvent>,
    session: &mut Session,
    image:   &mut Option<Arc<VideoFrame>>,
) -> (Option<FrameReport>, SourceState) {
    let mut latest = None;
    loop {
        match rx.try_recv() {
            Ok(DetectorEvent::Frame(result)) => {
                if let Some(frame) = &result.image {
                    *image = Some(Arc::clone(frame));
                }
                if let Some(report) = session.process(&result) {
                    latest = Some(report);
                }
            }
            Ok(DetectorEvent::Quit)         => return (latest, SourceState::Quit),
            Err(TryRecvError::Empty)        => return (latest, SourceState::Running),
            Err(TryRecvError::Disconnected) => return (latest, SourceState::Finished),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run()
// ════════════════════════════════════════════════════════════════════════════

/// Run the overlay until the window closes or the user quits.
///
/// A source that fails to start puts the session into its terminal failed
/// state; the window stays up showing the error.  Failing to open the window
/// itself is returned as an error.
pub fn run(cfg: OverlayConfig) -> Result<()> {
    let layout = Layout::new(cfg.window.width, cfg.window.height);
    let mut session = Session::new(layout.surfaces(), cfg.video.width, cfg.video.height);

    let (sim_tx, source) = open_source(&cfg.source, &cfg.video);
    let mut vis = Visualizer::new(&cfg.window, sim_tx)?;
    session.resize(vis.layout().surfaces());

    let mut events = match source {
        Ok(source) => {
            info!(kind = ?cfg.source.kind, "detector source started");
            Some(spawn_detector_source(source))
        }
        Err(e) => {
            error!("detector source failed to start: {e}");
            session.fail(e.to_string());
            None
        }
    };

    let mut report = session.waiting_report();
    let mut image: Option<Arc<VideoFrame>> = None;

    while vis.is_open() {
        // 1. Keyboard → simulator
        if !vis.poll_input() { break; }

        // 2. Window geometry
        if let Some(layout) = vis.take_resize() {
            session.resize(layout.surfaces());
        }

        // 3. Drain detector results
        let state = match &events {
            Some(rx) => {
                let (latest, state) = drain_events(rx, &mut session, &mut image);
                if let Some(latest) = latest {
                    report = latest;
                }
                state
            }
            None => SourceState::Running,
        };
        match state {
            SourceState::Running  => {}
            SourceState::Quit     => break,
            SourceState::Finished => {
                info!("detector source finished");
                events = None;
            }
        }

        // 4. Render
        match session.phase() {
            SessionPhase::Failed(reason) => vis.render_failure(reason),
            _ => vis.render(&session, &report, image.as_deref()),
        }
    }

    info!(frames = report.metrics.total_frames, "overlay closed");
    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use hand_pose::gesture::{FIST, PEACE};
    use hand_pose::{synthetic, DetectorHand, Handedness};

    use crate::detector::DetectorResult;

    fn session() -> Session {
        Session::new(Layout::new(1280, 720).surfaces(), 1280, 720)
    }

    fn frame(pattern: hand_pose::FingerStates) -> DetectorEvent {
        DetectorEvent::Frame(DetectorResult {
            hands: vec![DetectorHand {
                landmarks: synthetic::hand(pattern, Handedness::Left, 0.5, 0.7, 1.0).to_vec(),
                label:     "Left".into(),
                score:     0.9,
            }],
            image: None,
        })
    }

    #[test]
    fn replay_without_path_fails_to_open() {
        let cfg = SourceConfig { kind: SourceKind::Replay, ..SourceConfig::default() };
        let (tx, source) = open_source(&cfg, &VideoConfig::default());
        assert!(tx.is_none());
        assert!(matches!(source, Err(OverlayError::Source(_))));
    }

    #[test]
    fn replay_missing_file_fails_to_open() {
        let cfg = SourceConfig {
            kind:        SourceKind::Replay,
            replay_path: Some(PathBuf::from("/nonexistent/session.jsonl")),
            ..SourceConfig::default()
        };
        let (_, source) = open_source(&cfg, &VideoConfig::default());
        assert!(matches!(source, Err(OverlayError::Io { .. })));
    }

    #[test]
    fn sim_source_comes_with_input_channel() {
        let (tx, source) = open_source(&SourceConfig::default(), &VideoConfig::default());
        assert!(tx.is_some());
        assert!(source.is_ok());
    }

    #[test]
    fn drain_processes_every_frame_in_order() {
        let (tx, rx) = mpsc::channel();
        tx.send(frame(FIST.pattern)).unwrap();
        tx.send(frame(PEACE.pattern)).unwrap();

        let mut s = session();
        let mut image = None;
        let (latest, state) = drain_events(&rx, &mut s, &mut image);
        assert_eq!(state, SourceState::Running);
        assert_eq!(latest.unwrap().gesture_name(), "PEACE");
        assert_eq!(s.trail().len(), 2);
        assert_eq!(s.history().len(), 2);
    }

    #[test]
    fn drain_reports_quit_and_finish() {
        let (tx, rx) = mpsc::channel();
        tx.send(frame(FIST.pattern)).unwrap();
        tx.send(DetectorEvent::Quit).unwrap();
        let mut s = session();
        let (latest, state) = drain_events(&rx, &mut s, &mut None);
        assert!(latest.is_some());
        assert_eq!(state, SourceState::Quit);

        drop(tx);
        let (latest, state) = drain_events(&rx, &mut s, &mut None);
        assert!(latest.is_none());
        assert_eq!(state, SourceState::Finished);
    }

    #[test]
    fn drain_keeps_latest_image() {
        let (tx, rx) = mpsc::channel();
        let img = Arc::new(VideoFrame { width: 4, height: 3, pixels: vec![0; 12] });
        tx.send(DetectorEvent::Frame(DetectorResult { hands: Vec::new(), image: Some(img) })).unwrap();
        tx.send(DetectorEvent::Frame(DetectorResult::empty())).unwrap();

        let mut s = session();
        let mut image = None;
        drain_events(&rx, &mut s, &mut image);
        assert_eq!(image.map(|i| i.width), Some(4));
    }

    #[test]
    fn failed_session_drains_without_reports() {
        let (tx, rx) = mpsc::channel();
        tx.send(frame(PEACE.pattern)).unwrap();
        let mut s = session();
        s.fail("no camera");
        let (latest, _) = drain_events(&rx, &mut s, &mut None);
        assert!(latest.is_none());
        assert!(s.history().is_empty());
    }
}
