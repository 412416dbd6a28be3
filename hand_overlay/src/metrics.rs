//! Rolling frame-rate and detection metrics shown in the info strip.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Number of FPS samples averaged.
pub const FPS_WINDOW: usize = 30;

// ════════════════════════════════════════════════════════════════════════════
// FpsMeter
// ════════════════════════════════════════════════════════════════════════════

/// Instantaneous FPS per frame, averaged over the last [`FPS_WINDOW`] frames.
#[derive(Clone, Debug, Default)]
pub struct FpsMeter {
    samples: VecDeque<u32>,
    last:    Option<Instant>,
}

impl FpsMeter {
    pub fn new() -> Self { FpsMeter::default() }

    /// Register a frame at `now`; returns the frame delta, if there was a
    /// previous frame.
    pub fn tick(&mut self, now: Instant) -> Option<Duration> {
        let delta = self.last.map(|last| now.saturating_duration_since(last));
        self.last = Some(now);

        let delta = delta?;
        let ms = delta.as_secs_f64() * 1000.0;
        if ms > 0.0 {
            self.samples.push_back((1000.0 / ms).round() as u32);
            if self.samples.len() > FPS_WINDOW {
                self.samples.pop_front();
            }
        }
        Some(delta)
    }

    pub fn average(&self) -> u32 {
        if self.samples.is_empty() {
            return 0;
        }
        let sum: u64 = self.samples.iter().map(|&s| s as u64).sum();
        (sum as f64 / self.samples.len() as f64).round() as u32
    }

    pub fn sample_count(&self) -> usize { self.samples.len() }
}

// ════════════════════════════════════════════════════════════════════════════
// FrameMetrics
// ════════════════════════════════════════════════════════════════════════════

/// Values for the metrics panel.  Percentages are 0–100.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub fps:            u32,
    pub total_frames:   u64,
    pub detection_rate: u32,
    pub stability:      u32,
    pub accuracy:       u32,
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetrics {
    fps:          FpsMeter,
    total_frames: u64,
    detections:   u64,
}

impl FrameMetrics {
    pub fn new() -> Self { FrameMetrics::default() }

    /// Count a frame arriving at `now`.
    pub fn begin_frame(&mut self, now: Instant) {
        self.fps.tick(now);
        self.total_frames += 1;
    }

    /// Count a frame in which at least one hand was found.
    pub fn record_detection(&mut self) {
        self.detections += 1;
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let detection_rate = if self.total_frames > 0 {
            (self.detections as f64 / self.total_frames as f64 * 100.0).round() as u32
        } else {
            0
        };
        // Heuristic display values, not measurements.
        let stability = (160 - 2 * self.fps.sample_count() as i64).clamp(0, 100) as u32;
        let accuracy  = (detection_rate + 15).min(100);

        MetricsSnapshot {
            fps: self.fps.average(),
            total_frames: self.total_frames,
            detection_rate,
            stability,
            accuracy,
        }
    }
}
