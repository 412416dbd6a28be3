//! Recent-gesture log: a debounce in front of a bounded, newest-first list.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::gesture::Gesture;
use crate::landmark::Handedness;

/// Maximum number of entries kept.
pub const HISTORY_LENGTH: usize = 10;
/// A repeat of the last recorded gesture inside this window is ignored.
pub const DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryEntry {
    /// Wall-clock time, `HH:MM:SS`.
    pub time:  String,
    /// e.g. `PEACE (Left)`.
    pub label: String,
}

#[derive(Clone, Debug, Default)]
pub struct GestureHistory {
    entries: VecDeque<HistoryEntry>,
    last:    Option<(&'static str, Instant)>,
}

impl GestureHistory {
    pub fn new() -> Self { GestureHistory::default() }

    /// Record `gesture` seen on `hand` at `now`, labelled with wall-clock
    /// `time`.  Returns false when debounced.
    pub fn record(
        &mut self,
        gesture: &Gesture,
        hand:    Handedness,
        now:     Instant,
        time:    impl Into<String>,
    ) -> bool {
        if let Some((name, at)) = self.last {
            if name == gesture.name && now.saturating_duration_since(at) < DEBOUNCE {
                return false;
            }
        }

        self.last = Some((gesture.name, now));
        self.entries.push_front(HistoryEntry {
            time:  time.into(),
            label: format!("{} ({})", gesture.name, hand),
        });
        self.entries.truncate(HISTORY_LENGTH);
        true
    }

    /// Entries, newest first.
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&HistoryEntry> { self.entries.front() }

    pub fn len(&self) -> usize { self.entries.len() }

    pub fn is_empty(&self) -> bool { self.entries.is_empty() }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::{FIST, OPEN_PALM, PEACE, REGISTRY};

    fn ms(start: Instant, n: u64) -> Instant { start + Duration::from_millis(n) }

    #[test]
    fn same_gesture_inside_window_recorded_once() {
        let mut h = GestureHistory::new();
        let t0 = Instant::now();
        assert!(h.record(&PEACE, Handedness::Left, t0, "10:00:00"));
        assert!(!h.record(&PEACE, Handedness::Left, ms(t0, 999), "10:00:00"));
        assert_eq!(h.len(), 1);
    }

    #[test]
    fn same_gesture_after_window_recorded_twice() {
        let mut h = GestureHistory::new();
        let t0 = Instant::now();
        h.record(&PEACE, Handedness::Left, t0, "10:00:00");
        assert!(h.record(&PEACE, Handedness::Left, ms(t0, 1000), "10:00:01"));
        assert_eq!(h.len(), 2);
    }

    #[test]
    fn different_gesture_not_debounced() {
        let mut h = GestureHistory::new();
        let t0 = Instant::now();
        h.record(&FIST, Handedness::Right, t0, "10:00:00");
        assert!(h.record(&OPEN_PALM, Handedness::Right, ms(t0, 10), "10:00:00"));
        // Window restarts from the latest recorded entry.
        assert!(!h.record(&OPEN_PALM, Handedness::Right, ms(t0, 500), "10:00:00"));
        assert!(h.record(&FIST, Handedness::Right, ms(t0, 520), "10:00:00"));
        assert_eq!(h.len(), 3);
    }

    #[test]
    fn newest_first_and_capped() {
        let mut h = GestureHistory::new();
        let t0 = Instant::now();
        for i in 0..25u64 {
            let g = &REGISTRY[(i % 10) as usize];
            h.record(g, Handedness::Left, ms(t0, i * 1500), format!("t{i}"));
            assert!(h.len() <= HISTORY_LENGTH);
        }
        assert_eq!(h.len(), HISTORY_LENGTH);
        assert_eq!(h.latest().unwrap().time, "t24");
        assert_eq!(h.entries().last().unwrap().time, "t15");
    }

    #[test]
    fn label_names_hand() {
        let mut h = GestureHistory::new();
        h.record(&OPEN_PALM, Handedness::Right, Instant::now(), "09:15:00");
        assert_eq!(h.latest().unwrap().label, "OPEN PALM (Right)");
    }
}
