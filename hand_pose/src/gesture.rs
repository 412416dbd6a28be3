//! Gesture matching over finger-state vectors.
//!
//! [`REGISTRY`] is scanned in order and the first exact match wins.  Vectors
//! with no entry fall back to FIST (nothing extended), OPEN PALM (everything
//! extended) or a synthesized CUSTOM gesture carrying the raw vector.

use crate::fingers::FingerStates;

/// A named hand pose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Gesture {
    pub name:    &'static str,
    pub symbol:  &'static str,
    pub pattern: FingerStates,
}

impl Gesture {
    const fn new(name: &'static str, symbol: &'static str, bits: [u8; 5]) -> Self {
        Gesture { name, symbol, pattern: FingerStates::from_bits(bits) }
    }

    /// A CUSTOM gesture for a vector with no registry entry.
    pub fn custom(pattern: FingerStates) -> Self {
        Gesture { name: CUSTOM_NAME, symbol: "🤚", pattern }
    }

    pub fn is_custom(&self) -> bool {
        self.name == CUSTOM_NAME
    }
}

impl std::fmt::Display for Gesture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

pub const CUSTOM_NAME: &str = "CUSTOM";

pub const OPEN_PALM: Gesture = Gesture::new("OPEN PALM", "✋",  [1, 1, 1, 1, 1]);
pub const FIST:      Gesture = Gesture::new("FIST",      "✊",  [0, 0, 0, 0, 0]);
pub const POINTING:  Gesture = Gesture::new("POINTING",  "☝️", [0, 1, 0, 0, 0]);
pub const PEACE:     Gesture = Gesture::new("PEACE",     "✌️", [0, 1, 1, 0, 0]);
pub const THUMBS_UP: Gesture = Gesture::new("THUMBS UP", "👍", [1, 0, 0, 0, 0]);
pub const ROCK_ON:   Gesture = Gesture::new("ROCK ON",   "🤘", [0, 1, 0, 0, 1]);
pub const THREE:     Gesture = Gesture::new("THREE",     "🖖", [0, 1, 1, 1, 0]);
pub const FOUR:      Gesture = Gesture::new("FOUR",      "🖖", [0, 1, 1, 1, 1]);
pub const OK_SIGN:   Gesture = Gesture::new("OK SIGN",   "👌", [1, 0, 1, 1, 1]);
pub const CALL_ME:   Gesture = Gesture::new("CALL ME",   "🤙", [1, 0, 0, 0, 1]);

/// Gesture registry in match order.
pub const REGISTRY: [Gesture; 10] = [
    OPEN_PALM, FIST, POINTING, PEACE, THUMBS_UP, ROCK_ON, THREE, FOUR, OK_SIGN, CALL_ME,
];

/// Map a finger-state vector to exactly one gesture.
pub fn match_gesture(states: FingerStates) -> Gesture {
    if let Some(g) = REGISTRY.iter().find(|g| g.pattern == states) {
        return *g;
    }
    match states.extended_count() {
        0 => FIST,
        5 => OPEN_PALM,
        _ => Gesture::custom(states),
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn total_and_deterministic() {
        for v in FingerStates::all_vectors() {
            let a = match_gesture(v);
            let b = match_gesture(v);
            assert_eq!(a, b);
            assert!(!a.name.is_empty());
        }
    }

    #[test]
    fn registry_patterns_match_themselves() {
        for g in REGISTRY.iter() {
            assert_eq!(match_gesture(g.pattern), *g);
        }
    }

    #[test]
    fn first_match_wins() {
        // THREE and FOUR share a symbol; each pattern still resolves by name.
        assert_eq!(match_gesture(FingerStates::from_bits([0, 1, 1, 1, 0])).name, "THREE");
        assert_eq!(match_gesture(FingerStates::from_bits([0, 1, 1, 1, 1])).name, "FOUR");
    }

    #[test]
    fn unmatched_vector_is_custom() {
        let v = FingerStates::from_bits([1, 1, 0, 0, 0]);
        let g = match_gesture(v);
        assert!(g.is_custom());
        assert_eq!(g.pattern, v);
    }

    #[test]
    fn extremes() {
        assert_eq!(match_gesture(FingerStates::NONE), FIST);
        assert_eq!(match_gesture(FingerStates::ALL), OPEN_PALM);
    }

    #[test]
    fn custom_count() {
        let customs = FingerStates::all_vectors()
            .filter(|v| match_gesture(*v).is_custom())
            .count();
        assert_eq!(customs, 32 - REGISTRY.len());
    }
}
