//! Single-frame gesture classification.
//!
//! A finger counts as "up" when its tip lies above (smaller `y`) its PIP
//! joint.  The thumb uses a lateral test instead and is reported in
//! [`FingerState`] but plays no part in the decision.

use std::fmt;
use std::str::FromStr;

use crate::landmark::{index, LandmarkSet};

// ════════════════════════════════════════════════════════════════════════════
// GestureKind
// ════════════════════════════════════════════════════════════════════════════

/// A classified hand pose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GestureKind {
    /// All four fingers extended.
    Palm,
    /// All four fingers curled.
    Fist,
    /// Index finger only.
    Pointing,
    /// Index and middle fingers, ring and pinky curled.
    Victory,
}

impl GestureKind {
    pub const ALL: [GestureKind; 4] = [
        GestureKind::Palm,
        GestureKind::Fist,
        GestureKind::Pointing,
        GestureKind::Victory,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Palm     => "palm",
            Self::Fist     => "fist",
            Self::Pointing => "pointing",
            Self::Victory  => "victory",
        }
    }
}

impl fmt::Display for GestureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GestureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "palm"     => Ok(Self::Palm),
            "fist"     => Ok(Self::Fist),
            "pointing" => Ok(Self::Pointing),
            "victory"  => Ok(Self::Victory),
            other      => Err(format!("unknown gesture '{}'", other)),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// FingerState
// ════════════════════════════════════════════════════════════════════════════

/// Up/down flags for each digit of one hand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FingerState {
    pub thumb:  bool,
    pub index:  bool,
    pub middle: bool,
    pub ring:   bool,
    pub pinky:  bool,
}

impl FingerState {
    /// The canonical finger pose for `gesture` (thumb tucked for fist only).
    pub fn for_gesture(gesture: GestureKind) -> Self {
        let (index, middle, ring, pinky) = match gesture {
            GestureKind::Palm     => (true,  true,  true,  true),
            GestureKind::Victory  => (true,  true,  false, false),
            GestureKind::Pointing => (true,  false, false, false),
            GestureKind::Fist     => (false, false, false, false),
        };
        FingerState {
            thumb: gesture != GestureKind::Fist,
            index,
            middle,
            ring,
            pinky,
        }
    }

    /// Exact-match decision over the four finger flags, in priority order.
    pub fn gesture(&self) -> Option<GestureKind> {
        match (self.index, self.middle, self.ring, self.pinky) {
            (true,  true,  true,  true)  => Some(GestureKind::Palm),
            (true,  true,  false, false) => Some(GestureKind::Victory),
            (true,  false, false, false) => Some(GestureKind::Pointing),
            (false, false, false, false) => Some(GestureKind::Fist),
            _ => None,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Classification
// ════════════════════════════════════════════════════════════════════════════

/// Read the finger flags of one hand, or `None` if the set is too short.
pub fn finger_state(set: &LandmarkSet) -> Option<FingerState> {
    if !set.is_complete() {
        return None;
    }
    let up = |tip: usize, pip: usize| -> Option<bool> {
        Some(set.get(tip)?.y < set.get(pip)?.y)
    };
    Some(FingerState {
        thumb:  set.get(index::THUMB_TIP)?.x < set.get(index::THUMB_IP)?.x,
        index:  up(index::INDEX_TIP,  index::INDEX_PIP)?,
        middle: up(index::MIDDLE_TIP, index::MIDDLE_PIP)?,
        ring:   up(index::RING_TIP,   index::RING_PIP)?,
        pinky:  up(index::PINKY_TIP,  index::PINKY_PIP)?,
    })
}

/// Classify one hand.  Malformed or unrecognized poses yield `None`.
pub fn classify(set: &LandmarkSet) -> Option<GestureKind> {
    finger_state(set)?.gesture()
}

/// Classify one video frame.
///
/// When several hands are reported the last one decides (last-write-wins);
/// a frame without hands yields `None`.
pub fn classify_frame(hands: &[LandmarkSet]) -> Option<GestureKind> {
    hands.last().and_then(classify)
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::Landmark;

    fn hand(index: bool, middle: bool, ring: bool, pinky: bool) -> LandmarkSet {
        LandmarkSet::from_fingers(&FingerState { thumb: true, index, middle, ring, pinky })
    }

    #[test]
    fn all_up_is_palm() {
        assert_eq!(classify(&hand(true, true, true, true)), Some(GestureKind::Palm));
    }

    #[test]
    fn index_middle_is_victory() {
        assert_eq!(classify(&hand(true, true, false, false)), Some(GestureKind::Victory));
    }

    #[test]
    fn index_only_is_pointing() {
        assert_eq!(classify(&hand(true, false, false, false)), Some(GestureKind::Pointing));
    }

    #[test]
    fn all_down_is_fist() {
        assert_eq!(classify(&hand(false, false, false, false)), Some(GestureKind::Fist));
    }

    #[test]
    fn other_combinations_are_ignored() {
        assert_eq!(classify(&hand(false, true, false, false)), None);
        assert_eq!(classify(&hand(true, false, true, false)), None);
        assert_eq!(classify(&hand(true, true, true, false)), None);
        assert_eq!(classify(&hand(false, false, false, true)), None);
    }

    #[test]
    fn thumb_does_not_affect_decision() {
        let tucked = FingerState { thumb: false, ..FingerState::for_gesture(GestureKind::Palm) };
        assert_eq!(classify(&LandmarkSet::from_fingers(&tucked)), Some(GestureKind::Palm));
        let state = finger_state(&LandmarkSet::from_fingers(&tucked)).unwrap();
        assert!(!state.thumb);
    }

    #[test]
    fn short_set_is_no_gesture() {
        let short = LandmarkSet::new(vec![Landmark::default(); 12]);
        assert_eq!(classify(&short), None);
        assert_eq!(classify(&LandmarkSet::default()), None);
    }

    #[test]
    fn last_hand_in_frame_wins() {
        let frame = vec![hand(true, true, true, true), hand(false, false, false, false)];
        assert_eq!(classify_frame(&frame), Some(GestureKind::Fist));
    }

    #[test]
    fn last_hand_malformed_means_no_gesture() {
        let frame = vec![hand(true, true, true, true), LandmarkSet::default()];
        assert_eq!(classify_frame(&frame), None);
    }

    #[test]
    fn empty_frame_is_no_gesture() {
        assert_eq!(classify_frame(&[]), None);
    }

    #[test]
    fn canonical_poses_round_trip() {
        for g in GestureKind::ALL {
            let set = LandmarkSet::from_fingers(&FingerState::for_gesture(g));
            assert_eq!(classify(&set), Some(g), "{} pose", g);
        }
    }

    #[test]
    fn parse_gesture_names() {
        assert_eq!("Victory".parse::<GestureKind>(), Ok(GestureKind::Victory));
        assert!("wave".parse::<GestureKind>().is_err());
    }
}
