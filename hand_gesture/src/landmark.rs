//! Hand landmark model.
//!
//! A [`LandmarkSet`] is the 21-point skeleton of one detected hand in
//! normalized image coordinates: `x` grows to the right, `y` grows
//! **downward**, `z` is depth relative to the wrist.

use crate::classifier::FingerState;

/// Number of points in a complete hand skeleton.
pub const LANDMARK_COUNT: usize = 21;

/// Landmark indices (wrist first, then four joints per digit from the palm
/// outward).
#[allow(dead_code)]
pub mod index {
    pub const WRIST:      usize = 0;
    pub const THUMB_CMC:  usize = 1;
    pub const THUMB_MCP:  usize = 2;
    pub const THUMB_IP:   usize = 3;
    pub const THUMB_TIP:  usize = 4;
    pub const INDEX_MCP:  usize = 5;
    pub const INDEX_PIP:  usize = 6;
    pub const INDEX_DIP:  usize = 7;
    pub const INDEX_TIP:  usize = 8;
    pub const MIDDLE_MCP: usize = 9;
    pub const MIDDLE_PIP: usize = 10;
    pub const MIDDLE_DIP: usize = 11;
    pub const MIDDLE_TIP: usize = 12;
    pub const RING_MCP:   usize = 13;
    pub const RING_PIP:   usize = 14;
    pub const RING_DIP:   usize = 15;
    pub const RING_TIP:   usize = 16;
    pub const PINKY_MCP:  usize = 17;
    pub const PINKY_PIP:  usize = 18;
    pub const PINKY_DIP:  usize = 19;
    pub const PINKY_TIP:  usize = 20;
}

// ════════════════════════════════════════════════════════════════════════════
// Landmark
// ════════════════════════════════════════════════════════════════════════════

/// One tracked anatomical point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Landmark {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Landmark { x, y, z }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LandmarkSet
// ════════════════════════════════════════════════════════════════════════════

/// The landmarks of one hand for one video frame.
///
/// Providers may deliver short or otherwise malformed sets; nothing here
/// assumes `len() == LANDMARK_COUNT`; use [`LandmarkSet::get`] or
/// [`LandmarkSet::is_complete`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LandmarkSet {
    points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        LandmarkSet { points }
    }

    pub fn points(&self) -> &[Landmark] { &self.points }
    pub fn len(&self) -> usize         { self.points.len() }
    pub fn is_empty(&self) -> bool     { self.points.is_empty() }

    pub fn get(&self, idx: usize) -> Option<&Landmark> {
        self.points.get(idx)
    }

    /// True when all 21 points are present.
    pub fn is_complete(&self) -> bool {
        self.points.len() >= LANDMARK_COUNT
    }

    /// Build a synthetic upright hand whose fingers match `fingers`.
    ///
    /// Used by the keyboard simulator and by tests; the geometry is a
    /// plausible right hand held palm-toward-camera near the frame centre.
    pub fn from_fingers(fingers: &FingerState) -> Self {
        const MCP_Y: f32 = 0.60;
        const PIP_Y: f32 = 0.50;

        let mut points = Vec::with_capacity(LANDMARK_COUNT);
        points.push(Landmark::new(0.50, 0.80, 0.0)); // wrist

        // Thumb: extended = tip further left than the IP joint.
        points.push(Landmark::new(0.42, 0.74, -0.01));
        points.push(Landmark::new(0.38, 0.68, -0.02));
        points.push(Landmark::new(0.35, 0.63, -0.03));
        if fingers.thumb {
            points.push(Landmark::new(0.30, 0.60, -0.04));
        } else {
            points.push(Landmark::new(0.41, 0.64, -0.03));
        }

        let columns = [
            (0.44, fingers.index),
            (0.50, fingers.middle),
            (0.56, fingers.ring),
            (0.62, fingers.pinky),
        ];
        for (x, up) in columns {
            points.push(Landmark::new(x, MCP_Y, -0.01));
            points.push(Landmark::new(x, PIP_Y, -0.02));
            if up {
                points.push(Landmark::new(x, 0.42, -0.03));
                points.push(Landmark::new(x, 0.35, -0.04));
            } else {
                // Curled: the tip folds back below the PIP joint.
                points.push(Landmark::new(x, 0.55, -0.05));
                points.push(Landmark::new(x, 0.58, -0.04));
            }
        }

        LandmarkSet { points }
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        LandmarkSet::new(points)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn synthetic_hand_is_complete() {
        let hand = LandmarkSet::from_fingers(&FingerState::default());
        assert_eq!(hand.len(), LANDMARK_COUNT);
        assert!(hand.is_complete());
    }

    #[test]
    fn raised_finger_tip_is_above_pip() {
        let fingers = FingerState { index: true, ..FingerState::default() };
        let hand = LandmarkSet::from_fingers(&fingers);
        let tip = hand.get(index::INDEX_TIP).unwrap();
        let pip = hand.get(index::INDEX_PIP).unwrap();
        assert!(tip.y < pip.y);
    }

    #[test]
    fn get_out_of_range_is_none() {
        let short = LandmarkSet::new(vec![Landmark::default(); 5]);
        assert!(short.get(index::PINKY_TIP).is_none());
        assert!(!short.is_complete());
    }
}
