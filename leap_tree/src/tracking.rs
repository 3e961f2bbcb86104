//! Hand-tracking providers for the app: a keyboard-driven simulator (always
//! available) and a LeapMotion controller (feature `leap`).
//!
//! Both produce 21-point landmark sets, so the gesture pipeline does not know
//! which one is plugged in.

use std::sync::mpsc::{Receiver, TryRecvError};

use hand_gesture::tracking::Result;
use hand_gesture::{FingerState, GestureKind, HandTrackingProvider, LandmarkSet, TrackingError};
use tracing::debug;

// ════════════════════════════════════════════════════════════════════════════
// SimInput
// ════════════════════════════════════════════════════════════════════════════

/// Raw input from the simulation window.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimInput {
    /// A pose key went down (`Some`) or every pose key is up (`None`).
    Pose(Option<GestureKind>),
    /// Make the next frame fail, to exercise frame-error handling.
    DropFrame,
}

/// Pose keys (mapped from minifb keys 1–4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimKey {
    Palm,     // 1
    Fist,     // 2
    Pointing, // 3
    Victory,  // 4
}

impl SimKey {
    pub fn gesture(self) -> GestureKind {
        match self {
            SimKey::Palm     => GestureKind::Palm,
            SimKey::Fist     => GestureKind::Fist,
            SimKey::Pointing => GestureKind::Pointing,
            SimKey::Victory  => GestureKind::Victory,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// SimHandProvider — keyboard simulation
// ════════════════════════════════════════════════════════════════════════════

/// Synthesizes a hand holding whichever pose key is down.
///
/// The window sends [`SimInput`]s over a channel; each polled frame drains
/// the channel and reports one synthetic hand, or none.
pub struct SimHandProvider {
    rx:        Receiver<SimInput>,
    pose:      Option<GestureKind>,
    fail_next: bool,
    running:   bool,
}

impl SimHandProvider {
    pub fn new(rx: Receiver<SimInput>) -> Self {
        SimHandProvider { rx, pose: None, fail_next: false, running: false }
    }

    fn drain(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(SimInput::Pose(pose)) => {
                    debug!(?pose, "simulated pose");
                    self.pose = pose;
                }
                Ok(SimInput::DropFrame)  => self.fail_next = true,
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
    }
}

impl HandTrackingProvider for SimHandProvider {
    fn name(&self) -> &str {
        "keyboard simulator"
    }

    fn start(&mut self) -> Result<()> {
        self.running = true;
        // Stale keys from before activation must not count.
        self.drain();
        self.pose = None;
        self.fail_next = false;
        Ok(())
    }

    fn stop(&mut self) {
        self.running = false;
    }

    fn poll_frame(&mut self) -> Result<Vec<LandmarkSet>> {
        if !self.running {
            return Err(TrackingError::frame("simulator not started"));
        }
        self.drain();
        if std::mem::take(&mut self.fail_next) {
            return Err(TrackingError::frame("simulated dropped frame"));
        }
        Ok(self
            .pose
            .map(|g| LandmarkSet::from_fingers(&FingerState::for_gesture(g)))
            .into_iter()
            .collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// LeapHandProvider — real hardware (feature = "leap")
// ════════════════════════════════════════════════════════════════════════════

/// Hand tracking backed by a LeapMotion controller.
///
/// Leap bones are converted to the 21-point layout: wrist from the middle
/// metacarpal base, then per finger the proximal, intermediate and distal
/// joints plus the tip.  Millimetres are mapped to a unit square as if seen
/// by a camera facing the user (y grows downward), so an upright hand
/// classifies the same way it would from a webcam.
#[cfg(feature = "leap")]
pub struct LeapHandProvider {
    connection: Option<leaprs::Connection>,
    /// Hands from the newest tracking event seen so far.
    hands:      Vec<LandmarkSet>,
}

#[cfg(feature = "leap")]
impl LeapHandProvider {
    /// Half-width of the tracked volume in millimetres.
    const SPAN_MM: f32 = 200.0;
    /// Height of the tracked volume in millimetres.
    const HEIGHT_MM: f32 = 400.0;
    /// Upper bound on messages drained in one frame.
    const MAX_MESSAGES: usize = 64;

    pub fn new() -> Self {
        LeapHandProvider { connection: None, hands: Vec::new() }
    }

    fn landmark(x: f32, y: f32, z: f32) -> hand_gesture::Landmark {
        hand_gesture::Landmark::new(
            0.5 + x / (2.0 * Self::SPAN_MM),
            1.0 - y / Self::HEIGHT_MM,
            z / Self::HEIGHT_MM,
        )
    }

    fn hand_landmarks(hand: &leaprs::Hand) -> LandmarkSet {
        let digits: Vec<_> = hand.digits().collect();
        let mut points = Vec::with_capacity(hand_gesture::LANDMARK_COUNT);

        if let Some(middle) = digits.get(2) {
            let w = middle.metacarpal().prev_joint();
            points.push(Self::landmark(w.x, w.y, w.z));
        }
        for digit in &digits {
            for joint in [
                digit.proximal().prev_joint(),
                digit.intermediate().prev_joint(),
                digit.distal().prev_joint(),
                digit.distal().next_joint(),
            ] {
                points.push(Self::landmark(joint.x, joint.y, joint.z));
            }
        }
        LandmarkSet::new(points)
    }
}

#[cfg(feature = "leap")]
impl Default for LeapHandProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "leap")]
impl HandTrackingProvider for LeapHandProvider {
    fn name(&self) -> &str {
        "LeapMotion"
    }

    fn start(&mut self) -> Result<()> {
        use leaprs::{Connection, ConnectionConfig};

        let mut connection = Connection::create(ConnectionConfig::default())
            .map_err(|e| TrackingError::start("LeapMotion", format!("{:?}", e)))?;
        connection
            .open()
            .map_err(|e| TrackingError::start("LeapMotion", format!("{:?}", e)))?;
        self.connection = Some(connection);
        self.hands.clear();
        Ok(())
    }

    fn stop(&mut self) {
        // Dropping the connection closes the device handle.
        self.connection = None;
        self.hands.clear();
    }

    fn poll_frame(&mut self) -> Result<Vec<LandmarkSet>> {
        use leaprs::Event;

        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| TrackingError::frame("LeapMotion not started"))?;

        // Zero timeout: an empty queue ends the drain instead of blocking.
        let latest = drain_latest(Self::MAX_MESSAGES, || {
            let msg = connection.poll(0).ok()?;
            Some(match msg.event() {
                Event::Tracking(frame) => {
                    let hands: Vec<_> = frame.hands().collect();
                    Some(hands.iter().map(Self::hand_landmarks).collect::<Vec<_>>())
                }
                _ => None,
            })
        });
        if let Some(hands) = latest {
            self.hands = hands;
        }
        Ok(self.hands.clone())
    }
}

/// Pull queued messages until `next` reports an empty queue (`None`) or
/// `limit` is reached; returns the last tracking payload (`Some(Some(_))`).
#[cfg_attr(not(feature = "leap"), allow(dead_code))]
fn drain_latest<T>(limit: usize, mut next: impl FnMut() -> Option<Option<T>>) -> Option<T> {
    let mut latest = None;
    for _ in 0..limit {
        match next() {
            Some(Some(payload)) => latest = Some(payload),
            Some(None)          => {}
            None                => break,
        }
    }
    latest
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use hand_gesture::classify_frame;
    use std::sync::mpsc;

    #[test]
    fn held_pose_yields_matching_hand() {
        let (tx, rx) = mpsc::channel();
        let mut sim = SimHandProvider::new(rx);
        sim.start().unwrap();
        tx.send(SimInput::Pose(Some(SimKey::Victory.gesture()))).unwrap();
        let hands = sim.poll_frame().unwrap();
        assert_eq!(hands.len(), 1);
        assert_eq!(classify_frame(&hands), Some(GestureKind::Victory));

        tx.send(SimInput::Pose(None)).unwrap();
        assert!(sim.poll_frame().unwrap().is_empty());
    }

    #[test]
    fn drop_frame_fails_once() {
        let (tx, rx) = mpsc::channel();
        let mut sim = SimHandProvider::new(rx);
        sim.start().unwrap();
        tx.send(SimInput::DropFrame).unwrap();
        assert!(sim.poll_frame().is_err());
        assert!(sim.poll_frame().is_ok());
    }

    #[test]
    fn stopped_simulator_reports_errors() {
        let (_tx, rx) = mpsc::channel();
        let mut sim = SimHandProvider::new(rx);
        assert!(sim.poll_frame().is_err());
    }

    #[test]
    fn drain_keeps_newest_tracking_payload() {
        let mut queue = vec![Some(1), None, Some(2), None].into_iter();
        assert_eq!(drain_latest(64, || queue.next()), Some(2));
    }

    #[test]
    fn drain_without_tracking_yields_nothing() {
        let mut queue = vec![None::<u32>, None].into_iter();
        assert_eq!(drain_latest(64, || queue.next()), None);
        assert_eq!(drain_latest(64, || None::<Option<u32>>), None);
    }

    #[test]
    fn drain_stops_at_limit() {
        let mut calls = 0;
        let latest = drain_latest(3, || {
            calls += 1;
            Some(Some(calls))
        });
        assert_eq!(latest, Some(3));
        assert_eq!(calls, 3);
    }

    #[test]
    fn start_discards_stale_keys() {
        let (tx, rx) = mpsc::channel();
        let mut sim = SimHandProvider::new(rx);
        tx.send(SimInput::Pose(Some(GestureKind::Palm))).unwrap();
        sim.start().unwrap();
        assert!(sim.poll_frame().unwrap().is_empty());
    }
}
