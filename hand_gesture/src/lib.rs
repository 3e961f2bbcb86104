//! # hand_gesture
//!
//! Turns per-frame hand landmarks into discrete, debounced gesture events.
//!
//! ```text
//!  HandTrackingProvider ──► classify_frame ──► GestureDebouncer ──► GestureKind
//!   (start / poll / stop)     (pure, per frame)   (800 ms cooldown)
//! ```
//!
//! ## Gesture vocabulary
//!
//! | Gesture | Index | Middle | Ring | Pinky |
//! |---|---|---|---|---|
//! | `Palm`     | up   | up   | up   | up   |
//! | `Victory`  | up   | up   | down | down |
//! | `Pointing` | up   | down | down | down |
//! | `Fist`     | down | down | down | down |
//!
//! Any other finger combination produces no gesture.
//!
//! ## Quick start
//!
//! ```rust
//! use hand_gesture::{classify, FingerState, GestureKind, LandmarkSet};
//!
//! let hand = LandmarkSet::from_fingers(&FingerState::for_gesture(GestureKind::Victory));
//! assert_eq!(classify(&hand), Some(GestureKind::Victory));
//! ```

pub mod landmark;
pub mod classifier;
pub mod debounce;
pub mod tracking;
pub mod pipeline;

pub use landmark::{Landmark, LandmarkSet, LANDMARK_COUNT};
pub use classifier::{classify, classify_frame, finger_state, FingerState, GestureKind};
pub use debounce::{GestureDebouncer, DEFAULT_COOLDOWN};
pub use tracking::{HandTrackingProvider, TrackingError, TrackingSession};
pub use pipeline::GesturePipeline;
