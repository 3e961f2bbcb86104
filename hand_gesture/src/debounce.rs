//! Gesture dispatch debouncing.
//!
//! A candidate is dispatched iff it is present, differs from the last
//! dispatched gesture, and no cooldown is running.  The remembered gesture
//! survives the cooldown: holding one pose never re-fires it, a different
//! pose has to be seen in between.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::classifier::GestureKind;

/// Cooldown started by every dispatch.
pub const DEFAULT_COOLDOWN: Duration = Duration::from_millis(800);

#[derive(Clone, Debug)]
pub struct GestureDebouncer {
    cooldown:       Duration,
    last:           Option<GestureKind>,
    cooldown_until: Option<Instant>,
}

impl Default for GestureDebouncer {
    fn default() -> Self {
        GestureDebouncer::new(DEFAULT_COOLDOWN)
    }
}

impl GestureDebouncer {
    pub fn new(cooldown: Duration) -> Self {
        GestureDebouncer {
            cooldown,
            last:           None,
            cooldown_until: None,
        }
    }

    /// Offer this frame's candidate; returns the gesture if it is dispatched.
    pub fn offer(&mut self, candidate: Option<GestureKind>, now: Instant) -> Option<GestureKind> {
        let gesture = candidate?;
        if Some(gesture) == self.last {
            return None;
        }
        if self.cooldown_active(now) {
            debug!(%gesture, "gesture suppressed by cooldown");
            return None;
        }

        self.last           = Some(gesture);
        self.cooldown_until = Some(now + self.cooldown);
        debug!(%gesture, "gesture dispatched");
        Some(gesture)
    }

    /// The most recently dispatched gesture (never cleared by expiry).
    pub fn last(&self) -> Option<GestureKind> {
        self.last
    }

    pub fn cooldown_active(&self, now: Instant) -> bool {
        self.cooldown_until.is_some_and(|until| now < until)
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
