//! The gesture pipeline: provider → classifier → debouncer.
//!
//! Single-threaded and frame-driven: the owner calls [`GesturePipeline::poll`]
//! once per rendered frame.  Deactivating stops the provider synchronously;
//! an inactive pipeline never yields a gesture.

use std::time::{Duration, Instant};

use tracing::{info, warn};

use crate::classifier::{classify_frame, GestureKind};
use crate::debounce::GestureDebouncer;
use crate::tracking::{HandTrackingProvider, Result, TrackingError, TrackingSession};

pub struct GesturePipeline {
    idle:          Option<Box<dyn HandTrackingProvider>>,
    session:       Option<TrackingSession>,
    debouncer:     GestureDebouncer,
    dropped_frames: u64,
}

impl GesturePipeline {
    pub fn new(provider: Box<dyn HandTrackingProvider>, cooldown: Duration) -> Self {
        GesturePipeline {
            idle:           Some(provider),
            session:        None,
            debouncer:      GestureDebouncer::new(cooldown),
            dropped_frames: 0,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    /// Start the provider.  Activating an active pipeline is a no-op.
    pub fn activate(&mut self) -> Result<()> {
        if self.session.is_some() {
            return Ok(());
        }
        let provider = self.idle.take().ok_or(TrackingError::NoProvider)?;
        match TrackingSession::open(provider) {
            Ok(session) => {
                self.session = Some(session);
                Ok(())
            }
            Err((provider, e)) => {
                self.idle = Some(provider);
                Err(e)
            }
        }
    }

    /// Stop the provider and release its capture device before returning.
    pub fn deactivate(&mut self) {
        if let Some(session) = self.session.take() {
            self.idle = session.close();
        }
    }

    /// Flip between active and inactive; returns the new state.
    pub fn toggle(&mut self) -> Result<bool> {
        if self.is_active() {
            self.deactivate();
        } else {
            self.activate()?;
        }
        Ok(self.is_active())
    }

    /// Process one video frame.  Frame failures are logged and skipped.
    pub fn poll(&mut self, now: Instant) -> Option<GestureKind> {
        let session = self.session.as_mut()?;
        let hands = match session.poll() {
            Ok(hands) => hands,
            Err(e) => {
                self.dropped_frames += 1;
                warn!(error = %e, dropped = self.dropped_frames, "hand-tracking frame skipped");
                return None;
            }
        };
        let gesture = self.debouncer.offer(classify_frame(&hands), now)?;
        info!(%gesture, "gesture");
        Some(gesture)
    }

    pub fn debouncer(&self) -> &GestureDebouncer {
        &self.debouncer
    }

    pub fn dropped_frames(&self) -> u64 {
        self.dropped_frames
    }
}

impl Drop for GesturePipeline {
    fn drop(&mut self) {
        self.deactivate();
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
