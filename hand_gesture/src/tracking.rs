//! Hand-tracking providers and scoped capture sessions.
//!
//! A [`HandTrackingProvider`] is anything that can be started, polled once
//! per video frame for zero or more hands, and stopped.  A
//! [`TrackingSession`] owns a started provider and stops it when dropped, so
//! the capture device can never outlive the session.

use thiserror::Error;
use tracing::{debug, info};

use crate::landmark::LandmarkSet;

// ════════════════════════════════════════════════════════════════════════════
// Errors
// ════════════════════════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum TrackingError {
    /// The provider could not acquire its capture device.
    #[error("failed to start {provider}: {reason}")]
    Start { provider: String, reason: String },

    /// A single frame could not be processed.  Non-fatal.
    #[error("frame dropped: {reason}")]
    Frame { reason: String },

    /// Activation was requested but no provider is installed.
    #[error("no hand-tracking provider installed")]
    NoProvider,
}

pub type Result<T> = std::result::Result<T, TrackingError>;

impl TrackingError {
    pub fn start(provider: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Start { provider: provider.into(), reason: reason.into() }
    }

    pub fn frame(reason: impl Into<String>) -> Self {
        Self::Frame { reason: reason.into() }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// HandTrackingProvider
// ════════════════════════════════════════════════════════════════════════════

/// Source of per-frame hand landmarks (camera model, hardware, simulator).
pub trait HandTrackingProvider {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Acquire the capture device.
    fn start(&mut self) -> Result<()>;

    /// Release the capture device.  Must be idempotent.
    fn stop(&mut self);

    /// Landmarks for the next frame; an empty vector means no hand.
    fn poll_frame(&mut self) -> Result<Vec<LandmarkSet>>;
}

impl<P: HandTrackingProvider + ?Sized> HandTrackingProvider for Box<P> {
    fn name(&self) -> &str                              { (**self).name() }
    fn start(&mut self) -> Result<()>                   { (**self).start() }
    fn stop(&mut self)                                  { (**self).stop() }
    fn poll_frame(&mut self) -> Result<Vec<LandmarkSet>> { (**self).poll_frame() }
}

// ════════════════════════════════════════════════════════════════════════════
// TrackingSession
// ════════════════════════════════════════════════════════════════════════════

/// A started provider.  Dropping the session stops the provider.
pub struct TrackingSession {
    provider: Option<Box<dyn HandTrackingProvider>>,
}

impl TrackingSession {
    /// Start `provider`.  On failure the provider is handed back untouched
    /// so the caller can retry later.
    pub fn open(
        mut provider: Box<dyn HandTrackingProvider>,
    ) -> std::result::Result<Self, (Box<dyn HandTrackingProvider>, TrackingError)> {
        if let Err(e) = provider.start() {
            return Err((provider, e));
        }
        info!(provider = provider.name(), "hand tracking started");
        Ok(TrackingSession { provider: Some(provider) })
    }

    pub fn poll(&mut self) -> Result<Vec<LandmarkSet>> {
        match self.provider.as_mut() {
            Some(p) => p.poll_frame(),
            None    => Ok(Vec::new()),
        }
    }

    /// Stop the provider now and return it for later reuse.
    pub fn close(mut self) -> Option<Box<dyn HandTrackingProvider>> {
        let mut provider = self.provider.take()?;
        provider.stop();
        info!(provider = provider.name(), "hand tracking stopped");
        Some(provider)
    }
}

impl Drop for TrackingSession {
    fn drop(&mut self) {
        if let Some(mut provider) = self.provider.take() {
            provider.stop();
            debug!(provider = provider.name(), "hand tracking released on drop");
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
