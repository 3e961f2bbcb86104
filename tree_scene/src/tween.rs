//! Eased tweens and exponential smoothing.
//!
//! Time is the scene clock in seconds (`f32`), supplied by the rendering
//! engine.  A [`Tween`] can be re-targeted at any moment: the value it shows
//! at that instant becomes the start of the new interpolation, so a change
//! of target never snaps.

use crate::math::{Euler, Vec3};

// ════════════════════════════════════════════════════════════════════════════
// Easing
// ════════════════════════════════════════════════════════════════════════════

/// Easing curves (polynomial "power" family).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Ease {
    Linear,
    /// Quadratic deceleration.
    Power1Out,
    /// Cubic deceleration.
    Power2Out,
    /// Cubic acceleration then deceleration.
    Power2InOut,
    /// Quartic deceleration.
    Power3Out,
}

impl Ease {
    /// Map linear progress `t` in 0–1 to eased progress.
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Ease::Linear      => t,
            Ease::Power1Out   => 1.0 - (1.0 - t).powi(2),
            Ease::Power2Out   => 1.0 - (1.0 - t).powi(3),
            Ease::Power3Out   => 1.0 - (1.0 - t).powi(4),
            Ease::Power2InOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
                }
            }
        }
    }
}

/// Duration and curve of one kind of transition.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Motion {
    pub duration: f32,
    pub ease:     Ease,
}

impl Motion {
    pub const fn new(duration: f32, ease: Ease) -> Self {
        Motion { duration, ease }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Lerp
// ════════════════════════════════════════════════════════════════════════════

pub trait Lerp: Copy {
    fn lerp(self, to: Self, t: f32) -> Self;
}

impl Lerp for f32 {
    fn lerp(self, to: f32, t: f32) -> f32 {
        self + (to - self) * t
    }
}

impl Lerp for Vec3 {
    fn lerp(self, to: Vec3, t: f32) -> Vec3 {
        self + (to - self) * t
    }
}

/// Component-wise; the target's axis order wins.
impl Lerp for Euler {
    fn lerp(self, to: Euler, t: f32) -> Euler {
        Euler::with_order(
            self.x.lerp(to.x, t),
            self.y.lerp(to.y, t),
            self.z.lerp(to.z, t),
            to.order,
        )
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tween
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug)]
pub struct Tween<T> {
    from:     T,
    to:       T,
    start:    f32,
    duration: f32,
    ease:     Ease,
}

impl<T: Lerp + PartialEq> Tween<T> {
    /// A tween already at rest on `value`.
    pub fn settled(value: T) -> Self {
        Tween { from: value, to: value, start: 0.0, duration: 0.0, ease: Ease::Linear }
    }

    /// Linear progress 0–1 at `clock`.
    pub fn progress(&self, clock: f32) -> f32 {
        if self.duration <= 0.0 {
            return 1.0;
        }
        ((clock - self.start) / self.duration).clamp(0.0, 1.0)
    }

    pub fn value_at(&self, clock: f32) -> T {
        let p = self.progress(clock);
        if p >= 1.0 {
            return self.to;
        }
        self.from.lerp(self.to, self.ease.apply(p))
    }

    pub fn target(&self) -> T {
        self.to
    }

    pub fn is_finished(&self, clock: f32) -> bool {
        self.progress(clock) >= 1.0
    }

    /// Head for `to` from wherever the tween currently is.  Returns false
    /// (and leaves the running tween alone) when `to` is already the target.
    pub fn retarget(&mut self, to: T, motion: Motion, clock: f32) -> bool {
        if self.to == to {
            return false;
        }
        self.from     = self.value_at(clock);
        self.to       = to;
        self.start    = clock;
        self.duration = motion.duration;
        self.ease     = motion.ease;
        true
    }

    /// Jump to `value` with no animation.
    pub fn snap(&mut self, value: T) {
        *self = Tween::settled(value);
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Exponential smoothing
// ════════════════════════════════════════════════════════════════════════════

/// Per-step blend factor for a per-frame rate tuned at 60 fps, corrected for
/// the actual frame time `dt` (seconds).
pub fn smoothing_factor(rate_per_frame: f32, dt: f32) -> f32 {
    if dt <= 0.0 {
        return 0.0;
    }
    1.0 - (1.0 - rate_per_frame.clamp(0.0, 1.0)).powf(dt * 60.0)
}

/// A value chasing its target with frame-rate-independent smoothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Smoothed {
    pub value:  f32,
    pub target: f32,
    rate:       f32,
}

impl Smoothed {
    pub fn new(value: f32, rate_per_frame: f32) -> Self {
        Smoothed { value, target: value, rate: rate_per_frame }
    }

    pub fn step(&mut self, dt: f32) -> f32 {
        let k = smoothing_factor(self.rate, dt);
        self.value = self.value.lerp(self.target, k);
        self.value
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    const EASES: [Ease; 5] = [
        Ease::Linear, Ease::Power1Out, Ease::Power2Out, Ease::Power2InOut, Ease::Power3Out,
    ];

    #[test]
    fn eases_hit_endpoints() {
        for e in EASES {
            assert!(e.apply(0.0).abs() < 1e-6, "{:?}", e);
            assert!((e.apply(1.0) - 1.0).abs() < 1e-6, "{:?}", e);
        }
    }

    #[test]
    fn eases_are_monotonic() {
        for e in EASES {
            let mut prev = 0.0;
            for i in 1..=100 {
                let v = e.apply(i as f32 / 100.0);
                assert!(v >= prev, "{:?} at {}", e, i);
                prev = v;
            }
        }
    }

    #[test]
    fn out_eases_decelerate() {
        assert!(Ease::Power2Out.apply(0.5) > 0.5);
        assert!(Ease::Power3Out.apply(0.5) > Ease::Power2Out.apply(0.5));
        assert!((Ease::Power2InOut.apply(0.5) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn tween_reaches_target() {
        let mut t = Tween::settled(0.0f32);
        t.retarget(10.0, Motion::new(1.5, Ease::Power2Out), 2.0);
        assert_eq!(t.value_at(2.0), 0.0);
        assert_eq!(t.value_at(3.5), 10.0);
        assert!(t.is_finished(4.0));
    }

    #[test]
    fn retarget_starts_from_current_value() {
        let mut t = Tween::settled(Vec3::ZERO);
        let m = Motion::new(1.0, Ease::Power2Out);
        t.retarget(Vec3::new(10.0, 0.0, 0.0), m, 0.0);
        let mid = t.value_at(0.5);
        t.retarget(Vec3::new(0.0, 10.0, 0.0), m, 0.5);
        assert_eq!(t.value_at(0.5), mid);
    }

    #[test]
    fn retarget_same_target_is_noop() {
        let mut t = Tween::settled(1.0f32);
        let m = Motion::new(1.0, Ease::Linear);
        assert!(t.retarget(5.0, m, 0.0));
        assert!(!t.retarget(5.0, m, 0.5));
        assert!((t.value_at(0.5) - 3.0).abs() < 1e-6);
    }

    #[test]
    fn smoothing_is_frame_rate_independent() {
        let mut fast = Smoothed::new(0.0, 0.1);
        fast.target = 1.0;
        for _ in 0..120 { fast.step(1.0 / 120.0); }

        let mut slow = Smoothed::new(0.0, 0.1);
        slow.target = 1.0;
        for _ in 0..30 { slow.step(1.0 / 30.0); }

        assert!((fast.value - slow.value).abs() < 1e-4);
    }

    #[test]
    fn smoothing_matches_per_frame_lerp_at_60fps() {
        assert!((smoothing_factor(0.1, 1.0 / 60.0) - 0.1).abs() < 1e-6);
        assert_eq!(smoothing_factor(0.1, 0.0), 0.0);
    }
}
