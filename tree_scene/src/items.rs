//! Scene items: photo cards, ornaments and the particle cloud, each holding
//! its immutable layout data next to the tweens that animate it.

use std::fmt;
use std::ops::Range;

use crate::error::{Result, SceneError};
use crate::layout::{
    self, Appearance, NebulaPlacement, Particle, ORNAMENT_NEBULA_SCALE, PHOTO_NEBULA_SCALE,
};
use crate::math::{Color, Euler, Transform, Vec3};
use crate::tween::{Ease, Lerp, Motion, Smoothed, Tween};

// ════════════════════════════════════════════════════════════════════════════
// Photos
// ════════════════════════════════════════════════════════════════════════════

/// Opaque image reference (a path or URL); decoding happens elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PhotoRef(String);

impl PhotoRef {
    pub fn new(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.trim().is_empty() {
            return Err(SceneError::invalid_photo(value, "empty reference"));
        }
        Ok(PhotoRef(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Stable placeholder colour derived from the reference text (FNV-1a),
    /// used by renderers that do not decode images.
    pub fn tint(&self) -> Color {
        let hash = self.0.bytes().fold(0x811c_9dc5u32, |h, b| (h ^ b as u32).wrapping_mul(0x0100_0193));
        Color::from_hsv((hash % 360) as f32, 0.35, 0.95)
    }
}

impl fmt::Display for PhotoRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only list of photo references.
#[derive(Clone, Debug, Default)]
pub struct PhotoStore {
    photos: Vec<PhotoRef>,
}

impl PhotoStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a completed batch; returns the index range it now occupies.
    pub fn append_batch(&mut self, batch: impl IntoIterator<Item = PhotoRef>) -> Range<usize> {
        let start = self.photos.len();
        self.photos.extend(batch);
        start..self.photos.len()
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<&PhotoRef> {
        self.photos.get(i)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PhotoRef> {
        self.photos.iter()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// TransformTween
// ════════════════════════════════════════════════════════════════════════════

/// Independent position / rotation / scale tweens for one item.
#[derive(Clone, Copy, Debug)]
pub struct TransformTween {
    pub position: Tween<Vec3>,
    pub rotation: Tween<Euler>,
    pub scale:    Tween<f32>,
}

impl TransformTween {
    pub fn settled(t: Transform) -> Self {
        TransformTween {
            position: Tween::settled(t.position),
            rotation: Tween::settled(t.rotation),
            scale:    Tween::settled(t.scale),
        }
    }

    pub fn retarget(&mut self, to: Transform, motion: Motion, clock: f32) {
        self.position.retarget(to.position, motion, clock);
        self.rotation.retarget(to.rotation, motion, clock);
        self.scale.retarget(to.scale, motion, clock);
    }

    pub fn value_at(&self, clock: f32) -> Transform {
        Transform::new(
            self.position.value_at(clock),
            self.rotation.value_at(clock),
            self.scale.value_at(clock),
        )
    }

    pub fn target(&self) -> Transform {
        Transform::new(self.position.target(), self.rotation.target(), self.scale.target())
    }
}

// ── PhotoCard ──

pub const PHOTO_MOTION: Motion = Motion::new(1.2, Ease::Power3Out);
/// Per-frame blend rate of photo opacity and emissive at 60 fps.
pub const PHOTO_FADE_RATE: f32 = 0.1;

#[derive(Clone, Debug)]
pub struct PhotoCard {
    pub index:     usize,
    pub photo:     PhotoRef,
    pub placement: NebulaPlacement,
    pub tree:      Transform,
    pub nebula:    Transform,
    pub motion:    TransformTween,
    pub opacity:   Smoothed,
    pub emissive:  Smoothed,
}

impl PhotoCard {
    /// A new card resting at its tree transform.
    pub fn new(index: usize, count: usize, photo: PhotoRef, placement: NebulaPlacement) -> Self {
        let tree = layout::photo_tree_transform(index, count);
        PhotoCard {
            index,
            photo,
            placement,
            tree,
            nebula:   layout::nebula_transform(placement, index, count, PHOTO_NEBULA_SCALE),
            motion:   TransformTween::settled(tree),
            opacity:  Smoothed::new(Appearance::LIT.opacity, PHOTO_FADE_RATE),
            emissive: Smoothed::new(Appearance::LIT.emissive, PHOTO_FADE_RATE),
        }
    }

    /// Recompute both layouts for a new photo count, keeping the stored jitter.
    pub fn relayout(&mut self, count: usize) {
        self.tree   = layout::photo_tree_transform(self.index, count);
        self.nebula = layout::nebula_transform(self.placement, self.index, count, PHOTO_NEBULA_SCALE);
    }

    pub fn set_appearance(&mut self, target: Appearance) {
        self.opacity.target  = target.opacity;
        self.emissive.target = target.emissive;
    }

    pub fn appearance(&self) -> Appearance {
        Appearance { opacity: self.opacity.value, emissive: self.emissive.value }
    }
}

// ── Ornament ──

pub const ORNAMENT_MOTION: Motion = Motion::new(1.5, Ease::Power2Out);
pub const FADE_MOTION:     Motion = Motion::new(1.0, Ease::Power1Out);

#[derive(Clone, Debug)]
pub struct Ornament {
    pub index:   usize,
    pub color:   Color,
    pub tree:    Transform,
    pub nebula:  Transform,
    pub motion:  TransformTween,
    pub opacity: Tween<f32>,
}

impl Ornament {
    pub fn new(index: usize, count: usize, placement: NebulaPlacement) -> Self {
        let tree = layout::ornament_tree_transform(index, count);
        Ornament {
            index,
            color:   layout::ornament_color(index),
            tree,
            nebula:  layout::nebula_transform(placement, index, count, ORNAMENT_NEBULA_SCALE),
            motion:  TransformTween::settled(tree),
            opacity: Tween::settled(1.0),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ParticleCloud
// ════════════════════════════════════════════════════════════════════════════

pub const PARTICLE_MOTION: Motion = Motion::new(1.5, Ease::Power2Out);

/// Which of the two particle shapes is the current target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloudShape {
    Cone,
    Ring,
}

/// All particles move together: a snapshot of where they were when the
/// target changed, the target shape, and one shared progress tween.
#[derive(Clone, Debug)]
pub struct ParticleCloud {
    particles: Vec<Particle>,
    colors:    Vec<Color>,
    from:      Vec<Vec3>,
    shape:     CloudShape,
    blend:     Tween<f32>,
    current:   Vec<Vec3>,
    pub opacity: Tween<f32>,
}

impl ParticleCloud {
    pub fn new(particles: Vec<Particle>) -> Self {
        let from: Vec<Vec3> = particles.iter().map(|p| p.tree).collect();
        ParticleCloud {
            colors:  particles.iter().map(|p| p.color).collect(),
            current: from.clone(),
            from,
            particles,
            shape:   CloudShape::Cone,
            blend:   Tween::settled(1.0),
            opacity: Tween::settled(0.8),
        }
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn shape(&self) -> CloudShape {
        self.shape
    }

    fn target_of(&self, p: &Particle) -> Vec3 {
        match self.shape {
            CloudShape::Cone => p.tree,
            CloudShape::Ring => p.nebula,
        }
    }

    /// Head for `shape`, starting from the positions shown at `clock`.
    pub fn retarget(&mut self, shape: CloudShape, clock: f32) {
        if shape == self.shape {
            return;
        }
        self.update(clock);
        self.from.clone_from(&self.current);
        self.shape = shape;
        self.blend.snap(0.0);
        self.blend.retarget(1.0, PARTICLE_MOTION, clock);
    }

    /// Recompute the displayed positions for `clock`.
    pub fn update(&mut self, clock: f32) {
        let t = self.blend.value_at(clock);
        for (i, p) in self.particles.iter().enumerate() {
            let to = self.target_of(p);
            self.current[i] = self.from[i].lerp(to, t);
        }
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.current
    }

    pub fn colors(&self) -> &[Color] {
        &self.colors
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn empty_photo_ref_rejected() {
        assert!(PhotoRef::new("").is_err());
        assert!(PhotoRef::new("   ").is_err());
        assert_eq!(PhotoRef::new("a.jpg").unwrap().as_str(), "a.jpg");
    }

    #[test]
    fn tint_is_stable() {
        let a = PhotoRef::new("holiday/1.png").unwrap();
        let b = PhotoRef::new("holiday/1.png").unwrap();
        assert_eq!(a.tint(), b.tint());
    }

    #[test]
    fn append_batch_returns_new_range() {
        let mut store = PhotoStore::new();
        let r = store.append_batch(vec![PhotoRef::new("a").unwrap(), PhotoRef::new("b").unwrap()]);
        assert_eq!(r, 0..2);
        let r = store.append_batch(vec![PhotoRef::new("c").unwrap()]);
        assert_eq!(r, 2..3);
        assert_eq!(store.get(2).map(PhotoRef::as_str), Some("c"));
    }

    #[test]
    fn relayout_keeps_jitter() {
        let placement = NebulaPlacement::Even { height: 0.9 };
        let mut card = PhotoCard::new(1, 2, PhotoRef::new("x").unwrap(), placement);
        card.relayout(5);
        assert_eq!(card.placement, placement);
        assert_eq!(card.nebula.position.y, 0.9);
        assert_eq!(card.tree, layout::photo_tree_transform(1, 5));
    }

    #[test]
    fn new_card_rests_on_tree() {
        let card = PhotoCard::new(0, 3, PhotoRef::new("x").unwrap(), NebulaPlacement::Even { height: 0.0 });
        assert_eq!(card.motion.value_at(0.0), card.tree);
    }

    #[test]
    fn particle_cloud_moves_to_ring() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut cloud = ParticleCloud::new(layout::sample_particles(50, &mut rng));
        cloud.retarget(CloudShape::Ring, 0.0);
        cloud.update(PARTICLE_MOTION.duration + 0.1);
        let ring = layout::NEBULA_RADIUS;
        for p in cloud.positions() {
            let r = (p.x * p.x + p.z * p.z).sqrt();
            assert!((r - ring).abs() <= layout::PARTICLE_NEBULA_SPREAD + 1e-3);
        }
    }

    #[test]
    fn particle_retarget_midway_starts_from_current() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut cloud = ParticleCloud::new(layout::sample_particles(10, &mut rng));
        cloud.retarget(CloudShape::Ring, 0.0);
        cloud.update(0.5);
        let mid: Vec<Vec3> = cloud.positions().to_vec();
        cloud.retarget(CloudShape::Cone, 0.5);
        cloud.update(0.5);
        assert_eq!(cloud.positions(), &mid[..]);
    }
}
