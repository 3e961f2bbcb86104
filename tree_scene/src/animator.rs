//! The transition animator.
//!
//! Owns every animated item and the global scene state (camera, group,
//! topper).  [`Animator::retarget`] is called on each stage, focus or
//! item-set change and points every tween at its new layout target;
//! [`Animator::tick`] advances time; [`Animator::render`] pushes the
//! resulting frame into a [`RenderingEngine`].

use std::f32::consts::TAU;

use rand::Rng;
use tracing::debug;

use crate::items::{
    CloudShape, Ornament, ParticleCloud, PhotoCard, PhotoRef, FADE_MOTION, PHOTO_MOTION,
    ORNAMENT_MOTION,
};
use crate::layout::{self, NebulaPlacement};
use crate::math::{Color, Euler, Transform, Vec3};
use crate::render::{CameraPose, Material, NodeId, ParticleFrame, RenderingEngine};
use crate::stage::{Arrangement, FloatParams, GroupSway, Stage, StageProfile, StageView};
use crate::tween::{Ease, Motion, Tween};

pub const CAMERA_MOTION: Motion = Motion::new(1.5, Ease::Power2InOut);
pub const GROUP_MOTION:  Motion = Motion::new(1.5, Ease::Power2Out);
pub const TOPPER_MOTION: Motion = Motion::new(1.5, Ease::Power2Out);

/// Radius spread of ornaments around the nebula ring.
const ORNAMENT_NEBULA_SPREAD: f32 = 2.0;
/// Camera orbit speed while auto-rotating (one turn per minute at 1.0).
const AUTO_ROTATE_SPEED: f32 = 0.5;
const TOPPER_OFFSET: Vec3 = Vec3::new(0.25, 10.75, 0.0);
const TOPPER_COLOR: u32 = 0xFF0000;
const ORNAMENT_EMISSIVE: f32 = 0.2;

// ── per-frame flourishes ──

const HOVER_SPEED:     f32 = 2.0;
const HOVER_AMPLITUDE: f32 = 0.002;
const BREATH_SPEED:    f32 = 1.5;
const BREATH_DEPTH:    f32 = 0.05;
const PULSE_SPEED:     f32 = 3.0;

/// Bob of the whole group for the given float parameters at time `t`.
pub fn float_offset(params: &FloatParams, t: f32) -> (f32, Euler) {
    let phase = t / 4.0 * params.speed;
    let rotation = Euler::new(
        phase.cos() / 8.0 * params.rotation_intensity,
        phase.sin() / 8.0 * params.rotation_intensity,
        phase.sin() / 20.0 * params.rotation_intensity,
    );
    (phase.sin() / 10.0 * params.float_intensity, rotation)
}

/// `0..1` heartbeat used by the topper.
fn breathing(t: f32) -> f32 {
    ((t * PULSE_SPEED).sin() + 1.0) / 2.0
}

// ════════════════════════════════════════════════════════════════════════════
// Animator
// ════════════════════════════════════════════════════════════════════════════

pub struct Animator {
    view:         StageView,
    photos:       Vec<PhotoCard>,
    ornaments:    Vec<Ornament>,
    particles:    ParticleCloud,
    camera:       Tween<Vec3>,
    group_height: Tween<f32>,
    sway:         Tween<f32>,
    topper_scale: Tween<f32>,
    orbit:        f32,
    auto_rotate:  bool,
    clock:        Option<f32>,
}

impl Animator {
    /// Build ornaments and particles with their nebula jitter drawn from `rng`.
    /// Everything starts at rest in the tree stage.
    pub fn new<R: Rng + ?Sized>(ornament_count: usize, particle_count: usize, rng: &mut R) -> Self {
        let ornaments = (0..ornament_count)
            .map(|i| {
                let placement = NebulaPlacement::sample_scattered(rng, ORNAMENT_NEBULA_SPREAD);
                Ornament::new(i, ornament_count, placement)
            })
            .collect();
        let particles = ParticleCloud::new(layout::sample_particles(particle_count, rng));
        let tree = Stage::Tree.profile();

        Animator {
            view:         StageView { stage: Stage::Tree, focus: None },
            photos:       Vec::new(),
            ornaments,
            particles,
            camera:       Tween::settled(tree.camera),
            group_height: Tween::settled(tree.group_height),
            sway:         Tween::settled(0.0),
            topper_scale: Tween::settled(tree.topper_scale),
            orbit:        0.0,
            auto_rotate:  true,
            clock:        None,
        }
    }

    fn profile(&self) -> &'static StageProfile {
        self.view.stage.profile()
    }

    pub fn view(&self) -> StageView {
        self.view
    }

    pub fn photos(&self) -> &[PhotoCard] {
        &self.photos
    }

    pub fn ornaments(&self) -> &[Ornament] {
        &self.ornaments
    }

    pub fn particles(&self) -> &ParticleCloud {
        &self.particles
    }

    /// Scene clock of the last tick.
    pub fn clock(&self) -> f32 {
        self.clock.unwrap_or(0.0)
    }

    /// Allow or suppress the idle camera orbit (suppressed while a wish shows).
    pub fn set_auto_rotate(&mut self, enabled: bool) {
        self.auto_rotate = enabled;
    }

    pub fn orbit(&self) -> f32 {
        self.orbit
    }

    // ── re-targeting ──

    /// Point every tween at the layout for `view`, starting from whatever is
    /// on screen at `clock`.
    pub fn retarget(&mut self, view: StageView, clock: f32) {
        let previous = self.view.stage;
        self.view = view;
        let profile = self.profile();

        self.retarget_items(clock);

        let shape = match profile.arrangement {
            Arrangement::Tree => CloudShape::Cone,
            Arrangement::Nebula | Arrangement::Focus => CloudShape::Ring,
        };
        self.particles.retarget(shape, clock);
        self.particles.opacity.retarget(layout::particle_opacity(profile.arrangement), FADE_MOTION, clock);

        if !profile.auto_rotate && self.orbit != 0.0 {
            // Fold the idle orbit into the camera tween so it lands on the
            // stage's absolute framing.
            let here = self.camera.value_at(clock).rotate_y(self.orbit);
            self.camera.snap(here);
            self.orbit = 0.0;
        }
        self.camera.retarget(profile.camera, CAMERA_MOTION, clock);
        self.group_height.retarget(profile.group_height, GROUP_MOTION, clock);
        self.topper_scale.retarget(profile.topper_scale, TOPPER_MOTION, clock);
        if let GroupSway::Settle { duration } = profile.sway {
            self.sway.retarget(0.0, Motion::new(duration, Ease::Power1Out), clock);
        }

        debug!(from = %previous, to = %view.stage, focus = ?view.focus, clock, "animator retargeted");
    }

    fn retarget_items(&mut self, clock: f32) {
        let arrangement = self.profile().arrangement;
        let focus = self.view.focus;

        for card in &mut self.photos {
            let focused = focus == Some(card.index);
            let target = layout::photo_target(arrangement, card.tree, card.nebula, focused);
            card.motion.retarget(target, PHOTO_MOTION, clock);
            card.set_appearance(layout::photo_appearance(arrangement, focused));
        }
        for orn in &mut self.ornaments {
            orn.motion.retarget(layout::ornament_target(arrangement, orn.tree, orn.nebula), ORNAMENT_MOTION, clock);
            orn.opacity.retarget(layout::ornament_opacity(arrangement), FADE_MOTION, clock);
        }
    }

    /// Add a batch of photos.  All photo layouts are recomputed for the new
    /// count; existing cards keep their jitter and glide to the new targets,
    /// new cards appear at their tree transform.
    pub fn append_photos<R: Rng + ?Sized>(&mut self, batch: &[PhotoRef], rng: &mut R, clock: f32) {
        if batch.is_empty() {
            return;
        }
        let old   = self.photos.len();
        let count = old + batch.len();

        for card in &mut self.photos {
            card.relayout(count);
        }
        for (k, photo) in batch.iter().enumerate() {
            let placement = NebulaPlacement::sample_even(rng);
            self.photos.push(PhotoCard::new(old + k, count, photo.clone(), placement));
        }
        self.retarget_items(clock);
        for card in &mut self.photos[old..] {
            card.opacity.value  = card.opacity.target;
            card.emissive.value = card.emissive.target;
        }
        debug!(added = batch.len(), total = count, "photos appended");
    }

    // ── time ──

    /// Advance to `clock` (seconds).  Going backwards counts as no time.
    pub fn tick(&mut self, clock: f32) {
        let dt = self.clock.map_or(0.0, |last| (clock - last).max(0.0));
        self.clock = Some(clock);
        let profile = self.profile();

        for card in &mut self.photos {
            card.opacity.step(dt);
            card.emissive.step(dt);
        }
        self.particles.update(clock);

        if let GroupSway::Oscillate { speed, amplitude } = profile.sway {
            self.sway.snap((clock * speed).sin() * amplitude);
        }
        if profile.auto_rotate && self.auto_rotate {
            self.orbit = (self.orbit + dt * AUTO_ROTATE_SPEED * TAU / 60.0) % TAU;
        }
    }

    // ── sampling ──

    pub fn camera_pose(&self) -> CameraPose {
        let clock = self.clock();
        CameraPose { position: self.camera.value_at(clock).rotate_y(self.orbit), target: Vec3::ZERO }
    }

    pub fn group_transform(&self) -> Transform {
        let clock = self.clock();
        let (bob, float) = float_offset(&self.profile().float, clock);
        Transform::new(
            Vec3::new(0.0, self.group_height.value_at(clock) + bob, 0.0),
            Euler::new(float.x, self.sway.value_at(clock) + float.y, float.z),
            1.0,
        )
    }

    /// Displayed transform of photo `i`, including hover.
    pub fn photo_transform(&self, i: usize) -> Option<Transform> {
        let clock = self.clock();
        let card = self.photos.get(i)?;
        let mut t = card.motion.value_at(clock);
        match self.profile().arrangement {
            Arrangement::Tree => {
                let yaw = card.tree.rotation.y;
                let lift = (HOVER_SPEED * clock + card.tree.position.y).sin() * HOVER_AMPLITUDE;
                t.position = t.position + Vec3::new(yaw.sin(), 0.0, yaw.cos()) * lift;
            }
            Arrangement::Focus if self.view.focus == Some(i) => {
                t.position.y += (BREATH_SPEED * clock).sin() * BREATH_DEPTH;
            }
            Arrangement::Nebula | Arrangement::Focus => {}
        }
        Some(t)
    }

    pub fn ornament_transform(&self, i: usize) -> Option<Transform> {
        self.ornaments.get(i).map(|o| o.motion.value_at(self.clock()))
    }

    pub fn topper(&self) -> (Transform, Material) {
        let clock = self.clock();
        let breath = breathing(clock);
        let scale = self.topper_scale.value_at(clock) * (1.0 + 0.1 * breath);
        let material = Material {
            opacity:  1.0,
            emissive: self.profile().topper_glow + breath * 2.5,
            color:    Color::from_hex(TOPPER_COLOR),
        };
        (Transform::new(TOPPER_OFFSET, Euler::IDENTITY, scale), material)
    }

    /// Push the current frame into `engine`.  Does not present.
    pub fn render<E: RenderingEngine + ?Sized>(&self, engine: &mut E) {
        let clock = self.clock();

        engine.set_camera(self.camera_pose());
        engine.node(NodeId::Group).set_transform(self.group_transform());

        for card in &self.photos {
            if let Some(t) = self.photo_transform(card.index) {
                let node = engine.node(NodeId::Photo(card.index));
                node.set_transform(t);
                let look = card.appearance();
                node.set_material(Material { opacity: look.opacity, emissive: look.emissive, color: card.photo.tint() });
            }
        }
        for orn in &self.ornaments {
            let node = engine.node(NodeId::Ornament(orn.index));
            node.set_transform(orn.motion.value_at(clock));
            node.set_material(Material {
                opacity:  orn.opacity.value_at(clock),
                emissive: ORNAMENT_EMISSIVE,
                color:    orn.color,
            });
        }

        let (transform, material) = self.topper();
        let node = engine.node(NodeId::Topper);
        node.set_transform(transform);
        node.set_material(material);

        engine.draw_particles(&ParticleFrame {
            positions:  self.particles.positions(),
            colors:     self.particles.colors(),
            opacity:    self.particles.opacity.value_at(clock),
            rotation_y: clock * self.profile().particle_spin,
        });
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::Appearance;
    use crate::render::HeadlessEngine;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn animator(photos: usize) -> Animator {
        let mut rng = StdRng::seed_from_u64(42);
        let mut a = Animator::new(8, 64, &mut rng);
        let batch: Vec<PhotoRef> = (0..photos).map(|i| PhotoRef::new(format!("p{}.jpg", i)).unwrap()).collect();
        a.append_photos(&batch, &mut rng, 0.0);
        a.tick(0.0);
        a
    }

    fn view(stage: Stage, focus: Option<usize>) -> StageView {
        StageView { stage, focus }
    }

    #[test]
    fn starts_at_rest_on_tree() {
        let a = animator(3);
        for (i, card) in a.photos().iter().enumerate() {
            assert_eq!(card.motion.value_at(0.0), card.tree, "photo {}", i);
        }
        assert_eq!(a.camera_pose().position, Vec3::new(0.0, 5.0, 20.0));
    }

    #[test]
    fn nebula_transition_completes_in_window() {
        let mut a = animator(4);
        a.retarget(view(Stage::Nebula, None), 1.0);
        a.tick(1.0 + 1.5);
        for card in a.photos() {
            assert_eq!(card.motion.value_at(a.clock()), card.nebula);
        }
        for o in a.ornaments() {
            assert_eq!(o.motion.value_at(a.clock()), o.nebula);
        }
        assert_eq!(a.camera_pose().position, Vec3::new(0.0, 2.0, 24.0));
        assert_eq!(a.particles().shape(), CloudShape::Ring);
    }

    #[test]
    fn retarget_mid_flight_is_continuous() {
        let mut a = animator(2);
        a.retarget(view(Stage::Nebula, None), 0.0);
        let half = PHOTO_MOTION.duration / 2.0;
        a.tick(half);
        let here = a.photos()[0].motion.value_at(half).position;
        let start = a.photos()[0].tree.position;

        a.retarget(view(Stage::Focus, Some(0)), half);
        let goal = layout::focus_transform().position;
        let next = a.photos()[0].motion.value_at(half + 1.0 / 60.0).position;

        assert_ne!(next, here);
        let detour = here.distance(next) + next.distance(goal) - here.distance(goal);
        assert!(detour.abs() < 1e-3, "left the segment by {}", detour);
        assert!(next.distance(goal) < here.distance(goal));
        assert!(next.distance(start) > 0.0);
    }

    #[test]
    fn focus_dims_everything_else() {
        let mut a = animator(3);
        a.retarget(view(Stage::Nebula, None), 0.0);
        a.retarget(view(Stage::Focus, Some(1)), 0.0);
        for t in 1..=300 {
            a.tick(t as f32 / 60.0);
        }
        assert!((a.photos()[0].appearance().opacity - Appearance::DIMMED.opacity).abs() < 1e-3);
        assert!((a.photos()[1].appearance().opacity - Appearance::LIT.opacity).abs() < 1e-3);
        assert_eq!(a.photos()[1].motion.target(), layout::focus_transform());
        assert!((a.ornaments()[0].opacity.value_at(a.clock()) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn append_preserves_existing_jitter() {
        let mut a = animator(2);
        let before: Vec<_> = a.photos().iter().map(|c| c.placement).collect();
        let mut rng = StdRng::seed_from_u64(99);
        a.append_photos(&[PhotoRef::new("late.jpg").unwrap()], &mut rng, 0.5);
        assert_eq!(a.photos().len(), 3);
        for (card, placement) in a.photos().iter().zip(before) {
            assert_eq!(card.placement, placement);
            assert_eq!(card.tree, layout::photo_tree_transform(card.index, 3));
        }
        let fresh = &a.photos()[2];
        assert_eq!(fresh.motion.value_at(0.5), fresh.tree);
    }

    #[test]
    fn auto_rotate_only_in_tree_and_without_wish() {
        let mut a = animator(0);
        a.tick(10.0);
        assert!(a.orbit() > 0.0);

        let frozen = a.orbit();
        a.set_auto_rotate(false);
        a.tick(20.0);
        assert_eq!(a.orbit(), frozen);

        a.set_auto_rotate(true);
        a.retarget(view(Stage::Nebula, None), 20.0);
        a.tick(30.0);
        assert_eq!(a.orbit(), frozen);
    }

    #[test]
    fn focus_camera_ignores_orbit_built_up_in_tree() {
        let mut a = animator(2);
        for frame in 0..=3600 {
            a.tick(frame as f32 / 60.0);
        }
        assert!(a.orbit() > 1.0);
        let before = a.camera_pose().position;

        a.retarget(view(Stage::Nebula, None), 60.0);
        assert!(a.camera_pose().position.distance(before) < 1e-4);
        assert_eq!(a.orbit(), 0.0);

        a.retarget(view(Stage::Focus, Some(0)), 60.0);
        a.tick(60.0 + CAMERA_MOTION.duration);
        assert_eq!(a.camera_pose().position, Vec3::new(0.0, 0.0, 20.0));
    }

    #[test]
    fn topper_is_red() {
        let a = animator(0);
        assert_eq!(a.topper().1.color, Color::from_hex(0xFF0000));
    }

    #[test]
    fn topper_hides_outside_tree() {
        let mut a = animator(0);
        assert!(a.topper().0.scale > 0.49);
        a.retarget(view(Stage::Nebula, None), 0.0);
        a.tick(2.0);
        assert_eq!(a.topper().0.scale, 0.0);
    }

    #[test]
    fn sway_settles_in_focus() {
        let mut a = animator(1);
        a.tick(5.0);
        a.retarget(view(Stage::Nebula, None), 5.0);
        a.retarget(view(Stage::Focus, Some(0)), 5.0);
        a.tick(7.0);
        let (_, float) = float_offset(&Stage::Focus.profile().float, 7.0);
        assert!((a.group_transform().rotation.y - float.y).abs() < 1e-6);
    }

    #[test]
    fn render_writes_every_node() {
        let a = animator(3);
        let mut engine = HeadlessEngine::new();
        a.render(&mut engine);
        assert_eq!(engine.nodes.len(), 1 + 3 + 8 + 1);
        assert_eq!(engine.particle_count, 64);
        assert!(engine.camera.is_some());
    }
}
