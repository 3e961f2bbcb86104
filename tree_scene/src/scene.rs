//! `TreeScene` ties the stage machine, the photo store, the wish overlay and
//! the animator together behind one event-handling surface.

use std::ops::Range;

use hand_gesture::GestureKind;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::info;

use crate::animator::Animator;
use crate::config::SceneConfig;
use crate::error::Result;
use crate::items::{PhotoRef, PhotoStore};
use crate::render::RenderingEngine;
use crate::stage::{Stage, StageEffect, StageMachine, StageView};
use crate::wish::WishState;

pub struct TreeScene {
    machine:  StageMachine,
    store:    PhotoStore,
    wish:     WishState,
    animator: Animator,
    rng:      StdRng,
}

impl TreeScene {
    pub fn new(config: &SceneConfig) -> Result<Self> {
        config.validate()?;
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None       => StdRng::from_entropy(),
        };
        let animator = Animator::new(config.ornament_count, config.particle_count, &mut rng);
        info!(
            ornaments = config.ornament_count,
            particles = config.particle_count,
            seed = ?config.seed,
            "scene built"
        );
        Ok(TreeScene {
            machine: StageMachine::default(),
            store:   PhotoStore::new(),
            wish:    WishState::new(config.wishes.clone()),
            animator,
            rng,
        })
    }

    pub fn stage(&self) -> Stage {
        self.machine.stage()
    }

    pub fn view(&self) -> StageView {
        self.machine.view()
    }

    pub fn photos(&self) -> &PhotoStore {
        &self.store
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn wish(&self) -> &WishState {
        &self.wish
    }

    /// Feed one dispatched gesture; retargets the animator when it changed
    /// anything.
    pub fn handle_gesture(&mut self, gesture: GestureKind, clock: f32) -> StageEffect {
        let effect = self.machine.apply_gesture(gesture, self.store.len());
        self.after(effect, clock);
        effect
    }

    /// Unconditional stage command from the UI.
    pub fn set_stage(&mut self, stage: Stage, clock: f32) -> StageEffect {
        let effect = self.machine.set_stage(stage);
        self.after(effect, clock);
        effect
    }

    fn after(&mut self, effect: StageEffect, clock: f32) {
        if effect.changed() {
            self.animator.retarget(self.machine.view(), clock);
        }
    }

    /// Append a completed upload batch.
    pub fn append_photos(&mut self, batch: Vec<PhotoRef>, clock: f32) -> Range<usize> {
        self.animator.append_photos(&batch, &mut self.rng, clock);
        let range = self.store.append_batch(batch);
        self.machine.clamp_focus(self.store.len());
        info!(added = range.len(), total = self.store.len(), "photos added");
        range
    }

    /// Show or hide a wish; the idle orbit pauses while one is shown.
    pub fn toggle_wish(&mut self) -> Option<String> {
        let shown = self.wish.toggle(&mut self.rng).map(str::to_owned);
        self.animator.set_auto_rotate(!self.wish.is_active());
        shown
    }

    pub fn tick(&mut self, clock: f32) {
        self.animator.tick(clock);
    }

    /// Draw and present one frame.
    pub fn render<E: RenderingEngine + ?Sized>(&self, engine: &mut E) -> Result<()> {
        self.animator.render(engine);
        engine.present()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::HeadlessEngine;
    use GestureKind::*;

    fn scene() -> TreeScene {
        let cfg = SceneConfig { particle_count: 100, ornament_count: 10, seed: Some(7), ..SceneConfig::default() };
        TreeScene::new(&cfg).unwrap()
    }

    fn refs(names: &[&str]) -> Vec<PhotoRef> {
        names.iter().map(|n| PhotoRef::new(*n).unwrap()).collect()
    }

    #[test]
    fn end_to_end_stage_sequence() {
        let mut s = scene();
        let mut seen = vec![s.stage()];
        for (t, g) in [Palm, Pointing, Victory, Fist].into_iter().enumerate() {
            s.handle_gesture(g, t as f32);
            seen.push(s.stage());
        }
        assert_eq!(seen, vec![Stage::Tree, Stage::Nebula, Stage::Focus, Stage::Nebula, Stage::Tree]);
    }

    #[test]
    fn palm_cycles_focus_through_photos() {
        let mut s = scene();
        s.append_photos(refs(&["a", "b", "c"]), 0.0);
        s.set_stage(Stage::Focus, 0.0);
        s.handle_gesture(Palm, 0.1);
        assert_eq!(s.view().focus, Some(1));
        s.tick(2.0);
        let focused = s.animator().photo_transform(1).unwrap();
        assert!((focused.scale - 1.5).abs() < 1e-6);
    }

    #[test]
    fn same_seed_same_layout() {
        let mut a = scene();
        let mut b = scene();
        a.append_photos(refs(&["x", "y"]), 0.0);
        b.append_photos(refs(&["x", "y"]), 0.0);
        for (pa, pb) in a.animator().photos().iter().zip(b.animator().photos()) {
            assert_eq!(pa.nebula, pb.nebula);
        }
    }

    #[test]
    fn wish_pauses_orbit() {
        let mut s = scene();
        s.tick(0.0);
        assert!(s.toggle_wish().is_some());
        s.tick(10.0);
        assert_eq!(s.animator().orbit(), 0.0);
        assert!(s.toggle_wish().is_none());
        s.tick(20.0);
        assert!(s.animator().orbit() > 0.0);
    }

    #[test]
    fn wish_without_messages_still_pauses_orbit() {
        let cfg = SceneConfig { particle_count: 10, ornament_count: 2, seed: Some(3), wishes: Vec::new() };
        let mut s = TreeScene::new(&cfg).unwrap();
        s.tick(0.0);
        assert!(s.toggle_wish().is_none());
        assert!(s.wish().is_active());
        s.tick(10.0);
        assert_eq!(s.animator().orbit(), 0.0);
    }

    #[test]
    fn render_presents_frame() {
        let mut s = scene();
        s.append_photos(refs(&["a"]), 0.0);
        s.tick(0.5);
        let mut engine = HeadlessEngine::new();
        s.render(&mut engine).unwrap();
        assert_eq!(engine.frames, 1);
        assert_eq!(engine.particle_count, 100);
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = SceneConfig { particle_count: usize::MAX, ..SceneConfig::default() };
        assert!(TreeScene::new(&cfg).is_err());
    }
}
