use hand_gesture::GestureKind;
use proptest::prelude::*;
use tree_scene::layout::{
    nebula_transform, photo_tree_transform, ornament_tree_transform, NebulaPlacement,
};
use tree_scene::stage::{next_focus, transition, Transition};
use tree_scene::{Ease, Motion, Stage, StageEffect, StageMachine, Tween, Vec3};

fn arb_stage() -> impl Strategy<Value = Stage> {
    prop_oneof![Just(Stage::Tree), Just(Stage::Nebula), Just(Stage::Focus)]
}

fn arb_gesture() -> impl Strategy<Value = GestureKind> {
    prop_oneof![
        Just(GestureKind::Palm),
        Just(GestureKind::Fist),
        Just(GestureKind::Pointing),
        Just(GestureKind::Victory),
    ]
}

fn arb_vec3() -> impl Strategy<Value = Vec3> {
    (-20.0f32..20.0, -20.0f32..20.0, -20.0f32..20.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    /// Property: tree transforms are bit-identical across calls
    #[test]
    fn prop_tree_layout_deterministic(n in 1usize..200, seed in any::<usize>()) {
        let i = seed % n;
        let a = photo_tree_transform(i, n);
        let b = photo_tree_transform(i, n);
        prop_assert_eq!(a.position.x.to_bits(), b.position.x.to_bits());
        prop_assert_eq!(a.position.y.to_bits(), b.position.y.to_bits());
        prop_assert_eq!(a.position.z.to_bits(), b.position.z.to_bits());
        prop_assert_eq!(a.rotation.x.to_bits(), b.rotation.x.to_bits());
        prop_assert_eq!(a.rotation.y.to_bits(), b.rotation.y.to_bits());
        prop_assert_eq!(ornament_tree_transform(i, n), ornament_tree_transform(i, n));
    }

    /// Property: stored jitter reproduces the same nebula transform
    #[test]
    fn prop_nebula_stable_for_stored_jitter(height in -1.25f32..1.25, n in 1usize..100, seed in any::<usize>()) {
        let i = seed % n;
        let p = NebulaPlacement::Even { height };
        prop_assert_eq!(nebula_transform(p, i, n, 1.0), nebula_transform(p, i, n, 1.0));
    }

    /// Property: pairs absent from the table leave the stage unchanged
    #[test]
    fn prop_unlisted_pairs_are_noops(stage in arb_stage(), gesture in arb_gesture(), photos in 0usize..10) {
        let mut m = StageMachine::new(stage);
        let effect = m.apply_gesture(gesture, photos);
        match transition(stage, gesture) {
            Transition::Ignore => {
                prop_assert_eq!(effect, StageEffect::Unchanged);
                prop_assert_eq!(m.stage(), stage);
            }
            Transition::AdvanceFocus => prop_assert_eq!(m.stage(), Stage::Focus),
            Transition::Enter(to) => prop_assert_eq!(m.stage(), to),
        }
    }

    /// Property: palm in focus advances the index modulo the photo count
    #[test]
    fn prop_focus_cycle(photos in 0usize..20, presses in 1usize..40) {
        let mut m = StageMachine::new(Stage::Focus);
        let mut k = 0usize;
        for _ in 0..presses {
            m.apply_gesture(GestureKind::Palm, photos);
            k = next_focus(k, photos);
            prop_assert_eq!(m.focus_index(), Some(k));
            prop_assert!(k < photos.max(1));
        }
    }

    /// Property: after a mid-flight retarget the next value lies between the
    /// value at the switch and the new target
    #[test]
    fn prop_retarget_continuity(
        start in arb_vec3(),
        a in arb_vec3(),
        b in arb_vec3(),
        switch in 0.05f32..1.0,
        step in 0.001f32..0.1,
    ) {
        prop_assume!(a.distance(start) > 0.1 && b.distance(start) > 0.1);
        let motion = Motion::new(1.2, Ease::Power3Out);
        let mut tw = Tween::settled(start);
        tw.retarget(a, motion, 0.0);
        let here = tw.value_at(switch);
        prop_assume!(here.distance(b) > 0.1);

        tw.retarget(b, motion, switch);
        prop_assert_eq!(tw.value_at(switch), here);

        let next = tw.value_at(switch + step);
        let detour = here.distance(next) + next.distance(b) - here.distance(b);
        prop_assert!(detour.abs() < 1e-3);
        prop_assert!(next.distance(b) < here.distance(b));
    }
}
