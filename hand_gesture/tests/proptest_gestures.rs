use std::time::{Duration, Instant};

use hand_gesture::{
    classify, classify_frame, FingerState, GestureDebouncer, GestureKind, Landmark, LandmarkSet,
    DEFAULT_COOLDOWN,
};
use proptest::prelude::*;

fn arb_landmark() -> impl Strategy<Value = Landmark> {
    (0.0f32..1.0, 0.0f32..1.0, -0.2f32..0.2).prop_map(|(x, y, z)| Landmark::new(x, y, z))
}

fn arb_set() -> impl Strategy<Value = LandmarkSet> {
    prop::collection::vec(arb_landmark(), 0..30).prop_map(LandmarkSet::new)
}

fn arb_fingers() -> impl Strategy<Value = FingerState> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(
        |(thumb, index, middle, ring, pinky)| FingerState { thumb, index, middle, ring, pinky },
    )
}

fn arb_gesture() -> impl Strategy<Value = Option<GestureKind>> {
    prop_oneof![
        Just(None),
        Just(Some(GestureKind::Palm)),
        Just(Some(GestureKind::Fist)),
        Just(Some(GestureKind::Pointing)),
        Just(Some(GestureKind::Victory)),
    ]
}

proptest! {
    /// Property: arbitrary (possibly short) landmark sets never panic the classifier
    #[test]
    fn prop_classifier_total(sets in prop::collection::vec(arb_set(), 0..4)) {
        let _ = classify_frame(&sets);
        for set in &sets {
            if set.len() < 21 {
                prop_assert_eq!(classify(set), None);
            }
        }
    }

    /// Property: the decision depends only on the four finger flags
    #[test]
    fn prop_classification_matches_flags(fingers in arb_fingers()) {
        let set = LandmarkSet::from_fingers(&fingers);
        prop_assert_eq!(classify(&set), fingers.gesture());
    }

    /// Property: dispatched gestures never repeat back-to-back and are at
    /// least one cooldown apart
    #[test]
    fn prop_debounce_spacing(steps in prop::collection::vec((arb_gesture(), 0u64..400), 1..200)) {
        let mut debouncer = GestureDebouncer::default();
        let mut now = Instant::now();
        let mut previous: Option<(GestureKind, Instant)> = None;

        for (candidate, delta) in steps {
            now += Duration::from_millis(delta);
            if let Some(g) = debouncer.offer(candidate, now) {
                prop_assert_eq!(Some(g), candidate);
                if let Some((last, at)) = previous {
                    prop_assert_ne!(g, last);
                    prop_assert!(now.duration_since(at) >= DEFAULT_COOLDOWN);
                }
                previous = Some((g, now));
            }
        }
    }
}
