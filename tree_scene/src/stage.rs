//! The three-stage mode machine and its per-stage profile table.
//!
//! ## Transition table
//!
//! | Stage | Gesture | Effect |
//! |---|---|---|
//! | tree   | palm     | → nebula |
//! | nebula | fist     | → tree |
//! | nebula | pointing | → focus |
//! | focus  | victory  | → nebula |
//! | focus  | palm     | focus index ← (k + 1) mod max(photos, 1) |
//!
//! Every other pair is ignored.  [`StageMachine::set_stage`] bypasses the
//! table entirely (on-screen controls).

use std::fmt;

use hand_gesture::GestureKind;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::math::Vec3;

// ════════════════════════════════════════════════════════════════════════════
// Stage
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// Items wound around a cone.
    #[default]
    Tree,
    /// Items scattered on a wide ring.
    Nebula,
    /// Nebula with one photo pulled to the front.
    Focus,
}

impl Stage {
    pub const ALL: [Stage; 3] = [Stage::Tree, Stage::Nebula, Stage::Focus];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Tree   => "tree",
            Stage::Nebula => "nebula",
            Stage::Focus  => "focus",
        }
    }

    /// The per-stage constants every layout and animation decision reads.
    pub fn profile(self) -> &'static StageProfile {
        match self {
            Stage::Tree   => &TREE_PROFILE,
            Stage::Nebula => &NEBULA_PROFILE,
            Stage::Focus  => &FOCUS_PROFILE,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// StageProfile — lookup table
// ════════════════════════════════════════════════════════════════════════════

/// Where items are placed in a stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arrangement {
    Tree,
    Nebula,
    /// Nebula placement, focused photo pulled forward, everything else dimmed.
    Focus,
}

/// What the whole tree group's yaw does in a stage.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GroupSway {
    /// `sin(t·speed)·amplitude`
    Oscillate { speed: f32, amplitude: f32 },
    /// Ease back to zero over `duration` seconds.
    Settle { duration: f32 },
    /// Keep whatever yaw the group has.
    Hold,
}

/// Gentle bobbing of the whole group.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatParams {
    pub speed:              f32,
    pub rotation_intensity: f32,
    pub float_intensity:    f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StageProfile {
    pub arrangement:   Arrangement,
    /// Camera position (looking at the origin).
    pub camera:        Vec3,
    /// Height of the tree group origin.
    pub group_height:  f32,
    pub sway:          GroupSway,
    /// Particle cloud yaw rate, radians per second.
    pub particle_spin: f32,
    pub topper_scale:  f32,
    /// Base light intensity of the topper before its breathing pulse.
    pub topper_glow:   f32,
    /// Slow orbit of the camera while idle.
    pub auto_rotate:   bool,
    pub float:         FloatParams,
}

const CALM_FLOAT: FloatParams = FloatParams { speed: 1.5, rotation_intensity: 0.2,  float_intensity: 0.5 };
const STILL_FLOAT: FloatParams = FloatParams { speed: 0.5, rotation_intensity: 0.05, float_intensity: 0.2 };

pub const TREE_PROFILE: StageProfile = StageProfile {
    arrangement:   Arrangement::Tree,
    camera:        Vec3::new(0.0, 5.0, 20.0),
    group_height:  -5.0,
    sway:          GroupSway::Oscillate { speed: 0.2, amplitude: 0.05 },
    particle_spin: 0.05,
    topper_scale:  0.5,
    topper_glow:   1.5,
    auto_rotate:   true,
    float:         CALM_FLOAT,
};

pub const NEBULA_PROFILE: StageProfile = StageProfile {
    arrangement:   Arrangement::Nebula,
    camera:        Vec3::new(0.0, 2.0, 24.0),
    group_height:  1.0,
    sway:          GroupSway::Hold,
    particle_spin: 0.15,
    topper_scale:  0.0,
    topper_glow:   0.0,
    auto_rotate:   false,
    float:         CALM_FLOAT,
};

pub const FOCUS_PROFILE: StageProfile = StageProfile {
    arrangement:   Arrangement::Focus,
    camera:        Vec3::new(0.0, 0.0, 20.0),
    group_height:  1.0,
    sway:          GroupSway::Settle { duration: 1.0 },
    particle_spin: 0.15,
    topper_scale:  0.0,
    topper_glow:   0.0,
    auto_rotate:   false,
    float:         STILL_FLOAT,
};

// ════════════════════════════════════════════════════════════════════════════
// Transition table
// ════════════════════════════════════════════════════════════════════════════

/// Outcome of looking up `(stage, gesture)` in the table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Enter(Stage),
    AdvanceFocus,
    Ignore,
}

pub fn transition(stage: Stage, gesture: GestureKind) -> Transition {
    use GestureKind::*;
    match (stage, gesture) {
        (Stage::Tree,   Palm)     => Transition::Enter(Stage::Nebula),
        (Stage::Nebula, Fist)     => Transition::Enter(Stage::Tree),
        (Stage::Nebula, Pointing) => Transition::Enter(Stage::Focus),
        (Stage::Focus,  Victory)  => Transition::Enter(Stage::Nebula),
        (Stage::Focus,  Palm)     => Transition::AdvanceFocus,
        _                         => Transition::Ignore,
    }
}

/// `(k + 1) mod max(count, 1)`: zero photos always yields 0.
pub fn next_focus(current: usize, photo_count: usize) -> usize {
    (current + 1) % photo_count.max(1)
}

// ════════════════════════════════════════════════════════════════════════════
// StageMachine
// ════════════════════════════════════════════════════════════════════════════

/// What applying an input did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StageEffect {
    Unchanged,
    Entered { from: Stage, to: Stage },
    FocusAdvanced { index: usize },
}

impl StageEffect {
    pub fn changed(&self) -> bool {
        !matches!(self, StageEffect::Unchanged)
    }
}

/// The stage together with the focus index, which only exists in focus.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StageView {
    pub stage: Stage,
    pub focus: Option<usize>,
}

#[derive(Clone, Debug, Default)]
pub struct StageMachine {
    stage:       Stage,
    focus_index: usize,
}

impl StageMachine {
    pub fn new(stage: Stage) -> Self {
        StageMachine { stage, focus_index: 0 }
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    /// The focus index while in focus, `None` otherwise.
    pub fn focus_index(&self) -> Option<usize> {
        (self.stage == Stage::Focus).then_some(self.focus_index)
    }

    pub fn view(&self) -> StageView {
        StageView { stage: self.stage, focus: self.focus_index() }
    }

    /// Feed one dispatched gesture through the transition table.
    pub fn apply_gesture(&mut self, gesture: GestureKind, photo_count: usize) -> StageEffect {
        match transition(self.stage, gesture) {
            Transition::Enter(to) => self.enter(to),
            Transition::AdvanceFocus => {
                self.focus_index = next_focus(self.focus_index, photo_count);
                info!(index = self.focus_index, photos = photo_count, "focus advanced");
                StageEffect::FocusAdvanced { index: self.focus_index }
            }
            Transition::Ignore => {
                debug!(stage = %self.stage, %gesture, "gesture has no effect in this stage");
                StageEffect::Unchanged
            }
        }
    }

    /// External command: unconditional.
    pub fn set_stage(&mut self, stage: Stage) -> StageEffect {
        if stage == self.stage {
            return StageEffect::Unchanged;
        }
        self.enter(stage)
    }

    /// Keep the focus index valid after the photo list changed.
    pub fn clamp_focus(&mut self, photo_count: usize) {
        self.focus_index %= photo_count.max(1);
    }

    fn enter(&mut self, to: Stage) -> StageEffect {
        let from = self.stage;
        self.stage = to;
        info!(%from, %to, "stage changed");
        StageEffect::Entered { from, to }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
