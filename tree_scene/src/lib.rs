//! # tree_scene
//!
//! A three-stage decorative scene (tree / nebula / focus) whose items glide
//! between procedurally computed layouts.
//!
//! ```text
//!  GestureKind ──► StageMachine ──► StageView ──► Animator ──► RenderingEngine
//!                  (table lookup)   (stage, focus)  (tweens)     (SceneNode setters)
//! ```
//!
//! ## Stages
//!
//! | Stage | Photos | Ornaments | Particles | Camera |
//! |---|---|---|---|---|
//! | `Tree`   | cone spiral            | cone spiral, tiered size | filled cone | (0, 5, 20), orbiting |
//! | `Nebula` | evenly spaced on ring  | scattered on ring        | thick ring  | (0, 2, 24) |
//! | `Focus`  | one pulled to front, rest dimmed | dimmed     | dimmed ring | (0, 0, 20) |
//!
//! ## Quick start
//!
//! ```rust
//! use hand_gesture::GestureKind;
//! use tree_scene::{HeadlessEngine, SceneConfig, Stage, TreeScene};
//!
//! let cfg = SceneConfig { particle_count: 50, seed: Some(1), ..SceneConfig::default() };
//! let mut scene = TreeScene::new(&cfg).unwrap();
//! scene.handle_gesture(GestureKind::Palm, 0.0);
//! assert_eq!(scene.stage(), Stage::Nebula);
//!
//! let mut engine = HeadlessEngine::new();
//! scene.tick(1.5);
//! scene.render(&mut engine).unwrap();
//! ```

pub mod math;
pub mod tween;
pub mod stage;
pub mod layout;
pub mod items;
pub mod render;
pub mod animator;
pub mod wish;
pub mod config;
pub mod error;
pub mod scene;

pub use math::{Color, Euler, EulerOrder, Transform, Vec3};
pub use tween::{Ease, Lerp, Motion, Smoothed, Tween};
pub use stage::{Stage, StageEffect, StageMachine, StageProfile, StageView};
pub use items::{PhotoRef, PhotoStore};
pub use render::{CameraPose, HeadlessEngine, Material, NodeId, ParticleFrame, RenderingEngine, SceneNode};
pub use animator::Animator;
pub use wish::WishState;
pub use config::SceneConfig;
pub use error::{Result, SceneError};
pub use scene::TreeScene;
