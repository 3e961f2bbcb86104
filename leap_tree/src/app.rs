//! Top-level application loop.
//!
//! `App` owns the `TreeScene` and the `GesturePipeline`.  Each frame it
//! applies window commands, polls the pipeline for at most one debounced
//! gesture, feeds it to the scene, ticks the animator and renders.

use std::sync::mpsc::{self, Sender};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use hand_gesture::{GestureKind, GesturePipeline, HandTrackingProvider};
use tracing::{info, warn};
use tree_scene::{HeadlessEngine, PhotoRef, RenderingEngine, Stage, StageEffect, TreeScene};

use crate::config::TreeConfig;
use crate::tracking::{SimHandProvider, SimInput};
use crate::visualizer::{Hud, Visualizer};

// ════════════════════════════════════════════════════════════════════════════
// Command
// ════════════════════════════════════════════════════════════════════════════

/// Window-level actions that do not go through the hand tracker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    SetStage(Stage),
    ToggleWish,
    /// Start or stop hand tracking.
    ToggleCamera,
    AddPhotos(Vec<PhotoRef>),
    Quit,
}

// ════════════════════════════════════════════════════════════════════════════
// App
// ════════════════════════════════════════════════════════════════════════════

pub struct App {
    scene:      TreeScene,
    pipeline:   GesturePipeline,
    pub status: String,
}

impl App {
    pub fn new(cfg: &TreeConfig, provider: Box<dyn HandTrackingProvider>) -> Result<Self> {
        let mut scene = TreeScene::new(&cfg.scene).context("Failed to build scene")?;
        let photos = cfg.photo_refs()?;
        if !photos.is_empty() {
            scene.append_photos(photos, 0.0);
        }

        let provider_name = provider.name().to_string();
        let mut pipeline = GesturePipeline::new(provider, cfg.gesture.cooldown());
        let mut status = format!("Ready: {} (press C to start tracking)", provider_name);
        if cfg.gesture.start_active {
            match pipeline.activate() {
                Ok(())  => status = format!("Tracking with {}", provider_name),
                Err(e)  => {
                    warn!(error = %e, "hand tracking unavailable");
                    status = format!("Tracking failed: {}", e);
                }
            }
        }

        Ok(App { scene, pipeline, status })
    }

    pub fn scene(&self) -> &TreeScene {
        &self.scene
    }

    pub fn camera_active(&self) -> bool {
        self.pipeline.is_active()
    }

    // ── process one Command ──────────────────────────────────────────────

    /// Apply a command; returns `false` when the app should exit.
    pub fn handle_command(&mut self, cmd: Command, clock: f32) -> bool {
        match cmd {
            Command::SetStage(stage) => {
                self.scene.set_stage(stage, clock);
                self.status = format!("Stage → {}", stage);
            }

            Command::ToggleWish => {
                let shown = self.scene.toggle_wish();
                self.status = match (self.scene.wish().is_active(), shown) {
                    (true, Some(wish)) => format!("Wish: {}", wish),
                    (true, None)       => "Wish on".to_string(),
                    (false, _)         => "Wish hidden".to_string(),
                };
            }

            Command::ToggleCamera => {
                self.status = match self.pipeline.toggle() {
                    Ok(true)  => "Hand tracking on".to_string(),
                    Ok(false) => "Hand tracking off".to_string(),
                    Err(e)    => {
                        warn!(error = %e, "could not start hand tracking");
                        format!("Tracking failed: {}", e)
                    }
                };
            }

            Command::AddPhotos(batch) => {
                let range = self.scene.append_photos(batch, clock);
                self.status = format!("Added {} photo(s), {} total", range.len(), self.scene.photos().len());
            }

            Command::Quit => return false,
        }
        true
    }

    // ── per-frame ────────────────────────────────────────────────────────

    /// Poll the tracker, apply any gesture and advance the animation.
    pub fn frame(&mut self, now: Instant, clock: f32) -> Option<GestureKind> {
        let gesture = self.pipeline.poll(now);
        if let Some(g) = gesture {
            self.status = match self.scene.handle_gesture(g, clock) {
                StageEffect::Entered { from, to }    => format!("{}: {} → {}", g, from, to),
                StageEffect::FocusAdvanced { index } => format!("{}: photo {}", g, index + 1),
                StageEffect::Unchanged               => format!("{}: no change", g),
            };
        }
        self.scene.tick(clock);
        gesture
    }

    pub fn hud(&self) -> Hud {
        Hud {
            stage:  self.scene.stage(),
            camera: self.camera_active(),
            photos: self.scene.photos().len(),
            status: self.status.clone(),
            wish:   self.scene.wish().message().map(str::to_owned),
        }
    }

    pub fn dropped_frames(&self) -> u64 {
        self.pipeline.dropped_frames()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// run() — the windowed loop
// ════════════════════════════════════════════════════════════════════════════

#[cfg(not(feature = "leap"))]
fn provider(sim_rx: mpsc::Receiver<SimInput>) -> Box<dyn HandTrackingProvider> {
    Box::new(SimHandProvider::new(sim_rx))
}

#[cfg(feature = "leap")]
fn provider(_sim_rx: mpsc::Receiver<SimInput>) -> Box<dyn HandTrackingProvider> {
    Box::new(crate::tracking::LeapHandProvider::new())
}

/// Open the window and run until it closes or `Q` is pressed.
///
/// Hand tracking is the keyboard simulator by default and a LeapMotion
/// controller with `--features leap`.
pub fn run(cfg: &TreeConfig) -> Result<()> {
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let mut vis = Visualizer::new(&cfg.window, sim_tx).context("Failed to open window")?;
    let mut app = App::new(cfg, provider(sim_rx))?;
    info!(width = cfg.window.width, height = cfg.window.height, "window open");

    while vis.is_open() {
        let clock = vis.elapsed();

        for cmd in vis.poll_input() {
            if !app.handle_command(cmd, clock) {
                info!("quit requested");
                return Ok(());
            }
        }

        app.frame(Instant::now(), clock);

        vis.hud = app.hud();
        app.scene().render(&mut vis).context("Failed to present frame")?;
    }

    Ok(())
}

// ════════════════════════════════════════════════════════════════════════════
// run_headless() — scripted, windowless
// ════════════════════════════════════════════════════════════════════════════

const HEADLESS_DT:   f32 = 1.0 / 60.0;
const HOLD_FRAMES:   usize = 60;
const HEADLESS_SCRIPT: [GestureKind; 5] = [
    GestureKind::Palm,
    GestureKind::Pointing,
    GestureKind::Palm,
    GestureKind::Victory,
    GestureKind::Fist,
];

/// Run `frames` frames against [`HeadlessEngine`] while the simulator cycles
/// through a fixed pose script.  Returns the stages visited.
pub fn run_headless(cfg: &TreeConfig, frames: usize) -> Result<Vec<Stage>> {
    let (sim_tx, sim_rx) = mpsc::channel::<SimInput>();
    let mut app = App::new(cfg, Box::new(SimHandProvider::new(sim_rx)))?;
    if !app.camera_active() {
        app.handle_command(Command::ToggleCamera, 0.0);
    }

    let mut engine = HeadlessEngine::new();
    let start = Instant::now();
    let mut visited = vec![app.scene().stage()];

    for frame in 0..frames {
        if frame % HOLD_FRAMES == 0 {
            let pose = HEADLESS_SCRIPT[(frame / HOLD_FRAMES) % HEADLESS_SCRIPT.len()];
            send_pose(&sim_tx, pose);
        }
        let clock = engine.elapsed();
        let now = start + Duration::from_secs_f32(clock);
        if app.frame(now, clock).is_some() {
            let stage = app.scene().stage();
            if visited.last() != Some(&stage) {
                visited.push(stage);
            }
        }
        app.scene().render(&mut engine)?;
        engine.advance(HEADLESS_DT);
    }

    info!(
        frames = engine.frames,
        dropped = app.dropped_frames(),
        stages = ?visited,
        "headless run finished"
    );
    Ok(visited)
}

fn send_pose(tx: &Sender<SimInput>, pose: GestureKind) {
    if tx.send(SimInput::Pose(Some(pose))).is_err() {
        warn!("simulator channel closed");
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
