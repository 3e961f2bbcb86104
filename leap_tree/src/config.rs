//! Application configuration, loaded from TOML.
//!
//! ```toml
//! photos = ["family/2023.jpg", "family/2024.jpg"]
//!
//! [window]
//! width  = 960
//! height = 640
//!
//! [scene]
//! particle_count = 5500
//! ornament_count = 40
//! seed           = 7
//!
//! [gesture]
//! cooldown_ms  = 800
//! start_active = false
//! ```
//!
//! Every table and key is optional.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tree_scene::{PhotoRef, SceneConfig};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TreeConfig {
    pub window:  WindowConfig,
    pub scene:   SceneConfig,
    pub gesture: GestureConfig,
    /// Photos shown at start-up.
    pub photos:  Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub width:  usize,
    pub height: usize,
    pub title:  String,
}

impl Default for WindowConfig {
    fn default() -> Self {
        WindowConfig { width: 960, height: 640, title: "Leap Tree".to_string() }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Minimum spacing between dispatched gestures.
    pub cooldown_ms:  u64,
    /// Start with the hand-tracking pipeline running.
    pub start_active: bool,
}

impl Default for GestureConfig {
    fn default() -> Self {
        GestureConfig { cooldown_ms: 800, start_active: false }
    }
}

impl GestureConfig {
    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}

impl TreeConfig {
    /// Load from `path`, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(TreeConfig::default());
        };
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: TreeConfig = toml::from_str(content).context("Failed to parse config (invalid TOML)")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window.width < 160 || self.window.height < 120 {
            bail!("window must be at least 160×120, got {}×{}", self.window.width, self.window.height);
        }
        if self.gesture.cooldown_ms > 10_000 {
            bail!("gesture.cooldown_ms {} is longer than 10 s", self.gesture.cooldown_ms);
        }
        self.scene.validate().context("Invalid [scene] table")?;
        Ok(())
    }

    pub fn photo_refs(&self) -> Result<Vec<PhotoRef>> {
        self.photos
            .iter()
            .map(|p| PhotoRef::new(p.as_str()).context("Invalid entry in photos"))
            .collect()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
