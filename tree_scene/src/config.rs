//! Scene tuning, deserialized from the `[scene]` table of the app config.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SceneError};

pub const DEFAULT_PARTICLE_COUNT: usize = 5500;
pub const DEFAULT_ORNAMENT_COUNT: usize = 40;

const MAX_PARTICLES: usize = 200_000;
const MAX_ORNAMENTS: usize = 1_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConfig {
    pub particle_count: usize,
    pub ornament_count: usize,
    /// Seed for layout jitter; `None` seeds from the OS.
    pub seed:           Option<u64>,
    /// Messages the wish toggle picks from.
    pub wishes:         Vec<String>,
}

impl Default for SceneConfig {
    fn default() -> Self {
        SceneConfig {
            particle_count: DEFAULT_PARTICLE_COUNT,
            ornament_count: DEFAULT_ORNAMENT_COUNT,
            seed:           None,
            wishes:         default_wishes(),
        }
    }
}

fn default_wishes() -> Vec<String> {
    [
        "May your days be merry and bright",
        "Peace on earth, and a warm fire at home",
        "Wishing you a year full of small wonders",
        "Let it snow, and let the lights shine",
        "Joy to everyone gathered here tonight",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

impl SceneConfig {
    pub fn validate(&self) -> Result<()> {
        if self.particle_count > MAX_PARTICLES {
            return Err(SceneError::config(format!(
                "particle_count {} exceeds {}", self.particle_count, MAX_PARTICLES
            )));
        }
        if self.ornament_count > MAX_ORNAMENTS {
            return Err(SceneError::config(format!(
                "ornament_count {} exceeds {}", self.ornament_count, MAX_ORNAMENTS
            )));
        }
        if self.wishes.iter().any(|w| w.trim().is_empty()) {
            return Err(SceneError::config("wishes must not contain blank messages"));
        }
        Ok(())
    }
}
