//! Configuration: профили поведения агентов + параметры симуляции
//!
//! Профили грузятся из RON (`ProfileSet::from_ron_str` / `ProfileSet::load`),
//! встроенные значения — `AgentProfile::ally/enemy/boss`.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod profile;

pub use profile::{ActionConfig, AgentProfile, ProfileSet};

/// Ошибки загрузки и проверки конфигурации
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("RON parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid profile '{profile}': {reason}")]
    Invalid { profile: String, reason: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Параметры симуляции (fixed timestep + seed)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Частота FixedUpdate (Гц)
    pub tick_hz: f64,
    pub seed: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self { tick_hz: 60.0, seed: 42 }
    }
}

impl SimulationConfig {
    pub fn with_seed(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Длительность одного шага (сек)
    pub fn timestep(&self) -> f64 {
        1.0 / self.tick_hz
    }
}
