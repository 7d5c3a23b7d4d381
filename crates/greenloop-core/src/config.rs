//! Configuration defaults, environment helpers and the run configuration file.
//!
//! Constants live in small modules so every crate reads the same values.
//! `GreenhouseConfig` is the optional TOML file consumed by the driver; CLI
//! flags override whatever it contains.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::state::StateSnapshot;

/// Default endpoints.
pub mod endpoints {
    pub const OLLAMA: &str = "http://localhost:11434";
}

/// Default models.
pub mod models {
    pub const OLLAMA_DEFAULT: &str = "llama3.1";
}

/// Environment variable names and lookups.
pub mod env_vars {
    pub const OLLAMA_ENDPOINT: &str = "OLLAMA_ENDPOINT";
    pub const LLM_MODEL: &str = "LLM_MODEL";
    /// Oracle request timeout in seconds
    pub const LLM_TIMEOUT_SECS: &str = "GREENLOOP_LLM_TIMEOUT_SECS";
    /// Emit JSON logs when set to `true`
    pub const LOG_JSON: &str = "GREENLOOP_LOG_JSON";

    /// Oracle timeout from the environment, or the default.
    pub fn llm_timeout_secs() -> u64 {
        std::env::var(LLM_TIMEOUT_SECS)
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(super::defaults::ORACLE_TIMEOUT_SECS)
    }

    pub fn log_json() -> bool {
        std::env::var(LOG_JSON)
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(false)
    }
}

/// Run defaults.
pub mod defaults {
    pub const CYCLES: u32 = 5;
    pub const INTERVAL_SECS: u64 = 2;
    pub const ORACLE_TIMEOUT_SECS: u64 = 180;
    pub const ORACLE_TEMPERATURE: f32 = 0.0;
}

/// Clamp domains for setpoints chosen by the optimization oracle.
pub mod bounds {
    pub const TARGET_TEMPERATURE: (f64, f64) = (10.0, 35.0);
    pub const TARGET_HUMIDITY: (f64, f64) = (20.0, 90.0);
    pub const TARGET_SOIL_MOISTURE: (f64, f64) = (10.0, 90.0);
    pub const TARGET_LIGHT_HOURS: (i64, i64) = (4, 20);
}

/// Normalize an Ollama endpoint (strip `/v1` and trailing slashes).
///
/// Ollama is called through its native API, which has no `/v1` prefix.
pub fn normalize_ollama_endpoint(endpoint: impl Into<String>) -> String {
    let endpoint = endpoint.into();
    let trimmed = endpoint.trim_end_matches('/');
    trimmed.strip_suffix("/v1").unwrap_or(trimmed).to_string()
}

/// Oracle section of the config file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleSettings {
    pub endpoint: String,
    pub model: String,
    pub timeout_secs: u64,
    pub temperature: f32,
}

impl Default for OracleSettings {
    fn default() -> Self {
        Self {
            endpoint: endpoints::OLLAMA.to_string(),
            model: models::OLLAMA_DEFAULT.to_string(),
            timeout_secs: defaults::ORACLE_TIMEOUT_SECS,
            temperature: defaults::ORACLE_TEMPERATURE,
        }
    }
}

/// Optional overrides for the setpoints a run starts with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InitialSetpoints {
    pub target_temperature: Option<f64>,
    pub target_humidity: Option<f64>,
    pub target_soil_moisture: Option<f64>,
    pub target_light_hours: Option<u32>,
}

/// Run configuration, usually loaded from `greenloop.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GreenhouseConfig {
    /// Outer cycles to run.
    pub cycles: u32,
    /// Pause between outer cycles.
    pub interval_secs: u64,
    /// Cap on critical re-entries inside one cycle. `None` means unbounded.
    pub max_passes_per_cycle: Option<u32>,
    /// Seed for the simulated sensors.
    pub sensor_seed: Option<u64>,
    /// Oracle settings. Absent means deterministic policies only.
    pub oracle: Option<OracleSettings>,
    pub initial: InitialSetpoints,
}

impl Default for GreenhouseConfig {
    fn default() -> Self {
        Self {
            cycles: defaults::CYCLES,
            interval_secs: defaults::INTERVAL_SECS,
            max_passes_per_cycle: None,
            sensor_seed: None,
            oracle: None,
            initial: InitialSetpoints::default(),
        }
    }
}

fn check_range(name: &str, value: f64, (lo, hi): (f64, f64)) -> Result<()> {
    if !(lo..=hi).contains(&value) {
        return Err(Error::config(format!(
            "{} = {} is outside [{}, {}]",
            name, value, lo, hi
        )));
    }
    Ok(())
}

impl GreenhouseConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Self = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        tracing::debug!("Loaded config from {}", path.display());
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.cycles == 0 {
            return Err(Error::config("cycles must be at least 1"));
        }
        if self.max_passes_per_cycle == Some(0) {
            return Err(Error::config("max_passes_per_cycle must be at least 1"));
        }
        if let Some(oracle) = &self.oracle {
            if oracle.timeout_secs == 0 {
                return Err(Error::config("oracle.timeout_secs must be at least 1"));
            }
            if oracle.model.trim().is_empty() {
                return Err(Error::config("oracle.model must not be empty"));
            }
        }

        let initial = &self.initial;
        if let Some(v) = initial.target_temperature {
            check_range("initial.target_temperature", v, bounds::TARGET_TEMPERATURE)?;
        }
        if let Some(v) = initial.target_humidity {
            check_range("initial.target_humidity", v, bounds::TARGET_HUMIDITY)?;
        }
        if let Some(v) = initial.target_soil_moisture {
            check_range("initial.target_soil_moisture", v, bounds::TARGET_SOIL_MOISTURE)?;
        }
        if let Some(v) = initial.target_light_hours {
            let (lo, hi) = bounds::TARGET_LIGHT_HOURS;
            if !(lo..=hi).contains(&i64::from(v)) {
                return Err(Error::config(format!(
                    "initial.target_light_hours = {} is outside [{}, {}]",
                    v, lo, hi
                )));
            }
        }
        Ok(())
    }

    /// Build the snapshot a run starts from, applying setpoint overrides.
    pub fn initial_snapshot(&self) -> StateSnapshot {
        let mut state = StateSnapshot::initial();
        let initial = &self.initial;
        if let Some(v) = initial.target_temperature {
            state.target_temperature = v;
        }
        if let Some(v) = initial.target_humidity {
            state.target_humidity = v;
        }
        if let Some(v) = initial.target_soil_moisture {
            state.target_soil_moisture = v;
        }
        if let Some(v) = initial.target_light_hours {
            state.target_light_hours = v;
        }
        state
    }
}
