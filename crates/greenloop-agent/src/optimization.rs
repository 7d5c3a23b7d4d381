//! Optimization policy: periodically revise the setpoints.

use greenloop_core::config::bounds;
use greenloop_core::oracle::DecisionOracle;
use greenloop_core::state::StateSnapshot;

use crate::decision::OptimizationDecision;
use crate::error::PolicyError;
use crate::mode::DecisionMode;
use crate::prompts::PromptBuilder;

/// Control log entries inspected by the deterministic optimizer.
pub const RECENT_CONTROL_WINDOW: usize = 5;

/// More ON entries than this in the window counts as a busy system.
pub const BUSY_THRESHOLD: usize = 3;

/// Target temperature bump applied when the system is busy but on target.
pub const TEMPERATURE_STEP: f64 = 0.5;

const DEFAULT_REASON: &str = "Oracle optimization decision";

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

fn clamp_f64(v: f64, (lo, hi): (f64, f64)) -> f64 {
    v.max(lo).min(hi)
}

/// Count recent control entries that report something switched ON.
pub fn recent_on_actions(control_log: &[String]) -> usize {
    StateSnapshot::tail(control_log, RECENT_CONTROL_WINDOW)
        .iter()
        .filter(|entry| entry.contains("ON"))
        .count()
}

pub struct OptimizationPolicy {
    mode: DecisionMode,
    prompts: PromptBuilder,
}

impl OptimizationPolicy {
    pub fn new(mode: DecisionMode) -> Self {
        Self {
            mode,
            prompts: PromptBuilder::new(),
        }
    }

    pub async fn run(&self, state: StateSnapshot) -> StateSnapshot {
        tracing::info!("[Optimization] Analyzing performance...");

        let oracle = match &self.mode {
            DecisionMode::OracleBacked(oracle) => oracle,
            DecisionMode::Deterministic => return self.fallback(state),
        };

        match self.consult(oracle.as_ref(), &state).await {
            Ok(decision) => self.apply_decision(state, decision),
            Err(e) => {
                tracing::warn!(error = %e, "[Optimization] Oracle decision rejected, using fallback");
                self.fallback(state)
            }
        }
    }

    async fn consult(
        &self,
        oracle: &dyn DecisionOracle,
        state: &StateSnapshot,
    ) -> Result<OptimizationDecision, PolicyError> {
        let prompt = self.prompts.optimization_prompt(state);
        tracing::debug!(prompt = %prompt, "[Optimization] Prompt");

        let raw = oracle.complete(&prompt).await?;
        OptimizationDecision::parse(&raw).map_err(|e| {
            tracing::warn!(raw = %raw, "[Optimization] Unusable oracle response");
            PolicyError::from(e)
        })
    }

    fn apply_decision(
        &self,
        mut state: StateSnapshot,
        decision: OptimizationDecision,
    ) -> StateSnapshot {
        if let Some(v) = decision.target_temperature {
            state.target_temperature = round1(clamp_f64(v, bounds::TARGET_TEMPERATURE));
        }
        if let Some(v) = decision.target_humidity {
            state.target_humidity = round1(clamp_f64(v, bounds::TARGET_HUMIDITY));
        }
        if let Some(v) = decision.target_soil_moisture {
            state.target_soil_moisture = round1(clamp_f64(v, bounds::TARGET_SOIL_MOISTURE));
        }
        if let Some(v) = decision.target_light_hours {
            let (lo, hi) = bounds::TARGET_LIGHT_HOURS;
            // clamped into [4, 20], so the cast cannot truncate
            state.target_light_hours = v.clamp(lo, hi) as u32;
        }
        let reason = decision.reason.unwrap_or_else(|| DEFAULT_REASON.to_string());

        let ts = state.timestamp_label();
        let log_entry = format!(
            "[{}] Oracle optimization: T={}°C, RH={}%, Soil={}%, LightHours={}",
            ts,
            state.target_temperature,
            state.target_humidity,
            state.target_soil_moisture,
            state.target_light_hours
        );
        let why_entry = format!("[{}] Oracle optimization reason: {}", ts, reason);

        tracing::info!("{}", log_entry);
        tracing::info!("{}", why_entry);
        state.record_optimization_with_reason(log_entry, why_entry);
        state
    }

    /// Deterministic optimization.
    ///
    /// Raises the target temperature by half a degree when the actuators
    /// have been busy and the temperature already sits within a degree of
    /// its target; otherwise only logs.
    pub fn fallback(&self, mut state: StateSnapshot) -> StateSnapshot {
        tracing::info!("[Optimization] Deterministic optimization...");

        let recent_actions = recent_on_actions(&state.control_log);
        let (optimization, why) = if recent_actions > BUSY_THRESHOLD {
            let near_target = (state.temperature - state.target_temperature).abs() < 1.0;
            let raised =
                round1(state.target_temperature + TEMPERATURE_STEP).min(bounds::TARGET_TEMPERATURE.1);
            if near_target && raised > state.target_temperature {
                state.target_temperature = raised;
                (
                    "Adjusted target temp for efficiency",
                    format!("recent_actions={} (>3) and |T-Target|<1", recent_actions),
                )
            } else if near_target {
                (
                    "System operating efficiently",
                    format!(
                        "recent_actions={} and |T-Target|<1, target at or above the {}°C limit",
                        recent_actions,
                        bounds::TARGET_TEMPERATURE.1
                    ),
                )
            } else {
                (
                    "System operating efficiently",
                    format!("recent_actions={} but |T-Target|≥1", recent_actions),
                )
            }
        } else {
            (
                "System stable, no optimization needed",
                format!("recent_actions={} (≤3)", recent_actions),
            )
        };

        let log_entry = format!("[{}] {} ({})", state.timestamp_label(), optimization, why);
        tracing::info!("{}", log_entry);
        state.record_optimization(log_entry);
        state
    }
}
