//! Control policy: choose actuator states from the current readings.
//!
//! The oracle-backed path asks the decision oracle and applies its answer
//! verbatim. The deterministic path is a set of hysteresis rules around the
//! setpoints. Any oracle failure falls through to the deterministic path,
//! so the policy itself never fails.

use greenloop_core::gateway::DynActuatorGateway;
use greenloop_core::oracle::DecisionOracle;
use greenloop_core::state::{AlertLevel, StateSnapshot};

use crate::decision::ControlDecision;
use crate::error::PolicyError;
use crate::mode::DecisionMode;
use crate::prompts::PromptBuilder;

/// Deterministic control bands.
pub mod bands {
    /// Heater below `target - TEMPERATURE`, fan above `target + TEMPERATURE`.
    pub const TEMPERATURE: f64 = 2.0;
    /// Fan forced on above `target + HUMIDITY`.
    pub const HUMIDITY: f64 = 5.0;
    /// Pump on below `target - SOIL_MOISTURE`.
    pub const SOIL_MOISTURE: f64 = 5.0;
    /// Grow lights on below this many lux.
    pub const LIGHT_LUX: f64 = 1000.0;
}

const DEFAULT_REASON: &str = "Oracle policy decision";

pub struct ControlPolicy {
    mode: DecisionMode,
    actuators: DynActuatorGateway,
    prompts: PromptBuilder,
}

impl ControlPolicy {
    pub fn new(mode: DecisionMode, actuators: DynActuatorGateway) -> Self {
        Self {
            mode,
            actuators,
            prompts: PromptBuilder::new(),
        }
    }

    pub async fn run(&self, state: StateSnapshot) -> StateSnapshot {
        let oracle = match &self.mode {
            DecisionMode::OracleBacked(oracle) => oracle,
            DecisionMode::Deterministic => return self.fallback(state),
        };

        tracing::info!("[Control] Evaluating control actions via {}...", oracle.name());
        match self.consult(oracle.as_ref(), &state).await {
            Ok(decision) => self.apply_decision(state, decision),
            Err(e) => {
                tracing::warn!(error = %e, "[Control] Oracle decision rejected, using fallback");
                self.fallback(state)
            }
        }
    }

    async fn consult(
        &self,
        oracle: &dyn DecisionOracle,
        state: &StateSnapshot,
    ) -> Result<ControlDecision, PolicyError> {
        let prompt = self.prompts.control_prompt(state);
        tracing::debug!(prompt = %prompt, "[Control] Prompt");

        let raw = oracle.complete(&prompt).await?;
        ControlDecision::parse(&raw).map_err(|e| {
            tracing::warn!(raw = %raw, "[Control] Unusable oracle response");
            PolicyError::from(e)
        })
    }

    fn apply_decision(&self, mut state: StateSnapshot, decision: ControlDecision) -> StateSnapshot {
        let heater_on = decision.heater_on.unwrap_or(state.heater_on);
        let fan_on = decision.fan_on.unwrap_or(state.fan_on);
        let pump_on = decision.water_pump_on.unwrap_or(state.water_pump_on);
        let lights_on = decision.grow_lights_on.unwrap_or(state.grow_lights_on);
        let alert_level = decision.alert_level.unwrap_or(AlertLevel::Normal);
        let reason = decision.reason.unwrap_or_else(|| DEFAULT_REASON.to_string());

        state.heater_on = heater_on;
        state.fan_on = fan_on;
        state.water_pump_on = pump_on;
        state.grow_lights_on = lights_on;
        state.alert_level = alert_level;

        let (soil_before, soil_after) = if pump_on {
            state.irrigate()
        } else {
            (state.soil_moisture, state.soil_moisture)
        };

        let actions = [
            self.actuators.set_heater(heater_on),
            self.actuators.set_fan(fan_on),
            self.actuators.set_water_pump(pump_on),
            self.actuators.set_grow_lights(lights_on),
        ];

        let ts = state.timestamp_label();
        let log_entry = format!("[{}] Control actions (oracle): {}", ts, actions.join(", "));
        let why_entry = format!(
            "[{}] Oracle reason: {} (alert_level={}, soil_before={}, soil_after={})",
            ts, reason, alert_level, soil_before, soil_after
        );

        tracing::info!("{}", log_entry);
        tracing::info!("{}", why_entry);
        state.record_control(log_entry, why_entry);
        state
    }

    /// Deterministic rule-based control.
    ///
    /// Leaves `alert_level` untouched.
    pub fn fallback(&self, mut state: StateSnapshot) -> StateSnapshot {
        tracing::info!("[Control] Deterministic control policy...");

        let temp = state.temperature;
        let humidity = state.humidity;
        let soil = state.soil_moisture;
        let light = state.light_level;
        let low = state.target_temperature - bands::TEMPERATURE;
        let high = state.target_temperature + bands::TEMPERATURE;
        let humidity_limit = state.target_humidity + bands::HUMIDITY;
        let soil_limit = state.target_soil_moisture - bands::SOIL_MOISTURE;

        let mut actions = Vec::new();
        let mut reasons = Vec::new();

        if temp < low {
            state.heater_on = true;
            state.fan_on = false;
            reasons.push(format!("Heater ON because T={} < {} (target-2)", temp, low));
        } else if temp > high {
            state.heater_on = false;
            state.fan_on = true;
            reasons.push(format!("Fan ON, Heater OFF because T={} > {} (target+2)", temp, high));
        } else {
            state.heater_on = false;
            state.fan_on = false;
            reasons.push(format!("T in band [{},{}] → Heater OFF, Fan OFF", low, high));
        }
        actions.push(self.actuators.set_heater(state.heater_on));
        actions.push(self.actuators.set_fan(state.fan_on));

        if humidity > humidity_limit {
            state.fan_on = true;
            actions.push(self.actuators.set_fan(true));
            reasons.push(format!(
                "Fan ON due to RH={} > {} (target+5)",
                humidity, humidity_limit
            ));
        }

        if soil < soil_limit {
            state.water_pump_on = true;
            actions.push(self.actuators.set_water_pump(true));
            let (before, after) = state.irrigate();
            reasons.push(format!(
                "Pump ON because soil={} < {}; soil {}→{}",
                soil, soil_limit, before, after
            ));
        } else {
            state.water_pump_on = false;
            actions.push(self.actuators.set_water_pump(false));
            reasons.push(format!("Pump OFF because soil={} ≥ {}", soil, soil_limit));
        }

        if light < bands::LIGHT_LUX {
            state.grow_lights_on = true;
            reasons.push(format!("Lights ON because light={} < 1000 lux", light));
        } else {
            state.grow_lights_on = false;
            reasons.push(format!("Lights OFF because light={} ≥ 1000 lux", light));
        }
        actions.push(self.actuators.set_grow_lights(state.grow_lights_on));

        let ts = state.timestamp_label();
        let log_entry = format!("[{}] Control actions (fallback): {}", ts, actions.join(", "));
        let bullets: Vec<String> = reasons.iter().map(|r| format!("  • {}", r)).collect();
        let why_entry = format!("[{}] Reasons (fallback):\n{}", ts, bullets.join("\n"));

        tracing::info!("{}", log_entry);
        tracing::debug!("{}", why_entry);
        state.record_control(log_entry, why_entry);
        state
    }
}
