//! Prompt generation for the control and optimization oracles.
//!
//! ## Prompt Structure
//!
//! Both prompts are organized into sections:
//! 1. Role and objectives
//! 2. Current readings and/or targets
//! 3. Recent audit history
//! 4. Guidelines
//! 5. Required JSON response format

use greenloop_core::state::StateSnapshot;

/// Monitoring and control lines included in the control prompt (each).
pub const CONTROL_HISTORY_LINES: usize = 3;

/// Monitoring and control lines included in the optimization prompt (each).
pub const OPTIMIZATION_HISTORY_LINES: usize = 10;

/// Builds oracle prompts from a snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Prompt asking for actuator states and an alert level.
    pub fn control_prompt(&self, state: &StateSnapshot) -> String {
        let mut history: Vec<&str> = Vec::new();
        history.extend(
            StateSnapshot::tail(&state.monitoring_log, CONTROL_HISTORY_LINES)
                .iter()
                .map(String::as_str),
        );
        history.extend(
            StateSnapshot::tail(&state.control_log, CONTROL_HISTORY_LINES)
                .iter()
                .map(String::as_str),
        );
        let history = if history.is_empty() {
            "No prior history (first cycle).".to_string()
        } else {
            history.join("\n")
        };

        let mut prompt = String::from(Self::CONTROL_ROLE);
        prompt.push_str("\nYou are given:\n");
        prompt.push_str("- Current sensor readings:\n");
        prompt.push_str(&format!("  - temperature_c: {}\n", state.temperature));
        prompt.push_str(&format!("  - humidity_percent: {}\n", state.humidity));
        prompt.push_str(&format!("  - soil_moisture_percent: {}\n", state.soil_moisture));
        prompt.push_str(&format!("  - light_level_lux: {}\n", state.light_level));
        prompt.push('\n');
        prompt.push_str(&Self::targets_section(state));
        prompt.push('\n');
        prompt.push_str(&format!("- Previous alert_level: {}\n\n", state.alert_level));
        prompt.push_str("- Recent history (monitoring + control logs, most recent last):\n");
        prompt.push_str(&history);
        prompt.push_str("\n\n");
        prompt.push_str(Self::CONTROL_GUIDELINES);
        prompt.push('\n');
        prompt.push_str(Self::CONTROL_FORMAT);
        prompt
    }

    /// Prompt asking for revised setpoints.
    pub fn optimization_prompt(&self, state: &StateSnapshot) -> String {
        let monitor = StateSnapshot::tail(&state.monitoring_log, OPTIMIZATION_HISTORY_LINES);
        let control = StateSnapshot::tail(&state.control_log, OPTIMIZATION_HISTORY_LINES);
        let monitor = if monitor.is_empty() {
            "No monitoring logs.".to_string()
        } else {
            monitor.join("\n")
        };
        let control = if control.is_empty() {
            "No control logs.".to_string()
        } else {
            control.join("\n")
        };

        let mut prompt = String::from(Self::OPTIMIZATION_ROLE);
        prompt.push_str("\nYou are given:\n");
        prompt.push_str(&Self::targets_section(state));
        prompt.push_str("\n- Recent monitoring logs (oldest to newest):\n");
        prompt.push_str(&monitor);
        prompt.push_str("\n\n- Recent control logs (oldest to newest):\n");
        prompt.push_str(&control);
        prompt.push_str("\n\n");
        prompt.push_str(Self::OPTIMIZATION_GUIDELINES);
        prompt.push('\n');
        prompt.push_str(Self::OPTIMIZATION_FORMAT);
        prompt
    }

    fn targets_section(state: &StateSnapshot) -> String {
        format!(
            "- Current control targets:\n  - target_temperature_c: {}\n  - target_humidity_percent: {}\n  - target_soil_moisture_percent: {}\n  - target_light_hours: {}\n",
            state.target_temperature,
            state.target_humidity,
            state.target_soil_moisture,
            state.target_light_hours
        )
    }

    const CONTROL_ROLE: &'static str = r#"You are an autonomous control agent for an automated greenhouse.

YOUR OBJECTIVES (in order of priority):
1. Keep plants within safe environmental ranges.
2. Stay reasonably close to the target setpoints over time.
3. Minimize energy use (heater, fan, grow lights) and water use (pump).
4. Avoid rapid oscillation (toggling actuators every cycle without need).
"#;

    const CONTROL_GUIDELINES: &'static str = r#"INTERPRETATION GUIDELINES (you choose exact thresholds):
- "normal": all readings are safe for plants and roughly near targets.
- "warning": readings are drifting away from targets but not yet dangerous.
- "critical": readings are unsafe for plants or require urgent action.

You may keep actuators OFF when conditions are good, turn them ON
preemptively when readings trend toward unsafe ranges, leave them unchanged
to avoid toggling, and escalate alert_level based on readings and history.
"#;

    const CONTROL_FORMAT: &'static str = r#"You MUST respond with ONLY a valid JSON object with these keys:
  "heater_on": true or false,
  "fan_on": true or false,
  "water_pump_on": true or false,
  "grow_lights_on": true or false,
  "alert_level": one of "normal", "warning", "critical",
  "reason": a short human-readable explanation string.

Return JSON only. No backticks, no code fences, no extra commentary.
"#;

    const OPTIMIZATION_ROLE: &'static str = r#"You are the optimization agent for an automated greenhouse.

Your job is to periodically adjust the control setpoints to balance plant
health, energy efficiency (heater, fan, lights), water efficiency (pump)
and actuator wear (avoid excessive ON/OFF cycling).
"#;

    const OPTIMIZATION_GUIDELINES: &'static str = r#"General guidelines (you may deviate with justification):
- Comfortable greenhouse temperatures are roughly 18-28 C.
- Humidity around 50-70% suits many plants.
- Soil moisture should not stay at extremes (0-10% or 90-100%) for long.
- More actuator ON time means more energy or water; consider relaxing targets slightly.
"#;

    const OPTIMIZATION_FORMAT: &'static str = r#"Respond ONLY with JSON:
{
  "target_temperature": <float, new target temperature in C>,
  "target_humidity": <float, new target humidity in %>,
  "target_soil_moisture": <float, new target soil moisture in %>,
  "target_light_hours": <int, new target daily light hours>,
  "reason": "<short explanation of why you changed or kept each target>"
}
"#;
}
