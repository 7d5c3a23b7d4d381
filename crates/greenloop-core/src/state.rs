//! The greenhouse state snapshot threaded through every stage of a cycle.
//!
//! A single [`StateSnapshot`] is created when a run starts and is handed from
//! stage to stage by value. Stages only ever append to the audit logs; the
//! logs are never truncated or rewritten during a run.

use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Amount of soil moisture (percentage points) added by one irrigation pulse.
pub const IRRIGATION_STEP: f64 = 15.0;

/// Physical ceiling for soil moisture.
pub const SOIL_MOISTURE_MAX: f64 = 100.0;

/// Format used for the timestamp prefix of every audit log line.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Tri-state severity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    #[default]
    Normal,
    Warning,
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Normal => "normal",
            AlertLevel::Warning => "warning",
            AlertLevel::Critical => "critical",
        }
    }

    /// Critical alerts make the scheduler run the cycle again.
    pub fn is_critical(&self) -> bool {
        matches!(self, AlertLevel::Critical)
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a string is not one of the three alert levels.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown alert level: {0}")]
pub struct UnknownAlertLevel(pub String);

impl FromStr for AlertLevel {
    type Err = UnknownAlertLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(AlertLevel::Normal),
            "warning" => Ok(AlertLevel::Warning),
            "critical" => Ok(AlertLevel::Critical),
            _ => Err(UnknownAlertLevel(s.to_string())),
        }
    }
}

/// Shared state of the greenhouse control loop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateSnapshot {
    // Environmental sensors
    /// Celsius
    pub temperature: f64,
    /// Percentage (0-100)
    pub humidity: f64,
    /// Percentage (0-100)
    pub soil_moisture: f64,
    /// Lux
    pub light_level: f64,

    // Actuator states
    pub heater_on: bool,
    pub fan_on: bool,
    pub water_pump_on: bool,
    pub grow_lights_on: bool,

    // Setpoints, only changed by the optimization policy
    pub target_temperature: f64,
    pub target_humidity: f64,
    pub target_soil_moisture: f64,
    pub target_light_hours: u32,

    pub alert_level: AlertLevel,

    /// Set once per cycle by the monitoring stage.
    pub timestamp: NaiveDateTime,

    pub monitoring_log: Vec<String>,
    pub control_log: Vec<String>,
    pub optimization_log: Vec<String>,

    /// Combined audit trail of every stage, in insertion order.
    pub messages: Vec<String>,
}

impl StateSnapshot {
    /// Create the snapshot a run starts from.
    pub fn initial() -> Self {
        Self {
            temperature: 22.0,
            humidity: 60.0,
            soil_moisture: 50.0,
            light_level: 5000.0,
            heater_on: false,
            fan_on: false,
            water_pump_on: false,
            grow_lights_on: false,
            target_temperature: 24.0,
            target_humidity: 65.0,
            target_soil_moisture: 60.0,
            target_light_hours: 12,
            alert_level: AlertLevel::Normal,
            timestamp: Local::now().naive_local(),
            monitoring_log: Vec::new(),
            control_log: Vec::new(),
            optimization_log: Vec::new(),
            messages: Vec::new(),
        }
    }

    /// Timestamp rendered the way it prefixes log lines.
    pub fn timestamp_label(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    /// Stamp the snapshot with the current local time.
    pub fn touch(&mut self) {
        self.timestamp = Local::now().naive_local();
    }

    /// Simulate one irrigation pulse. Returns soil moisture before and after.
    pub fn irrigate(&mut self) -> (f64, f64) {
        let before = self.soil_moisture;
        self.soil_moisture = (self.soil_moisture + IRRIGATION_STEP).min(SOIL_MOISTURE_MAX);
        (before, self.soil_moisture)
    }

    pub fn push_message(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    pub fn record_monitoring(&mut self, entry: String) {
        self.messages.push(format!("Monitoring: {}", entry));
        self.monitoring_log.push(entry);
    }

    pub fn record_control(&mut self, action: String, why: String) {
        self.messages.push(format!("Control: {}", action));
        self.messages.push(format!("ControlWhy: {}", why));
        self.control_log.push(action);
        self.control_log.push(why);
    }

    pub fn record_optimization(&mut self, entry: String) {
        self.messages.push(format!("Optimization: {}", entry));
        self.optimization_log.push(entry);
    }

    pub fn record_optimization_with_reason(&mut self, entry: String, why: String) {
        self.messages.push(format!("Optimization: {}", entry));
        self.messages.push(format!("OptimizationWhy: {}", why));
        self.optimization_log.push(entry);
        self.optimization_log.push(why);
    }

    /// Last `n` entries of a log, oldest first.
    pub fn tail(log: &[String], n: usize) -> &[String] {
        &log[log.len().saturating_sub(n)..]
    }
}

impl Default for StateSnapshot {
    fn default() -> Self {
        Self::initial()
    }
}
