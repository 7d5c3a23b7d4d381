//! Greenhouse device gateways.
//!
//! | Type | Purpose |
//! |------|---------|
//! | [`SimulatedSensorBank`] | Random readings in plausible greenhouse ranges |
//! | [`SimulatedActuatorBank`] | Acknowledges actuator commands |
//! | [`ScriptedSensorBank`] | Replays fixed readings (tests, replays) |
//! | [`RecordingActuatorBank`] | Records every command (tests) |

pub mod scripted;
pub mod simulated;

use serde::{Deserialize, Serialize};

pub use scripted::{Readings, RecordingActuatorBank, ScriptedSensorBank};
pub use simulated::{SimulatedActuatorBank, SimulatedSensorBank};

/// The four greenhouse actuators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Actuator {
    Heater,
    Fan,
    WaterPump,
    GrowLights,
}

impl Actuator {
    pub fn label(&self) -> &'static str {
        match self {
            Actuator::Heater => "Heater",
            Actuator::Fan => "Fan",
            Actuator::WaterPump => "Water pump",
            Actuator::GrowLights => "Grow lights",
        }
    }

    /// Acknowledgement string for a command, e.g. `"Fan ON"`.
    pub fn acknowledge(&self, on: bool) -> String {
        format!("{} {}", self.label(), if on { "ON" } else { "OFF" })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acknowledge() {
        assert_eq!(Actuator::WaterPump.acknowledge(true), "Water pump ON");
        assert_eq!(Actuator::GrowLights.acknowledge(false), "Grow lights OFF");
    }
}
