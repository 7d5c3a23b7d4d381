//! Simulated greenhouse hardware.
//!
//! The sensor bank draws uniform readings from plausible greenhouse ranges;
//! the actuator bank only acknowledges commands.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use greenloop_core::gateway::{ActuatorGateway, SensorGateway};

use crate::Actuator;

/// Reading ranges of the simulated sensors.
pub mod ranges {
    pub const TEMPERATURE: (f64, f64) = (18.0, 32.0);
    pub const HUMIDITY: (f64, f64) = (40.0, 90.0);
    pub const SOIL_MOISTURE: (f64, f64) = (30.0, 85.0);
    pub const LIGHT_LEVEL: (f64, f64) = (500.0, 15000.0);
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Random sensor readings, rounded to two decimals.
pub struct SimulatedSensorBank {
    rng: Mutex<StdRng>,
}

impl SimulatedSensorBank {
    /// Create a bank seeded from OS entropy.
    pub fn new() -> Self {
        Self {
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Create a reproducible bank.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: Mutex::new(StdRng::seed_from_u64(seed)),
        }
    }

    fn sample(&self, name: &str, (lo, hi): (f64, f64)) -> f64 {
        let value = round2(self.rng.lock().gen_range(lo..=hi));
        tracing::trace!(sensor = name, value, "Simulated reading");
        value
    }
}

impl Default for SimulatedSensorBank {
    fn default() -> Self {
        Self::new()
    }
}

impl SensorGateway for SimulatedSensorBank {
    fn read_temperature(&self) -> f64 {
        self.sample("temperature", ranges::TEMPERATURE)
    }

    fn read_humidity(&self) -> f64 {
        self.sample("humidity", ranges::HUMIDITY)
    }

    fn read_soil_moisture(&self) -> f64 {
        self.sample("soil_moisture", ranges::SOIL_MOISTURE)
    }

    fn read_light_level(&self) -> f64 {
        self.sample("light_level", ranges::LIGHT_LEVEL)
    }
}

/// Actuators that only acknowledge the commanded state.
#[derive(Debug, Default, Clone, Copy)]
pub struct SimulatedActuatorBank;

impl SimulatedActuatorBank {
    pub fn new() -> Self {
        Self
    }

    fn command(&self, actuator: Actuator, on: bool) -> String {
        let ack = actuator.acknowledge(on);
        tracing::debug!(actuator = ?actuator, on, "Simulated actuator: {}", ack);
        ack
    }
}

impl ActuatorGateway for SimulatedActuatorBank {
    fn set_heater(&self, on: bool) -> String {
        self.command(Actuator::Heater, on)
    }

    fn set_fan(&self, on: bool) -> String {
        self.command(Actuator::Fan, on)
    }

    fn set_water_pump(&self, on: bool) -> String {
        self.command(Actuator::WaterPump, on)
    }

    fn set_grow_lights(&self, on: bool) -> String {
        self.command(Actuator::GrowLights, on)
    }
}
