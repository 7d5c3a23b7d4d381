//! Deterministic hardware doubles for tests and replays.

use std::collections::VecDeque;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use greenloop_core::gateway::{ActuatorGateway, SensorGateway};

use crate::Actuator;

/// One full set of sensor readings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Readings {
    pub temperature: f64,
    pub humidity: f64,
    pub soil_moisture: f64,
    pub light_level: f64,
}

impl Readings {
    pub fn new(temperature: f64, humidity: f64, soil_moisture: f64, light_level: f64) -> Self {
        Self {
            temperature,
            humidity,
            soil_moisture,
            light_level,
        }
    }
}

impl Default for Readings {
    /// Comfortable readings that raise no alert.
    fn default() -> Self {
        Self::new(22.0, 60.0, 50.0, 5000.0)
    }
}

/// Sensor bank replaying a fixed sequence of readings.
///
/// Each full scan (a humidity, soil or light read after a temperature read)
/// uses the same [`Readings`]; a new temperature read advances to the next
/// entry. The last entry repeats forever.
pub struct ScriptedSensorBank {
    queue: Mutex<VecDeque<Readings>>,
    current: Mutex<Readings>,
}

impl ScriptedSensorBank {
    /// Always return the same readings.
    pub fn fixed(readings: Readings) -> Self {
        Self::sequence(vec![readings])
    }

    /// Replay `sequence` one scan at a time.
    pub fn sequence(sequence: Vec<Readings>) -> Self {
        let mut queue: VecDeque<Readings> = sequence.into();
        let current = queue.front().copied().unwrap_or_default();
        if queue.len() == 1 {
            queue.clear();
        }
        Self {
            queue: Mutex::new(queue),
            current: Mutex::new(current),
        }
    }

    fn advance(&self) -> Readings {
        let mut queue = self.queue.lock();
        let mut current = self.current.lock();
        if let Some(next) = queue.pop_front() {
            *current = next;
        }
        *current
    }
}

impl SensorGateway for ScriptedSensorBank {
    fn read_temperature(&self) -> f64 {
        self.advance().temperature
    }

    fn read_humidity(&self) -> f64 {
        self.current.lock().humidity
    }

    fn read_soil_moisture(&self) -> f64 {
        self.current.lock().soil_moisture
    }

    fn read_light_level(&self) -> f64 {
        self.current.lock().light_level
    }
}

/// Actuator bank that remembers every command it receives.
#[derive(Default)]
pub struct RecordingActuatorBank {
    commands: Mutex<Vec<(Actuator, bool)>>,
}

impl RecordingActuatorBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Commands received so far, in order.
    pub fn commands(&self) -> Vec<(Actuator, bool)> {
        self.commands.lock().clone()
    }

    /// Most recent command for `actuator`, if any.
    pub fn last_state(&self, actuator: Actuator) -> Option<bool> {
        self.commands
            .lock()
            .iter()
            .rev()
            .find(|(a, _)| *a == actuator)
            .map(|(_, on)| *on)
    }

    pub fn clear(&self) {
        self.commands.lock().clear();
    }

    fn record(&self, actuator: Actuator, on: bool) -> String {
        self.commands.lock().push((actuator, on));
        actuator.acknowledge(on)
    }
}

impl ActuatorGateway for RecordingActuatorBank {
    fn set_heater(&self, on: bool) -> String {
        self.record(Actuator::Heater, on)
    }

    fn set_fan(&self, on: bool) -> String {
        self.record(Actuator::Fan, on)
    }

    fn set_water_pump(&self, on: bool) -> String {
        self.record(Actuator::WaterPump, on)
    }

    fn set_grow_lights(&self, on: bool) -> String {
        self.record(Actuator::GrowLights, on)
    }
}
