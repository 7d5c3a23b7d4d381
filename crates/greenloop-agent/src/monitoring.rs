//! Monitoring stage: read every sensor and classify the alert level.

use greenloop_core::gateway::DynSensorGateway;
use greenloop_core::state::{AlertLevel, StateSnapshot};

/// Alert thresholds.
pub mod thresholds {
    pub const TEMPERATURE_CRITICAL_HIGH: f64 = 30.0;
    pub const TEMPERATURE_CRITICAL_LOW: f64 = 15.0;
    pub const SOIL_MOISTURE_CRITICAL_LOW: f64 = 20.0;
    pub const HUMIDITY_WARNING_LOW: f64 = 35.0;
    pub const HUMIDITY_WARNING_HIGH: f64 = 85.0;
}

/// Classify readings into an alert level.
///
/// Temperature and soil moisture can only raise `critical`; humidity can only
/// raise `warning`. Light level does not participate.
pub fn classify_alert(temperature: f64, humidity: f64, soil_moisture: f64) -> AlertLevel {
    use thresholds::*;

    let mut alert = AlertLevel::Normal;
    if temperature > TEMPERATURE_CRITICAL_HIGH || temperature < TEMPERATURE_CRITICAL_LOW {
        alert = AlertLevel::Critical;
    }
    if soil_moisture < SOIL_MOISTURE_CRITICAL_LOW {
        alert = AlertLevel::Critical;
    }
    if alert == AlertLevel::Normal
        && (humidity < HUMIDITY_WARNING_LOW || humidity > HUMIDITY_WARNING_HIGH)
    {
        alert = AlertLevel::Warning;
    }
    alert
}

/// Pulls readings from the sensor gateway into the snapshot.
pub struct MonitoringStage {
    sensors: DynSensorGateway,
}

impl MonitoringStage {
    pub fn new(sensors: DynSensorGateway) -> Self {
        Self { sensors }
    }

    pub fn run(&self, mut state: StateSnapshot) -> StateSnapshot {
        tracing::info!("[Monitoring] Reading sensors...");

        let temp = self.sensors.read_temperature();
        let humidity = self.sensors.read_humidity();
        let soil = self.sensors.read_soil_moisture();
        let light = self.sensors.read_light_level();

        state.temperature = temp;
        state.humidity = humidity;
        state.soil_moisture = soil;
        state.light_level = light;
        state.touch();

        let entry = format!(
            "[{}] Temp: {}°C, Humidity: {}%, Soil: {}%, Light: {} lux",
            state.timestamp_label(),
            temp,
            humidity,
            soil,
            light
        );
        tracing::info!("{}", entry);
        state.record_monitoring(entry);

        let alert = classify_alert(temp, humidity, soil);
        state.alert_level = alert;
        if alert != AlertLevel::Normal {
            tracing::warn!(alert = %alert, "Anomaly detected");
            state.push_message(format!(
                "ALERT ({}): Anomaly detected!",
                alert.as_str().to_uppercase()
            ));
        }

        state
    }
}
