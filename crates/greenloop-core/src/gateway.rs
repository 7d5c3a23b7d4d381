//! Boundaries to the physical side of the greenhouse.
//!
//! Both gateways are synchronous and infallible from the control loop's
//! point of view. A gateway owns its own bounds: the loop never assumes a
//! reading is inside its physical domain.

use std::sync::Arc;

/// Read access to the four environmental sensors.
pub trait SensorGateway: Send + Sync {
    /// Temperature in Celsius.
    fn read_temperature(&self) -> f64;

    /// Relative humidity in percent.
    fn read_humidity(&self) -> f64;

    /// Soil moisture in percent.
    fn read_soil_moisture(&self) -> f64;

    /// Light level in lux.
    fn read_light_level(&self) -> f64;
}

/// Write access to the four actuators.
///
/// Every call is idempotent and returns an acknowledgement containing
/// `ON` or `OFF`, which is used only for the audit trail.
pub trait ActuatorGateway: Send + Sync {
    fn set_heater(&self, on: bool) -> String;

    fn set_fan(&self, on: bool) -> String;

    fn set_water_pump(&self, on: bool) -> String;

    fn set_grow_lights(&self, on: bool) -> String;
}

pub type DynSensorGateway = Arc<dyn SensorGateway>;

pub type DynActuatorGateway = Arc<dyn ActuatorGateway>;
