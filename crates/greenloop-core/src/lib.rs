//! Core traits and types for Greenloop.
//!
//! This crate defines the state record threaded through the control loop,
//! the boundaries to sensors, actuators and the decision oracle, and the
//! shared configuration and error types.

pub mod config;
pub mod diff;
pub mod error;
pub mod gateway;
pub mod oracle;
pub mod state;

pub use config::{GreenhouseConfig, InitialSetpoints, OracleSettings};
pub use diff::{diff_state, NO_MATERIAL_CHANGES};
pub use error::{Error, Result};
pub use gateway::{ActuatorGateway, DynActuatorGateway, DynSensorGateway, SensorGateway};
pub use oracle::{DecisionOracle, DynDecisionOracle, OracleError};
pub use state::{AlertLevel, StateSnapshot, UnknownAlertLevel};
