//! Greenhouse control loop.
//!
//! ## Architecture
//!
//! - **MonitoringStage**: reads sensors and classifies the alert level
//! - **ControlPolicy**: chooses actuator states (oracle first, rules as fallback)
//! - **OptimizationPolicy**: revises setpoints (oracle first, rules as fallback)
//! - **CycleScheduler**: sequences the stages and re-runs on critical alerts
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use greenloop_agent::CycleScheduler;
//! use greenloop_core::StateSnapshot;
//! # use greenloop_core::gateway::{ActuatorGateway, SensorGateway};
//! # fn gateways() -> (Arc<dyn SensorGateway>, Arc<dyn ActuatorGateway>) { unimplemented!() }
//!
//! # async fn demo() {
//! let (sensors, actuators) = gateways();
//! let scheduler = CycleScheduler::from_gateways(sensors, actuators, None);
//! let outcome = scheduler.run(StateSnapshot::initial()).await;
//! println!("alert after cycle: {}", outcome.snapshot.alert_level);
//! # }
//! ```

pub mod control;
pub mod decision;
pub mod error;
pub mod mode;
pub mod monitoring;
pub mod optimization;
pub mod prompts;
pub mod scheduler;

pub use control::ControlPolicy;
pub use decision::{extract_json_object, ControlDecision, OptimizationDecision};
pub use error::{DecisionParseError, PolicyError};
pub use mode::DecisionMode;
pub use monitoring::{classify_alert, MonitoringStage};
pub use optimization::OptimizationPolicy;
pub use prompts::PromptBuilder;
pub use scheduler::{CycleOutcome, CycleScheduler, Phase};
