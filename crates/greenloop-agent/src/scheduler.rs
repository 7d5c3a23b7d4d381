//! Cycle scheduler: MONITOR → CONTROL → OPTIMIZE, repeated while critical.
//!
//! ```text
//!   ┌──────────┐    ┌─────────┐    ┌──────────┐  alert != critical  ┌──────┐
//! ─▶│ Monitor  │───▶│ Control │───▶│ Optimize │────────────────────▶│ Done │
//!   └──────────┘    └─────────┘    └──────────┘                     └──────┘
//!        ▲                              │
//!        └───────── alert == critical ──┘
//! ```
//!
//! The re-entry edge has no bound of its own. A caller that needs one sets
//! [`CycleScheduler::with_max_passes`].

use greenloop_core::gateway::{DynActuatorGateway, DynSensorGateway};
use greenloop_core::oracle::DynDecisionOracle;
use greenloop_core::state::StateSnapshot;

use crate::control::ControlPolicy;
use crate::mode::DecisionMode;
use crate::monitoring::MonitoringStage;
use crate::optimization::OptimizationPolicy;

/// Position in the workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Monitor,
    Control,
    Optimize,
    Done,
}

/// Result of one scheduler invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleOutcome {
    pub snapshot: StateSnapshot,
    /// Monitor → Control → Optimize passes executed (at least 1).
    pub passes: u32,
    /// True when the pass cap stopped a critical re-entry.
    pub capped: bool,
}

pub struct CycleScheduler {
    monitoring: MonitoringStage,
    control: ControlPolicy,
    optimization: OptimizationPolicy,
    max_passes: Option<u32>,
}

impl CycleScheduler {
    pub fn new(
        monitoring: MonitoringStage,
        control: ControlPolicy,
        optimization: OptimizationPolicy,
    ) -> Self {
        Self {
            monitoring,
            control,
            optimization,
            max_passes: None,
        }
    }

    /// Wire all three stages from gateways and an optional oracle.
    pub fn from_gateways(
        sensors: DynSensorGateway,
        actuators: DynActuatorGateway,
        oracle: Option<DynDecisionOracle>,
    ) -> Self {
        let mode = DecisionMode::from_oracle(oracle);
        Self::new(
            MonitoringStage::new(sensors),
            ControlPolicy::new(mode.clone(), actuators),
            OptimizationPolicy::new(mode),
        )
    }

    /// Cap the passes of a single invocation. `None` leaves it unbounded.
    pub fn with_max_passes(mut self, max_passes: Option<u32>) -> Self {
        self.max_passes = max_passes;
        self
    }

    /// The only conditional edge: a critical alert after OPTIMIZE re-enters MONITOR.
    pub fn route_by_alert(state: &StateSnapshot) -> Phase {
        if state.alert_level.is_critical() {
            Phase::Monitor
        } else {
            Phase::Done
        }
    }

    /// Run the workflow from MONITOR until DONE.
    pub async fn run(&self, mut state: StateSnapshot) -> CycleOutcome {
        let mut phase = Phase::Monitor;
        let mut passes = 0u32;
        let mut capped = false;

        loop {
            phase = match phase {
                Phase::Monitor => {
                    passes += 1;
                    state = self.monitoring.run(state);
                    Phase::Control
                }
                Phase::Control => {
                    state = self.control.run(state).await;
                    Phase::Optimize
                }
                Phase::Optimize => {
                    state = self.optimization.run(state).await;
                    match Self::route_by_alert(&state) {
                        Phase::Monitor if self.max_passes.is_some_and(|max| passes >= max) => {
                            tracing::warn!(
                                passes,
                                "Critical alert persists, pass limit reached; ending cycle"
                            );
                            capped = true;
                            Phase::Done
                        }
                        Phase::Monitor => {
                            tracing::warn!(passes, "Critical alert, re-monitoring immediately");
                            // let a caller racing this future observe cancellation
                            tokio::task::yield_now().await;
                            Phase::Monitor
                        }
                        next => next,
                    }
                }
                Phase::Done => break,
            };
        }

        CycleOutcome {
            snapshot: state,
            passes,
            capped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greenloop_core::state::AlertLevel;

    #[test]
    fn test_route_by_alert() {
        let mut state = StateSnapshot::initial();
        assert_eq!(CycleScheduler::route_by_alert(&state), Phase::Done);
        state.alert_level = AlertLevel::Warning;
        assert_eq!(CycleScheduler::route_by_alert(&state), Phase::Done);
        state.alert_level = AlertLevel::Critical;
        assert_eq!(CycleScheduler::route_by_alert(&state), Phase::Monitor);
    }
}
