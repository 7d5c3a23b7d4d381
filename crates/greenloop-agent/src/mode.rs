//! How a policy reaches its decisions.

use std::fmt;

use greenloop_core::oracle::DynDecisionOracle;

/// Chosen once when a policy is constructed.
#[derive(Clone)]
pub enum DecisionMode {
    /// Ask the oracle first; fall back to the deterministic rules on any failure.
    OracleBacked(DynDecisionOracle),
    /// Deterministic rules only.
    Deterministic,
}

impl DecisionMode {
    pub fn from_oracle(oracle: Option<DynDecisionOracle>) -> Self {
        match oracle {
            Some(oracle) => DecisionMode::OracleBacked(oracle),
            None => DecisionMode::Deterministic,
        }
    }
}

impl fmt::Debug for DecisionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecisionMode::OracleBacked(oracle) => {
                f.debug_tuple("OracleBacked").field(&oracle.name()).finish()
            }
            DecisionMode::Deterministic => f.write_str("Deterministic"),
        }
    }
}
