//! Error types for the agent crate.
//!
//! None of these escape a policy: they are logged and the policy falls
//! back to its deterministic path.

use greenloop_core::oracle::OracleError;

/// Why an oracle response could not be turned into a decision.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecisionParseError {
    /// No `{` ... `}` span in the response.
    #[error("response did not contain a JSON object")]
    NoObject,

    /// The span is not valid JSON or not an object.
    #[error("malformed decision object: {0}")]
    Malformed(String),

    /// A recognised field has the wrong type or value.
    #[error("field `{field}` must be {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },
}

/// Failure on the oracle-backed path of a policy.
#[derive(Debug, thiserror::Error)]
pub enum PolicyError {
    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error(transparent)]
    Decision(#[from] DecisionParseError),
}
