//! Abstract decision oracle.
//!
//! An oracle is a text-in/text-out service (typically an LLM) whose answer
//! is expected to embed a JSON decision. Extracting and validating that
//! decision is the caller's job; the oracle only moves text.

use std::sync::Arc;

use async_trait::async_trait;

/// Errors raised while asking an oracle for a decision.
#[derive(Debug, thiserror::Error)]
pub enum OracleError {
    /// Oracle not reachable or not configured
    #[error("Oracle {0} not available")]
    Unavailable(String),

    /// Transport failure
    #[error("Network error: {0}")]
    Network(String),

    /// The oracle did not answer in time
    #[error("Oracle timed out after {0}s")]
    Timeout(u64),

    /// The oracle answered with an error
    #[error("Generation error: {0}")]
    Generation(String),

    /// Request or response could not be (de)serialized
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// A text-in/text-out decision service.
#[async_trait]
pub trait DecisionOracle: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Send a prompt and return the raw response text.
    async fn complete(&self, prompt: &str) -> Result<String, OracleError>;
}

pub type DynDecisionOracle = Arc<dyn DecisionOracle>;
