//! Shared test doubles.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;

use greenloop_core::oracle::{DecisionOracle, DynDecisionOracle, OracleError};
use greenloop_core::state::StateSnapshot;

/// Oracle that replays canned responses and records every prompt.
pub struct ScriptedOracle {
    responses: Mutex<VecDeque<Result<String, OracleError>>>,
    repeat_last: Option<String>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedOracle {
    pub fn new(responses: Vec<Result<String, OracleError>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            repeat_last: None,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Answer every prompt with the same text.
    pub fn always(text: &str) -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            repeat_last: Some(text.to_string()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn replies(texts: &[&str]) -> Self {
        Self::new(texts.iter().map(|t| Ok(t.to_string())).collect())
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }

    pub fn calls(&self) -> usize {
        self.prompts.lock().len()
    }
}

#[async_trait]
impl DecisionOracle for ScriptedOracle {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        self.prompts.lock().push(prompt.to_string());
        if let Some(next) = self.responses.lock().pop_front() {
            return next;
        }
        match &self.repeat_last {
            Some(text) => Ok(text.clone()),
            None => Err(OracleError::Unavailable("script exhausted".to_string())),
        }
    }
}

pub fn shared(oracle: ScriptedOracle) -> (Arc<ScriptedOracle>, DynDecisionOracle) {
    let oracle = Arc::new(oracle);
    let dyn_oracle: DynDecisionOracle = oracle.clone();
    (oracle, dyn_oracle)
}

pub fn snapshot_with(temp: f64, humidity: f64, soil: f64, light: f64) -> StateSnapshot {
    let mut state = StateSnapshot::initial();
    state.temperature = temp;
    state.humidity = humidity;
    state.soil_moisture = soil;
    state.light_level = light;
    state
}
