//! Ollama decision oracle.
//!
//! Ollama is a local LLM runner. This backend sends a single user message
//! to the native `/api/chat` endpoint without streaming and returns the
//! assistant text untouched; decision extraction happens in the agent.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use greenloop_core::config::{defaults, endpoints, models, normalize_ollama_endpoint};
use greenloop_core::config::OracleSettings;
use greenloop_core::oracle::{DecisionOracle, OracleError};

/// Ollama configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OllamaConfig {
    /// Ollama endpoint (default: http://localhost:11434)
    pub endpoint: String,

    /// Model name (e.g., "llama3.1", "qwen3:1.7b")
    pub model: String,

    /// Request timeout in seconds (default: 180).
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Sampling temperature. Decisions should be reproducible, so 0 by default.
    #[serde(default)]
    pub temperature: f32,
}

fn default_timeout_secs() -> u64 {
    defaults::ORACLE_TIMEOUT_SECS
}

impl OllamaConfig {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            endpoint: endpoints::OLLAMA.to_string(),
            model: model.into(),
            timeout_secs: defaults::ORACLE_TIMEOUT_SECS,
            temperature: defaults::ORACLE_TEMPERATURE,
        }
    }

    /// Set a custom endpoint. A trailing `/v1` is stripped.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = normalize_ollama_endpoint(endpoint);
        self
    }

    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self::new(models::OLLAMA_DEFAULT)
    }
}

impl From<&OracleSettings> for OllamaConfig {
    fn from(settings: &OracleSettings) -> Self {
        OllamaConfig::new(settings.model.clone())
            .with_endpoint(settings.endpoint.clone())
            .with_timeout_secs(settings.timeout_secs)
            .with_temperature(settings.temperature)
    }
}

/// Decision oracle backed by an Ollama server.
pub struct OllamaOracle {
    config: OllamaConfig,
    client: Client,
}

impl OllamaOracle {
    pub fn new(config: OllamaConfig) -> Result<Self, OracleError> {
        tracing::debug!(
            "Creating Ollama oracle with endpoint: {}, model: {}",
            config.endpoint,
            config.model
        );

        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(Duration::from_secs(5))
            .build()
            .map_err(|e| OracleError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    pub fn config(&self) -> &OllamaConfig {
        &self.config
    }

    /// Check that the server answers `/api/tags` within two seconds.
    pub async fn is_available(&self) -> bool {
        let url = format!("{}/api/tags", self.config.endpoint);
        match self
            .client
            .get(&url)
            .timeout(Duration::from_secs(2))
            .send()
            .await
        {
            Ok(resp) => resp.status().is_success(),
            Err(e) => {
                tracing::debug!("Ollama not reachable at {}: {}", url, e);
                false
            }
        }
    }

    fn map_send_error(&self, e: reqwest::Error) -> OracleError {
        if e.is_timeout() {
            OracleError::Timeout(self.config.timeout_secs)
        } else if e.is_connect() {
            OracleError::Unavailable(format!("ollama at {}: {}", self.config.endpoint, e))
        } else {
            OracleError::Network(e.to_string())
        }
    }
}

#[async_trait]
impl DecisionOracle for OllamaOracle {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String, OracleError> {
        let start_time = Instant::now();
        let url = format!("{}/api/chat", self.config.endpoint);

        let request = OllamaChatRequest {
            model: self.config.model.clone(),
            messages: vec![OllamaMessage {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            stream: false,
            options: Some(OllamaOptions {
                temperature: Some(self.config.temperature),
            }),
        };

        let request_json = serde_json::to_string(&request)?;
        tracing::debug!("Ollama: sending request to model: {}", self.config.model);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(request_json)
            .send()
            .await
            .map_err(|e| self.map_send_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(OracleError::Generation(format!(
                "Ollama returned {}: {}",
                status, error_text
            )));
        }

        let body = response.text().await.map_err(|e| self.map_send_error(e))?;
        let chat: OllamaChatResponse = serde_json::from_str(&body)?;

        tracing::debug!(
            "Ollama: response from {} in {}ms",
            chat.model,
            start_time.elapsed().as_millis()
        );

        Ok(chat.message.content.trim().to_string())
    }
}

// Ollama API types

#[derive(Debug, Serialize)]
struct OllamaChatRequest {
    model: String,
    messages: Vec<OllamaMessage>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: String,
    message: OllamaResponseMessage,
}

#[derive(Debug, Deserialize, Default)]
struct OllamaResponseMessage {
    #[serde(default)]
    content: String,
}
