//! Inference gateway
//!
//! Issues classification requests to a remote model endpoint and hands back
//! the undecoded body. Decoding belongs to the normalizer; retry policy does
//! not exist at this layer.

use crate::config::InferenceConfig;
use async_trait::async_trait;
use calma_core::{Result, TaskKind};
use serde::Serialize;
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Transport-level failure of a single remote call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportFailure {
    /// The call exceeded its timeout
    #[error("inference request timed out")]
    Timeout,

    /// Connection or protocol failure
    #[error("inference request failed: {0}")]
    Network(String),

    /// The backend answered with a non-2xx status
    #[error("inference backend returned HTTP {status}")]
    Http { status: u16 },
}

impl TransportFailure {
    /// Stable kind name used in logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Network(_) => "network_error",
            Self::Http { .. } => "http_error",
        }
    }
}

impl From<reqwest::Error> for TransportFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else if let Some(status) = err.status() {
            Self::Http {
                status: status.as_u16(),
            }
        } else {
            Self::Network(err.without_url().to_string())
        }
    }
}

/// Request body sent to the backend
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum InferencePayload {
    /// Plain text classification: `{ "inputs": .. }`
    Text { inputs: String },

    /// Zero-shot classification against a label set
    ZeroShot {
        inputs: String,
        parameters: ZeroShotParameters,
    },

    /// Free-text generation
    Generation {
        inputs: String,
        parameters: GenerationParameters,
    },
}

/// Candidate labels for zero-shot classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZeroShotParameters {
    pub candidate_labels: Vec<String>,
}

/// Text generation settings
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,

    /// Whether the backend echoes the prompt before the generated text
    pub return_full_text: bool,
}

impl InferencePayload {
    /// Plain text payload
    pub fn text(inputs: impl Into<String>) -> Self {
        Self::Text {
            inputs: inputs.into(),
        }
    }

    /// Zero-shot payload with the given candidate labels
    pub fn zero_shot<I, S>(inputs: impl Into<String>, labels: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::ZeroShot {
            inputs: inputs.into(),
            parameters: ZeroShotParameters {
                candidate_labels: labels.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// Generation payload asking for a short answer without the prompt echoed
    pub fn generation(prompt: impl Into<String>, max_new_tokens: u32) -> Self {
        Self::Generation {
            inputs: prompt.into(),
            parameters: GenerationParameters {
                max_new_tokens,
                return_full_text: false,
            },
        }
    }

    /// The input text carried by the payload
    pub fn inputs(&self) -> &str {
        match self {
            Self::Text { inputs }
            | Self::ZeroShot { inputs, .. }
            | Self::Generation { inputs, .. } => inputs,
        }
    }
}

/// Undecoded response from the backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    /// Task the request was made for
    pub task: TaskKind,

    /// Model that answered
    pub model: String,

    /// Response body as received
    pub body: String,
}

impl RawResponse {
    pub fn new(task: TaskKind, model: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            task,
            model: model.into(),
            body: body.into(),
        }
    }
}

/// Trait for remote inference backends
#[async_trait]
pub trait InferenceGateway: Send + Sync {
    /// Issue one request to `model`. A single attempt, bounded by a timeout.
    async fn invoke(
        &self,
        task: TaskKind,
        model: &str,
        payload: &InferencePayload,
    ) -> std::result::Result<RawResponse, TransportFailure>;

    /// Get the gateway name
    fn name(&self) -> &str;
}

/// Gateway for a hosted inference API reachable at `{base_url}/{model}`
pub struct HttpInferenceGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl HttpInferenceGateway {
    /// Create a gateway with an explicit bearer credential
    pub fn new(config: &InferenceConfig, api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(calma_core::Error::config("inference API key is empty"));
        }

        let base_url = config.base_url.trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(calma_core::Error::config("inference base_url is empty"));
        }

        let timeout = config.timeout();
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| calma_core::Error::config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            api_key,
            timeout,
        })
    }

    /// Create a gateway reading the credential from the configured
    /// environment variable
    pub fn from_env(config: &InferenceConfig) -> Result<Self> {
        let api_key = config.api_key()?;
        Self::new(config, api_key)
    }

    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/{}", self.base_url, model.trim_start_matches('/'))
    }
}

impl fmt::Debug for HttpInferenceGateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpInferenceGateway")
            .field("base_url", &self.base_url)
            .field("api_key", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl InferenceGateway for HttpInferenceGateway {
    async fn invoke(
        &self,
        task: TaskKind,
        model: &str,
        payload: &InferencePayload,
    ) -> std::result::Result<RawResponse, TransportFailure> {
        let url = self.endpoint(model);
        debug!(task = %task, model, "Sending inference request");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            debug!(
                task = %task,
                model,
                status = status.as_u16(),
                "Inference backend rejected request"
            );
            return Err(TransportFailure::Http {
                status: status.as_u16(),
            });
        }

        let body = response.text().await?;
        debug!(task = %task, model, bytes = body.len(), "Inference response received");

        Ok(RawResponse::new(task, model, body))
    }

    fn name(&self) -> &str {
        "http"
    }
}
