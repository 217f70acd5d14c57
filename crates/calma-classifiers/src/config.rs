//! Configuration for the inference backend and classification pipeline

use crate::pipeline::ModerationFailurePolicy;
use calma_core::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CalmaConfig {
    /// Remote inference backend
    #[serde(default)]
    pub inference: InferenceConfig,

    /// Model identifiers per task
    #[serde(default)]
    pub models: ModelSet,

    /// Moderation fallback settings
    #[serde(default)]
    pub moderation: ModerationConfig,
}

/// Remote inference backend settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InferenceConfig {
    /// Base URL; requests go to `{base_url}/{model}`
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-call timeout in milliseconds
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Environment variable holding the bearer credential
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_ms: default_timeout_ms(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl InferenceConfig {
    /// Per-call timeout
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Read the credential from the environment
    pub fn api_key(&self) -> Result<String> {
        match std::env::var(&self.api_key_env) {
            Ok(key) if !key.trim().is_empty() => Ok(key),
            Ok(_) => Err(calma_core::Error::config(format!(
                "{} is set but empty",
                self.api_key_env
            ))),
            Err(_) => Err(calma_core::Error::config(format!(
                "{} is not set",
                self.api_key_env
            ))),
        }
    }
}

/// Remote model identifier for each task
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelSet {
    #[serde(default = "default_sentiment_model")]
    pub sentiment: String,

    #[serde(default = "default_moderation_model")]
    pub moderation: String,

    #[serde(default = "default_suggestion_model")]
    pub suggestion: String,
}

impl Default for ModelSet {
    fn default() -> Self {
        Self {
            sentiment: default_sentiment_model(),
            moderation: default_moderation_model(),
            suggestion: default_suggestion_model(),
        }
    }
}

/// Moderation fallback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModerationConfig {
    /// What to do when no remote verdict is available
    #[serde(default)]
    pub failure_policy: ModerationFailurePolicy,

    /// Deny-list for the local prohibited-term check
    #[serde(default = "default_prohibited_terms")]
    pub prohibited_terms: Vec<String>,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            failure_policy: ModerationFailurePolicy::default(),
            prohibited_terms: default_prohibited_terms(),
        }
    }
}

impl CalmaConfig {
    /// Load from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| calma_core::Error::config(format!("Invalid configuration: {e}")))
    }

    /// Load from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load from file if it exists, otherwise use defaults
    pub fn load_or_default(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            Self::from_file(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Reject settings that cannot work at all
    pub fn validate(&self) -> Result<()> {
        if self.inference.base_url.trim().is_empty() {
            return Err(calma_core::Error::config("inference.base_url is empty"));
        }
        if self.inference.timeout_ms == 0 {
            return Err(calma_core::Error::config("inference.timeout_ms must be positive"));
        }
        for (task, model) in [
            ("sentiment", &self.models.sentiment),
            ("moderation", &self.models.moderation),
            ("suggestion", &self.models.suggestion),
        ] {
            if model.trim().is_empty() {
                return Err(calma_core::Error::config(format!("models.{task} is empty")));
            }
        }
        Ok(())
    }
}

fn default_base_url() -> String {
    "https://api-inference.huggingface.co/models".to_string()
}

fn default_timeout_ms() -> u64 {
    10_000
}

fn default_api_key_env() -> String {
    "HF_API_KEY".to_string()
}

fn default_sentiment_model() -> String {
    "distilbert-base-uncased-finetuned-sst-2-english".to_string()
}

fn default_moderation_model() -> String {
    "facebook/bart-large-mnli".to_string()
}

fn default_suggestion_model() -> String {
    "mistralai/Mistral-7B-Instruct-v0.2".to_string()
}

fn default_prohibited_terms() -> Vec<String> {
    ["idiota", "imbecil", "otário", "babaca", "idiot", "moron"]
        .into_iter()
        .map(String::from)
        .collect()
}
