//! Backend configuration and construction.
//!
//! Settings come from an optional YAML file, overridden field by field by
//! CLI flags and environment variables:
//!
//! ```yaml
//! summarizer: openai
//! api_key: sk-...
//! model: gpt-4o-mini
//! endpoint: https://api.openai.com/v1/chat/completions
//! ```
//!
//! [`build_summarizer`] validates the result before any link is processed;
//! an unknown backend or a missing key is a setup error, never a per-link skip.

use crate::api::{OpenAiSummarizer, SummarizationBackend};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument};

/// The only backend currently shipped.
pub const OPENAI_SUMMARIZER: &str = "openai";

/// Setup failures. These fail the whole run (or keep the server from starting).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unsupported summarizer adapter: {0}")]
    UnsupportedSummarizer(String),
    #[error("Missing OPENAI_API_KEY")]
    MissingApiKey,
    #[error("Failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid config file {path}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Which backend to use and how to reach it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Backend selector; `openai` when unset.
    pub summarizer: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub endpoint: Option<String>,
}

impl BackendConfig {
    /// Load a YAML config file.
    #[instrument(level = "info", skip_all, fields(path = %path.as_ref().display()))]
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_yaml_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml_str(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    /// Overlay `other` on top of `self`; fields set in `other` win.
    pub fn merge(self, other: BackendConfig) -> Self {
        Self {
            summarizer: other.summarizer.or(self.summarizer),
            api_key: other.api_key.or(self.api_key),
            model: other.model.or(self.model),
            endpoint: other.endpoint.or(self.endpoint),
        }
    }

    /// Normalized backend selector.
    pub fn summarizer_name(&self) -> String {
        self.summarizer
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(OPENAI_SUMMARIZER)
            .to_lowercase()
    }
}

/// Build the configured backend, failing fast on misconfiguration.
pub fn build_summarizer(config: &BackendConfig) -> Result<Arc<dyn SummarizationBackend>, ConfigError> {
    let name = config.summarizer_name();
    if name != OPENAI_SUMMARIZER {
        return Err(ConfigError::UnsupportedSummarizer(name));
    }

    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or(ConfigError::MissingApiKey)?;

    let mut backend = OpenAiSummarizer::new(api_key);
    if let Some(model) = &config.model {
        backend = backend.with_model(model);
    }
    if let Some(endpoint) = &config.endpoint {
        backend = backend.with_endpoint(endpoint);
    }
    info!(summarizer = %name, model = backend.model(), endpoint = backend.endpoint(), "Summarizer configured");
    Ok(Arc::new(backend))
}
