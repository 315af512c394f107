//! Summarization backends.
//!
//! The pipeline talks to [`SummarizationBackend`], a trait object shared by
//! every concurrent task of a request. One implementation ships:
//! [`OpenAiSummarizer`], which sends one chat-completion request per article
//! and asks for a JSON object back.
//!
//! # Failure contract
//!
//! A backend either returns a complete [`SummaryResult`] or an error. Upstream
//! failures (transport, non-2xx, unreadable envelope) are errors. A model
//! answer that is not the JSON we asked for is *not* an error: it degrades to
//! no bullets and a headline taken from the page title or the URL.

use crate::models::{ArticleInput, SummaryResult};
use crate::reading_time::ReadingTimeProfile;
use crate::utils::{looks_truncated, truncate_chars, truncate_for_log};
use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, instrument, warn};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

/// Article text beyond this many characters is not sent to the model.
pub const PROMPT_CONTENT_CHARS: usize = 8_000;

const TEMPERATURE: f32 = 0.4;

/// Upstream failures of a summarization backend.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{backend} API error: {status} {reason}")]
    Status {
        backend: &'static str,
        status: u16,
        reason: String,
    },
    #[error("{backend} API request failed")]
    Transport {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{backend} API returned an unreadable response")]
    Decode {
        backend: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{0}")]
    Upstream(String),
}

/// Converts article text into a headline and bullets.
///
/// Implementations must be safe to call concurrently.
#[async_trait]
pub trait SummarizationBackend: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn summarize_article(&self, input: ArticleInput<'_>) -> Result<SummaryResult, BackendError>;
}

/// Chat-completions backend for OpenAI and compatible servers.
#[derive(Debug, Clone)]
pub struct OpenAiSummarizer {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenAiSummarizer {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: DEFAULT_OPENAI_MODEL.to_string(),
            endpoint: DEFAULT_OPENAI_ENDPOINT.to_string(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    temperature: f32,
    max_tokens: u32,
    response_format: ResponseFormat,
    messages: [ChatMessage; 2],
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

fn system_prompt(profile: &ReadingTimeProfile) -> String {
    format!(
        "You are a concise news summarizer. Write {} bullet points for a busy reader. \
         Preserve factual accuracy; avoid speculation.",
        profile.bullet_count
    )
}

fn user_prompt(input: &ArticleInput<'_>, profile: &ReadingTimeProfile) -> String {
    let mut lines = vec![format!("URL: {}", input.url)];
    if let Some(title) = input.title.filter(|t| !t.is_empty()) {
        lines.push(format!("Title: {title}"));
    }
    lines.push("Content:".to_string());
    lines.push(truncate_chars(input.content, PROMPT_CONTENT_CHARS).to_string());
    lines.push(format!(
        "Return JSON with shape {{headline, bullets[]}} where headline is <= {} characters.",
        profile.headline_max_length
    ));
    lines.join("\n")
}

/// Turn the model's message content into a summary, degrading instead of failing.
///
/// Missing or malformed JSON yields no bullets; a missing headline falls back
/// to the page title, then the URL. Headline and bullets are cut to the
/// profile's limits and non-string bullets are dropped.
pub fn parse_model_output(
    raw: &str,
    input: &ArticleInput<'_>,
    profile: &ReadingTimeProfile,
) -> SummaryResult {
    let parsed = match serde_json::from_str::<Value>(raw) {
        Ok(value) => value,
        Err(e) => {
            if looks_truncated(&e) {
                warn!(url = %input.url, "Model output cut off before the JSON closed");
            }
            warn!(
                url = %input.url,
                error = %e,
                output_preview = %truncate_for_log(raw, 200),
                "Model returned non-JSON output; using fallback summary"
            );
            Value::Null
        }
    };

    let headline = parsed
        .get("headline")
        .and_then(Value::as_str)
        .or(input.title)
        .unwrap_or(input.url);

    let bullets = parsed
        .get("bullets")
        .and_then(Value::as_array)
        .map(|bullets| {
            bullets
                .iter()
                .filter_map(Value::as_str)
                .take(profile.bullet_count)
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    SummaryResult {
        url: input.url.to_string(),
        headline: truncate_chars(headline, profile.headline_max_length).to_string(),
        bullets,
    }
}

#[async_trait]
impl SummarizationBackend for OpenAiSummarizer {
    fn name(&self) -> &'static str {
        "OpenAI"
    }

    #[instrument(level = "info", skip_all, fields(url = %input.url, reading_time = %input.reading_time))]
    async fn summarize_article(&self, input: ArticleInput<'_>) -> Result<SummaryResult, BackendError> {
        let profile = input.reading_time.profile();
        let request = ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            max_tokens: profile.max_tokens,
            response_format: ResponseFormat { kind: "json_object" },
            messages: [
                ChatMessage {
                    role: "system",
                    content: system_prompt(profile),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt(&input, profile),
                },
            ],
        };

        let t0 = Instant::now();
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|source| BackendError::Transport {
                backend: self.name(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), elapsed_ms = t0.elapsed().as_millis() as u64, "Chat completion rejected");
            return Err(BackendError::Status {
                backend: self.name(),
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or_default().to_string(),
            });
        }

        let envelope: Value = response.json().await.map_err(|source| BackendError::Decode {
            backend: self.name(),
            source,
        })?;
        debug!(elapsed_ms = t0.elapsed().as_millis() as u64, "Chat completion received");

        let raw = envelope
            .pointer("/choices/0/message/content")
            .and_then(Value::as_str)
            .unwrap_or("{}");

        Ok(parse_model_output(raw, &input, profile))
    }
}
