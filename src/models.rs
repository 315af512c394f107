//! Data models shared across the pipeline.
//!
//! - [`SummaryRequest`]: what the caller asks for (links + reading time + caps)
//! - [`ArticleIngestionResult`]: a fetched page, reduced to title and text
//! - [`SummaryResult`] / [`SkipRecord`]: the per-link outcome
//! - [`RunMetrics`] / [`SummaryResponse`]: the aggregated reply
//!
//! Field names on the wire are camelCase to match the browser-side caller.

use crate::links::{ARTICLE_CAP, clamp_number};
use crate::reading_time::ReadingTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Whole-request validation failures. Nothing is processed when one occurs.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("Invalid payload")]
    InvalidPayload,
    #[error("No links provided")]
    NoLinks,
}

/// A caller request, after validation and coercion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SummaryRequest {
    /// Raw candidate links, in the order the caller found them.
    pub links: Vec<String>,
    pub reading_time: ReadingTime,
    /// Soft cap; `0` or absent means no limit.
    pub article_limit: Option<i64>,
    /// Hard cap; absent means the pipeline default.
    pub max_articles: Option<i64>,
}

impl SummaryRequest {
    pub fn new(links: Vec<String>, reading_time: ReadingTime) -> Self {
        Self {
            links,
            reading_time,
            article_limit: None,
            max_articles: None,
        }
    }

    /// Validate a decoded JSON body.
    ///
    /// Non-string entries of `links` are dropped; an empty result is an error.
    /// `readingTime` falls back to `default`. Both caps are always set: numbers
    /// and numeric strings are floored and clamped (`articleLimit` to `0..=50`,
    /// `maxArticles` to `1..=50`), and a missing or non-numeric value becomes
    /// the lower bound. A body without `maxArticles` therefore processes one
    /// link.
    pub fn from_json(body: &Value) -> Result<Self, RequestError> {
        let object = body.as_object().ok_or(RequestError::InvalidPayload)?;

        let links: Vec<String> = object
            .get("links")
            .and_then(Value::as_array)
            .map(|links| {
                links
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        if links.is_empty() {
            return Err(RequestError::NoLinks);
        }

        Ok(Self {
            links,
            reading_time: ReadingTime::coerce(object.get("readingTime").and_then(Value::as_str)),
            article_limit: Some(coerce_count(object.get("articleLimit"), 0, ARTICLE_CAP)),
            max_articles: Some(coerce_count(object.get("maxArticles"), 1, ARTICLE_CAP)),
        })
    }
}

/// Loose numeric reading of a JSON field, floored and clamped into
/// `[min, max]`. `null` and `""` read as zero, booleans as zero or one;
/// anything that is not a finite number falls back to `min`.
fn coerce_count(value: Option<&Value>, min: i64, max: i64) -> i64 {
    let number = match value {
        Some(Value::Null) => Some(0.0),
        Some(Value::Bool(b)) => Some(if *b { 1.0 } else { 0.0 }),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => match s.trim() {
            "" => Some(0.0),
            text => text.parse::<f64>().ok(),
        },
        _ => None,
    };
    match number {
        Some(n) if n.is_finite() => clamp_number(n.floor() as i64, min, max),
        _ => min,
    }
}

/// A fetched article reduced to what the backend needs.
///
/// Created by the fetcher, consumed once by the summarization backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleIngestionResult {
    /// URL after redirect resolution.
    pub url: String,
    /// Cleaned page title, if the page had one.
    pub title: Option<String>,
    /// Plain-text body, size-capped.
    pub content: String,
}

/// What the backend is asked to summarize.
#[derive(Debug, Clone, Copy)]
pub struct ArticleInput<'a> {
    pub url: &'a str,
    pub title: Option<&'a str>,
    pub content: &'a str,
    pub reading_time: ReadingTime,
}

impl<'a> From<(&'a ArticleIngestionResult, ReadingTime)> for ArticleInput<'a> {
    fn from((article, reading_time): (&'a ArticleIngestionResult, ReadingTime)) -> Self {
        Self {
            url: &article.url,
            title: article.title.as_deref(),
            content: &article.content,
            reading_time,
        }
    }
}

/// One summarized link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResult {
    pub url: String,
    pub headline: String,
    pub bullets: Vec<String>,
}

/// A link that entered the pipeline but produced no summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkipRecord {
    pub url: String,
    pub reason: String,
}

/// Per-request run metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunMetrics {
    /// Links left after unwrapping and dedup, before the caps were applied.
    #[serde(rename = "dedupedCount")]
    pub deduped_count: usize,
    /// Successful backend invocations.
    #[serde(rename = "adapterCalls")]
    pub backend_calls: usize,
    /// Mean wall-clock duration of the successful backend calls.
    #[serde(rename = "avgAdapterMs")]
    pub avg_backend_ms: f64,
}

/// The reply for one request.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Summaries in input order.
    pub summaries: Vec<SummaryResult>,
    /// Skipped links; order is not significant.
    pub skipped: Vec<SkipRecord>,
    pub meta: RunMetrics,
}
