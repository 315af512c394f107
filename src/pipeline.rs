//! Link-processing and concurrent summarization.
//!
//! # Flow
//!
//! 1. Unwrap tracking links and drop duplicates ([`dedup_links`])
//! 2. Apply the article caps ([`allowed_count`])
//! 3. Run classify → fetch → summarize for every surviving link at once
//! 4. Fold the per-link outcomes into a [`SummaryResponse`] ([`aggregate`])
//!
//! Every link yields exactly one [`LinkOutcome`]. A failure at any stage
//! becomes a [`SkipRecord`] for that link and never touches its siblings.
//! Tasks share nothing mutable: each returns its own outcome (and backend
//! timing) tagged with its input index, and the aggregator places summaries
//! into slots by that index, so completion order never leaks into the output.

use crate::api::{BackendError, SummarizationBackend};
use crate::classify::is_likely_article_url;
use crate::links::{allowed_count, dedup_links};
use crate::models::{ArticleInput, RunMetrics, SkipRecord, SummaryRequest, SummaryResponse, SummaryResult};
use crate::reading_time::ReadingTime;
use crate::scrapers::article::clean_title;
use crate::scrapers::{ArticleSource, FetchError};
use crate::utils::truncate_chars;
use futures::stream::{self, StreamExt};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

/// Skip reason used when an error renders as an empty message.
pub const GENERIC_SKIP_REASON: &str = "Failed to summarize";

/// Why a single link produced no summary.
#[derive(Debug, Error)]
pub enum LinkError {
    #[error("Not a likely article URL")]
    NotAnArticle,
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

impl LinkError {
    /// Human-readable reason for the caller's skip list.
    pub fn reason(&self) -> String {
        let reason = self.to_string();
        if reason.trim().is_empty() {
            GENERIC_SKIP_REASON.to_string()
        } else {
            reason
        }
    }
}

/// Knobs that do not come from the caller's request.
#[derive(Debug, Clone, Copy, Default)]
pub struct PipelineOptions {
    /// Upper bound on links processed at the same time. `None` launches every
    /// link at once (the fan-out is already capped by the article limits).
    pub max_concurrency: Option<usize>,
}

/// Result of processing one link.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    Summarized {
        summary: SummaryResult,
        /// Wall-clock duration of the backend call.
        backend_ms: f64,
    },
    Skipped(SkipRecord),
}

/// Summarize every usable link of `request`.
///
/// Never fails as a whole: per-link problems end up in `skipped`.
#[instrument(level = "info", skip_all, fields(links = request.links.len(), reading_time = %request.reading_time))]
pub async fn summarize_links(
    request: &SummaryRequest,
    source: &dyn ArticleSource,
    backend: &dyn SummarizationBackend,
    options: PipelineOptions,
) -> SummaryResponse {
    let deduped = dedup_links(&request.links);
    let allowed = allowed_count(request.article_limit, request.max_articles);
    info!(
        received = request.links.len(),
        deduped = deduped.len(),
        allowed,
        "Deduped links"
    );

    let limited: Vec<String> = deduped.iter().take(allowed).cloned().collect();
    let width = options
        .max_concurrency
        .unwrap_or(limited.len())
        .max(1);
    let reading_time = request.reading_time;
    debug!(tasks = limited.len(), width, backend = backend.name(), "Launching link tasks");

    let outcomes: Vec<(usize, LinkOutcome)> = stream::iter(limited.into_iter().enumerate())
        .map(|(index, url)| async move {
            let outcome = process_link(index, url, reading_time, source, backend).await;
            (index, outcome)
        })
        .buffer_unordered(width)
        .collect()
        .await;

    let response = aggregate(deduped.len(), outcomes);
    info!(
        received = request.links.len(),
        deduped = response.meta.deduped_count,
        backend_calls = response.meta.backend_calls,
        summaries = response.summaries.len(),
        skipped = response.skipped.len(),
        avg_backend_ms = response.meta.avg_backend_ms,
        "Completed summarization"
    );
    response
}

async fn process_link(
    index: usize,
    url: String,
    reading_time: ReadingTime,
    source: &dyn ArticleSource,
    backend: &dyn SummarizationBackend,
) -> LinkOutcome {
    if !is_likely_article_url(&url) {
        warn!(index, %url, "Skipping non-article URL");
        return LinkOutcome::Skipped(SkipRecord {
            url,
            reason: LinkError::NotAnArticle.reason(),
        });
    }

    match summarize_one(&url, reading_time, source, backend).await {
        Ok((summary, backend_ms)) => {
            info!(index, %url, backend_ms, bullets = summary.bullets.len(), "Summarized link");
            LinkOutcome::Summarized { summary, backend_ms }
        }
        Err(e) => {
            warn!(index, %url, error = %e, detail = ?e, "Skipping link");
            LinkOutcome::Skipped(SkipRecord {
                url,
                reason: e.reason(),
            })
        }
    }
}

async fn summarize_one(
    url: &str,
    reading_time: ReadingTime,
    source: &dyn ArticleSource,
    backend: &dyn SummarizationBackend,
) -> Result<(SummaryResult, f64), LinkError> {
    let article = source.fetch_article(url).await?;

    let started = Instant::now();
    let summary = backend
        .summarize_article(ArticleInput::from((&article, reading_time)))
        .await?;
    let backend_ms = started.elapsed().as_secs_f64() * 1000.0;

    let profile = reading_time.profile();
    let headline = display_headline(article.title.as_deref(), &summary.headline, &article.url);
    let headline = truncate_chars(&headline, profile.headline_max_length).to_string();
    let bullets = summary
        .bullets
        .into_iter()
        .take(profile.bullet_count)
        .collect();

    Ok((
        SummaryResult {
            url: article.url,
            headline,
            bullets,
        },
        backend_ms,
    ))
}

/// Pick the headline shown to the reader.
///
/// The page's own title beats a model-written headline; the URL is the last
/// resort. Whichever wins is passed through [`clean_title`].
pub fn display_headline(title: Option<&str>, backend_headline: &str, url: &str) -> String {
    let chosen = title
        .filter(|t| !t.trim().is_empty())
        .or(Some(backend_headline).filter(|h| !h.trim().is_empty()))
        .unwrap_or(url);
    clean_title(chosen)
}

/// Fold per-link outcomes into the response.
///
/// `outcomes` carries each link's input index; summaries are slotted by it
/// and empty slots (skipped links) are dropped. Skips keep arrival order.
pub fn aggregate(deduped_count: usize, outcomes: Vec<(usize, LinkOutcome)>) -> SummaryResponse {
    let mut slots: Vec<Option<SummaryResult>> = vec![None; outcomes.len()];
    let mut skipped = Vec::new();
    let mut durations = Vec::new();

    for (index, outcome) in outcomes {
        match outcome {
            LinkOutcome::Summarized { summary, backend_ms } => {
                durations.push(backend_ms);
                match slots.get_mut(index) {
                    Some(slot) => *slot = Some(summary),
                    None => warn!(index, "Outcome index outside the slot range; dropping"),
                }
            }
            LinkOutcome::Skipped(record) => skipped.push(record),
        }
    }

    let avg_backend_ms = if durations.is_empty() {
        0.0
    } else {
        durations.iter().sum::<f64>() / durations.len() as f64
    };

    SummaryResponse {
        summaries: slots.into_iter().flatten().collect(),
        skipped,
        meta: RunMetrics {
            deduped_count,
            backend_calls: durations.len(),
            avg_backend_ms,
        },
    }
}
