//! # link_digest
//!
//! Turns the links found in an email into short article summaries.
//!
//! The caller (a browser-side extraction tool) has no control over link
//! quality: links may be click trackers, shorteners, duplicates, social
//! profiles or homepages. This crate sorts that out and summarizes what is
//! left through a pluggable backend.
//!
//! ## Architecture
//!
//! 1. **Unwrapping & dedup** ([`links`]): peel tracking wrappers, normalize,
//!    keep the first occurrence of each target, apply the article caps
//! 2. **Classification** ([`classify`]): keep URLs that look like articles
//! 3. **Retrieval** ([`scrapers`]): one redirect probe, then a full fetch
//!    reduced to title + plain text
//! 4. **Summarization** ([`api`]): one backend call per article under a
//!    [`reading_time`] profile
//! 5. **Aggregation** ([`pipeline`]): ordered summaries, skip reasons and
//!    run metrics
//!
//! Steps 2–4 run concurrently, one task per link; a failure in one task
//! only ever turns that link into a skip.

pub mod api;
pub mod classify;
pub mod cli;
pub mod config;
pub mod links;
pub mod models;
pub mod outputs;
pub mod pipeline;
pub mod reading_time;
pub mod scrapers;
pub mod server;
pub mod utils;

#[cfg(test)]
pub(crate) mod test_support;

pub use api::{OpenAiSummarizer, SummarizationBackend};
pub use models::{SkipRecord, SummaryRequest, SummaryResponse, SummaryResult};
pub use pipeline::{PipelineOptions, summarize_links};
pub use reading_time::{ReadingTime, ReadingTimeProfile};
pub use scrapers::{ArticleSource, HttpArticleSource};
