//! Article retrieval.
//!
//! Retrieval is split in two network steps plus one pure step:
//!
//! 1. **Redirect probe** ([`redirect`]): one request with redirects disabled,
//!    to see through a single hop of shorteners and click trackers.
//! 2. **Fetch** ([`article`]): a full GET that follows any remaining
//!    redirects, with browser-like headers.
//! 3. **Parse** ([`article::parse_article`]): title + plain text, size-capped.
//!
//! The orchestrator only talks to the [`ArticleSource`] trait, so the
//! network can be swapped for stubs in tests.

pub mod article;
pub mod redirect;

use crate::links::unwrap_tracking;
use crate::models::ArticleIngestionResult;
use async_trait::async_trait;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use reqwest::{Client, redirect::Policy};
use thiserror::Error;
use tracing::{debug, instrument};

/// Some sites block non-browser agents outright.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

pub const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Per-link retrieval failures.
///
/// Messages name the URL and, where there is one, the HTTP status. Transport
/// details stay in the `source` chain for logging and are not part of the
/// message shown to callers.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Failed to fetch article: {url} ({status})")]
    Status { url: String, status: u16 },
    #[error("Failed to fetch article: {url} (network error)")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("Failed to read article body: {url}")]
    Body {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// Anything that can turn a link into article text.
#[async_trait]
pub trait ArticleSource: Send + Sync {
    async fn fetch_article(&self, url: &str) -> Result<ArticleIngestionResult, FetchError>;
}

/// The production [`ArticleSource`]: unwrap, probe one redirect hop, fetch.
#[derive(Debug, Clone)]
pub struct HttpArticleSource {
    probe: Client,
    client: Client,
}

impl HttpArticleSource {
    /// Build the two HTTP clients (one with redirects disabled for probing).
    pub fn new() -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));

        let probe = Client::builder()
            .redirect(Policy::none())
            .user_agent(BROWSER_USER_AGENT)
            .build()?;
        let client = Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .default_headers(headers)
            .build()?;

        Ok(Self { probe, client })
    }
}

#[async_trait]
impl ArticleSource for HttpArticleSource {
    #[instrument(level = "info", skip_all, fields(%url))]
    async fn fetch_article(&self, url: &str) -> Result<ArticleIngestionResult, FetchError> {
        let unwrapped = unwrap_tracking(url).into_url();
        let resolved = redirect::resolve_redirect(&self.probe, &unwrapped)
            .await
            .into_url();
        if resolved != url {
            debug!(from = %url, to = %resolved, "Resolved article URL");
        }
        article::fetch_article(&self.client, &resolved).await
    }
}
