//! Single-hop redirect resolution.
//!
//! Email links are frequently shortener or click-tracking URLs. Probing them
//! with redirects disabled reveals the next location without downloading a
//! body. Only one hop is taken here; longer chains are followed by the full
//! article GET afterwards.

use reqwest::Client;
use reqwest::header::LOCATION;
use tracing::{debug, instrument};
use url::Url;

/// Outcome of [`resolve_redirect`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Redirect {
    /// The probe answered 3xx with a usable `Location`; holds the absolute target.
    Followed(String),
    /// No redirect could be determined; holds the URL that was probed.
    Unchanged(String),
}

impl Redirect {
    pub fn into_url(self) -> String {
        match self {
            Redirect::Followed(url) | Redirect::Unchanged(url) => url,
        }
    }
}

/// Probe `url` once and resolve a single redirect hop.
///
/// `client` must have redirect following disabled. Network errors, non-3xx
/// statuses, and missing or unparseable `Location` headers all yield
/// [`Redirect::Unchanged`].
#[instrument(level = "debug", skip(client))]
pub async fn resolve_redirect(client: &Client, url: &str) -> Redirect {
    let response = match client.get(url).send().await {
        Ok(response) => response,
        Err(e) => {
            debug!(error = %e, "Redirect probe failed; keeping original URL");
            return Redirect::Unchanged(url.to_string());
        }
    };

    let status = response.status();
    if !status.is_redirection() {
        return Redirect::Unchanged(url.to_string());
    }

    let Some(location) = response
        .headers()
        .get(LOCATION)
        .and_then(|value| value.to_str().ok())
    else {
        debug!(status = status.as_u16(), "Redirect without Location header");
        return Redirect::Unchanged(url.to_string());
    };

    match Url::parse(url).and_then(|base| base.join(location)) {
        Ok(target) => {
            debug!(status = status.as_u16(), %target, "Followed one redirect hop");
            Redirect::Followed(target.to_string())
        }
        Err(e) => {
            debug!(%location, error = %e, "Unusable Location header");
            Redirect::Unchanged(url.to_string())
        }
    }
}
