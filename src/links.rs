//! Link preparation: tracking-wrapper unwrapping, normalization, dedup and
//! article-count limits.
//!
//! Everything here is pure and runs before any network call. Unwrapping
//! happens first so that two different wrappers around the same target
//! collapse into one entry during dedup.

use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::{alphabet, Engine as _};
use itertools::Itertools;
use tracing::debug;
use url::Url;

/// Query parameters that commonly carry the real destination of a wrapper.
pub const TRACKING_QUERY_KEYS: [&str; 4] = ["url", "u", "target", "redirect"];

/// Path segments shorter than this are never treated as base64 targets.
pub const MIN_ENCODED_SEGMENT_LEN: usize = 16;

/// Hard ceiling for both article caps.
pub const ARTICLE_CAP: i64 = 50;

/// `maxArticles` used when the caller sends none.
pub const DEFAULT_MAX_ARTICLES: i64 = 10;

// Standard alphabet, padding optional, like a browser's `atob`.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Outcome of [`unwrap_tracking`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unwrapped {
    /// A wrapped destination was found.
    Target(String),
    /// Nothing to unwrap (or the URL could not be parsed).
    Original(String),
}

impl Unwrapped {
    pub fn into_url(self) -> String {
        match self {
            Unwrapped::Target(url) | Unwrapped::Original(url) => url,
        }
    }
}

/// Canonicalize a URL for dedup comparison.
///
/// Strict parse, fragment removed, serialized back. Input that does not
/// parse is returned unchanged; normalization never fails.
pub fn normalize_url(url: &str) -> String {
    match Url::parse(url) {
        Ok(mut parsed) => {
            parsed.set_fragment(None);
            parsed.to_string()
        }
        Err(_) => url.to_string(),
    }
}

/// Detect and unwrap link-shortener / redirect-wrapper URLs.
///
/// Tried in order, first match wins:
///
/// 1. A query parameter from [`TRACKING_QUERY_KEYS`] whose value is itself
///    an `http…` URL, percent-decoded once more or taken raw.
/// 2. A path segment of at least [`MIN_ENCODED_SEGMENT_LEN`] characters that
///    decodes as URL-safe base64 to an `http…` URL.
pub fn unwrap_tracking(url: &str) -> Unwrapped {
    let Ok(parsed) = Url::parse(url) else {
        return Unwrapped::Original(url.to_string());
    };

    if let Some(target) = query_target(&parsed) {
        debug!(%url, %target, "Unwrapped tracking query parameter");
        return Unwrapped::Target(target);
    }

    if let Some(target) = encoded_path_target(&parsed) {
        debug!(%url, %target, "Unwrapped base64 path segment");
        return Unwrapped::Target(target);
    }

    Unwrapped::Original(url.to_string())
}

fn query_target(parsed: &Url) -> Option<String> {
    for key in TRACKING_QUERY_KEYS {
        let Some(value) = parsed
            .query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
        else {
            continue;
        };
        if value.is_empty() {
            continue;
        }
        if let Ok(decoded) = urlencoding::decode(&value) {
            if decoded.starts_with("http") {
                return Some(decoded.into_owned());
            }
        }
        if value.starts_with("http") {
            return Some(value);
        }
    }
    None
}

fn encoded_path_target(parsed: &Url) -> Option<String> {
    parsed
        .path()
        .split('/')
        .filter(|segment| segment.len() >= MIN_ENCODED_SEGMENT_LEN)
        .find_map(decode_segment)
}

fn decode_segment(segment: &str) -> Option<String> {
    let translated = segment.replace('-', "+").replace('_', "/");
    let bytes = LENIENT_BASE64.decode(translated).ok()?;
    let decoded = String::from_utf8(bytes).ok()?;
    decoded.starts_with("http").then_some(decoded)
}

/// Unwrap every link and drop later duplicates.
///
/// Two links are duplicates when their unwrapped forms normalize to the same
/// string. The first occurrence (by input order) survives, in its unwrapped
/// (not normalized) form.
pub fn dedup_links<I, S>(links: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    links
        .into_iter()
        .map(|link| unwrap_tracking(link.as_ref()).into_url())
        .unique_by(|link| normalize_url(link))
        .collect()
}

/// Clamp a caller-supplied number into `[min, max]`.
pub fn clamp_number(value: i64, min: i64, max: i64) -> i64 {
    value.max(min).min(max)
}

/// Number of deduped links that may be processed for one request.
///
/// `article_limit` is a soft cap where `0` (or absent) means "no limit";
/// `max_articles` is the hard cap and has no such special case. Both are
/// clamped independently before they are combined.
pub fn allowed_count(article_limit: Option<i64>, max_articles: Option<i64>) -> usize {
    let limit = clamp_number(article_limit.unwrap_or(0), 0, ARTICLE_CAP);
    let max = clamp_number(max_articles.unwrap_or(DEFAULT_MAX_ARTICLES), 1, ARTICLE_CAP);
    let allowed = if limit > 0 { limit.min(max) } else { max };
    allowed as usize
}
