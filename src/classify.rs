//! Article-likelihood heuristic.
//!
//! Email links point at homepages, category pages, profiles and unsubscribe
//! pages as often as at stories. A story URL almost always carries a slug,
//! a path segment made of several hyphen-joined words, so that is what we
//! look for. Misses are preferred over false hits: every accepted link costs
//! a fetch and a backend call.

use url::Url;

/// Paths shorter than this are never articles.
pub const MIN_ARTICLE_PATH_LEN: usize = 10;

/// Hyphen-separated tokens a segment needs before it counts as a slug.
pub const MIN_SLUG_TOKENS: usize = 3;

/// Minimum length of a token that counts towards [`MIN_SLUG_TOKENS`].
pub const MIN_SLUG_TOKEN_LEN: usize = 3;

/// Does this URL plausibly reference a long-form article?
///
/// # Examples
///
/// ```
/// use link_digest::classify::is_likely_article_url;
///
/// assert!(is_likely_article_url("https://news.example/2024/10/breaking-news-story-details"));
/// assert!(!is_likely_article_url("https://news.example/about"));
/// ```
pub fn is_likely_article_url(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    let path = parsed.path();
    if path.is_empty() || path == "/" || path.len() < MIN_ARTICLE_PATH_LEN {
        return false;
    }
    path.split('/')
        .filter(|segment| !segment.is_empty())
        .any(is_slug)
}

/// A segment is a slug when enough of its hyphen tokens look like words.
pub fn is_slug(segment: &str) -> bool {
    segment
        .split('-')
        .filter(|token| {
            token.len() >= MIN_SLUG_TOKEN_LEN && token.chars().any(|c| c.is_ascii_alphabetic())
        })
        .count()
        >= MIN_SLUG_TOKENS
}
