//! Full article fetch and HTML-to-text reduction.
//!
//! The text handed to the summarization backend is deliberately crude:
//! script and style blocks are dropped, every remaining tag becomes a space,
//! and whitespace is collapsed. The body is then capped at
//! [`MAX_CONTENT_CHARS`] characters to bound backend input size and cost.

use super::FetchError;
use crate::models::ArticleIngestionResult;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use tracing::{info, instrument};

/// Upper bound on article text, in characters.
pub const MAX_CONTENT_CHARS: usize = 12_000;

/// Site-name separator tried first when cleaning a page title.
pub const TITLE_SEPARATOR: char = '|';

/// Fallback separator, as in "Story - Site".
pub const TITLE_DASH_SEPARATOR: &str = " - ";

static SCRIPT_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<script.*?</script>").expect("valid script regex"));
static STYLE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<style.*?</style>").expect("valid style regex"));
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"</?[^>]+(>|$)").expect("valid tag regex"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid whitespace regex"));
static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").expect("valid title selector"));

/// Fetch `url` (following redirects) and reduce it to title + text.
///
/// # Errors
///
/// [`FetchError::Status`] for any non-2xx answer, [`FetchError::Network`]
/// when the request could not be made, [`FetchError::Body`] when the body
/// could not be read.
#[instrument(level = "info", skip(client))]
pub async fn fetch_article(client: &Client, url: &str) -> Result<ArticleIngestionResult, FetchError> {
    let response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Network {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let html = response.text().await.map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })?;

    let article = parse_article(url, &html);
    info!(
        bytes = html.len(),
        chars = article.content.chars().count(),
        has_title = article.title.is_some(),
        "Parsed article"
    );
    Ok(article)
}

/// Reduce a fetched page to an [`ArticleIngestionResult`].
pub fn parse_article(url: &str, html: &str) -> ArticleIngestionResult {
    ArticleIngestionResult {
        url: url.to_string(),
        title: extract_title(html),
        content: strip_html(html),
    }
}

/// Text of the first `<title>` element, cleaned with [`clean_title`].
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let raw = document
        .select(&TITLE)
        .next()?
        .text()
        .collect::<String>();
    let cleaned = clean_title(raw.trim());
    (!cleaned.is_empty()).then_some(cleaned)
}

/// Drop the site-name suffix from a page title.
///
/// Everything from the first `|` is removed; failing that, everything from
/// the first `" - "`. The result is trimmed either way.
///
/// ```
/// use link_digest::scrapers::article::clean_title;
///
/// assert_eq!(clean_title("Example | Example News"), "Example");
/// assert_eq!(clean_title("Rates rise again - The Daily"), "Rates rise again");
/// ```
pub fn clean_title(title: &str) -> String {
    let head = match title.split_once(TITLE_SEPARATOR) {
        Some((head, _)) => head,
        None => match title.split_once(TITLE_DASH_SEPARATOR) {
            Some((head, _)) => head,
            None => title,
        },
    };
    head.trim().to_string()
}

/// Plain text of an HTML page, whitespace-collapsed and capped.
pub fn strip_html(html: &str) -> String {
    let text = SCRIPT_BLOCK.replace_all(html, "");
    let text = STYLE_BLOCK.replace_all(&text, "");
    let text = ANY_TAG.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().chars().take(MAX_CONTENT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::spawn_server;
    use axum::http::StatusCode;
    use axum::response::Html as HtmlResponse;
    use axum::{Router, routing::get};

    const PAGE: &str = r#"<!doctype html>
<html>
  <head>
    <title>  Example | Example News </title>
    <style type="text/css">body { color: red; }</style>
    <script>window.tracker = "<p>not text</p>";</script>
  </head>
  <body>
    <h1>Example</h1>
    <p>First   paragraph.</p>
    <SCRIPT src="x.js"></SCRIPT>
    <p>Second<br/>paragraph.</p>
  </body>
</html>"#;

    #[test]
    fn test_clean_title_pipe_wins_over_dash() {
        assert_eq!(clean_title("Story - Part 2 | Site"), "Story - Part 2");
    }

    #[test]
    fn test_clean_title_dash_separator() {
        assert_eq!(clean_title("Story title - Site - Section"), "Story title");
        assert_eq!(clean_title("Well-known hyphenated-words"), "Well-known hyphenated-words");
    }

    #[test]
    fn test_clean_title_trims() {
        assert_eq!(clean_title("  Plain title  "), "Plain title");
        assert_eq!(clean_title(" Left |Right"), "Left");
    }

    #[test]
    fn test_extract_title() {
        assert_eq!(extract_title(PAGE).as_deref(), Some("Example"));
        assert_eq!(extract_title("<html><body>No title</body></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
        assert_eq!(extract_title("<title>| Brand only</title>"), None);
    }

    #[test]
    fn test_extract_title_decodes_entities() {
        assert_eq!(
            extract_title("<title>Tom &amp; Jerry return</title>").as_deref(),
            Some("Tom & Jerry return")
        );
    }

    #[test]
    fn test_strip_html_drops_scripts_and_styles() {
        let text = strip_html(PAGE);
        assert_eq!(
            text,
            "Example | Example News Example First paragraph. Second paragraph."
        );
        assert!(!text.contains("tracker"));
        assert!(!text.contains("color"));
    }

    #[test]
    fn test_strip_html_caps_length() {
        let html = format!("<p>{}</p>", "é".repeat(MAX_CONTENT_CHARS + 500));
        let text = strip_html(&html);
        assert_eq!(text.chars().count(), MAX_CONTENT_CHARS);
    }

    #[test]
    fn test_strip_html_unterminated_tag() {
        assert_eq!(strip_html("text before <div class=\"x"), "text before");
    }

    #[test]
    fn test_parse_article() {
        let article = parse_article("https://news.example/a", "<title>T - S</title><p>content</p>");
        assert_eq!(article.url, "https://news.example/a");
        assert_eq!(article.title.as_deref(), Some("T"));
        assert_eq!(article.content, "T - S content");
    }

    #[tokio::test]
    async fn test_fetch_article_success() {
        let app = Router::new().route("/story", get(|| async { HtmlResponse(PAGE) }));
        let addr = spawn_server(app).await;
        let url = format!("http://{addr}/story");

        let article = fetch_article(&Client::new(), &url).await.unwrap();
        assert_eq!(article.url, url);
        assert_eq!(article.title.as_deref(), Some("Example"));
        assert!(article.content.contains("First paragraph."));
    }

    #[tokio::test]
    async fn test_fetch_article_follows_redirects() {
        let app = Router::new()
            .route("/story", get(|| async { HtmlResponse(PAGE) }))
            .route(
                "/moved",
                get(|| async { (StatusCode::FOUND, [(axum::http::header::LOCATION, "/story")]) }),
            );
        let addr = spawn_server(app).await;

        let article = fetch_article(&Client::new(), &format!("http://{addr}/moved"))
            .await
            .unwrap();
        assert_eq!(article.title.as_deref(), Some("Example"));
    }

    #[tokio::test]
    async fn test_fetch_article_non_success_status() {
        let app = Router::new().route(
            "/gone",
            get(|| async { (StatusCode::FORBIDDEN, "blocked") }),
        );
        let addr = spawn_server(app).await;
        let url = format!("http://{addr}/gone");

        let err = fetch_article(&Client::new(), &url).await.unwrap_err();
        assert!(matches!(err, FetchError::Status { status: 403, .. }));
        assert_eq!(err.to_string(), format!("Failed to fetch article: {url} (403)"));
    }
}
