//! HTTP surface for the browser-side caller.
//!
//! - `GET` on any route answers a small status document
//! - `POST` on any route (normally `/` or `/summaries`) runs the pipeline on a JSON request
//! - `OPTIONS` is a bare 204; any other method is a 400 (`Only POST is supported`)
//! - CORS is open (any origin, any header, GET/POST/OPTIONS)
//!
//! Only malformed requests are rejected (400). Per-link failures are part of
//! a normal 200 response.

use crate::api::SummarizationBackend;
use crate::models::SummaryRequest;
use crate::pipeline::{PipelineOptions, summarize_links};
use crate::scrapers::ArticleSource;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, header::CONTENT_TYPE};
use axum::response::{IntoResponse, Response};
use axum::routing::{MethodRouter, get};
use axum::{Json, Router};
use serde_json::{Value, json};
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Shared by all requests; read-only.
#[derive(Clone)]
pub struct AppState {
    pub source: Arc<dyn ArticleSource>,
    pub backend: Arc<dyn SummarizationBackend>,
    pub options: PipelineOptions,
}

/// Build the router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .allow_origin(Any);

    Router::new()
        .route("/", endpoint())
        .route("/summaries", endpoint())
        .fallback(endpoint())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Same behaviour on every path: status on GET, pipeline on POST.
fn endpoint() -> MethodRouter<AppState> {
    get(health)
        .post(summaries)
        .options(|| async { StatusCode::NO_CONTENT })
        .fallback(only_post)
}

/// Bind `listen` and serve until Ctrl-C.
pub async fn serve(listen: &str, state: AppState) -> Result<(), Box<dyn Error>> {
    let addr: SocketAddr = listen.parse()?;
    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "HTTP server listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("HTTP server shutting down");
        })
        .await?;
    Ok(())
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn summaries(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let is_json = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.contains("application/json"));
    if !is_json {
        return bad_request("Expected application/json payload");
    }

    let Ok(value) = serde_json::from_slice::<Value>(&body) else {
        return bad_request("Invalid JSON");
    };

    let request = match SummaryRequest::from_json(&value) {
        Ok(request) => request,
        Err(e) => return bad_request(&e.to_string()),
    };

    info!(
        links = request.links.len(),
        reading_time = %request.reading_time,
        article_limit = ?request.article_limit,
        max_articles = ?request.max_articles,
        "Received request"
    );

    let response = summarize_links(
        &request,
        state.source.as_ref(),
        state.backend.as_ref(),
        state.options,
    )
    .await;

    Json(response).into_response()
}

async fn only_post() -> Response {
    bad_request("Only POST is supported")
}

fn bad_request(message: &str) -> Response {
    warn!(%message, "Rejected request");
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::BackendError;
    use crate::models::{ArticleIngestionResult, ArticleInput, SummaryResponse, SummaryResult};
    use crate::scrapers::FetchError;
    use crate::scrapers::article::parse_article;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use tower::ServiceExt;

    struct PageSource;

    #[async_trait]
    impl ArticleSource for PageSource {
        async fn fetch_article(&self, url: &str) -> Result<ArticleIngestionResult, FetchError> {
            Ok(parse_article(
                url,
                "<html><title>Example</title><body><h1>Example</h1><p>content</p></body></html>",
            ))
        }
    }

    struct EchoBackend;

    #[async_trait]
    impl SummarizationBackend for EchoBackend {
        fn name(&self) -> &'static str {
            "echo"
        }

        async fn summarize_article(&self, input: ArticleInput<'_>) -> Result<SummaryResult, BackendError> {
            Ok(SummaryResult {
                url: input.url.to_string(),
                headline: format!("Headline for {}", input.url),
                bullets: vec!["Point A".to_string(), "Point B".to_string()],
            })
        }
    }

    fn app() -> Router {
        router(AppState {
            source: Arc::new(PageSource),
            backend: Arc::new(EchoBackend),
            options: PipelineOptions::default(),
        })
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "link_digest");
    }

    #[tokio::test]
    async fn test_rejects_non_json_post() {
        let request = Request::builder()
            .method("POST")
            .uri("/summaries")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Expected application/json payload");
    }

    #[tokio::test]
    async fn test_rejects_invalid_json_and_empty_links() {
        let response = app().oneshot(post_json("/", "{not json")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid JSON");

        let response = app().oneshot(post_json("/", r#"{"links": []}"#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "No links provided");

        let response = app().oneshot(post_json("/", "42")).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await["error"], "Invalid payload");
    }

    #[tokio::test]
    async fn test_summarizes_links() {
        let body = r#"{
            "links": ["https://example.com/news/example-article-title-goes-here", "https://example.com/"],
            "readingTime": "quick",
            "maxArticles": 5
        }"#;
        let response = app().oneshot(post_json("/summaries", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let payload: SummaryResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(payload.summaries.len(), 1);
        assert_eq!(payload.summaries[0].headline, "Example");
        assert_eq!(payload.skipped.len(), 1);
        assert_eq!(payload.meta.deduped_count, 2);
        assert_eq!(payload.meta.backend_calls, 1);
    }

    #[tokio::test]
    async fn test_missing_max_articles_processes_one_link() {
        let body = r#"{
            "links": ["https://example.com/news/example-article-title-goes-here", "https://example.com/"]
        }"#;
        let response = app().oneshot(post_json("/summaries", body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let payload: SummaryResponse = serde_json::from_value(body_json(response).await).unwrap();
        assert_eq!(payload.meta.deduped_count, 2);
        assert_eq!(payload.summaries.len(), 1);
        assert!(payload.skipped.is_empty());
    }

    #[tokio::test]
    async fn test_get_anywhere_answers_status() {
        for uri in ["/summaries", "/anything"] {
            let response = app()
                .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(body_json(response).await["status"], "ok");
        }
    }

    #[tokio::test]
    async fn test_other_methods_are_rejected() {
        for (method, uri) in [("PUT", "/"), ("DELETE", "/summaries"), ("PATCH", "/anything")] {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            let response = app().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{method} {uri}");
            assert_eq!(body_json(response).await["error"], "Only POST is supported");
        }
    }

    #[tokio::test]
    async fn test_plain_options_is_no_content() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_cors_preflight() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/summaries")
            .header("origin", "https://mail.example")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );
    }
}
