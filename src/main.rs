//! # link_digest
//!
//! Summarize the links of an email, once from the command line or as an
//! HTTP service for a browser extension.
//!
//! ## Usage
//!
//! ```sh
//! link_digest summarize -r quick https://news.example/2024/09/some-story-slug
//! link_digest serve --listen 127.0.0.1:8787
//! ```
//!
//! The summarization backend is configured once, before any link is touched;
//! a missing API key or an unknown backend stops the process immediately.

use clap::Parser;
use link_digest::cli::{Cli, Command};
use link_digest::config::{BackendConfig, build_summarizer};
use link_digest::outputs::json;
use link_digest::pipeline::{PipelineOptions, summarize_links};
use link_digest::scrapers::HttpArticleSource;
use link_digest::server::{self, AppState};
use link_digest::SummaryRequest;
use std::error::Error;
use std::sync::Arc;
use tracing::{debug, error, info};
use tracing_subscriber::{EnvFilter, fmt as tfmt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_writer(std::io::stderr)
        .init();

    let start_time = std::time::Instant::now();
    info!("link_digest starting up");

    let args = Cli::parse();
    debug!(?args.command, config = ?args.config, "Parsed CLI arguments");

    // ---- Backend setup (fail fast) ----
    let file_config = match &args.config {
        Some(path) => BackendConfig::from_yaml_file(path)?,
        None => BackendConfig::default(),
    };
    let backend_config = file_config.merge(args.backend_overrides());
    let backend = build_summarizer(&backend_config).inspect_err(|e| {
        error!(error = %e, "Summarizer setup failed");
    })?;

    let source = Arc::new(HttpArticleSource::new()?);
    let options = PipelineOptions {
        max_concurrency: args.max_concurrency,
    };

    match args.command {
        Command::Summarize {
            links,
            reading_time,
            article_limit,
            max_articles,
            output,
        } => {
            let request = SummaryRequest {
                links,
                reading_time,
                article_limit,
                max_articles,
            };
            let response = summarize_links(&request, source.as_ref(), backend.as_ref(), options).await;

            match output {
                Some(path) => {
                    if let Err(e) = json::write_response(&response, &path).await {
                        error!(%path, error = %e, "Failed to write JSON response");
                        return Err(e);
                    }
                }
                None => json::print_response(&response).await?,
            }
        }
        Command::Serve { listen } => {
            let state = AppState {
                source,
                backend,
                options,
            };
            server::serve(&listen, state).await?;
        }
    }

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        millis = elapsed.subsec_millis(),
        "Execution complete"
    );

    Ok(())
}
