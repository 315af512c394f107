//! JSON output for the `summarize` command.
//!
//! The document written is exactly the response the HTTP endpoint returns:
//! `{ summaries, skipped, meta }`.

use crate::models::SummaryResponse;
use crate::utils::ensure_writable_dir;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, instrument};

/// Serialize a response as pretty JSON.
pub fn render(response: &SummaryResponse) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(response)
}

/// Write a [`SummaryResponse`] to `path`, creating parent directories.
///
/// # Errors
///
/// Fails if serialization fails, the parent directory is not writable, or
/// the file cannot be written.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn write_response(response: &SummaryResponse, path: &str) -> Result<(), Box<dyn Error>> {
    let json = render(response)?;

    if let Some(parent) = Path::new(path).parent().and_then(|p| p.to_str()) {
        if !parent.is_empty() {
            ensure_writable_dir(parent).await?;
        }
    }

    fs::write(path, json).await?;
    info!(
        summaries = response.summaries.len(),
        skipped = response.skipped.len(),
        "Wrote JSON response"
    );
    Ok(())
}

/// Print a [`SummaryResponse`] to stdout.
pub async fn print_response(response: &SummaryResponse) -> Result<(), Box<dyn Error>> {
    let mut json = render(response)?;
    json.push('\n');
    let mut stdout = tokio::io::stdout();
    stdout.write_all(json.as_bytes()).await?;
    stdout.flush().await?;
    Ok(())
}
