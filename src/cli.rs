//! Command-line interface definitions for link_digest.
//!
//! Backend settings can be given as flags, environment variables, or a YAML
//! file (`--config`); flags and environment variables win over the file.

use crate::config::BackendConfig;
use crate::reading_time::ReadingTime;
use clap::{Parser, Subcommand};

/// Command-line arguments for link_digest.
///
/// # Examples
///
/// ```sh
/// # Summarize two links with the quick profile
/// OPENAI_API_KEY=sk-... link_digest summarize -r quick \
///     https://news.example/2024/09/some-story-slug-here \
///     https://click.example/track?u=https%3A%2F%2Fother.example%2Fa-b-c-story
///
/// # Serve the HTTP endpoint for the browser extension
/// link_digest serve --listen 0.0.0.0:8787
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a YAML file with backend settings
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Summarization backend (only `openai` is supported)
    #[arg(long, env = "SUMMARIZER", global = true)]
    pub summarizer: Option<String>,

    /// API key for the OpenAI backend
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, global = true)]
    pub openai_api_key: Option<String>,

    /// Chat model name
    #[arg(long, env = "OPENAI_MODEL", global = true)]
    pub model: Option<String>,

    /// Chat-completions endpoint URL
    #[arg(long, env = "OPENAI_ENDPOINT", global = true)]
    pub endpoint: Option<String>,

    /// Maximum number of links processed at the same time (default: all)
    #[arg(long, global = true)]
    pub max_concurrency: Option<usize>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Summarize the given links once and print the JSON response
    Summarize {
        /// Candidate links, in the order they appear in the email
        #[arg(required = true)]
        links: Vec<String>,

        /// Reading-time profile
        #[arg(short, long, value_enum, default_value_t = ReadingTime::Default)]
        reading_time: ReadingTime,

        /// Soft cap on summarized articles; 0 means no limit
        #[arg(long, allow_hyphen_values = true)]
        article_limit: Option<i64>,

        /// Hard cap on summarized articles
        #[arg(long, allow_hyphen_values = true)]
        max_articles: Option<i64>,

        /// Write the JSON response to this file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Serve the summarization endpoint over HTTP
    Serve {
        /// Address to listen on
        #[arg(long, env = "LINK_DIGEST_LISTEN", default_value = "127.0.0.1:8787")]
        listen: String,
    },
}

impl Cli {
    /// Backend settings given on the command line or in the environment.
    pub fn backend_overrides(&self) -> BackendConfig {
        BackendConfig {
            summarizer: self.summarizer.clone(),
            api_key: self.openai_api_key.clone(),
            model: self.model.clone(),
            endpoint: self.endpoint.clone(),
        }
    }
}
