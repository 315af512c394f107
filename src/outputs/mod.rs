//! Output writers for the CLI.
//!
//! - [`json`]: writes a [`SummaryResponse`](crate::models::SummaryResponse)
//!   as pretty-printed JSON to a file or to stdout

pub mod json;
