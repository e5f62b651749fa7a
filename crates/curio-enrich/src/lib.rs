//! Bookmark enrichment pipeline.
//!
//! Resolves bookmark content, derives tags via a keyword engine and a
//! summary via a summarizer engine, and writes the enriched metadata back
//! to the bookmark service.

use std::time::Duration;

mod content;
mod error;
mod pipeline;
mod summary;
mod tags;

pub use content::ContentResolver;
pub use error::EnrichError;
pub use pipeline::Pipeline;
pub use summary::{Summarizer, MAX_SUMMARY_CHARS, MIN_SUMMARY_INPUT_CHARS};
pub use tags::TagExtractor;

/// Builds the HTTP client shared by the content resolver and engine
/// adapters.
///
/// # Errors
///
/// Returns a `reqwest::Error` if the client cannot be constructed.
pub fn build_http_client(
    timeout_secs: u64,
    user_agent: &str,
) -> Result<reqwest::Client, reqwest::Error> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .user_agent(user_agent.to_owned())
        .build()
}
