//! Summarizer-engine adapter.

use curio_core::truncate_chars;
use serde::{Deserialize, Serialize};

use crate::error::EnrichError;

/// Inputs shorter than this (after trimming) are not worth summarizing.
pub const MIN_SUMMARY_INPUT_CHARS: usize = 80;

/// Upper bound on summary length written back to a bookmark note.
pub const MAX_SUMMARY_CHARS: usize = 2_000;

/// Summary-engine HTTP client.
pub struct Summarizer {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct SummarizeRequest<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct SummarizeResponse {
    summary: String,
}

impl Summarizer {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/summarize", base_url.trim_end_matches('/')),
        }
    }

    /// Produces a summary for `text`, or `None` when there is nothing to
    /// summarize.
    ///
    /// Inputs shorter than [`MIN_SUMMARY_INPUT_CHARS`] after trimming and
    /// blank engine output both yield `Ok(None)`. Non-blank output is
    /// truncated to [`MAX_SUMMARY_CHARS`] characters.
    ///
    /// # Errors
    ///
    /// - [`EnrichError::SummarizationUnavailable`] when the engine is
    ///   unreachable, answers non-2xx, or returns malformed JSON.
    /// - [`EnrichError::Timeout`] when the engine request times out.
    pub async fn summarize(&self, text: &str) -> Result<Option<String>, EnrichError> {
        let trimmed = text.trim();
        if trimmed.chars().count() < MIN_SUMMARY_INPUT_CHARS {
            return Ok(None);
        }

        let request = SummarizeRequest { text: trimmed };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EnrichError::Timeout(format!("summary engine timed out: {e}"))
                } else {
                    EnrichError::SummarizationUnavailable(format!(
                        "summary engine request failed: {e}"
                    ))
                }
            })?;

        if !response.status().is_success() {
            return Err(EnrichError::SummarizationUnavailable(format!(
                "summary engine returned status {}",
                response.status()
            )));
        }

        let parsed: SummarizeResponse = response.json().await.map_err(|e| {
            EnrichError::SummarizationUnavailable(format!(
                "summary engine response parse error: {e}"
            ))
        })?;

        let summary = parsed.summary.trim();
        if summary.is_empty() {
            return Ok(None);
        }

        Ok(Some(truncate_chars(summary, MAX_SUMMARY_CHARS)))
    }
}
