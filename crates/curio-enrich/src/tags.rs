//! Keyword-engine adapter for tag derivation.

use curio_core::slugify_tag;
use serde::{Deserialize, Serialize};

use crate::error::EnrichError;

/// Keyword-engine HTTP client.
pub(crate) struct KeywordClient {
    client: reqwest::Client,
    url: String,
}

#[derive(Serialize)]
struct KeywordsRequest<'a> {
    text: &'a str,
    top_n: usize,
}

#[derive(Deserialize)]
struct KeywordsResponse {
    keywords: Vec<KeywordCandidate>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeywordCandidate {
    pub(crate) keyword: String,
    pub(crate) score: f32,
}

impl KeywordClient {
    pub(crate) fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client,
            url: format!("{}/keywords", base_url.trim_end_matches('/')),
        }
    }

    /// Asks the engine for up to `top_n` keyword candidates.
    async fn keywords(
        &self,
        text: &str,
        top_n: usize,
    ) -> Result<Vec<KeywordCandidate>, EnrichError> {
        let request = KeywordsRequest { text, top_n };
        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    EnrichError::Timeout(format!("keyword engine timed out: {e}"))
                } else {
                    EnrichError::ExtractionUnavailable(format!("keyword engine request failed: {e}"))
                }
            })?;

        if !response.status().is_success() {
            return Err(EnrichError::ExtractionUnavailable(format!(
                "keyword engine returned status {}",
                response.status()
            )));
        }

        let parsed: KeywordsResponse = response.json().await.map_err(|e| {
            EnrichError::ExtractionUnavailable(format!("keyword engine response parse error: {e}"))
        })?;

        Ok(parsed.keywords)
    }
}

/// Derives slug-formatted tags from bookmark text via the keyword engine.
pub struct TagExtractor {
    client: KeywordClient,
}

impl TagExtractor {
    #[must_use]
    pub fn new(client: reqwest::Client, base_url: &str) -> Self {
        Self {
            client: KeywordClient::new(client, base_url),
        }
    }

    /// Extracts at most `max_tags` slug tags for `text`.
    ///
    /// Candidates are ranked by engine score descending, ties broken by the
    /// keyword's first occurrence in the text (earlier wins). Slugs are
    /// deduplicated keeping the first occurrence.
    ///
    /// # Errors
    ///
    /// - [`EnrichError::ExtractionUnavailable`] when the engine is
    ///   unreachable, answers non-2xx, returns malformed JSON, or yields no
    ///   usable candidates for non-empty input.
    /// - [`EnrichError::Timeout`] when the engine request times out.
    pub async fn extract(&self, text: &str, max_tags: usize) -> Result<Vec<String>, EnrichError> {
        let candidates = self.client.keywords(text, max_tags).await?;
        let tags = rank_and_slug(candidates, text, max_tags);

        if tags.is_empty() && !text.trim().is_empty() {
            return Err(EnrichError::ExtractionUnavailable(
                "keyword engine returned no usable keywords".to_owned(),
            ));
        }

        Ok(tags)
    }
}

/// Orders candidates, slugifies them, and caps the result at `max_tags`.
pub(crate) fn rank_and_slug(
    mut candidates: Vec<KeywordCandidate>,
    text: &str,
    max_tags: usize,
) -> Vec<String> {
    let lower_text = text.to_lowercase();
    let position = |keyword: &str| {
        lower_text
            .find(&keyword.to_lowercase())
            .unwrap_or(usize::MAX)
    };

    candidates.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then_with(|| position(&a.keyword).cmp(&position(&b.keyword)))
    });

    let mut tags: Vec<String> = Vec::new();
    for candidate in candidates {
        let slug = slugify_tag(&candidate.keyword);
        if slug.is_empty() || tags.contains(&slug) {
            continue;
        }
        tags.push(slug);
        if tags.len() == max_tags {
            break;
        }
    }

    tags
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(keyword: &str, score: f32) -> KeywordCandidate {
        KeywordCandidate {
            keyword: keyword.to_owned(),
            score,
        }
    }

    #[test]
    fn ranks_by_score_descending() {
        let tags = rank_and_slug(
            vec![
                candidate("databases", 0.4),
                candidate("rust", 0.9),
                candidate("async", 0.7),
            ],
            "rust async databases",
            5,
        );
        assert_eq!(tags, vec!["rust", "async", "databases"]);
    }

    #[test]
    fn ties_broken_by_first_occurrence_in_text() {
        let tags = rank_and_slug(
            vec![candidate("later", 0.5), candidate("earlier", 0.5)],
            "earlier words come before later ones",
            5,
        );
        assert_eq!(tags, vec!["earlier", "later"]);
    }

    #[test]
    fn candidate_missing_from_text_sorts_after_present_ties() {
        let tags = rank_and_slug(
            vec![candidate("absent", 0.5), candidate("present", 0.5)],
            "the present word appears here",
            5,
        );
        assert_eq!(tags, vec!["present", "absent"]);
    }

    #[test]
    fn slugs_are_normalized_and_deduplicated() {
        let tags = rank_and_slug(
            vec![
                candidate("Machine Learning", 0.9),
                candidate("machine-learning", 0.8),
                candidate("!!!", 0.7),
                candidate("Rust Lang", 0.6),
            ],
            "machine learning in rust lang",
            5,
        );
        assert_eq!(tags, vec!["machine-learning", "rust-lang"]);
    }

    #[test]
    fn result_is_capped_at_max_tags() {
        let tags = rank_and_slug(
            vec![
                candidate("one", 0.9),
                candidate("two", 0.8),
                candidate("three", 0.7),
            ],
            "one two three",
            2,
        );
        assert_eq!(tags, vec!["one", "two"]);
    }
}
