//! Enrichment orchestration.
//!
//! Drives the per-item ladder (fetch descriptor, resolve content, derive
//! tags and summary, write back) and fans requested ids out across a bounded
//! number of in-flight items.

use std::time::Instant;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use uuid::Uuid;

use curio_core::{merge_tags, AppConfig, EnrichmentConfig, EnrichmentResult, ProcessingRun, MARKER_TAG};
use curio_raindrop::{RaindropClient, RaindropError};

use crate::content::ContentResolver;
use crate::error::EnrichError;
use crate::summary::Summarizer;
use crate::tags::TagExtractor;
use crate::build_http_client;

/// The enrichment pipeline and its upstream clients.
pub struct Pipeline {
    raindrop: RaindropClient,
    resolver: ContentResolver,
    tags: TagExtractor,
    summarizer: Summarizer,
    max_concurrent_items: usize,
}

impl Pipeline {
    #[must_use]
    pub fn new(
        raindrop: RaindropClient,
        resolver: ContentResolver,
        tags: TagExtractor,
        summarizer: Summarizer,
        max_concurrent_items: usize,
    ) -> Self {
        Self {
            raindrop,
            resolver,
            tags,
            summarizer,
            max_concurrent_items: max_concurrent_items.max(1),
        }
    }

    /// Assembles a pipeline from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`RaindropError::Http`] if an underlying HTTP client cannot
    /// be constructed.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, RaindropError> {
        let raindrop = RaindropClient::with_base_url(
            &config.raindrop_token,
            config.request_timeout_secs,
            &config.user_agent,
            &config.raindrop_base_url,
        )?;
        let http = build_http_client(config.request_timeout_secs, &config.user_agent)?;

        Ok(Self::new(
            raindrop,
            ContentResolver::new(http.clone()),
            TagExtractor::new(http.clone(), &config.keyword_engine_url),
            Summarizer::new(http, &config.summary_engine_url),
            config.max_concurrent_items,
        ))
    }

    /// Shared handle to the bookmark service client.
    #[must_use]
    pub fn raindrop(&self) -> &RaindropClient {
        &self.raindrop
    }

    /// Lists ids of unsorted bookmarks that do not yet carry the marker tag.
    ///
    /// # Errors
    ///
    /// Propagates any [`RaindropError`] from the collection fetch.
    pub async fn unclassified_ids(&self) -> Result<Vec<String>, RaindropError> {
        let items = self.raindrop.fetch_unsorted().await?;
        Ok(items
            .into_iter()
            .filter(|r| !r.tags.iter().any(|t| t == MARKER_TAG))
            .map(|r| r.id)
            .collect())
    }

    /// Runs enrichment over `requested_ids` and returns the completed run
    /// record.
    ///
    /// Items are processed concurrently, at most `max_concurrent_items` in
    /// flight. The returned items are in requested-id order regardless of
    /// completion order, one per requested id with duplicates preserved
    /// position-wise. Per-item failures are captured in the item result and
    /// never abort the run.
    pub async fn run(&self, requested_ids: &[String], config: &EnrichmentConfig) -> ProcessingRun {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = Instant::now();

        tracing::info!(
            run_id = %run_id,
            requested = requested_ids.len(),
            dry_run = !config.update_remote,
            "starting enrichment run"
        );

        let mut indexed: Vec<(usize, EnrichmentResult)> =
            stream::iter(0..requested_ids.len())
                .map(|index| async move {
                    (index, self.process_item(&requested_ids[index], config).await)
                })
                .buffer_unordered(self.max_concurrent_items)
                .collect()
                .await;
        indexed.sort_by_key(|(index, _)| *index);
        let items: Vec<EnrichmentResult> = indexed.into_iter().map(|(_, item)| item).collect();

        let elapsed_ms = u64::try_from(clock.elapsed().as_millis()).unwrap_or(u64::MAX);
        let run = ProcessingRun::new(
            run_id,
            started_at,
            requested_ids.to_vec(),
            items,
            elapsed_ms,
        );

        tracing::info!(
            run_id = %run_id,
            elapsed_ms = run.elapsed_ms,
            failed = run.failed_ids.len(),
            "enrichment run complete"
        );

        run
    }

    async fn process_item(&self, id: &str, config: &EnrichmentConfig) -> EnrichmentResult {
        match self.enrich_one(id, config).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(bookmark_id = id, error = %e, "item enrichment failed");
                EnrichmentResult::failed(id, e.kind(), e.to_string())
            }
        }
    }

    async fn enrich_one(
        &self,
        id: &str,
        config: &EnrichmentConfig,
    ) -> Result<EnrichmentResult, EnrichError> {
        let raindrop = self
            .raindrop
            .get_raindrop(id)
            .await
            .map_err(|e| map_raindrop_error(e, false))?;

        if !config.override_classified && raindrop.tags.iter().any(|t| t == MARKER_TAG) {
            tracing::debug!(bookmark_id = id, "bookmark already classified, skipping");
            return Ok(EnrichmentResult::skipped(id));
        }

        let text = self
            .resolver
            .resolve(&raindrop, config.max_content_chars)
            .await?;

        let (new_tags, new_summary) = match (config.extract_tags, config.generate_summary) {
            (true, true) => {
                let (tags_result, summary_result) = tokio::join!(
                    self.tags.extract(&text, config.max_tags_per_item),
                    self.summarizer.summarize(&text),
                );
                (tags_result?, degrade_summary(id, summary_result))
            }
            (true, false) => (
                self.tags.extract(&text, config.max_tags_per_item).await?,
                None,
            ),
            (false, true) => (
                Vec::new(),
                degrade_summary(id, self.summarizer.summarize(&text).await),
            ),
            (false, false) => (Vec::new(), None),
        };

        if config.update_remote {
            let mut merged = merge_tags(&raindrop.tags, &new_tags);
            if !merged.iter().any(|t| t == MARKER_TAG) {
                merged.push(MARKER_TAG.to_owned());
            }
            // A fresh summary replaces the prior note; otherwise the note
            // is resent unchanged so the write does not blank it.
            let note = new_summary.as_deref().or(raindrop.note.as_deref());

            self.raindrop
                .update_raindrop(&raindrop.id, &merged, note)
                .await
                .map_err(|e| map_raindrop_error(e, true))?;
        }

        Ok(EnrichmentResult::succeeded(id, new_tags, new_summary))
    }
}

/// Summary failure never fails an item; the run continues without one.
fn degrade_summary(id: &str, result: Result<Option<String>, EnrichError>) -> Option<String> {
    match result {
        Ok(summary) => summary,
        Err(e) => {
            tracing::warn!(bookmark_id = id, error = %e, "summary unavailable, continuing without one");
            None
        }
    }
}

fn map_raindrop_error(e: RaindropError, is_write: bool) -> EnrichError {
    if e.is_timeout() {
        EnrichError::Timeout(e.to_string())
    } else if is_write {
        EnrichError::RemoteWriteFailed(e.to_string())
    } else {
        EnrichError::ContentUnavailable(e.to_string())
    }
}
