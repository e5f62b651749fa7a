//! Shared domain types for enrichment runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tag that marks a bookmark as already enriched.
pub const MARKER_TAG: &str = "_classified";

/// Per-run options controlling which enrichment stages execute.
///
/// Immutable for the duration of one orchestration call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub extract_tags: bool,
    pub generate_summary: bool,
    pub update_remote: bool,
    pub override_classified: bool,
    pub max_tags_per_item: usize,
    pub max_content_chars: usize,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            extract_tags: true,
            generate_summary: true,
            update_remote: true,
            override_classified: false,
            max_tags_per_item: 5,
            max_content_chars: 20_000,
        }
    }
}

/// Outcome category for one processed bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Succeeded,
    Skipped,
    Failed,
}

impl ItemStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Succeeded => "succeeded",
            ItemStatus::Skipped => "skipped",
            ItemStatus::Failed => "failed",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "succeeded" => Some(ItemStatus::Succeeded),
            "skipped" => Some(ItemStatus::Skipped),
            "failed" => Some(ItemStatus::Failed),
            _ => None,
        }
    }
}

/// Why a single item failed. Item-scoped: one item failing never aborts a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    ContentUnavailable,
    ExtractionUnavailable,
    SummarizationUnavailable,
    RemoteWriteFailed,
    Timeout,
}

impl FailureKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::ContentUnavailable => "content_unavailable",
            FailureKind::ExtractionUnavailable => "extraction_unavailable",
            FailureKind::SummarizationUnavailable => "summarization_unavailable",
            FailureKind::RemoteWriteFailed => "remote_write_failed",
            FailureKind::Timeout => "timeout",
        }
    }

    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "content_unavailable" => Some(FailureKind::ContentUnavailable),
            "extraction_unavailable" => Some(FailureKind::ExtractionUnavailable),
            "summarization_unavailable" => Some(FailureKind::SummarizationUnavailable),
            "remote_write_failed" => Some(FailureKind::RemoteWriteFailed),
            "timeout" => Some(FailureKind::Timeout),
            _ => None,
        }
    }
}

/// Failure detail attached to a failed item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemFailure {
    pub kind: FailureKind,
    pub reason: String,
}

/// Result for one requested bookmark, in requested order within a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnrichmentResult {
    pub bookmark_id: String,
    pub new_tags: Vec<String>,
    pub new_summary: Option<String>,
    pub status: ItemStatus,
    /// Present iff `status == Failed`.
    pub failure: Option<ItemFailure>,
}

impl EnrichmentResult {
    #[must_use]
    pub fn succeeded(
        bookmark_id: impl Into<String>,
        new_tags: Vec<String>,
        new_summary: Option<String>,
    ) -> Self {
        Self {
            bookmark_id: bookmark_id.into(),
            new_tags,
            new_summary,
            status: ItemStatus::Succeeded,
            failure: None,
        }
    }

    #[must_use]
    pub fn skipped(bookmark_id: impl Into<String>) -> Self {
        Self {
            bookmark_id: bookmark_id.into(),
            new_tags: Vec::new(),
            new_summary: None,
            status: ItemStatus::Skipped,
            failure: None,
        }
    }

    #[must_use]
    pub fn failed(
        bookmark_id: impl Into<String>,
        kind: FailureKind,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            bookmark_id: bookmark_id.into(),
            new_tags: Vec::new(),
            new_summary: None,
            status: ItemStatus::Failed,
            failure: Some(ItemFailure {
                kind,
                reason: reason.into(),
            }),
        }
    }
}

/// An immutable record of one enrichment run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingRun {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub requested_ids: Vec<String>,
    /// One entry per requested id, in requested order.
    pub items: Vec<EnrichmentResult>,
    /// Requested-order subset of ids whose item failed.
    pub failed_ids: Vec<String>,
    pub elapsed_ms: u64,
}

impl ProcessingRun {
    /// Assemble a run record from ordered item results.
    ///
    /// `failed_ids` is derived from the items, preserving requested order.
    #[must_use]
    pub fn new(
        run_id: Uuid,
        started_at: DateTime<Utc>,
        requested_ids: Vec<String>,
        items: Vec<EnrichmentResult>,
        elapsed_ms: u64,
    ) -> Self {
        let failed_ids = items
            .iter()
            .filter(|item| item.status == ItemStatus::Failed)
            .map(|item| item.bookmark_id.clone())
            .collect();
        Self {
            run_id,
            started_at,
            requested_ids,
            items,
            failed_ids,
            elapsed_ms,
        }
    }
}

/// Union existing and newly derived tags.
///
/// Existing tags keep their order and casing; new tags are appended when no
/// existing tag matches them case-insensitively. Duplicates among the new
/// tags keep the first occurrence.
#[must_use]
pub fn merge_tags(existing: &[String], new_tags: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = existing.to_vec();
    for tag in new_tags {
        let lower = tag.to_lowercase();
        if !merged.iter().any(|t| t.to_lowercase() == lower) {
            merged.push(tag.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enrichment_config_defaults() {
        let config = EnrichmentConfig::default();
        assert!(config.extract_tags);
        assert!(config.generate_summary);
        assert!(config.update_remote);
        assert!(!config.override_classified);
        assert_eq!(config.max_tags_per_item, 5);
        assert_eq!(config.max_content_chars, 20_000);
    }

    #[test]
    fn enrichment_config_deserializes_partial_body() {
        let config: EnrichmentConfig =
            serde_json::from_str(r#"{"generate_summary": false}"#).expect("deserialize");
        assert!(config.extract_tags);
        assert!(!config.generate_summary);
        assert!(config.update_remote);
    }

    #[test]
    fn failure_kind_serializes_snake_case() {
        let json = serde_json::to_string(&FailureKind::ContentUnavailable).expect("serialize");
        assert_eq!(json, "\"content_unavailable\"");
    }

    #[test]
    fn failure_kind_round_trips_through_str() {
        for kind in [
            FailureKind::ContentUnavailable,
            FailureKind::ExtractionUnavailable,
            FailureKind::SummarizationUnavailable,
            FailureKind::RemoteWriteFailed,
            FailureKind::Timeout,
        ] {
            assert_eq!(FailureKind::parse(kind.as_str()), Some(kind));
        }
    }

    #[test]
    fn item_status_round_trips_through_str() {
        for status in [
            ItemStatus::Succeeded,
            ItemStatus::Skipped,
            ItemStatus::Failed,
        ] {
            assert_eq!(ItemStatus::parse(status.as_str()), Some(status));
        }
    }

    #[test]
    fn item_status_parse_rejects_unknown() {
        assert_eq!(ItemStatus::parse("exploded"), None);
    }

    #[test]
    fn failed_result_carries_failure_detail() {
        let result =
            EnrichmentResult::failed("42", FailureKind::Timeout, "deadline exceeded");
        assert_eq!(result.status, ItemStatus::Failed);
        let failure = result.failure.expect("failure present");
        assert_eq!(failure.kind, FailureKind::Timeout);
        assert_eq!(failure.reason, "deadline exceeded");
    }

    #[test]
    fn succeeded_result_has_no_failure() {
        let result = EnrichmentResult::succeeded("42", vec!["rust".into()], None);
        assert_eq!(result.status, ItemStatus::Succeeded);
        assert!(result.failure.is_none());
    }

    #[test]
    fn processing_run_derives_failed_ids_in_requested_order() {
        let items = vec![
            EnrichmentResult::failed("a", FailureKind::ContentUnavailable, "gone"),
            EnrichmentResult::succeeded("b", vec![], None),
            EnrichmentResult::failed("c", FailureKind::Timeout, "slow"),
        ];
        let run = ProcessingRun::new(
            Uuid::new_v4(),
            Utc::now(),
            vec!["a".into(), "b".into(), "c".into()],
            items,
            12,
        );
        assert_eq!(run.failed_ids, vec!["a".to_string(), "c".to_string()]);
    }

    #[test]
    fn merge_tags_preserves_existing_order() {
        let existing = vec!["rust".to_string(), "Async".to_string()];
        let new_tags = vec!["tokio".to_string()];
        assert_eq!(
            merge_tags(&existing, &new_tags),
            vec!["rust".to_string(), "Async".to_string(), "tokio".to_string()]
        );
    }

    #[test]
    fn merge_tags_is_case_insensitive() {
        let existing = vec!["Rust".to_string()];
        let new_tags = vec!["rust".to_string(), "wasm".to_string()];
        assert_eq!(
            merge_tags(&existing, &new_tags),
            vec!["Rust".to_string(), "wasm".to_string()]
        );
    }

    #[test]
    fn merge_tags_is_idempotent() {
        let existing = vec!["rust".to_string(), "wasm".to_string()];
        let new_tags = vec!["rust".to_string(), "wasm".to_string()];
        let merged = merge_tags(&existing, &new_tags);
        assert_eq!(merged, existing);
        assert_eq!(merge_tags(&merged, &new_tags), existing);
    }

    #[test]
    fn merge_tags_dedups_within_new_tags() {
        let merged = merge_tags(&[], &["a".to_string(), "a".to_string(), "b".to_string()]);
        assert_eq!(merged, vec!["a".to_string(), "b".to_string()]);
    }
}
