//! Database operations for `processing_runs` and `processing_run_items`.
//!
//! Run history is append-only. A run is written in one transaction and is
//! never updated or deleted afterwards.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use curio_core::{EnrichmentResult, FailureKind, ItemFailure, ItemStatus, ProcessingRun};

use crate::DbError;

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 200;

/// Filter for listing run history.
#[derive(Debug, Clone, Copy, Default)]
pub struct HistoryFilter {
    /// Maximum number of runs to return; defaults to 50, clamped to 1..=200.
    pub limit: Option<i64>,
    /// Only runs containing at least one failed item.
    pub failed_only: bool,
    /// Lower bound on `started_at`.
    pub since: Option<DateTime<Utc>>,
}

/// A row from the `processing_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProcessingRunRow {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub requested_ids: Vec<String>,
    pub elapsed_ms: i64,
}

/// A row from the `processing_run_items` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProcessingRunItemRow {
    pub run_id: Uuid,
    pub position: i32,
    pub bookmark_id: String,
    pub status: String,
    pub failure_kind: Option<String>,
    pub failure_reason: Option<String>,
    pub new_tags: Vec<String>,
    pub new_summary: Option<String>,
}

/// Appends a completed run and all its item rows in one transaction.
///
/// The run becomes visible entirely or not at all; a failure before commit
/// leaves no trace of the run.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any insert or the commit fails, including
/// a duplicate `run_id`.
pub async fn append_processing_run(pool: &PgPool, run: &ProcessingRun) -> Result<(), DbError> {
    let mut tx = pool.begin().await?;

    sqlx::query(
        "INSERT INTO processing_runs (run_id, started_at, requested_ids, elapsed_ms) \
         VALUES ($1, $2, $3, $4)",
    )
    .bind(run.run_id)
    .bind(run.started_at)
    .bind(&run.requested_ids)
    .bind(i64::try_from(run.elapsed_ms).unwrap_or(i64::MAX))
    .execute(&mut *tx)
    .await?;

    for (position, item) in run.items.iter().enumerate() {
        sqlx::query(
            "INSERT INTO processing_run_items \
                 (run_id, position, bookmark_id, status, failure_kind, \
                  failure_reason, new_tags, new_summary) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(run.run_id)
        .bind(i32::try_from(position).unwrap_or(i32::MAX))
        .bind(&item.bookmark_id)
        .bind(item.status.as_str())
        .bind(item.failure.as_ref().map(|f| f.kind.as_str()))
        .bind(item.failure.as_ref().map(|f| f.reason.as_str()))
        .bind(&item.new_tags)
        .bind(item.new_summary.as_deref())
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    Ok(())
}

/// Fetches a single run with all its items by `run_id`.
///
/// # Errors
///
/// Returns [`DbError::NotFound`] if no run exists with the given id,
/// [`DbError::InvalidStoredValue`] if a stored status or failure kind cannot
/// be parsed, or [`DbError::Sqlx`] if a query fails.
pub async fn get_processing_run(pool: &PgPool, run_id: Uuid) -> Result<ProcessingRun, DbError> {
    let row = sqlx::query_as::<_, ProcessingRunRow>(
        "SELECT run_id, started_at, requested_ids, elapsed_ms \
         FROM processing_runs \
         WHERE run_id = $1",
    )
    .bind(run_id)
    .fetch_optional(pool)
    .await?
    .ok_or(DbError::NotFound)?;

    let item_rows = fetch_items(pool, &[run_id]).await?;

    run_from_rows(row, item_rows)
}

/// Lists runs in reverse chronological order of `started_at`.
///
/// # Errors
///
/// Returns [`DbError::InvalidStoredValue`] if a stored status or failure kind
/// cannot be parsed, or [`DbError::Sqlx`] if a query fails.
pub async fn list_processing_runs(
    pool: &PgPool,
    filter: &HistoryFilter,
) -> Result<Vec<ProcessingRun>, DbError> {
    let limit = normalize_limit(filter.limit);

    let rows = sqlx::query_as::<_, ProcessingRunRow>(
        "SELECT run_id, started_at, requested_ids, elapsed_ms \
         FROM processing_runs \
         WHERE ($1 OR EXISTS ( \
                    SELECT 1 FROM processing_run_items i \
                    WHERE i.run_id = processing_runs.run_id AND i.status = 'failed')) \
           AND ($2::timestamptz IS NULL OR started_at >= $2) \
         ORDER BY started_at DESC, run_id DESC \
         LIMIT $3",
    )
    .bind(!filter.failed_only)
    .bind(filter.since)
    .bind(limit)
    .fetch_all(pool)
    .await?;

    let run_ids: Vec<Uuid> = rows.iter().map(|r| r.run_id).collect();
    let mut items_by_run: HashMap<Uuid, Vec<ProcessingRunItemRow>> = HashMap::new();
    for item in fetch_items(pool, &run_ids).await? {
        items_by_run.entry(item.run_id).or_default().push(item);
    }

    let mut runs = Vec::with_capacity(rows.len());
    for row in rows {
        let item_rows = items_by_run.remove(&row.run_id).unwrap_or_default();
        runs.push(run_from_rows(row, item_rows)?);
    }

    Ok(runs)
}

async fn fetch_items(
    pool: &PgPool,
    run_ids: &[Uuid],
) -> Result<Vec<ProcessingRunItemRow>, DbError> {
    let rows = sqlx::query_as::<_, ProcessingRunItemRow>(
        "SELECT run_id, position, bookmark_id, status, failure_kind, \
                failure_reason, new_tags, new_summary \
         FROM processing_run_items \
         WHERE run_id = ANY($1) \
         ORDER BY run_id, position",
    )
    .bind(run_ids)
    .fetch_all(pool)
    .await?;

    Ok(rows)
}

fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT)
}

fn run_from_rows(
    row: ProcessingRunRow,
    item_rows: Vec<ProcessingRunItemRow>,
) -> Result<ProcessingRun, DbError> {
    let mut items = Vec::with_capacity(item_rows.len());
    for item_row in item_rows {
        items.push(item_from_row(item_row)?);
    }

    Ok(ProcessingRun::new(
        row.run_id,
        row.started_at,
        row.requested_ids,
        items,
        u64::try_from(row.elapsed_ms).unwrap_or(0),
    ))
}

fn item_from_row(row: ProcessingRunItemRow) -> Result<EnrichmentResult, DbError> {
    let status = ItemStatus::parse(&row.status).ok_or_else(|| DbError::InvalidStoredValue {
        column: "processing_run_items.status",
        value: row.status.clone(),
    })?;

    let failure = match (row.failure_kind, row.failure_reason) {
        (Some(kind_str), reason) => {
            let kind =
                FailureKind::parse(&kind_str).ok_or(DbError::InvalidStoredValue {
                    column: "processing_run_items.failure_kind",
                    value: kind_str,
                })?;
            Some(ItemFailure {
                kind,
                reason: reason.unwrap_or_default(),
            })
        }
        (None, _) => None,
    };

    Ok(EnrichmentResult {
        bookmark_id: row.bookmark_id,
        new_tags: row.new_tags,
        new_summary: row.new_summary,
        status,
        failure,
    })
}
