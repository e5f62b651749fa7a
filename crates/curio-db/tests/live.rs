//! Live integration tests for curio-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/curio-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use curio_core::{EnrichmentResult, FailureKind, ItemStatus, ProcessingRun};
use curio_db::{append_processing_run, get_processing_run, list_processing_runs, HistoryFilter};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn make_run(started_at: DateTime<Utc>, items: Vec<EnrichmentResult>) -> ProcessingRun {
    let requested_ids = items.iter().map(|i| i.bookmark_id.clone()).collect();
    ProcessingRun::new(Uuid::new_v4(), started_at, requested_ids, items, 1200)
}

fn clean_run(started_at: DateTime<Utc>) -> ProcessingRun {
    make_run(
        started_at,
        vec![EnrichmentResult::succeeded(
            "1",
            vec!["rust".to_string()],
            Some("a summary".to_string()),
        )],
    )
}

fn failing_run(started_at: DateTime<Utc>) -> ProcessingRun {
    make_run(
        started_at,
        vec![
            EnrichmentResult::succeeded("1", vec!["rust".to_string()], None),
            EnrichmentResult::failed("2", FailureKind::Timeout, "page fetch timed out"),
        ],
    )
}

// ---------------------------------------------------------------------------
// Append + get
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn append_then_get_round_trips_all_fields(pool: sqlx::PgPool) {
    let run = make_run(
        Utc::now(),
        vec![
            EnrichmentResult::succeeded(
                "1",
                vec!["rust".to_string(), "async".to_string()],
                Some("a summary".to_string()),
            ),
            EnrichmentResult::skipped("2"),
            EnrichmentResult::failed("3", FailureKind::ExtractionUnavailable, "engine down"),
        ],
    );

    append_processing_run(&pool, &run)
        .await
        .expect("append_processing_run failed");

    let fetched = get_processing_run(&pool, run.run_id)
        .await
        .expect("get_processing_run failed");

    assert_eq!(fetched.run_id, run.run_id);
    assert_eq!(fetched.requested_ids, run.requested_ids);
    assert_eq!(fetched.elapsed_ms, 1200);
    assert_eq!(fetched.items.len(), 3);

    assert_eq!(fetched.items[0].bookmark_id, "1");
    assert_eq!(fetched.items[0].status, ItemStatus::Succeeded);
    assert_eq!(
        fetched.items[0].new_tags,
        vec!["rust".to_string(), "async".to_string()]
    );
    assert_eq!(fetched.items[0].new_summary.as_deref(), Some("a summary"));

    assert_eq!(fetched.items[1].status, ItemStatus::Skipped);
    assert!(fetched.items[1].failure.is_none());

    assert_eq!(fetched.items[2].status, ItemStatus::Failed);
    let failure = fetched.items[2].failure.as_ref().expect("failure detail");
    assert_eq!(failure.kind, FailureKind::ExtractionUnavailable);
    assert_eq!(failure.reason, "engine down");

    assert_eq!(fetched.failed_ids, vec!["3".to_string()]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_unknown_run_is_not_found(pool: sqlx::PgPool) {
    let result = get_processing_run(&pool, Uuid::new_v4()).await;
    assert!(matches!(result, Err(curio_db::DbError::NotFound)));
}

#[sqlx::test(migrations = "../../migrations")]
async fn duplicate_run_id_append_fails_and_leaves_original_intact(pool: sqlx::PgPool) {
    let run = clean_run(Utc::now());

    append_processing_run(&pool, &run)
        .await
        .expect("first append failed");

    let duplicate = ProcessingRun::new(
        run.run_id,
        run.started_at,
        vec!["other".to_string()],
        vec![EnrichmentResult::skipped("other")],
        7,
    );
    let result = append_processing_run(&pool, &duplicate).await;
    assert!(result.is_err(), "duplicate run_id should be rejected");

    let fetched = get_processing_run(&pool, run.run_id)
        .await
        .expect("original run should survive");
    assert_eq!(fetched.requested_ids, vec!["1".to_string()]);
    assert_eq!(fetched.items.len(), 1);
}

// ---------------------------------------------------------------------------
// Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn list_is_reverse_chronological(pool: sqlx::PgPool) {
    let now = Utc::now();
    let oldest = clean_run(now - Duration::hours(2));
    let middle = clean_run(now - Duration::hours(1));
    let newest = clean_run(now);

    for run in [&oldest, &newest, &middle] {
        append_processing_run(&pool, run).await.expect("append");
    }

    let runs = list_processing_runs(&pool, &HistoryFilter::default())
        .await
        .expect("list_processing_runs failed");

    let ids: Vec<Uuid> = runs.iter().map(|r| r.run_id).collect();
    assert_eq!(ids, vec![newest.run_id, middle.run_id, oldest.run_id]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn failed_only_excludes_clean_runs(pool: sqlx::PgPool) {
    let now = Utc::now();
    let clean = clean_run(now - Duration::minutes(10));
    let failing = failing_run(now);

    append_processing_run(&pool, &clean).await.expect("append");
    append_processing_run(&pool, &failing).await.expect("append");

    let filter = HistoryFilter {
        failed_only: true,
        ..HistoryFilter::default()
    };
    let runs = list_processing_runs(&pool, &filter)
        .await
        .expect("list_processing_runs failed");

    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, failing.run_id);
    assert_eq!(runs[0].failed_ids, vec!["2".to_string()]);
}

#[sqlx::test(migrations = "../../migrations")]
async fn since_bounds_the_listing(pool: sqlx::PgPool) {
    let now = Utc::now();
    let old = clean_run(now - Duration::days(7));
    let recent = clean_run(now - Duration::hours(1));

    append_processing_run(&pool, &old).await.expect("append");
    append_processing_run(&pool, &recent).await.expect("append");

    let filter = HistoryFilter {
        since: Some(now - Duration::days(1)),
        ..HistoryFilter::default()
    };
    let runs = list_processing_runs(&pool, &filter)
        .await
        .expect("list_processing_runs failed");

    assert_eq!(runs.len(), 1);
    assert_eq!(runs[0].run_id, recent.run_id);
}

#[sqlx::test(migrations = "../../migrations")]
async fn limit_caps_the_listing(pool: sqlx::PgPool) {
    let now = Utc::now();
    for offset in 0..5 {
        let run = clean_run(now - Duration::minutes(offset));
        append_processing_run(&pool, &run).await.expect("append");
    }

    let filter = HistoryFilter {
        limit: Some(2),
        ..HistoryFilter::default()
    };
    let runs = list_processing_runs(&pool, &filter)
        .await
        .expect("list_processing_runs failed");

    assert_eq!(runs.len(), 2);
}
