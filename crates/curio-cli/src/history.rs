//! Read-only run history handlers.

use curio_db::HistoryFilter;

/// Show recent enrichment runs.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub(crate) async fn run_history(
    pool: &sqlx::PgPool,
    limit: u32,
    failed_only: bool,
) -> anyhow::Result<()> {
    let filter = HistoryFilter {
        limit: Some(i64::from(limit)),
        failed_only,
        since: None,
    };
    let runs = curio_db::list_processing_runs(pool, &filter).await?;

    if runs.is_empty() {
        println!(
            "no runs recorded{}; run `curio process` first",
            if failed_only { " with failures" } else { "" }
        );
        return Ok(());
    }

    println!(
        "{:<18}{:<38}{:<8}{:<8}ELAPSED",
        "STARTED", "RUN ID", "ITEMS", "FAILED"
    );
    for run in &runs {
        let started = run.started_at.format("%Y-%m-%d %H:%M").to_string();
        println!(
            "{:<18}{:<38}{:<8}{:<8}{} ms",
            started,
            run.run_id,
            run.items.len(),
            run.failed_ids.len(),
            run.elapsed_ms
        );
    }

    Ok(())
}
