//! Enrichment command handlers for the CLI.
//!
//! These are called from `main` after the database pool and config are
//! established. Per-item failures are reported in the summary table rather
//! than propagated so a single bad bookmark does not abort the full run.

use clap::Args;

use curio_core::{AppConfig, EnrichmentConfig, ItemStatus, ProcessingRun};
use curio_enrich::Pipeline;

/// Flags shared by `process` and `process-all`.
#[derive(Debug, Args)]
pub struct EnrichFlags {
    /// Skip tag extraction
    #[arg(long)]
    pub no_tags: bool,

    /// Skip summary generation
    #[arg(long)]
    pub no_summary: bool,

    /// Compute results without writing back to the bookmark service
    #[arg(long)]
    pub dry_run: bool,

    /// Re-enrich bookmarks that already carry the marker tag
    #[arg(long)]
    pub override_classified: bool,
}

impl EnrichFlags {
    fn to_config(&self, config: &AppConfig) -> EnrichmentConfig {
        EnrichmentConfig {
            extract_tags: !self.no_tags,
            generate_summary: !self.no_summary,
            update_remote: !self.dry_run,
            override_classified: self.override_classified,
            max_tags_per_item: config.max_tags_per_item,
            max_content_chars: config.max_content_chars,
        }
    }
}

/// Enrich the given bookmark ids and append the run to history.
///
/// # Errors
///
/// Returns an error if the pipeline cannot be constructed, if the history
/// append fails, or if every requested item failed.
pub(crate) async fn run_process(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    ids: &[String],
    flags: &EnrichFlags,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_app_config(config)?;
    let run = pipeline.run(ids, &flags.to_config(config)).await;

    curio_db::append_processing_run(pool, &run).await?;
    print_run_summary(&run, flags.dry_run);

    fail_when_all_failed(&run)
}

/// Discover unsorted, unclassified bookmarks and enrich them all.
///
/// # Errors
///
/// Returns an error if the bookmark listing fails, if the history append
/// fails, or if every discovered item failed.
pub(crate) async fn run_process_all(
    pool: &sqlx::PgPool,
    config: &AppConfig,
    flags: &EnrichFlags,
) -> anyhow::Result<()> {
    let pipeline = Pipeline::from_app_config(config)?;
    let ids = pipeline
        .unclassified_ids()
        .await
        .map_err(|e| anyhow::anyhow!("failed to list bookmarks: {e}"))?;

    if ids.is_empty() {
        println!("no unclassified bookmarks to process");
        return Ok(());
    }

    let run = pipeline.run(&ids, &flags.to_config(config)).await;

    curio_db::append_processing_run(pool, &run).await?;
    print_run_summary(&run, flags.dry_run);

    fail_when_all_failed(&run)
}

fn fail_when_all_failed(run: &ProcessingRun) -> anyhow::Result<()> {
    if !run.items.is_empty() && run.failed_ids.len() == run.items.len() {
        anyhow::bail!("all {} requested items failed", run.items.len());
    }
    Ok(())
}

fn print_run_summary(run: &ProcessingRun, dry_run: bool) {
    println!("{:<14}{:<12}{:<32}DETAIL", "ID", "STATUS", "TAGS");
    for item in &run.items {
        let detail = match item.status {
            ItemStatus::Succeeded => {
                if item.new_summary.is_some() {
                    "summary updated".to_string()
                } else {
                    "no summary".to_string()
                }
            }
            ItemStatus::Skipped => "already classified".to_string(),
            ItemStatus::Failed => item.failure.as_ref().map_or_else(
                || "failed".to_string(),
                |f| format!("{}: {}", f.kind.as_str(), f.reason),
            ),
        };
        println!(
            "{:<14}{:<12}{:<32}{}",
            item.bookmark_id,
            item.status.as_str(),
            item.new_tags.join(","),
            detail
        );
    }

    println!(
        "run {}: {} items, {} failed, {} ms",
        run.run_id,
        run.items.len(),
        run.failed_ids.len(),
        run.elapsed_ms
    );
    if dry_run {
        println!("dry run: nothing was written to the bookmark service");
    }
}
