//! The `sync` command: source table to catalog.
//!
//! Configuration and source errors abort before any remote call. After
//! that, a failing series is logged and the run moves on to the next one.

pub(crate) mod definitions;
mod plan;
mod reconcile;
mod report;

#[cfg(test)]
pub(crate) mod test_support;

use std::path::PathBuf;

use anyhow::Context;
use catsync_core::{
    find_key_collisions, group_by_series, load_source_table, AppConfig, ConfigError,
    KeyCollisionPolicy, SeriesGroup,
};
use catsync_shopify::CatalogApi;

use crate::prompt::confirm_stdin;
use definitions::register_definitions;
use reconcile::{reconcile_series, SeriesOutcome};

#[derive(Debug, Default, Clone, clap::Args)]
pub struct SyncArgs {
    /// Source CSV file (overrides `CSV_PATH`)
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Print what would be written without contacting the store
    #[arg(long, conflicts_with = "yes")]
    pub dry_run: bool,

    /// Skip the confirmation prompts and write immediately
    #[arg(long, short = 'y')]
    pub yes: bool,

    /// Restrict the run to one series key
    #[arg(long)]
    pub series: Option<String>,

    /// Do not register metafield definitions before writing
    #[arg(long)]
    pub skip_definitions: bool,
}

/// Totals for one pass over every series.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RunTotals {
    pub series: usize,
    pub failed_series: usize,
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
    pub failed: usize,
    pub metafields_written: usize,
}

impl RunTotals {
    fn add(&mut self, outcome: SeriesOutcome) {
        self.created += outcome.created;
        self.updated += outcome.updated;
        self.skipped += outcome.skipped;
        self.failed += outcome.failed;
        self.metafields_written += outcome.metafields_written;
    }
}

/// Runs the sync flow: load, group, optionally dry-run, then write.
///
/// # Errors
///
/// Returns an error if the source table cannot be read, a key collision is
/// found under [`KeyCollisionPolicy::Reject`], the requested series does not
/// exist, or the terminal prompt fails. Series failures are not returned.
pub(crate) async fn run_sync<C: CatalogApi + ?Sized>(
    api: &C,
    config: &AppConfig,
    args: &SyncArgs,
) -> anyhow::Result<()> {
    println!("Shopify CSV Product Uploader");
    println!("{}", "=".repeat(40));

    let groups = load_groups(config, args.series.as_deref())?;
    if groups.is_empty() {
        println!("No items found in CSV file!");
        return Ok(());
    }

    if args.dry_run {
        run_pass(api, config, &groups, true).await;
        banner("DRY RUN COMPLETE");
        return Ok(());
    }

    let write = if args.yes {
        true
    } else if confirm_stdin("Do a dry run first?")? {
        run_pass(api, config, &groups, true).await;
        banner("DRY RUN COMPLETE");
        confirm_stdin("Proceed with actual upload?")?
    } else {
        true
    };

    if !write {
        println!("Upload cancelled; nothing was written.");
        return Ok(());
    }

    if !args.skip_definitions {
        register_definitions(api, config).await;
        println!();
    }
    run_pass(api, config, &groups, false).await;
    banner("UPLOAD COMPLETE");
    Ok(())
}

/// Reads the source table, applies the key-collision policy, groups the
/// rows, and narrows to `series_filter` when given.
fn load_groups(config: &AppConfig, series_filter: Option<&str>) -> anyhow::Result<Vec<SeriesGroup>> {
    println!("Reading CSV file: {}", config.csv_path.display());
    let table = load_source_table(&config.csv_path, &config.columns)
        .with_context(|| format!("failed to read {}", config.csv_path.display()))?;

    let collisions = find_key_collisions(&table.headers, &config.columns);
    for collision in &collisions {
        tracing::warn!(
            key = %collision.key,
            columns = ?collision.columns,
            policy = %config.key_collision,
            "metadata columns share a metafield key"
        );
    }
    if config.key_collision == KeyCollisionPolicy::Reject {
        if let Some(collision) = collisions.into_iter().next() {
            return Err(ConfigError::KeyCollision {
                key: collision.key,
                columns: collision.columns,
            }
            .into());
        }
    }

    println!("Found {} items", table.rows.len());
    let mut groups = group_by_series(table.rows, &config.columns);
    if let Some(wanted) = series_filter {
        groups.retain(|g| g.key == wanted);
        if groups.is_empty() {
            anyhow::bail!("series '{wanted}' not found in {}", config.csv_path.display());
        }
    }

    println!("Found {} series/products", groups.len());
    for group in &groups {
        println!("  - {}: {} variants", group.key, group.rows.len());
    }
    Ok(groups)
}

/// Reconciles every series in order and prints the totals.
async fn run_pass<C: CatalogApi + ?Sized>(
    api: &C,
    config: &AppConfig,
    groups: &[SeriesGroup],
    dry_run: bool,
) -> RunTotals {
    let mut totals = RunTotals {
        series: groups.len(),
        ..RunTotals::default()
    };

    for group in groups {
        match reconcile_series(api, config, group, dry_run).await {
            Ok(outcome) => totals.add(outcome),
            Err(e) => {
                tracing::error!(series = %group.key, error = %format!("{e:#}"), "error processing series");
                totals.failed_series += 1;
            }
        }
    }

    if !dry_run {
        println!(
            "\n{} series: {} variants created, {} updated, {} skipped, {} failed, {} metafields written",
            totals.series,
            totals.created,
            totals.updated,
            totals.skipped,
            totals.failed,
            totals.metafields_written
        );
    }
    if totals.failed_series > 0 {
        tracing::warn!(
            failed_series = totals.failed_series,
            total_series = totals.series,
            "some series failed"
        );
    }
    totals
}

fn banner(title: &str) {
    let rule = "=".repeat(50);
    println!("\n{rule}\n{title}\n{rule}");
}

#[cfg(test)]
#[path = "sync_test.rs"]
mod tests;
