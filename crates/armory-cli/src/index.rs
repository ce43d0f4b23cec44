//! Search index command handlers for the CLI.
//!
//! Reconciliation is hash-driven: the database rows and the index documents
//! both carry a content hash, so the plan reduces to a map diff. Per-batch
//! write failures are counted, not fatal; a run where every batch fails is
//! recorded as failed.

use std::collections::HashMap;

use clap::Subcommand;

use armory_core::Product;
use armory_search::{index_settings, reconcile, ProductDoc, QueryParams, SearchClient};

use crate::{fail_run_best_effort, load_all_products};

/// Sub-commands available under `index`.
#[derive(Debug, Subcommand)]
pub enum IndexCommands {
    /// Reconcile the search index against the database
    Sync {
        /// Print the plan without writing to the index
        #[arg(long)]
        dry_run: bool,
    },
    /// Clear the index and reload every product
    Rebuild {
        /// Confirm clearing the live index
        #[arg(long)]
        yes: bool,
    },
    /// Push the canonical index settings
    Settings,
    /// Show database vs index drift
    Status {
        /// Also compute and print the reconciliation plan
        #[arg(long)]
        verbose: bool,
    },
}

/// Diff the database against the index and apply the difference.
///
/// The plan is always printed. Without work to do no run is created; with
/// `--dry-run` nothing is written.
///
/// # Errors
///
/// Returns an error if credentials are missing, the index cannot be
/// browsed, the run cannot be created, or every batch fails.
pub(crate) async fn run_index_sync(
    pool: &sqlx::PgPool,
    config: &armory_core::AppConfig,
    dry_run: bool,
) -> anyhow::Result<()> {
    let client = SearchClient::from_config(config)?;
    let index = config.search_index_name.as_str();

    let local = local_hashes(pool).await?;
    let remote = reconcile::remote_index(client.browse_all(index).await?);
    let plan = reconcile::plan(&local, &remote);

    println!(
        "index sync plan: {} to upsert, {} to delete, {} unchanged",
        plan.to_upsert.len(),
        plan.to_delete.len(),
        plan.unchanged
    );

    if plan.is_empty() {
        println!("index is in sync");
        return Ok(());
    }
    if dry_run {
        return Ok(());
    }

    let run = armory_db::create_sync_run(pool, "index-sync", "cli").await?;
    if let Err(e) = armory_db::start_sync_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "index-sync", format!("{e:#}")).await;
        return Err(e.into());
    }

    let result: anyhow::Result<reconcile::ApplyReport> = async {
        let docs = docs_for_stock_numbers(pool, &plan.to_upsert).await?;
        Ok(reconcile::apply(
            &client,
            index,
            &docs,
            &plan.to_delete,
            config.index_batch_size,
            config.index_batch_delay_ms,
        )
        .await)
    }
    .await;

    match result {
        Ok(report) => {
            if report.all_failed() {
                let message = format!("all {} index batches failed", report.batches);
                fail_run_best_effort(pool, run.id, "index-sync", message.clone()).await;
                anyhow::bail!("{message}");
            }
            let planned = plan.to_upsert.len() + plan.to_delete.len();
            let applied = report.upserted + report.deleted;
            let processed = i32::try_from(applied).unwrap_or(i32::MAX);
            let failed = i32::try_from(planned.saturating_sub(applied)).unwrap_or(i32::MAX);
            if let Err(err) = armory_db::complete_sync_run(pool, run.id, processed, failed).await {
                let message = format!("{err:#}");
                fail_run_best_effort(pool, run.id, "index-sync", message).await;
                return Err(err.into());
            }
            println!(
                "index sync: {} upserted, {} deleted ({} batches, {} failed)",
                report.upserted, report.deleted, report.batches, report.failed_batches
            );
            Ok(())
        }
        Err(err) => {
            fail_run_best_effort(pool, run.id, "index-sync", format!("{err:#}")).await;
            Err(err)
        }
    }
}

/// Clear the index and reload every product from the database.
///
/// Destructive: the index serves live traffic, so the clear is gated
/// behind `--yes`.
///
/// # Errors
///
/// Returns an error without `--yes`, if the clear or reload fails, or if
/// every upload batch fails.
pub(crate) async fn run_index_rebuild(
    pool: &sqlx::PgPool,
    config: &armory_core::AppConfig,
    yes: bool,
) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("index rebuild clears the live index; re-run with --yes to confirm");
    }

    let client = SearchClient::from_config(config)?;
    let index = config.search_index_name.as_str();

    let run = armory_db::create_sync_run(pool, "index-rebuild", "cli").await?;
    if let Err(e) = armory_db::start_sync_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "index-rebuild", format!("{e:#}")).await;
        return Err(e.into());
    }

    let result: anyhow::Result<reconcile::ApplyReport> = async {
        let docs = all_docs(pool).await?;
        client.clear(index).await?;
        println!("cleared index {index}; uploading {} documents", docs.len());
        Ok(reconcile::apply(
            &client,
            index,
            &docs,
            &[],
            config.index_batch_size,
            config.index_batch_delay_ms,
        )
        .await)
    }
    .await;

    match result {
        Ok(report) => {
            if report.all_failed() {
                let message = format!("all {} rebuild batches failed", report.batches);
                fail_run_best_effort(pool, run.id, "index-rebuild", message.clone()).await;
                anyhow::bail!("{message}");
            }
            let processed = i32::try_from(report.upserted).unwrap_or(i32::MAX);
            if let Err(err) = armory_db::complete_sync_run(pool, run.id, processed, 0).await {
                let message = format!("{err:#}");
                fail_run_best_effort(pool, run.id, "index-rebuild", message).await;
                return Err(err.into());
            }
            println!(
                "index rebuild: {} documents uploaded ({} batches, {} failed)",
                report.upserted, report.batches, report.failed_batches
            );
            Ok(())
        }
        Err(err) => {
            fail_run_best_effort(pool, run.id, "index-rebuild", format!("{err:#}")).await;
            Err(err)
        }
    }
}

/// Push the canonical settings document to the index.
///
/// # Errors
///
/// Returns an error if credentials are missing or the provider rejects
/// the settings.
pub(crate) async fn run_index_settings(config: &armory_core::AppConfig) -> anyhow::Result<()> {
    let client = SearchClient::from_config(config)?;
    let index = config.search_index_name.as_str();
    client.set_settings(index, &index_settings()).await?;
    println!("pushed settings to index {index}");
    Ok(())
}

/// Report drift between the database and the index.
///
/// The cheap check compares row and object counts; `--verbose` also browses
/// the index and prints the full reconciliation plan.
///
/// # Errors
///
/// Returns an error if credentials are missing or a query fails.
pub(crate) async fn run_index_status(
    pool: &sqlx::PgPool,
    config: &armory_core::AppConfig,
    verbose: bool,
) -> anyhow::Result<()> {
    let client = SearchClient::from_config(config)?;
    let index = config.search_index_name.as_str();

    let counts = armory_db::count_products(pool).await?;
    let params = QueryParams {
        query: String::new(),
        hits_per_page: Some(0),
        page: None,
        filters: None,
    };
    let response = client.query(index, &params).await?;

    println!("{:<20}{}", "database products", counts.total);
    println!("{:<20}{}", "database in stock", counts.in_stock);
    println!("{:<20}{}", "index objects", response.nb_hits);

    let drift = counts.total - i64::try_from(response.nb_hits).unwrap_or(i64::MAX);
    println!("{:<20}{}", "count drift", drift);

    if verbose {
        let local = local_hashes(pool).await?;
        let remote = reconcile::remote_index(client.browse_all(index).await?);
        let plan = reconcile::plan(&local, &remote);
        println!(
            "plan: {} to upsert, {} to delete, {} unchanged",
            plan.to_upsert.len(),
            plan.to_delete.len(),
            plan.unchanged
        );
    }

    Ok(())
}

/// The local side of reconciliation: stock number to stored content hash.
async fn local_hashes(pool: &sqlx::PgPool) -> anyhow::Result<HashMap<String, String>> {
    let rows = armory_db::list_stock_hashes(pool).await?;
    Ok(rows
        .into_iter()
        .map(|row| (row.rsr_stock_number, row.content_hash))
        .collect())
}

/// Build search documents for the given stock numbers.
async fn docs_for_stock_numbers(
    pool: &sqlx::PgPool,
    stock_numbers: &[String],
) -> anyhow::Result<Vec<ProductDoc>> {
    let rows = armory_db::list_products_by_stock_numbers(pool, stock_numbers).await?;
    Ok(rows
        .into_iter()
        .map(|row| ProductDoc::from(&Product::from(row)))
        .collect())
}

/// Build search documents for the entire catalog.
async fn all_docs(pool: &sqlx::PgPool) -> anyhow::Result<Vec<ProductDoc>> {
    let rows = load_all_products(pool).await?;
    Ok(rows
        .into_iter()
        .map(|row| ProductDoc::from(&Product::from(row)))
        .collect())
}
