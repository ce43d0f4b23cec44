//! Feed command handlers for the CLI.
//!
//! These are called from `main` after config (and, for the DB-touching
//! commands, the pool) are established. Per-record failures are logged and
//! skipped rather than propagated so one bad feed row does not abort the
//! run; database write failures are fatal and mark the run failed.

use std::path::{Path, PathBuf};

use chrono::Utc;
use clap::{Subcommand, ValueEnum};

use armory_db::{MutateOutcome, UpsertOutcome};
use armory_feed::{FeedFile, FeedSource, FtpsSource, HttpSource, Normalizer};
use armory_search::{BatchRequest, SearchClient};

use crate::fail_run_best_effort;

/// Sub-commands available under `feed`.
#[derive(Debug, Subcommand)]
pub enum FeedCommands {
    /// Download feed files from the vendor
    Pull {
        /// Restrict the pull to a single file (by vendor file name)
        #[arg(long)]
        file: Option<String>,
        /// Transport override; the default follows configuration
        #[arg(long, value_enum)]
        via: Option<PullVia>,
    },
    /// Parse the inventory file and upsert the catalog
    Ingest {
        /// Read this file instead of the feed directory copy
        #[arg(long)]
        path: Option<PathBuf>,
        /// Stop after the first N records
        #[arg(long)]
        limit: Option<usize>,
        /// Parse and normalize without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Apply the intraday quantity file to stock levels
    Quantities {
        /// Read this file instead of the feed directory copy
        #[arg(long)]
        path: Option<PathBuf>,
        /// Push changed rows to the search index as partial updates
        #[arg(long)]
        push_index: bool,
        /// Parse without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
    /// Mark stock numbers from the deletions file out of stock
    Deletions {
        /// Read this file instead of the feed directory copy
        #[arg(long)]
        path: Option<PathBuf>,
        /// Parse without writing to the database
        #[arg(long)]
        dry_run: bool,
    },
}

/// Which transport `feed pull` uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PullVia {
    Ftps,
    Http,
}

/// Download feed files into the configured feed directory.
///
/// With no `--file`, every known feed file is pulled. `--via` forces a
/// transport; otherwise the HTTP mirror is preferred when configured.
///
/// # Errors
///
/// Returns an error for unknown file names, a transport that is not
/// configured, or a failed transfer. Downloads stop at the first failure.
pub(crate) async fn run_feed_pull(
    config: &armory_core::AppConfig,
    file: Option<&str>,
    via: Option<PullVia>,
) -> anyhow::Result<()> {
    let files: Vec<FeedFile> = match file {
        Some(name) => vec![resolve_feed_file(name)?],
        None => FeedFile::ALL.to_vec(),
    };

    let source = match via {
        Some(PullVia::Http) => {
            let mirror = config.feed_http_mirror.as_deref().ok_or_else(|| {
                anyhow::anyhow!("RSR_HTTP_MIRROR is not set; cannot pull via http")
            })?;
            FeedSource::Http(HttpSource::new(mirror, config.request_timeout_secs)?)
        }
        Some(PullVia::Ftps) => {
            let user = config
                .feed_user
                .clone()
                .ok_or_else(|| anyhow::anyhow!("RSR_FTP_USER is not set; cannot pull via ftps"))?;
            let pass = config
                .feed_pass
                .clone()
                .ok_or_else(|| anyhow::anyhow!("RSR_FTP_PASS is not set; cannot pull via ftps"))?;
            FeedSource::Ftps(FtpsSource::new(
                &config.feed_host,
                config.feed_port,
                &user,
                &pass,
            ))
        }
        None => FeedSource::from_config(config)?,
    };

    let report = source.pull(&files, &config.feed_dir).await?;
    for pulled in &report.files {
        println!("{:<26}{:>12} bytes", pulled.file.file_name(), pulled.bytes);
    }
    println!(
        "pulled {} files ({} bytes) into {}",
        report.files.len(),
        report.total_bytes(),
        config.feed_dir.display()
    );
    Ok(())
}

/// Parse the full inventory file, normalize every row, and upsert the
/// catalog. A sync run tracks the pass.
///
/// When `dry_run` is `true` rows are parsed and normalized but nothing is
/// written and no run is created.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed at all, the
/// pricing rules cannot be loaded, the run cannot be created, or a database
/// write fails. Per-record normalization failures are logged and skipped.
pub(crate) async fn run_feed_ingest(
    pool: &sqlx::PgPool,
    config: &armory_core::AppConfig,
    path: Option<&Path>,
    limit: Option<usize>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let default_path = FeedFile::Inventory.local_path(&config.feed_dir);
    let path = path.unwrap_or(&default_path);
    let input = read_feed_file(path).await?;

    let report = armory_feed::parse_inventory(&input)?;
    for error in &report.errors {
        tracing::warn!(line = error.line, reason = %error.reason, "skipped inventory row");
    }
    println!(
        "parsed {} inventory rows from {} ({} skipped)",
        report.parsed(),
        path.display(),
        report.skipped()
    );

    let rules = armory_core::load_pricing_rules(config.pricing_rules_path.as_deref())?;
    let normalizer = Normalizer::new(rules, Utc::now().date_naive());

    let records = match limit {
        Some(n) => {
            let mut records = report.records;
            records.truncate(n);
            records
        }
        None => report.records,
    };

    if dry_run {
        let mut ok = 0usize;
        let mut rejected = 0usize;
        for record in &records {
            match normalizer.normalize(record) {
                Ok(_) => ok += 1,
                Err(e) => {
                    rejected += 1;
                    tracing::warn!(
                        stock_number = %record.stock_number,
                        error = %e,
                        "record failed normalization"
                    );
                }
            }
        }
        println!("dry-run: would upsert {ok} products ({rejected} rejected)");
        return Ok(());
    }

    let run = armory_db::create_sync_run(pool, "feed-ingest", "cli").await?;
    if let Err(e) = armory_db::start_sync_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "feed-ingest", format!("{e:#}")).await;
        return Err(e.into());
    }

    let mut inserted: i32 = 0;
    let mut updated: i32 = 0;
    let mut unchanged: i32 = 0;
    let mut failed: i32 = 0;

    let result: anyhow::Result<()> = async {
        for record in &records {
            let product = match normalizer.normalize(record) {
                Ok(p) => p,
                Err(e) => {
                    failed = failed.saturating_add(1);
                    tracing::warn!(
                        stock_number = %record.stock_number,
                        error = %e,
                        "skipping record \u{2014} failed normalization"
                    );
                    continue;
                }
            };

            // DB write failures abort the run; a broken pool or schema must
            // never half-apply an inventory file silently.
            match armory_db::upsert_product(pool, &product).await? {
                UpsertOutcome::Inserted => inserted = inserted.saturating_add(1),
                UpsertOutcome::Updated => updated = updated.saturating_add(1),
                UpsertOutcome::Unchanged => unchanged = unchanged.saturating_add(1),
            }
        }
        Ok(())
    }
    .await;

    let processed = inserted.saturating_add(updated).saturating_add(unchanged);
    match result {
        Ok(()) => {
            if processed == 0 && failed > 0 {
                let message = format!("all {failed} records failed normalization");
                fail_run_best_effort(pool, run.id, "feed-ingest", message.clone()).await;
                anyhow::bail!("{message}");
            }
            if let Err(err) = armory_db::complete_sync_run(pool, run.id, processed, failed).await {
                let message = format!("{err:#}");
                fail_run_best_effort(pool, run.id, "feed-ingest", message).await;
                return Err(err.into());
            }
            println!(
                "ingested {processed} products \
                 ({inserted} new, {updated} updated, {unchanged} unchanged, {failed} failed)"
            );
            Ok(())
        }
        Err(err) => {
            fail_run_best_effort(pool, run.id, "feed-ingest", format!("{err:#}")).await;
            Err(err)
        }
    }
}

/// Apply the intraday quantity file. Rows whose quantity actually changed
/// are optionally pushed to the search index as partial updates.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, the run cannot
/// be created, a database write fails, or (with `--push-index`) every
/// index batch fails.
pub(crate) async fn run_feed_quantities(
    pool: &sqlx::PgPool,
    config: &armory_core::AppConfig,
    path: Option<&Path>,
    push_index: bool,
    dry_run: bool,
) -> anyhow::Result<()> {
    let default_path = FeedFile::Quantities.local_path(&config.feed_dir);
    let path = path.unwrap_or(&default_path);
    let input = read_feed_file(path).await?;

    let report = armory_feed::parse_quantities(&input)?;
    for error in &report.errors {
        tracing::warn!(line = error.line, reason = %error.reason, "skipped quantity row");
    }

    if dry_run {
        println!(
            "dry-run: would apply {} quantity rows from {} ({} skipped)",
            report.parsed(),
            path.display(),
            report.skipped()
        );
        return Ok(());
    }

    let run = armory_db::create_sync_run(pool, "quantity-update", "cli").await?;
    if let Err(e) = armory_db::start_sync_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "quantity-update", format!("{e:#}")).await;
        return Err(e.into());
    }

    let mut changed: Vec<String> = Vec::new();
    let mut unchanged: i32 = 0;
    let mut missing: i32 = 0;

    let result: anyhow::Result<()> = async {
        for record in &report.records {
            match armory_db::update_quantity(pool, &record.stock_number, record.quantity).await? {
                MutateOutcome::Updated => changed.push(record.stock_number.clone()),
                MutateOutcome::Unchanged => unchanged = unchanged.saturating_add(1),
                MutateOutcome::Missing => {
                    missing = missing.saturating_add(1);
                    tracing::debug!(
                        stock_number = %record.stock_number,
                        "quantity row for a product not in the catalog"
                    );
                }
            }
        }
        Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            let changed_count = i32::try_from(changed.len()).unwrap_or(i32::MAX);
            let processed = changed_count.saturating_add(unchanged);
            if let Err(err) = armory_db::complete_sync_run(pool, run.id, processed, 0).await {
                let message = format!("{err:#}");
                fail_run_best_effort(pool, run.id, "quantity-update", message).await;
                return Err(err.into());
            }
            println!(
                "applied quantities: {changed_count} changed, {unchanged} unchanged, {missing} unknown"
            );
            if push_index && !changed.is_empty() {
                push_quantity_updates(pool, config, &changed).await?;
            }
            Ok(())
        }
        Err(err) => {
            fail_run_best_effort(pool, run.id, "quantity-update", format!("{err:#}")).await;
            Err(err)
        }
    }
}

/// Mark every stock number in the deletions file out of stock.
///
/// Deletions are soft: rows stay in the catalog at quantity zero so order
/// history keeps resolving.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, the run cannot
/// be created, or a database write fails.
pub(crate) async fn run_feed_deletions(
    pool: &sqlx::PgPool,
    config: &armory_core::AppConfig,
    path: Option<&Path>,
    dry_run: bool,
) -> anyhow::Result<()> {
    let default_path = FeedFile::Deletions.local_path(&config.feed_dir);
    let path = path.unwrap_or(&default_path);
    let input = read_feed_file(path).await?;

    let report = armory_feed::parse_deletions(&input)?;
    for error in &report.errors {
        tracing::warn!(line = error.line, reason = %error.reason, "skipped deletion row");
    }

    if report.records.is_empty() {
        println!("no deletions in {}; nothing to do", path.display());
        return Ok(());
    }

    if dry_run {
        println!(
            "dry-run: would mark {} stock numbers out of stock",
            report.parsed()
        );
        return Ok(());
    }

    let run = armory_db::create_sync_run(pool, "deletions", "cli").await?;
    if let Err(e) = armory_db::start_sync_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "deletions", format!("{e:#}")).await;
        return Err(e.into());
    }

    let mut deactivated: i32 = 0;
    let mut already_out: i32 = 0;
    let mut missing: i32 = 0;

    let result: anyhow::Result<()> = async {
        for record in &report.records {
            match armory_db::mark_out_of_stock(pool, &record.stock_number).await? {
                MutateOutcome::Updated => {
                    deactivated = deactivated.saturating_add(1);
                    tracing::debug!(
                        stock_number = %record.stock_number,
                        description = %record.description,
                        "marked out of stock"
                    );
                }
                MutateOutcome::Unchanged => already_out = already_out.saturating_add(1),
                MutateOutcome::Missing => {
                    missing = missing.saturating_add(1);
                    tracing::debug!(
                        stock_number = %record.stock_number,
                        "deletion for a product not in the catalog"
                    );
                }
            }
        }
        Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            let processed = deactivated.saturating_add(already_out);
            if let Err(err) = armory_db::complete_sync_run(pool, run.id, processed, 0).await {
                let message = format!("{err:#}");
                fail_run_best_effort(pool, run.id, "deletions", message).await;
                return Err(err.into());
            }
            println!(
                "deletions: {deactivated} marked out of stock, \
                 {already_out} already out, {missing} unknown"
            );
            Ok(())
        }
        Err(err) => {
            fail_run_best_effort(pool, run.id, "deletions", format!("{err:#}")).await;
            Err(err)
        }
    }
}

/// Push changed quantity rows to the index as partial updates, carrying the
/// refreshed content hash so the next reconcile sees the rows as in sync.
async fn push_quantity_updates(
    pool: &sqlx::PgPool,
    config: &armory_core::AppConfig,
    stock_numbers: &[String],
) -> anyhow::Result<()> {
    let client = SearchClient::from_config(config)?;
    let rows = armory_db::list_products_by_stock_numbers(pool, stock_numbers).await?;

    let requests: Vec<BatchRequest> = rows
        .iter()
        .map(|row| {
            BatchRequest::partial_update(serde_json::json!({
                "objectID": row.rsr_stock_number,
                "quantity": row.stock_quantity,
                "inStock": row.in_stock,
                "contentHash": row.content_hash,
            }))
        })
        .collect();

    let batch_size = config.index_batch_size.max(1);
    let delay = std::time::Duration::from_millis(config.index_batch_delay_ms);
    let total = requests.len().div_ceil(batch_size);
    let mut failed = 0usize;

    for (number, chunk) in requests.chunks(batch_size).enumerate() {
        if number > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        if let Err(err) = client.batch(&config.search_index_name, chunk).await {
            failed += 1;
            tracing::warn!(
                batch = number + 1,
                total,
                error = %err,
                "quantity index batch failed"
            );
        }
    }

    if total > 0 && failed == total {
        anyhow::bail!("all {total} quantity index batches failed");
    }
    println!(
        "pushed {} quantity updates to the index ({total} batches, {failed} failed)",
        requests.len()
    );
    Ok(())
}

/// Read a feed file as text. The vendor's files are not reliably UTF-8, so
/// bytes are converted lossily rather than rejected.
pub(crate) async fn read_feed_file(path: &Path) -> anyhow::Result<String> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| anyhow::anyhow!("failed to read feed file {}: {e}", path.display()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Resolve a `--file` argument against the known vendor file names.
fn resolve_feed_file(name: &str) -> anyhow::Result<FeedFile> {
    FeedFile::ALL
        .into_iter()
        .find(|file| file.file_name().eq_ignore_ascii_case(name))
        .ok_or_else(|| {
            let known: Vec<&str> = FeedFile::ALL.iter().map(|f| f.file_name()).collect();
            anyhow::anyhow!("unknown feed file {name:?}; known files: {}", known.join(", "))
        })
}
