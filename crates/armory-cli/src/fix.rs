//! Repair command handlers for the CLI.
//!
//! Each pass scans the stored catalog, prints what it found, and only
//! writes with `--apply`. Writes route through the targeted mutations in
//! `armory-db`, so the stored content hash follows every change and the
//! next index sync picks the rows up.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use clap::Subcommand;

use armory_core::{CategoryChange, CategoryRules, PriceInputs, Product, TierPricing};
use armory_db::MutateOutcome;

use crate::{fail_run_best_effort, load_all_products};

/// Sub-commands available under `fix`.
#[derive(Debug, Subcommand)]
pub enum FixCommands {
    /// Reassign SKUs that collapsed onto the vendor stock number
    Skus {
        /// Cross-check candidates against this inventory file
        #[arg(long)]
        feed: Option<PathBuf>,
        /// Write the repairs (default prints them)
        #[arg(long)]
        apply: bool,
    },
    /// Re-run the category rules over the stored catalog
    Categories {
        /// Write the moves (default prints them)
        #[arg(long)]
        apply: bool,
    },
    /// Recompute price tiers from stored vendor reference prices
    Pricing {
        /// Write the new tiers (default prints them)
        #[arg(long)]
        apply: bool,
    },
}

struct SkuRepair {
    stock_number: String,
    new_sku: String,
    /// Where the candidate came from: the stored row or the feed file.
    source: &'static str,
}

struct PricingChange {
    stock_number: String,
    tiers: TierPricing,
}

/// Reassign SKUs that collapsed onto the vendor stock number.
///
/// Rows that store a usable manufacturer part number come from an indexed
/// lookup and repair from the row itself. With `--feed`, the remaining
/// collapsed rows are checked against the vendor's current mapping, which
/// takes a full catalog scan. Ingestion prevents new corruption, so this
/// pass converges to zero.
///
/// # Errors
///
/// Returns an error if the feed file cannot be parsed, the catalog cannot
/// be read, the run cannot be created, or a write fails.
pub(crate) async fn run_fix_skus(
    pool: &sqlx::PgPool,
    feed: Option<&Path>,
    apply: bool,
) -> anyhow::Result<()> {
    let feed_mpns = match feed {
        Some(path) => Some(feed_part_numbers(path).await?),
        None => None,
    };

    let mut examined = 0usize;
    let mut unresolved = 0usize;
    let mut repairs: Vec<SkuRepair> = Vec::new();

    for row in armory_db::find_corrupted_skus(pool).await? {
        let product = Product::from(row);
        examined += 1;

        let stored = product
            .manufacturer_part_number
            .as_deref()
            .map(str::trim)
            .filter(|mpn| !mpn.is_empty() && *mpn != product.rsr_stock_number);
        let from_feed = feed_candidate(feed_mpns.as_ref(), &product);

        match stored.or(from_feed) {
            Some(new_sku) => repairs.push(SkuRepair {
                stock_number: product.rsr_stock_number.clone(),
                new_sku: new_sku.to_owned(),
                source: if stored.is_some() { "row" } else { "feed" },
            }),
            None => unresolved += 1,
        }
    }

    if feed_mpns.is_some() {
        for row in load_all_products(pool).await? {
            let product = Product::from(row);
            // Corrupted rows were handled above; healthy rows need nothing.
            if product.has_distinct_sku() || product.sku_is_corrupted() {
                continue;
            }
            examined += 1;

            match feed_candidate(feed_mpns.as_ref(), &product) {
                Some(new_sku) => repairs.push(SkuRepair {
                    stock_number: product.rsr_stock_number.clone(),
                    new_sku: new_sku.to_owned(),
                    source: "feed",
                }),
                None => unresolved += 1,
            }
        }
    }

    if repairs.is_empty() {
        println!("sku repair: examined {examined}, nothing to repair, {unresolved} unresolved");
        return Ok(());
    }

    println!("{:<18}{:<22}SOURCE", "STOCK NUMBER", "NEW SKU");
    for repair in &repairs {
        println!(
            "{:<18}{:<22}{}",
            repair.stock_number, repair.new_sku, repair.source
        );
    }

    if !apply {
        println!(
            "dry-run: examined {examined}, would repair {}, {unresolved} unresolved; \
             re-run with --apply to write",
            repairs.len()
        );
        return Ok(());
    }

    let run = armory_db::create_sync_run(pool, "sku-repair", "cli").await?;
    if let Err(e) = armory_db::start_sync_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "sku-repair", format!("{e:#}")).await;
        return Err(e.into());
    }

    let mut repaired: i32 = 0;
    let mut missed: i32 = 0;

    let result: anyhow::Result<()> = async {
        for repair in &repairs {
            match armory_db::repair_sku(pool, &repair.stock_number, &repair.new_sku).await? {
                MutateOutcome::Updated => repaired = repaired.saturating_add(1),
                MutateOutcome::Unchanged => {}
                MutateOutcome::Missing => {
                    missed = missed.saturating_add(1);
                    tracing::warn!(
                        stock_number = %repair.stock_number,
                        "row disappeared between scan and repair"
                    );
                }
            }
        }
        Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            let failed = i32::try_from(unresolved)
                .unwrap_or(i32::MAX)
                .saturating_add(missed);
            if let Err(err) = armory_db::complete_sync_run(pool, run.id, repaired, failed).await {
                let message = format!("{err:#}");
                fail_run_best_effort(pool, run.id, "sku-repair", message).await;
                return Err(err.into());
            }
            println!("sku repair: examined {examined}, repaired {repaired}, {unresolved} unresolved");
            Ok(())
        }
        Err(err) => {
            fail_run_best_effort(pool, run.id, "sku-repair", format!("{err:#}")).await;
            Err(err)
        }
    }
}

/// Re-run the category rules over every stored product and move the ones
/// the rules place elsewhere.
///
/// # Errors
///
/// Returns an error if the catalog cannot be read, the run cannot be
/// created, or a write fails.
pub(crate) async fn run_fix_categories(pool: &sqlx::PgPool, apply: bool) -> anyhow::Result<()> {
    let rules = CategoryRules::new();
    let rows = load_all_products(pool).await?;
    let total = rows.len();

    let mut changes: Vec<CategoryChange> = Vec::new();
    for row in rows {
        let product = Product::from(row);
        if let Some(change) = rules.analyze(&product) {
            changes.push(change);
        }
    }

    if changes.is_empty() {
        println!("category rules: {total} products checked, nothing to move");
        return Ok(());
    }

    println!("{:<18}{:<26}{:<26}REASON", "STOCK NUMBER", "FROM", "TO");
    for change in &changes {
        println!(
            "{:<18}{:<26}{:<26}{}",
            change.rsr_stock_number, change.from, change.to, change.reason
        );
    }

    if !apply {
        println!(
            "dry-run: {} of {total} products would move; re-run with --apply to write",
            changes.len()
        );
        return Ok(());
    }

    let run = armory_db::create_sync_run(pool, "category-apply", "cli").await?;
    if let Err(e) = armory_db::start_sync_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "category-apply", format!("{e:#}")).await;
        return Err(e.into());
    }

    let mut moved: i32 = 0;
    let mut missed: i32 = 0;

    let result: anyhow::Result<()> = async {
        for change in &changes {
            match armory_db::update_category(pool, &change.rsr_stock_number, &change.to).await? {
                MutateOutcome::Updated => moved = moved.saturating_add(1),
                MutateOutcome::Unchanged => {}
                MutateOutcome::Missing => {
                    missed = missed.saturating_add(1);
                    tracing::warn!(
                        stock_number = %change.rsr_stock_number,
                        "row disappeared between scan and move"
                    );
                }
            }
        }
        Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            if let Err(err) = armory_db::complete_sync_run(pool, run.id, moved, missed).await {
                let message = format!("{err:#}");
                fail_run_best_effort(pool, run.id, "category-apply", message).await;
                return Err(err.into());
            }
            println!("recategorized {moved} products");
            Ok(())
        }
        Err(err) => {
            fail_run_best_effort(pool, run.id, "category-apply", format!("{err:#}")).await;
            Err(err)
        }
    }
}

/// Recompute the three price tiers for every product from its stored
/// vendor reference prices and write the rows that drifted.
///
/// Rows whose wholesale price cannot support the derivation are skipped
/// with a warning.
///
/// # Errors
///
/// Returns an error if the rules cannot be loaded, the catalog cannot be
/// read, the run cannot be created, or a write fails.
pub(crate) async fn run_fix_pricing(
    pool: &sqlx::PgPool,
    config: &armory_core::AppConfig,
    apply: bool,
) -> anyhow::Result<()> {
    let rules = armory_core::load_pricing_rules(config.pricing_rules_path.as_deref())?;
    let rows = load_all_products(pool).await?;
    let total = rows.len();

    let mut skipped = 0usize;
    let mut changes: Vec<PricingChange> = Vec::new();

    for row in rows {
        let product = Product::from(row);
        let inputs = PriceInputs {
            wholesale: product.price_wholesale,
            map: product.price_map,
            msrp: product.price_msrp,
        };
        let tiers = match armory_core::price_tiers(inputs, &rules) {
            Ok(tiers) => tiers,
            Err(e) => {
                skipped += 1;
                tracing::warn!(
                    stock_number = %product.rsr_stock_number,
                    error = %e,
                    "cannot reprice product"
                );
                continue;
            }
        };
        let current = TierPricing {
            bronze: product.price_bronze,
            gold: product.price_gold,
            platinum: product.price_platinum,
        };
        if tiers != current {
            changes.push(PricingChange {
                stock_number: product.rsr_stock_number,
                tiers,
            });
        }
    }

    if changes.is_empty() {
        println!("pricing: {total} products checked, all tiers current ({skipped} skipped)");
        return Ok(());
    }

    println!(
        "{:<18}{:>10}{:>10}{:>10}",
        "STOCK NUMBER", "BRONZE", "GOLD", "PLATINUM"
    );
    for change in &changes {
        println!(
            "{:<18}{:>10}{:>10}{:>10}",
            change.stock_number, change.tiers.bronze, change.tiers.gold, change.tiers.platinum
        );
    }

    if !apply {
        println!(
            "dry-run: {} of {total} products would reprice ({skipped} skipped); \
             re-run with --apply to write",
            changes.len()
        );
        return Ok(());
    }

    let run = armory_db::create_sync_run(pool, "pricing-apply", "cli").await?;
    if let Err(e) = armory_db::start_sync_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "pricing-apply", format!("{e:#}")).await;
        return Err(e.into());
    }

    let mut repriced: i32 = 0;
    let mut missed: i32 = 0;

    let result: anyhow::Result<()> = async {
        for change in &changes {
            match armory_db::update_pricing(pool, &change.stock_number, change.tiers).await? {
                MutateOutcome::Updated => repriced = repriced.saturating_add(1),
                MutateOutcome::Unchanged => {}
                MutateOutcome::Missing => {
                    missed = missed.saturating_add(1);
                    tracing::warn!(
                        stock_number = %change.stock_number,
                        "row disappeared between scan and reprice"
                    );
                }
            }
        }
        Ok(())
    }
    .await;

    match result {
        Ok(()) => {
            if let Err(err) = armory_db::complete_sync_run(pool, run.id, repriced, missed).await {
                let message = format!("{err:#}");
                fail_run_best_effort(pool, run.id, "pricing-apply", message).await;
                return Err(err.into());
            }
            println!("repriced {repriced} products ({skipped} skipped)");
            Ok(())
        }
        Err(err) => {
            fail_run_best_effort(pool, run.id, "pricing-apply", format!("{err:#}")).await;
            Err(err)
        }
    }
}

/// Looks up a usable feed-sourced part number for a collapsed row.
fn feed_candidate<'a>(
    feed_mpns: Option<&'a HashMap<String, String>>,
    product: &Product,
) -> Option<&'a str> {
    feed_mpns?
        .get(&product.rsr_stock_number)
        .map(String::as_str)
        .filter(|mpn| *mpn != product.rsr_stock_number)
}

/// Stock number to manufacturer part number pairs from an inventory file.
async fn feed_part_numbers(path: &Path) -> anyhow::Result<HashMap<String, String>> {
    let input = crate::feed::read_feed_file(path).await?;
    let report = armory_feed::parse_inventory(&input)?;
    Ok(report
        .records
        .into_iter()
        .filter_map(|record| {
            let mpn = record.manufacturer_part_number?;
            let trimmed = mpn.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some((record.stock_number, trimmed.to_owned()))
        })
        .collect())
}
