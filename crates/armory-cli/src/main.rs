mod feed;
mod fix;
mod index;
mod media;
mod runs;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use crate::feed::FeedCommands;
use crate::fix::FixCommands;
use crate::index::IndexCommands;
use crate::media::MediaCommands;
use crate::runs::RunsCommands;

#[derive(Debug, Parser)]
#[command(name = "armory")]
#[command(about = "Catalog maintenance for the armory storefront")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Vendor feed operations
    Feed {
        #[command(subcommand)]
        command: FeedCommands,
    },
    /// Search index operations
    Index {
        #[command(subcommand)]
        command: IndexCommands,
    },
    /// Data repair passes over the stored catalog
    Fix {
        #[command(subcommand)]
        command: FixCommands,
    },
    /// Product image bucket operations
    Media {
        #[command(subcommand)]
        command: MediaCommands,
    },
    /// Sync run history
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = armory_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let Some(command) = cli.command else {
        println!("no command given; run `armory --help` for usage");
        return Ok(());
    };

    match command {
        Commands::Feed { command } => match command {
            FeedCommands::Pull { file, via } => {
                feed::run_feed_pull(&config, file.as_deref(), via).await
            }
            FeedCommands::Ingest {
                path,
                limit,
                dry_run,
            } => {
                let pool = connect_pool(&config).await?;
                feed::run_feed_ingest(&pool, &config, path.as_deref(), limit, dry_run).await
            }
            FeedCommands::Quantities {
                path,
                push_index,
                dry_run,
            } => {
                let pool = connect_pool(&config).await?;
                feed::run_feed_quantities(&pool, &config, path.as_deref(), push_index, dry_run)
                    .await
            }
            FeedCommands::Deletions { path, dry_run } => {
                let pool = connect_pool(&config).await?;
                feed::run_feed_deletions(&pool, &config, path.as_deref(), dry_run).await
            }
        },
        Commands::Index { command } => match command {
            IndexCommands::Sync { dry_run } => {
                let pool = connect_pool(&config).await?;
                index::run_index_sync(&pool, &config, dry_run).await
            }
            IndexCommands::Rebuild { yes } => {
                let pool = connect_pool(&config).await?;
                index::run_index_rebuild(&pool, &config, yes).await
            }
            IndexCommands::Settings => index::run_index_settings(&config).await,
            IndexCommands::Status { verbose } => {
                let pool = connect_pool(&config).await?;
                index::run_index_status(&pool, &config, verbose).await
            }
        },
        Commands::Fix { command } => match command {
            FixCommands::Skus { feed, apply } => {
                let pool = connect_pool(&config).await?;
                fix::run_fix_skus(&pool, feed.as_deref(), apply).await
            }
            FixCommands::Categories { apply } => {
                let pool = connect_pool(&config).await?;
                fix::run_fix_categories(&pool, apply).await
            }
            FixCommands::Pricing { apply } => {
                let pool = connect_pool(&config).await?;
                fix::run_fix_pricing(&pool, &config, apply).await
            }
        },
        Commands::Media { command } => match command {
            MediaCommands::Sync { force } => {
                let pool = connect_pool(&config).await?;
                media::run_media_sync(&pool, &config, force).await
            }
        },
        Commands::Runs { command } => match command {
            RunsCommands::List { limit } => {
                let pool = connect_pool(&config).await?;
                runs::run_runs_list(&pool, limit).await
            }
        },
    }
}

/// Connect the pool, check it answers, and bring the schema up to date.
/// Every DB-touching command goes through here so a stale schema can never
/// be written to.
async fn connect_pool(config: &armory_core::AppConfig) -> anyhow::Result<sqlx::PgPool> {
    let pool_config = armory_db::PoolConfig::from_app_config(config);
    let pool = armory_db::connect_pool(&config.database_url, pool_config).await?;
    armory_db::health_check(&pool).await?;
    let applied = armory_db::run_migrations(&pool).await?;
    if applied > 0 {
        tracing::info!(applied, "applied pending migrations");
    }
    Ok(pool)
}

/// Fetch the whole products table, one page at a time.
pub(crate) async fn load_all_products(
    pool: &sqlx::PgPool,
) -> anyhow::Result<Vec<armory_db::ProductRow>> {
    const PAGE_SIZE: i64 = 1000;
    let mut rows = Vec::new();
    let mut offset: i64 = 0;
    loop {
        let page = armory_db::list_products(pool, PAGE_SIZE, offset).await?;
        if page.is_empty() {
            break;
        }
        offset += i64::try_from(page.len()).unwrap_or(PAGE_SIZE);
        rows.extend(page);
    }
    Ok(rows)
}

/// Mark a sync run failed, logging rather than propagating an error from
/// the marking itself so the original failure stays the caller's result.
pub(crate) async fn fail_run_best_effort(
    pool: &sqlx::PgPool,
    run_id: i64,
    context: &'static str,
    message: String,
) {
    if let Err(mark_err) = armory_db::fail_sync_run(pool, run_id, &message).await {
        tracing::error!(
            run_id,
            error = %mark_err,
            "failed to mark {context} run as failed"
        );
    }
}
