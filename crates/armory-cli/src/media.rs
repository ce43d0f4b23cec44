//! Media command handlers for the CLI.

use clap::Subcommand;

use armory_media::ImageStore;

use crate::fail_run_best_effort;

/// Parallel uploads per sync pass.
const MAX_CONCURRENT_UPLOADS: usize = 8;

/// Sub-commands available under `media`.
#[derive(Debug, Subcommand)]
pub enum MediaCommands {
    /// Upload local product images to the media bucket
    Sync {
        /// Re-upload images that already exist in the bucket
        #[arg(long)]
        force: bool,
    },
}

/// Push local product images to the media bucket, skipping objects that
/// already exist unless `force` is set.
///
/// Per-image failures are logged and counted; the run only fails when
/// every attempted upload fails.
///
/// # Errors
///
/// Returns an error if the store cannot be configured, the image
/// directory cannot be listed, the run cannot be created, or every
/// upload fails.
pub(crate) async fn run_media_sync(
    pool: &sqlx::PgPool,
    config: &armory_core::AppConfig,
    force: bool,
) -> anyhow::Result<()> {
    let store = ImageStore::from_config(config).await?;

    let run = armory_db::create_sync_run(pool, "media-sync", "cli").await?;
    if let Err(e) = armory_db::start_sync_run(pool, run.id).await {
        fail_run_best_effort(pool, run.id, "media-sync", format!("{e:#}")).await;
        return Err(e.into());
    }

    let counts = match store
        .sync_dir(&config.image_dir, force, MAX_CONCURRENT_UPLOADS)
        .await
    {
        Ok(counts) => counts,
        Err(err) => {
            fail_run_best_effort(pool, run.id, "media-sync", format!("{err:#}")).await;
            return Err(err.into());
        }
    };

    if counts.all_failed() {
        let message = format!("all {} uploads failed", counts.failed);
        fail_run_best_effort(pool, run.id, "media-sync", message.clone()).await;
        anyhow::bail!(message);
    }

    let processed = i32::try_from(counts.uploaded + counts.skipped).unwrap_or(i32::MAX);
    let failed = i32::try_from(counts.failed).unwrap_or(i32::MAX);
    if let Err(err) = armory_db::complete_sync_run(pool, run.id, processed, failed).await {
        let message = format!("{err:#}");
        fail_run_best_effort(pool, run.id, "media-sync", message).await;
        return Err(err.into());
    }

    println!(
        "media sync: {} uploaded, {} skipped, {} failed",
        counts.uploaded, counts.skipped, counts.failed
    );
    Ok(())
}
