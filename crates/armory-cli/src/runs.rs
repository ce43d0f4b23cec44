//! Run history command handlers for the CLI.

use chrono::{DateTime, Utc};
use clap::Subcommand;

/// Sub-commands available under `runs`.
#[derive(Debug, Subcommand)]
pub enum RunsCommands {
    /// Show recent sync runs, newest first
    List {
        /// Maximum number of runs to show
        #[arg(long, default_value = "20")]
        limit: i64,
    },
}

/// Print recent sync runs as a table.
///
/// # Errors
///
/// Returns an error if the run history cannot be read.
pub(crate) async fn run_runs_list(pool: &sqlx::PgPool, limit: i64) -> anyhow::Result<()> {
    let runs = armory_db::list_sync_runs(pool, limit).await?;
    if runs.is_empty() {
        println!("no sync runs recorded yet");
        return Ok(());
    }

    println!(
        "{:<6}{:<16}{:<11}{:<21}{:>10}{:>8}  ERROR",
        "ID", "TYPE", "STATUS", "STARTED", "RECORDS", "FAILED"
    );
    for run in &runs {
        println!(
            "{:<6}{:<16}{:<11}{:<21}{:>10}{:>8}  {}",
            run.id,
            run.run_type,
            run.status,
            fmt_time(run.started_at),
            run.records_processed,
            run.records_failed,
            run.error_message.as_deref().map_or_else(String::new, truncate_error)
        );
    }
    Ok(())
}

fn fmt_time(t: Option<DateTime<Utc>>) -> String {
    t.map_or_else(
        || "\u{2014}".to_string(),
        |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

fn truncate_error(message: &str) -> String {
    if message.chars().count() > 50 {
        let truncated: String = message.chars().take(50).collect();
        format!("{truncated}...")
    } else {
        message.to_string()
    }
}
