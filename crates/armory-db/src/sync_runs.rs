//! Database operations for `sync_runs`.
//!
//! Every CLI operation that mutates the catalog or the search index records
//! itself here. `run_type` is a short kebab-case tag (`feed-ingest`,
//! `quantity-update`, `deletions`, `index-sync`, `index-rebuild`,
//! `sku-repair`, `category-apply`, `pricing-apply`, `media-sync`) and the
//! status walks `queued -> running -> succeeded | failed`, guarded so a run
//! cannot skip or repeat a transition.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::DbError;

/// A row from the `sync_runs` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SyncRunRow {
    pub id: i64,
    pub public_id: Uuid,
    pub run_type: String,
    pub trigger_source: String,
    pub status: String,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub records_processed: i32,
    pub records_failed: i32,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

const SYNC_RUN_COLUMNS: &str = "id, public_id, run_type, trigger_source, status, \
     started_at, completed_at, records_processed, records_failed, error_message, created_at";

/// Creates a new sync run in `queued` status.
///
/// Generates a UUID in Rust and binds it to `public_id`. Returns the full
/// newly-created row.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails.
pub async fn create_sync_run(
    pool: &PgPool,
    run_type: &str,
    trigger_source: &str,
) -> Result<SyncRunRow, DbError> {
    let public_id = Uuid::new_v4();

    let sql = format!(
        "INSERT INTO sync_runs (public_id, run_type, trigger_source, status) \
         VALUES ($1, $2, $3, 'queued') \
         RETURNING {SYNC_RUN_COLUMNS}"
    );
    let row = sqlx::query_as::<_, SyncRunRow>(&sql)
        .bind(public_id)
        .bind(run_type)
        .bind(trigger_source)
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Marks a run as `running` and sets `started_at = NOW()`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `queued`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn start_sync_run(pool: &PgPool, id: i64) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE sync_runs \
         SET status = 'running', started_at = NOW() \
         WHERE id = $1 AND status = 'queued'",
    )
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "queued",
        });
    }

    Ok(())
}

/// Marks a run as `succeeded` and records the processed/failed counts.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn complete_sync_run(
    pool: &PgPool,
    id: i64,
    records_processed: i32,
    records_failed: i32,
) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE sync_runs \
         SET status = 'succeeded', completed_at = NOW(), \
             records_processed = $1, records_failed = $2 \
         WHERE id = $3 AND status = 'running'",
    )
    .bind(records_processed)
    .bind(records_failed)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Marks a run as `failed`, sets `completed_at = NOW()` and `error_message`.
///
/// # Errors
///
/// Returns [`DbError::InvalidRunTransition`] if the run is not `running`, or
/// [`DbError::Sqlx`] if the update fails.
pub async fn fail_sync_run(pool: &PgPool, id: i64, error_message: &str) -> Result<(), DbError> {
    let result = sqlx::query(
        "UPDATE sync_runs \
         SET status = 'failed', completed_at = NOW(), error_message = $1 \
         WHERE id = $2 AND status = 'running'",
    )
    .bind(error_message)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::InvalidRunTransition {
            id,
            expected_status: "running",
        });
    }

    Ok(())
}

/// Returns the most recent `limit` runs, newest first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn list_sync_runs(pool: &PgPool, limit: i64) -> Result<Vec<SyncRunRow>, DbError> {
    let sql = format!(
        "SELECT {SYNC_RUN_COLUMNS} FROM sync_runs \
         ORDER BY created_at DESC, id DESC \
         LIMIT $1"
    );
    let rows = sqlx::query_as::<_, SyncRunRow>(&sql)
        .bind(limit)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
