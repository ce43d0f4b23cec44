//! Drift detection and repair between the relational store and the index.
//!
//! Planning is pure: two id-to-hash maps in, a deterministic [`SyncPlan`]
//! out. Applying the plan is the only part that talks to the network, and
//! it tolerates individual batch failures so one bad payload cannot stall
//! the rest of a sync.

use std::collections::HashMap;
use std::time::Duration;

use crate::client::{BatchAction, BatchRequest, ObjectSummary, SearchClient};
use crate::document::ProductDoc;

/// What it takes to bring the index in line with the database.
///
/// Ids are sorted ascending so identical states always produce identical
/// plans, run to run and in tests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncPlan {
    /// Object ids missing from the index or carrying a stale hash.
    pub to_upsert: Vec<String>,
    /// Remote object ids with no matching database row.
    pub to_delete: Vec<String>,
    /// Number of ids already in sync.
    pub unchanged: usize,
}

impl SyncPlan {
    /// Returns `true` when the index already matches the database.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.to_upsert.is_empty() && self.to_delete.is_empty()
    }
}

/// Collapses browsed object summaries into an id-to-hash map.
///
/// Documents without a content hash were written by tooling that predates
/// hashing; the empty hash never matches a real one, so they always plan
/// as upserts.
#[must_use]
pub fn remote_index(objects: Vec<ObjectSummary>) -> HashMap<String, String> {
    objects
        .into_iter()
        .map(|object| (object.object_id, object.content_hash.unwrap_or_default()))
        .collect()
}

/// Diffs local state against remote state.
///
/// `local` is the database side (stock number to stored content hash),
/// `remote` the index side (object id to indexed content hash). A row is
/// upserted when the index lacks it or disagrees on the hash; a remote
/// object is deleted when no row backs it.
#[must_use]
pub fn plan(local: &HashMap<String, String>, remote: &HashMap<String, String>) -> SyncPlan {
    let mut to_upsert: Vec<String> = local
        .iter()
        .filter(|(id, hash)| remote.get(*id) != Some(*hash))
        .map(|(id, _)| id.clone())
        .collect();
    to_upsert.sort_unstable();

    let mut to_delete: Vec<String> = remote
        .keys()
        .filter(|id| !local.contains_key(*id))
        .cloned()
        .collect();
    to_delete.sort_unstable();

    let unchanged = local.len() - to_upsert.len();

    SyncPlan {
        to_upsert,
        to_delete,
        unchanged,
    }
}

/// Outcome of applying a plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub batches: usize,
    pub failed_batches: usize,
    pub upserted: usize,
    pub deleted: usize,
}

impl ApplyReport {
    /// Returns `true` when every batch failed; such a run is recorded as
    /// failed rather than partially applied.
    #[must_use]
    pub fn all_failed(&self) -> bool {
        self.batches > 0 && self.failed_batches == self.batches
    }
}

/// Pushes upserts and deletions to `index` in configured batch sizes with
/// an inter-batch delay.
///
/// A failed batch is logged and counted; later batches still run. The
/// caller decides what a partial failure means for the sync run.
pub async fn apply(
    client: &SearchClient,
    index: &str,
    docs: &[ProductDoc],
    deletes: &[String],
    batch_size: usize,
    batch_delay_ms: u64,
) -> ApplyReport {
    let batch_size = batch_size.max(1);
    let delay = Duration::from_millis(batch_delay_ms);

    let mut batches: Vec<Vec<BatchRequest>> = Vec::new();
    for chunk in docs.chunks(batch_size) {
        let requests: Vec<BatchRequest> = chunk
            .iter()
            .filter_map(|doc| match serde_json::to_value(doc) {
                Ok(body) => Some(BatchRequest::update_object(body)),
                Err(err) => {
                    tracing::warn!(
                        object_id = %doc.object_id,
                        error = %err,
                        "skipping unserializable document"
                    );
                    None
                }
            })
            .collect();
        if !requests.is_empty() {
            batches.push(requests);
        }
    }
    for chunk in deletes.chunks(batch_size) {
        batches.push(chunk.iter().map(|id| BatchRequest::delete_object(id)).collect());
    }

    let mut report = ApplyReport {
        batches: batches.len(),
        ..ApplyReport::default()
    };

    for (number, requests) in batches.iter().enumerate() {
        if number > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        match client.batch(index, requests).await {
            Ok(_) => {
                for request in requests {
                    if matches!(request.action, BatchAction::DeleteObject) {
                        report.deleted += 1;
                    } else {
                        report.upserted += 1;
                    }
                }
                tracing::debug!(batch = number + 1, total = report.batches, "index batch applied");
            }
            Err(err) => {
                report.failed_batches += 1;
                tracing::warn!(
                    batch = number + 1,
                    total = report.batches,
                    size = requests.len(),
                    error = %err,
                    "index batch failed"
                );
            }
        }
    }

    report
}
