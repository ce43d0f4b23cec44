//! Client, document shape, and reconciliation for the hosted search index.

pub mod client;
pub mod document;
pub mod error;
pub mod reconcile;

mod retry;

pub use client::{
    BatchAction, BatchRequest, BatchResponse, BrowseResponse, ObjectSummary, QueryParams,
    QueryResponse, SearchClient,
};
pub use document::{index_settings, ProductDoc};
pub use error::SearchError;
pub use reconcile::{ApplyReport, SyncPlan};
