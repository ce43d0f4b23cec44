//! Image sync against the S3-compatible media bucket.

pub mod error;
pub mod store;

pub use error::MediaError;
pub use store::{object_key, ImageStore, SyncCounts};
