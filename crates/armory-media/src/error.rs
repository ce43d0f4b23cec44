//! Error types for media bucket operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while syncing images to the media bucket.
#[derive(Debug, Error)]
pub enum MediaError {
    /// Bucket credentials are required but not configured.
    #[error("media credentials missing: set {var}")]
    MissingCredentials { var: &'static str },

    /// The local image directory could not be listed.
    #[error("failed to read image directory {}: {source}", .path.display())]
    ImageDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A local image file could not be read.
    #[error("failed to read image {}: {source}", .path.display())]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bucket rejected or failed a request.
    #[error("bucket request for {key} failed: {message}")]
    Request { key: String, message: String },
}
