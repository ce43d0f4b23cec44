//! Error types for feed transport, parsing, and normalization.

use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while downloading or interpreting the vendor feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// Network or TLS failure from the HTTP transport.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Failure from the FTPS transport (connect, TLS handshake, login,
    /// or transfer).
    #[error("FTPS transport error: {0}")]
    Ftp(#[from] suppaftp::FtpError),

    /// The HTTP mirror answered with a non-success status.
    #[error("unexpected HTTP status {status} fetching {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// FTPS credentials are required but not configured.
    #[error("feed credentials missing: set {var}")]
    MissingCredentials { var: &'static str },

    /// Filesystem failure reading or writing a local feed file.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A feed file that must never be empty arrived with no rows.
    /// Guards against treating a truncated download as "everything deleted".
    #[error("feed file {file} is empty")]
    EmptyFile { file: &'static str },

    /// Every row of a feed file failed validation. A systematic failure
    /// like this means the vendor changed the layout, not the data.
    #[error("all {total} rows of {file} failed validation")]
    AllRowsInvalid { file: &'static str, total: usize },

    /// A parsed record could not be converted into a catalog product.
    #[error("cannot normalize {stock_number}: {reason}")]
    Normalization { stock_number: String, reason: String },

    /// A blocking transfer task panicked or was cancelled.
    #[error("background transfer task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}
