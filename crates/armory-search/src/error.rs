//! Error types for the search-index client.

use thiserror::Error;

/// Errors produced while talking to the hosted search index.
#[derive(Debug, Error)]
pub enum SearchError {
    /// Network or TLS failure.
    #[error("HTTP transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-2xx application response, with the provider's error message
    /// when one could be parsed from the body.
    #[error("search API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// HTTP 429; the provider has asked us to back off.
    #[error("search API rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Response body did not match the expected shape.
    #[error("failed to deserialize {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// Browse cursors kept coming past any plausible index size.
    #[error("browse exceeded {max_pages} pages; cursor may be cycling")]
    PaginationLimit { max_pages: usize },

    /// Index credentials are required but not configured.
    #[error("search credentials missing: set {var}")]
    MissingCredentials { var: &'static str },
}
