//! HTTP mirror source for the vendor feed directory.

use std::path::{Path, PathBuf};
use std::time::Duration;

use reqwest::Client;

use crate::error::FeedError;
use crate::files::FeedFile;

/// Fetches feed files from an HTTP mirror of the vendor directory.
///
/// The mirror serves each file at `{base_url}/{file_name}`. Non-2xx
/// responses become [`FeedError::UnexpectedStatus`]; nothing is written
/// to disk unless the body arrives intact.
pub struct HttpSource {
    client: Client,
    base_url: String,
}

impl HttpSource {
    /// Creates an `HttpSource` with the configured request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, FeedError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    /// Downloads `file` into `feed_dir`, returning the local path.
    ///
    /// # Errors
    ///
    /// - [`FeedError::UnexpectedStatus`] — any non-2xx response.
    /// - [`FeedError::Http`] — network or TLS failure.
    /// - [`FeedError::Io`] — the file cannot be written locally.
    pub async fn fetch(&self, file: FeedFile, feed_dir: &Path) -> Result<PathBuf, FeedError> {
        let url = format!("{}/{}", self.base_url, file.file_name());
        tracing::debug!(%url, "fetching feed file over HTTP");

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::UnexpectedStatus {
                status: status.as_u16(),
                url,
            });
        }

        let body = response.bytes().await?;
        let dest = file.local_path(feed_dir);
        super::write_atomic(&dest, &body).await?;
        Ok(dest)
    }
}
