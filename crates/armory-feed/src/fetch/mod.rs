//! Transport for the vendor feed directory.
//!
//! Two interchangeable sources cover the vendor's delivery options: the
//! FTPS drop (the primary channel) and an HTTP mirror of the same
//! directory. Downloads are atomic: bytes land in a `.part` file that is
//! renamed over the destination only once the transfer completes, so a
//! dropped connection never leaves a truncated feed file behind.

mod ftps;
mod http;

use std::path::{Path, PathBuf};

use armory_core::AppConfig;

use crate::error::FeedError;
use crate::files::FeedFile;

pub use ftps::FtpsSource;
pub use http::HttpSource;

/// Where feed files come from.
pub enum FeedSource {
    Ftps(FtpsSource),
    Http(HttpSource),
}

impl FeedSource {
    /// Builds the source from application config: the HTTP mirror when one
    /// is configured, the FTPS drop otherwise.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Http`] — the HTTP client cannot be constructed.
    /// - [`FeedError::MissingCredentials`] — FTPS is selected but the
    ///   account credentials are not configured.
    pub fn from_config(config: &AppConfig) -> Result<Self, FeedError> {
        if let Some(mirror) = &config.feed_http_mirror {
            return Ok(FeedSource::Http(HttpSource::new(
                mirror,
                config.request_timeout_secs,
            )?));
        }
        let user = config
            .feed_user
            .clone()
            .ok_or(FeedError::MissingCredentials { var: "RSR_FTP_USER" })?;
        let pass = config
            .feed_pass
            .clone()
            .ok_or(FeedError::MissingCredentials { var: "RSR_FTP_PASS" })?;
        Ok(FeedSource::Ftps(FtpsSource::new(
            &config.feed_host,
            config.feed_port,
            &user,
            &pass,
        )))
    }

    /// Downloads one feed file into `feed_dir`, returning its local path.
    ///
    /// # Errors
    ///
    /// Transport errors from the underlying source, or [`FeedError::Io`]
    /// for local filesystem failures.
    pub async fn fetch(&self, file: FeedFile, feed_dir: &Path) -> Result<PathBuf, FeedError> {
        match self {
            FeedSource::Ftps(source) => source.fetch(file, feed_dir).await,
            FeedSource::Http(source) => source.fetch(file, feed_dir).await,
        }
    }

    /// Downloads each requested file in turn.
    ///
    /// # Errors
    ///
    /// Stops at the first file that fails to transfer.
    pub async fn pull(&self, files: &[FeedFile], feed_dir: &Path) -> Result<PullReport, FeedError> {
        let mut pulled = Vec::with_capacity(files.len());
        for file in files {
            let path = self.fetch(*file, feed_dir).await?;
            let bytes = tokio::fs::metadata(&path)
                .await
                .map_err(|source| FeedError::Io {
                    path: path.clone(),
                    source,
                })?
                .len();
            tracing::info!(file = file.file_name(), bytes, "feed file downloaded");
            pulled.push(PulledFile {
                file: *file,
                bytes,
                path,
            });
        }
        Ok(PullReport { files: pulled })
    }
}

/// Per-file outcome of a [`FeedSource::pull`].
#[derive(Debug)]
pub struct PullReport {
    pub files: Vec<PulledFile>,
}

impl PullReport {
    /// Total bytes transferred across all files.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|file| file.bytes).sum()
    }
}

#[derive(Debug)]
pub struct PulledFile {
    pub file: FeedFile,
    pub bytes: u64,
    pub path: PathBuf,
}

/// Writes `bytes` to `dest` via a `.part` sibling and an atomic rename.
async fn write_atomic(dest: &Path, bytes: &[u8]) -> Result<(), FeedError> {
    if let Some(parent) = dest.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| FeedError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let mut part = dest.as_os_str().to_owned();
    part.push(".part");
    let part = PathBuf::from(part);

    tokio::fs::write(&part, bytes)
        .await
        .map_err(|source| FeedError::Io {
            path: part.clone(),
            source,
        })?;
    tokio::fs::rename(&part, dest)
        .await
        .map_err(|source| FeedError::Io {
            path: part.clone(),
            source,
        })?;
    Ok(())
}
