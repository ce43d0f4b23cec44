//! Explicit-TLS FTP source for the vendor feed drop.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use suppaftp::types::FileType;
use suppaftp::{RustlsConnector, RustlsFtpStream};

use crate::error::FeedError;
use crate::files::FeedFile;

/// Fetches feed files from the vendor's FTPS drop.
///
/// The vendor runs explicit TLS on a non-standard port and publishes the
/// feed under `ftpdownloads/`. Each fetch opens a fresh session; the
/// server closes idle control connections too aggressively to keep one
/// alive across files.
pub struct FtpsSource {
    host: String,
    port: u16,
    user: String,
    pass: String,
}

impl FtpsSource {
    #[must_use]
    pub fn new(host: &str, port: u16, user: &str, pass: &str) -> Self {
        Self {
            host: host.to_owned(),
            port,
            user: user.to_owned(),
            pass: pass.to_owned(),
        }
    }

    /// Downloads `file` into `feed_dir`, returning the local path.
    ///
    /// The blocking FTP session runs on the blocking thread pool.
    ///
    /// # Errors
    ///
    /// - [`FeedError::Ftp`] — connect, TLS, login, or transfer failure.
    /// - [`FeedError::Io`] — the file cannot be written locally.
    pub async fn fetch(&self, file: FeedFile, feed_dir: &Path) -> Result<PathBuf, FeedError> {
        let host = self.host.clone();
        let port = self.port;
        let user = self.user.clone();
        let pass = self.pass.clone();
        let remote_path = file.remote_path();

        tracing::debug!(host, port, remote_path, "fetching feed file over FTPS");
        let bytes =
            tokio::task::spawn_blocking(move || retrieve(&host, port, &user, &pass, remote_path))
                .await??;

        let dest = file.local_path(feed_dir);
        super::write_atomic(&dest, &bytes).await?;
        Ok(dest)
    }
}

/// One complete FTPS session: connect, upgrade to TLS, login, binary
/// transfer, quit.
fn retrieve(
    host: &str,
    port: u16,
    user: &str,
    pass: &str,
    remote_path: &str,
) -> Result<Vec<u8>, FeedError> {
    let mut root_store = rustls::RootCertStore::empty();
    root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
    let tls_config = rustls::ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    let stream = RustlsFtpStream::connect((host, port))?;
    let mut stream =
        stream.into_secure(RustlsConnector::from(Arc::new(tls_config)), host)?;
    stream.login(user, pass)?;
    stream.transfer_type(FileType::Binary)?;
    let buffer = stream.retr_as_buffer(remote_path)?;
    // Session teardown is best-effort; the bytes are already in hand.
    stream.quit().ok();
    Ok(buffer.into_inner())
}
