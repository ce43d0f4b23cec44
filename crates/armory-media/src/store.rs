//! S3-compatible store for product photos.
//!
//! The storefront serves images straight from the bucket, so this module
//! only ever adds objects: each local jpg is uploaded under a canonical
//! key unless the bucket already holds it.

use std::path::{Path, PathBuf};

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::config::Credentials;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use armory_core::AppConfig;

use crate::error::MediaError;

/// Key prefix the storefront expects product photos under.
const KEY_PREFIX: &str = "rsr/standard";

/// Published photos never change; let CDNs cache them for a year.
const CACHE_CONTROL: &str = "public, max-age=31536000, immutable";

/// Outcome counters for one sync pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SyncCounts {
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl SyncCounts {
    /// True when every attempted object failed.
    pub fn all_failed(&self) -> bool {
        self.failed > 0 && self.uploaded == 0 && self.skipped == 0
    }
}

/// Destination key for a local image file.
///
/// Stems are uppercased so keys match the feed's image names regardless
/// of local filesystem casing, and the extension is normalized to `.jpg`.
pub fn object_key(file_name: &str) -> Option<String> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    if stem.is_empty() {
        return None;
    }
    Some(format!("{KEY_PREFIX}/{}.jpg", stem.to_uppercase()))
}

/// Handle to the bucket that serves product photos.
pub struct ImageStore {
    client: Client,
    bucket: String,
}

enum UploadOutcome {
    Uploaded,
    Skipped,
}

impl ImageStore {
    /// Wrap an existing SDK client.
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    /// Build a store from application config.
    ///
    /// A configured endpoint switches the SDK to path-style addressing,
    /// which non-AWS providers require.
    pub async fn from_config(config: &AppConfig) -> Result<Self, MediaError> {
        let bucket = config
            .media_bucket
            .clone()
            .ok_or(MediaError::MissingCredentials {
                var: "MEDIA_S3_BUCKET",
            })?;
        let access_key =
            config
                .media_access_key
                .clone()
                .ok_or(MediaError::MissingCredentials {
                    var: "MEDIA_S3_ACCESS_KEY",
                })?;
        let secret_key =
            config
                .media_secret_key
                .clone()
                .ok_or(MediaError::MissingCredentials {
                    var: "MEDIA_S3_SECRET_KEY",
                })?;

        let credentials = Credentials::new(access_key, secret_key, None, None, "armory-media");
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.media_region.clone()))
            .credentials_provider(credentials);
        if let Some(endpoint) = &config.media_endpoint {
            loader = loader.endpoint_url(endpoint);
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(config.media_endpoint.is_some())
            .build();

        Ok(Self::new(Client::from_conf(s3_config), bucket))
    }

    /// Whether the bucket already holds `key`.
    pub async fn object_exists(&self, key: &str) -> bool {
        self.client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .is_ok()
    }

    /// Upload one local image to `key`.
    pub async fn upload_image(&self, path: &Path, key: &str) -> Result<(), MediaError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| MediaError::ImageRead {
                path: path.to_path_buf(),
                source,
            })?;

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(bytes))
            .content_type("image/jpeg")
            .cache_control(CACHE_CONTROL)
            .send()
            .await
            .map_err(|e| MediaError::Request {
                key: key.to_owned(),
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Upload every jpg directly under `dir` that the bucket does not
    /// already hold; `force` re-uploads unconditionally.
    ///
    /// Per-object failures are logged and counted, not fatal.
    pub async fn sync_dir(
        &self,
        dir: &Path,
        force: bool,
        max_concurrent: usize,
    ) -> Result<SyncCounts, MediaError> {
        let files = list_jpg_files(dir)?;
        if files.is_empty() {
            info!(dir = %dir.display(), "no jpg files to sync");
            return Ok(SyncCounts::default());
        }

        info!(dir = %dir.display(), files = files.len(), force, "syncing images to bucket");

        let results = stream::iter(files.into_iter().map(|(path, key)| async move {
            let outcome = self.sync_one(&path, &key, force).await;
            (path, key, outcome)
        }))
        .buffer_unordered(max_concurrent.max(1))
        .collect::<Vec<_>>()
        .await;

        let mut counts = SyncCounts::default();
        for (path, key, outcome) in results {
            match outcome {
                Ok(UploadOutcome::Uploaded) => counts.uploaded += 1,
                Ok(UploadOutcome::Skipped) => counts.skipped += 1,
                Err(e) => {
                    counts.failed += 1;
                    warn!(key = %key, path = %path.display(), error = %e, "image upload failed");
                }
            }
        }

        info!(
            uploaded = counts.uploaded,
            skipped = counts.skipped,
            failed = counts.failed,
            "image sync finished"
        );
        Ok(counts)
    }

    async fn sync_one(
        &self,
        path: &Path,
        key: &str,
        force: bool,
    ) -> Result<UploadOutcome, MediaError> {
        if !force && self.object_exists(key).await {
            return Ok(UploadOutcome::Skipped);
        }
        self.upload_image(path, key).await?;
        Ok(UploadOutcome::Uploaded)
    }
}

/// Collect `(path, destination key)` pairs for every jpg directly under
/// `dir`, in deterministic path order.
fn list_jpg_files(dir: &Path) -> Result<Vec<(PathBuf, String)>, MediaError> {
    let entries = std::fs::read_dir(dir).map_err(|source| MediaError::ImageDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| MediaError::ImageDir {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if !path.is_file() || !has_jpg_extension(&path) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let Some(key) = object_key(name) else {
            continue;
        };
        files.push((path, key));
    }
    files.sort();
    Ok(files)
}

fn has_jpg_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("jpg"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_key_uppercases_the_stem() {
        assert_eq!(
            object_key("glock19gen5.jpg").as_deref(),
            Some("rsr/standard/GLOCK19GEN5.jpg")
        );
    }

    #[test]
    fn object_key_preserves_stem_separators() {
        assert_eq!(
            object_key("AAC17-22G3_1.jpg").as_deref(),
            Some("rsr/standard/AAC17-22G3_1.jpg")
        );
    }

    #[test]
    fn object_key_normalizes_the_extension() {
        assert_eq!(
            object_key("colt-python.JPG").as_deref(),
            Some("rsr/standard/COLT-PYTHON.jpg")
        );
    }

    #[test]
    fn list_jpg_files_filters_and_orders() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.jpg"), b"jpg").unwrap();
        std::fs::write(dir.path().join("A.JPG"), b"jpg").unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"text").unwrap();
        std::fs::write(dir.path().join("photo.jpeg"), b"jpg").unwrap();
        std::fs::create_dir(dir.path().join("nested.jpg")).unwrap();

        let files = list_jpg_files(dir.path()).unwrap();
        let keys: Vec<&str> = files.iter().map(|(_, key)| key.as_str()).collect();

        assert_eq!(keys, vec!["rsr/standard/A.jpg", "rsr/standard/B.jpg"]);
    }

    #[test]
    fn list_jpg_files_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent");

        let err = list_jpg_files(&missing).unwrap_err();

        assert!(matches!(err, MediaError::ImageDir { path, .. } if path == missing));
    }

    #[test]
    fn all_failed_requires_an_attempt() {
        assert!(!SyncCounts::default().all_failed());
        assert!(SyncCounts {
            uploaded: 0,
            skipped: 0,
            failed: 3,
        }
        .all_failed());
        assert!(!SyncCounts {
            uploaded: 1,
            skipped: 0,
            failed: 3,
        }
        .all_failed());
    }
}
