//! Idempotent image cache
//!
//! Each character has an icon and a portrait, stored under the assets
//! directory and named by remote id. A file that exists is never fetched
//! again; there is no freshness check against the remote.
//!
//! Downloads stream into a sibling `.part` file that is renamed into place
//! only after the whole body arrived, so an interrupted transfer never
//! looks cached.

use crate::error::AssetDownloadError;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::debug;

/// Image kinds kept per character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Icon,
    Portrait,
}

impl AssetKind {
    pub const ALL: [AssetKind; 2] = [AssetKind::Icon, AssetKind::Portrait];

    /// Subdirectory of the assets dir holding this kind
    pub fn subdir(self) -> &'static str {
        match self {
            AssetKind::Icon => "icon/character",
            AssetKind::Portrait => "image/character_portrait",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssetKind::Icon => "icon",
            AssetKind::Portrait => "portrait",
        }
    }
}

/// What [`AssetFetcher::ensure_cached`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// File was already present; nothing was requested
    AlreadyCached,
    /// File was fetched
    Downloaded { bytes: u64 },
}

/// Where assets live remotely and locally
#[derive(Debug, Clone)]
pub struct AssetLayout {
    /// Prefix for relative remote paths, normally ending in `/`
    pub base_url: String,
    pub assets_dir: PathBuf,
}

impl AssetLayout {
    pub fn new(base_url: impl Into<String>, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_url: base_url.into(),
            assets_dir: assets_dir.into(),
        }
    }

    /// `<base_url><relative>`
    pub fn remote_url(&self, relative: &str) -> String {
        format!("{}{}", self.base_url, relative)
    }

    /// `<assets_dir>/<kind subdir>/<game_id>.png`
    pub fn local_path(&self, game_id: &str, kind: AssetKind) -> PathBuf {
        self.assets_dir
            .join(kind.subdir())
            .join(format!("{}.png", game_id))
    }
}

/// Anything that can make a remote asset available at a local path
#[async_trait]
pub trait AssetFetcher: Send + Sync {
    async fn ensure_cached(
        &self,
        remote_ref: &str,
        local_path: &Path,
    ) -> Result<CacheOutcome, AssetDownloadError>;
}

/// HTTP-backed asset cache
pub struct AssetCache {
    http_client: Client,
    retry: RetryPolicy,
}

impl AssetCache {
    pub fn new(http_client: Client, retry: RetryPolicy) -> Self {
        Self { http_client, retry }
    }

    /// Stream `url` into `part_path`, returning the byte count
    async fn stream_to(&self, url: &str, part_path: &Path) -> Result<u64, AssetDownloadError> {
        let response = self
            .http_client
            .get(url)
            .send()
            .await
            .map_err(|e| AssetDownloadError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(AssetDownloadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let io_err = |source: std::io::Error| AssetDownloadError::Io {
            path: part_path.to_path_buf(),
            source,
        };

        let mut file = tokio::fs::File::create(part_path).await.map_err(io_err)?;
        let mut stream = response.bytes_stream();
        let mut bytes = 0u64;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| AssetDownloadError::Network {
                url: url.to_string(),
                message: e.to_string(),
            })?;
            file.write_all(&chunk).await.map_err(io_err)?;
            bytes += chunk.len() as u64;
        }

        file.flush().await.map_err(io_err)?;
        file.sync_all().await.map_err(io_err)?;
        Ok(bytes)
    }

    /// One full download attempt; the partial file is removed on failure
    async fn download(&self, url: &str, local_path: &Path) -> Result<u64, AssetDownloadError> {
        let part_path = part_path_for(local_path);

        match self.stream_to(url, &part_path).await {
            Ok(bytes) => {
                tokio::fs::rename(&part_path, local_path)
                    .await
                    .map_err(|source| AssetDownloadError::Io {
                        path: local_path.to_path_buf(),
                        source,
                    })?;
                Ok(bytes)
            }
            Err(err) => {
                // Ignore: the part file may never have been created
                let _ = tokio::fs::remove_file(&part_path).await;
                Err(err)
            }
        }
    }
}

#[async_trait]
impl AssetFetcher for AssetCache {
    async fn ensure_cached(
        &self,
        remote_ref: &str,
        local_path: &Path,
    ) -> Result<CacheOutcome, AssetDownloadError> {
        if tokio::fs::try_exists(local_path).await.unwrap_or(false) {
            return Ok(CacheOutcome::AlreadyCached);
        }

        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| AssetDownloadError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let bytes = self
            .retry
            .run_when("download_asset", is_transient, || {
                self.download(remote_ref, local_path)
            })
            .await?;

        debug!(url = remote_ref, path = %local_path.display(), bytes, "Asset downloaded");
        Ok(CacheOutcome::Downloaded { bytes })
    }
}

fn is_transient(err: &AssetDownloadError) -> bool {
    match err {
        AssetDownloadError::Network { .. } => true,
        AssetDownloadError::Status { status, .. } => *status >= 500 || *status == 429,
        AssetDownloadError::Io { .. } => false,
    }
}

/// `foo.png` → `foo.png.part`
fn part_path_for(local_path: &Path) -> PathBuf {
    let mut name = local_path
        .file_name()
        .map(OsString::from)
        .unwrap_or_default();
    name.push(".part");
    local_path.with_file_name(name)
}
