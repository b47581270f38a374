use async_trait::async_trait;
use chrono::Duration;
use futures_util::stream::{self, StreamExt};
use sha1::{Digest, Sha1};
use sha2::Sha512;
use tokio::sync::Mutex;
use tracing::debug;

use crate::core::cancel::CancelToken;
use crate::core::error::{BuilderError, BuilderResult};

use super::cache::AssetCache;

const DEFAULT_CACHE_TTL_MINUTES: i64 = 10;

/// A single file destined for the output archive, with optional hashes for
/// validation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DownloadItem {
    pub url: String,
    pub filename: String,
    /// Archive folder, `""` for the root.
    pub folder: String,
    pub size: Option<u64>,
    pub sha1: Option<String>,
    pub sha512: Option<String>,
}

/// Anything that can turn a URL into bytes. The production implementation
/// is [`Downloader`]; tests substitute an in-memory map.
#[async_trait]
pub trait AssetSource: Send + Sync {
    async fn fetch(&self, url: &str) -> BuilderResult<Vec<u8>>;
}

/// Cached HTTP fetcher for build assets.
pub struct Downloader {
    client: reqwest::Client,
    cache: Mutex<AssetCache>,
}

impl Downloader {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_ttl(client, Duration::minutes(DEFAULT_CACHE_TTL_MINUTES))
    }

    pub fn with_ttl(client: reqwest::Client, ttl: Duration) -> Self {
        Self {
            client,
            cache: Mutex::new(AssetCache::new(ttl)),
        }
    }

    /// Fetch a URL, serving from the TTL cache when possible.
    pub async fn fetch_bytes(&self, url: &str) -> BuilderResult<Vec<u8>> {
        if let Some(bytes) = self.cache.lock().await.get(url) {
            debug!("Cache hit for {}", url);
            return Ok(bytes);
        }

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(BuilderError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await?.to_vec();
        debug!("Downloaded {} ({} bytes)", url, bytes.len());
        self.cache.lock().await.insert(url, bytes.clone());
        Ok(bytes)
    }

    /// Drop every cached payload.
    pub async fn invalidate_cache(&self) {
        self.cache.lock().await.clear();
    }
}

#[async_trait]
impl AssetSource for Downloader {
    async fn fetch(&self, url: &str) -> BuilderResult<Vec<u8>> {
        self.fetch_bytes(url).await
    }
}

/// Validate a payload against whichever digests the metadata supplied.
pub fn verify_hashes(
    url: &str,
    bytes: &[u8],
    sha1_expected: Option<&str>,
    sha512_expected: Option<&str>,
) -> BuilderResult<()> {
    if let Some(expected) = sha1_expected {
        let actual = hex::encode(Sha1::digest(bytes));
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(BuilderError::HashMismatch {
                url: url.to_string(),
                algorithm: "SHA-1",
                expected: expected.to_string(),
                actual,
            });
        }
    }
    if let Some(expected) = sha512_expected {
        let actual = hex::encode(Sha512::digest(bytes));
        if !actual.eq_ignore_ascii_case(expected) {
            return Err(BuilderError::HashMismatch {
                url: url.to_string(),
                algorithm: "SHA-512",
                expected: expected.to_string(),
                actual,
            });
        }
    }
    Ok(())
}

/// Bounded task queue over the download list.
///
/// Concurrency defaults to 1: sequential fetches keep progress accounting
/// trivial and avoid hammering third-party hosts. Raising it keeps the
/// contract: results and progress callbacks stay in item order, so the
/// completed count is monotonic and ends at the total.
pub struct DownloadQueue {
    concurrency: usize,
}

impl DownloadQueue {
    pub fn new() -> Self {
        Self { concurrency: 1 }
    }

    pub fn with_concurrency(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Fetch every item, reporting `(filename, completed, total)` after
    /// each. Returns the payloads in item order.
    pub async fn run<F>(
        &self,
        source: &dyn AssetSource,
        items: &[DownloadItem],
        cancel: &CancelToken,
        mut on_progress: F,
    ) -> BuilderResult<Vec<Vec<u8>>>
    where
        F: FnMut(&str, usize, usize),
    {
        let total = items.len();
        let mut payloads = Vec::with_capacity(total);

        let mut pending = stream::iter(items.iter().map(|item| async move {
            let bytes = source.fetch(&item.url).await?;
            verify_hashes(
                &item.url,
                &bytes,
                item.sha1.as_deref(),
                item.sha512.as_deref(),
            )?;
            Ok::<Vec<u8>, BuilderError>(bytes)
        }))
        .buffered(self.concurrency);

        let mut completed = 0usize;
        while let Some(result) = pending.next().await {
            if cancel.is_cancelled() {
                return Err(BuilderError::Cancelled);
            }
            payloads.push(result?);
            completed += 1;
            on_progress(&items[completed - 1].filename, completed, total);
        }

        Ok(payloads)
    }
}

impl Default for DownloadQueue {
    fn default() -> Self {
        Self::new()
    }
}
