//! # Cache Engine
//!
//! Public entry point binding a cache root, its configuration and a
//! connector together.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tokio::fs;
use tracing::{debug, instrument};
use url::Url;

use crate::CacheConfig;
use crate::cache::CacheLayout;
use crate::cache::sweep::{SweepReport, sweep};
use crate::connector::{DefaultConnector, UrlConnector};
use crate::error::{CacheError, Result};
use crate::stream::CacheStream;

/// Directory-backed cache of URL bodies.
///
/// Online, every lookup is revalidated with the origin through the engine's
/// connector and the entry is refreshed as the returned stream is read.
/// Offline, lookups are served from disk only.
///
/// Only one engine should use a cache root at a time; nothing on disk is
/// locked. Call [`DownpourCache::cleanup`] when no download is in flight.
pub struct DownpourCache {
    layout: CacheLayout,
    config: CacheConfig,
    connector: Arc<dyn UrlConnector>,
}

impl DownpourCache {
    /// Open a cache rooted at `root` with the default configuration
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        Self::with_config(root, CacheConfig::default()).await
    }

    pub async fn with_config(root: impl Into<PathBuf>, config: CacheConfig) -> Result<Self> {
        let layout = CacheLayout::open(root, config.suffix.clone()).await?;
        let connector = Arc::new(DefaultConnector::new()?);
        debug!(root = ?layout.root(), offline = config.offline_mode, "Opened cache");
        Ok(Self {
            layout,
            config,
            connector,
        })
    }

    /// Replace the connector used by [`DownpourCache::get`]
    pub fn with_connector(mut self, connector: Arc<dyn UrlConnector>) -> Self {
        self.connector = connector;
        self
    }

    /// Stream the body of `url` using the engine's connector
    pub async fn get(&self, url: &Url) -> Result<CacheStream> {
        self.get_with(url, self.connector.as_ref()).await
    }

    pub async fn get_with(&self, url: &Url, connector: &dyn UrlConnector) -> Result<CacheStream> {
        self.get_with_force(url, connector, false).await
    }

    /// Stream the body of `url`.
    ///
    /// Offline, the cache entry is opened directly and a missing entry fails
    /// with [`CacheError::NoCacheEntry`]. Online, the connector decides
    /// between replaying the entry and downloading a fresh copy. `force` is
    /// accepted for interface stability; online lookups always consult the
    /// origin already.
    #[instrument(skip_all, fields(url = %url, force = force), level = "debug")]
    pub async fn get_with_force(
        &self,
        url: &Url,
        connector: &dyn UrlConnector,
        force: bool,
    ) -> Result<CacheStream> {
        let entry = self.layout.entry_path(url);

        if self.config.offline_mode {
            return match fs::File::open(&entry).await {
                Ok(file) => {
                    debug!(entry = ?entry, "Serving cache entry offline");
                    Ok(CacheStream::Cached(file))
                }
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                    Err(CacheError::NoCacheEntry { path: entry })
                }
                Err(e) => Err(e.into()),
            };
        }

        let temp = self.layout.temp_path(url);
        connector.open_url(url, &temp, &entry).await
    }

    /// Delete entries older than the maximum age and purge `temp/`.
    ///
    /// Does nothing in offline mode so that entries survive long offline periods.
    pub async fn cleanup(&self) -> Result<SweepReport> {
        if self.config.offline_mode {
            debug!("Offline mode, skipping cache sweep");
            return Ok(SweepReport::default());
        }
        sweep(&self.layout, self.config.max_age).await
    }

    pub fn set_offline_mode(&mut self, offline_mode: bool) {
        self.config.offline_mode = offline_mode;
    }

    pub fn is_offline_mode(&self) -> bool {
        self.config.offline_mode
    }

    pub fn set_max_age(&mut self, max_age: Duration) {
        self.config.max_age = max_age;
    }

    pub fn max_age(&self) -> Duration {
        self.config.max_age
    }

    /// Path of the cache entry for `url`, whether or not it exists
    pub fn cached_file(&self, url: &Url) -> PathBuf {
        self.layout.entry_path(url)
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        self.layout.root()
    }

    pub fn temp_dir(&self) -> &Path {
        self.layout.temp_dir()
    }

    pub fn suffix(&self) -> &str {
        self.layout.suffix()
    }
}
