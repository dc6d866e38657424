use std::io;
use std::path::Path;
use std::time::SystemTime;

use async_trait::async_trait;
use reqwest::header::{IF_MODIFIED_SINCE, LAST_MODIFIED};
use reqwest::{RequestBuilder, Response, StatusCode};
use tokio::fs;
use tracing::{debug, instrument};
use url::Url;

use super::http_date::{format_http_date, parse_http_date};
use super::{DownloadConnector, UrlConnector, is_http};
use crate::ConnectorConfig;
use crate::error::Result;
use crate::stream::CacheStream;

/// Connector that revalidates the cache entry before downloading.
///
/// When an entry exists its modification time is sent as
/// `If-Modified-Since`. The entry is replayed if the origin answers
/// `304 Not Modified`, or answers successfully with a `Last-Modified` that is
/// not newer than the entry. Otherwise the body is downloaded and replaces
/// the entry.
#[derive(Debug, Clone)]
pub struct DefaultConnector {
    inner: DownloadConnector,
}

impl DefaultConnector {
    pub fn new() -> Result<Self> {
        Ok(Self {
            inner: DownloadConnector::new()?,
        })
    }

    pub fn with_config(config: ConnectorConfig) -> Result<Self> {
        Ok(Self {
            inner: DownloadConnector::with_config(config)?,
        })
    }

    pub fn from_download_connector(inner: DownloadConnector) -> Self {
        Self { inner }
    }

    pub fn config(&self) -> &ConnectorConfig {
        self.inner.config()
    }
}

/// Modification time of the cache entry, if there is one
async fn entry_modified(entry: &Path) -> Result<Option<SystemTime>> {
    match fs::metadata(entry).await {
        Ok(meta) => Ok(Some(meta.modified()?)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// `Last-Modified` of the response; unparseable values count as absent
fn last_modified(response: &Response) -> Option<SystemTime> {
    response
        .headers()
        .get(LAST_MODIFIED)
        .and_then(|v| v.to_str().ok())
        .and_then(parse_http_date)
}

#[async_trait]
impl UrlConnector for DefaultConnector {
    #[instrument(skip_all, fields(url = %url), level = "debug")]
    async fn open_url(&self, url: &Url, temp: &Path, entry: &Path) -> Result<CacheStream> {
        if !is_http(url) {
            return self.inner.open_other(url, temp, entry).await;
        }

        let modified = entry_modified(entry).await?;

        let mut request = self.set_headers(self.inner.client().get(url.clone()));
        if let Some(modified) = modified {
            request = request.header(IF_MODIFIED_SINCE, format_http_date(modified));
        }

        let response = request.send().await?;
        self.on_connected(&response);

        let Some(modified) = modified else {
            debug!(status = %response.status(), "No cache entry, downloading");
            return self.inner.download(response, temp, entry).await;
        };

        if response.status() == StatusCode::NOT_MODIFIED {
            debug!("Origin reports not modified, replaying cache entry");
            drop(response);
            return CacheStream::open_cached(entry).await;
        }

        if response.status().is_success() {
            if let Some(server_modified) = last_modified(&response) {
                if server_modified <= modified {
                    debug!("Origin copy is not newer than cache entry, replaying it");
                    drop(response);
                    return CacheStream::open_cached(entry).await;
                }
            }
        }

        debug!(status = %response.status(), "Cache entry is stale, downloading");
        self.inner.download(response, temp, entry).await
    }

    fn set_headers(&self, request: RequestBuilder) -> RequestBuilder {
        self.inner.set_headers(request)
    }
}
