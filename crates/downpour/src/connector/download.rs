use std::path::Path;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, RequestBuilder, Response};
use tracing::{debug, instrument};
use url::Url;

use super::{UrlConnector, begin_download, is_http, open_local};
use crate::ConnectorConfig;
use crate::bytes_stream::BytesStreamReader;
use crate::client::create_client;
use crate::error::{CacheError, Result};
use crate::stream::CacheStream;

/// Connector that always fetches the body and replaces the cache entry
#[derive(Debug, Clone)]
pub struct DownloadConnector {
    client: Client,
    config: ConnectorConfig,
}

impl DownloadConnector {
    pub fn new() -> Result<Self> {
        Self::with_config(ConnectorConfig::default())
    }

    pub fn with_config(config: ConnectorConfig) -> Result<Self> {
        let client = create_client(&config)?;
        Ok(Self { client, config })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &ConnectorConfig {
        &self.config
    }

    /// Tee the body of a successful response into `temp`
    pub async fn download(
        &self,
        response: Response,
        temp: &Path,
        entry: &Path,
    ) -> Result<CacheStream> {
        if !response.status().is_success() {
            return Err(CacheError::Status {
                url: response.url().to_string(),
                status: response.status(),
            });
        }
        let expected_bytes = response.content_length();
        let body = BytesStreamReader::from_response(response);
        begin_download(Box::new(body), expected_bytes, temp, entry).await
    }

    /// Download a non-HTTP URL; only `file://` is understood
    pub(crate) async fn open_other(
        &self,
        url: &Url,
        temp: &Path,
        entry: &Path,
    ) -> Result<CacheStream> {
        if url.scheme() != "file" {
            return Err(CacheError::UnsupportedScheme(url.scheme().to_owned()));
        }
        let (body, expected_bytes) = open_local(url).await?;
        begin_download(body, expected_bytes, temp, entry).await
    }
}

#[async_trait]
impl UrlConnector for DownloadConnector {
    #[instrument(skip_all, fields(url = %url), level = "debug")]
    async fn open_url(&self, url: &Url, temp: &Path, entry: &Path) -> Result<CacheStream> {
        if !is_http(url) {
            return self.open_other(url, temp, entry).await;
        }

        let request = self.set_headers(self.client.get(url.clone()));
        let response = request.send().await?;
        self.on_connected(&response);

        debug!(status = %response.status(), "Origin responded, downloading");
        self.download(response, temp, entry).await
    }

    fn set_headers(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .headers(self.config.headers.clone())
            .header(USER_AGENT, self.config.user_agent.as_str())
    }
}
