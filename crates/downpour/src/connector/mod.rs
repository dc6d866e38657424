//! # Connectors
//!
//! A connector turns a URL into a [`CacheStream`], deciding whether the
//! existing cache entry can be replayed or the body has to be downloaded
//! again. Two implementations are provided:
//!
//! - [`DownloadConnector`] always downloads and replaces the entry.
//! - [`DefaultConnector`] revalidates against the origin with
//!   `If-Modified-Since` and falls back to a download only when the
//!   resource changed.

mod conditional;
mod download;
pub mod http_date;

pub use conditional::DefaultConnector;
pub use download::DownloadConnector;

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response};
use tokio::fs::File;
use tracing::{debug, warn};
use url::Url;

use crate::error::{CacheError, Result};
use crate::stream::{BoxReader, CacheStream};
use crate::tee::TeeReader;

/// Opens a URL and returns a stream over its body, keeping `entry` up to date
#[async_trait]
pub trait UrlConnector: Send + Sync {
    /// Open `url`. A download is written to `temp` and promoted to `entry`
    /// once the returned stream has been read and closed successfully.
    async fn open_url(&self, url: &Url, temp: &Path, entry: &Path) -> Result<CacheStream>;

    /// Called before the request is sent; override to add headers
    fn set_headers(&self, request: RequestBuilder) -> RequestBuilder;

    /// Called once the response headers have arrived
    fn on_connected(&self, _response: &Response) {}
}

pub(crate) fn is_http(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}

/// Start teeing `body` into `temp`, promoting it to `entry` on a clean close
pub(crate) async fn begin_download(
    body: BoxReader,
    expected_bytes: Option<u64>,
    temp: &Path,
    entry: &Path,
) -> Result<CacheStream> {
    let sink = File::create(temp).await?;
    debug!(temp = ?temp, expected_bytes = ?expected_bytes, "Downloading into temp file");

    let finish_temp = temp.to_path_buf();
    let finish_entry = entry.to_path_buf();
    let failure_temp = temp.to_path_buf();

    let reader = TeeReader::new(body, sink)
        .with_expected_bytes(expected_bytes)
        .on_finish(move || promote(&finish_temp, &finish_entry))
        .on_failure(move || discard(&failure_temp));

    Ok(CacheStream::Download(reader))
}

/// Move a finished download over the cache entry.
///
/// `rename` replaces an existing destination atomically, so readers see
/// either the previous entry or the new one.
fn promote(temp: &Path, entry: &Path) -> io::Result<()> {
    match std::fs::rename(temp, entry) {
        Ok(()) => {
            debug!(entry = ?entry, "Promoted download to cache entry");
            Ok(())
        }
        Err(e) => {
            warn!(from = ?temp, to = ?entry, error = %e, "Failed to promote download");
            let _ = std::fs::remove_file(temp);
            Err(io::Error::new(
                e.kind(),
                CacheError::Promotion {
                    from: temp.to_path_buf(),
                    to: entry.to_path_buf(),
                    source: e,
                },
            ))
        }
    }
}

fn discard(temp: &Path) -> io::Result<()> {
    debug!(temp = ?temp, "Discarding incomplete download");
    match std::fs::remove_file(temp) {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Open a `file://` URL as a download source
pub(crate) async fn open_local(url: &Url) -> Result<(BoxReader, Option<u64>)> {
    let path: PathBuf = url
        .to_file_path()
        .map_err(|_| CacheError::UnsupportedScheme(url.to_string()))?;
    let file = File::open(&path).await?;
    let len = file.metadata().await?.len();
    Ok((Box::new(file), Some(len)))
}
