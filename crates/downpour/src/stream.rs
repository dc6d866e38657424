use std::io;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use tokio::fs::File;
use tokio::io::{AsyncRead, AsyncReadExt, ReadBuf};

use crate::error::Result;
use crate::tee::TeeReader;

/// Type-erased origin body
pub type BoxReader = Box<dyn AsyncRead + Send + Unpin>;

/// Tee reader writing a live body into a temp file
pub type DownloadReader = TeeReader<BoxReader, File>;

/// Byte stream returned by a cache lookup.
///
/// Reading a `Download` stream to the end and calling [`CacheStream::close`]
/// is what materializes the cache entry; dropping it early abandons the
/// download and removes the partial temp file.
#[derive(Debug)]
pub enum CacheStream {
    /// Replays an existing cache entry
    Cached(File),
    /// Streams from the origin while copying into the cache
    Download(DownloadReader),
}

impl CacheStream {
    /// Open a stream over an existing cache entry
    pub async fn open_cached(path: &Path) -> Result<Self> {
        Ok(CacheStream::Cached(File::open(path).await?))
    }

    /// Whether the bytes come from the cache rather than the origin
    pub fn is_cached(&self) -> bool {
        matches!(self, CacheStream::Cached(_))
    }

    /// Finish the stream. For downloads this decides whether the entry is promoted.
    pub async fn close(&mut self) -> Result<()> {
        match self {
            CacheStream::Cached(_) => Ok(()),
            CacheStream::Download(reader) => reader.close().await,
        }
    }

    /// Read the whole stream, then close it
    pub async fn read_all(mut self) -> Result<Bytes> {
        let mut data = Vec::new();
        if let Err(e) = self.read_to_end(&mut data).await {
            // Still run the failure path; the read error is the one worth reporting
            let _ = self.close().await;
            return Err(e.into());
        }
        self.close().await?;
        Ok(Bytes::from(data))
    }
}

impl AsyncRead for CacheStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            CacheStream::Cached(file) => Pin::new(file).poll_read(cx, buf),
            CacheStream::Download(reader) => Pin::new(reader).poll_read(cx, buf),
        }
    }
}
