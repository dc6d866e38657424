//! # Tee Reader
//!
//! An `AsyncRead` that copies every byte it hands out into a sink, used to
//! populate a cache entry while the caller consumes a live download.
//!
//! Completion is decided by [`TeeReader::close`]: the sink is flushed and
//! closed, then exactly one of the `on_finish` / `on_failure` callbacks runs.
//! A reader dropped without being closed counts as a failure.
//!
//! The reader is not meant to be shared between concurrent consumers.

use std::fmt;
use std::io;
use std::pin::Pin;
use std::task::{Context, Poll, ready};

use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt, ReadBuf};
use tracing::warn;

use crate::error::{CacheError, Result};

/// Bytes are handed to the sink in batches of at least this size
pub const BUFFER_CAPACITY: usize = 1024;

/// Completion callback run once by [`TeeReader::close`] or on drop
pub type Callback = Box<dyn FnOnce() -> io::Result<()> + Send>;

pub struct TeeReader<R, W> {
    source: Option<R>,
    sink: Option<W>,
    buffer: Vec<u8>,
    // Prefix of `buffer` already accepted by the sink
    written: usize,
    expected_bytes: Option<u64>,
    received_bytes: u64,
    // Copy of the first I/O error seen while reading or writing
    failure: Option<(io::ErrorKind, String)>,
    closed: bool,
    on_finish: Option<Callback>,
    on_failure: Option<Callback>,
}

impl<R, W> TeeReader<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(source: R, sink: W) -> Self {
        Self {
            source: Some(source),
            sink: Some(sink),
            buffer: Vec::with_capacity(BUFFER_CAPACITY),
            written: 0,
            expected_bytes: None,
            received_bytes: 0,
            failure: None,
            closed: false,
            on_finish: None,
            on_failure: None,
        }
    }

    /// Number of bytes the source is expected to deliver; `None` when unknown
    pub fn with_expected_bytes(mut self, expected_bytes: Option<u64>) -> Self {
        self.expected_bytes = expected_bytes;
        self
    }

    pub fn on_finish(mut self, callback: impl FnOnce() -> io::Result<()> + Send + 'static) -> Self {
        self.on_finish = Some(Box::new(callback));
        self
    }

    pub fn on_failure(
        mut self,
        callback: impl FnOnce() -> io::Result<()> + Send + 'static,
    ) -> Self {
        self.on_failure = Some(Box::new(callback));
        self
    }

    pub fn expected_bytes(&self) -> Option<u64> {
        self.expected_bytes
    }

    pub fn received_bytes(&self) -> u64 {
        self.received_bytes
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Flush buffered bytes, close both ends and run the completion callback.
    ///
    /// Succeeds only when no I/O error was observed and, if the expected
    /// byte count is known, exactly that many bytes were received. Calling
    /// `close` again after it settled is a no-op.
    ///
    /// If the returned future is dropped before it settles, the download
    /// counts as failed: a later `close` or the reader's drop runs
    /// `on_failure`.
    pub async fn close(&mut self) -> Result<()> {
        if self.closed {
            if !self.is_settled() {
                self.run_on_failure();
                return Err(io::Error::new(
                    io::ErrorKind::Interrupted,
                    "an earlier close was cancelled before completing",
                )
                .into());
            }
            return Ok(());
        }
        self.closed = true;

        // Dropping the source releases the origin connection
        self.source = None;

        if let Err(e) = self.flush_and_close_sink().await {
            self.record_failure(&e);
        }

        if let Some((kind, message)) = self.failure.take() {
            self.run_on_failure();
            return Err(io::Error::new(kind, message).into());
        }

        if let Some(expected) = self.expected_bytes {
            if expected != self.received_bytes {
                self.run_on_failure();
                return Err(CacheError::IncompleteDownload {
                    expected,
                    received: self.received_bytes,
                });
            }
        }

        self.on_failure = None;
        if let Some(on_finish) = self.on_finish.take() {
            if let Err(e) = on_finish() {
                warn!(error = %e, "Download completion callback failed");
                return Err(CacheError::from_io(e));
            }
        }
        Ok(())
    }

    async fn flush_and_close_sink(&mut self) -> io::Result<()> {
        let Some(mut sink) = self.sink.take() else {
            return Ok(());
        };
        let pending = &self.buffer[self.written..];
        if !pending.is_empty() {
            sink.write_all(pending).await?;
        }
        self.buffer.clear();
        self.written = 0;
        sink.flush().await?;
        sink.shutdown().await
    }

    fn poll_drain(&mut self, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        let Some(sink) = self.sink.as_mut() else {
            return Poll::Ready(Err(io::Error::other("tee sink already closed")));
        };
        while self.written < self.buffer.len() {
            let n = ready!(Pin::new(&mut *sink).poll_write(cx, &self.buffer[self.written..]))?;
            if n == 0 {
                return Poll::Ready(Err(io::ErrorKind::WriteZero.into()));
            }
            self.written += n;
        }
        self.buffer.clear();
        self.written = 0;
        Poll::Ready(Ok(()))
    }

    fn record_failure(&mut self, e: &io::Error) {
        if self.failure.is_none() {
            self.failure = Some((e.kind(), e.to_string()));
        }
    }
}

impl<R, W> TeeReader<R, W> {
    /// Whether the completion callback has already been decided
    fn is_settled(&self) -> bool {
        self.on_finish.is_none() && self.on_failure.is_none()
    }

    fn run_on_failure(&mut self) {
        self.on_finish = None;
        if let Some(on_failure) = self.on_failure.take() {
            if let Err(e) = on_failure() {
                warn!(error = %e, "Download failure callback failed");
            }
        }
    }
}

impl<R, W> AsyncRead for TeeReader<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();

        if this.buffer.len() >= BUFFER_CAPACITY {
            if let Err(e) = ready!(this.poll_drain(cx)) {
                this.record_failure(&e);
                return Poll::Ready(Err(e));
            }
        }

        let Some(source) = this.source.as_mut() else {
            return Poll::Ready(Err(io::Error::other("read from a closed tee reader")));
        };

        let filled_before = buf.filled().len();
        match Pin::new(source).poll_read(cx, buf) {
            Poll::Ready(Ok(())) => {
                let fresh = &buf.filled()[filled_before..];
                this.received_bytes += fresh.len() as u64;
                this.buffer.extend_from_slice(fresh);
                Poll::Ready(Ok(()))
            }
            Poll::Ready(Err(e)) => {
                this.record_failure(&e);
                Poll::Ready(Err(e))
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl<R, W> Drop for TeeReader<R, W> {
    fn drop(&mut self) {
        if !self.is_settled() {
            warn!(
                received = self.received_bytes,
                expected = ?self.expected_bytes,
                closing = self.closed,
                "Tee reader dropped before close completed, abandoning download"
            );
            self.run_on_failure();
        }
    }
}

impl<R, W> fmt::Debug for TeeReader<R, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TeeReader")
            .field("expected_bytes", &self.expected_bytes)
            .field("received_bytes", &self.received_bytes)
            .field("buffered", &(self.buffer.len() - self.written))
            .field("closed", &self.closed)
            .finish()
    }
}
