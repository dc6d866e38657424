use std::path::PathBuf;

use reqwest::StatusCode;

/// Errors produced by the cache engine and its connectors
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// Offline mode and no cache entry exists for the requested URL
    #[error("Cache file does not contain expected content: [{}]", path.display())]
    NoCacheEntry { path: PathBuf },

    #[error("Cache root must be a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server returned status code {status} for {url}")]
    Status { url: String, status: StatusCode },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File was not completely downloaded! Expected={expected} actual={received}")]
    IncompleteDownload { expected: u64, received: u64 },

    #[error("Failed to promote {} to {}: {source}", from.display(), to.display())]
    Promotion {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

impl CacheError {
    /// Whether this is an offline miss, which callers usually surface to the user
    pub fn is_no_cache_entry(&self) -> bool {
        matches!(self, CacheError::NoCacheEntry { .. })
    }

    /// Recover a `CacheError` that travelled inside an `io::Error`
    pub(crate) fn from_io(e: std::io::Error) -> Self {
        if !e.get_ref().is_some_and(|inner| inner.is::<CacheError>()) {
            return CacheError::Io(e);
        }
        let kind = e.kind();
        match e.into_inner().map(|inner| inner.downcast::<CacheError>()) {
            Some(Ok(err)) => *err,
            Some(Err(other)) => CacheError::Io(std::io::Error::new(kind, other)),
            None => CacheError::Io(kind.into()),
        }
    }
}

pub type Result<T, E = CacheError> = std::result::Result<T, E>;
