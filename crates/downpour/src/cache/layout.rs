//! # Cache Layout
//!
//! On-disk structure of a cache root:
//!
//! ```text
//! <root>/
//!   <key><suffix>        one complete entry per cached URL
//!   temp/
//!     <key><suffix>      in-progress downloads, never read back
//! ```

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;
use url::Url;

use crate::cache::CacheKey;
use crate::error::{CacheError, Result};

pub const TEMP_DIR_NAME: &str = "temp";

#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
    temp_dir: PathBuf,
    suffix: String,
}

impl CacheLayout {
    /// Bind to `root`, creating it and its `temp/` directory when missing.
    ///
    /// Fails with [`CacheError::NotADirectory`] when `root` is a regular file.
    pub async fn open(root: impl Into<PathBuf>, suffix: impl Into<String>) -> Result<Self> {
        let root = root.into();

        match fs::metadata(&root).await {
            Ok(meta) if !meta.is_dir() => return Err(CacheError::NotADirectory { path: root }),
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = ?root, "Creating cache root");
                fs::create_dir_all(&root).await?;
            }
            Err(e) => return Err(e.into()),
        }

        let temp_dir = root.join(TEMP_DIR_NAME);
        fs::create_dir_all(&temp_dir).await?;

        Ok(Self {
            root,
            temp_dir,
            suffix: suffix.into(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn temp_dir(&self) -> &Path {
        &self.temp_dir
    }

    pub fn suffix(&self) -> &str {
        &self.suffix
    }

    /// Path of the complete cache entry for `url`
    pub fn entry_path(&self, url: &Url) -> PathBuf {
        self.root.join(CacheKey::for_url(url).file_name(&self.suffix))
    }

    /// Path the download of `url` is written to before promotion
    pub fn temp_path(&self, url: &Url) -> PathBuf {
        self.temp_dir.join(CacheKey::for_url(url).file_name(&self.suffix))
    }

    /// Whether a file name directly under the root names a cache entry
    pub fn is_entry_name(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.suffix)
    }
}
