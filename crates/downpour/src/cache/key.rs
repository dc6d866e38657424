//! # Cache Keys
//!
//! Maps URLs to file-name-safe identifiers.

use std::fmt;

use sha2::{Digest, Sha256};
use url::Url;

/// File-name-safe identifier derived from a URL.
///
/// Every character of the URL text that is not an ASCII letter becomes `-`,
/// then `-` and a hash of the full URL text are appended so that URLs which
/// collapse to the same skeleton stay distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn for_url(url: &Url) -> Self {
        Self::for_str(url.as_str())
    }

    pub fn for_str(url: &str) -> Self {
        let skeleton: String = url
            .chars()
            .map(|c| if c.is_ascii_alphabetic() { c } else { '-' })
            .collect();
        Self(format!("{skeleton}-{}", url_hash(url)))
    }

    /// File name of the entry for this key
    pub fn file_name(&self, suffix: &str) -> String {
        format!("{}{suffix}", self.0)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Stable across runs and toolchains, unlike `DefaultHasher`
fn url_hash(url: &str) -> u64 {
    let digest = Sha256::digest(url.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}
