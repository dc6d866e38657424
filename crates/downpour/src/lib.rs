//! # Downpour
//!
//! A directory-backed cache for resources fetched by URL.
//!
//! Every lookup hands back a stream of the resource body. Online, the origin
//! is asked whether the cached copy is still current; a fresh body is written
//! to disk as the caller reads it and only becomes the cache entry once the
//! download completed. Offline, entries are served straight from disk.
//!
//! ## Features
//!
//! - Stable, filesystem-safe entry names derived from URLs
//! - Conditional revalidation with `If-Modified-Since` and `Last-Modified`
//! - Atomic promotion of completed downloads
//! - Offline mode and age-based cleanup
//!
//! ```no_run
//! # async fn run() -> downpour::Result<()> {
//! use downpour::DownpourCache;
//! use url::Url;
//!
//! let cache = DownpourCache::new("/tmp/downpour").await?;
//! let url = Url::parse("https://example.com/pom.xml").expect("valid url");
//! let body = cache.get(&url).await?.read_all().await?;
//! println!("{} bytes", body.len());
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod bytes_stream;
pub mod cache;
pub mod client;
pub mod config;
pub mod connector;
pub mod error;
pub mod stream;
pub mod tee;

#[cfg(test)]
mod test_origin;

pub use builder::ConnectorConfigBuilder;
pub use cache::{CacheKey, DownpourCache, SweepReport};
pub use client::create_client;
pub use config::{CacheConfig, ConnectorConfig};
pub use connector::{DefaultConnector, DownloadConnector, UrlConnector};
pub use error::{CacheError, Result};
pub use stream::CacheStream;
pub use tee::TeeReader;
