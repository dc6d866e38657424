use std::time::Duration;

use reqwest::header::HeaderMap;

/// Suffix appended to every cache file name
pub const DEFAULT_CACHE_SUFFIX: &str = ".fjcache";

/// Entries older than this are removed by the sweep
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(60 * 60 * 24 * 7);

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 6.1; WOW64) AppleWebKit/535.19 (KHTML, like Gecko) Chrome/18.0.1025.162 Safari/535.19";

/// Configuration owned by a single cache engine
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// When set, every lookup is served from disk and never touches the network
    pub offline_mode: bool,

    /// Maximum age of a cache entry before `cleanup` deletes it
    pub max_age: Duration,

    /// File name suffix identifying cache entries inside the root
    pub suffix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            offline_mode: false,
            max_age: DEFAULT_MAX_AGE,
            suffix: DEFAULT_CACHE_SUFFIX.to_owned(),
        }
    }
}

/// Request options applied by the bundled connectors
#[derive(Debug, Clone)]
pub struct ConnectorConfig {
    /// Connection timeout (time to establish initial connection)
    pub connect_timeout: Duration,

    /// Read timeout (maximum time between receiving data chunks)
    pub read_timeout: Duration,

    /// User agent string sent with every request
    pub user_agent: String,

    /// Extra HTTP headers for requests
    pub headers: HeaderMap,
}

impl Default for ConnectorConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(5),
            read_timeout: Duration::from_secs(5),
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            headers: HeaderMap::new(),
        }
    }
}

impl ConnectorConfig {
    pub fn builder() -> crate::builder::ConnectorConfigBuilder {
        crate::builder::ConnectorConfigBuilder::new()
    }
}
