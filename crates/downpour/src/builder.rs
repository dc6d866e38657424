//! # Builder for ConnectorConfig
//!
//! Fluent construction of the request options used by the bundled connectors.
//!
//! # Example
//!
//! ```
//! use std::time::Duration;
//! use downpour::ConnectorConfig;
//!
//! let config = ConnectorConfig::builder()
//!     .with_connect_timeout(Duration::from_secs(10))
//!     .with_user_agent("MyApp/1.0")
//!     .with_header("X-Api-Key", "my-secret-key")
//!     .build();
//!
//! assert_eq!(config.user_agent, "MyApp/1.0");
//! ```

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::ConnectorConfig;

/// Builder for creating ConnectorConfig instances with a fluent API
#[derive(Debug, Clone)]
pub struct ConnectorConfigBuilder {
    config: ConnectorConfig,
}

impl ConnectorConfigBuilder {
    /// Create a new builder with default configuration
    pub fn new() -> Self {
        Self {
            config: ConnectorConfig::default(),
        }
    }

    /// Set the connection timeout
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the read timeout (maximum time between receiving data chunks)
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.config.read_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Add a custom HTTP header. Invalid names or values are ignored.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.as_ref().parse::<HeaderName>(),
            HeaderValue::from_str(value.as_ref()),
        ) {
            self.config.headers.insert(name, value);
        }
        self
    }

    /// Set all extra HTTP headers, replacing any existing ones
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.config.headers = headers;
        self
    }

    pub fn build(self) -> ConnectorConfig {
        self.config
    }
}

impl Default for ConnectorConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_USER_AGENT;

    #[test]
    fn test_builder_defaults() {
        let config = ConnectorConfigBuilder::new().build();
        assert_eq!(config.connect_timeout, Duration::from_secs(5));
        assert_eq!(config.read_timeout, Duration::from_secs(5));
        assert_eq!(config.user_agent, DEFAULT_USER_AGENT);
        assert!(config.headers.is_empty());
    }

    #[test]
    fn test_builder_customization() {
        let config = ConnectorConfigBuilder::new()
            .with_connect_timeout(Duration::from_secs(20))
            .with_read_timeout(Duration::from_secs(30))
            .with_user_agent("CustomUserAgent/1.0")
            .with_header("X-Custom-Header", "CustomValue")
            .build();

        assert_eq!(config.connect_timeout, Duration::from_secs(20));
        assert_eq!(config.read_timeout, Duration::from_secs(30));
        assert_eq!(config.user_agent, "CustomUserAgent/1.0");

        let header_value = config.headers.get("X-Custom-Header").unwrap();
        assert_eq!(header_value.to_str().unwrap(), "CustomValue");
    }

    #[test]
    fn test_invalid_header_is_ignored() {
        let config = ConnectorConfigBuilder::new()
            .with_header("bad header", "value")
            .with_header("X-Ok", "line\nbreak")
            .build();
        assert!(config.headers.is_empty());
    }
}
