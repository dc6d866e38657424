use reqwest::Client;
use tracing::debug;

use crate::ConnectorConfig;
use crate::error::Result;

/// Create a reqwest Client with the provided configuration.
///
/// Timeouts live on the client; there is deliberately no overall request
/// timeout so that large bodies can stream for as long as data keeps arriving.
pub fn create_client(config: &ConnectorConfig) -> Result<Client> {
    let mut client_builder = Client::builder().pool_max_idle_per_host(5);

    if !config.connect_timeout.is_zero() {
        client_builder = client_builder.connect_timeout(config.connect_timeout);
    }

    if !config.read_timeout.is_zero() {
        client_builder = client_builder.read_timeout(config.read_timeout);
    }

    debug!(
        connect_timeout = ?config.connect_timeout,
        read_timeout = ?config.read_timeout,
        "Building HTTP client"
    );

    Ok(client_builder.build()?)
}
