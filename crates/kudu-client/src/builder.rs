// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Client builder and the factory that turns a [`KuduClientConfig`] into a
//! live [`StorageClient`] handle.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use url::Url;

use crate::client::{ClientError, ClientResult, StorageClient};
use crate::config::KuduClientConfig;
use crate::http_client::HttpStorageClient;

/// Port used when a master address carries no explicit port.
pub const DEFAULT_MASTER_PORT: u16 = 7051;

/// Builder for [`HttpStorageClient`], with timeouts expressed in milliseconds.
#[derive(Debug, Clone)]
pub struct StorageClientBuilder {
    master_addresses: Vec<String>,
    admin_operation_timeout_ms: u64,
    operation_timeout_ms: u64,
    socket_read_timeout_ms: u64,
    statistics_enabled: bool,
}

impl StorageClientBuilder {
    pub fn new(master_addresses: Vec<String>) -> Self {
        Self {
            master_addresses,
            admin_operation_timeout_ms: 30_000,
            operation_timeout_ms: 30_000,
            socket_read_timeout_ms: 10_000,
            statistics_enabled: true,
        }
    }

    pub fn default_admin_operation_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.admin_operation_timeout_ms = timeout_ms;
        self
    }

    pub fn default_operation_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.operation_timeout_ms = timeout_ms;
        self
    }

    pub fn default_socket_read_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.socket_read_timeout_ms = timeout_ms;
        self
    }

    /// Turn off statistics collection. Must be set before [`Self::build`].
    pub fn disable_statistics(mut self) -> Self {
        self.statistics_enabled = false;
        self
    }

    pub fn statistics_enabled(&self) -> bool {
        self.statistics_enabled
    }

    pub fn admin_operation_timeout(&self) -> Duration {
        Duration::from_millis(self.admin_operation_timeout_ms)
    }

    pub fn operation_timeout(&self) -> Duration {
        Duration::from_millis(self.operation_timeout_ms)
    }

    pub fn socket_read_timeout(&self) -> Duration {
        Duration::from_millis(self.socket_read_timeout_ms)
    }

    /// Translate a validated config into builder settings.
    ///
    /// Durations that round down to zero milliseconds are rejected here, so
    /// a config error never reaches the network.
    pub fn from_config(config: &KuduClientConfig) -> ClientResult<Self> {
        config.validate()?;

        let mut builder = Self::new(config.master_addresses.clone())
            .default_admin_operation_timeout_ms(to_millis(
                "default admin operation timeout",
                config.default_admin_operation_timeout,
            )?)
            .default_operation_timeout_ms(to_millis(
                "default operation timeout",
                config.default_operation_timeout,
            )?)
            .default_socket_read_timeout_ms(to_millis(
                "default socket read timeout",
                config.default_socket_read_timeout,
            )?);
        if config.disable_statistics {
            builder = builder.disable_statistics();
        }
        Ok(builder)
    }

    /// Parse the master addresses, then connect to the first master that
    /// answers the health probe.
    pub async fn build(self) -> ClientResult<HttpStorageClient> {
        let masters = self
            .master_addresses
            .iter()
            .map(|address| parse_master_address(address))
            .collect::<ClientResult<Vec<_>>>()?;
        if masters.is_empty() {
            return Err(ClientError::InvalidConfig(
                "master addresses must not be empty".to_string(),
            ));
        }

        let http = reqwest::Client::builder()
            .timeout(self.operation_timeout())
            .read_timeout(self.socket_read_timeout())
            .connect_timeout(self.admin_operation_timeout())
            .build()
            .map_err(|e| {
                ClientError::ConnectionError(format!("Failed to build HTTP client: {}", e))
            })?;

        HttpStorageClient::connect(http, masters, &self).await
    }
}

fn to_millis(name: &str, duration: Duration) -> ClientResult<u64> {
    let millis = u64::try_from(duration.as_millis()).unwrap_or(u64::MAX);
    if millis == 0 {
        return Err(ClientError::InvalidConfig(format!(
            "{} must be at least one millisecond",
            name
        )));
    }
    Ok(millis)
}

/// Parse `host`, `host:port` or an absolute `http(s)://` URL.
pub fn parse_master_address(address: &str) -> ClientResult<Url> {
    let address = address.trim();
    let has_scheme = address.contains("://");
    let candidate = if has_scheme {
        address.to_string()
    } else {
        format!("http://{}", address)
    };

    let mut url = Url::parse(&candidate).map_err(|e| {
        ClientError::ConnectionError(format!("Malformed master address '{}': {}", address, e))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::ConnectionError(format!(
            "Unsupported scheme in master address '{}'",
            address
        )));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(ClientError::ConnectionError(format!(
            "Master address '{}' has no host",
            address
        )));
    }
    if !has_scheme && url.port().is_none() {
        url.set_port(Some(DEFAULT_MASTER_PORT)).map_err(|_| {
            ClientError::ConnectionError(format!(
                "Cannot set default port on master address '{}'",
                address
            ))
        })?;
    }
    Ok(url)
}

/// Builds the single client handle of a connector instance.
#[async_trait]
pub trait StorageClientFactory: Send + Sync {
    async fn build(&self, config: &KuduClientConfig) -> ClientResult<Arc<dyn StorageClient>>;
}

/// Factory for the bundled HTTP client.
#[derive(Debug, Clone, Copy, Default)]
pub struct HttpClientFactory;

#[async_trait]
impl StorageClientFactory for HttpClientFactory {
    async fn build(&self, config: &KuduClientConfig) -> ClientResult<Arc<dyn StorageClient>> {
        let builder = StorageClientBuilder::from_config(config)?;
        let client = builder.build().await?;
        Ok(Arc::new(client))
    }
}
