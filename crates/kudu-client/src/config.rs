// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Connector configuration for the Kudu client and schema emulation.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::client::{ClientError, ClientResult};

pub const MASTER_ADDRESSES: &str = "kudu.client.master-addresses";
pub const DEFAULT_ADMIN_OPERATION_TIMEOUT: &str = "kudu.client.default-admin-operation-timeout";
pub const DEFAULT_OPERATION_TIMEOUT: &str = "kudu.client.default-operation-timeout";
pub const DEFAULT_SOCKET_READ_TIMEOUT: &str = "kudu.client.default-socket-read-timeout";
pub const DISABLE_STATISTICS: &str = "kudu.client.disable-statistics";
pub const SCHEMA_EMULATION_ENABLED: &str = "kudu.schema-emulation.enabled";
pub const SCHEMA_EMULATION_PREFIX: &str = "kudu.schema-emulation.prefix";

/// Configuration for connecting to a Kudu cluster.
///
/// Deserializes from camelCase keys with humantime durations:
///
/// ```
/// # use kudu_client::KuduClientConfig;
/// let config: KuduClientConfig = serde_json::from_str(
///     r#"{ "masterAddresses": ["h1:7051"], "defaultOperationTimeout": "5s" }"#,
/// )
/// .unwrap();
/// assert_eq!(config.default_operation_timeout.as_secs(), 5);
/// assert!(!config.schema_emulation_enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KuduClientConfig {
    /// Master addresses as `host`, `host:port` or an absolute URL.
    #[serde(default)]
    pub master_addresses: Vec<String>,

    /// Timeout for admin operations (table metadata, partition changes).
    /// Default: 30 seconds
    #[serde(with = "humantime_serde", default = "default_admin_operation_timeout")]
    pub default_admin_operation_timeout: Duration,

    /// Timeout for user operations.
    /// Default: 30 seconds
    #[serde(with = "humantime_serde", default = "default_operation_timeout")]
    pub default_operation_timeout: Duration,

    /// Timeout for a single socket read.
    /// Default: 10 seconds
    #[serde(with = "humantime_serde", default = "default_socket_read_timeout")]
    pub default_socket_read_timeout: Duration,

    #[serde(default)]
    pub disable_statistics: bool,

    #[serde(default)]
    pub schema_emulation_enabled: bool,

    /// Prefix of every physical table name when schema emulation is enabled.
    #[serde(default)]
    pub schema_emulation_prefix: String,
}

fn default_admin_operation_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_operation_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_socket_read_timeout() -> Duration {
    Duration::from_secs(10)
}

impl Default for KuduClientConfig {
    fn default() -> Self {
        Self {
            master_addresses: Vec::new(),
            default_admin_operation_timeout: default_admin_operation_timeout(),
            default_operation_timeout: default_operation_timeout(),
            default_socket_read_timeout: default_socket_read_timeout(),
            disable_statistics: false,
            schema_emulation_enabled: false,
            schema_emulation_prefix: String::new(),
        }
    }
}

impl KuduClientConfig {
    pub fn new<I, S>(master_addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            master_addresses: master_addresses.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    pub fn with_admin_operation_timeout(mut self, timeout: Duration) -> Self {
        self.default_admin_operation_timeout = timeout;
        self
    }

    pub fn with_operation_timeout(mut self, timeout: Duration) -> Self {
        self.default_operation_timeout = timeout;
        self
    }

    pub fn with_socket_read_timeout(mut self, timeout: Duration) -> Self {
        self.default_socket_read_timeout = timeout;
        self
    }

    pub fn with_statistics_disabled(mut self, disabled: bool) -> Self {
        self.disable_statistics = disabled;
        self
    }

    /// Enable schema emulation with the given physical name prefix.
    pub fn with_schema_emulation(mut self, prefix: impl Into<String>) -> Self {
        self.schema_emulation_enabled = true;
        self.schema_emulation_prefix = prefix.into();
        self
    }

    /// Build a config from catalog properties (`kudu.client.*`,
    /// `kudu.schema-emulation.*`). Unknown keys are ignored.
    pub fn from_properties(properties: &HashMap<String, String>) -> ClientResult<Self> {
        let mut config = Self::default();
        for (key, value) in properties {
            let value = value.trim();
            match key.as_str() {
                MASTER_ADDRESSES => {
                    config.master_addresses = value
                        .split(',')
                        .map(str::trim)
                        .filter(|s| !s.is_empty())
                        .map(String::from)
                        .collect();
                }
                DEFAULT_ADMIN_OPERATION_TIMEOUT => {
                    config.default_admin_operation_timeout = parse_duration(key, value)?;
                }
                DEFAULT_OPERATION_TIMEOUT => {
                    config.default_operation_timeout = parse_duration(key, value)?;
                }
                DEFAULT_SOCKET_READ_TIMEOUT => {
                    config.default_socket_read_timeout = parse_duration(key, value)?;
                }
                DISABLE_STATISTICS => config.disable_statistics = parse_bool(key, value)?,
                SCHEMA_EMULATION_ENABLED => {
                    config.schema_emulation_enabled = parse_bool(key, value)?;
                }
                SCHEMA_EMULATION_PREFIX => config.schema_emulation_prefix = value.to_string(),
                other => tracing::warn!(property = other, "Ignoring unknown Kudu property"),
            }
        }
        Ok(config)
    }

    /// Check required fields and timeouts. No network activity.
    pub fn validate(&self) -> ClientResult<()> {
        if self.master_addresses.is_empty() {
            return Err(ClientError::InvalidConfig(
                "master addresses must not be empty".to_string(),
            ));
        }
        if self.master_addresses.iter().any(|a| a.trim().is_empty()) {
            return Err(ClientError::InvalidConfig(
                "master addresses must not contain blank entries".to_string(),
            ));
        }
        for (name, timeout) in [
            ("default admin operation timeout", self.default_admin_operation_timeout),
            ("default operation timeout", self.default_operation_timeout),
            ("default socket read timeout", self.default_socket_read_timeout),
        ] {
            if timeout.is_zero() {
                return Err(ClientError::InvalidConfig(format!(
                    "{} must be greater than zero",
                    name
                )));
            }
        }
        Ok(())
    }
}

fn parse_duration(key: &str, value: &str) -> ClientResult<Duration> {
    humantime_serde::re::humantime::parse_duration(value).map_err(|e| {
        ClientError::InvalidConfig(format!("invalid duration '{}' for {}: {}", value, key, e))
    })
}

fn parse_bool(key: &str, value: &str) -> ClientResult<bool> {
    value.to_ascii_lowercase().parse::<bool>().map_err(|_| {
        ClientError::InvalidConfig(format!("invalid boolean '{}' for {}", value, key))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = KuduClientConfig::default();
        assert!(config.master_addresses.is_empty());
        assert_eq!(config.default_admin_operation_timeout, Duration::from_secs(30));
        assert_eq!(config.default_operation_timeout, Duration::from_secs(30));
        assert_eq!(config.default_socket_read_timeout, Duration::from_secs(10));
        assert!(!config.disable_statistics);
        assert!(!config.schema_emulation_enabled);
        assert_eq!(config.schema_emulation_prefix, "");
    }

    #[test]
    fn test_validate_requires_masters() {
        let err = KuduClientConfig::default().validate().unwrap_err();
        assert!(err.to_string().contains("master addresses"));

        let err = KuduClientConfig::new(["h1:7051", " "]).validate().unwrap_err();
        assert!(err.to_string().contains("blank"));
    }

    #[test]
    fn test_validate_rejects_zero_timeouts() {
        let config = KuduClientConfig::new(["h1:7051"]).with_socket_read_timeout(Duration::ZERO);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ClientError::InvalidConfig(_)));
        assert!(err.to_string().contains("socket read timeout"));

        assert!(KuduClientConfig::new(["h1:7051"]).validate().is_ok());
    }

    #[test]
    fn test_deserialize_camel_case() {
        let config: KuduClientConfig = serde_json::from_value(serde_json::json!({
            "masterAddresses": ["h1:7051", "h2:7051"],
            "defaultAdminOperationTimeout": "1m",
            "defaultSocketReadTimeout": "500ms",
            "disableStatistics": true,
            "schemaEmulationEnabled": true,
            "schemaEmulationPrefix": "presto::"
        }))
        .unwrap();

        assert_eq!(config.master_addresses, vec!["h1:7051", "h2:7051"]);
        assert_eq!(config.default_admin_operation_timeout, Duration::from_secs(60));
        assert_eq!(config.default_operation_timeout, Duration::from_secs(30));
        assert_eq!(config.default_socket_read_timeout, Duration::from_millis(500));
        assert!(config.disable_statistics);
        assert!(config.schema_emulation_enabled);
        assert_eq!(config.schema_emulation_prefix, "presto::");
    }

    #[test]
    fn test_from_properties() {
        let properties: HashMap<String, String> = [
            (MASTER_ADDRESSES, "h1:7051, h2:7051,"),
            (DEFAULT_OPERATION_TIMEOUT, "45s"),
            (DISABLE_STATISTICS, "TRUE"),
            (SCHEMA_EMULATION_ENABLED, "true"),
            (SCHEMA_EMULATION_PREFIX, "presto::"),
            ("kudu.unrelated", "ignored"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        let config = KuduClientConfig::from_properties(&properties).unwrap();
        assert_eq!(config.master_addresses, vec!["h1:7051", "h2:7051"]);
        assert_eq!(config.default_operation_timeout, Duration::from_secs(45));
        assert!(config.disable_statistics);
        assert!(config.schema_emulation_enabled);
        assert_eq!(config.schema_emulation_prefix, "presto::");
    }

    #[test]
    fn test_from_properties_rejects_bad_values() {
        let properties: HashMap<String, String> =
            [(DEFAULT_SOCKET_READ_TIMEOUT.to_string(), "soon".to_string())].into();
        let err = KuduClientConfig::from_properties(&properties).unwrap_err();
        assert!(err.to_string().contains("invalid duration"));

        let properties: HashMap<String, String> =
            [(SCHEMA_EMULATION_ENABLED.to_string(), "yes".to_string())].into();
        let err = KuduClientConfig::from_properties(&properties).unwrap_err();
        assert!(err.to_string().contains("invalid boolean"));
    }
}
