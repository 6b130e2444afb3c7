// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! The per-connector client session.
//!
//! A [`ClientSession`] bundles the connector id, the one storage client handle
//! of the connector, and the schema emulation strategy. It has no mutators:
//! changing the emulation policy means building a new connector.

use std::sync::Arc;

use kudu_client::{
    ClientError, HttpClientFactory, KuduClientConfig, StorageClient, StorageClientFactory,
};
use snafu::ResultExt;

use crate::error::{
    ConfigValidationSnafu, Result, SessionClosedSnafu, StorageConnectionSnafu, StorageSnafu,
};
use crate::schema_emulation::{select_strategy, SchemaEmulation, SchemaTableName};

/// Build a session against the cluster with the bundled HTTP client.
pub async fn create_session(
    connector_id: &str,
    config: &KuduClientConfig,
) -> Result<ClientSession> {
    ClientSession::create(connector_id, config, &HttpClientFactory).await
}

pub struct ClientSession {
    connector_id: String,
    client: Arc<dyn StorageClient>,
    strategy: SchemaEmulation,
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("connector_id", &self.connector_id)
            .field("client", &self.client.name())
            .field("strategy", &self.strategy)
            .finish()
    }
}

impl ClientSession {
    /// Assemble a session from parts that were already built.
    pub fn new(
        connector_id: impl Into<String>,
        client: Arc<dyn StorageClient>,
        strategy: SchemaEmulation,
    ) -> Self {
        Self {
            connector_id: connector_id.into(),
            client,
            strategy,
        }
    }

    /// Validate the config, build the client handle, then select the
    /// strategy.
    ///
    /// Config problems are reported as `ConfigValidation` before the factory
    /// is called. Client build failures are `StorageConnection` and are not
    /// retried here.
    pub async fn create(
        connector_id: &str,
        config: &KuduClientConfig,
        factory: &dyn StorageClientFactory,
    ) -> Result<Self> {
        if connector_id.trim().is_empty() {
            return ConfigValidationSnafu {
                message: "connector id must not be empty",
            }
            .fail();
        }
        if let Err(e) = config.validate() {
            return ConfigValidationSnafu {
                message: e.to_string(),
            }
            .fail();
        }

        let client = match factory.build(config).await {
            Ok(client) => client,
            Err(ClientError::InvalidConfig(message)) => {
                return ConfigValidationSnafu { message }.fail();
            }
            Err(e) => return Err(e).context(StorageConnectionSnafu),
        };
        let strategy = select_strategy(config);

        tracing::info!(
            connector_id,
            client = client.name(),
            schema_emulation = strategy.is_enabled(),
            "Created Kudu client session"
        );
        Ok(Self::new(connector_id, client, strategy))
    }

    pub fn connector_id(&self) -> &str {
        &self.connector_id
    }

    /// The storage client handle shared by every provider of this connector.
    pub fn client(&self) -> &Arc<dyn StorageClient> {
        &self.client
    }

    pub fn strategy(&self) -> &SchemaEmulation {
        &self.strategy
    }

    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }

    pub(crate) fn ensure_open(&self) -> Result<()> {
        if self.is_closed() {
            return SessionClosedSnafu {
                connector_id: self.connector_id.as_str(),
            }
            .fail();
        }
        Ok(())
    }

    pub fn to_physical_name(&self, name: &SchemaTableName) -> Result<String> {
        self.strategy.to_physical_name(&name.schema, &name.table)
    }

    pub fn to_logical_name(&self, physical_name: &str) -> Result<SchemaTableName> {
        self.strategy.to_logical_name(physical_name)
    }

    pub async fn list_schema_names(&self) -> Result<Vec<String>> {
        self.ensure_open()?;
        self.strategy.list_schemas(self.client.as_ref()).await
    }

    pub async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<SchemaTableName>> {
        self.ensure_open()?;
        self.strategy.list_tables(self.client.as_ref(), schema).await
    }

    /// Release the client handle. Safe to call more than once.
    pub async fn close(&self) -> Result<()> {
        if self.is_closed() {
            return Ok(());
        }
        self.client.close().await.context(StorageSnafu)?;
        tracing::info!(connector_id = %self.connector_id, "Closed Kudu client session");
        Ok(())
    }
}
