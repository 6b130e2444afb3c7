// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Connector facade that bundles one [`ClientSession`] with the services
//! built on it, and the bootstrap that constructs it exactly once.

use std::collections::HashMap;
use std::sync::Arc;

use kudu_client::{HttpClientFactory, KuduClientConfig, StorageClientFactory};
use tokio::sync::OnceCell;

use crate::error::{ConfigValidationSnafu, Result};
use crate::metadata::KuduMetadata;
use crate::procedures::ProcedureRegistry;
use crate::session::ClientSession;

/// The services of one connector instance.
///
/// Metadata and procedures hold the same [`ClientSession`]; nothing here
/// builds a second client handle.
#[derive(Debug)]
pub struct KuduConnector {
    session: Arc<ClientSession>,
    metadata: KuduMetadata,
    procedures: ProcedureRegistry,
}

impl KuduConnector {
    pub fn new(session: Arc<ClientSession>) -> Self {
        Self {
            metadata: KuduMetadata::new(session.clone()),
            procedures: ProcedureRegistry::with_range_partition_procedures(session.clone()),
            session,
        }
    }

    pub fn connector_id(&self) -> &str {
        self.session.connector_id()
    }

    pub fn session(&self) -> &Arc<ClientSession> {
        &self.session
    }

    pub fn metadata(&self) -> &KuduMetadata {
        &self.metadata
    }

    pub fn procedures(&self) -> &ProcedureRegistry {
        &self.procedures
    }

    /// Release the client handle. Must only run once no provider is still
    /// using the session; calling it twice is a no-op.
    pub async fn shutdown(&self) -> Result<()> {
        self.session.close().await
    }
}

/// Builds the [`KuduConnector`] of one connector instance on first use.
///
/// Concurrent callers share one initialization. A failed initialization
/// leaves the bootstrap empty, so the host may retry.
pub struct ConnectorBootstrap {
    connector_id: String,
    config: KuduClientConfig,
    factory: Arc<dyn StorageClientFactory>,
    connector: OnceCell<Arc<KuduConnector>>,
}

impl std::fmt::Debug for ConnectorBootstrap {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectorBootstrap")
            .field("connector_id", &self.connector_id)
            .field("config", &self.config)
            .field("initialized", &self.connector.initialized())
            .finish()
    }
}

impl ConnectorBootstrap {
    pub fn new(connector_id: impl Into<String>, config: KuduClientConfig) -> Self {
        Self {
            connector_id: connector_id.into(),
            config,
            factory: Arc::new(HttpClientFactory),
            connector: OnceCell::new(),
        }
    }

    /// Bootstrap from catalog properties (`kudu.client.*`, `kudu.schema-emulation.*`).
    pub fn from_properties(
        connector_id: impl Into<String>,
        properties: &HashMap<String, String>,
    ) -> Result<Self> {
        let config = KuduClientConfig::from_properties(properties).map_err(|e| {
            ConfigValidationSnafu {
                message: e.to_string(),
            }
            .build()
        })?;
        Ok(Self::new(connector_id, config))
    }

    /// Use another client factory (e.g., an in-memory cluster).
    pub fn with_factory(mut self, factory: Arc<dyn StorageClientFactory>) -> Self {
        self.factory = factory;
        self
    }

    pub fn connector_id(&self) -> &str {
        &self.connector_id
    }

    pub fn config(&self) -> &KuduClientConfig {
        &self.config
    }

    /// The connector, building its session on the first call.
    pub async fn connector(&self) -> Result<Arc<KuduConnector>> {
        let connector = self
            .connector
            .get_or_try_init(|| async {
                let session =
                    ClientSession::create(&self.connector_id, &self.config, self.factory.as_ref())
                        .await?;
                Ok::<_, crate::error::Error>(Arc::new(KuduConnector::new(Arc::new(session))))
            })
            .await?;
        Ok(connector.clone())
    }

    pub async fn session(&self) -> Result<Arc<ClientSession>> {
        Ok(self.connector().await?.session().clone())
    }

    /// Shut down the connector if it was ever built.
    pub async fn shutdown(&self) -> Result<()> {
        match self.connector.get() {
            Some(connector) => connector.shutdown().await,
            None => Ok(()),
        }
    }
}
