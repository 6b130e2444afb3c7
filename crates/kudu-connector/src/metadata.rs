// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Metadata lookups resolved through the connector's [`ClientSession`].

use std::sync::Arc;

use arrow_schema::SchemaRef;
use kudu_client::{ClientError, TableInfo};
use snafu::ResultExt;

use crate::error::{Result, StorageSnafu, TableNotFoundSnafu};
use crate::schema_emulation::SchemaTableName;
use crate::session::ClientSession;

/// Browse schemas and tables of one connector instance.
#[derive(Debug, Clone)]
pub struct KuduMetadata {
    session: Arc<ClientSession>,
}

impl KuduMetadata {
    pub fn new(session: Arc<ClientSession>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<ClientSession> {
        &self.session
    }

    pub async fn list_schema_names(&self) -> Result<Vec<String>> {
        self.session.list_schema_names().await
    }

    pub async fn schema_exists(&self, schema: &str) -> Result<bool> {
        Ok(self
            .list_schema_names()
            .await?
            .iter()
            .any(|s| s == schema))
    }

    pub async fn list_tables(&self, schema: Option<&str>) -> Result<Vec<SchemaTableName>> {
        self.session.list_tables(schema).await
    }

    /// Full table metadata. The returned [`TableInfo`] carries the physical name.
    pub async fn get_table(&self, name: &SchemaTableName) -> Result<TableInfo> {
        self.session.ensure_open()?;
        let physical = self.session.to_physical_name(name)?;
        match self.session.client().get_table(&physical).await {
            Ok(table) => Ok(table),
            Err(ClientError::NotFound(_)) => TableNotFoundSnafu {
                schema: name.schema.as_str(),
                table: name.table.as_str(),
            }
            .fail(),
            Err(e) => Err(e).context(StorageSnafu),
        }
    }

    /// Arrow schema of a table, key columns first.
    pub async fn get_table_schema(&self, name: &SchemaTableName) -> Result<SchemaRef> {
        let table = self.get_table(name).await?;
        self.session
            .client()
            .table_to_arrow_schema(&table)
            .context(StorageSnafu)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::schema_emulation::SchemaEmulation;
    use arrow_schema::DataType;
    use kudu_client::{ColumnInfo, InMemoryStorageClient};

    fn metadata(strategy: SchemaEmulation) -> KuduMetadata {
        let client = InMemoryStorageClient::new()
            .with_table(
                "presto::sales.orders",
                vec![
                    ColumnInfo {
                        name: "amount".into(),
                        type_name: "DOUBLE".into(),
                        nullable: true,
                        key: false,
                        comment: None,
                    },
                    ColumnInfo {
                        name: "id".into(),
                        type_name: "INT64".into(),
                        nullable: false,
                        key: true,
                        comment: None,
                    },
                ],
            )
            .with_table("presto::hr.people", vec![])
            .with_table("orders", vec![]);
        KuduMetadata::new(Arc::new(ClientSession::new("kudu", Arc::new(client), strategy)))
    }

    #[tokio::test]
    async fn test_list_schema_names() {
        let emulated = metadata(SchemaEmulation::PrefixConvention {
            prefix: "presto::".into(),
        });
        assert_eq!(emulated.list_schema_names().await.unwrap(), vec!["hr", "sales"]);
        assert!(emulated.schema_exists("sales").await.unwrap());
        assert!(!emulated.schema_exists("default").await.unwrap());

        let plain = metadata(SchemaEmulation::Disabled);
        assert_eq!(plain.list_schema_names().await.unwrap(), vec!["default"]);
    }

    #[tokio::test]
    async fn test_get_table_schema() {
        let emulated = metadata(SchemaEmulation::PrefixConvention {
            prefix: "presto::".into(),
        });
        let schema = emulated
            .get_table_schema(&SchemaTableName::new("sales", "orders"))
            .await
            .unwrap();
        assert_eq!(schema.field(0).name(), "id");
        assert_eq!(*schema.field(1).data_type(), DataType::Float64);
    }

    #[tokio::test]
    async fn test_get_table_not_found() {
        let plain = metadata(SchemaEmulation::Disabled);
        let err = plain
            .get_table(&SchemaTableName::new("default", "missing"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TableNotFound { .. }));

        let err = plain
            .get_table(&SchemaTableName::new("sales", "orders"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::UnsupportedSchema { .. }));
    }

    #[tokio::test]
    async fn test_closed_session_rejects_lookups() {
        let plain = metadata(SchemaEmulation::Disabled);
        plain.session().close().await.unwrap();
        plain.session().close().await.unwrap();

        let err = plain.list_schema_names().await.unwrap_err();
        assert!(matches!(err, Error::SessionClosed { .. }));
    }
}
