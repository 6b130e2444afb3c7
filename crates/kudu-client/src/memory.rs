// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! In-memory [`StorageClient`] for embedding and tests.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::client::*;
use crate::statistics::{ClientStatistics, OperationKind, StatisticsSnapshot};

/// A cluster held in memory. Tables are keyed by physical name.
#[derive(Debug)]
pub struct InMemoryStorageClient {
    tables: RwLock<BTreeMap<String, TableInfo>>,
    statistics: Option<ClientStatistics>,
    closed: AtomicBool,
}

impl Default for InMemoryStorageClient {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStorageClient {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(BTreeMap::new()),
            statistics: Some(ClientStatistics::new()),
            closed: AtomicBool::new(false),
        }
    }

    pub fn without_statistics() -> Self {
        Self {
            statistics: None,
            ..Self::new()
        }
    }

    /// Add a table with the given physical name and columns.
    pub fn with_table(self, name: impl Into<String>, columns: Vec<ColumnInfo>) -> Self {
        let name = name.into();
        self.tables.write().insert(
            name.clone(),
            TableInfo {
                name,
                id: None,
                columns,
                range_partitions: Vec::new(),
                properties: Default::default(),
            },
        );
        self
    }

    /// Range partitions currently recorded for a table.
    pub fn range_partitions(&self, table: &str) -> Option<Vec<RangePartition>> {
        self.tables
            .read()
            .get(table)
            .map(|t| t.range_partitions.clone())
    }

    fn ensure_open(&self) -> ClientResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(ClientError::Closed);
        }
        Ok(())
    }

    fn record<T>(&self, kind: OperationKind, result: ClientResult<T>) -> ClientResult<T> {
        if let Some(stats) = &self.statistics {
            stats.record(kind, result.is_ok());
        }
        result
    }

    fn mutate_partitions<F>(&self, table: &str, f: F) -> ClientResult<()>
    where
        F: FnOnce(&mut Vec<RangePartition>) -> ClientResult<()>,
    {
        self.ensure_open()?;
        let mut tables = self.tables.write();
        let result = match tables.get_mut(table) {
            Some(info) => f(&mut info.range_partitions),
            None => Err(ClientError::NotFound(format!("table '{}' not found", table))),
        };
        self.record(OperationKind::Admin, result)
    }
}

#[async_trait]
impl StorageClient for InMemoryStorageClient {
    fn name(&self) -> &str {
        "memory"
    }

    async fn list_tables(&self) -> ClientResult<Vec<TableSummary>> {
        self.ensure_open()?;
        let tables = self
            .tables
            .read()
            .values()
            .map(|t| TableSummary {
                name: t.name.clone(),
                id: t.id.clone(),
            })
            .collect();
        self.record(OperationKind::Metadata, Ok(tables))
    }

    async fn get_table(&self, name: &str) -> ClientResult<TableInfo> {
        self.ensure_open()?;
        let result = self
            .tables
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ClientError::NotFound(format!("table '{}' not found", name)));
        self.record(OperationKind::Metadata, result)
    }

    async fn add_range_partition(&self, table: &str, range: &RangePartition) -> ClientResult<()> {
        self.mutate_partitions(table, |partitions| {
            if partitions.contains(range) {
                return Err(ClientError::InvalidResponse(format!(
                    "range partition {:?} already exists on '{}'",
                    range, table
                )));
            }
            partitions.push(range.clone());
            Ok(())
        })
    }

    async fn drop_range_partition(
        &self,
        table: &str,
        range: &RangePartition,
    ) -> ClientResult<()> {
        self.mutate_partitions(table, |partitions| {
            let before = partitions.len();
            partitions.retain(|p| p != range);
            if partitions.len() == before {
                return Err(ClientError::NotFound(format!(
                    "range partition {:?} not found on '{}'",
                    range, table
                )));
            }
            Ok(())
        })
    }

    fn statistics(&self) -> Option<StatisticsSnapshot> {
        self.statistics.as_ref().map(ClientStatistics::snapshot)
    }

    async fn close(&self) -> ClientResult<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_partitions_round_trip() {
        let client = InMemoryStorageClient::new().with_table("orders", vec![]);
        let range = RangePartition::new(Some(1.into()), Some(10.into()));

        client.add_range_partition("orders", &range).await.unwrap();
        assert!(client.add_range_partition("orders", &range).await.is_err());
        assert_eq!(client.range_partitions("orders").unwrap(), vec![range.clone()]);

        client.drop_range_partition("orders", &range).await.unwrap();
        let err = client.drop_range_partition("orders", &range).await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound(_)));

        let stats = client.statistics().unwrap();
        assert_eq!(stats.admin_requests, 4);
        assert_eq!(stats.failed_requests, 2);
    }

    #[tokio::test]
    async fn test_default_collects_statistics() {
        let client = InMemoryStorageClient::default().with_table("t", vec![]);
        client.list_tables().await.unwrap();
        assert_eq!(client.statistics().unwrap().metadata_requests, 1);
        assert!(!client.is_closed());
    }

    #[tokio::test]
    async fn test_closed_client_rejects_calls() {
        let client = InMemoryStorageClient::without_statistics().with_table("t", vec![]);
        client.close().await.unwrap();
        client.close().await.unwrap();
        assert!(client.is_closed());
        assert_eq!(client.list_tables().await.unwrap_err(), ClientError::Closed);
        assert!(client.statistics().is_none());
    }
}
