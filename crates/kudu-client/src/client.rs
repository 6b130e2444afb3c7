// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Storage client trait and data types for talking to a Kudu cluster.
//!
//! The connector never reaches the cluster except through a [`StorageClient`]
//! handle. One handle is built per connector instance and shared by every
//! provider that needs metadata or partition management.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::statistics::StatisticsSnapshot;

/// Summary of a physical table as listed by the master.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    pub name: String,
    pub id: Option<String>,
}

/// Metadata about a column in a Kudu table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    pub name: String,
    /// Kudu type name (e.g., "INT32", "STRING", "UNIXTIME_MICROS").
    pub type_name: String,
    pub nullable: bool,
    /// Whether the column is part of the primary key.
    pub key: bool,
    pub comment: Option<String>,
}

/// Bounds of a single range partition.
///
/// A missing bound means the range is unbounded on that side.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RangePartition {
    #[serde(default)]
    pub lower: Option<serde_json::Value>,
    #[serde(default)]
    pub upper: Option<serde_json::Value>,
}

impl RangePartition {
    pub fn new(lower: Option<serde_json::Value>, upper: Option<serde_json::Value>) -> Self {
        Self { lower, upper }
    }

    pub fn is_unbounded(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }
}

/// Full table metadata including columns and range partitions.
#[derive(Debug, Clone, PartialEq)]
pub struct TableInfo {
    pub name: String,
    pub id: Option<String>,
    pub columns: Vec<ColumnInfo>,
    pub range_partitions: Vec<RangePartition>,
    pub properties: HashMap<String, String>,
}

/// Errors that can occur during storage client operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// Network, HTTP, or master connectivity error.
    ConnectionError(String),
    /// Table not found on the cluster.
    NotFound(String),
    /// Authentication or authorization failure.
    AuthError(String),
    /// Invalid or unparsable response from the master.
    InvalidResponse(String),
    /// Configuration rejected before any network call.
    InvalidConfig(String),
    /// Failed to map a Kudu type to an Arrow type.
    TypeMappingError(String),
    /// Table name the client cannot address, rejected before any request.
    InvalidTableName(String),
    /// The handle has been closed.
    Closed,
}

impl std::fmt::Display for ClientError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ConnectionError(msg) => write!(f, "Kudu connection error: {}", msg),
            Self::NotFound(msg) => write!(f, "Not found: {}", msg),
            Self::AuthError(msg) => write!(f, "Auth error: {}", msg),
            Self::InvalidResponse(msg) => write!(f, "Invalid response: {}", msg),
            Self::InvalidConfig(msg) => write!(f, "Invalid client configuration: {}", msg),
            Self::TypeMappingError(msg) => write!(f, "Type mapping error: {}", msg),
            Self::InvalidTableName(msg) => write!(f, "Invalid table name: {}", msg),
            Self::Closed => write!(f, "Kudu client is closed"),
        }
    }
}

impl std::error::Error for ClientError {}

pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// Handle to a Kudu cluster.
///
/// Implementations must be safe to share across every reader, writer and
/// procedure of a connector instance. The connector adds no locking around
/// calls made through the handle.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Human-readable name of this client implementation (e.g., "http").
    fn name(&self) -> &str;

    /// List every physical table on the cluster.
    async fn list_tables(&self) -> ClientResult<Vec<TableSummary>>;

    /// Get detailed information about a physical table, including columns.
    async fn get_table(&self, name: &str) -> ClientResult<TableInfo>;

    /// Add a range partition to a physical table.
    async fn add_range_partition(&self, table: &str, range: &RangePartition)
        -> ClientResult<()>;

    /// Drop a range partition from a physical table.
    async fn drop_range_partition(
        &self,
        table: &str,
        range: &RangePartition,
    ) -> ClientResult<()>;

    /// Operation counters, or `None` when statistics collection is disabled.
    fn statistics(&self) -> Option<StatisticsSnapshot>;

    /// Release the connection and any pooled transport resources. Later calls
    /// fail with [`ClientError::Closed`]; closing twice is a no-op.
    async fn close(&self) -> ClientResult<()>;

    fn is_closed(&self) -> bool;

    /// Convert a table's column definitions to an Arrow schema.
    ///
    /// The default implementation uses the standard type mapping from
    /// [`crate::type_mapping::columns_to_arrow_schema`].
    fn table_to_arrow_schema(&self, table: &TableInfo) -> ClientResult<arrow_schema::SchemaRef> {
        crate::type_mapping::columns_to_arrow_schema(&table.columns)
    }
}
