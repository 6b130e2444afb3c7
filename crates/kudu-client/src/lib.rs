// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Storage client layer of the Kudu connector.
//!
//! - [`KuduClientConfig`] — connector configuration (masters, timeouts, schema emulation)
//! - [`StorageClient`] — handle to the cluster shared by every provider
//! - [`StorageClientBuilder`] / [`StorageClientFactory`] — build that handle once per connector
//! - [`HttpStorageClient`] — client for the master admin API
//! - [`InMemoryStorageClient`] — cluster held in memory

pub mod builder;
pub mod client;
pub mod config;
pub mod http_client;
pub mod memory;
pub mod statistics;
pub mod type_mapping;

pub use builder::{
    parse_master_address, HttpClientFactory, StorageClientBuilder, StorageClientFactory,
    DEFAULT_MASTER_PORT,
};
pub use client::{
    ClientError, ClientResult, ColumnInfo, RangePartition, StorageClient, TableInfo, TableSummary,
};
pub use config::KuduClientConfig;
pub use http_client::HttpStorageClient;
pub use memory::InMemoryStorageClient;
pub use statistics::{ClientStatistics, OperationKind, StatisticsSnapshot};
pub use type_mapping::{columns_to_arrow_schema, kudu_type_to_arrow};
