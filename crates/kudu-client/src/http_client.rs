// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! HTTP client for the Kudu master admin API implementing [`StorageClient`].
//!
//! Built through [`crate::builder::StorageClientBuilder`]; building probes the
//! configured masters and pins the first one that answers.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use crate::builder::StorageClientBuilder;
use crate::client::*;
use crate::statistics::{ClientStatistics, OperationKind, StatisticsSnapshot};

const API_PREFIX: [&str; 2] = ["api", "v1"];

/// Kudu master admin API client.
///
/// Metadata calls are bounded by the operation timeout; partition changes and
/// health probes by the admin operation timeout. The socket read timeout
/// applies to every read on the underlying connection.
pub struct HttpStorageClient {
    /// `None` once closed; dropping the client releases its connection pool.
    client: RwLock<Option<Client>>,
    masters: Vec<Url>,
    leader: Url,
    admin_timeout: Duration,
    operation_timeout: Duration,
    statistics: Option<ClientStatistics>,
}

impl std::fmt::Debug for HttpStorageClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpStorageClient")
            .field("masters", &self.masters)
            .field("leader", &self.leader.as_str())
            .field("admin_timeout", &self.admin_timeout)
            .field("operation_timeout", &self.operation_timeout)
            .field("statistics_enabled", &self.statistics.is_some())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl HttpStorageClient {
    pub(crate) async fn connect(
        client: Client,
        masters: Vec<Url>,
        builder: &StorageClientBuilder,
    ) -> ClientResult<Self> {
        let admin_timeout = builder.admin_operation_timeout();
        let mut failures = Vec::with_capacity(masters.len());

        for master in &masters {
            match probe(&client, master, admin_timeout).await {
                Ok(()) => {
                    tracing::info!(
                        master = %master,
                        masters = masters.len(),
                        statistics = builder.statistics_enabled(),
                        "Connected to Kudu master"
                    );
                    let leader = master.clone();
                    return Ok(Self {
                        client: RwLock::new(Some(client)),
                        masters,
                        leader,
                        admin_timeout,
                        operation_timeout: builder.operation_timeout(),
                        statistics: builder.statistics_enabled().then(ClientStatistics::new),
                    });
                }
                Err(e) => {
                    tracing::warn!(master = %master, error = %e, "Kudu master probe failed");
                    failures.push(format!("{}: {}", master, e));
                }
            }
        }

        Err(ClientError::ConnectionError(format!(
            "No reachable Kudu master ({})",
            failures.join("; ")
        )))
    }

    /// The master this client talks to.
    pub fn leader(&self) -> &Url {
        &self.leader
    }

    pub fn masters(&self) -> &[Url] {
        &self.masters
    }

    fn request(
        &self,
        kind: OperationKind,
        method: reqwest::Method,
        segments: &[&str],
    ) -> ClientResult<reqwest::RequestBuilder> {
        let client = self.client.read().clone().ok_or(ClientError::Closed)?;
        let url = endpoint(&self.leader, segments)?;
        let timeout = match kind {
            OperationKind::Metadata => self.operation_timeout,
            OperationKind::Admin => self.admin_timeout,
        };
        Ok(client.request(method, url).timeout(timeout))
    }

    fn record(&self, kind: OperationKind, success: bool) {
        if let Some(stats) = &self.statistics {
            stats.record(kind, success);
        }
    }

    async fn send(
        &self,
        kind: OperationKind,
        request: reqwest::RequestBuilder,
        resource_name: &str,
    ) -> ClientResult<reqwest::Response> {
        let result = match request.send().await {
            Ok(resp) => check_status(resp, resource_name).await,
            Err(e) => Err(ClientError::ConnectionError(e.to_string())),
        };
        self.record(kind, result.is_ok());
        result
    }

    async fn send_json<T: serde::de::DeserializeOwned>(
        &self,
        kind: OperationKind,
        request: reqwest::RequestBuilder,
        resource_name: &str,
    ) -> ClientResult<T> {
        let resp = self.send(kind, request, resource_name).await?;
        resp.json::<T>()
            .await
            .map_err(|e| ClientError::InvalidResponse(e.to_string()))
    }
}

fn endpoint(base: &Url, segments: &[&str]) -> ClientResult<Url> {
    let mut url = base.clone();
    url.path_segments_mut()
        .map_err(|_| {
            ClientError::InvalidConfig(format!("Master address '{}' cannot be a base URL", base))
        })?
        .pop_if_empty()
        .extend(API_PREFIX)
        .extend(segments);
    Ok(url)
}

/// Path segments that would be normalized away, or collapse the path, are
/// rejected so a request never reaches a different endpoint.
fn check_table_name(name: &str) -> ClientResult<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(ClientError::InvalidTableName(format!(
            "'{}' cannot be addressed on the master API",
            name
        )));
    }
    Ok(())
}

async fn probe(client: &Client, master: &Url, timeout: Duration) -> ClientResult<()> {
    let url = endpoint(master, &["health"])?;
    let resp = client
        .get(url)
        .timeout(timeout)
        .send()
        .await
        .map_err(|e| ClientError::ConnectionError(e.to_string()))?;
    check_status(resp, "master health").await.map(|_| ())
}

async fn check_status(
    resp: reqwest::Response,
    resource_name: &str,
) -> ClientResult<reqwest::Response> {
    let status = resp.status();

    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(ClientError::NotFound(format!("{} not found", resource_name)));
    }
    if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::AuthError(format!("HTTP {}: {}", status, body)));
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ClientError::ConnectionError(format!("HTTP {}: {}", status, body)));
    }
    Ok(resp)
}

// ---- Serde models for master API JSON responses ----

#[derive(Deserialize)]
struct ListTablesResponse {
    #[serde(default)]
    tables: Vec<KuduTableSummary>,
}

#[derive(Deserialize)]
struct KuduTableSummary {
    name: String,
    id: Option<String>,
}

#[derive(Deserialize)]
struct KuduTable {
    name: String,
    id: Option<String>,
    #[serde(default)]
    columns: Vec<KuduColumn>,
    #[serde(default)]
    range_partitions: Vec<RangePartition>,
    #[serde(default)]
    properties: HashMap<String, String>,
}

#[derive(Deserialize)]
struct KuduColumn {
    name: String,
    #[serde(rename = "type")]
    type_name: String,
    #[serde(default = "default_nullable")]
    nullable: bool,
    #[serde(default)]
    key: bool,
    comment: Option<String>,
}

fn default_nullable() -> bool {
    true
}

impl From<KuduTableSummary> for TableSummary {
    fn from(t: KuduTableSummary) -> Self {
        TableSummary { name: t.name, id: t.id }
    }
}

impl From<KuduTable> for TableInfo {
    fn from(t: KuduTable) -> Self {
        TableInfo {
            name: t.name,
            id: t.id,
            columns: t.columns.into_iter().map(Into::into).collect(),
            range_partitions: t.range_partitions,
            properties: t.properties,
        }
    }
}

impl From<KuduColumn> for ColumnInfo {
    fn from(c: KuduColumn) -> Self {
        ColumnInfo {
            name: c.name,
            type_name: c.type_name,
            // Key columns are never nullable in Kudu.
            nullable: c.nullable && !c.key,
            key: c.key,
            comment: c.comment,
        }
    }
}

// ---- StorageClient implementation ----

#[async_trait]
impl StorageClient for HttpStorageClient {
    fn name(&self) -> &str {
        "http"
    }

    async fn list_tables(&self) -> ClientResult<Vec<TableSummary>> {
        let request = self.request(OperationKind::Metadata, reqwest::Method::GET, &["tables"])?;
        let body: ListTablesResponse = self
            .send_json(OperationKind::Metadata, request, "tables")
            .await?;
        Ok(body.tables.into_iter().map(Into::into).collect())
    }

    async fn get_table(&self, name: &str) -> ClientResult<TableInfo> {
        check_table_name(name)?;
        let request =
            self.request(OperationKind::Metadata, reqwest::Method::GET, &["tables", name])?;
        let body: KuduTable = self
            .send_json(OperationKind::Metadata, request, &format!("table '{}'", name))
            .await?;
        Ok(body.into())
    }

    async fn add_range_partition(&self, table: &str, range: &RangePartition) -> ClientResult<()> {
        check_table_name(table)?;
        let request = self
            .request(
                OperationKind::Admin,
                reqwest::Method::POST,
                &["tables", table, "range_partitions"],
            )?
            .json(range);
        self.send(OperationKind::Admin, request, &format!("table '{}'", table))
            .await?;
        tracing::info!(table, ?range, "Added range partition");
        Ok(())
    }

    async fn drop_range_partition(
        &self,
        table: &str,
        range: &RangePartition,
    ) -> ClientResult<()> {
        check_table_name(table)?;
        let request = self
            .request(
                OperationKind::Admin,
                reqwest::Method::DELETE,
                &["tables", table, "range_partitions"],
            )?
            .json(range);
        self.send(OperationKind::Admin, request, &format!("table '{}'", table))
            .await?;
        tracing::info!(table, ?range, "Dropped range partition");
        Ok(())
    }

    fn statistics(&self) -> Option<StatisticsSnapshot> {
        self.statistics.as_ref().map(ClientStatistics::snapshot)
    }

    async fn close(&self) -> ClientResult<()> {
        if self.client.write().take().is_some() {
            tracing::info!(master = %self.leader, "Closed Kudu client");
        }
        Ok(())
    }

    fn is_closed(&self) -> bool {
        self.client.read().is_none()
    }
}
