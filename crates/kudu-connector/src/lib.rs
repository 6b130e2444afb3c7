// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Session bootstrap for the Kudu connector.
//!
//! Given static configuration, this crate builds the pieces a query engine
//! needs to reach a Kudu cluster, each exactly once per connector instance:
//!
//! - [`ClientSession`] — the connector's single storage client handle plus its naming strategy
//! - [`SchemaEmulation`] — maps `schema.table` onto Kudu's flat table namespace
//! - [`KuduMetadata`] — schema and table lookups through the session
//! - [`ProcedureRegistry`] — named procedures (range partition management)
//! - [`ConnectorBootstrap`] — builds the [`KuduConnector`] on first use
//!
//! ```no_run
//! # use kudu_connector::{ConnectorBootstrap, SchemaTableName};
//! # use kudu_client::KuduClientConfig;
//! # async fn example() -> kudu_connector::Result<()> {
//! let config = KuduClientConfig::new(["kudu-master:7051"]).with_schema_emulation("presto::");
//! let bootstrap = ConnectorBootstrap::new("kudu", config);
//! let connector = bootstrap.connector().await?;
//! let tables = connector.metadata().list_tables(Some("sales")).await?;
//! # Ok(())
//! # }
//! ```

pub mod connector;
pub mod error;
pub mod metadata;
pub mod procedures;
pub mod schema_emulation;
pub mod session;

pub use connector::{ConnectorBootstrap, KuduConnector};
pub use error::{Error, Result};
pub use metadata::KuduMetadata;
pub use procedures::{
    parse_range_bounds, Procedure, ProcedureHandler, ProcedureRegistry, RangePartitionProcedures,
};
pub use schema_emulation::{
    select_strategy, SchemaEmulation, SchemaTableName, DEFAULT_SCHEMA, SCHEMA_SEPARATOR,
};
pub use session::{create_session, ClientSession};
