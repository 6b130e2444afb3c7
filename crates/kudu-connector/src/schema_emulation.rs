// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Mapping between the engine's `schema.table` names and Kudu's flat table
//! namespace.
//!
//! With emulation disabled every table lives in [`DEFAULT_SCHEMA`] and keeps
//! its physical name. With emulation enabled the physical name is
//! `<prefix><schema>.<table>`; [`SCHEMA_SEPARATOR`] is reserved and may not
//! appear in a schema or table name, which keeps the mapping reversible.

use std::collections::BTreeSet;
use std::fmt;

use kudu_client::{KuduClientConfig, StorageClient};
use snafu::ResultExt;

use crate::error::{
    InvalidIdentifierSnafu, NotConvertibleSnafu, Result, StorageSnafu, UnsupportedSchemaSnafu,
};

pub const DEFAULT_SCHEMA: &str = "default";
pub const SCHEMA_SEPARATOR: char = '.';

/// A logical table name as seen by the query engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaTableName {
    pub schema: String,
    pub table: String,
}

impl SchemaTableName {
    pub fn new(schema: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            schema: schema.into(),
            table: table.into(),
        }
    }
}

impl fmt::Display for SchemaTableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.schema, self.table)
    }
}

/// How logical schemas are represented on the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaEmulation {
    /// Only [`DEFAULT_SCHEMA`] exists; physical name == table name.
    Disabled,
    /// Physical name is `prefix + schema + "." + table`.
    PrefixConvention { prefix: String },
}

/// Pick the strategy for a config. No I/O.
pub fn select_strategy(config: &KuduClientConfig) -> SchemaEmulation {
    if config.schema_emulation_enabled {
        SchemaEmulation::PrefixConvention {
            prefix: config.schema_emulation_prefix.clone(),
        }
    } else {
        SchemaEmulation::Disabled
    }
}

impl SchemaEmulation {
    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::PrefixConvention { .. })
    }

    pub fn to_physical_name(&self, schema: &str, table: &str) -> Result<String> {
        match self {
            Self::Disabled => {
                if schema != DEFAULT_SCHEMA {
                    return UnsupportedSchemaSnafu { schema }.fail();
                }
                Ok(table.to_string())
            }
            Self::PrefixConvention { prefix } => {
                check_identifier(schema, "schema")?;
                check_identifier(table, "table")?;
                Ok(format!("{}{}{}{}", prefix, schema, SCHEMA_SEPARATOR, table))
            }
        }
    }

    pub fn to_logical_name(&self, physical_name: &str) -> Result<SchemaTableName> {
        match self {
            Self::Disabled => Ok(SchemaTableName::new(DEFAULT_SCHEMA, physical_name)),
            Self::PrefixConvention { prefix } => {
                let (schema, table) = physical_name
                    .strip_prefix(prefix.as_str())
                    .and_then(|rest| rest.split_once(SCHEMA_SEPARATOR))
                    .filter(|(schema, table)| {
                        !schema.is_empty() && !table.is_empty() && !table.contains(SCHEMA_SEPARATOR)
                    })
                    .ok_or_else(|| {
                        NotConvertibleSnafu {
                            name: physical_name,
                        }
                        .build()
                    })?;
                Ok(SchemaTableName::new(schema, table))
            }
        }
    }

    /// Schema names derivable from a set of physical names, sorted and
    /// deduplicated. Names outside the convention are skipped.
    pub fn schema_names_from<'a, I>(&self, physical_names: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        match self {
            Self::Disabled => vec![DEFAULT_SCHEMA.to_string()],
            Self::PrefixConvention { .. } => physical_names
                .into_iter()
                .filter_map(|name| self.convertible(name))
                .map(|name| name.schema)
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        }
    }

    /// List logical schemas. Reads the cluster's table list on every call.
    pub async fn list_schemas(&self, client: &dyn StorageClient) -> Result<Vec<String>> {
        if !self.is_enabled() {
            return Ok(self.schema_names_from(std::iter::empty()));
        }
        let tables = client.list_tables().await.context(StorageSnafu)?;
        Ok(self.schema_names_from(tables.iter().map(|t| t.name.as_str())))
    }

    /// List logical tables, optionally restricted to one schema.
    pub async fn list_tables(
        &self,
        client: &dyn StorageClient,
        schema: Option<&str>,
    ) -> Result<Vec<SchemaTableName>> {
        if let (Self::Disabled, Some(schema)) = (self, schema) {
            if schema != DEFAULT_SCHEMA {
                return UnsupportedSchemaSnafu { schema }.fail();
            }
        }

        let tables = client.list_tables().await.context(StorageSnafu)?;
        let mut names: Vec<SchemaTableName> = tables
            .iter()
            .filter_map(|t| self.convertible(&t.name))
            .filter(|name| schema.map_or(true, |s| name.schema == s))
            .collect();
        names.sort();
        Ok(names)
    }

    fn convertible(&self, physical_name: &str) -> Option<SchemaTableName> {
        match self.to_logical_name(physical_name) {
            Ok(name) => Some(name),
            Err(e) => {
                tracing::debug!(
                    table = physical_name,
                    error = %e,
                    "Skipping table outside schema convention"
                );
                None
            }
        }
    }
}

fn check_identifier(identifier: &str, kind: &str) -> Result<()> {
    if identifier.is_empty() {
        return InvalidIdentifierSnafu {
            identifier,
            reason: format!("{} name must not be empty", kind),
        }
        .fail();
    }
    if identifier.contains(SCHEMA_SEPARATOR) {
        return InvalidIdentifierSnafu {
            identifier,
            reason: format!(
                "{} name must not contain the reserved separator '{}'",
                kind, SCHEMA_SEPARATOR
            ),
        }
        .fail();
    }
    Ok(())
}
