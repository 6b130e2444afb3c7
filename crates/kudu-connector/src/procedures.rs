// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Named procedures exposed to the query engine.
//!
//! Procedures are looked up by qualified name (`system.add_range_partition`)
//! and always run against the registry's [`ClientSession`]; they never build
//! a client of their own.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use kudu_client::{ClientError, RangePartition};
use snafu::ResultExt;

use crate::error::{
    InvalidArgumentSnafu, Result, StorageSnafu, TableNotFoundSnafu, UnknownProcedureSnafu,
};
use crate::schema_emulation::SchemaTableName;
use crate::session::ClientSession;

pub const SYSTEM_SCHEMA: &str = "system";
pub const ADD_RANGE_PARTITION: &str = "add_range_partition";
pub const DROP_RANGE_PARTITION: &str = "drop_range_partition";

/// Body of a procedure.
#[async_trait]
pub trait ProcedureHandler: Send + Sync {
    async fn call(&self, session: &ClientSession, args: &[String]) -> Result<()>;
}

/// A procedure declaration: where it lives, what it takes, and what runs.
#[derive(Clone)]
pub struct Procedure {
    pub schema: String,
    pub name: String,
    pub arguments: Vec<String>,
    handler: Arc<dyn ProcedureHandler>,
}

impl std::fmt::Debug for Procedure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Procedure")
            .field("schema", &self.schema)
            .field("name", &self.name)
            .field("arguments", &self.arguments)
            .finish()
    }
}

impl Procedure {
    pub fn new(
        schema: impl Into<String>,
        name: impl Into<String>,
        arguments: &[&str],
        handler: Arc<dyn ProcedureHandler>,
    ) -> Self {
        Self {
            schema: schema.into(),
            name: name.into(),
            arguments: arguments.iter().map(|a| a.to_string()).collect(),
            handler,
        }
    }

    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema, self.name)
    }
}

/// Procedures of one connector instance, keyed by qualified name.
#[derive(Debug)]
pub struct ProcedureRegistry {
    session: Arc<ClientSession>,
    procedures: BTreeMap<String, Procedure>,
}

impl ProcedureRegistry {
    pub fn new(session: Arc<ClientSession>) -> Self {
        Self {
            session,
            procedures: BTreeMap::new(),
        }
    }

    /// Registry holding the range partition procedures.
    pub fn with_range_partition_procedures(session: Arc<ClientSession>) -> Self {
        let mut registry = Self::new(session);
        registry.register(RangePartitionProcedures::add_partition_procedure());
        registry.register(RangePartitionProcedures::drop_partition_procedure());
        registry
    }

    /// Add a procedure, replacing any previous one with the same name.
    pub fn register(&mut self, procedure: Procedure) {
        self.procedures.insert(procedure.qualified_name(), procedure);
    }

    pub fn get(&self, qualified_name: &str) -> Option<&Procedure> {
        self.procedures.get(qualified_name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.procedures.keys().map(String::as_str)
    }

    pub fn session(&self) -> &Arc<ClientSession> {
        &self.session
    }

    pub async fn call(&self, qualified_name: &str, args: &[String]) -> Result<()> {
        let procedure = match self.get(qualified_name) {
            Some(p) => p,
            None => return UnknownProcedureSnafu { name: qualified_name }.fail(),
        };
        if args.len() != procedure.arguments.len() {
            return InvalidArgumentSnafu {
                procedure: qualified_name,
                message: format!(
                    "expected {} arguments ({}), got {}",
                    procedure.arguments.len(),
                    procedure.arguments.join(", "),
                    args.len()
                ),
            }
            .fail();
        }
        self.session.ensure_open()?;
        procedure.handler.call(&self.session, args).await
    }
}

/// Add and drop range partitions on a logical table.
pub struct RangePartitionProcedures;

impl RangePartitionProcedures {
    const ARGUMENTS: [&'static str; 3] = ["schema", "table", "range_bounds"];

    pub fn add_partition_procedure() -> Procedure {
        Procedure::new(
            SYSTEM_SCHEMA,
            ADD_RANGE_PARTITION,
            &Self::ARGUMENTS,
            Arc::new(RangePartitionHandler {
                action: PartitionAction::Add,
            }),
        )
    }

    pub fn drop_partition_procedure() -> Procedure {
        Procedure::new(
            SYSTEM_SCHEMA,
            DROP_RANGE_PARTITION,
            &Self::ARGUMENTS,
            Arc::new(RangePartitionHandler {
                action: PartitionAction::Drop,
            }),
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum PartitionAction {
    Add,
    Drop,
}

impl PartitionAction {
    fn procedure_name(self) -> &'static str {
        match self {
            Self::Add => ADD_RANGE_PARTITION,
            Self::Drop => DROP_RANGE_PARTITION,
        }
    }
}

struct RangePartitionHandler {
    action: PartitionAction,
}

/// Parse `{"lower": .., "upper": ..}`; a missing or null bound is unbounded.
pub fn parse_range_bounds(procedure: &str, json: &str) -> Result<RangePartition> {
    serde_json::from_str(json).map_err(|e| {
        InvalidArgumentSnafu {
            procedure,
            message: format!("invalid range bounds '{}': {}", json, e),
        }
        .build()
    })
}

#[async_trait]
impl ProcedureHandler for RangePartitionHandler {
    async fn call(&self, session: &ClientSession, args: &[String]) -> Result<()> {
        let procedure = self.action.procedure_name();
        let [schema, table, bounds] = args else {
            return InvalidArgumentSnafu {
                procedure,
                message: "expected schema, table and range_bounds",
            }
            .fail();
        };

        let name = SchemaTableName::new(schema.as_str(), table.as_str());
        let physical = session.to_physical_name(&name)?;
        let range = parse_range_bounds(procedure, bounds)?;

        let client = session.client();
        let result = match self.action {
            PartitionAction::Add => client.add_range_partition(&physical, &range).await,
            PartitionAction::Drop => client.drop_range_partition(&physical, &range).await,
        };
        match result {
            Ok(()) => {
                tracing::info!(
                    connector_id = session.connector_id(),
                    procedure,
                    table = %name,
                    "Range partition procedure completed"
                );
                Ok(())
            }
            // A 404 covers both a missing table and a missing partition.
            Err(ClientError::NotFound(message)) => match client.get_table(&physical).await {
                Err(ClientError::NotFound(_)) => TableNotFoundSnafu {
                    schema: name.schema,
                    table: name.table,
                }
                .fail(),
                _ => Err(ClientError::NotFound(message)).context(StorageSnafu),
            },
            Err(e) => Err(e).context(StorageSnafu),
        }
    }
}
