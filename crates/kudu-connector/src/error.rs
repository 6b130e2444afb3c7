// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Error types for the Kudu connector.

use kudu_client::ClientError;
use snafu::{Location, Snafu};

/// Errors raised while bootstrapping a connector or translating names.
///
/// `ConfigValidation` and `StorageConnection` abort connector startup. The
/// naming errors (`UnsupportedSchema`, `InvalidIdentifier`, `NotConvertible`)
/// are local to one call and leave the session usable.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("Invalid connector configuration: {message}, {location}"))]
    ConfigValidation {
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Failed to connect to Kudu: {source}, {location}"))]
    StorageConnection {
        source: ClientError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Schema '{schema}' is not supported when schema emulation is disabled"))]
    UnsupportedSchema {
        schema: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Invalid identifier '{identifier}': {reason}"))]
    InvalidIdentifier {
        identifier: String,
        reason: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Table name '{name}' cannot be converted to a schema and table name"))]
    NotConvertible {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Table '{schema}.{table}' not found"))]
    TableNotFound {
        schema: String,
        table: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Kudu request failed: {source}, {location}"))]
    Storage {
        source: ClientError,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Invalid argument for {procedure}: {message}"))]
    InvalidArgument {
        procedure: String,
        message: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Unknown procedure '{name}'"))]
    UnknownProcedure {
        name: String,
        #[snafu(implicit)]
        location: Location,
    },

    #[snafu(display("Client session for connector '{connector_id}' is closed"))]
    SessionClosed {
        connector_id: String,
        #[snafu(implicit)]
        location: Location,
    },
}

impl Error {
    /// Whether this error must abort connector startup.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigValidation { .. } | Self::StorageConnection { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, Error>;
