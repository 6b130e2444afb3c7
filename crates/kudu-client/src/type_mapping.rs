// SPDX-License-Identifier: Apache-2.0
// SPDX-FileCopyrightText: Copyright The Lance Authors

//! Type mapping from Kudu column types to Arrow data types.

use std::sync::Arc;

use arrow_schema::{DataType, Field, Schema, SchemaRef, TimeUnit};

use crate::client::{ClientError, ClientResult, ColumnInfo};

/// Map a Kudu type name to an Arrow `DataType`. Case-insensitive.
///
/// `DECIMAL(p, s)` carries its precision and scale; a bare `DECIMAL` falls
/// back to the widest Kudu decimal.
pub fn kudu_type_to_arrow(type_name: &str) -> ClientResult<DataType> {
    let upper = type_name.trim().to_uppercase();
    if let Some(args) = upper
        .strip_prefix("DECIMAL")
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
    {
        return parse_decimal(type_name, args);
    }

    match upper.as_str() {
        "BOOL" | "BOOLEAN" => Ok(DataType::Boolean),

        "INT8" => Ok(DataType::Int8),
        "INT16" => Ok(DataType::Int16),
        "INT32" => Ok(DataType::Int32),
        "INT64" => Ok(DataType::Int64),

        "FLOAT" => Ok(DataType::Float32),
        "DOUBLE" => Ok(DataType::Float64),

        "DECIMAL" => Ok(DataType::Decimal128(38, 0)),

        "STRING" | "VARCHAR" => Ok(DataType::Utf8),
        "BINARY" => Ok(DataType::Binary),

        "DATE" => Ok(DataType::Date32),
        "UNIXTIME_MICROS" => Ok(DataType::Timestamp(TimeUnit::Microsecond, None)),

        other => Err(ClientError::TypeMappingError(format!(
            "Unsupported Kudu type: '{}'",
            other
        ))),
    }
}

fn parse_decimal(type_name: &str, args: &str) -> ClientResult<DataType> {
    let invalid =
        || ClientError::TypeMappingError(format!("Invalid decimal type: '{}'", type_name));

    let inner = args
        .strip_prefix('(')
        .and_then(|s| s.strip_suffix(')'))
        .ok_or_else(invalid)?;
    let (precision, scale) = inner.split_once(',').ok_or_else(invalid)?;
    let precision: u8 = precision.trim().parse().map_err(|_| invalid())?;
    let scale: i8 = scale.trim().parse().map_err(|_| invalid())?;
    if precision == 0 || precision > 38 || scale < 0 || scale as u8 > precision {
        return Err(invalid());
    }
    Ok(DataType::Decimal128(precision, scale))
}

/// Convert a slice of [`ColumnInfo`] to an Arrow [`Schema`].
///
/// Key columns come first, in their declared order, as Kudu requires.
pub fn columns_to_arrow_schema(columns: &[ColumnInfo]) -> ClientResult<SchemaRef> {
    let ordered = columns
        .iter()
        .filter(|c| c.key)
        .chain(columns.iter().filter(|c| !c.key));

    let fields: Vec<Field> = ordered
        .map(|col| {
            let data_type = kudu_type_to_arrow(&col.type_name)?;
            Ok(Field::new(&col.name, data_type, col.nullable))
        })
        .collect::<ClientResult<Vec<_>>>()?;

    Ok(Arc::new(Schema::new(fields)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn column(name: &str, type_name: &str, key: bool) -> ColumnInfo {
        ColumnInfo {
            name: name.into(),
            type_name: type_name.into(),
            nullable: !key,
            key,
            comment: None,
        }
    }

    #[test]
    fn test_basic_type_mappings() {
        assert_eq!(kudu_type_to_arrow("BOOL").unwrap(), DataType::Boolean);
        assert_eq!(kudu_type_to_arrow("INT8").unwrap(), DataType::Int8);
        assert_eq!(kudu_type_to_arrow("INT16").unwrap(), DataType::Int16);
        assert_eq!(kudu_type_to_arrow("INT32").unwrap(), DataType::Int32);
        assert_eq!(kudu_type_to_arrow("INT64").unwrap(), DataType::Int64);
        assert_eq!(kudu_type_to_arrow("FLOAT").unwrap(), DataType::Float32);
        assert_eq!(kudu_type_to_arrow("DOUBLE").unwrap(), DataType::Float64);
        assert_eq!(kudu_type_to_arrow("STRING").unwrap(), DataType::Utf8);
        assert_eq!(kudu_type_to_arrow("BINARY").unwrap(), DataType::Binary);
        assert_eq!(kudu_type_to_arrow("DATE").unwrap(), DataType::Date32);
        assert_eq!(
            kudu_type_to_arrow("unixtime_micros").unwrap(),
            DataType::Timestamp(TimeUnit::Microsecond, None)
        );
    }

    #[test]
    fn test_decimal() {
        assert_eq!(
            kudu_type_to_arrow("DECIMAL(18, 4)").unwrap(),
            DataType::Decimal128(18, 4)
        );
        assert_eq!(kudu_type_to_arrow("decimal").unwrap(), DataType::Decimal128(38, 0));
        assert!(kudu_type_to_arrow("DECIMAL(4, 9)").is_err());
        assert!(kudu_type_to_arrow("DECIMAL(x)").is_err());
    }

    #[test]
    fn test_unsupported_type() {
        let err = kudu_type_to_arrow("NESTED").unwrap_err();
        assert!(err.to_string().contains("NESTED"));
    }

    #[test]
    fn test_key_columns_first() {
        let columns = vec![
            column("value", "DOUBLE", false),
            column("host", "STRING", true),
            column("ts", "UNIXTIME_MICROS", true),
        ];
        let schema = columns_to_arrow_schema(&columns).unwrap();
        assert_eq!(schema.fields().len(), 3);
        assert_eq!(schema.field(0).name(), "host");
        assert!(!schema.field(0).is_nullable());
        assert_eq!(schema.field(1).name(), "ts");
        assert_eq!(schema.field(2).name(), "value");
        assert!(schema.field(2).is_nullable());
    }

    #[test]
    fn test_empty_columns() {
        let schema = columns_to_arrow_schema(&[]).unwrap();
        assert_eq!(schema.fields().len(), 0);
    }
}
