//! Data models for the rowset engine.
//!
//! - [`Dataset`] - column names plus positional row arrays, as serialized by query results
//! - [`ColumnMeta`] - caller-supplied `{name, typeName}` column metadata
//! - [`ColumnInfo`] - derived field name, source position and type of one column
//! - [`ColumnMap`] - field name to [`ColumnInfo`], in declaration order

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{RowSetError, RowSetResult};

/// Keys accepted for the column-name list.
const COLUMN_KEYS: [&str; 3] = ["columns", "COLUMNS", "Columns"];

/// Keys accepted for the row list.
const DATA_KEYS: [&str; 3] = ["data", "DATA", "Data"];

// =============================================================================
// Dataset
// =============================================================================

/// A column/row tabular result: one name per column, one value array per row.
///
/// Rows are kept as [`Value`]s so a loaded dataset can be rewritten in place,
/// each array becoming a keyed object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    /// Column names, positionally matching each row.
    #[serde(alias = "COLUMNS", alias = "Columns")]
    pub columns: Vec<String>,
    /// Row value arrays.
    #[serde(alias = "DATA", alias = "Data")]
    pub data: Vec<Value>,
}

impl Dataset {
    /// Build a dataset from column names and row value arrays.
    pub fn new<S: Into<String>>(columns: Vec<S>, rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            data: rows.into_iter().map(Value::Array).collect(),
        }
    }

    /// Parse a dataset from a JSON string.
    ///
    /// # Example
    /// ```ignore
    /// let ds = Dataset::from_json(r#"{"COLUMNS":["ID","NAME"],"DATA":[[1,"a"]]}"#)?;
    /// assert_eq!(ds.columns, vec!["ID", "NAME"]);
    /// ```
    pub fn from_json(json: &str) -> RowSetResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Build a dataset from an already-parsed JSON value.
    pub fn from_value(value: Value) -> RowSetResult<Self> {
        let Value::Object(mut obj) = value else {
            return Err(RowSetError::malformed("dataset must be a JSON object"));
        };

        let columns = match take_field(&mut obj, &COLUMN_KEYS) {
            Some(Value::Array(names)) => names
                .into_iter()
                .enumerate()
                .map(|(i, name)| match name {
                    Value::String(s) => Ok(s),
                    other => Err(RowSetError::malformed(format!(
                        "column name at position {} is not a string: {}",
                        i, other
                    ))),
                })
                .collect::<RowSetResult<Vec<_>>>()?,
            Some(other) => {
                return Err(RowSetError::malformed(format!(
                    "`columns` must be an array, got {}",
                    type_name(&other)
                )))
            }
            None => return Err(RowSetError::malformed("missing `columns` field")),
        };

        let data = match take_field(&mut obj, &DATA_KEYS) {
            Some(Value::Array(rows)) => rows,
            Some(other) => {
                return Err(RowSetError::malformed(format!(
                    "`data` must be an array, got {}",
                    type_name(&other)
                )))
            }
            None => return Err(RowSetError::malformed("missing `data` field")),
        };

        Ok(Self { columns, data })
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

fn take_field(obj: &mut Map<String, Value>, keys: &[&str]) -> Option<Value> {
    keys.iter().find_map(|key| obj.remove(*key))
}

/// Short JSON type label for error messages.
pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// Column Metadata
// =============================================================================

/// Caller-supplied description of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMeta {
    /// Field name used verbatim in output rows.
    pub name: String,
    /// Optional type label carried into [`ColumnInfo`].
    #[serde(default, alias = "type", skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
        }
    }

    pub fn typed(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name.into()),
        }
    }
}

// =============================================================================
// Column Info
// =============================================================================

/// Derived description of one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    /// Position of the column in the source rows.
    pub index: usize,
    /// Field name in output rows.
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

/// Field name to column info, in declaration order.
pub type ColumnMap = IndexMap<String, ColumnInfo>;

// =============================================================================
// Tests
// =============================================================================
