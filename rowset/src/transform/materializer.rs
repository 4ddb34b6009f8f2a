//! In-place row materialization.
//!
//! Rewrites each raw row array into the keyed object produced by a
//! compiled [`RowBuilder`]. Row order and count are preserved.

use log::debug;
use serde_json::Value;

use super::builder::{RowBuilder, RowDecorator};
use crate::error::{RowSetError, RowSetResult};
use crate::models::type_name;

/// Replace every row in `rows` with its keyed object.
///
/// Stops at the first row that is not an array of `builder.width()` values.
/// Rows before it stay materialized and the offending row is left as it was.
pub fn materialize(
    rows: &mut [Value],
    builder: &RowBuilder,
    decorator: Option<&RowDecorator>,
) -> RowSetResult<()> {
    for (row_index, row) in rows.iter_mut().enumerate() {
        let values = match row.take() {
            Value::Array(values) => values,
            other => {
                let kind = type_name(&other);
                *row = other;
                return Err(RowSetError::malformed(format!(
                    "row {} is {}, expected an array",
                    row_index, kind
                )));
            }
        };

        if values.len() != builder.width() {
            let found = values.len();
            *row = Value::Array(values);
            return Err(RowSetError::malformed(format!(
                "row {} has {} values but {} columns are defined",
                row_index,
                found,
                builder.width()
            )));
        }

        *row = Value::Object(builder.build(values, row_index, decorator));
    }

    debug!("Materialized {} rows ({} fields each)", rows.len(), builder.len());
    Ok(())
}
