//! Record batch contract
//!
//! The tabular value passed between pipeline stages is an Arrow `RecordBatch`.
//! Arrow already guarantees that every column has the same length and that row
//! order is stable; this module adds the rest of the contract:
//!
//! - Column names are trimmed and lower-cased, and must stay unique after that
//! - Typed accessors that report a missing or mistyped column as a validation error
//! - Helpers to build a batch and to add or replace a column

#[cfg(test)]
mod tests;

use crate::error::{Error, Result};
use arrow::array::{
    Array, ArrayRef, AsArray, Float64Array, Int32Array, StringArray, TimestampSecondArray,
};
use arrow::datatypes::{
    DataType, Field, Float64Type, Int32Type, Schema, TimeUnit, TimestampSecondType,
};
use arrow::record_batch::RecordBatch;
use std::collections::HashSet;
use std::sync::Arc;

/// Trim and lower-case a column name. Idempotent.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Names of all columns, in order
pub fn column_names(batch: &RecordBatch) -> Vec<String> {
    batch
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect()
}

/// Rename every column to its normalized form.
///
/// Fails if two columns collapse onto the same name.
pub fn normalize_columns(batch: RecordBatch) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut seen = HashSet::with_capacity(schema.fields().len());
    let mut fields = Vec::with_capacity(schema.fields().len());

    for field in schema.fields() {
        let name = normalize_column_name(field.name());
        if name.is_empty() {
            return Err(Error::validation("Column name is empty after normalization"));
        }
        if !seen.insert(name.clone()) {
            return Err(Error::validation(format!(
                "Duplicate column '{name}' after normalization"
            )));
        }
        fields.push(field.as_ref().clone().with_name(name));
    }

    let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    RecordBatch::try_new(Arc::new(schema), batch.columns().to_vec())
        .map_err(|e| Error::validation(format!("Failed to rename columns: {e}")))
}

/// Build a batch from named columns. All columns must have the same length.
pub fn from_columns(columns: Vec<(&str, ArrayRef)>) -> Result<RecordBatch> {
    if columns.is_empty() {
        return Err(Error::validation("A record batch needs at least one column"));
    }

    let fields: Vec<Field> = columns
        .iter()
        .map(|(name, array)| Field::new(*name, array.data_type().clone(), true))
        .collect();
    let arrays: Vec<ArrayRef> = columns.into_iter().map(|(_, array)| array).collect();

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)
        .map_err(|e| Error::validation(format!("Failed to create RecordBatch: {e}")))
}

/// Append a column, or replace the column that already has this name.
pub fn with_column(batch: RecordBatch, name: &str, array: ArrayRef) -> Result<RecordBatch> {
    let name = normalize_column_name(name);
    let schema = batch.schema();
    let mut fields: Vec<Field> = schema.fields().iter().map(|f| f.as_ref().clone()).collect();
    let mut columns = batch.columns().to_vec();
    let field = Field::new(name.as_str(), array.data_type().clone(), true);

    match schema.index_of(&name) {
        Ok(index) => {
            fields[index] = field;
            columns[index] = array;
        }
        Err(_) => {
            fields.push(field);
            columns.push(array);
        }
    }

    let schema = Schema::new_with_metadata(fields, schema.metadata().clone());
    RecordBatch::try_new(Arc::new(schema), columns).map_err(|e| {
        Error::validation(format!("Failed to add column '{name}': {e}"))
    })
}

/// Look up a column by name
pub fn column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a ArrayRef> {
    batch
        .column_by_name(name)
        .ok_or_else(|| Error::missing_column(name))
}

/// Read a numeric column as Float64, casting integer columns
pub fn float_column(batch: &RecordBatch, name: &str) -> Result<Float64Array> {
    let array = column(batch, name)?;
    if !array.data_type().is_numeric() {
        return Err(type_mismatch(name, "numeric", array.data_type()));
    }
    let cast = arrow::compute::cast(array, &DataType::Float64)
        .map_err(|e| Error::validation(format!("Column '{name}' is not numeric: {e}")))?;
    Ok(cast.as_primitive::<Float64Type>().clone())
}

/// Read an integer column as Int32
pub fn int_column(batch: &RecordBatch, name: &str) -> Result<Int32Array> {
    let array = column(batch, name)?;
    if !array.data_type().is_integer() {
        return Err(type_mismatch(name, "integer", array.data_type()));
    }
    let cast = arrow::compute::cast(array, &DataType::Int32)
        .map_err(|e| Error::validation(format!("Column '{name}' does not fit Int32: {e}")))?;
    Ok(cast.as_primitive::<Int32Type>().clone())
}

/// Read a Utf8 column
pub fn string_column(batch: &RecordBatch, name: &str) -> Result<StringArray> {
    let array = column(batch, name)?;
    array
        .as_string_opt::<i32>()
        .cloned()
        .ok_or_else(|| type_mismatch(name, "string", array.data_type()))
}

/// Read a second-resolution timestamp column
pub fn timestamp_column(batch: &RecordBatch, name: &str) -> Result<TimestampSecondArray> {
    let array = column(batch, name)?;
    match array.data_type() {
        DataType::Timestamp(TimeUnit::Second, _) => {
            Ok(array.as_primitive::<TimestampSecondType>().clone())
        }
        other => Err(type_mismatch(name, "timestamp", other)),
    }
}

/// Count of null slots across all columns
pub fn null_count(batch: &RecordBatch) -> usize {
    batch.columns().iter().map(|c| c.null_count()).sum()
}

fn type_mismatch(name: &str, expected: &str, actual: &DataType) -> Error {
    Error::validation(format!(
        "Column '{name}' must be {expected}, found {actual}"
    ))
}
