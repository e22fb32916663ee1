//! SQL rendering for the weather observation table
//!
//! The upsert is one multi-row `INSERT ... ON CONFLICT` statement. Values are
//! rendered as literals so the same text runs on DuckDB and, passed through,
//! on PostgreSQL. Only numbers, timestamps, and escaped category labels are
//! ever interpolated; the table name is validated as an identifier upstream.

use super::session::escape_literal;
use crate::batch;
use crate::error::{Error, Result};
use crate::types::{Coordinates, DatabaseEngine};
use arrow::array::Array;
use arrow::record_batch::RecordBatch;
use chrono::NaiveDateTime;
use std::collections::HashMap;

/// Columns written by the upsert, in statement order
pub const INSERT_COLUMNS: [&str; 11] = [
    "time",
    "lat",
    "lon",
    "temp",
    "temp_f",
    "temp_category",
    "humidity",
    "hour",
    "day_of_week",
    "is_daytime",
    "heat_index",
];

/// Composite key of an observation
pub const KEY_COLUMNS: [&str; 3] = ["time", "lat", "lon"];

/// One row of the observation table
#[derive(Debug, Clone, PartialEq)]
pub struct ObservationRow {
    pub time: NaiveDateTime,
    pub lat: f64,
    pub lon: f64,
    pub temp: Option<f64>,
    pub temp_f: Option<f64>,
    pub temp_category: Option<String>,
    pub humidity: Option<i32>,
    pub hour: Option<i32>,
    pub day_of_week: Option<i32>,
    pub is_daytime: Option<i32>,
    pub heat_index: Option<f64>,
}

/// Convert a transformed batch into table rows.
///
/// Coordinates are not part of the batch and are supplied by the caller.
/// Rows with the same timestamp collapse into the last one, keeping the
/// position of the first.
pub fn observation_rows(batch: &RecordBatch, coordinates: Coordinates) -> Result<Vec<ObservationRow>> {
    let time = batch::timestamp_column(batch, "time")?;
    let temp = batch::float_column(batch, "temp")?;
    let temp_f = batch::float_column(batch, "temp_f")?;
    let temp_category = batch::string_column(batch, "temp_category")?;
    let humidity = batch::float_column(batch, "humidity")?;
    let hour = batch::int_column(batch, "hour")?;
    let day_of_week = batch::int_column(batch, "day_of_week")?;
    let is_daytime = batch::int_column(batch, "is_daytime")?;
    let heat_index = batch::float_column(batch, "heat_index")?;

    let mut rows: Vec<ObservationRow> = Vec::with_capacity(batch.num_rows());
    let mut positions: HashMap<NaiveDateTime, usize> = HashMap::new();

    for i in 0..batch.num_rows() {
        let ts = if time.is_valid(i) {
            time.value_as_datetime(i)
        } else {
            None
        }
        .ok_or_else(|| Error::validation(format!("Row {i}: time is null or out of range")))?;

        let row = ObservationRow {
            time: ts,
            lat: coordinates.latitude,
            lon: coordinates.longitude,
            temp: temp.is_valid(i).then(|| temp.value(i)),
            temp_f: temp_f.is_valid(i).then(|| temp_f.value(i)),
            temp_category: temp_category
                .is_valid(i)
                .then(|| temp_category.value(i).to_string()),
            humidity: humidity
                .is_valid(i)
                .then(|| humidity.value(i).round() as i32),
            hour: hour.is_valid(i).then(|| hour.value(i)),
            day_of_week: day_of_week.is_valid(i).then(|| day_of_week.value(i)),
            is_daytime: is_daytime.is_valid(i).then(|| is_daytime.value(i)),
            heat_index: heat_index.is_valid(i).then(|| heat_index.value(i)),
        };

        match positions.get(&ts) {
            Some(&pos) => rows[pos] = row,
            None => {
                positions.insert(ts, rows.len());
                rows.push(row);
            }
        }
    }

    Ok(rows)
}

/// Idempotent DDL for the observation table
pub fn create_table_sql(engine: DatabaseEngine, table: &str) -> Vec<String> {
    let columns = r#""time" TIMESTAMP NOT NULL,
    "lat" DOUBLE PRECISION NOT NULL,
    "lon" DOUBLE PRECISION NOT NULL,
    "temp" DOUBLE PRECISION,
    "temp_f" DOUBLE PRECISION,
    "temp_category" VARCHAR(20),
    "humidity" INTEGER,
    "hour" INTEGER,
    "day_of_week" INTEGER,
    "is_daytime" INTEGER,
    "heat_index" DOUBLE PRECISION,
    UNIQUE ("time", "lat", "lon")"#;

    match engine {
        DatabaseEngine::Postgres => vec![format!(
            "CREATE TABLE IF NOT EXISTS {table} (\n    id SERIAL PRIMARY KEY,\n    {columns}\n);"
        )],
        DatabaseEngine::Duckdb => vec![
            format!("CREATE SEQUENCE IF NOT EXISTS {table}_id_seq;"),
            format!(
                "CREATE TABLE IF NOT EXISTS {table} (\n    id BIGINT PRIMARY KEY DEFAULT nextval('{table}_id_seq'),\n    {columns}\n);"
            ),
        ],
    }
}

/// Single batched upsert. On a key collision every non-key column takes the
/// incoming value.
pub fn upsert_sql(table: &str, rows: &[ObservationRow]) -> Result<String> {
    if rows.is_empty() {
        return Err(Error::validation("No rows to upsert"));
    }

    let columns: Vec<String> = INSERT_COLUMNS.iter().map(|c| quoted(c)).collect();
    let values: Vec<String> = rows.iter().map(row_values).collect();
    let updates: Vec<String> = INSERT_COLUMNS
        .iter()
        .filter(|c| !KEY_COLUMNS.contains(*c))
        .map(|c| format!("{0} = EXCLUDED.{0}", quoted(c)))
        .collect();

    let sql = format!(
        "INSERT INTO {table} ({})\nVALUES\n    {}\nON CONFLICT ({}) DO UPDATE SET\n    {};",
        columns.join(", "),
        values.join(",\n    "),
        KEY_COLUMNS.map(quoted).join(", "),
        updates.join(",\n    ")
    );

    Ok(sql)
}

/// Parenthesized literal tuple, in `INSERT_COLUMNS` order
fn row_values(row: &ObservationRow) -> String {
    let literals = [
        timestamp_literal(row.time),
        float_literal(Some(row.lat)),
        float_literal(Some(row.lon)),
        float_literal(row.temp),
        float_literal(row.temp_f),
        text_literal(row.temp_category.as_deref()),
        int_literal(row.humidity),
        int_literal(row.hour),
        int_literal(row.day_of_week),
        int_literal(row.is_daytime),
        float_literal(row.heat_index),
    ];
    format!("({})", literals.join(", "))
}

/// Column names such as `time` and `hour` are keywords in some dialects
fn quoted(column: &str) -> String {
    format!("\"{column}\"")
}

fn timestamp_literal(value: NaiveDateTime) -> String {
    format!("TIMESTAMP '{}'", value.format("%Y-%m-%d %H:%M:%S"))
}

/// Non-finite values have no SQL literal and are stored as NULL
fn float_literal(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => format!("{v:?}"),
        _ => "NULL".to_string(),
    }
}

fn int_literal(value: Option<i32>) -> String {
    value.map_or_else(|| "NULL".to_string(), |v| v.to_string())
}

fn text_literal(value: Option<&str>) -> String {
    value.map_or_else(|| "NULL".to_string(), |v| format!("'{}'", escape_literal(v)))
}

#[cfg(test)]
pub(super) fn literals_for_test(value: Option<f64>, text: Option<&str>) -> (String, String) {
    (float_literal(value), text_literal(text))
}
