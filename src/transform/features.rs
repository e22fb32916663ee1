//! Weather feature derivation
//!
//! Adds the engineered columns to a `time`/`temp`/`humidity` batch:
//!
//! | column          | derivation                                   |
//! |-----------------|----------------------------------------------|
//! | `temp_f`        | `temp * 1.8 + 32`                            |
//! | `temp_category` | `Cold` below 15 °C, `Mild` below 25 °C, else `Hot` |
//! | `hour`          | hour of day of `time` (0-23)                 |
//! | `day_of_week`   | Monday = 0 ... Sunday = 6                    |
//! | `is_daytime`    | 1 if `6 <= hour <= 18`, else 0               |
//! | `heat_index`    | `temp + humidity * 0.05`                     |
//!
//! `time` itself is replaced by a parsed second-resolution timestamp.
//! Nulls in the inputs stay null in every derived column.

use super::Transformer;
use crate::batch;
use crate::error::{Error, Result};
use crate::source::{COLUMN_HUMIDITY, COLUMN_TEMP, COLUMN_TIME};
use crate::types::TempCategory;
use arrow::array::{Array, Float64Array, Int32Array, StringArray, TimestampSecondArray};
use arrow::compute::kernels::arity::binary;
use arrow::datatypes::Float64Type;
use arrow::record_batch::RecordBatch;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike};
use std::sync::Arc;
use tracing::{debug, error};

/// First hour counted as daytime
pub const DAYTIME_START_HOUR: u32 = 6;

/// Last hour counted as daytime (inclusive)
pub const DAYTIME_END_HOUR: u32 = 18;

/// Weight of relative humidity in the heat index
pub const HUMIDITY_WEIGHT: f64 = 0.05;

/// Columns added by [`WeatherFeatures`]
pub const DERIVED_COLUMNS: [&str; 6] = [
    "temp_f",
    "temp_category",
    "hour",
    "day_of_week",
    "is_daytime",
    "heat_index",
];

/// Naive timestamp layouts accepted for `time`, tried in order
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse an observation timestamp.
///
/// Accepts the API's `YYYY-MM-DDTHH:MM` form, the same with seconds or a space
/// separator, a bare date (midnight), and RFC 3339 (converted to UTC).
pub fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();

    for format in NAIVE_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(value) {
        return Some(parsed.naive_utc());
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

/// Derives the engineered weather columns
#[derive(Debug, Clone, Copy, Default)]
pub struct WeatherFeatures;

impl WeatherFeatures {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for WeatherFeatures {
    fn name(&self) -> &str {
        "weather-features"
    }

    fn transform(&self, batch: RecordBatch) -> Result<RecordBatch> {
        derive_features(batch).inspect_err(|e| {
            error!("Feature derivation failed: {}", e);
        })
    }
}

fn derive_features(batch: RecordBatch) -> Result<RecordBatch> {
    for derived in DERIVED_COLUMNS {
        if batch.column_by_name(derived).is_some() {
            return Err(Error::validation(format!(
                "Batch already has derived column '{derived}', features must be applied once"
            )));
        }
    }

    let temp = batch::float_column(&batch, COLUMN_TEMP)?;
    let humidity = batch::float_column(&batch, COLUMN_HUMIDITY)?;
    let raw_time = batch::string_column(&batch, COLUMN_TIME)?;

    let times = parse_times(&raw_time)?;

    let temp_f = temp.unary::<_, Float64Type>(|t| t * 1.8 + 32.0);
    let temp_category: StringArray = temp
        .iter()
        .map(|t| t.map(|v| TempCategory::from_celsius(v).as_str()))
        .collect();
    let heat_index: Float64Array = binary(&temp, &humidity, |t, h| t + h * HUMIDITY_WEIGHT)?;

    let timestamps: TimestampSecondArray = times
        .iter()
        .map(|t| t.map(|dt| dt.and_utc().timestamp()))
        .collect();
    let hour: Int32Array = times.iter().map(|t| t.map(|dt| dt.hour() as i32)).collect();
    let day_of_week: Int32Array = times
        .iter()
        .map(|t| t.map(|dt| dt.weekday().num_days_from_monday() as i32))
        .collect();
    let is_daytime: Int32Array = times
        .iter()
        .map(|t| t.map(|dt| i32::from(is_daytime_hour(dt.hour()))))
        .collect();

    let mut batch = batch::with_column(batch, COLUMN_TIME, Arc::new(timestamps))?;
    batch = batch::with_column(batch, "temp_f", Arc::new(temp_f))?;
    batch = batch::with_column(batch, "temp_category", Arc::new(temp_category))?;
    batch = batch::with_column(batch, "hour", Arc::new(hour))?;
    batch = batch::with_column(batch, "day_of_week", Arc::new(day_of_week))?;
    batch = batch::with_column(batch, "is_daytime", Arc::new(is_daytime))?;
    batch = batch::with_column(batch, "heat_index", Arc::new(heat_index))?;

    debug!(
        "Derived {} columns over {} rows",
        DERIVED_COLUMNS.len(),
        batch.num_rows()
    );

    batch::normalize_columns(batch)
}

/// 1 for hours in the inclusive daytime window
pub(crate) fn is_daytime_hour(hour: u32) -> bool {
    (DAYTIME_START_HOUR..=DAYTIME_END_HOUR).contains(&hour)
}

fn parse_times(raw: &StringArray) -> Result<Vec<Option<NaiveDateTime>>> {
    let mut parsed = Vec::with_capacity(raw.len());
    for (row, value) in raw.iter().enumerate() {
        match value {
            None => parsed.push(None),
            Some(text) => {
                let ts = parse_timestamp(text).ok_or_else(|| {
                    Error::validation(format!(
                        "Row {row}: cannot parse time value '{text}' as a timestamp"
                    ))
                })?;
                parsed.push(Some(ts));
            }
        }
    }
    Ok(parsed)
}
