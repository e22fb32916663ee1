//! Transformer stage
//!
//! A transformer consumes a record batch and returns a new one with extra or
//! rewritten columns. Transformers are pure: they do no I/O besides logging.
//! A pipeline applies its transformers in order, each exactly once.

mod features;

pub use features::{
    parse_timestamp, WeatherFeatures, DAYTIME_END_HOUR, DAYTIME_START_HOUR, DERIVED_COLUMNS,
    HUMIDITY_WEIGHT,
};

use crate::batch;
use crate::error::Result;
use arrow::record_batch::RecordBatch;

/// Derives a new record batch from an existing one
pub trait Transformer: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Transform the batch. Takes ownership; the input is not reused.
    fn transform(&self, batch: RecordBatch) -> Result<RecordBatch>;
}

/// Only trims and lower-cases column names
#[derive(Debug, Clone, Copy, Default)]
pub struct NormalizeColumns;

impl Transformer for NormalizeColumns {
    fn name(&self) -> &str {
        "normalize-columns"
    }

    fn transform(&self, batch: RecordBatch) -> Result<RecordBatch> {
        batch::normalize_columns(batch)
    }
}
