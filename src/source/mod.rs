//! Source stage
//!
//! A source produces the initial record batch of a pipeline run from an
//! external system. The only implementation is [`OpenMeteoSource`], which
//! fetches hourly observations from the Open-Meteo forecast API.

mod open_meteo;

pub use open_meteo::{OpenMeteoSource, COLUMN_HUMIDITY, COLUMN_TEMP, COLUMN_TIME};

use crate::error::Result;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

/// Produces the record batch a pipeline run starts from
#[async_trait]
pub trait Source: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Fetch the data and build a batch. Called once per run.
    async fn extract(&self) -> Result<RecordBatch>;
}

#[cfg(test)]
mod tests;
