//! Sink stage
//!
//! A sink persists the final record batch of a run.
//!
//! - [`FileSink`] writes a CSV or JSON file, replacing any previous file
//! - [`DatabaseSink`] upserts rows into a relational table keyed on
//!   `(time, lat, lon)` in a single statement

mod database;
mod file;

pub use database::DatabaseSink;
pub use file::FileSink;

use crate::error::Result;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;

/// Persists a record batch
#[async_trait]
pub trait Sink: Send + Sync {
    /// Short name used in logs
    fn name(&self) -> &str;

    /// Write the batch. Called once per run.
    async fn load(&self, batch: &RecordBatch) -> Result<()>;
}
