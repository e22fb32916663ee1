//! Pipeline orchestration
//!
//! Runs one extract → transform → load pass:
//!
//! 1. The source produces a record batch
//! 2. Each transformer is applied once, in order
//! 3. The sink persists the final batch
//!
//! Stages run strictly one after another. The first error aborts the run and
//! is returned unchanged; later stages are not invoked.

mod types;

pub use types::RunSummary;

use crate::batch;
use crate::error::Result;
use crate::sink::Sink;
use crate::source::Source;
use crate::transform::Transformer;
use std::time::Instant;
use tracing::{debug, info};

/// An extract-transform-load pipeline
pub struct Pipeline {
    source: Box<dyn Source>,
    transformers: Vec<Box<dyn Transformer>>,
    sink: Box<dyn Sink>,
}

impl Pipeline {
    /// Create a pipeline. Transformers run in the given order.
    pub fn new(
        source: Box<dyn Source>,
        transformers: Vec<Box<dyn Transformer>>,
        sink: Box<dyn Sink>,
    ) -> Self {
        Self {
            source,
            transformers,
            sink,
        }
    }

    /// Names of the stages, source first and sink last
    pub fn stages(&self) -> Vec<&str> {
        let mut names = Vec::with_capacity(self.transformers.len() + 2);
        names.push(self.source.name());
        names.extend(self.transformers.iter().map(|t| t.name()));
        names.push(self.sink.name());
        names
    }

    /// Run the pipeline once
    pub async fn run(&self) -> Result<RunSummary> {
        let start = Instant::now();
        info!("Starting pipeline: {}", self.stages().join(" -> "));

        debug!("Extracting from {}", self.source.name());
        let mut batch = self.source.extract().await?;
        info!(
            "Extracted {} rows x {} columns",
            batch.num_rows(),
            batch.num_columns()
        );
        debug!("Extracted batch has {} null values", batch::null_count(&batch));

        for transformer in &self.transformers {
            debug!("Applying {}", transformer.name());
            batch = transformer.transform(batch)?;
            debug!(
                "{} produced {} columns",
                transformer.name(),
                batch.num_columns()
            );
        }

        debug!("Loading into {}", self.sink.name());
        self.sink.load(&batch).await?;

        let summary = RunSummary {
            rows: batch.num_rows(),
            columns: batch.num_columns(),
            elapsed: start.elapsed(),
        };
        info!("Pipeline finished: {}", summary);

        Ok(summary)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stages())
            .finish()
    }
}
