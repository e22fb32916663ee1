//! CSV and JSON file sink

use super::Sink;
use crate::config::FileSinkConfig;
use crate::error::{Error, Result, ResultExt};
use crate::types::OutputFormat;
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// Timestamp layout used in file output
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Writes the batch to one file, overwriting it on every run
#[derive(Debug, Clone)]
pub struct FileSink {
    path: PathBuf,
    format: OutputFormat,
}

impl FileSink {
    /// Create a sink for a file format. Fails for non-file formats.
    pub fn new(config: &FileSinkConfig, format: OutputFormat) -> Result<Self> {
        let path = config.path_for(format)?;
        Ok(Self { path, format })
    }

    /// Create a CSV sink at an explicit path
    pub fn csv(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: OutputFormat::Csv,
        }
    }

    /// Create a JSON sink at an explicit path
    pub fn json(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            format: OutputFormat::Json,
        }
    }

    /// Target file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, batch: &RecordBatch) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let file = File::create(&self.path).map_err(|e| {
            Error::output(format!("Failed to create {}: {e}", self.path.display()))
        })?;
        let out = BufWriter::new(file);

        let mut out = match self.format {
            OutputFormat::Csv => {
                let mut writer = arrow::csv::WriterBuilder::new()
                    .with_header(true)
                    .with_timestamp_format(TIMESTAMP_FORMAT.to_string())
                    .build(out);
                writer.write(batch)?;
                writer.into_inner()
            }
            OutputFormat::Json => {
                let mut writer = arrow::json::ArrayWriter::new(out);
                writer.write(batch)?;
                writer.finish()?;
                writer.into_inner()
            }
            OutputFormat::Postgres => {
                return Err(Error::config("The postgres format does not write files"));
            }
        };
        out.flush()?;

        Ok(())
    }
}

#[async_trait]
impl Sink for FileSink {
    fn name(&self) -> &str {
        self.format.as_str()
    }

    async fn load(&self, batch: &RecordBatch) -> Result<()> {
        debug!("Writing {} to {}", self.format, self.path.display());

        self.write(batch).inspect_err(|e| {
            error!("Failed to write {}: {}", self.path.display(), e);
        })?;

        info!(
            "Wrote {} rows to {}",
            batch.num_rows(),
            self.path.display()
        );
        Ok(())
    }
}
