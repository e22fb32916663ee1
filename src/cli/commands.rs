//! CLI commands and argument parsing

use crate::config::DEFAULT_BATCH_SIZE;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Weather ETL pipeline CLI
#[derive(Parser, Debug)]
#[command(name = "weather-etl")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Verbose (info) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format: csv, json or postgres
    #[arg(short = 'f', long, global = true, default_value = "csv")]
    pub output_format: String,

    /// Rows per batch (accepted, currently unused)
    #[arg(long, global = true, default_value_t = DEFAULT_BATCH_SIZE)]
    pub batch_size: usize,

    /// Settings file (YAML)
    #[arg(short, long, global = true)]
    pub settings: Option<PathBuf>,

    /// Directory for file output, overrides the settings file
    #[arg(short, long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the pipeline once
    Pipeline,
}

impl Cli {
    /// Log level implied by the flags. `--debug` wins over `--verbose`.
    pub fn log_level(&self) -> tracing::Level {
        if self.debug {
            tracing::Level::DEBUG
        } else if self.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }
}
