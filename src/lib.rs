// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # Weather ETL
//!
//! A small extract-transform-load pipeline for hourly weather observations.
//!
//! ## Features
//!
//! - **Extraction**: One request to the Open-Meteo forecast API per run
//! - **Feature derivation**: Fahrenheit, temperature bucket, calendar fields,
//!   daytime flag and a simple heat index
//! - **Arrow batches**: Every stage exchanges an Arrow `RecordBatch`
//! - **Outputs**: CSV or JSON files, or an idempotent upsert into Postgres
//!   (or a local DuckDB file)
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use weather_etl::{FileSink, OpenMeteoSource, Pipeline, Result, SourceConfig, WeatherFeatures};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let source = OpenMeteoSource::new(SourceConfig::default())?;
//!     let pipeline = Pipeline::new(
//!         Box::new(source),
//!         vec![Box::new(WeatherFeatures::new())],
//!         Box::new(FileSink::csv("output/weather_data.csv")),
//!     );
//!
//!     let summary = pipeline.run().await?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   RecordBatch   ┌─────────────────┐   RecordBatch   ┌──────────────┐
//! │    Source    │ ──────────────▶ │  Transformer(s) │ ──────────────▶ │     Sink     │
//! │  Open-Meteo  │  time/temp/hum  │ WeatherFeatures │  + 6 derived    │ CSV / JSON / │
//! │   (reqwest)  │                 │     (arrow)     │                 │ SQL (duckdb) │
//! └──────────────┘                 └─────────────────┘                 └──────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the pipeline
pub mod error;

/// Common types and type aliases
pub mod types;

/// Run configuration and stage settings
pub mod config;

/// Record batch helpers
pub mod batch;

/// HTTP client
pub mod http;

/// Extract stage
pub mod source;

/// Transform stage
pub mod transform;

/// Load stage
pub mod sink;

/// SQL generation and DuckDB sessions
pub mod database;

/// Stage orchestration
pub mod pipeline;

/// Command-line interface
pub mod cli;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, ErrorCategory, Result};
pub use types::*;

// Re-export commonly used types
pub use config::{DatabaseConfig, FileSinkConfig, PipelineConfig, Settings, SourceConfig};
pub use pipeline::{Pipeline, RunSummary};
pub use sink::{DatabaseSink, FileSink, Sink};
pub use source::{OpenMeteoSource, Source};
pub use transform::{NormalizeColumns, Transformer, WeatherFeatures};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
