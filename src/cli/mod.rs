//! CLI module
//!
//! Command-line interface for running the weather pipeline.
//!
//! # Commands
//!
//! - `pipeline` - Fetch, enrich and store one run of hourly observations

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
