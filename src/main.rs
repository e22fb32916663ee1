// Allow common clippy pedantic lints
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

//! Weather ETL CLI
//!
//! Command-line entry point for running the weather pipeline

use clap::Parser;
use tracing_subscriber::EnvFilter;
use weather_etl::cli::{Cli, Runner};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Initialize logging: RUST_LOG wins, otherwise the level implied by the flags
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(cli.log_level().as_str().to_lowercase()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let runner = Runner::new(cli);

    if let Err(e) = runner.run().await {
        eprintln!("Error ({}): {e}", e.category());
        std::process::exit(1);
    }
}
