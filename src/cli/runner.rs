//! CLI runner - executes commands

use crate::cli::commands::{Cli, Commands};
use crate::config::{PipelineConfig, Settings};
use crate::error::Result;
use crate::pipeline::{Pipeline, RunSummary};
use crate::sink::{DatabaseSink, FileSink, Sink};
use crate::source::OpenMeteoSource;
use crate::transform::{Transformer, WeatherFeatures};
use crate::types::{DatabaseEngine, OutputFormat};
use tracing::{debug, info};

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Pipeline => {
                let summary = self.pipeline().await?;
                println!("Pipeline complete: {summary}");
                Ok(())
            }
        }
    }

    /// Build and run the pipeline once
    pub async fn pipeline(&self) -> Result<RunSummary> {
        // Flags are checked before any file, network or database access
        let config = self.pipeline_config()?;
        let settings = self.load_settings()?;
        let pipeline = Self::build_pipeline(&config, settings)?;
        pipeline.run().await
    }

    /// Run-level config from the flags
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let config = PipelineConfig::new(
            self.cli.debug,
            self.cli.verbose,
            &self.cli.output_format,
            self.cli.batch_size,
        )?;
        debug!("Pipeline config: {:?}", config);
        Ok(config)
    }

    /// Stage settings from the settings file (or defaults), with command-line
    /// and environment overrides applied
    pub fn load_settings(&self) -> Result<Settings> {
        let mut settings = match &self.cli.settings {
            Some(path) => Settings::from_file(path)?,
            None => Settings::default(),
        };

        if let Some(dir) = &self.cli.output_dir {
            settings.output.dir.clone_from(dir);
        }
        if settings.database.engine == DatabaseEngine::Postgres {
            settings.database.apply_env()?;
        }

        settings.validate()?;
        Ok(settings)
    }

    /// Wire source, transformers and sink for the configured output format
    pub fn build_pipeline(config: &PipelineConfig, settings: Settings) -> Result<Pipeline> {
        info!(
            "batch_size={} accepted; extraction is a single request, so it is unused",
            config.batch_size()
        );

        let source = OpenMeteoSource::new(settings.source)?;
        let coordinates = source.coordinates();

        let sink: Box<dyn Sink> = match config.output_format() {
            format @ (OutputFormat::Csv | OutputFormat::Json) => {
                Box::new(FileSink::new(&settings.output, format)?)
            }
            OutputFormat::Postgres => Box::new(DatabaseSink::new(settings.database, coordinates)?),
        };

        let transformers: Vec<Box<dyn Transformer>> = vec![Box::new(WeatherFeatures::new())];

        Ok(Pipeline::new(Box::new(source), transformers, sink))
    }
}
