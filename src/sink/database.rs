//! Relational sink with an idempotent upsert

use super::Sink;
use crate::config::DatabaseConfig;
use crate::database::sql::{create_table_sql, upsert_sql};
use crate::database::{observation_rows, DatabaseSession};
use crate::error::{ErrorCategory, Result};
use crate::types::{Coordinates, DatabaseEngine};
use arrow::record_batch::RecordBatch;
use async_trait::async_trait;
use tracing::{debug, error, info};

/// Upserts observations into a table keyed on `(time, lat, lon)`.
///
/// The batch carries no coordinates, so the sink is given the pair the source
/// was configured with and stamps it on every row.
#[derive(Debug, Clone)]
pub struct DatabaseSink {
    config: DatabaseConfig,
    coordinates: Coordinates,
}

impl DatabaseSink {
    /// Create a sink. Fails if the table name is not a plain identifier.
    pub fn new(config: DatabaseConfig, coordinates: Coordinates) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            coordinates,
        })
    }

    /// Target table
    pub fn table(&self) -> &str {
        &self.config.table
    }

    fn write(&self, batch: &RecordBatch) -> Result<()> {
        // Dropped on every path out of this function, which closes the connection
        let mut session = DatabaseSession::connect(&self.config)?;
        debug!("Session open: {}", session.connection_info());

        session.execute_atomic(&create_table_sql(self.config.engine, &self.config.table))?;
        info!("Table '{}' ensured to exist", self.config.table);

        let rows = observation_rows(batch, self.coordinates)?;
        if rows.is_empty() {
            info!("No rows to write to '{}'", self.config.table);
            return Ok(());
        }

        let statement = upsert_sql(&self.config.table, &rows)?;
        session.execute_atomic(&[statement])?;
        info!(
            "Inserted/updated {} rows in '{}'",
            rows.len(),
            self.config.table
        );

        if tracing::enabled!(tracing::Level::DEBUG) {
            match session.count_rows(&self.config.table) {
                Ok(total) => debug!("Table '{}' now holds {} rows", self.config.table, total),
                Err(e) => debug!("Could not count rows: {}", e),
            }
        }

        Ok(())
    }
}

#[async_trait]
impl Sink for DatabaseSink {
    fn name(&self) -> &str {
        match self.config.engine {
            DatabaseEngine::Postgres => "postgres",
            DatabaseEngine::Duckdb => "duckdb",
        }
    }

    async fn load(&self, batch: &RecordBatch) -> Result<()> {
        self.write(batch).inspect_err(|e| match e.category() {
            ErrorCategory::Connection => error!("Connection error: {}", e),
            ErrorCategory::Database => error!("Database error: {}", e),
            _ => error!("Unexpected error while inserting data: {}", e),
        })
    }
}
