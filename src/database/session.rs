//! Scoped DuckDB session

use crate::config::DatabaseConfig;
use crate::error::{Error, Result};
use crate::types::DatabaseEngine;
use duckdb::Connection;
use tracing::{debug, info};

/// Alias of the attached Postgres database inside DuckDB
const POSTGRES_ALIAS: &str = "weather_target";

/// An open connection to the target database
pub struct DatabaseSession {
    /// DuckDB connection
    conn: Connection,
    /// Database type
    engine: DatabaseEngine,
    /// Connection target (password masked)
    target: String,
}

impl DatabaseSession {
    /// Open a session. Any failure here is a connection error.
    pub fn connect(config: &DatabaseConfig) -> Result<Self> {
        let session = match config.engine {
            DatabaseEngine::Duckdb => {
                let conn = Connection::open(&config.database).map_err(|e| {
                    Error::connection(format!(
                        "Failed to open DuckDB database '{}': {e}",
                        config.database
                    ))
                })?;
                Self {
                    conn,
                    engine: DatabaseEngine::Duckdb,
                    target: config.database.clone(),
                }
            }
            DatabaseEngine::Postgres => {
                let conn = Connection::open_in_memory().map_err(|e| {
                    Error::connection(format!("Failed to create DuckDB connection: {e}"))
                })?;
                let connection_string = Self::build_connection_string(config)?;
                let session = Self {
                    conn,
                    engine: DatabaseEngine::Postgres,
                    target: mask_password(&connection_string),
                };
                session.attach_postgres(&connection_string)?;
                session
            }
        };

        info!("Connected to {}", session.target);
        Ok(session)
    }

    /// Build a `postgresql://` URL from config, percent-encoding credentials
    fn build_connection_string(config: &DatabaseConfig) -> Result<String> {
        let mut url = url::Url::parse(&format!("postgresql://{}", config.host))
            .map_err(|e| Error::invalid_value("database.host", e.to_string()))?;

        let invalid = |field: &str| Error::invalid_value(field, "cannot be set on this URL");
        url.set_port(Some(config.port()))
            .map_err(|()| invalid("database.port"))?;
        url.set_username(&config.user)
            .map_err(|()| invalid("database.user"))?;
        if !config.password.is_empty() {
            url.set_password(Some(&config.password))
                .map_err(|()| invalid("database.password"))?;
        }
        url.set_path(&format!("/{}", config.database.trim_start_matches('/')));

        Ok(url.to_string())
    }

    /// Load the postgres extension and attach the server
    fn attach_postgres(&self, connection_string: &str) -> Result<()> {
        self.conn
            .execute_batch("INSTALL postgres; LOAD postgres;")
            .map_err(|e| Error::connection(format!("Failed to load postgres extension: {e}")))?;

        let attach_sql = format!(
            "ATTACH '{}' AS {POSTGRES_ALIAS} (TYPE POSTGRES);",
            escape_literal(connection_string)
        );
        self.conn.execute_batch(&attach_sql).map_err(|e| {
            Error::connection(format!("Failed to attach PostgreSQL at {}: {e}", self.target))
        })?;

        Ok(())
    }

    /// Connection target for logging, password masked
    pub fn connection_info(&self) -> &str {
        &self.target
    }

    /// Statement as DuckDB should run it. Postgres statements are passed
    /// through to the server in their own dialect.
    fn wrap(&self, sql: &str) -> String {
        match self.engine {
            DatabaseEngine::Duckdb => sql.to_string(),
            DatabaseEngine::Postgres => format!(
                "CALL postgres_execute('{POSTGRES_ALIAS}', '{}');",
                escape_literal(sql)
            ),
        }
    }

    /// Run statements so that either all of them take effect or none do.
    ///
    /// On DuckDB they share one transaction, rolled back if any fails or if
    /// this returns early. On Postgres each statement is sent on its own and
    /// is atomic on the server, so callers pass one statement per call.
    pub fn execute_atomic(&mut self, statements: &[String]) -> Result<()> {
        match self.engine {
            DatabaseEngine::Duckdb => {
                let tx = self
                    .conn
                    .transaction()
                    .map_err(|e| Error::database(format!("Failed to begin transaction: {e}")))?;
                for statement in statements {
                    debug!("Executing: {}", abbreviate(statement));
                    tx.execute_batch(statement)
                        .map_err(|e| Error::database(format!("Statement failed: {e}")))?;
                }
                tx.commit()
                    .map_err(|e| Error::database(format!("Commit failed: {e}")))?;
            }
            DatabaseEngine::Postgres => {
                for statement in statements {
                    debug!("Executing on server: {}", abbreviate(statement));
                    self.conn
                        .execute_batch(&self.wrap(statement))
                        .map_err(|e| Error::database(format!("Statement failed: {e}")))?;
                }
            }
        }
        Ok(())
    }

    /// Number of rows in a table
    pub fn count_rows(&self, table: &str) -> Result<i64> {
        let query = match self.engine {
            DatabaseEngine::Duckdb => format!("SELECT COUNT(*) FROM {table}"),
            DatabaseEngine::Postgres => format!(
                "SELECT * FROM postgres_query('{POSTGRES_ALIAS}', 'SELECT COUNT(*) FROM {table}')"
            ),
        };
        self.conn
            .query_row(&query, [], |row| row.get(0))
            .map_err(|e| Error::database(format!("Failed to count rows in '{table}': {e}")))
    }
}

impl Drop for DatabaseSession {
    fn drop(&mut self) {
        debug!("Closing session to {}", self.target);
    }
}

impl std::fmt::Debug for DatabaseSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseSession")
            .field("engine", &self.engine)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

/// Double single quotes for use inside a SQL string literal
pub(crate) fn escape_literal(value: &str) -> String {
    value.replace('\'', "''")
}

/// Mask the password in a connection URL
fn mask_password(connection_string: &str) -> String {
    match url::Url::parse(connection_string) {
        Ok(mut url) if url.password().is_some() => {
            if url.set_password(Some("****")).is_ok() {
                url.to_string()
            } else {
                connection_string.to_string()
            }
        }
        _ => connection_string.to_string(),
    }
}

/// First line of a statement, for logs
fn abbreviate(statement: &str) -> &str {
    let statement = statement.trim_start();
    statement.lines().next().unwrap_or(statement)
}

#[cfg(test)]
pub(super) fn connection_string_for_test(config: &DatabaseConfig) -> Result<String> {
    DatabaseSession::build_connection_string(config)
}

#[cfg(test)]
pub(super) fn mask_for_test(connection_string: &str) -> String {
    mask_password(connection_string)
}
