//! Relational storage via DuckDB
//!
//! A [`DatabaseSession`] owns one DuckDB connection for the duration of a load.
//! Local DuckDB files are opened directly; PostgreSQL servers are attached
//! through DuckDB's postgres extension and statements are passed through to the
//! server unchanged. The session is released when it is dropped, on every path.
//!
//! [`sql`] renders the weather table DDL and the batched upsert statement.

mod session;
pub mod sql;

pub use session::DatabaseSession;
pub use sql::{observation_rows, ObservationRow};
