//! Common types used throughout the pipeline
//!
//! This module contains shared enums and small value types used across
//! multiple modules.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Output Format
// ============================================================================

/// Destination format for the final record batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    /// Delimited text file with a header row
    #[default]
    Csv,
    /// JSON array of row objects
    Json,
    /// Relational table, written with an upsert
    Postgres,
}

impl OutputFormat {
    /// All accepted literals, in declaration order
    pub const ALL: [&'static str; 3] = ["csv", "json", "postgres"];

    /// Literal name of the format
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Json => "json",
            OutputFormat::Postgres => "postgres",
        }
    }

    /// File extension for file-based formats
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            OutputFormat::Csv => Some("csv"),
            OutputFormat::Json => Some("json"),
            OutputFormat::Postgres => None,
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            "postgres" => Ok(OutputFormat::Postgres),
            other => Err(Error::invalid_value(
                "output_format",
                format!(
                    "'{other}' is not supported, must be one of: {}",
                    OutputFormat::ALL.join(", ")
                ),
            )),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Temperature Category
// ============================================================================

/// Threshold below which a reading is `Cold`, in °C
pub const COLD_BELOW_C: f64 = 15.0;

/// Threshold below which a reading is `Mild`, in °C
pub const MILD_BELOW_C: f64 = 25.0;

/// Categorical bucket for a temperature reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TempCategory {
    Cold,
    Mild,
    Hot,
}

impl TempCategory {
    /// Bucket a Celsius reading. The cold threshold is checked first.
    pub fn from_celsius(temp: f64) -> Self {
        if temp < COLD_BELOW_C {
            TempCategory::Cold
        } else if temp < MILD_BELOW_C {
            TempCategory::Mild
        } else {
            TempCategory::Hot
        }
    }

    /// Label written to the output
    pub fn as_str(&self) -> &'static str {
        match self {
            TempCategory::Cold => "Cold",
            TempCategory::Mild => "Mild",
            TempCategory::Hot => "Hot",
        }
    }
}

impl fmt::Display for TempCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Database Engine
// ============================================================================

/// Relational backend for the database sink
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseEngine {
    /// PostgreSQL server, attached through DuckDB's postgres extension
    #[default]
    Postgres,
    /// Local DuckDB database file
    Duckdb,
}

impl DatabaseEngine {
    /// Default port for the engine (0 when not network based)
    pub fn default_port(&self) -> u16 {
        match self {
            DatabaseEngine::Postgres => 5432,
            DatabaseEngine::Duckdb => 0,
        }
    }
}

// ============================================================================
// Coordinates
// ============================================================================

/// A latitude/longitude pair in decimal degrees. No range validation is done.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("csv", OutputFormat::Csv)]
    #[test_case("json", OutputFormat::Json)]
    #[test_case("postgres", OutputFormat::Postgres)]
    fn test_output_format_parse(input: &str, expected: OutputFormat) {
        assert_eq!(input.parse::<OutputFormat>().unwrap(), expected);
        assert_eq!(expected.to_string(), input);
    }

    #[test_case("xml")]
    #[test_case("CSV")]
    #[test_case("")]
    fn test_output_format_rejects_unknown(input: &str) {
        let err = input.parse::<OutputFormat>().unwrap_err();
        assert!(matches!(err, Error::InvalidConfigValue { .. }));
    }

    #[test]
    fn test_output_format_extension() {
        assert_eq!(OutputFormat::Csv.extension(), Some("csv"));
        assert_eq!(OutputFormat::Json.extension(), Some("json"));
        assert_eq!(OutputFormat::Postgres.extension(), None);
    }

    #[test_case(14.9, TempCategory::Cold)]
    #[test_case(15.0, TempCategory::Mild)]
    #[test_case(24.9, TempCategory::Mild)]
    #[test_case(25.0, TempCategory::Hot)]
    #[test_case(-40.0, TempCategory::Cold)]
    fn test_temp_category_boundaries(temp: f64, expected: TempCategory) {
        assert_eq!(TempCategory::from_celsius(temp), expected);
    }

    #[test]
    fn test_database_engine_serde() {
        let engine: DatabaseEngine = serde_yaml::from_str("duckdb").unwrap();
        assert_eq!(engine, DatabaseEngine::Duckdb);
        assert_eq!(DatabaseEngine::Postgres.default_port(), 5432);
    }
}
