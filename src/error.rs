//! Error types for the weather pipeline
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.
//! No stage recovers from an error: each one is logged where it is detected
//! and then handed back to the caller unchanged.

use thiserror::Error;

/// The main error type for the pipeline
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    // ============================================================================
    // Network Errors
    // ============================================================================
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    #[error("Request timeout after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ============================================================================
    // Validation Errors
    // ============================================================================
    #[error("Validation failed: {message}")]
    Validation { message: String },

    #[error("Missing required column: {column}")]
    MissingColumn { column: String },

    #[error("Failed to decode response: {message}")]
    Decode { message: String },

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Database Errors
    // ============================================================================
    #[error("Database connection failed: {message}")]
    Connection { message: String },

    #[error("Database error: {message}")]
    Database { message: String },

    // ============================================================================
    // Output Errors
    // ============================================================================
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Output error: {message}")]
    Output { message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

/// Broad classification of an [`Error`], used for logging and exit reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Unreachable API or non-success HTTP status
    Network,
    /// Malformed or missing fields in stage input
    Validation,
    /// Invalid configuration, detected before any stage runs
    Config,
    /// The relational sink could not establish a session
    Connection,
    /// Schema or statement execution failure
    Database,
    /// Writing a file or building an Arrow batch failed
    Output,
    /// Anything else
    Other,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCategory::Network => "network",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Config => "config",
            ErrorCategory::Connection => "connection",
            ErrorCategory::Database => "database",
            ErrorCategory::Output => "output",
            ErrorCategory::Other => "other",
        };
        f.write_str(name)
    }
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http_status(status: u16, body: impl Into<String>) -> Self {
        Self::HttpStatus {
            status,
            body: body.into(),
        }
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a missing column error
    pub fn missing_column(column: impl Into<String>) -> Self {
        Self::MissingColumn {
            column: column.into(),
        }
    }

    /// Create a decode error
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }

    /// Create a connection error
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a database error
    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }

    /// Create an output error
    pub fn output(message: impl Into<String>) -> Self {
        Self::Output {
            message: message.into(),
        }
    }

    /// Classify this error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::Config { .. } | Error::InvalidConfigValue { .. } | Error::YamlParse(_) => {
                ErrorCategory::Config
            }
            Error::Http(_)
            | Error::HttpStatus { .. }
            | Error::Timeout { .. }
            | Error::InvalidUrl(_) => ErrorCategory::Network,
            Error::Validation { .. }
            | Error::MissingColumn { .. }
            | Error::Decode { .. }
            | Error::JsonParse(_) => ErrorCategory::Validation,
            Error::Connection { .. } => ErrorCategory::Connection,
            Error::Database { .. } => ErrorCategory::Database,
            Error::Arrow(_) | Error::Output { .. } | Error::Io(_) => ErrorCategory::Output,
            Error::Other(_) => ErrorCategory::Other,
        }
    }
}

/// Result type alias for the pipeline
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::config("test message");
        assert_eq!(err.to_string(), "Configuration error: test message");

        let err = Error::missing_column("temp");
        assert_eq!(err.to_string(), "Missing required column: temp");

        let err = Error::http_status(404, "Not found");
        assert_eq!(err.to_string(), "HTTP 404: Not found");

        let err = Error::invalid_value("output_format", "unsupported");
        assert_eq!(
            err.to_string(),
            "Invalid config value for 'output_format': unsupported"
        );
    }

    #[test]
    fn test_error_category() {
        assert_eq!(Error::config("x").category(), ErrorCategory::Config);
        assert_eq!(
            Error::invalid_value("a", "b").category(),
            ErrorCategory::Config
        );
        assert_eq!(
            Error::http_status(503, "").category(),
            ErrorCategory::Network
        );
        assert_eq!(
            Error::Timeout { timeout_ms: 30_000 }.category(),
            ErrorCategory::Network
        );
        assert_eq!(
            Error::validation("x").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            Error::missing_column("temp").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            Error::connection("refused").category(),
            ErrorCategory::Connection
        );
        assert_eq!(Error::database("x").category(), ErrorCategory::Database);
        assert_eq!(Error::output("x").category(), ErrorCategory::Output);
    }

    #[test]
    fn test_category_display() {
        assert_eq!(ErrorCategory::Network.to_string(), "network");
        assert_eq!(ErrorCategory::Database.to_string(), "database");
    }

    #[test]
    fn test_result_context() {
        let result: Result<()> = Err(Error::config("inner"));
        let with_context = result.with_context(|| "outer".to_string());
        assert!(with_context
            .unwrap_err()
            .to_string()
            .contains("outer: Configuration error: inner"));
    }
}
