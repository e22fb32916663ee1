//! Pipeline result types

use std::fmt;
use std::time::Duration;

/// Outcome of a successful run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    /// Rows handed to the sink
    pub rows: usize,
    /// Columns handed to the sink
    pub columns: usize,
    /// Wall time of the whole run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Elapsed time in milliseconds
    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed.as_millis() as u64
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} rows, {} columns in {}ms",
            self.rows,
            self.columns,
            self.elapsed_ms()
        )
    }
}
