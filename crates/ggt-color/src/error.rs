//! Error types for calibration parameters.

use thiserror::Error;

/// Calibration error.
///
/// Covers the ways a set of calibration parameters can be rejected:
/// - Malformed scalar or `R:G:B` strings
/// - Values outside the range a parameter accepts
/// - Gamma tables of the wrong size
#[derive(Debug, Error)]
pub enum CalibrationError {
    /// A parameter string could not be parsed.
    #[error("cannot parse '{input}': {reason}")]
    Parse {
        /// The offending input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// A parameter value is outside its accepted range.
    #[error("{parameter} value {value} is out of range ({expected})")]
    OutOfRange {
        /// Parameter name (gamma, contrast, ...).
        parameter: &'static str,
        /// Rejected value.
        value: f64,
        /// Human readable description of the accepted range.
        expected: &'static str,
    },

    /// Gamma table has the wrong number of entries.
    #[error("gamma table must have {expected} entries, got {actual}")]
    TableSize {
        /// Required entry count.
        expected: usize,
        /// Actual entry count.
        actual: usize,
    },
}

/// Result type for calibration operations.
pub type CalibrationResult<T> = Result<T, CalibrationError>;
