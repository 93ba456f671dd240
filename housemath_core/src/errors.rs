//! # Error Types
//!
//! Structured error types for housemath_core. Every variant carries enough
//! context for a front end to point at the offending field or file without
//! parsing message strings.
//!
//! ## Example
//!
//! ```rust
//! use housemath_core::errors::{CalcError, CalcResult};
//!
//! fn validate_price(price: f64) -> CalcResult<()> {
//!     if price <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "home_price",
//!             price.to_string(),
//!             "Price must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for housemath_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculator and storage operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, not a number, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The calculator id is not one of the known tabs
    #[error("Unknown calculator: {id}")]
    UnknownCalculator { id: String },

    /// Calculation produced no meaningful result (e.g. nothing financed)
    #[error("Calculation failed: {calculator} - {reason}")]
    CalculationFailed { calculator: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create an UnknownCalculator error
    pub fn unknown_calculator(id: impl Into<String>) -> Self {
        CalcError::UnknownCalculator {
            id: id.into(),
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculator: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculator: calculator.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(
        path: impl Into<String>,
        locked_by: impl Into<String>,
        locked_at: impl Into<String>,
    ) -> Self {
        CalcError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Create a SerializationError from anything printable
    pub fn serialization(reason: impl ToString) -> Self {
        CalcError::SerializationError {
            reason: reason.to_string(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CalcError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::UnknownCalculator { .. } => "UNKNOWN_CALCULATOR",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::FileLocked { .. } => "FILE_LOCKED",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = CalcError::invalid_input("home_price", "-5", "Price must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: CalcError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(CalcError::missing_field("test").error_code(), "MISSING_FIELD");
        assert_eq!(CalcError::unknown_calculator("taxes").error_code(), "UNKNOWN_CALCULATOR");
        assert_eq!(CalcError::serialization("bad json").error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_only_locks_are_recoverable() {
        assert!(CalcError::file_locked("a.hmr", "someone", "now").is_recoverable());
        assert!(!CalcError::calculation_failed("flip", "no profit").is_recoverable());
    }

    #[test]
    fn test_display_names_field() {
        let error =
            CalcError::invalid_input("down_payment_pct", "120", "Must be between 0 and 100");
        assert_eq!(
            error.to_string(),
            "Invalid input for 'down_payment_pct': 120 - Must be between 0 and 100"
        );
    }
}
