//! # Error Types
//!
//! Domain-specific error types for tappay-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tappay-core errors (this file)                                        │
//! │  ├── CoreError        - Configuration data problems                    │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  tappay-db errors                                                      │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  tappay-resolver errors                                                │
//! │  └── ResolveError     - Storage failures seen while resolving          │
//! │                                                                         │
//! │  broker-api errors                                                     │
//! │  └── ApiError         - What HTTP clients see                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Errors raised by pure core logic.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The static device table could not be parsed.
    ///
    /// ## When This Occurs
    /// - `DEVICE_CONFIG_JSON` is not valid JSON
    /// - The JSON is not a list of `{deviceId, terminalId, amount, currency}`
    ///
    /// Callers degrade to the defaults instead of failing a request.
    #[error("Invalid device configuration: {0}")]
    InvalidDeviceTable(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation of request fields before anything is persisted.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., non-numeric amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates a Required error for a field.
    pub fn required(field: impl Into<String>) -> Self {
        ValidationError::Required {
            field: field.into(),
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_messages() {
        assert_eq!(
            ValidationError::required("deviceId").to_string(),
            "deviceId is required"
        );

        let err = ValidationError::TooLong {
            field: "currency".to_string(),
            max: 8,
        };
        assert_eq!(err.to_string(), "currency must be at most 8 characters");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let core_err: CoreError = ValidationError::required("amount").into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
