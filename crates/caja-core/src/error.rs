//! # Error Types
//!
//! Domain-specific error types for caja-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                         Error Types                             │
//! │                                                                 │
//! │  caja-core errors (this file)                                   │
//! │  ├── CoreError        - General domain errors                   │
//! │  └── ValidationError  - Input validation failures               │
//! │                                                                 │
//! │  caja-db errors (separate crate)                                │
//! │  └── DbError          - Database operation failures             │
//! │                                                                 │
//! │  API errors (in apps/api)                                       │
//! │  └── ApiError         - What clients see (HTTP status + body)   │
//! │                                                                 │
//! │  Flow: ValidationError → CoreError → DbError → ApiError         │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field name, value, etc.)
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations or domain logic failures.
/// They are translated to user-facing messages at the API layer.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Monetary arithmetic exceeded the representable range.
    ///
    /// Line subtotals and sale totals are i64 cents; a quantity × price
    /// product that overflows aborts the sale instead of wrapping.
    #[error("Monetary overflow computing {context}")]
    MoneyOverflow { context: String },

    /// An invoice header is missing its buyer block, or a receipt header
    /// carries one.
    #[error("{kind} header is invalid: {reason}")]
    InvalidHeader { kind: String, reason: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These occur when user input doesn't meet requirements. Used for early
/// validation before business logic runs; every variant names the offending
/// field so the API layer can report it.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive (quantity, for example, is at least 1).
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative (unit price may be zero but never below).
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (bad characters in a SKU, malformed decimal, etc.).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Returns the name of the field that failed validation.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::Required { field }
            | ValidationError::TooLong { field, .. }
            | ValidationError::OutOfRange { field, .. }
            | ValidationError::MustBePositive { field }
            | ValidationError::MustNotBeNegative { field }
            | ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::MustBePositive {
            field: "quantity".to_string(),
        };
        assert_eq!(err.to_string(), "quantity must be positive");
        assert_eq!(err.field(), "quantity");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
