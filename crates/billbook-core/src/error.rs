//! # Error Types
//!
//! Domain-specific error types for billbook-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  billbook-core errors (this file)                                       │
//! │  ├── CoreError        - Business rule violations                        │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  billbook-db errors (separate crate)                                    │
//! │  ├── DbError          - Store / backend failures                        │
//! │  └── SettleError      - Validation | Consistency | Db                   │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → SettleError → UI message           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, invoice number)
//! 3. Errors are enum variants, never String
//! 4. Every failure is local to one user action; nothing here is fatal

use thiserror::Error;

use crate::types::InvoiceStatus;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// The draft has no line for this product.
    #[error("Product {0} is not on the invoice")]
    LineNotFound(u64),

    /// Invoice is not in a state that allows the requested transition.
    ///
    /// ## When This Occurs
    /// - Cancelling an invoice that is already cancelled
    #[error("Invoice {invoice_no} is {status}, cannot {action}")]
    InvalidInvoiceStatus {
        invoice_no: String,
        status: InvoiceStatus,
        action: String,
    },

    /// Draft has exceeded the maximum number of distinct lines.
    #[error("An invoice cannot have more than {max} lines")]
    DraftTooLarge { max: usize },

    /// Line quantity exceeds maximum allowed.
    #[error("Quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before any state is touched; the UI shows the message inline.
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

    /// Value must not be negative.
    #[error("{field} cannot be negative")]
    Negative { field: String },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., malformed GSTIN, amount with three decimals).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },

    /// The draft has no lines.
    #[error("Add at least one item to the invoice")]
    EmptyDraft,

    /// Date range with `from` after `to`.
    #[error("Date range start {from} is after end {to}")]
    InvertedRange { from: String, to: String },
}

impl ValidationError {
    /// Shorthand for a `Required` error.
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
