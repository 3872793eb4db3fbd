//! # Store Error Types
//!
//! Error types for record store and repository operations.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Propagation                                    │
//! │                                                                         │
//! │  sqlx::Error / serde_json::Error / CoreError                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  DbError (this module) ← Adds key / entity context                      │
//! │       │                                                                 │
//! │       ├──► returned as-is by repositories                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SettleError (settlement.rs) ← Validation | Consistency | Db            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  UI shows the message; nothing here ends the process                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use billbook_core::CoreError;
use thiserror::Error;

/// Record store operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// Record not found in its collection.
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A stored value could not be parsed, or a record could not be encoded.
    ///
    /// ## When This Occurs
    /// - The `products` key holds something that is not a product array
    /// - A hand-edited database row with broken JSON
    #[error("Malformed value under '{key}': {message}")]
    Serialization { key: String, message: String },

    /// A write batch expected a value that has since changed.
    ///
    /// ## When This Occurs
    /// - Another writer touched the key between read and commit
    /// - The batch was built from stale reads
    #[error("Conflicting write on '{key}'")]
    Conflict { key: String },

    /// The request was rejected by business rules before anything was written.
    #[error(transparent)]
    Rejected(#[from] CoreError),

    /// Database connection failed.
    ///
    /// ## When This Occurs
    /// - Database file can't be created
    /// - File permissions issue
    /// - Disk full
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Migration failed.
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// Query execution failed.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Transaction failed to begin or commit.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    /// Pool exhausted (all connections in use).
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal store error.
    #[error("Internal store error: {0}")]
    Internal(String),
}

impl DbError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        DbError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Serialization error for the value under `key`.
    pub fn malformed(key: impl Into<String>, err: impl ToString) -> Self {
        DbError::Serialization {
            key: key.into(),
            message: err.to_string(),
        }
    }

    /// True when retrying with fresh reads may succeed.
    pub fn is_conflict(&self) -> bool {
        matches!(self, DbError::Conflict { .. })
    }
}

/// Convert sqlx errors to DbError.
///
/// ## Error Mapping
/// ```text
/// sqlx::Error::Database       → DbError::QueryFailed
/// sqlx::Error::PoolTimedOut   → DbError::PoolExhausted
/// sqlx::Error::PoolClosed     → DbError::ConnectionFailed
/// Other                       → DbError::Internal
/// ```
impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => DbError::QueryFailed(db_err.message().to_string()),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("Pool is closed".to_string()),
            _ => DbError::Internal(err.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

impl From<billbook_core::ValidationError> for DbError {
    fn from(err: billbook_core::ValidationError) -> Self {
        DbError::Rejected(CoreError::Validation(err))
    }
}

/// Result type for store operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;
    use billbook_core::ValidationError;

    #[test]
    fn test_error_messages() {
        assert_eq!(
            DbError::not_found("Product", 7).to_string(),
            "Product not found: 7"
        );
        assert_eq!(
            DbError::Conflict {
                key: "settings".to_string()
            }
            .to_string(),
            "Conflicting write on 'settings'"
        );
    }

    #[test]
    fn test_validation_passes_through() {
        let err: DbError = ValidationError::required("code").into();
        assert_eq!(err.to_string(), "Validation error: code is required");
        assert!(!err.is_conflict());
    }
}
