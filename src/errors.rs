//! Unified error types for the ledger engine.
//!
//! Every fallible operation returns [`Result`]. The engine never swallows these errors;
//! callers (an API layer, the binary) decide how to present them.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// All errors produced by the catalog, ledger and snapshot operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Malformed input, a negative amount or a reference to an unknown catalog id
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// The operation targeted an id that does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Kind of record that was looked up
        entity: &'static str,
        /// The id (or month key) that was not found
        id: String,
    },

    /// Unique-key violation, a locked snapshot or a concurrent-mutation race
    #[error("Conflict: {message}")]
    Conflict {
        /// Description of the conflicting state
        message: String,
    },

    /// Configuration file or environment problems
    #[error("Configuration error: {message}")]
    Config {
        /// What failed while loading configuration
        message: String,
    },

    /// Errors bubbling up from the storage layer
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl Error {
    /// Shorthand for [`Error::Validation`].
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Shorthand for [`Error::NotFound`].
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Shorthand for [`Error::Conflict`].
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }
}

/// Maps storage errors that signal a lost race onto [`Error::Conflict`].
///
/// Unique-constraint violations and updates that matched no row both mean another
/// caller changed the same record first. Everything else stays a database error.
pub fn conflict_on_race(err: DbErr, message: &str) -> Error {
    if matches!(err, DbErr::RecordNotUpdated) {
        return Error::conflict(message);
    }
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            Error::conflict(format!("{message}: {detail}"))
        }
        _ => Error::Database(err),
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_not_updated_maps_to_conflict() {
        let err = conflict_on_race(DbErr::RecordNotUpdated, "entry changed");
        assert!(matches!(err, Error::Conflict { .. }));
        assert_eq!(err.to_string(), "Conflict: entry changed");
    }

    #[test]
    fn test_other_db_errors_pass_through() {
        let err = conflict_on_race(DbErr::Custom("boom".to_string()), "ignored");
        assert!(matches!(err, Error::Database(_)));
    }

    #[test]
    fn test_not_found_message() {
        let err = Error::not_found("income entry", 42);
        assert_eq!(err.to_string(), "income entry not found: 42");
    }
}
