//! Custom error types for the common library
//!
//! This module defines the errors raised while connecting to, migrating and
//! probing the scheduler database.

use sqlx::Error as SqlxError;
use sqlx::migrate::MigrateError;
use thiserror::Error;

/// Custom error type for database operations
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Error occurred during database connection
    #[error("Database connection error: {0}")]
    Connection(#[source] SqlxError),

    /// Error occurred during database migration
    #[error("Database migration error: {0}")]
    Migration(#[from] MigrateError),

    /// Configuration error
    #[error("Database configuration error: {0}")]
    Configuration(String),
}

/// Type alias for Result with DatabaseError
pub type DatabaseResult<T> = Result<T, DatabaseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migration_errors_convert() {
        let err = DatabaseError::from(MigrateError::VersionMissing(20250106000000));
        assert!(matches!(err, DatabaseError::Migration(_)));
        assert!(err.to_string().starts_with("Database migration error"));
    }
}
