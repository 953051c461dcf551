//! Startup errors for the `PostgreSQL` backend.
//!
//! Per-operation failures are reported as [`StoreError`]; this type covers
//! building the pool and the schema, which happen before any use case runs.

use cinema_booking_core::StoreError;
use thiserror::Error;

/// Unique-violation SQLSTATE.
pub(crate) const UNIQUE_VIOLATION: &str = "23505";

/// Errors raised while connecting or bootstrapping.
#[derive(Error, Debug)]
pub enum PostgresError {
    /// The connection settings could not be turned into connect options.
    #[error("Invalid connection settings: {0}")]
    InvalidSettings(String),

    /// The pool could not be connected.
    #[error("Failed to connect: {0}")]
    Connect(#[source] sqlx::Error),

    /// A schema statement failed.
    #[error("Schema bootstrap failed: {0}")]
    Schema(#[source] sqlx::Error),
}

/// Whether a sqlx error is a unique constraint violation.
pub(crate) fn is_unique_violation(error: &sqlx::Error) -> bool {
    error
        .as_database_error()
        .and_then(|db| db.code())
        .is_some_and(|code| code == UNIQUE_VIOLATION)
}

/// Map any sqlx error to a durability fault.
pub(crate) fn database(error: &sqlx::Error) -> StoreError {
    StoreError::Database(error.to_string())
}
