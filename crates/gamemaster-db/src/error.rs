//! Error types for the persistence layer.
//!
//! All errors are propagated via [`DbError`], which wraps the underlying
//! [`sqlx`] errors and reports rows whose text tags no longer decode.

use gamemaster_types::UnknownTag;

/// Errors that can occur in the persistence layer.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// A `PostgreSQL` operation failed.
    #[error("PostgreSQL error: {0}")]
    Postgres(#[from] sqlx::Error),

    /// A `PostgreSQL` migration failed.
    #[error("PostgreSQL migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// A stored row holds a value the entity model cannot represent.
    #[error("Decode error: {0}")]
    Decode(#[from] UnknownTag),

    /// A configuration error.
    #[error("Configuration error: {0}")]
    Config(String),
}
