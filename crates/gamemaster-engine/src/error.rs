//! Error types for the catalog engine binary.
//!
//! [`EngineError`] is the top-level error type that wraps all possible
//! failure modes during engine startup and the initial mirror load.

/// Top-level error for the catalog engine binary.
///
/// Each variant wraps a specific subsystem error, providing a single
/// error type that `main` can propagate with `?`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: gamemaster_core::ConfigError,
    },

    /// Connecting to or migrating `PostgreSQL` failed.
    #[error("database error: {source}")]
    Database {
        /// The underlying database error.
        #[from]
        source: gamemaster_db::DbError,
    },

    /// Loading the catalog mirror failed.
    #[error("catalog error: {source}")]
    Catalog {
        /// The underlying catalog error.
        #[from]
        source: gamemaster_core::CatalogError,
    },
}
