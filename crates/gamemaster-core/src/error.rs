//! Error types for catalog operations.

use gamemaster_types::EntityKind;

/// A boxed gateway or decode failure.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The gateway step that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Full scan of one collection.
    Load,
    /// Single-row lookup.
    Select,
    /// Row insert.
    Insert,
    /// Row rewrite.
    Update,
    /// Row delete.
    Delete,
    /// Bulk delete of rows related to a parent.
    DeleteRelated,
    /// Publisher reassignment of a game.
    Reassign,
}

impl Operation {
    /// Lowercase label used in logs and error messages.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Load => "load",
            Self::Select => "select",
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::DeleteRelated => "delete related",
            Self::Reassign => "reassign",
        }
    }
}

impl core::fmt::Display for Operation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors raised by catalog operations.
///
/// Validation failures are raised before the gateway is touched. A
/// persistence failure may leave some kinds stale; see
/// [`Catalog::stale_kinds`](crate::Catalog::stale_kinds).
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A key, username, or game name is already taken.
    #[error("{kind} already exists: {detail}")]
    UniqueConstraintViolation {
        /// The collection holding the conflicting value.
        kind: EntityKind,
        /// What collided.
        detail: String,
    },

    /// A domain rule rejected the input.
    #[error("invalid {field}: {reason}")]
    InvalidInput {
        /// The offending field or precondition.
        field: &'static str,
        /// Why it was rejected.
        reason: String,
    },

    /// The gateway failed, or returned a row of the wrong kind.
    #[error("{operation} on {kind} failed: {source}")]
    Persistence {
        /// The collection being touched.
        kind: EntityKind,
        /// The gateway step that failed.
        operation: Operation,
        /// The underlying failure.
        #[source]
        source: BoxError,
    },
}

impl CatalogError {
    /// Build a [`CatalogError::UniqueConstraintViolation`].
    pub fn duplicate(kind: EntityKind, detail: impl Into<String>) -> Self {
        Self::UniqueConstraintViolation {
            kind,
            detail: detail.into(),
        }
    }

    /// Build a [`CatalogError::InvalidInput`].
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    /// Build a [`CatalogError::Persistence`] from any gateway error.
    pub fn persistence(
        kind: EntityKind,
        operation: Operation,
        source: impl Into<BoxError>,
    ) -> Self {
        Self::Persistence {
            kind,
            operation,
            source: source.into(),
        }
    }
}

/// A gateway row that did not belong to the collection being loaded.
#[derive(Debug, thiserror::Error)]
#[error("expected {expected} row, got {found}")]
pub struct WrongKind {
    /// The collection being loaded.
    pub expected: EntityKind,
    /// The kind of the row actually returned.
    pub found: EntityKind,
}
