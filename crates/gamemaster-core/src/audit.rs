//! Audit sink trait and its two built-in implementations.
//!
//! The catalog reports one `(kind, verb)` entry per completed mutation.
//! Auditing is fire-and-forget: a failing sink is logged at warn level by
//! the catalog and never aborts the operation it describes.

use chrono::{DateTime, Utc};
use gamemaster_types::{EntityKind, Verb};

/// Errors an audit sink may report.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuditError {
    /// The sink is not accepting entries.
    #[error("audit sink unavailable: {message}")]
    Unavailable {
        /// Description of the failure.
        message: String,
    },
}

/// One recorded mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    /// The collection that was mutated.
    pub kind: EntityKind,
    /// What was done to it.
    pub verb: Verb,
    /// When the entry was recorded.
    pub at: DateTime<Utc>,
}

/// A destination for audit entries.
pub trait AuditSink {
    /// Record one completed mutation.
    ///
    /// # Errors
    ///
    /// Returns [`AuditError`] if the entry could not be stored.
    fn record(&mut self, kind: EntityKind, verb: Verb) -> Result<(), AuditError>;
}

/// Writes audit entries as structured `tracing` events on the `audit`
/// target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAudit;

impl TracingAudit {
    /// Create a new tracing sink.
    pub const fn new() -> Self {
        Self
    }
}

impl AuditSink for TracingAudit {
    fn record(&mut self, kind: EntityKind, verb: Verb) -> Result<(), AuditError> {
        tracing::info!(
            target: "audit",
            kind = kind.as_str(),
            verb = verb.as_str(),
            at = %Utc::now().to_rfc3339(),
            "catalog mutation"
        );
        Ok(())
    }
}

/// Keeps audit entries in memory. Used by tests and dry runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryAudit {
    entries: Vec<AuditEntry>,
    failing: bool,
}

impl MemoryAudit {
    /// Create an empty sink.
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
            failing: false,
        }
    }

    /// Every entry recorded so far, oldest first.
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// The `(kind, verb)` pairs recorded so far, oldest first.
    pub fn pairs(&self) -> Vec<(EntityKind, Verb)> {
        self.entries.iter().map(|e| (e.kind, e.verb)).collect()
    }

    /// Make every following `record` call fail (or succeed again).
    pub const fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }
}

impl AuditSink for MemoryAudit {
    fn record(&mut self, kind: EntityKind, verb: Verb) -> Result<(), AuditError> {
        if self.failing {
            return Err(AuditError::Unavailable {
                message: "memory sink set to fail".to_owned(),
            });
        }
        self.entries.push(AuditEntry {
            kind,
            verb,
            at: Utc::now(),
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_audit_keeps_order() {
        let mut sink = MemoryAudit::new();
        assert!(sink.record(EntityKind::Game, Verb::Create).is_ok());
        assert!(sink.record(EntityKind::Game, Verb::Delete).is_ok());
        assert_eq!(
            sink.pairs(),
            vec![
                (EntityKind::Game, Verb::Create),
                (EntityKind::Game, Verb::Delete)
            ]
        );
    }

    #[test]
    fn failing_sink_records_nothing() {
        let mut sink = MemoryAudit::new();
        sink.set_failing(true);
        assert!(sink.record(EntityKind::Client, Verb::Update).is_err());
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn tracing_audit_accepts_entries() {
        let mut sink = TracingAudit::new();
        assert!(sink.record(EntityKind::Contract, Verb::Create).is_ok());
    }
}
