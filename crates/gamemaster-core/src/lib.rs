//! Entity mirror, cascade coordinator, and query surface for the
//! GameMaster catalog.
//!
//! The [`Catalog`] holds an in-memory copy of every entity collection and
//! keeps it consistent with a backing store reached through the
//! [`Gateway`] trait. Deletes cascade through dependent rows and the
//! affected collections are reloaded wholesale afterwards.
//!
//! # Modules
//!
//! - [`audit`] -- [`AuditSink`] trait with tracing and in-memory sinks.
//! - [`cascade`] -- Delete plans and the reload table per mutation.
//! - [`catalog`] -- The coordinator: create, read, update, delete, reload.
//! - [`config`] -- Configuration loading from `gamemaster-config.yaml`.
//! - [`error`] -- [`CatalogError`] and the gateway step it failed in.
//! - [`gateway`] -- [`Gateway`] trait and the [`Relation`] bulk deletes.
//! - [`listings`] -- Per-entity filters and comparators for the UI.
//! - [`memory`] -- [`MemoryGateway`], an in-memory relational backend.
//! - [`query`] -- Generic filter, sort, and selection helpers.
//! - [`rules`] -- Pre-write domain validation per entity kind.
//! - [`store`] -- [`EntityStore`], the keyed collections themselves.
//! - [`views`] -- Derived read-only views: accounts, login, revenue.
//! - [`workflows`] -- Publish, buy, wishlist, contract, and ban operations.
//!
//! [`AuditSink`]: audit::AuditSink
//! [`Catalog`]: catalog::Catalog
//! [`CatalogError`]: error::CatalogError
//! [`EntityStore`]: store::EntityStore
//! [`Gateway`]: gateway::Gateway
//! [`MemoryGateway`]: memory::MemoryGateway
//! [`Relation`]: gateway::Relation

pub mod audit;
pub mod cascade;
pub mod catalog;
pub mod config;
pub mod error;
pub mod gateway;
pub mod listings;
pub mod memory;
pub mod query;
pub mod rules;
pub mod store;
pub mod views;
pub mod workflows;

pub use audit::{AuditEntry, AuditError, AuditSink, MemoryAudit, TracingAudit};
pub use catalog::Catalog;
pub use config::{CatalogConfig, ConfigError, DatabaseConfig, LogFormat, LoggingConfig};
pub use error::{BoxError, CatalogError, Operation, WrongKind};
pub use gateway::{Gateway, Relation};
pub use memory::{Issued, MemoryError, MemoryGateway};
pub use query::{SortCriteria, filter_by_condition, select_one, sort_by_criteria};
pub use rules::Validate;
pub use store::{EntityStore, StoreSummary, Stored};
