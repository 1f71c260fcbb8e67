//! Shared type definitions for the GameMaster catalog.
//!
//! This crate is the single source of truth for the entity model used
//! across the workspace: the catalog core mirrors these values in memory
//! and the database crate maps them to and from rows.
//!
//! # Modules
//!
//! - [`ids`] -- Integer identifier newtypes and composite keys
//! - [`enums`] -- Account, catalog, and bookkeeping enumerations
//! - [`structs`] -- Entity snapshots (accounts, games, contracts, ownership)
//! - [`record`] -- Kind-tagged rows and keys plus the [`Entity`] trait

pub mod enums;
pub mod ids;
pub mod record;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{ContractStatus, EntityKind, GameKind, ProviderType, UnknownTag, UserKind, Verb};
pub use ids::{ContractKey, GameId, OwnershipKey, UserId};
pub use record::{AllocatedId, Entity, Record, RecordKey};
pub use structs::{
    Account, Admin, Client, Contract, Dlc, Game, Profile, Provider, Purchase, User, Wishlist,
};
