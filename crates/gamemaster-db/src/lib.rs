//! `PostgreSQL` persistence for the GameMaster catalog.
//!
//! Each store borrows a [`sqlx::PgPool`] and maps one group of tables to
//! and from the entity types in `gamemaster-types`. Queries are built at
//! runtime and fully parameterized; the schema ships as an embedded
//! migration.
//!
//! # Modules
//!
//! - [`postgres`] -- Database settings, the connection pool, and migrations
//! - [`user_store`] -- Accounts: `app_user` plus per-kind extension rows
//! - [`game_store`] -- Games and DLC links
//! - [`contract_store`] -- Developer/publisher contracts
//! - [`library_store`] -- Purchases and wishlist entries
//! - [`error`] -- Shared error types

pub mod contract_store;
pub mod error;
pub mod game_store;
pub mod library_store;
pub mod postgres;
pub mod user_store;

// Re-export primary types for convenience.
pub use contract_store::{ContractRow, ContractStore};
pub use error::DbError;
pub use game_store::{DlcRow, GameRow, GameStore};
pub use library_store::{LibraryStore, Owner, PurchaseRow, WishlistRow};
pub use postgres::{DatabaseConfig, PostgresPool};
pub use user_store::{AdminRow, ClientRow, ProfileRow, ProviderRow, UserStore};
