//! Persistence gateway trait consumed by the catalog.
//!
//! The catalog never talks to a database directly. Every statement it
//! issues goes through a [`Gateway`], which the `PostgreSQL` adapter and
//! the in-memory [`MemoryGateway`](crate::MemoryGateway) both implement.
//! Row counts are returned so callers can tell an absent row from a
//! written one.

use gamemaster_types::{EntityKind, GameId, Record, RecordKey, UserId};

/// A set of rows removed together because of their parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// Every purchase of the game.
    PurchasesOfGame(GameId),
    /// Every wishlist entry for the game.
    WishlistsOfGame(GameId),
    /// Every DLC link where the game is the DLC or the base game.
    DlcLinksOfGame(GameId),
    /// Every purchase made by the user.
    PurchasesOfUser(UserId),
    /// Every wishlist entry held by the user.
    WishlistsOfUser(UserId),
    /// Every contract where the provider is either party.
    ContractsOfProvider(UserId),
}

impl Relation {
    /// The collection the related rows live in.
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::PurchasesOfGame(_) | Self::PurchasesOfUser(_) => EntityKind::Purchase,
            Self::WishlistsOfGame(_) | Self::WishlistsOfUser(_) => EntityKind::Wishlist,
            Self::DlcLinksOfGame(_) => EntityKind::Dlc,
            Self::ContractsOfProvider(_) => EntityKind::Contract,
        }
    }
}

impl core::fmt::Display for Relation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::PurchasesOfGame(id) => write!(f, "purchases of game {id}"),
            Self::WishlistsOfGame(id) => write!(f, "wishlists of game {id}"),
            Self::DlcLinksOfGame(id) => write!(f, "dlc links of game {id}"),
            Self::PurchasesOfUser(id) => write!(f, "purchases of user {id}"),
            Self::WishlistsOfUser(id) => write!(f, "wishlists of user {id}"),
            Self::ContractsOfProvider(id) => write!(f, "contracts of provider {id}"),
        }
    }
}

/// Statement-level access to the backing store.
///
/// Each method issues exactly one logical statement and returns the number
/// of rows it touched. Deleting an account removes its kind-specific row
/// and then the shared user row.
#[allow(async_fn_in_trait)]
pub trait Gateway {
    /// The gateway's failure type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Scan every row of one collection.
    async fn load_all(&mut self, kind: EntityKind) -> Result<Vec<Record>, Self::Error>;

    /// Fetch one row by key.
    async fn select(&mut self, key: RecordKey) -> Result<Option<Record>, Self::Error>;

    /// Insert one row.
    async fn insert(&mut self, record: &Record) -> Result<u64, Self::Error>;

    /// Rewrite the row with the same key.
    async fn update(&mut self, record: &Record) -> Result<u64, Self::Error>;

    /// Delete one row by key.
    async fn delete(&mut self, key: RecordKey) -> Result<u64, Self::Error>;

    /// Delete every row in a relation.
    async fn delete_related(&mut self, relation: Relation) -> Result<u64, Self::Error>;

    /// Set (or clear) the publisher of one game.
    async fn reassign_publisher(
        &mut self,
        game: GameId,
        publisher: Option<UserId>,
    ) -> Result<u64, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relation_targets_its_collection() {
        assert_eq!(
            Relation::DlcLinksOfGame(GameId(1)).kind(),
            EntityKind::Dlc
        );
        assert_eq!(
            Relation::ContractsOfProvider(UserId(5)).to_string(),
            "contracts of provider 5"
        );
    }
}
