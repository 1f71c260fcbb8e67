//! Kind-tagged rows and keys exchanged with the persistence gateway.
//!
//! [`Record`] carries one row of any kind, [`RecordKey`] addresses one.
//! The [`Entity`] trait ties each concrete struct to its key type, its
//! [`EntityKind`], and its variant in both unions, so generic catalog code
//! can move between typed values and gateway rows without matching.

use serde::{Deserialize, Serialize};

use crate::enums::EntityKind;
use crate::ids::{ContractKey, GameId, OwnershipKey, UserId};
use crate::structs::{Admin, Client, Contract, Dlc, Game, Provider, Purchase, User, Wishlist};

/// One row of any entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "row", rename_all = "snake_case")]
pub enum Record {
    /// An administrator account.
    Admin(Admin),
    /// A client account.
    Client(Client),
    /// A provider account.
    Provider(Provider),
    /// A game row.
    Game(Game),
    /// A DLC link.
    Dlc(Dlc),
    /// A publishing contract.
    Contract(Contract),
    /// A purchase.
    Purchase(Purchase),
    /// A wishlist entry.
    Wishlist(Wishlist),
}

impl Record {
    /// The kind of entity this row holds.
    pub const fn kind(&self) -> EntityKind {
        match self {
            Self::Admin(_) => EntityKind::Admin,
            Self::Client(_) => EntityKind::Client,
            Self::Provider(_) => EntityKind::Provider,
            Self::Game(_) => EntityKind::Game,
            Self::Dlc(_) => EntityKind::Dlc,
            Self::Contract(_) => EntityKind::Contract,
            Self::Purchase(_) => EntityKind::Purchase,
            Self::Wishlist(_) => EntityKind::Wishlist,
        }
    }

    /// The key addressing this row.
    pub const fn key(&self) -> RecordKey {
        match self {
            Self::Admin(a) => RecordKey::Admin(a.profile.id),
            Self::Client(c) => RecordKey::Client(c.profile.id),
            Self::Provider(p) => RecordKey::Provider(p.profile.id),
            Self::Game(g) => RecordKey::Game(g.id),
            Self::Dlc(d) => RecordKey::Dlc(d.id),
            Self::Contract(c) => RecordKey::Contract(c.contract_key()),
            Self::Purchase(p) => RecordKey::Purchase(p.ownership_key()),
            Self::Wishlist(w) => RecordKey::Wishlist(w.ownership_key()),
        }
    }
}

impl From<User> for Record {
    fn from(user: User) -> Self {
        match user {
            User::Admin(a) => Self::Admin(a),
            User::Client(c) => Self::Client(c),
            User::Provider(p) => Self::Provider(p),
        }
    }
}

/// Key of one row, tagged by entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "key", rename_all = "snake_case")]
pub enum RecordKey {
    /// An administrator account.
    Admin(UserId),
    /// A client account.
    Client(UserId),
    /// A provider account.
    Provider(UserId),
    /// A game row.
    Game(GameId),
    /// A DLC link, keyed by the DLC's game ID.
    Dlc(GameId),
    /// A publishing contract.
    Contract(ContractKey),
    /// A purchase.
    Purchase(OwnershipKey),
    /// A wishlist entry.
    Wishlist(OwnershipKey),
}

impl RecordKey {
    /// The kind of entity this key addresses.
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::Admin(_) => EntityKind::Admin,
            Self::Client(_) => EntityKind::Client,
            Self::Provider(_) => EntityKind::Provider,
            Self::Game(_) => EntityKind::Game,
            Self::Dlc(_) => EntityKind::Dlc,
            Self::Contract(_) => EntityKind::Contract,
            Self::Purchase(_) => EntityKind::Purchase,
            Self::Wishlist(_) => EntityKind::Wishlist,
        }
    }
}

impl core::fmt::Display for RecordKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let kind = self.kind();
        match self {
            Self::Admin(id) | Self::Client(id) | Self::Provider(id) => write!(f, "{kind} {id}"),
            Self::Game(id) | Self::Dlc(id) => write!(f, "{kind} {id}"),
            Self::Contract(key) => write!(f, "{kind} {key}"),
            Self::Purchase(key) | Self::Wishlist(key) => write!(f, "{kind} {key}"),
        }
    }
}

/// An identifier drawn from one of the catalog's running counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocatedId {
    /// Drawn from the shared user counter.
    User(UserId),
    /// Drawn from the game counter.
    Game(GameId),
}

/// A concrete entity struct stored in its own catalog collection.
pub trait Entity: Clone + Sized {
    /// Key type addressing one value of this entity.
    type Key: Copy + Ord + core::fmt::Debug + core::fmt::Display;

    /// The collection this entity belongs to.
    const KIND: EntityKind;

    /// This value's key.
    fn key(&self) -> Self::Key;

    /// Tag a bare key with this entity's kind.
    fn record_key(key: Self::Key) -> RecordKey;

    /// Wrap this value as a gateway row.
    fn into_record(self) -> Record;

    /// Unwrap a gateway row, handing it back if it holds another kind.
    fn from_record(record: Record) -> Result<Self, Record>;

    /// The counter-allocated identifier this value carries, if any.
    fn allocated_id(&self) -> Option<AllocatedId> {
        None
    }
}

/// Implements [`Entity`] and `From<$ty> for Record` for one entity struct.
///
/// The optional trailing constructor names the counter the entity's key is
/// drawn from.
macro_rules! impl_entity {
    ($ty:ident, $key:ty, |$v:ident| $key_expr:expr $(, $alloc:path)?) => {
        impl Entity for $ty {
            type Key = $key;

            const KIND: EntityKind = EntityKind::$ty;

            fn key(&self) -> Self::Key {
                let $v = self;
                $key_expr
            }

            fn record_key(key: Self::Key) -> RecordKey {
                RecordKey::$ty(key)
            }

            fn into_record(self) -> Record {
                Record::$ty(self)
            }

            fn from_record(record: Record) -> Result<Self, Record> {
                match record {
                    Record::$ty(value) => Ok(value),
                    other => Err(other),
                }
            }

            $(
                fn allocated_id(&self) -> Option<AllocatedId> {
                    Some($alloc(self.key()))
                }
            )?
        }

        impl From<$ty> for Record {
            fn from(value: $ty) -> Self {
                Self::$ty(value)
            }
        }
    };
}

// DLC links reuse their game row's ID and the relation kinds are keyed by
// foreign IDs, so only accounts and games allocate.
impl_entity!(Admin, UserId, |v| v.profile.id, AllocatedId::User);
impl_entity!(Client, UserId, |v| v.profile.id, AllocatedId::User);
impl_entity!(Provider, UserId, |v| v.profile.id, AllocatedId::User);
impl_entity!(Game, GameId, |v| v.id, AllocatedId::Game);
impl_entity!(Dlc, GameId, |v| v.id);
impl_entity!(Contract, ContractKey, |v| v.contract_key());
impl_entity!(Purchase, OwnershipKey, |v| v.ownership_key());
impl_entity!(Wishlist, OwnershipKey, |v| v.ownership_key());

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::enums::GameKind;

    fn game(id: i32) -> Game {
        Game {
            id: GameId(id),
            developer_id: UserId(10),
            publisher_id: None,
            name: format!("Game {id}"),
            price: dec!(9.99),
            release_date: None,
            visible: true,
            kind: GameKind::Game,
        }
    }

    #[test]
    fn record_and_key_agree_on_kind() {
        let record = game(4).into_record();
        assert_eq!(record.kind(), EntityKind::Game);
        assert_eq!(record.key(), RecordKey::Game(GameId(4)));
        assert_eq!(record.key().kind(), EntityKind::Game);
    }

    #[test]
    fn from_record_hands_back_other_kinds() {
        let record = Record::Dlc(Dlc {
            id: GameId(2),
            base_game_id: GameId(1),
        });
        let back = Game::from_record(record.clone());
        assert_eq!(back, Err(record));
    }

    #[test]
    fn only_accounts_and_games_allocate() {
        assert_eq!(game(3).allocated_id(), Some(AllocatedId::Game(GameId(3))));
        let wish = Wishlist {
            game_id: GameId(3),
            user_id: UserId(20),
            added_date: NaiveDate::MIN,
        };
        assert_eq!(wish.allocated_id(), None);
        assert_eq!(
            Wishlist::record_key(wish.key()).to_string(),
            "wishlist (3, 20)"
        );
    }
}
