//! Type-safe identifier wrappers and composite keys.
//!
//! Users and games are identified by plain integers allocated by the
//! catalog (the running maximum of every ID observed so far, plus one).
//! Relations that have no identity of their own are keyed by an ordered
//! pair of foreign identifiers.

use serde::{Deserialize, Serialize};

/// Generates a newtype wrapper around `i32` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            /// Return the inner integer value.
            pub const fn into_inner(self) -> i32 {
                self.0
            }

            /// The identifier that follows this one.
            ///
            /// Saturates at `i32::MAX` instead of wrapping, so a
            /// counter can never hand out an identifier that was
            /// already used.
            #[must_use]
            pub const fn successor(self) -> Self {
                Self(self.0.saturating_add(1))
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(id: i32) -> Self {
                Self(id)
            }
        }

        impl From<$name> for i32 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Identifier shared by every account kind (admin, client, provider).
    UserId
}

define_id! {
    /// Identifier of a game row. DLCs reuse the ID of their game row.
    GameId
}

/// Key of a publishing contract: the ordered (developer, publisher) pair.
///
/// Order matters: `(3, 5)` and `(5, 3)` are different contracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ContractKey {
    /// The developer party.
    pub developer: UserId,
    /// The publisher party.
    pub publisher: UserId,
}

impl ContractKey {
    /// Build a key from the developer and publisher IDs.
    pub const fn new(developer: UserId, publisher: UserId) -> Self {
        Self {
            developer,
            publisher,
        }
    }

    /// Whether the given provider is either party of the contract.
    pub fn involves(self, provider: UserId) -> bool {
        self.developer == provider || self.publisher == provider
    }
}

impl core::fmt::Display for ContractKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.developer, self.publisher)
    }
}

/// Key of a purchase or wishlist entry: always `(game, user)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OwnershipKey {
    /// The game owned or wished for.
    pub game: GameId,
    /// The user holding the entry.
    pub user: UserId,
}

impl OwnershipKey {
    /// Build a key from the game and user IDs.
    pub const fn new(game: GameId, user: UserId) -> Self {
        Self { game, user }
    }
}

impl core::fmt::Display for OwnershipKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "({}, {})", self.game, self.user)
    }
}
