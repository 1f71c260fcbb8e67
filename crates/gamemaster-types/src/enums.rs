//! Enumeration types for the GameMaster catalog.
//!
//! Every enumeration that is persisted as a text tag carries a
//! `const fn as_str` giving its canonical storage form and a [`FromStr`]
//! implementation that accepts the same form back.

use core::str::FromStr;

use serde::{Deserialize, Serialize};

/// A text tag that does not name any variant of the target enumeration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {type_name} tag: {value:?}")]
pub struct UnknownTag {
    /// Name of the enumeration being parsed.
    pub type_name: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Implements `as_str`, `Display`, and `FromStr` for a fieldless enum.
macro_rules! tagged_enum {
    ($name:ident, $label:literal, { $($variant:ident => $tag:literal),+ $(,)? }) => {
        impl $name {
            /// Canonical storage tag for this variant.
            pub const fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $tag,)+
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownTag;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok(Self::$variant),)+
                    other => Err(UnknownTag {
                        type_name: $label,
                        value: other.to_owned(),
                    }),
                }
            }
        }
    };
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// The concrete kind of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserKind {
    /// Platform administrator holding the revenue cut.
    Admin,
    /// A buyer of games.
    Client,
    /// A content provider, acting as developer or publisher.
    Provider,
}

tagged_enum!(UserKind, "user kind", {
    Admin => "admin",
    Client => "client",
    Provider => "provider",
});

/// The role a provider plays in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    /// Builds games and owns them as their developer.
    Developer,
    /// Releases developed games under contract.
    Publisher,
}

tagged_enum!(ProviderType, "provider type", {
    Developer => "developer",
    Publisher => "publisher",
});

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// Whether a game row is a standalone game or downloadable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
    /// A base game.
    Game,
    /// Downloadable content attached to a base game.
    Dlc,
}

tagged_enum!(GameKind, "game kind", {
    Game => "game",
    Dlc => "dlc",
});

/// Lifecycle state of a publishing contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractStatus {
    /// Proposed, awaiting the developer's acceptance.
    Pending,
    /// Accepted by both parties.
    Accepted,
}

tagged_enum!(ContractStatus, "contract status", {
    Pending => "pending",
    Accepted => "accepted",
});

// ---------------------------------------------------------------------------
// Mirror bookkeeping
// ---------------------------------------------------------------------------

/// One of the eight entity collections held by the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Client accounts.
    Client,
    /// Provider accounts.
    Provider,
    /// Administrator accounts.
    Admin,
    /// Publishing contracts.
    Contract,
    /// Game rows, including the parent rows of DLCs.
    Game,
    /// DLC-to-base-game links.
    Dlc,
    /// Purchases.
    Purchase,
    /// Wishlist entries.
    Wishlist,
}

impl EntityKind {
    /// Every kind, in the order a full mirror load visits them.
    pub const ALL: [Self; 8] = [
        Self::Client,
        Self::Provider,
        Self::Admin,
        Self::Contract,
        Self::Game,
        Self::Dlc,
        Self::Purchase,
        Self::Wishlist,
    ];

    /// The user kind backing this entity kind, if it is an account kind.
    pub const fn user_kind(self) -> Option<UserKind> {
        match self {
            Self::Admin => Some(UserKind::Admin),
            Self::Client => Some(UserKind::Client),
            Self::Provider => Some(UserKind::Provider),
            Self::Contract | Self::Game | Self::Dlc | Self::Purchase | Self::Wishlist => None,
        }
    }
}

tagged_enum!(EntityKind, "entity kind", {
    Client => "client",
    Provider => "provider",
    Admin => "admin",
    Contract => "contract",
    Game => "game",
    Dlc => "dlc",
    Purchase => "purchase",
    Wishlist => "wishlist",
});

impl From<UserKind> for EntityKind {
    fn from(kind: UserKind) -> Self {
        match kind {
            UserKind::Admin => Self::Admin,
            UserKind::Client => Self::Client,
            UserKind::Provider => Self::Provider,
        }
    }
}

/// The mutation verb recorded for every completed catalog operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verb {
    /// A new row was inserted.
    Create,
    /// An existing row was rewritten.
    Update,
    /// A row (and its cascade) was removed.
    Delete,
}

tagged_enum!(Verb, "verb", {
    Create => "create",
    Update => "update",
    Delete => "delete",
});

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn tags_parse_back() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.as_str().parse::<EntityKind>().unwrap(), kind);
        }
        assert_eq!("dlc".parse::<GameKind>().unwrap(), GameKind::Dlc);
        assert_eq!(
            "accepted".parse::<ContractStatus>().unwrap(),
            ContractStatus::Accepted
        );
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let err = "Publisher".parse::<ProviderType>().unwrap_err();
        assert_eq!(err.type_name, "provider type");
        assert_eq!(err.value, "Publisher");
    }

    #[test]
    fn load_order_starts_with_accounts() {
        assert_eq!(EntityKind::ALL.first(), Some(&EntityKind::Client));
        assert_eq!(EntityKind::ALL.last(), Some(&EntityKind::Wishlist));
        assert_eq!(EntityKind::Provider.user_kind(), Some(UserKind::Provider));
        assert_eq!(EntityKind::Dlc.user_kind(), None);
    }

    #[test]
    fn verb_displays_lowercase() {
        assert_eq!(Verb::Delete.to_string(), "delete");
        assert_eq!(EntityKind::from(UserKind::Admin), EntityKind::Admin);
    }
}
