//! Entity snapshots for the GameMaster catalog.
//!
//! Every struct here is an immutable value: a mutation produces a new
//! snapshot that replaces the old one in the catalog mirror.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enums::{ContractStatus, GameKind, ProviderType, UserKind};
use crate::ids::{ContractKey, GameId, OwnershipKey, UserId};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Fields shared by every account kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// Account identifier, unique across all account kinds.
    pub id: UserId,
    /// Login name, unique across all account kinds ignoring case.
    pub username: String,
    /// Login secret, compared verbatim.
    pub password: String,
    /// Contact address, if one was given.
    pub email: Option<String>,
    /// Banned accounts cannot log in.
    pub banned: bool,
}

/// Platform administrator. The single admin's cut drives revenue splits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Admin {
    /// Shared account fields.
    pub profile: Profile,
    /// Percentage of every sale kept by the platform (0 to 100).
    pub cut_percentage: Decimal,
}

/// A buyer of games and DLCs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Client {
    /// Shared account fields.
    pub profile: Profile,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Contact phone number.
    pub phone: String,
}

/// A content provider acting as a developer or a publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    /// Shared account fields.
    pub profile: Profile,
    /// Public website, if one was given.
    pub website: Option<String>,
    /// Whether this provider develops or publishes.
    pub provider_type: ProviderType,
}

impl Provider {
    /// Whether this provider acts as a developer.
    pub fn is_developer(&self) -> bool {
        self.provider_type == ProviderType::Developer
    }

    /// Whether this provider acts as a publisher.
    pub fn is_publisher(&self) -> bool {
        self.provider_type == ProviderType::Publisher
    }
}

/// Read access to the profile every account kind carries.
pub trait Account {
    /// The shared account fields.
    fn profile(&self) -> &Profile;

    /// Mutable access to the shared account fields.
    fn profile_mut(&mut self) -> &mut Profile;

    /// The concrete account kind.
    fn user_kind(&self) -> UserKind;

    /// The account identifier.
    fn id(&self) -> UserId {
        self.profile().id
    }

    /// The login name.
    fn username(&self) -> &str {
        &self.profile().username
    }

    /// Whether the account is banned.
    fn is_banned(&self) -> bool {
        self.profile().banned
    }
}

impl Account for Admin {
    fn profile(&self) -> &Profile {
        &self.profile
    }

    fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    fn user_kind(&self) -> UserKind {
        UserKind::Admin
    }
}

impl Account for Client {
    fn profile(&self) -> &Profile {
        &self.profile
    }

    fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    fn user_kind(&self) -> UserKind {
        UserKind::Client
    }
}

impl Account for Provider {
    fn profile(&self) -> &Profile {
        &self.profile
    }

    fn profile_mut(&mut self) -> &mut Profile {
        &mut self.profile
    }

    fn user_kind(&self) -> UserKind {
        UserKind::Provider
    }
}

/// Any account, tagged by its concrete kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum User {
    /// An administrator.
    Admin(Admin),
    /// A client.
    Client(Client),
    /// A provider.
    Provider(Provider),
}

impl Account for User {
    fn profile(&self) -> &Profile {
        match self {
            Self::Admin(a) => &a.profile,
            Self::Client(c) => &c.profile,
            Self::Provider(p) => &p.profile,
        }
    }

    fn profile_mut(&mut self) -> &mut Profile {
        match self {
            Self::Admin(a) => &mut a.profile,
            Self::Client(c) => &mut c.profile,
            Self::Provider(p) => &mut p.profile,
        }
    }

    fn user_kind(&self) -> UserKind {
        match self {
            Self::Admin(_) => UserKind::Admin,
            Self::Client(_) => UserKind::Client,
            Self::Provider(_) => UserKind::Provider,
        }
    }
}

impl From<Admin> for User {
    fn from(admin: Admin) -> Self {
        Self::Admin(admin)
    }
}

impl From<Client> for User {
    fn from(client: Client) -> Self {
        Self::Client(client)
    }
}

impl From<Provider> for User {
    fn from(provider: Provider) -> Self {
        Self::Provider(provider)
    }
}

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

/// A game row. DLCs are game rows of kind [`GameKind::Dlc`] with a
/// matching [`Dlc`] link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Game identifier.
    pub id: GameId,
    /// The developer that owns the game.
    pub developer_id: UserId,
    /// The publisher that released it; `None` while unpublished.
    pub publisher_id: Option<UserId>,
    /// Display name, unique ignoring case.
    pub name: String,
    /// Current sale price.
    pub price: Decimal,
    /// Release date, set when the game is published.
    pub release_date: Option<NaiveDate>,
    /// Delisted games are hidden from clients.
    pub visible: bool,
    /// Base game or DLC.
    pub kind: GameKind,
}

impl Game {
    /// Whether some publisher has released this game.
    pub const fn is_published(&self) -> bool {
        self.publisher_id.is_some()
    }

    /// Whether the given provider is this game's publisher.
    pub fn is_published_by(&self, publisher: UserId) -> bool {
        self.publisher_id == Some(publisher)
    }
}

/// Link from a DLC's game row to the base game it extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dlc {
    /// The DLC's own game row.
    pub id: GameId,
    /// The base game it extends.
    pub base_game_id: GameId,
}

/// A publishing agreement between a developer and a publisher.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contract {
    /// The developer party.
    pub developer_id: UserId,
    /// The publisher party.
    pub publisher_id: UserId,
    /// Pending until the developer accepts.
    pub status: ContractStatus,
    /// First day the contract is in force.
    pub start_date: NaiveDate,
    /// Last day the contract is in force.
    pub end_date: NaiveDate,
}

impl Contract {
    /// The ordered (developer, publisher) key of this contract.
    pub const fn contract_key(&self) -> ContractKey {
        ContractKey::new(self.developer_id, self.publisher_id)
    }
}

/// A game or DLC bought by a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Purchase {
    /// The game bought.
    pub game_id: GameId,
    /// The buyer.
    pub user_id: UserId,
    /// Day of purchase.
    pub purchase_date: NaiveDate,
    /// Price paid at the time of purchase.
    pub price: Decimal,
}

impl Purchase {
    /// The `(game, user)` key of this purchase.
    pub const fn ownership_key(&self) -> OwnershipKey {
        OwnershipKey::new(self.game_id, self.user_id)
    }
}

/// A game a client intends to buy later.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wishlist {
    /// The game wished for.
    pub game_id: GameId,
    /// The client holding the entry.
    pub user_id: UserId,
    /// Day the entry was added.
    pub added_date: NaiveDate,
}

impl Wishlist {
    /// The `(game, user)` key of this entry.
    pub const fn ownership_key(&self) -> OwnershipKey {
        OwnershipKey::new(self.game_id, self.user_id)
    }
}
