//! Domain rules checked before any statement reaches the gateway.
//!
//! Each entity kind implements [`Validate`]. The checks read the mirror
//! only: references must resolve to held rows, usernames and game names
//! must be unique ignoring case, and amounts must not be negative. Key
//! uniqueness within a kind is checked by the catalog itself.

use gamemaster_types::{
    Account, Admin, Client, Contract, Dlc, EntityKind, Game, GameId, GameKind, Profile,
    Provider, ProviderType, Purchase, UserId, Verb, Wishlist,
};
use rust_decimal::Decimal;

use crate::error::CatalogError;
use crate::query::eq_ignore_case;
use crate::store::{EntityStore, Stored};

/// Pre-write validation for one entity kind.
pub trait Validate: Stored {
    /// Check this value against the mirror before it is written.
    ///
    /// `verb` is [`Verb::Create`] or [`Verb::Update`].
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] or
    /// [`CatalogError::UniqueConstraintViolation`].
    fn validate(&self, store: &EntityStore, verb: Verb) -> Result<(), CatalogError>;
}

fn require_text(field: &'static str, value: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::invalid(field, "must not be empty"));
    }
    Ok(())
}

fn require_non_negative(field: &'static str, value: Decimal) -> Result<(), CatalogError> {
    if value < Decimal::ZERO {
        return Err(CatalogError::invalid(field, format!("{value} is negative")));
    }
    Ok(())
}

/// Every account held by the mirror, as `(id, username, kind)`.
fn accounts(store: &EntityStore) -> impl Iterator<Item = (UserId, &str, EntityKind)> {
    let admins = store
        .iter::<Admin>()
        .map(|a| (a.id(), a.username(), EntityKind::Admin));
    let clients = store
        .iter::<Client>()
        .map(|c| (c.id(), c.username(), EntityKind::Client));
    let providers = store
        .iter::<Provider>()
        .map(|p| (p.id(), p.username(), EntityKind::Provider));
    admins.chain(clients).chain(providers)
}

fn check_profile(
    profile: &Profile,
    kind: EntityKind,
    store: &EntityStore,
    verb: Verb,
) -> Result<(), CatalogError> {
    require_text("username", &profile.username)?;
    require_text("password", &profile.password)?;

    for (id, username, held_as) in accounts(store) {
        if id == profile.id {
            if verb == Verb::Create || held_as != kind {
                return Err(CatalogError::duplicate(
                    held_as,
                    format!("user id {id} is already taken"),
                ));
            }
            continue;
        }
        if eq_ignore_case(username, &profile.username) {
            return Err(CatalogError::duplicate(
                held_as,
                format!("username {:?} is already taken", profile.username),
            ));
        }
    }
    Ok(())
}

/// A held provider of the given subtype.
fn provider_of_type(
    store: &EntityStore,
    id: UserId,
    wanted: ProviderType,
    field: &'static str,
) -> Result<(), CatalogError> {
    match store.get::<Provider>(id) {
        Some(p) if p.provider_type == wanted => Ok(()),
        Some(_) => Err(CatalogError::invalid(
            field,
            format!("provider {id} is not a {wanted}"),
        )),
        None => Err(CatalogError::invalid(
            field,
            format!("provider {id} does not exist"),
        )),
    }
}

fn require_game(store: &EntityStore, id: GameId) -> Result<&Game, CatalogError> {
    store
        .get::<Game>(id)
        .ok_or_else(|| CatalogError::invalid("game_id", format!("game {id} does not exist")))
}

fn require_client(store: &EntityStore, id: UserId) -> Result<(), CatalogError> {
    if store.contains::<Client>(id) {
        Ok(())
    } else {
        Err(CatalogError::invalid(
            "user_id",
            format!("client {id} does not exist"),
        ))
    }
}

impl Validate for Admin {
    fn validate(&self, store: &EntityStore, verb: Verb) -> Result<(), CatalogError> {
        check_profile(&self.profile, EntityKind::Admin, store, verb)?;
        if self.cut_percentage < Decimal::ZERO || self.cut_percentage > Decimal::ONE_HUNDRED {
            return Err(CatalogError::invalid(
                "cut_percentage",
                format!("{} is outside 0..=100", self.cut_percentage),
            ));
        }
        Ok(())
    }
}

impl Validate for Client {
    fn validate(&self, store: &EntityStore, verb: Verb) -> Result<(), CatalogError> {
        check_profile(&self.profile, EntityKind::Client, store, verb)
    }
}

impl Validate for Provider {
    fn validate(&self, store: &EntityStore, verb: Verb) -> Result<(), CatalogError> {
        check_profile(&self.profile, EntityKind::Provider, store, verb)
    }
}

impl Validate for Game {
    fn validate(&self, store: &EntityStore, verb: Verb) -> Result<(), CatalogError> {
        require_text("name", &self.name)?;
        require_non_negative("price", self.price)?;

        let clash = store
            .iter::<Game>()
            .find(|g| g.id != self.id && eq_ignore_case(&g.name, &self.name));
        if let Some(other) = clash {
            return Err(CatalogError::duplicate(
                EntityKind::Game,
                format!("name {:?} is already used by game {}", self.name, other.id),
            ));
        }

        provider_of_type(store, self.developer_id, ProviderType::Developer, "developer_id")?;
        match self.publisher_id {
            None => Ok(()),
            // Reassignment after a publisher is deleted hands the game back
            // to its developer.
            Some(publisher) if verb == Verb::Update && publisher == self.developer_id => Ok(()),
            Some(publisher) => {
                provider_of_type(store, publisher, ProviderType::Publisher, "publisher_id")
            }
        }
    }
}

impl Validate for Dlc {
    fn validate(&self, store: &EntityStore, _verb: Verb) -> Result<(), CatalogError> {
        if self.id == self.base_game_id {
            return Err(CatalogError::invalid(
                "base_game_id",
                "a dlc cannot extend itself",
            ));
        }
        if require_game(store, self.id)?.kind != GameKind::Dlc {
            return Err(CatalogError::invalid(
                "game_id",
                format!("game {} is not of kind dlc", self.id),
            ));
        }
        match store.get::<Game>(self.base_game_id) {
            Some(base) if base.kind == GameKind::Game => Ok(()),
            Some(_) => Err(CatalogError::invalid(
                "base_game_id",
                format!("game {} is itself a dlc", self.base_game_id),
            )),
            None => Err(CatalogError::invalid(
                "base_game_id",
                format!("game {} does not exist", self.base_game_id),
            )),
        }
    }
}

impl Validate for Contract {
    fn validate(&self, store: &EntityStore, _verb: Verb) -> Result<(), CatalogError> {
        provider_of_type(store, self.developer_id, ProviderType::Developer, "developer_id")?;
        provider_of_type(store, self.publisher_id, ProviderType::Publisher, "publisher_id")?;
        if self.end_date < self.start_date {
            return Err(CatalogError::invalid(
                "end_date",
                format!("{} precedes start {}", self.end_date, self.start_date),
            ));
        }
        Ok(())
    }
}

impl Validate for Purchase {
    fn validate(&self, store: &EntityStore, _verb: Verb) -> Result<(), CatalogError> {
        require_game(store, self.game_id)?;
        require_client(store, self.user_id)?;
        require_non_negative("price", self.price)
    }
}

impl Validate for Wishlist {
    fn validate(&self, store: &EntityStore, _verb: Verb) -> Result<(), CatalogError> {
        require_game(store, self.game_id)?;
        require_client(store, self.user_id)
    }
}
