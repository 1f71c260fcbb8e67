//! Derived read-only views over the mirror.
//!
//! Nothing here is cached: every call recomputes its answer from the
//! current store, so views always observe the latest reload.

use gamemaster_types::{
    Account, Admin, Client, Game, GameKind, Provider, ProviderType, Purchase, User, UserId,
};
use rust_decimal::Decimal;

use crate::query::eq_ignore_case;
use crate::store::EntityStore;

/// Providers acting as developers, in key order.
pub fn developers(store: &EntityStore) -> Vec<Provider> {
    providers_of_type(store, ProviderType::Developer)
}

/// Providers acting as publishers, in key order.
pub fn publishers(store: &EntityStore) -> Vec<Provider> {
    providers_of_type(store, ProviderType::Publisher)
}

fn providers_of_type(store: &EntityStore, wanted: ProviderType) -> Vec<Provider> {
    store
        .iter::<Provider>()
        .filter(|p| p.provider_type == wanted)
        .cloned()
        .collect()
}

/// Every account: admins, then clients, then providers, each in key order.
pub fn users(store: &EntityStore) -> Vec<User> {
    let admins = store.iter::<Admin>().cloned().map(User::from);
    let clients = store.iter::<Client>().cloned().map(User::from);
    let providers = store.iter::<Provider>().cloned().map(User::from);
    admins.chain(clients).chain(providers).collect()
}

/// The account with this username, compared ignoring case.
pub fn find_user_by_username(store: &EntityStore, username: &str) -> Option<User> {
    users(store)
        .into_iter()
        .find(|u| eq_ignore_case(u.username(), username))
}

/// The account with this ID, whatever its kind.
pub fn find_user(store: &EntityStore, id: UserId) -> Option<User> {
    store
        .get::<Admin>(id)
        .cloned()
        .map(User::from)
        .or_else(|| store.get::<Client>(id).cloned().map(User::from))
        .or_else(|| store.get::<Provider>(id).cloned().map(User::from))
}

/// Why a login attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoginError {
    /// No account has this username.
    #[error("unknown username {username:?}")]
    UnknownUsername {
        /// The username given.
        username: String,
    },

    /// The password does not match.
    #[error("wrong password for {username:?}")]
    WrongPassword {
        /// The username given.
        username: String,
    },

    /// The account exists but is banned.
    #[error("account {username:?} is banned")]
    Banned {
        /// The username given.
        username: String,
    },
}

/// Check a username and password against the mirrored accounts.
///
/// # Errors
///
/// Returns a [`LoginError`] naming the first check that failed.
pub fn authenticate(
    store: &EntityStore,
    username: &str,
    password: &str,
) -> Result<User, LoginError> {
    let user = find_user_by_username(store, username).ok_or_else(|| LoginError::UnknownUsername {
        username: username.to_owned(),
    })?;
    if user.profile().password != password {
        return Err(LoginError::WrongPassword {
            username: username.to_owned(),
        });
    }
    if user.is_banned() {
        return Err(LoginError::Banned {
            username: username.to_owned(),
        });
    }
    Ok(user)
}

/// What a client owns and has paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LibrarySummary {
    /// Base games owned.
    pub games: usize,
    /// DLCs owned.
    pub dlcs: usize,
    /// Sum of every price paid.
    pub money_spent: Decimal,
}

/// Count a client's purchases by game kind and total what they paid.
///
/// Purchases whose game row is missing from the mirror still count toward
/// the money spent.
pub fn library_summary(store: &EntityStore, client: UserId) -> LibrarySummary {
    store
        .iter::<Purchase>()
        .filter(|p| p.user_id == client)
        .fold(LibrarySummary::default(), |mut acc, p| {
            match store.get::<Game>(p.game_id).map(|g| g.kind) {
                Some(GameKind::Game) => acc.games = acc.games.saturating_add(1),
                Some(GameKind::Dlc) => acc.dlcs = acc.dlcs.saturating_add(1),
                None => {}
            }
            acc.money_spent = acc.money_spent.saturating_add(p.price);
            acc
        })
}

/// The platform's cut of every sale, in percent.
///
/// Read from the admin with the lowest ID; `None` when no admin is held.
pub fn platform_cut(store: &EntityStore) -> Option<Decimal> {
    store.iter::<Admin>().next().map(|a| a.cut_percentage)
}

/// The providers' share of every sale, in percent: `100 - cut`.
pub fn provider_share(store: &EntityStore) -> Option<Decimal> {
    platform_cut(store).map(|cut| Decimal::ONE_HUNDRED.saturating_sub(cut))
}

/// A sale price divided between the platform and the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueSplit {
    /// Amount kept by the platform.
    pub platform: Decimal,
    /// Amount paid out to the provider.
    pub provider: Decimal,
}

/// Divide `price` by the platform cut. The two parts always sum to
/// `price`; the platform part is rounded to cents.
pub fn split_revenue(store: &EntityStore, price: Decimal) -> Option<RevenueSplit> {
    let cut = platform_cut(store)?;
    let platform = price
        .checked_mul(cut)?
        .checked_div(Decimal::ONE_HUNDRED)?
        .round_dp(2);
    let provider = price.checked_sub(platform)?;
    Some(RevenueSplit { platform, provider })
}
