//! Account listings.

use gamemaster_types::{Account, ProviderType, User, UserKind};

use crate::query::filter_by_condition;

/// Accounts of one kind.
pub fn of_kind(users: &[User], kind: UserKind) -> Vec<User> {
    filter_by_condition(users, |u| u.user_kind() == kind)
}

/// Providers of one subtype.
pub fn of_provider_type(users: &[User], provider_type: ProviderType) -> Vec<User> {
    filter_by_condition(users, |u| {
        matches!(u, User::Provider(p) if p.provider_type == provider_type)
    })
}

/// Accounts whose ban flag equals `banned`.
pub fn by_ban_status(users: &[User], banned: bool) -> Vec<User> {
    filter_by_condition(users, |u| u.is_banned() == banned)
}
