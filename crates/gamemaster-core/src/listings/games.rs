//! Game listings for providers and for the client storefront.
//!
//! Slice-based filters keep the input order. Storefront listings read the
//! store directly and come back in key order.

use core::cmp::Ordering;

use gamemaster_types::{
    Contract, ContractKey, Dlc, Game, GameId, GameKind, OwnershipKey, Purchase, UserId, Wishlist,
};

use crate::query::{
    SortCriteria, cmp_dates_none_last, cmp_ignore_case, filter_by_condition, sort_by_criteria,
};
use crate::store::EntityStore;

/// Games of one kind.
pub fn by_type(games: &[Game], kind: GameKind) -> Vec<Game> {
    filter_by_condition(games, |g| g.kind == kind)
}

/// Listed (`true`) or delisted (`false`) games.
pub fn by_visibility(games: &[Game], visible: bool) -> Vec<Game> {
    filter_by_condition(games, |g| g.visible == visible)
}

/// Every game the developer owns.
pub fn developed_by(games: &[Game], developer: UserId) -> Vec<Game> {
    filter_by_condition(games, |g| g.developer_id == developer)
}

/// Games a provider may manage: its own unpublished games plus every game
/// it published.
pub fn privileged_for(games: &[Game], provider: UserId) -> Vec<Game> {
    filter_by_condition(games, |g| {
        (g.developer_id == provider && !g.is_published()) || g.is_published_by(provider)
    })
}

/// The developer's games that no publisher has released yet.
pub fn unpublished_by_developer(games: &[Game], developer: UserId) -> Vec<Game> {
    filter_by_condition(games, |g| g.developer_id == developer && !g.is_published())
}

/// The developer's games that some publisher has released.
pub fn published_by_developer(games: &[Game], developer: UserId) -> Vec<Game> {
    filter_by_condition(games, |g| g.developer_id == developer && g.is_published())
}

/// Games released by the publisher.
pub fn published_by(games: &[Game], publisher: UserId) -> Vec<Game> {
    filter_by_condition(games, |g| g.is_published_by(publisher))
}

/// Unpublished games whose developer holds a contract, in any status,
/// with the publisher. These are the games the publisher may release.
pub fn contracted_unpublished(store: &EntityStore, publisher: UserId) -> Vec<Game> {
    store
        .iter::<Game>()
        .filter(|g| !g.is_published())
        .filter(|g| store.contains::<Contract>(ContractKey::new(g.developer_id, publisher)))
        .cloned()
        .collect()
}

fn owns(store: &EntityStore, client: UserId, game: GameId) -> bool {
    store.contains::<Purchase>(OwnershipKey::new(game, client))
}

fn wishes(store: &EntityStore, client: UserId, game: GameId) -> bool {
    store.contains::<Wishlist>(OwnershipKey::new(game, client))
}

/// Whether the DLC row's base game is owned by the client.
fn base_owned(store: &EntityStore, client: UserId, dlc: GameId) -> bool {
    store
        .get::<Dlc>(dlc)
        .is_some_and(|link| owns(store, client, link.base_game_id))
}

/// Base games on sale to the client: listed, published, and not owned.
pub fn purchasable_for(store: &EntityStore, client: UserId) -> Vec<Game> {
    store
        .iter::<Game>()
        .filter(|g| g.kind == GameKind::Game && g.visible && g.is_published())
        .filter(|g| !owns(store, client, g.id))
        .cloned()
        .collect()
}

/// DLCs on sale to the client: listed, published, not owned, and
/// extending a base game the client owns.
pub fn purchasable_dlcs_for(store: &EntityStore, client: UserId) -> Vec<Game> {
    store
        .iter::<Game>()
        .filter(|g| g.kind == GameKind::Dlc && g.visible && g.is_published())
        .filter(|g| !owns(store, client, g.id) && base_owned(store, client, g.id))
        .cloned()
        .collect()
}

/// Base games the client can add to the wishlist: listed, neither
/// wishlisted nor owned.
pub fn wishable_for(store: &EntityStore, client: UserId) -> Vec<Game> {
    store
        .iter::<Game>()
        .filter(|g| g.kind == GameKind::Game && g.visible)
        .filter(|g| !wishes(store, client, g.id) && !owns(store, client, g.id))
        .cloned()
        .collect()
}

/// DLCs the client can add to the wishlist: listed, neither wishlisted
/// nor owned, for a base game the client owns.
pub fn wishable_dlcs_for(store: &EntityStore, client: UserId) -> Vec<Game> {
    store
        .iter::<Game>()
        .filter(|g| g.kind == GameKind::Dlc && g.visible)
        .filter(|g| {
            !wishes(store, client, g.id)
                && !owns(store, client, g.id)
                && base_owned(store, client, g.id)
        })
        .cloned()
        .collect()
}

fn by_name(a: &Game, b: &Game) -> Ordering {
    cmp_ignore_case(&a.name, &b.name)
}

fn by_price(a: &Game, b: &Game) -> Ordering {
    a.price.cmp(&b.price)
}

fn by_release_date(a: &Game, b: &Game) -> Ordering {
    cmp_dates_none_last(a.release_date.as_ref(), b.release_date.as_ref())
}

/// Comparator for one sort criterion.
pub fn comparator(criteria: SortCriteria) -> fn(&Game, &Game) -> Ordering {
    match criteria {
        SortCriteria::Name => by_name,
        SortCriteria::Price => by_price,
        SortCriteria::ReleaseDate => by_release_date,
    }
}

/// Sort games by one criterion, keeping ties in input order.
pub fn sort(games: &[Game], criteria: SortCriteria) -> Vec<Game> {
    sort_by_criteria(games, comparator(criteria))
}
