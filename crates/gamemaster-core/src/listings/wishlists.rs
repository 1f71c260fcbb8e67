//! Wishlist listings.

use core::cmp::Ordering;

use gamemaster_types::{Game, GameKind, UserId, Wishlist};

use crate::query::{SortCriteria, cmp_dates_none_last, cmp_ignore_case, filter_by_condition};
use crate::store::EntityStore;

/// Entries held by one client.
pub fn of_user(wishlists: &[Wishlist], client: UserId) -> Vec<Wishlist> {
    filter_by_condition(wishlists, |w| w.user_id == client)
}

/// Entries for base games or for DLCs.
pub fn of_type(store: &EntityStore, wishlists: &[Wishlist], kind: GameKind) -> Vec<Wishlist> {
    filter_by_condition(wishlists, |w| {
        store.get::<Game>(w.game_id).is_some_and(|g| g.kind == kind)
    })
}

/// Entries whose game is already released (`true`) or still unpublished
/// (`false`).
pub fn with_published_status(
    store: &EntityStore,
    wishlists: &[Wishlist],
    published: bool,
) -> Vec<Wishlist> {
    filter_by_condition(wishlists, |w| {
        store
            .get::<Game>(w.game_id)
            .is_some_and(|g| g.is_published() == published)
    })
}

/// Comparator for one sort criterion: game name, current game price, or
/// game release date.
pub fn comparator(
    store: &EntityStore,
    criteria: SortCriteria,
) -> impl Fn(&Wishlist, &Wishlist) -> Ordering + '_ {
    move |a, b| {
        let game_a = store.get::<Game>(a.game_id);
        let game_b = store.get::<Game>(b.game_id);
        match criteria {
            SortCriteria::Name => cmp_ignore_case(
                game_a.map_or("", |g| g.name.as_str()),
                game_b.map_or("", |g| g.name.as_str()),
            ),
            SortCriteria::Price => game_a.map(|g| g.price).cmp(&game_b.map(|g| g.price)),
            SortCriteria::ReleaseDate => cmp_dates_none_last(
                game_a.and_then(|g| g.release_date.as_ref()),
                game_b.and_then(|g| g.release_date.as_ref()),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use gamemaster_types::GameId;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::query::sort_by_criteria;

    fn game(id: i32, publisher: Option<i32>, price: Decimal) -> Game {
        Game {
            id: GameId(id),
            developer_id: UserId(3),
            publisher_id: publisher.map(UserId),
            name: format!("Game {id}"),
            price,
            release_date: None,
            visible: true,
            kind: GameKind::Game,
        }
    }

    fn entry(game: i32, user: i32) -> Wishlist {
        Wishlist {
            game_id: GameId(game),
            user_id: UserId(user),
            added_date: NaiveDate::MIN,
        }
    }

    #[test]
    fn splits_by_published_status() {
        let mut store = EntityStore::new();
        store.put(game(1, Some(5), dec!(30)));
        store.put(game(2, None, dec!(5)));
        let entries = [entry(1, 20), entry(2, 20), entry(2, 21)];

        let mine = of_user(&entries, UserId(20));
        assert_eq!(with_published_status(&store, &mine, true).len(), 1);
        assert_eq!(with_published_status(&store, &mine, false).len(), 1);
        assert_eq!(of_type(&store, &mine, GameKind::Game).len(), 2);
        assert!(of_type(&store, &mine, GameKind::Dlc).is_empty());
    }

    #[test]
    fn sorts_by_current_game_price() {
        let mut store = EntityStore::new();
        store.put(game(1, Some(5), dec!(30)));
        store.put(game(2, None, dec!(5)));
        let entries = [entry(1, 20), entry(2, 20)];
        let sorted = sort_by_criteria(&entries, comparator(&store, SortCriteria::Price));
        assert_eq!(sorted.first().map(|w| w.game_id), Some(GameId(2)));
    }
}
