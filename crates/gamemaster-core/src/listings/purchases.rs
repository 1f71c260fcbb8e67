//! Purchase listings for a client's library.

use core::cmp::Ordering;

use gamemaster_types::{Game, GameKind, Purchase, UserId};

use crate::query::{SortCriteria, cmp_dates_none_last, cmp_ignore_case, filter_by_condition};
use crate::store::EntityStore;

/// Purchases made by one client.
pub fn of_user(purchases: &[Purchase], client: UserId) -> Vec<Purchase> {
    filter_by_condition(purchases, |p| p.user_id == client)
}

/// Purchases of base games or of DLCs. Purchases whose game is not
/// mirrored match neither kind.
pub fn of_type(store: &EntityStore, purchases: &[Purchase], kind: GameKind) -> Vec<Purchase> {
    filter_by_condition(purchases, |p| {
        store.get::<Game>(p.game_id).is_some_and(|g| g.kind == kind)
    })
}

/// Comparator for one sort criterion: game name, price paid, or game
/// release date.
pub fn comparator(
    store: &EntityStore,
    criteria: SortCriteria,
) -> impl Fn(&Purchase, &Purchase) -> Ordering + '_ {
    move |a, b| {
        let game_a = store.get::<Game>(a.game_id);
        let game_b = store.get::<Game>(b.game_id);
        match criteria {
            SortCriteria::Name => cmp_ignore_case(
                game_a.map_or("", |g| g.name.as_str()),
                game_b.map_or("", |g| g.name.as_str()),
            ),
            SortCriteria::Price => a.price.cmp(&b.price),
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

    fn seeded() -> EntityStore {
        let mut store = EntityStore::new();
        for (id, name, kind) in [
            (1, "Zeta", GameKind::Game),
            (2, "alpha pack", GameKind::Dlc),
            (3, "Beta", GameKind::Game),
        ] {
            store.put(Game {
                id: GameId(id),
                developer_id: UserId(3),
                publisher_id: Some(UserId(5)),
                name: name.to_owned(),
                price: dec!(10),
                release_date: NaiveDate::from_ymd_opt(2020, 1, u32::try_from(id).unwrap_or(1)),
                visible: true,
                kind,
            });
        }
        store
    }

    fn purchase(game: i32, user: i32, price: Decimal) -> Purchase {
        Purchase {
            game_id: GameId(game),
            user_id: UserId(user),
            purchase_date: NaiveDate::MIN,
            price,
        }
    }

    #[test]
    fn filters_by_user_and_kind() {
        let store = seeded();
        let purchases = [
            purchase(1, 20, dec!(10)),
            purchase(2, 20, dec!(3)),
            purchase(3, 21, dec!(8)),
        ];
        let mine = of_user(&purchases, UserId(20));
        assert_eq!(mine.len(), 2);
        let dlcs = of_type(&store, &mine, GameKind::Dlc);
        assert_eq!(dlcs.first().map(|p| p.game_id), Some(GameId(2)));
    }

    #[test]
    fn sorts_by_game_name_and_price_paid() {
        let store = seeded();
        let purchases = [
            purchase(1, 20, dec!(10)),
            purchase(2, 20, dec!(3)),
            purchase(3, 20, dec!(8)),
        ];
        let by_name = sort_by_criteria(&purchases, comparator(&store, SortCriteria::Name));
        let names: Vec<_> = by_name.iter().map(|p| p.game_id.0).collect();
        assert_eq!(names, vec![2, 3, 1]);

        let by_price = sort_by_criteria(&purchases, comparator(&store, SortCriteria::Price));
        let prices: Vec<_> = by_price.iter().map(|p| p.price).collect();
        assert_eq!(prices, vec![dec!(3), dec!(8), dec!(10)]);

        let by_date = sort_by_criteria(&purchases, comparator(&store, SortCriteria::ReleaseDate));
        assert_eq!(by_date.first().map(|p| p.game_id), Some(GameId(1)));
    }
}
