//! In-memory entity store: one ordered map per entity kind.
//!
//! Iteration over any collection is in key order, which gives selection
//! callers a stable, indexable order. The store also tracks the running
//! maximum of every user and game ID it has ever held so new IDs are never
//! reused, even after the row that carried them is deleted.

use std::collections::BTreeMap;

use gamemaster_types::{
    AllocatedId, Admin, Client, Contract, ContractKey, Dlc, Entity, EntityKind, Game, GameId,
    OwnershipKey, Provider, Purchase, Record, UserId, Wishlist,
};

use crate::error::WrongKind;

/// An entity kind the store holds a collection for.
pub trait Stored: Entity {
    /// The collection holding this kind.
    fn collection(store: &EntityStore) -> &BTreeMap<Self::Key, Self>;

    /// Mutable access to the collection holding this kind.
    fn collection_mut(store: &mut EntityStore) -> &mut BTreeMap<Self::Key, Self>;
}

macro_rules! impl_stored {
    ($ty:ty, $field:ident) => {
        impl Stored for $ty {
            fn collection(store: &EntityStore) -> &BTreeMap<Self::Key, Self> {
                &store.$field
            }

            fn collection_mut(store: &mut EntityStore) -> &mut BTreeMap<Self::Key, Self> {
                &mut store.$field
            }
        }
    };
}

/// Keyed collections of every entity kind plus the ID counters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityStore {
    admins: BTreeMap<UserId, Admin>,
    clients: BTreeMap<UserId, Client>,
    providers: BTreeMap<UserId, Provider>,
    games: BTreeMap<GameId, Game>,
    dlcs: BTreeMap<GameId, Dlc>,
    contracts: BTreeMap<ContractKey, Contract>,
    purchases: BTreeMap<OwnershipKey, Purchase>,
    wishlists: BTreeMap<OwnershipKey, Wishlist>,
    max_user_id: Option<UserId>,
    max_game_id: Option<GameId>,
}

impl_stored!(Admin, admins);
impl_stored!(Client, clients);
impl_stored!(Provider, providers);
impl_stored!(Game, games);
impl_stored!(Dlc, dlcs);
impl_stored!(Contract, contracts);
impl_stored!(Purchase, purchases);
impl_stored!(Wishlist, wishlists);

impl EntityStore {
    /// Create an empty store.
    pub const fn new() -> Self {
        Self {
            admins: BTreeMap::new(),
            clients: BTreeMap::new(),
            providers: BTreeMap::new(),
            games: BTreeMap::new(),
            dlcs: BTreeMap::new(),
            contracts: BTreeMap::new(),
            purchases: BTreeMap::new(),
            wishlists: BTreeMap::new(),
            max_user_id: None,
            max_game_id: None,
        }
    }

    /// Look up one value by key.
    pub fn get<E: Stored>(&self, key: E::Key) -> Option<&E> {
        E::collection(self).get(&key)
    }

    /// Whether a value with this key is held.
    pub fn contains<E: Stored>(&self, key: E::Key) -> bool {
        E::collection(self).contains_key(&key)
    }

    /// Iterate one collection in key order.
    pub fn iter<'a, E: Stored + 'a>(&'a self) -> impl Iterator<Item = &'a E>
    where
        E::Key: 'a,
    {
        E::collection(self).values()
    }

    /// Snapshot of one collection in key order.
    pub fn all<E: Stored>(&self) -> Vec<E> {
        self.iter::<E>().cloned().collect()
    }

    /// Insert or replace one value.
    pub fn put<E: Stored>(&mut self, value: E) {
        self.observe(value.allocated_id());
        E::collection_mut(self).insert(value.key(), value);
    }

    /// Remove one value, returning it if it was held.
    pub fn remove<E: Stored>(&mut self, key: E::Key) -> Option<E> {
        E::collection_mut(self).remove(&key)
    }

    /// Swap a whole collection for a fresh set of values.
    pub fn replace<E: Stored>(&mut self, values: Vec<E>) {
        let mut fresh = BTreeMap::new();
        for value in values {
            self.observe(value.allocated_id());
            fresh.insert(value.key(), value);
        }
        *E::collection_mut(self) = fresh;
    }

    /// Swap a whole collection for a set of gateway rows.
    ///
    /// Every row is decoded before anything is swapped: a row of the wrong
    /// kind leaves the collection untouched.
    pub fn replace_records(
        &mut self,
        kind: EntityKind,
        records: Vec<Record>,
    ) -> Result<usize, WrongKind> {
        match kind {
            EntityKind::Admin => self.replace_decoded::<Admin>(records),
            EntityKind::Client => self.replace_decoded::<Client>(records),
            EntityKind::Provider => self.replace_decoded::<Provider>(records),
            EntityKind::Game => self.replace_decoded::<Game>(records),
            EntityKind::Dlc => self.replace_decoded::<Dlc>(records),
            EntityKind::Contract => self.replace_decoded::<Contract>(records),
            EntityKind::Purchase => self.replace_decoded::<Purchase>(records),
            EntityKind::Wishlist => self.replace_decoded::<Wishlist>(records),
        }
    }

    fn replace_decoded<E: Stored>(&mut self, records: Vec<Record>) -> Result<usize, WrongKind> {
        let values = records
            .into_iter()
            .map(|record| {
                E::from_record(record).map_err(|other| WrongKind {
                    expected: E::KIND,
                    found: other.kind(),
                })
            })
            .collect::<Result<Vec<E>, _>>()?;
        let count = values.len();
        self.replace(values);
        Ok(count)
    }

    /// Number of values held for one kind.
    pub fn len(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Admin => self.admins.len(),
            EntityKind::Client => self.clients.len(),
            EntityKind::Provider => self.providers.len(),
            EntityKind::Game => self.games.len(),
            EntityKind::Dlc => self.dlcs.len(),
            EntityKind::Contract => self.contracts.len(),
            EntityKind::Purchase => self.purchases.len(),
            EntityKind::Wishlist => self.wishlists.len(),
        }
    }

    /// Whether every collection is empty.
    pub fn is_empty(&self) -> bool {
        EntityKind::ALL.iter().all(|kind| self.len(*kind) == 0)
    }

    /// Per-kind counts, in load order.
    pub fn summary(&self) -> StoreSummary {
        StoreSummary {
            counts: EntityKind::ALL
                .iter()
                .map(|kind| (*kind, self.len(*kind)))
                .collect(),
        }
    }

    /// The next unused user ID: the running maximum plus one.
    pub fn next_user_id(&self) -> UserId {
        self.max_user_id.map_or(UserId(1), UserId::successor)
    }

    /// The next unused game ID: the running maximum plus one.
    pub fn next_game_id(&self) -> GameId {
        self.max_game_id.map_or(GameId(1), GameId::successor)
    }

    fn observe(&mut self, id: Option<AllocatedId>) {
        match id {
            Some(AllocatedId::User(id)) => {
                self.max_user_id = Some(self.max_user_id.map_or(id, |max| max.max(id)));
            }
            Some(AllocatedId::Game(id)) => {
                self.max_game_id = Some(self.max_game_id.map_or(id, |max| max.max(id)));
            }
            None => {}
        }
    }
}

/// Per-kind counts of a store, for startup logging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreSummary {
    /// Count of values per kind, in load order.
    pub counts: Vec<(EntityKind, usize)>,
}

impl StoreSummary {
    /// Count for one kind.
    pub fn count(&self, kind: EntityKind) -> usize {
        self.counts
            .iter()
            .find(|(k, _)| *k == kind)
            .map_or(0, |(_, n)| *n)
    }
}

impl core::fmt::Display for StoreSummary {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for (kind, count) in &self.counts {
            if !first {
                f.write_str(", ")?;
            }
            first = false;
            write!(f, "{kind}={count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use chrono::NaiveDate;
    use gamemaster_types::{GameKind, Profile};
    use rust_decimal_macros::dec;

    use super::*;

    fn client(id: i32) -> Client {
        Client {
            profile: Profile {
                id: UserId(id),
                username: format!("client{id}"),
                password: "pw".to_owned(),
                email: None,
                banned: false,
            },
            first_name: "Ada".to_owned(),
            last_name: "Lovelace".to_owned(),
            phone: "555-0100".to_owned(),
        }
    }

    fn game(id: i32) -> Game {
        Game {
            id: GameId(id),
            developer_id: UserId(10),
            publisher_id: None,
            name: format!("Game {id}"),
            price: dec!(5),
            release_date: None,
            visible: true,
            kind: GameKind::Game,
        }
    }

    #[test]
    fn iteration_follows_key_order() {
        let mut store = EntityStore::new();
        store.put(game(3));
        store.put(game(1));
        store.put(game(2));
        let ids: Vec<_> = store.iter::<Game>().map(|g| g.id.0).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn collections_iterate_side_by_side() {
        let mut store = EntityStore::new();
        store.put(game(2));
        store.put(client(20));
        let pairs: Vec<_> = store
            .iter::<Game>()
            .zip(store.iter::<Client>())
            .map(|(g, c)| (g.id, c.profile.id))
            .collect();
        assert_eq!(pairs, vec![(GameId(2), UserId(20))]);
    }

    #[test]
    fn counters_never_reuse_ids() {
        let mut store = EntityStore::new();
        assert_eq!(store.next_user_id(), UserId(1));
        store.put(client(7));
        store.put(client(3));
        assert_eq!(store.next_user_id(), UserId(8));

        store.remove::<Client>(UserId(7));
        assert_eq!(store.next_user_id(), UserId(8));

        store.replace::<Client>(Vec::new());
        assert_eq!(store.next_user_id(), UserId(8));
        assert_eq!(store.next_game_id(), GameId(1));
    }

    #[test]
    fn wrong_kind_leaves_collection_untouched() {
        let mut store = EntityStore::new();
        store.put(game(1));
        let rows = vec![
            Record::Game(game(2)),
            Record::Wishlist(Wishlist {
                game_id: GameId(2),
                user_id: UserId(20),
                added_date: NaiveDate::MIN,
            }),
        ];
        let err = store.replace_records(EntityKind::Game, rows).unwrap_err();
        assert_eq!(err.found, EntityKind::Wishlist);
        assert_eq!(store.all::<Game>(), vec![game(1)]);
    }

    #[test]
    fn replace_records_swaps_whole_collection() {
        let mut store = EntityStore::new();
        store.put(game(1));
        let count = store
            .replace_records(EntityKind::Game, vec![Record::Game(game(4))])
            .unwrap();
        assert_eq!(count, 1);
        assert!(!store.contains::<Game>(GameId(1)));
        assert_eq!(store.next_game_id(), GameId(5));
    }

    #[test]
    fn summary_lists_every_kind() {
        let mut store = EntityStore::new();
        store.put(client(1));
        let summary = store.summary();
        assert_eq!(summary.counts.len(), 8);
        assert_eq!(summary.count(EntityKind::Client), 1);
        assert!(summary.to_string().starts_with("client=1, provider=0"));
        assert!(!store.is_empty());
    }
}
