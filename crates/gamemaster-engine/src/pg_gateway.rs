//! [`Gateway`] implementation over the `PostgreSQL` stores.
//!
//! Each gateway statement maps onto one store call. Account rows are
//! wrapped back into a [`User`] so the user store can write the shared row
//! and the extension row together.

use gamemaster_core::{Gateway, Relation};
use gamemaster_db::{
    ContractStore, DbError, GameStore, LibraryStore, Owner, PostgresPool, UserStore,
};
use gamemaster_types::{EntityKind, GameId, Record, RecordKey, User, UserId, UserKind};

/// Catalog gateway backed by a `PostgreSQL` pool.
pub struct PgGateway {
    pg: PostgresPool,
}

impl PgGateway {
    /// Wrap a connected pool.
    pub const fn new(pg: PostgresPool) -> Self {
        Self { pg }
    }

    /// Close the underlying pool.
    pub async fn close(&self) {
        self.pg.close().await;
    }

    fn users(&self) -> UserStore<'_> {
        UserStore::new(self.pg.pool())
    }

    fn games(&self) -> GameStore<'_> {
        GameStore::new(self.pg.pool())
    }

    fn contracts(&self) -> ContractStore<'_> {
        ContractStore::new(self.pg.pool())
    }

    fn library(&self) -> LibraryStore<'_> {
        LibraryStore::new(self.pg.pool())
    }
}

/// Wrap typed rows as gateway records.
fn records<T: Into<Record>>(rows: Vec<T>) -> Vec<Record> {
    rows.into_iter().map(Into::into).collect()
}

impl Gateway for PgGateway {
    type Error = DbError;

    async fn load_all(&mut self, kind: EntityKind) -> Result<Vec<Record>, DbError> {
        let rows = match kind {
            EntityKind::Admin => records(self.users().admins(None).await?),
            EntityKind::Client => records(self.users().clients(None).await?),
            EntityKind::Provider => records(self.users().providers(None).await?),
            EntityKind::Game => records(self.games().games(None).await?),
            EntityKind::Dlc => records(self.games().dlcs(None).await?),
            EntityKind::Contract => records(self.contracts().contracts(None).await?),
            EntityKind::Purchase => records(self.library().purchases(None).await?),
            EntityKind::Wishlist => records(self.library().wishlists(None).await?),
        };
        tracing::debug!(kind = kind.as_str(), rows = rows.len(), "Scanned table");
        Ok(rows)
    }

    async fn select(&mut self, key: RecordKey) -> Result<Option<Record>, DbError> {
        let rows = match key {
            RecordKey::Admin(id) => records(self.users().admins(Some(id)).await?),
            RecordKey::Client(id) => records(self.users().clients(Some(id)).await?),
            RecordKey::Provider(id) => records(self.users().providers(Some(id)).await?),
            RecordKey::Game(id) => records(self.games().games(Some(id)).await?),
            RecordKey::Dlc(id) => records(self.games().dlcs(Some(id)).await?),
            RecordKey::Contract(k) => records(self.contracts().contracts(Some(k)).await?),
            RecordKey::Purchase(k) => records(self.library().purchases(Some(k)).await?),
            RecordKey::Wishlist(k) => records(self.library().wishlists(Some(k)).await?),
        };
        Ok(rows.into_iter().next())
    }

    async fn insert(&mut self, record: &Record) -> Result<u64, DbError> {
        match record {
            Record::Admin(a) => self.users().insert(&User::Admin(a.clone())).await,
            Record::Client(c) => self.users().insert(&User::Client(c.clone())).await,
            Record::Provider(p) => self.users().insert(&User::Provider(p.clone())).await,
            Record::Game(game) => self.games().insert(game).await,
            Record::Dlc(dlc) => self.games().insert_dlc(dlc).await,
            Record::Contract(contract) => self.contracts().insert(contract).await,
            Record::Purchase(purchase) => self.library().insert_purchase(purchase).await,
            Record::Wishlist(wishlist) => self.library().insert_wishlist(wishlist).await,
        }
    }

    async fn update(&mut self, record: &Record) -> Result<u64, DbError> {
        match record {
            Record::Admin(a) => self.users().update(&User::Admin(a.clone())).await,
            Record::Client(c) => self.users().update(&User::Client(c.clone())).await,
            Record::Provider(p) => self.users().update(&User::Provider(p.clone())).await,
            Record::Game(game) => self.games().update(game).await,
            Record::Dlc(dlc) => self.games().update_dlc(dlc).await,
            Record::Contract(contract) => self.contracts().update(contract).await,
            Record::Purchase(purchase) => self.library().update_purchase(purchase).await,
            Record::Wishlist(wishlist) => self.library().update_wishlist(wishlist).await,
        }
    }

    async fn delete(&mut self, key: RecordKey) -> Result<u64, DbError> {
        match key {
            RecordKey::Admin(id) => self.users().delete(UserKind::Admin, id).await,
            RecordKey::Client(id) => self.users().delete(UserKind::Client, id).await,
            RecordKey::Provider(id) => self.users().delete(UserKind::Provider, id).await,
            RecordKey::Game(id) => self.games().delete(id).await,
            RecordKey::Dlc(id) => self.games().delete_dlc(id).await,
            RecordKey::Contract(k) => self.contracts().delete(k).await,
            RecordKey::Purchase(k) => self.library().delete_purchase(k).await,
            RecordKey::Wishlist(k) => self.library().delete_wishlist(k).await,
        }
    }

    async fn delete_related(&mut self, relation: Relation) -> Result<u64, DbError> {
        match relation {
            Relation::PurchasesOfGame(id) => {
                self.library().delete_purchases_of(Owner::Game(id)).await
            }
            Relation::WishlistsOfGame(id) => {
                self.library().delete_wishlists_of(Owner::Game(id)).await
            }
            Relation::DlcLinksOfGame(id) => self.games().delete_dlc_links(id).await,
            Relation::PurchasesOfUser(id) => {
                self.library().delete_purchases_of(Owner::User(id)).await
            }
            Relation::WishlistsOfUser(id) => {
                self.library().delete_wishlists_of(Owner::User(id)).await
            }
            Relation::ContractsOfProvider(id) => self.contracts().delete_of_provider(id).await,
        }
    }

    async fn reassign_publisher(
        &mut self,
        game: GameId,
        publisher: Option<UserId>,
    ) -> Result<u64, DbError> {
        self.games().reassign_publisher(game, publisher).await
    }
}
