//! In-memory [`Gateway`] with relational semantics and failure injection.
//!
//! Rows live in one ordered map keyed by [`RecordKey`]. Inserts and updates
//! check the same references the `PostgreSQL` schema enforces, deletes of
//! a still-referenced row are refused, and contracts vanish with either of
//! their providers. Failures can be injected per statement or per loaded
//! kind so tests can drive the catalog through partial cascades.

use std::collections::{BTreeMap, BTreeSet};

use gamemaster_types::{EntityKind, GameId, Record, RecordKey, UserId};

use crate::gateway::{Gateway, Relation};

/// Errors raised by the in-memory gateway.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoryError {
    /// A failure requested through the injection hooks.
    #[error("injected failure on {statement}")]
    Injected {
        /// The statement that was refused.
        statement: String,
    },

    /// A row with the same key (or user ID) already exists.
    #[error("duplicate key {key}")]
    DuplicateKey {
        /// The conflicting key.
        key: RecordKey,
    },

    /// A row references a missing row, or a delete would orphan one.
    #[error("foreign key violation on {key}: {detail}")]
    ForeignKey {
        /// The row being written or deleted.
        key: RecordKey,
        /// The broken reference.
        detail: String,
    },
}

/// A statement issued against the gateway, in issue order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issued {
    /// A single-row lookup.
    Select(RecordKey),
    /// A row insert.
    Insert(RecordKey),
    /// A row rewrite.
    Update(RecordKey),
    /// A row delete.
    Delete(RecordKey),
    /// A bulk delete of related rows.
    DeleteRelated(Relation),
    /// A publisher reassignment.
    Reassign(GameId, Option<UserId>),
}

/// Gateway over in-memory tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryGateway {
    rows: BTreeMap<RecordKey, Record>,
    issued: Vec<Issued>,
    skip_before_failing: usize,
    failures_left: usize,
    failing_loads: BTreeSet<EntityKind>,
}

impl MemoryGateway {
    /// Create an empty gateway.
    pub const fn new() -> Self {
        Self {
            rows: BTreeMap::new(),
            issued: Vec::new(),
            skip_before_failing: 0,
            failures_left: 0,
            failing_loads: BTreeSet::new(),
        }
    }

    /// Create a gateway pre-populated with rows, bypassing every check.
    pub fn with_rows(rows: impl IntoIterator<Item = Record>) -> Self {
        let mut gateway = Self::new();
        for row in rows {
            gateway.seed(row);
        }
        gateway
    }

    /// Write a row directly, bypassing every check and the statement log.
    pub fn seed(&mut self, row: Record) {
        self.rows.insert(row.key(), row);
    }

    /// Read a row directly, bypassing the statement log.
    pub fn row(&self, key: RecordKey) -> Option<&Record> {
        self.rows.get(&key)
    }

    /// Every row of one kind, in key order, bypassing the statement log.
    pub fn rows_of(&self, kind: EntityKind) -> Vec<Record> {
        self.rows
            .values()
            .filter(|row| row.kind() == kind)
            .cloned()
            .collect()
    }

    /// Statements issued so far, oldest first. Loads are not logged.
    pub fn issued(&self) -> &[Issued] {
        &self.issued
    }

    /// Forget the statement log.
    pub fn clear_issued(&mut self) {
        self.issued.clear();
    }

    /// Fail the next `count` statements.
    pub const fn fail_next(&mut self, count: usize) {
        self.fail_statements(0, count);
    }

    /// Let `skip` statements succeed, then fail the following `count`.
    pub const fn fail_statements(&mut self, skip: usize, count: usize) {
        self.skip_before_failing = skip;
        self.failures_left = count;
    }

    /// Fail every load of `kind` until [`heal_loads`](Self::heal_loads).
    pub fn fail_loads_of(&mut self, kind: EntityKind) {
        self.failing_loads.insert(kind);
    }

    /// Stop failing loads.
    pub fn heal_loads(&mut self) {
        self.failing_loads.clear();
    }

    fn issue(&mut self, statement: Issued) -> Result<(), MemoryError> {
        let label = format!("{statement:?}");
        self.issued.push(statement);
        if self.failures_left == 0 {
            return Ok(());
        }
        if self.skip_before_failing > 0 {
            self.skip_before_failing = self.skip_before_failing.saturating_sub(1);
            return Ok(());
        }
        self.failures_left = self.failures_left.saturating_sub(1);
        Err(MemoryError::Injected { statement: label })
    }

    fn user_exists(&self, id: UserId) -> bool {
        [
            RecordKey::Admin(id),
            RecordKey::Client(id),
            RecordKey::Provider(id),
        ]
        .iter()
        .any(|key| self.rows.contains_key(key))
    }

    fn require(&self, owner: RecordKey, target: RecordKey) -> Result<(), MemoryError> {
        if self.rows.contains_key(&target) {
            Ok(())
        } else {
            Err(MemoryError::ForeignKey {
                key: owner,
                detail: format!("{target} does not exist"),
            })
        }
    }

    fn check_references(&self, row: &Record) -> Result<(), MemoryError> {
        let key = row.key();
        match row {
            Record::Admin(_) | Record::Client(_) | Record::Provider(_) => Ok(()),
            Record::Game(game) => {
                self.require(key, RecordKey::Provider(game.developer_id))?;
                match game.publisher_id {
                    Some(publisher) => self.require(key, RecordKey::Provider(publisher)),
                    None => Ok(()),
                }
            }
            Record::Dlc(dlc) => {
                self.require(key, RecordKey::Game(dlc.id))?;
                self.require(key, RecordKey::Game(dlc.base_game_id))
            }
            Record::Contract(contract) => {
                self.require(key, RecordKey::Provider(contract.developer_id))?;
                self.require(key, RecordKey::Provider(contract.publisher_id))
            }
            Record::Purchase(purchase) => {
                self.require(key, RecordKey::Game(purchase.game_id))?;
                self.require(key, RecordKey::Client(purchase.user_id))
            }
            Record::Wishlist(wishlist) => {
                self.require(key, RecordKey::Game(wishlist.game_id))?;
                self.require(key, RecordKey::Client(wishlist.user_id))
            }
        }
    }

    fn referrer_of(&self, key: RecordKey) -> Option<RecordKey> {
        self.rows.values().find_map(|row| {
            let refers = match (key, row) {
                (RecordKey::Provider(id), Record::Game(game)) => {
                    game.developer_id == id || game.publisher_id == Some(id)
                }
                (RecordKey::Client(id), Record::Purchase(p)) => p.user_id == id,
                (RecordKey::Client(id), Record::Wishlist(w)) => w.user_id == id,
                (RecordKey::Game(id), Record::Purchase(p)) => p.game_id == id,
                (RecordKey::Game(id), Record::Wishlist(w)) => w.game_id == id,
                (RecordKey::Game(id), Record::Dlc(d)) => d.id == id || d.base_game_id == id,
                _ => false,
            };
            refers.then(|| row.key())
        })
    }

    fn matches(relation: Relation, row: &Record) -> bool {
        match (relation, row) {
            (Relation::PurchasesOfGame(id), Record::Purchase(p)) => p.game_id == id,
            (Relation::WishlistsOfGame(id), Record::Wishlist(w)) => w.game_id == id,
            (Relation::DlcLinksOfGame(id), Record::Dlc(d)) => d.id == id || d.base_game_id == id,
            (Relation::PurchasesOfUser(id), Record::Purchase(p)) => p.user_id == id,
            (Relation::WishlistsOfUser(id), Record::Wishlist(w)) => w.user_id == id,
            (Relation::ContractsOfProvider(id), Record::Contract(c)) => {
                c.developer_id == id || c.publisher_id == id
            }
            _ => false,
        }
    }

    fn remove_matching(&mut self, relation: Relation) -> u64 {
        let before = self.rows.len();
        self.rows.retain(|_, row| !Self::matches(relation, row));
        u64::try_from(before.saturating_sub(self.rows.len())).unwrap_or(u64::MAX)
    }
}

impl Gateway for MemoryGateway {
    type Error = MemoryError;

    async fn load_all(&mut self, kind: EntityKind) -> Result<Vec<Record>, Self::Error> {
        if self.failing_loads.contains(&kind) {
            return Err(MemoryError::Injected {
                statement: format!("load {kind}"),
            });
        }
        Ok(self.rows_of(kind))
    }

    async fn select(&mut self, key: RecordKey) -> Result<Option<Record>, Self::Error> {
        self.issue(Issued::Select(key))?;
        Ok(self.rows.get(&key).cloned())
    }

    async fn insert(&mut self, record: &Record) -> Result<u64, Self::Error> {
        let key = record.key();
        self.issue(Issued::Insert(key))?;
        let taken = match key {
            RecordKey::Admin(id) | RecordKey::Client(id) | RecordKey::Provider(id) => {
                self.user_exists(id)
            }
            _ => self.rows.contains_key(&key),
        };
        if taken {
            return Err(MemoryError::DuplicateKey { key });
        }
        self.check_references(record)?;
        self.rows.insert(key, record.clone());
        Ok(1)
    }

    async fn update(&mut self, record: &Record) -> Result<u64, Self::Error> {
        let key = record.key();
        self.issue(Issued::Update(key))?;
        if !self.rows.contains_key(&key) {
            return Ok(0);
        }
        self.check_references(record)?;
        self.rows.insert(key, record.clone());
        Ok(1)
    }

    async fn delete(&mut self, key: RecordKey) -> Result<u64, Self::Error> {
        self.issue(Issued::Delete(key))?;
        if !self.rows.contains_key(&key) {
            return Ok(0);
        }
        if let Some(referrer) = self.referrer_of(key) {
            return Err(MemoryError::ForeignKey {
                key,
                detail: format!("still referenced by {referrer}"),
            });
        }
        self.rows.remove(&key);
        if let RecordKey::Provider(id) = key {
            self.remove_matching(Relation::ContractsOfProvider(id));
        }
        Ok(1)
    }

    async fn delete_related(&mut self, relation: Relation) -> Result<u64, Self::Error> {
        self.issue(Issued::DeleteRelated(relation))?;
        Ok(self.remove_matching(relation))
    }

    async fn reassign_publisher(
        &mut self,
        game: GameId,
        publisher: Option<UserId>,
    ) -> Result<u64, Self::Error> {
        self.issue(Issued::Reassign(game, publisher))?;
        let key = RecordKey::Game(game);
        if let Some(publisher) = publisher {
            self.require(key, RecordKey::Provider(publisher))?;
        }
        match self.rows.get_mut(&key) {
            Some(Record::Game(row)) => {
                row.publisher_id = publisher;
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}
