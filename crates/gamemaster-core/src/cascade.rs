//! Cascade rules: which statements a delete issues and which collections
//! each mutation reloads afterwards.
//!
//! - client: purchases of user, wishlists of user, then the client row.
//!   Reloads purchases and wishlists.
//! - provider: hand published games back to their developers, delete
//!   developed games (each with its own cascade), the provider row, then
//!   its contracts. Reloads contracts, games, DLC links, purchases, and
//!   wishlists.
//! - game: purchases of game, wishlists of game, DLC links of game, then
//!   the game row. Reloads purchases, wishlists, DLC links, and clients.
//! - anything else: the row itself, with no reloads.
//!
//! Creates and updates never reload.

use gamemaster_types::{EntityKind, Game, GameId, RecordKey, UserId, Verb};

use crate::error::Operation;
use crate::gateway::Relation;
use crate::store::EntityStore;

const CLIENT_DELETE: &[EntityKind] = &[EntityKind::Purchase, EntityKind::Wishlist];

const PROVIDER_DELETE: &[EntityKind] = &[
    EntityKind::Contract,
    EntityKind::Game,
    EntityKind::Dlc,
    EntityKind::Purchase,
    EntityKind::Wishlist,
];

const GAME_DELETE: &[EntityKind] = &[
    EntityKind::Purchase,
    EntityKind::Wishlist,
    EntityKind::Dlc,
    EntityKind::Client,
];

/// Collections to reload, in order, after `verb` succeeds on `kind`.
pub const fn reloads(kind: EntityKind, verb: Verb) -> &'static [EntityKind] {
    match (kind, verb) {
        (EntityKind::Client, Verb::Delete) => CLIENT_DELETE,
        (EntityKind::Provider, Verb::Delete) => PROVIDER_DELETE,
        (EntityKind::Game, Verb::Delete) => GAME_DELETE,
        _ => &[],
    }
}

/// One statement of a delete cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Statement {
    /// Remove every row of a relation.
    DeleteRelated(Relation),
    /// Point a game at a different publisher.
    Reassign {
        /// The game being reassigned.
        game: GameId,
        /// Its new publisher.
        publisher: Option<UserId>,
    },
    /// Remove one row.
    Delete(RecordKey),
}

impl Statement {
    /// The collection this statement writes to.
    pub const fn kind(self) -> EntityKind {
        match self {
            Self::DeleteRelated(relation) => relation.kind(),
            Self::Reassign { .. } => EntityKind::Game,
            Self::Delete(key) => key.kind(),
        }
    }

    /// The gateway step this statement maps to.
    pub const fn operation(self) -> Operation {
        match self {
            Self::DeleteRelated(_) => Operation::DeleteRelated,
            Self::Reassign { .. } => Operation::Reassign,
            Self::Delete(_) => Operation::Delete,
        }
    }
}

impl core::fmt::Display for Statement {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::DeleteRelated(relation) => write!(f, "delete {relation}"),
            Self::Reassign {
                game,
                publisher: Some(publisher),
            } => write!(f, "reassign game {game} to publisher {publisher}"),
            Self::Reassign {
                game,
                publisher: None,
            } => write!(f, "unpublish game {game}"),
            Self::Delete(key) => write!(f, "delete {key}"),
        }
    }
}

/// The statements of one delete, split around the primary row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletePlan {
    /// Statements issued before the primary row is deleted.
    pub before: Vec<Statement>,
    /// The row the caller asked to delete.
    pub primary: RecordKey,
    /// Statements issued after the primary row is deleted.
    pub after: Vec<Statement>,
}

impl DeletePlan {
    /// Every statement in issue order.
    pub fn statements(&self) -> impl Iterator<Item = Statement> + '_ {
        self.before
            .iter()
            .copied()
            .chain(core::iter::once(Statement::Delete(self.primary)))
            .chain(self.after.iter().copied())
    }
}

fn game_statements(game: GameId) -> [Statement; 4] {
    [
        Statement::DeleteRelated(Relation::PurchasesOfGame(game)),
        Statement::DeleteRelated(Relation::WishlistsOfGame(game)),
        Statement::DeleteRelated(Relation::DlcLinksOfGame(game)),
        Statement::Delete(RecordKey::Game(game)),
    ]
}

/// Plan the statements that delete `key` and everything hanging off it.
///
/// Provider plans read the mirror to find the games the provider published
/// and developed.
pub fn delete_plan(store: &EntityStore, key: RecordKey) -> DeletePlan {
    let mut before = Vec::new();
    let mut after = Vec::new();

    match key {
        RecordKey::Client(user) => {
            before.push(Statement::DeleteRelated(Relation::PurchasesOfUser(user)));
            before.push(Statement::DeleteRelated(Relation::WishlistsOfUser(user)));
        }
        RecordKey::Provider(provider) => {
            before.extend(
                store
                    .iter::<Game>()
                    .filter(|g| g.is_published_by(provider))
                    .map(|g| Statement::Reassign {
                        game: g.id,
                        publisher: Some(g.developer_id),
                    }),
            );
            before.extend(
                store
                    .iter::<Game>()
                    .filter(|g| g.developer_id == provider)
                    .flat_map(|g| game_statements(g.id)),
            );
            after.push(Statement::DeleteRelated(Relation::ContractsOfProvider(
                provider,
            )));
        }
        RecordKey::Game(game) => {
            before.extend(game_statements(game).into_iter().take(3));
        }
        RecordKey::Admin(_)
        | RecordKey::Dlc(_)
        | RecordKey::Contract(_)
        | RecordKey::Purchase(_)
        | RecordKey::Wishlist(_) => {}
    }

    DeletePlan {
        before,
        primary: key,
        after,
    }
}

#[cfg(test)]
mod tests {
    use gamemaster_types::GameKind;
    use rust_decimal_macros::dec;

    use super::*;

    fn game(id: i32, developer: i32, publisher: Option<i32>) -> Game {
        Game {
            id: GameId(id),
            developer_id: UserId(developer),
            publisher_id: publisher.map(UserId),
            name: format!("Game {id}"),
            price: dec!(15),
            release_date: None,
            visible: true,
            kind: GameKind::Game,
        }
    }

    #[test]
    fn only_the_three_parent_kinds_reload() {
        for kind in EntityKind::ALL {
            assert!(reloads(kind, Verb::Create).is_empty());
            assert!(reloads(kind, Verb::Update).is_empty());
        }
        assert_eq!(
            reloads(EntityKind::Game, Verb::Delete),
            &[
                EntityKind::Purchase,
                EntityKind::Wishlist,
                EntityKind::Dlc,
                EntityKind::Client
            ]
        );
        assert!(reloads(EntityKind::Contract, Verb::Delete).is_empty());
    }

    #[test]
    fn game_delete_clears_links_first() {
        let plan = delete_plan(&EntityStore::new(), RecordKey::Game(GameId(1)));
        let statements: Vec<_> = plan.statements().collect();
        assert_eq!(statements, game_statements(GameId(1)).to_vec());
    }

    #[test]
    fn provider_delete_reassigns_then_drops_developed_games() {
        let mut store = EntityStore::new();
        store.put(game(1, 5, None));
        store.put(game(2, 3, Some(5)));
        store.put(game(3, 3, None));

        let plan = delete_plan(&store, RecordKey::Provider(UserId(5)));
        assert_eq!(
            plan.before.first(),
            Some(&Statement::Reassign {
                game: GameId(2),
                publisher: Some(UserId(3)),
            })
        );
        assert_eq!(plan.before.len(), 5);
        assert_eq!(
            plan.before.last(),
            Some(&Statement::Delete(RecordKey::Game(GameId(1))))
        );
        assert_eq!(
            plan.after,
            vec![Statement::DeleteRelated(Relation::ContractsOfProvider(
                UserId(5)
            ))]
        );
    }

    #[test]
    fn leaf_kinds_delete_only_their_row() {
        let key = RecordKey::Dlc(GameId(4));
        let plan = delete_plan(&EntityStore::new(), key);
        assert_eq!(plan.statements().collect::<Vec<_>>(), vec![Statement::Delete(key)]);
    }

    #[test]
    fn statements_describe_themselves() {
        let reassign = Statement::Reassign {
            game: GameId(2),
            publisher: Some(UserId(3)),
        };
        assert_eq!(reassign.to_string(), "reassign game 2 to publisher 3");
        assert_eq!(reassign.operation(), Operation::Reassign);
        assert_eq!(reassign.kind(), EntityKind::Game);
    }
}
