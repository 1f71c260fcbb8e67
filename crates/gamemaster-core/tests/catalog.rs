//! Integration tests for the catalog coordinator.
//!
//! Every test drives a [`Catalog`] over a [`MemoryGateway`] seeded with a
//! small catalog, then checks the mirror, the gateway rows, the statement
//! log, and the audit trail together.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::too_many_lines,
    clippy::indexing_slicing
)]

use chrono::NaiveDate;
use gamemaster_core::listings::games;
use gamemaster_core::{
    Catalog, CatalogError, Gateway, Issued, MemoryAudit, MemoryGateway, Operation, Relation,
};
use gamemaster_types::{
    Admin, Client, Contract, ContractKey, ContractStatus, Dlc, EntityKind, Game, GameId,
    GameKind, OwnershipKey, Profile, Provider, ProviderType, Purchase, Record, RecordKey,
    UserId, Verb, Wishlist,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

type TestCatalog = Catalog<MemoryGateway, MemoryAudit>;

fn day(month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, month, day).expect("valid date")
}

fn profile(id: i32, username: &str) -> Profile {
    Profile {
        id: UserId(id),
        username: username.to_owned(),
        password: "secret".to_owned(),
        email: Some(format!("{username}@example.com")),
        banned: false,
    }
}

fn client(id: i32, username: &str) -> Client {
    Client {
        profile: profile(id, username),
        first_name: "Ada".to_owned(),
        last_name: "Lovelace".to_owned(),
        phone: "555-0100".to_owned(),
    }
}

fn provider(id: i32, username: &str, provider_type: ProviderType) -> Provider {
    Provider {
        profile: profile(id, username),
        website: None,
        provider_type,
    }
}

fn game(id: i32, developer: i32, publisher: Option<i32>, name: &str, price: Decimal) -> Game {
    Game {
        id: GameId(id),
        developer_id: UserId(developer),
        publisher_id: publisher.map(UserId),
        name: name.to_owned(),
        price,
        release_date: publisher.map(|_| day(3, 1)),
        visible: true,
        kind: GameKind::Game,
    }
}

/// Admin 1, developers 3 and 10, publishers 5 and 6, clients 20 and 21.
/// Game 2 is developed by 3 and published by 5 under an accepted contract.
/// Client 20 owns game 2 and client 21 wishes for it.
fn seed_rows() -> Vec<Record> {
    vec![
        Record::Admin(Admin {
            profile: profile(1, "root"),
            cut_percentage: dec!(30),
        }),
        provider(3, "devco", ProviderType::Developer).into(),
        provider(10, "indie", ProviderType::Developer).into(),
        provider(5, "pubco", ProviderType::Publisher).into(),
        provider(6, "bigpub", ProviderType::Publisher).into(),
        client(20, "gamer").into(),
        client(21, "casual").into(),
        game(2, 3, Some(5), "Beta", dec!(20)).into(),
        Contract {
            developer_id: UserId(3),
            publisher_id: UserId(5),
            status: ContractStatus::Accepted,
            start_date: day(1, 1),
            end_date: day(12, 31),
        }
        .into(),
        Purchase {
            game_id: GameId(2),
            user_id: UserId(20),
            purchase_date: day(3, 2),
            price: dec!(20),
        }
        .into(),
        Wishlist {
            game_id: GameId(2),
            user_id: UserId(21),
            added_date: day(3, 3),
        }
        .into(),
    ]
}

async fn loaded() -> TestCatalog {
    let mut catalog = Catalog::new(MemoryGateway::with_rows(seed_rows()), MemoryAudit::new());
    catalog.load_all().await.expect("initial load");
    catalog
}

/// Game 7 is a DLC of game 2 owned by client 20.
async fn with_dlc(catalog: &mut TestCatalog) {
    let mut row = game(7, 3, Some(5), "Beta: Night Shift", dec!(5));
    row.kind = GameKind::Dlc;
    catalog.create(row).await.unwrap();
    catalog
        .create(Dlc {
            id: GameId(7),
            base_game_id: GameId(2),
        })
        .await
        .unwrap();
    catalog
        .create(Purchase {
            game_id: GameId(7),
            user_id: UserId(20),
            purchase_date: day(4, 1),
            price: dec!(5),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn load_all_mirrors_every_collection() {
    let catalog = loaded().await;
    let summary = catalog.store().summary();
    assert_eq!(summary.count(EntityKind::Provider), 4);
    assert_eq!(summary.count(EntityKind::Client), 2);
    assert_eq!(summary.count(EntityKind::Game), 1);
    assert_eq!(summary.count(EntityKind::Purchase), 1);
    assert!(catalog.stale_kinds().is_empty());
    assert!(catalog.audit().entries().is_empty());
}

#[tokio::test]
async fn scenario_game_delete_removes_its_purchases() {
    let mut catalog = loaded().await;
    catalog
        .create(game(1, 10, None, "Alpha", Decimal::ZERO))
        .await
        .unwrap();
    let key = OwnershipKey::new(GameId(1), UserId(20));
    catalog
        .create(Purchase {
            game_id: GameId(1),
            user_id: UserId(20),
            purchase_date: day(5, 1),
            price: Decimal::ZERO,
        })
        .await
        .unwrap();

    assert!(catalog.delete::<Game>(GameId(1)).await.unwrap());

    assert!(!catalog.store().contains::<Game>(GameId(1)));
    assert!(!catalog.store().contains::<Purchase>(key));
    assert!(catalog.gateway().row(RecordKey::Purchase(key)).is_none());
    assert!(catalog.gateway().row(RecordKey::Game(GameId(1))).is_none());
    assert!(
        catalog
            .store()
            .contains::<Purchase>(OwnershipKey::new(GameId(2), UserId(20)))
    );
}

#[tokio::test]
async fn scenario_publisher_delete_hands_games_back() {
    let mut catalog = loaded().await;

    assert!(catalog.delete::<Provider>(UserId(5)).await.unwrap());

    let beta = catalog.store().get::<Game>(GameId(2)).unwrap();
    assert_eq!(beta.publisher_id, Some(UserId(3)));
    assert!(!catalog.store().contains::<Provider>(UserId(5)));
    assert!(
        catalog
            .store()
            .iter::<Contract>()
            .all(|c| !c.contract_key().involves(UserId(5)))
    );
    assert!(
        catalog
            .store()
            .iter::<Game>()
            .all(|g| g.publisher_id != Some(UserId(5)))
    );
    assert!(catalog.gateway().rows_of(EntityKind::Contract).is_empty());
    assert_eq!(
        catalog.audit().pairs(),
        vec![(EntityKind::Provider, Verb::Delete)]
    );
}

#[tokio::test]
async fn developer_delete_takes_its_games_along() {
    let mut catalog = loaded().await;
    with_dlc(&mut catalog).await;

    assert!(catalog.delete::<Provider>(UserId(3)).await.unwrap());

    let store = catalog.store();
    assert!(store.iter::<Game>().all(|g| g.developer_id != UserId(3)));
    assert_eq!(store.len(EntityKind::Dlc), 0);
    assert_eq!(store.len(EntityKind::Purchase), 0);
    assert_eq!(store.len(EntityKind::Wishlist), 0);
    assert_eq!(store.len(EntityKind::Contract), 0);
}

#[tokio::test]
async fn scenario_duplicate_contract_is_rejected() {
    let mut catalog = loaded().await;
    catalog.gateway_mut().clear_issued();

    let err = catalog
        .create(Contract {
            developer_id: UserId(3),
            publisher_id: UserId(5),
            status: ContractStatus::Pending,
            start_date: day(6, 1),
            end_date: day(6, 30),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CatalogError::UniqueConstraintViolation {
            kind: EntityKind::Contract,
            ..
        }
    ));
    assert_eq!(catalog.store().len(EntityKind::Contract), 1);
    let held = catalog
        .store()
        .get::<Contract>(ContractKey::new(UserId(3), UserId(5)))
        .unwrap();
    assert_eq!(held.status, ContractStatus::Accepted);
    assert!(catalog.gateway().issued().is_empty());
    assert!(catalog.audit().entries().is_empty());
}

#[tokio::test]
async fn scenario_by_type_keeps_order() {
    let dlc = |id| {
        let mut row = game(id, 3, None, "x", dec!(1));
        row.kind = GameKind::Dlc;
        row
    };
    let list = [
        game(5, 3, None, "a", dec!(1)),
        dlc(8),
        game(1, 3, None, "b", dec!(1)),
        dlc(4),
        game(9, 3, None, "c", dec!(1)),
    ];
    let picked: Vec<_> = games::by_type(&list, GameKind::Dlc)
        .iter()
        .map(|g| g.id)
        .collect();
    assert_eq!(picked, vec![GameId(8), GameId(4)]);
}

#[tokio::test]
async fn game_delete_leaves_no_reference_behind() {
    let mut catalog = loaded().await;
    with_dlc(&mut catalog).await;

    assert!(catalog.delete::<Game>(GameId(2)).await.unwrap());

    let store = catalog.store();
    assert!(store.iter::<Purchase>().all(|p| p.game_id != GameId(2)));
    assert!(store.iter::<Wishlist>().all(|w| w.game_id != GameId(2)));
    assert!(
        store
            .iter::<Dlc>()
            .all(|d| d.id != GameId(2) && d.base_game_id != GameId(2))
    );
    // The DLC's own game row outlives its base game.
    assert!(store.contains::<Game>(GameId(7)));

    let issued = catalog.gateway().issued();
    let tail = &issued[issued.len().saturating_sub(4)..];
    assert_eq!(
        tail,
        &[
            Issued::DeleteRelated(Relation::PurchasesOfGame(GameId(2))),
            Issued::DeleteRelated(Relation::WishlistsOfGame(GameId(2))),
            Issued::DeleteRelated(Relation::DlcLinksOfGame(GameId(2))),
            Issued::Delete(RecordKey::Game(GameId(2))),
        ]
    );
}

#[tokio::test]
async fn client_delete_clears_library_and_wishlist() {
    let mut catalog = loaded().await;

    assert!(catalog.delete_user(UserId(20)).await.unwrap());
    assert!(catalog.delete_user(UserId(21)).await.unwrap());

    assert!(catalog.store().iter::<Purchase>().next().is_none());
    assert!(catalog.store().iter::<Wishlist>().next().is_none());
    assert!(!catalog.delete_user(UserId(99)).await.unwrap());
}

#[tokio::test]
async fn keys_stay_unique() {
    let mut catalog = loaded().await;

    let taken_id = catalog.create(client(3, "newcomer")).await.unwrap_err();
    assert!(matches!(
        taken_id,
        CatalogError::UniqueConstraintViolation { .. }
    ));

    let taken_name = catalog.create(client(30, "GAMER")).await.unwrap_err();
    assert!(matches!(
        taken_name,
        CatalogError::UniqueConstraintViolation { .. }
    ));

    let again = catalog
        .create(Purchase {
            game_id: GameId(2),
            user_id: UserId(20),
            purchase_date: day(7, 1),
            price: dec!(20),
        })
        .await
        .unwrap_err();
    assert!(matches!(again, CatalogError::UniqueConstraintViolation { .. }));
    assert_eq!(catalog.store().len(EntityKind::Purchase), 1);
}

#[tokio::test]
async fn names_collide_across_unicode_case() {
    let mut catalog = loaded().await;
    catalog.create(client(30, "Émile")).await.unwrap();

    let clash = catalog.create(client(31, "éMILE")).await.unwrap_err();
    assert!(matches!(
        clash,
        CatalogError::UniqueConstraintViolation { .. }
    ));
    assert_eq!(catalog.store().len(EntityKind::Client), 3);
    assert!(
        catalog
            .gateway()
            .row(RecordKey::Client(UserId(31)))
            .is_none()
    );

    catalog
        .create(game(8, 3, None, "Ærø Saga", dec!(10)))
        .await
        .unwrap();
    let same_game = catalog
        .create(game(9, 10, None, "æRØ SAGA", dec!(12)))
        .await
        .unwrap_err();
    assert!(matches!(
        same_game,
        CatalogError::UniqueConstraintViolation { .. }
    ));
}

#[tokio::test]
async fn read_after_write_returns_equal_value() {
    let mut catalog = loaded().await;
    let fresh = client(30, "newcomer");
    catalog.create(fresh.clone()).await.unwrap();

    let read = catalog.read::<Client>(UserId(30)).await.unwrap();
    assert_eq!(read, Some(fresh));
}

#[tokio::test]
async fn read_of_vanished_row_drops_it_from_the_mirror() {
    let mut catalog = loaded().await;
    let key = OwnershipKey::new(GameId(2), UserId(21));
    catalog
        .gateway_mut()
        .delete(RecordKey::Wishlist(key))
        .await
        .unwrap();

    assert!(catalog.store().contains::<Wishlist>(key));
    assert_eq!(catalog.read::<Wishlist>(key).await.unwrap(), None);
    assert!(!catalog.store().contains::<Wishlist>(key));
}

#[tokio::test]
async fn reload_is_idempotent() {
    let mut catalog = loaded().await;
    catalog.reload(EntityKind::Game).await.unwrap();
    let first = catalog.store().all::<Game>();
    catalog.reload(EntityKind::Game).await.unwrap();
    assert_eq!(catalog.store().all::<Game>(), first);
}

#[tokio::test]
async fn failed_first_statement_leaves_mirror_untouched() {
    let mut catalog = loaded().await;
    let before = catalog.store().clone();
    catalog.gateway_mut().fail_next(1);

    let err = catalog.delete::<Game>(GameId(2)).await.unwrap_err();

    assert!(matches!(
        err,
        CatalogError::Persistence {
            kind: EntityKind::Purchase,
            operation: Operation::DeleteRelated,
            ..
        }
    ));
    assert_eq!(catalog.store(), &before);
    assert!(catalog.stale_kinds().is_empty());
    assert!(catalog.audit().entries().is_empty());
}

#[tokio::test]
async fn interrupted_cascade_marks_reloads_stale() {
    let mut catalog = loaded().await;
    catalog.gateway_mut().fail_statements(1, 1);

    catalog.delete::<Game>(GameId(2)).await.unwrap_err();

    for kind in [
        EntityKind::Purchase,
        EntityKind::Wishlist,
        EntityKind::Dlc,
        EntityKind::Client,
    ] {
        assert!(catalog.is_stale(kind), "{kind} should be stale");
    }
    // The purchase row is gone in the gateway but still mirrored.
    assert_eq!(catalog.store().len(EntityKind::Purchase), 1);
    assert!(catalog.gateway().rows_of(EntityKind::Purchase).is_empty());

    assert_eq!(catalog.reload(EntityKind::Purchase).await.unwrap(), 0);
    assert!(!catalog.is_stale(EntityKind::Purchase));
    assert!(catalog.is_stale(EntityKind::Wishlist));
}

#[tokio::test]
async fn failed_reload_marks_the_rest_stale() {
    let mut catalog = loaded().await;
    catalog.gateway_mut().fail_loads_of(EntityKind::Dlc);

    let err = catalog.delete::<Game>(GameId(2)).await.unwrap_err();
    assert!(matches!(
        err,
        CatalogError::Persistence {
            kind: EntityKind::Dlc,
            operation: Operation::Load,
            ..
        }
    ));
    assert!(!catalog.is_stale(EntityKind::Purchase));
    assert!(!catalog.is_stale(EntityKind::Wishlist));
    assert!(catalog.is_stale(EntityKind::Dlc));
    assert!(catalog.is_stale(EntityKind::Client));
    assert!(!catalog.store().contains::<Game>(GameId(2)));
    assert!(catalog.audit().entries().is_empty());

    catalog.gateway_mut().heal_loads();
    catalog.load_all().await.unwrap();
    assert!(catalog.stale_kinds().is_empty());
}

#[tokio::test]
async fn load_failure_keeps_previous_collection() {
    let mut catalog = loaded().await;
    catalog.gateway_mut().fail_loads_of(EntityKind::Client);

    catalog.load_all().await.unwrap_err();

    assert_eq!(catalog.store().len(EntityKind::Client), 2);
    assert_eq!(catalog.stale_kinds().len(), EntityKind::ALL.len());
}

#[tokio::test]
async fn audit_records_once_per_mutation() {
    let mut catalog = loaded().await;
    catalog.create(client(30, "newcomer")).await.unwrap();
    let mut renamed = client(30, "newcomer");
    renamed.first_name = "Grace".to_owned();
    assert!(catalog.update(renamed).await.unwrap());
    assert!(catalog.delete::<Client>(UserId(30)).await.unwrap());
    catalog.create(client(31, "")).await.unwrap_err();

    assert_eq!(
        catalog.audit().pairs(),
        vec![
            (EntityKind::Client, Verb::Create),
            (EntityKind::Client, Verb::Update),
            (EntityKind::Client, Verb::Delete),
        ]
    );
}

#[tokio::test]
async fn audit_failure_does_not_abort() {
    let mut catalog = loaded().await;
    catalog.audit_mut().set_failing(true);

    catalog.create(client(30, "newcomer")).await.unwrap();

    assert!(catalog.store().contains::<Client>(UserId(30)));
    assert!(catalog.audit().entries().is_empty());
}

#[tokio::test]
async fn absent_rows_report_false() {
    let mut catalog = loaded().await;

    assert!(!catalog.update(client(99, "ghost")).await.unwrap());
    assert!(!catalog.store().contains::<Client>(UserId(99)));

    let key = ContractKey::new(UserId(10), UserId(6));
    assert!(!catalog.delete::<Contract>(key).await.unwrap());
    assert!(catalog.audit().entries().is_empty());
}

#[tokio::test]
async fn validation_failures_never_reach_the_gateway() {
    let mut catalog = loaded().await;
    catalog.gateway_mut().clear_issued();

    let orphan = Purchase {
        game_id: GameId(42),
        user_id: UserId(20),
        purchase_date: day(1, 1),
        price: dec!(1),
    };
    assert!(matches!(
        catalog.create(orphan).await,
        Err(CatalogError::InvalidInput {
            field: "game_id",
            ..
        })
    ));
    let free_lunch = game(8, 3, None, "Gamma", dec!(-1));
    assert!(matches!(
        catalog.create(free_lunch).await,
        Err(CatalogError::InvalidInput { field: "price", .. })
    ));
    assert!(catalog.gateway().issued().is_empty());
}

#[tokio::test]
async fn id_counters_never_go_back() {
    let mut catalog = loaded().await;
    assert_eq!(catalog.store().next_user_id(), UserId(22));
    assert_eq!(catalog.store().next_game_id(), GameId(3));

    with_dlc(&mut catalog).await;
    assert_eq!(catalog.store().next_game_id(), GameId(8));

    assert!(catalog.delete::<Game>(GameId(7)).await.unwrap());
    assert!(catalog.delete_user(UserId(21)).await.unwrap());
    assert_eq!(catalog.store().next_game_id(), GameId(8));
    assert_eq!(catalog.store().next_user_id(), UserId(22));
}
