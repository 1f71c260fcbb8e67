//! Composite catalog operations built from create, update, and delete.
//!
//! Each workflow checks its preconditions against the mirror first and
//! raises [`CatalogError::InvalidInput`] before touching the gateway. The
//! writes then go through the regular [`Catalog`] protocol, so cascades,
//! reloads, and audit entries behave exactly as for direct calls.

use chrono::{Months, NaiveDate};
use gamemaster_types::{
    Account, Admin, Client, Contract, ContractKey, ContractStatus, Dlc, Game, GameId, GameKind,
    OwnershipKey, Provider, ProviderType, Purchase, UserId, Wishlist,
};
use rust_decimal::Decimal;

use crate::audit::AuditSink;
use crate::catalog::Catalog;
use crate::error::CatalogError;
use crate::gateway::Gateway;
use crate::rules::Validate;

/// How long a proposed contract runs before it needs extending.
const CONTRACT_TERM: Months = Months::new(12);

fn mirrored_game<G: Gateway, A: AuditSink>(
    catalog: &Catalog<G, A>,
    id: GameId,
) -> Result<Game, CatalogError> {
    catalog
        .store()
        .get::<Game>(id)
        .cloned()
        .ok_or_else(|| CatalogError::invalid("game_id", format!("game {id} does not exist")))
}

fn active_client<G: Gateway, A: AuditSink>(
    catalog: &Catalog<G, A>,
    id: UserId,
) -> Result<(), CatalogError> {
    match catalog.store().get::<Client>(id) {
        Some(client) if client.is_banned() => Err(CatalogError::invalid(
            "user_id",
            format!("client {id} is banned"),
        )),
        Some(_) => Ok(()),
        None => Err(CatalogError::invalid(
            "user_id",
            format!("client {id} does not exist"),
        )),
    }
}

fn dlc_base<G: Gateway, A: AuditSink>(
    catalog: &Catalog<G, A>,
    link: &Dlc,
) -> Result<(), CatalogError> {
    if link.id == link.base_game_id {
        return Err(CatalogError::invalid(
            "base_game_id",
            "a dlc cannot extend itself",
        ));
    }
    match catalog.store().get::<Game>(link.base_game_id) {
        Some(base) if base.kind == GameKind::Game => Ok(()),
        Some(_) => Err(CatalogError::invalid(
            "base_game_id",
            format!("game {} is itself a dlc", link.base_game_id),
        )),
        None => Err(CatalogError::invalid(
            "base_game_id",
            format!("game {} does not exist", link.base_game_id),
        )),
    }
}

impl<G: Gateway, A: AuditSink> Catalog<G, A> {
    /// Release an unpublished game through `publisher`.
    ///
    /// The game's developer must hold a contract, in any status, with the
    /// publisher. Sets the publisher, the price, and the release date.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] if a precondition fails, or
    /// any error of [`update`](Self::update).
    pub async fn publish_game(
        &mut self,
        publisher: UserId,
        game: GameId,
        price: Decimal,
        on: NaiveDate,
    ) -> Result<bool, CatalogError> {
        let mut row = mirrored_game(self, game)?;
        if let Some(current) = row.publisher_id {
            return Err(CatalogError::invalid(
                "publisher_id",
                format!("game {game} is already published by {current}"),
            ));
        }
        match self.store().get::<Provider>(publisher) {
            Some(p) if p.provider_type == ProviderType::Publisher => {}
            _ => {
                return Err(CatalogError::invalid(
                    "publisher_id",
                    format!("{publisher} is not a publisher"),
                ));
            }
        }
        let key = ContractKey::new(row.developer_id, publisher);
        if !self.store().contains::<Contract>(key) {
            return Err(CatalogError::invalid(
                "publisher_id",
                format!("no contract {key}"),
            ));
        }

        row.publisher_id = Some(publisher);
        row.price = price;
        row.release_date = Some(on);
        let published = self.update(row).await?;
        if published {
            tracing::info!(%game, %publisher, %price, "Game published");
        }
        Ok(published)
    }

    /// List (`true`) or delist (`false`) a game on the storefront.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] for an unknown game, or any
    /// error of [`update`](Self::update).
    pub async fn set_game_visibility(
        &mut self,
        game: GameId,
        visible: bool,
    ) -> Result<bool, CatalogError> {
        let mut row = mirrored_game(self, game)?;
        row.visible = visible;
        self.update(row).await
    }

    /// Add a DLC: the game row of kind DLC, then its link to `base`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] if `dlc` is not of kind DLC
    /// or the link is invalid, or any error of [`create`](Self::create).
    /// A failed link leaves the game row in place.
    pub async fn add_dlc(&mut self, dlc: Game, base: GameId) -> Result<(), CatalogError> {
        if dlc.kind != GameKind::Dlc {
            return Err(CatalogError::invalid(
                "kind",
                format!("game {} is not of kind dlc", dlc.id),
            ));
        }
        let link = Dlc {
            id: dlc.id,
            base_game_id: base,
        };
        dlc_base(self, &link)?;
        self.create(dlc).await?;
        self.create(link).await
    }

    /// Propose a contract between a developer and a publisher, starting
    /// `on` and running for one year.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UniqueConstraintViolation`] if the pair
    /// already holds a contract, or any error of [`create`](Self::create).
    pub async fn propose_contract(
        &mut self,
        developer: UserId,
        publisher: UserId,
        on: NaiveDate,
    ) -> Result<Contract, CatalogError> {
        let end_date = on
            .checked_add_months(CONTRACT_TERM)
            .ok_or_else(|| CatalogError::invalid("start_date", format!("{on} is out of range")))?;
        let contract = Contract {
            developer_id: developer,
            publisher_id: publisher,
            status: ContractStatus::Pending,
            start_date: on,
            end_date,
        };
        self.create(contract.clone()).await?;
        Ok(contract)
    }

    /// Move a pending contract to accepted.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] if the contract is unknown or
    /// already accepted, or any error of [`update`](Self::update).
    pub async fn accept_contract(&mut self, key: ContractKey) -> Result<bool, CatalogError> {
        let mut contract = self.mirrored_contract(key)?;
        if contract.status == ContractStatus::Accepted {
            return Err(CatalogError::invalid(
                "status",
                format!("contract {key} is already accepted"),
            ));
        }
        contract.status = ContractStatus::Accepted;
        self.update(contract).await
    }

    /// Move a contract's end date.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] if the contract is unknown or
    /// `end` precedes its start, or any error of [`update`](Self::update).
    pub async fn extend_contract(
        &mut self,
        key: ContractKey,
        end: NaiveDate,
    ) -> Result<bool, CatalogError> {
        let mut contract = self.mirrored_contract(key)?;
        contract.end_date = end;
        self.update(contract).await
    }

    fn mirrored_contract(&self, key: ContractKey) -> Result<Contract, CatalogError> {
        self.store()
            .get::<Contract>(key)
            .cloned()
            .ok_or_else(|| {
                CatalogError::invalid("contract", format!("contract {key} does not exist"))
            })
    }

    /// Ban or unban an account of any kind.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] if no account has this ID, or
    /// any error of [`update`](Self::update).
    pub async fn set_user_banned(
        &mut self,
        id: UserId,
        banned: bool,
    ) -> Result<bool, CatalogError> {
        let changed = if self.store().contains::<Admin>(id) {
            self.rewrite_ban::<Admin>(id, banned).await?
        } else if self.store().contains::<Client>(id) {
            self.rewrite_ban::<Client>(id, banned).await?
        } else if self.store().contains::<Provider>(id) {
            self.rewrite_ban::<Provider>(id, banned).await?
        } else {
            return Err(CatalogError::invalid(
                "user_id",
                format!("user {id} does not exist"),
            ));
        };
        if changed {
            tracing::info!(user = %id, banned, "Ban flag changed");
        }
        Ok(changed)
    }

    async fn rewrite_ban<E>(&mut self, id: UserId, banned: bool) -> Result<bool, CatalogError>
    where
        E: Validate<Key = UserId> + Account,
    {
        let Some(mut account) = self.store().get::<E>(id).cloned() else {
            return Ok(false);
        };
        account.profile_mut().banned = banned;
        self.update(account).await
    }

    /// Buy a game or DLC at its current price.
    ///
    /// The game must be listed and published. A DLC also needs its base
    /// game in the client's library.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] if a precondition fails,
    /// [`CatalogError::UniqueConstraintViolation`] if the client already
    /// owns it, or any error of [`create`](Self::create).
    pub async fn buy_game(
        &mut self,
        client: UserId,
        game: GameId,
        on: NaiveDate,
    ) -> Result<Purchase, CatalogError> {
        active_client(self, client)?;
        let row = mirrored_game(self, game)?;
        if !row.visible || !row.is_published() {
            return Err(CatalogError::invalid(
                "game_id",
                format!("game {game} is not on sale"),
            ));
        }
        if row.kind == GameKind::Dlc {
            let base = self
                .store()
                .get::<Dlc>(game)
                .map(|link| link.base_game_id)
                .ok_or_else(|| {
                    CatalogError::invalid("game_id", format!("dlc {game} has no base game"))
                })?;
            if !self
                .store()
                .contains::<Purchase>(OwnershipKey::new(base, client))
            {
                return Err(CatalogError::invalid(
                    "game_id",
                    format!("base game {base} is not owned"),
                ));
            }
        }

        let purchase = Purchase {
            game_id: game,
            user_id: client,
            purchase_date: on,
            price: row.price,
        };
        self.create(purchase.clone()).await?;
        tracing::info!(%client, %game, price = %purchase.price, "Game bought");
        Ok(purchase)
    }

    /// Buy a wishlisted game, then drop the wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] if the entry does not exist,
    /// or any error of [`buy_game`](Self::buy_game) or
    /// [`delete`](Self::delete). A failed entry removal keeps the purchase.
    pub async fn buy_from_wishlist(
        &mut self,
        client: UserId,
        game: GameId,
        on: NaiveDate,
    ) -> Result<Purchase, CatalogError> {
        let key = OwnershipKey::new(game, client);
        if !self.store().contains::<Wishlist>(key) {
            return Err(CatalogError::invalid(
                "wishlist",
                format!("entry {key} does not exist"),
            ));
        }
        let purchase = self.buy_game(client, game, on).await?;
        self.delete::<Wishlist>(key).await?;
        Ok(purchase)
    }

    /// Put a listed game the client does not own on their wishlist.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidInput`] if a precondition fails,
    /// [`CatalogError::UniqueConstraintViolation`] if it is already
    /// wishlisted, or any error of [`create`](Self::create).
    pub async fn add_to_wishlist(
        &mut self,
        client: UserId,
        game: GameId,
        on: NaiveDate,
    ) -> Result<Wishlist, CatalogError> {
        active_client(self, client)?;
        if !mirrored_game(self, game)?.visible {
            return Err(CatalogError::invalid(
                "game_id",
                format!("game {game} is delisted"),
            ));
        }
        if self
            .store()
            .contains::<Purchase>(OwnershipKey::new(game, client))
        {
            return Err(CatalogError::invalid(
                "game_id",
                format!("game {game} is already owned"),
            ));
        }
        let entry = Wishlist {
            game_id: game,
            user_id: client,
            added_date: on,
        };
        self.create(entry.clone()).await?;
        Ok(entry)
    }
}
