//! Client library persistence: purchases and wishlist entries.

use chrono::NaiveDate;
use gamemaster_types::{GameId, OwnershipKey, Purchase, UserId, Wishlist};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::DbError;

/// Which side of an ownership row a bulk delete matches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    /// Every row for one game.
    Game(GameId),
    /// Every row for one client.
    User(UserId),
}

impl Owner {
    const fn column(self) -> &'static str {
        match self {
            Self::Game(_) => "game_id",
            Self::User(_) => "user_id",
        }
    }

    const fn id(self) -> i32 {
        match self {
            Self::Game(id) => id.into_inner(),
            Self::User(id) => id.into_inner(),
        }
    }
}

/// Operations on the `purchase` and `wishlist` tables.
pub struct LibraryStore<'a> {
    pool: &'a PgPool,
}

impl<'a> LibraryStore<'a> {
    /// Create a new library store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Purchases in key order, or only the one with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn purchases(&self, key: Option<OwnershipKey>) -> Result<Vec<Purchase>, DbError> {
        let rows = sqlx::query_as::<_, PurchaseRow>(
            r"SELECT game_id, user_id, purchase_date, price
              FROM purchase
              WHERE $1::INTEGER IS NULL OR (game_id = $1 AND user_id = $2)
              ORDER BY game_id, user_id",
        )
        .bind(key.map(|k| k.game.into_inner()))
        .bind(key.map(|k| k.user.into_inner()))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Purchase::from).collect())
    }

    /// Insert a purchase.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert_purchase(&self, purchase: &Purchase) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"INSERT INTO purchase (game_id, user_id, purchase_date, price)
              VALUES ($1, $2, $3, $4)",
        )
        .bind(purchase.game_id.into_inner())
        .bind(purchase.user_id.into_inner())
        .bind(purchase.purchase_date)
        .bind(purchase.price)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Rewrite a purchase's date and price.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn update_purchase(&self, purchase: &Purchase) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"UPDATE purchase SET purchase_date = $3, price = $4
              WHERE game_id = $1 AND user_id = $2",
        )
        .bind(purchase.game_id.into_inner())
        .bind(purchase.user_id.into_inner())
        .bind(purchase.purchase_date)
        .bind(purchase.price)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete one purchase.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_purchase(&self, key: OwnershipKey) -> Result<u64, DbError> {
        self.delete_one("purchase", key).await
    }

    /// Delete every purchase of a game or by a client.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_purchases_of(&self, owner: Owner) -> Result<u64, DbError> {
        self.delete_all("purchase", owner).await
    }

    /// Wishlist entries in key order, or only the one with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn wishlists(&self, key: Option<OwnershipKey>) -> Result<Vec<Wishlist>, DbError> {
        let rows = sqlx::query_as::<_, WishlistRow>(
            r"SELECT game_id, user_id, added_date
              FROM wishlist
              WHERE $1::INTEGER IS NULL OR (game_id = $1 AND user_id = $2)
              ORDER BY game_id, user_id",
        )
        .bind(key.map(|k| k.game.into_inner()))
        .bind(key.map(|k| k.user.into_inner()))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Wishlist::from).collect())
    }

    /// Insert a wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert_wishlist(&self, wishlist: &Wishlist) -> Result<u64, DbError> {
        let result = sqlx::query(
            "INSERT INTO wishlist (game_id, user_id, added_date) VALUES ($1, $2, $3)",
        )
        .bind(wishlist.game_id.into_inner())
        .bind(wishlist.user_id.into_inner())
        .bind(wishlist.added_date)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Rewrite a wishlist entry's date.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn update_wishlist(&self, wishlist: &Wishlist) -> Result<u64, DbError> {
        let result = sqlx::query(
            "UPDATE wishlist SET added_date = $3 WHERE game_id = $1 AND user_id = $2",
        )
        .bind(wishlist.game_id.into_inner())
        .bind(wishlist.user_id.into_inner())
        .bind(wishlist.added_date)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete one wishlist entry.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_wishlist(&self, key: OwnershipKey) -> Result<u64, DbError> {
        self.delete_one("wishlist", key).await
    }

    /// Delete every wishlist entry for a game or of a client.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_wishlists_of(&self, owner: Owner) -> Result<u64, DbError> {
        self.delete_all("wishlist", owner).await
    }

    async fn delete_one(&self, table: &'static str, key: OwnershipKey) -> Result<u64, DbError> {
        let statement = format!("DELETE FROM {table} WHERE game_id = $1 AND user_id = $2");
        let result = sqlx::query(&statement)
            .bind(key.game.into_inner())
            .bind(key.user.into_inner())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    async fn delete_all(&self, table: &'static str, owner: Owner) -> Result<u64, DbError> {
        let statement = format!("DELETE FROM {table} WHERE {} = $1", owner.column());
        let result = sqlx::query(&statement)
            .bind(owner.id())
            .execute(self.pool)
            .await?;
        tracing::debug!(table, affected = result.rows_affected(), "Bulk delete");
        Ok(result.rows_affected())
    }
}

/// A row from the `purchase` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct PurchaseRow {
    /// Game bought.
    pub game_id: i32,
    /// Buying client.
    pub user_id: i32,
    /// Day of purchase.
    pub purchase_date: NaiveDate,
    /// Price paid.
    pub price: Decimal,
}

impl From<PurchaseRow> for Purchase {
    fn from(row: PurchaseRow) -> Self {
        Self {
            game_id: GameId(row.game_id),
            user_id: UserId(row.user_id),
            purchase_date: row.purchase_date,
            price: row.price,
        }
    }
}

/// A row from the `wishlist` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WishlistRow {
    /// Game wished for.
    pub game_id: i32,
    /// Wishing client.
    pub user_id: i32,
    /// Day the entry was added.
    pub added_date: NaiveDate,
}

impl From<WishlistRow> for Wishlist {
    fn from(row: WishlistRow) -> Self {
        Self {
            game_id: GameId(row.game_id),
            user_id: UserId(row.user_id),
            added_date: row.added_date,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_selects_its_column() {
        assert_eq!(Owner::Game(GameId(4)).column(), "game_id");
        assert_eq!(Owner::User(UserId(20)).column(), "user_id");
        assert_eq!(Owner::User(UserId(20)).id(), 20);
    }
}
