//! Game and DLC link persistence.

use chrono::NaiveDate;
use gamemaster_types::{Dlc, Game, GameId, GameKind, UnknownTag, UserId};
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::error::DbError;

/// Operations on the `game` and `dlc` tables.
pub struct GameStore<'a> {
    pool: &'a PgPool,
}

impl<'a> GameStore<'a> {
    /// Create a new game store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Games in ID order, or only the one with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Decode`] if a stored kind is unknown.
    pub async fn games(&self, id: Option<GameId>) -> Result<Vec<Game>, DbError> {
        let rows = sqlx::query_as::<_, GameRow>(
            r"SELECT id, developer_id, publisher_id, name, price, release_date, visible, kind
              FROM game
              WHERE $1::INTEGER IS NULL OR id = $1
              ORDER BY id",
        )
        .bind(id.map(GameId::into_inner))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Game::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Insert a game row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, game: &Game) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"INSERT INTO game
                  (id, developer_id, publisher_id, name, price, release_date, visible, kind)
              VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(game.id.into_inner())
        .bind(game.developer_id.into_inner())
        .bind(game.publisher_id.map(UserId::into_inner))
        .bind(&game.name)
        .bind(game.price)
        .bind(game.release_date)
        .bind(game.visible)
        .bind(game.kind.as_str())
        .execute(self.pool)
        .await?;

        tracing::debug!(id = %game.id, kind = game.kind.as_str(), "Inserted game");
        Ok(result.rows_affected())
    }

    /// Rewrite every column of a game row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn update(&self, game: &Game) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"UPDATE game
              SET developer_id = $2, publisher_id = $3, name = $4, price = $5,
                  release_date = $6, visible = $7, kind = $8
              WHERE id = $1",
        )
        .bind(game.id.into_inner())
        .bind(game.developer_id.into_inner())
        .bind(game.publisher_id.map(UserId::into_inner))
        .bind(&game.name)
        .bind(game.price)
        .bind(game.release_date)
        .bind(game.visible)
        .bind(game.kind.as_str())
        .execute(self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Delete a game row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails, for example while
    /// purchases, wishlist entries, or DLC links still reference it.
    pub async fn delete(&self, id: GameId) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM game WHERE id = $1")
            .bind(id.into_inner())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Point a game at another publisher, or unpublish it with `None`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn reassign_publisher(
        &self,
        id: GameId,
        publisher: Option<UserId>,
    ) -> Result<u64, DbError> {
        let result = sqlx::query("UPDATE game SET publisher_id = $2 WHERE id = $1")
            .bind(id.into_inner())
            .bind(publisher.map(UserId::into_inner))
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// DLC links in ID order, or only the one for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn dlcs(&self, id: Option<GameId>) -> Result<Vec<Dlc>, DbError> {
        let rows = sqlx::query_as::<_, DlcRow>(
            r"SELECT game_id, base_game_id
              FROM dlc
              WHERE $1::INTEGER IS NULL OR game_id = $1
              ORDER BY game_id",
        )
        .bind(id.map(GameId::into_inner))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Dlc::from).collect())
    }

    /// Insert a DLC link.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert_dlc(&self, dlc: &Dlc) -> Result<u64, DbError> {
        let result = sqlx::query("INSERT INTO dlc (game_id, base_game_id) VALUES ($1, $2)")
            .bind(dlc.id.into_inner())
            .bind(dlc.base_game_id.into_inner())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Move a DLC link to another base game.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn update_dlc(&self, dlc: &Dlc) -> Result<u64, DbError> {
        let result = sqlx::query("UPDATE dlc SET base_game_id = $2 WHERE game_id = $1")
            .bind(dlc.id.into_inner())
            .bind(dlc.base_game_id.into_inner())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete one DLC link.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_dlc(&self, id: GameId) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM dlc WHERE game_id = $1")
            .bind(id.into_inner())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    /// Delete every DLC link where the game is the DLC or the base game.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_dlc_links(&self, game: GameId) -> Result<u64, DbError> {
        let result = sqlx::query("DELETE FROM dlc WHERE game_id = $1 OR base_game_id = $1")
            .bind(game.into_inner())
            .execute(self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}

/// A row from the `game` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct GameRow {
    /// Game ID.
    pub id: i32,
    /// Developing provider.
    pub developer_id: i32,
    /// Publishing provider; `NULL` while unpublished.
    pub publisher_id: Option<i32>,
    /// Display name.
    pub name: String,
    /// Current price.
    pub price: Decimal,
    /// Release date, set on publishing.
    pub release_date: Option<NaiveDate>,
    /// Whether the game is listed.
    pub visible: bool,
    /// `game` or `dlc`.
    pub kind: String,
}

impl TryFrom<GameRow> for Game {
    type Error = UnknownTag;

    fn try_from(row: GameRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: GameId(row.id),
            developer_id: UserId(row.developer_id),
            publisher_id: row.publisher_id.map(UserId),
            name: row.name,
            price: row.price,
            release_date: row.release_date,
            visible: row.visible,
            kind: row.kind.parse::<GameKind>()?,
        })
    }
}

/// A row from the `dlc` table.
#[derive(Debug, Clone, Copy, sqlx::FromRow)]
pub struct DlcRow {
    /// The DLC's own game row.
    pub game_id: i32,
    /// The game it extends.
    pub base_game_id: i32,
}

impl From<DlcRow> for Dlc {
    fn from(row: DlcRow) -> Self {
        Self {
            id: GameId(row.game_id),
            base_game_id: GameId(row.base_game_id),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    fn row(kind: &str) -> GameRow {
        GameRow {
            id: 2,
            developer_id: 3,
            publisher_id: None,
            name: "Beta".to_owned(),
            price: Decimal::new(1999, 2),
            release_date: None,
            visible: true,
            kind: kind.to_owned(),
        }
    }

    #[test]
    fn null_publisher_means_unpublished() {
        let game = Game::try_from(row("dlc")).unwrap();
        assert!(!game.is_published());
        assert_eq!(game.kind, GameKind::Dlc);
        assert_eq!(game.price.to_string(), "19.99");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(Game::try_from(row("bundle")).is_err());
    }
}
