//! Publishing contract persistence.

use chrono::NaiveDate;
use gamemaster_types::{Contract, ContractKey, ContractStatus, UnknownTag, UserId};
use sqlx::PgPool;

use crate::error::DbError;

/// Operations on the `contract` table.
pub struct ContractStore<'a> {
    pool: &'a PgPool,
}

impl<'a> ContractStore<'a> {
    /// Create a new contract store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Contracts in key order, or only the one with `key`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Decode`] if a stored status is unknown.
    pub async fn contracts(&self, key: Option<ContractKey>) -> Result<Vec<Contract>, DbError> {
        let rows = sqlx::query_as::<_, ContractRow>(
            r"SELECT developer_id, publisher_id, status, start_date, end_date
              FROM contract
              WHERE $1::INTEGER IS NULL OR (developer_id = $1 AND publisher_id = $2)
              ORDER BY developer_id, publisher_id",
        )
        .bind(key.map(|k| k.developer.into_inner()))
        .bind(key.map(|k| k.publisher.into_inner()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Contract::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Insert a contract.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the insert fails.
    pub async fn insert(&self, contract: &Contract) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"INSERT INTO contract (developer_id, publisher_id, status, start_date, end_date)
              VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(contract.developer_id.into_inner())
        .bind(contract.publisher_id.into_inner())
        .bind(contract.status.as_str())
        .bind(contract.start_date)
        .bind(contract.end_date)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Rewrite a contract's status and dates.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the update fails.
    pub async fn update(&self, contract: &Contract) -> Result<u64, DbError> {
        let result = sqlx::query(
            r"UPDATE contract SET status = $3, start_date = $4, end_date = $5
              WHERE developer_id = $1 AND publisher_id = $2",
        )
        .bind(contract.developer_id.into_inner())
        .bind(contract.publisher_id.into_inner())
        .bind(contract.status.as_str())
        .bind(contract.start_date)
        .bind(contract.end_date)
        .execute(self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete one contract.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete(&self, key: ContractKey) -> Result<u64, DbError> {
        let result =
            sqlx::query("DELETE FROM contract WHERE developer_id = $1 AND publisher_id = $2")
                .bind(key.developer.into_inner())
                .bind(key.publisher.into_inner())
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected())
    }

    /// Delete every contract where the provider is either party.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the delete fails.
    pub async fn delete_of_provider(&self, provider: UserId) -> Result<u64, DbError> {
        let result =
            sqlx::query("DELETE FROM contract WHERE developer_id = $1 OR publisher_id = $1")
                .bind(provider.into_inner())
                .execute(self.pool)
                .await?;
        Ok(result.rows_affected())
    }
}

/// A row from the `contract` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContractRow {
    /// Developing party.
    pub developer_id: i32,
    /// Publishing party.
    pub publisher_id: i32,
    /// `pending` or `accepted`.
    pub status: String,
    /// First day in force.
    pub start_date: NaiveDate,
    /// Last day in force.
    pub end_date: NaiveDate,
}

impl TryFrom<ContractRow> for Contract {
    type Error = UnknownTag;

    fn try_from(row: ContractRow) -> Result<Self, Self::Error> {
        Ok(Self {
            developer_id: UserId(row.developer_id),
            publisher_id: UserId(row.publisher_id),
            status: row.status.parse::<ContractStatus>()?,
            start_date: row.start_date,
            end_date: row.end_date,
        })
    }
}
