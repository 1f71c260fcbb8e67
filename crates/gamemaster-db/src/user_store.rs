//! Account persistence: the shared `app_user` row plus one extension row
//! per account kind.
//!
//! Every write touches both rows inside one transaction, so a failed
//! extension write never leaves a bare `app_user` row behind.

use gamemaster_types::{
    Account, Admin, Client, Profile, Provider, ProviderType, UnknownTag, User, UserId, UserKind,
};
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use crate::error::DbError;

/// Operations on `app_user` and the `admin`, `client`, and `provider`
/// extension tables.
pub struct UserStore<'a> {
    pool: &'a PgPool,
}

impl<'a> UserStore<'a> {
    /// Create a new user store bound to a connection pool.
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// Admins in ID order, or only the one with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn admins(&self, id: Option<UserId>) -> Result<Vec<Admin>, DbError> {
        let rows = sqlx::query_as::<_, AdminRow>(
            r"SELECT u.id, u.username, u.password, u.email, u.banned, a.cut_percentage
              FROM app_user u
              JOIN admin a ON a.user_id = u.id
              WHERE $1::INTEGER IS NULL OR u.id = $1
              ORDER BY u.id",
        )
        .bind(id.map(UserId::into_inner))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Admin::from).collect())
    }

    /// Clients in ID order, or only the one with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails.
    pub async fn clients(&self, id: Option<UserId>) -> Result<Vec<Client>, DbError> {
        let rows = sqlx::query_as::<_, ClientRow>(
            r"SELECT u.id, u.username, u.password, u.email, u.banned,
                     c.first_name, c.last_name, c.phone
              FROM app_user u
              JOIN client c ON c.user_id = u.id
              WHERE $1::INTEGER IS NULL OR u.id = $1
              ORDER BY u.id",
        )
        .bind(id.map(UserId::into_inner))
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Client::from).collect())
    }

    /// Providers in ID order, or only the one with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if the query fails, or
    /// [`DbError::Decode`] if a stored provider type is unknown.
    pub async fn providers(&self, id: Option<UserId>) -> Result<Vec<Provider>, DbError> {
        let rows = sqlx::query_as::<_, ProviderRow>(
            r"SELECT u.id, u.username, u.password, u.email, u.banned,
                     p.website, p.provider_type
              FROM app_user u
              JOIN provider p ON p.user_id = u.id
              WHERE $1::INTEGER IS NULL OR u.id = $1
              ORDER BY u.id",
        )
        .bind(id.map(UserId::into_inner))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter()
            .map(|row| Provider::try_from(row).map_err(DbError::from))
            .collect()
    }

    /// Insert an account: the `app_user` row, then its extension row.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if either insert fails; neither row is
    /// then written.
    pub async fn insert(&self, user: &User) -> Result<u64, DbError> {
        let profile = user.profile();
        let mut tx = self.pool.begin().await?;

        let affected = sqlx::query(
            r"INSERT INTO app_user (id, username, password, email, banned, kind)
              VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(profile.id.into_inner())
        .bind(&profile.username)
        .bind(&profile.password)
        .bind(profile.email.as_deref())
        .bind(profile.banned)
        .bind(user.user_kind().as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        insert_extension(&mut tx, user).await?;
        tx.commit().await?;

        tracing::debug!(id = %profile.id, kind = user.user_kind().as_str(), "Inserted account");
        Ok(affected)
    }

    /// Rewrite an account's shared and extension rows.
    ///
    /// Returns 0 without writing anything when no account of this kind has
    /// the ID.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if either update fails.
    pub async fn update(&self, user: &User) -> Result<u64, DbError> {
        let profile = user.profile();
        let mut tx = self.pool.begin().await?;

        let affected = sqlx::query(
            r"UPDATE app_user
              SET username = $2, password = $3, email = $4, banned = $5
              WHERE id = $1 AND kind = $6",
        )
        .bind(profile.id.into_inner())
        .bind(&profile.username)
        .bind(&profile.password)
        .bind(profile.email.as_deref())
        .bind(profile.banned)
        .bind(user.user_kind().as_str())
        .execute(&mut *tx)
        .await?
        .rows_affected();

        if affected == 0 {
            tx.rollback().await?;
            return Ok(0);
        }

        update_extension(&mut tx, user).await?;
        tx.commit().await?;
        Ok(affected)
    }

    /// Delete an account: its extension row, then the `app_user` row.
    ///
    /// Returns the number of extension rows removed.
    ///
    /// # Errors
    ///
    /// Returns [`DbError::Postgres`] if either delete fails, for example
    /// because games or purchases still reference the account.
    pub async fn delete(&self, kind: UserKind, id: UserId) -> Result<u64, DbError> {
        let mut tx = self.pool.begin().await?;

        let statement = format!("DELETE FROM {} WHERE user_id = $1", extension_table(kind));
        let affected = sqlx::query(&statement)
            .bind(id.into_inner())
            .execute(&mut *tx)
            .await?
            .rows_affected();

        sqlx::query("DELETE FROM app_user WHERE id = $1 AND kind = $2")
            .bind(id.into_inner())
            .bind(kind.as_str())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(affected)
    }
}

const fn extension_table(kind: UserKind) -> &'static str {
    match kind {
        UserKind::Admin => "admin",
        UserKind::Client => "client",
        UserKind::Provider => "provider",
    }
}

async fn insert_extension(conn: &mut PgConnection, user: &User) -> Result<(), DbError> {
    let id = user.id().into_inner();
    match user {
        User::Admin(admin) => {
            sqlx::query("INSERT INTO admin (user_id, cut_percentage) VALUES ($1, $2)")
                .bind(id)
                .bind(admin.cut_percentage)
                .execute(conn)
                .await?;
        }
        User::Client(client) => {
            sqlx::query(
                r"INSERT INTO client (user_id, first_name, last_name, phone)
                  VALUES ($1, $2, $3, $4)",
            )
            .bind(id)
            .bind(&client.first_name)
            .bind(&client.last_name)
            .bind(&client.phone)
            .execute(conn)
            .await?;
        }
        User::Provider(provider) => {
            sqlx::query(
                "INSERT INTO provider (user_id, website, provider_type) VALUES ($1, $2, $3)",
            )
            .bind(id)
            .bind(provider.website.as_deref())
            .bind(provider.provider_type.as_str())
            .execute(conn)
            .await?;
        }
    }
    Ok(())
}

async fn update_extension(conn: &mut PgConnection, user: &User) -> Result<(), DbError> {
    let id = user.id().into_inner();
    match user {
        User::Admin(admin) => {
            sqlx::query("UPDATE admin SET cut_percentage = $2 WHERE user_id = $1")
                .bind(id)
                .bind(admin.cut_percentage)
                .execute(conn)
                .await?;
        }
        User::Client(client) => {
            sqlx::query(
                r"UPDATE client SET first_name = $2, last_name = $3, phone = $4
                  WHERE user_id = $1",
            )
            .bind(id)
            .bind(&client.first_name)
            .bind(&client.last_name)
            .bind(&client.phone)
            .execute(conn)
            .await?;
        }
        User::Provider(provider) => {
            sqlx::query(
                "UPDATE provider SET website = $2, provider_type = $3 WHERE user_id = $1",
            )
            .bind(id)
            .bind(provider.website.as_deref())
            .bind(provider.provider_type.as_str())
            .execute(conn)
            .await?;
        }
    }
    Ok(())
}

/// The `app_user` columns shared by every account row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProfileRow {
    /// User ID.
    pub id: i32,
    /// Login name.
    pub username: String,
    /// Login secret.
    pub password: String,
    /// Contact address, if given.
    pub email: Option<String>,
    /// Whether the account is banned.
    pub banned: bool,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: UserId(row.id),
            username: row.username,
            password: row.password,
            email: row.email,
            banned: row.banned,
        }
    }
}

/// A joined `app_user` + `admin` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRow {
    /// Shared account columns.
    #[sqlx(flatten)]
    pub profile: ProfileRow,
    /// Platform cut in percent.
    pub cut_percentage: Decimal,
}

impl From<AdminRow> for Admin {
    fn from(row: AdminRow) -> Self {
        Self {
            profile: row.profile.into(),
            cut_percentage: row.cut_percentage,
        }
    }
}

/// A joined `app_user` + `client` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClientRow {
    /// Shared account columns.
    #[sqlx(flatten)]
    pub profile: ProfileRow,
    /// Given name.
    pub first_name: String,
    /// Family name.
    pub last_name: String,
    /// Phone number.
    pub phone: String,
}

impl From<ClientRow> for Client {
    fn from(row: ClientRow) -> Self {
        Self {
            profile: row.profile.into(),
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
        }
    }
}

/// A joined `app_user` + `provider` row.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProviderRow {
    /// Shared account columns.
    #[sqlx(flatten)]
    pub profile: ProfileRow,
    /// Homepage, if given.
    pub website: Option<String>,
    /// `developer` or `publisher`.
    pub provider_type: String,
}

impl TryFrom<ProviderRow> for Provider {
    type Error = UnknownTag;

    fn try_from(row: ProviderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            profile: row.profile.into(),
            website: row.website,
            provider_type: row.provider_type.parse::<ProviderType>()?,
        })
    }
}
