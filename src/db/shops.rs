//! Shop credential repository.
//!
//! Stores the offline access token obtained during the OAuth install flow.
//! The token is write-once: a repeated install never overwrites an existing
//! row, and only the uninstall webhook deletes one.

use chrono::{DateTime, Utc};
use secrecy::SecretString;
use sqlx::SqlitePool;

use super::RepositoryError;

/// A stored shop credential.
///
/// Implements `Debug` manually to redact the access token.
#[derive(Clone)]
pub struct ShopCredential {
    /// Shop domain (e.g., example.myshopify.com).
    pub shop: String,
    /// OAuth access token (redacted in debug output, never logged).
    pub access_token: SecretString,
    /// Scopes granted at install time.
    pub scope: String,
    /// When the credential was created.
    pub installed_at: DateTime<Utc>,
}

impl std::fmt::Debug for ShopCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopCredential")
            .field("shop", &self.shop)
            .field("access_token", &"[REDACTED]")
            .field("scope", &self.scope)
            .field("installed_at", &self.installed_at)
            .finish()
    }
}

/// Internal row type for queries.
#[derive(Debug, sqlx::FromRow)]
struct ShopRow {
    shop: String,
    access_token: String,
    scope: String,
    installed_at: DateTime<Utc>,
}

impl From<ShopRow> for ShopCredential {
    fn from(row: ShopRow) -> Self {
        Self {
            shop: row.shop,
            access_token: SecretString::from(row.access_token),
            scope: row.scope,
            installed_at: row.installed_at,
        }
    }
}

/// Repository for shop credential database operations.
pub struct ShopRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ShopRepository<'a> {
    /// Create a new shop repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Whether a credential exists for the shop (i.e. the app is installed).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn exists(&self, shop: &str) -> Result<bool, RepositoryError> {
        let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM shops WHERE shop = ?")
            .bind(shop)
            .fetch_optional(self.pool)
            .await?;

        Ok(found.is_some())
    }

    /// Fetch the credential for a shop, if installed.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, shop: &str) -> Result<Option<ShopCredential>, RepositoryError> {
        let row: Option<ShopRow> = sqlx::query_as(
            "SELECT shop, access_token, scope, installed_at FROM shops WHERE shop = ?",
        )
        .bind(shop)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(ShopCredential::from))
    }

    /// Insert a credential unless one already exists for the shop.
    ///
    /// The primary key on `shop` makes this atomic under concurrent installs:
    /// the losing insert is a silent no-op, and the first-written token
    /// survives.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert_if_absent(
        &self,
        shop: &str,
        access_token: &str,
        scope: &str,
        installed_at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            r"
            INSERT INTO shops (shop, access_token, scope, installed_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(shop) DO NOTHING
            ",
        )
        .bind(shop)
        .bind(access_token)
        .bind(scope)
        .bind(installed_at)
        .execute(self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::debug!(shop, "Credential already present, insert skipped");
        }

        Ok(())
    }

    /// Delete the credential for a shop. Idempotent; no-op if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete(&self, shop: &str) -> Result<(), RepositoryError> {
        sqlx::query("DELETE FROM shops WHERE shop = ?")
            .bind(shop)
            .execute(self.pool)
            .await?;

        Ok(())
    }
}
