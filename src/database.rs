//! SQLite storage for scraped profiles

use crate::error::StoreError;
use crate::models::Profile;
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use std::str::FromStr;

/// Maximum pooled connections for a file database
const MAX_CONNECTIONS: u32 = 5;

/// Storage used by the scrape coordinator
///
/// Inserts must be safe to call concurrently and must ignore duplicate ids.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Make `id` unique
    async fn ensure_unique_index(&self) -> Result<(), StoreError>;

    /// Highest stored id, `None` when empty
    async fn find_highest_id(&self) -> Result<Option<i64>, StoreError>;

    /// Store the profile unless its id exists. Returns `true` if a row was written.
    async fn insert_if_absent(&self, profile: &Profile) -> Result<bool, StoreError>;
}

/// Profile database backed by a sqlx SQLite pool
#[derive(Debug, Clone)]
pub struct ProfileDatabase {
    pool: SqlitePool,
}

impl ProfileDatabase {
    /// Open (creating if needed) the database at `database_url`
    pub async fn new(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    /// Private in-memory database on a single connection
    pub async fn in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let db = Self { pool };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER NOT NULL,
                name TEXT,
                display_name TEXT,
                description TEXT,
                created TEXT,
                is_banned BOOLEAN,
                has_verified_badge BOOLEAN,
                external_app_display_name TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Get a profile by id
    pub async fn get_profile(&self, id: i64) -> Result<Option<Profile>, StoreError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, display_name, description, created, is_banned,
                   has_verified_badge, external_app_display_name
            FROM users WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row_to_profile(&row)).transpose()?)
    }

    /// Number of stored profiles
    pub async fn count_profiles(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn row_to_profile(row: &SqliteRow) -> Result<Profile, sqlx::Error> {
    Ok(Profile {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        display_name: row.try_get("display_name")?,
        description: row.try_get("description")?,
        created: row.try_get("created")?,
        is_banned: row.try_get("is_banned")?,
        has_verified_badge: row.try_get("has_verified_badge")?,
        external_app_display_name: row.try_get("external_app_display_name")?,
    })
}

#[async_trait]
impl ProfileStore for ProfileDatabase {
    async fn ensure_unique_index(&self) -> Result<(), StoreError> {
        sqlx::query("CREATE UNIQUE INDEX IF NOT EXISTS idx_users_id ON users(id)")
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_highest_id(&self) -> Result<Option<i64>, StoreError> {
        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM users ORDER BY id DESC LIMIT 1")
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }

    async fn insert_if_absent(&self, profile: &Profile) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO users (
                id, name, display_name, description, created, is_banned,
                has_verified_badge, external_app_display_name
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(profile.id)
        .bind(&profile.name)
        .bind(&profile.display_name)
        .bind(&profile.description)
        .bind(profile.created)
        .bind(profile.is_banned)
        .bind(profile.has_verified_badge)
        .bind(&profile.external_app_display_name)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
