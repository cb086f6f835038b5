use std::str::FromStr;

use sqlx::sqlite::SqliteConnectOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;

use crate::Result;

mod charts;
mod contacts;
mod documents;
mod profiles;
mod schema;

/// Database connection pool wrapper
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

/// Row counts across the durable tables
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct StoreStats {
    pub profiles: i64,
    pub charts: i64,
    pub documents: i64,
    pub contacts: i64,
}

impl Database {
    #[must_use]
    pub const fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new database instance from configuration
    pub async fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        let options =
            SqliteConnectOptions::from_str(config.database_url())?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections())
            .acquire_timeout(std::time::Duration::from_secs(config.connection_timeout()))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Database pool configured: url={}, max_connections={}",
            config.database_url(),
            config.max_connections()
        );

        let database = Self::new(pool);
        database.migrate().await?;
        Ok(database)
    }

    /// Create an in-memory database, used by tests and ephemeral runs
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        // A single connection so the in-memory database is shared
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;
        let database = Self::new(pool);
        database.migrate().await?;
        Ok(database)
    }

    /// Apply the schema. All statements are idempotent.
    pub async fn migrate(&self) -> Result<()> {
        for statement in schema::SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Get a reference to the database pool for raw queries
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Row counts across all tables
    pub async fn stats(&self) -> Result<StoreStats> {
        let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_profiles")
            .fetch_one(&self.pool)
            .await?;
        let charts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chart_data")
            .fetch_one(&self.pool)
            .await?;
        let documents: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM chart_documents")
            .fetch_one(&self.pool)
            .await?;
        let contacts: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_contacts")
            .fetch_one(&self.pool)
            .await?;
        Ok(StoreStats {
            profiles,
            charts,
            documents,
            contacts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_from_config_creates_file_backed_database() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("vedarag-test.db");

        let mut config = crate::config::AppConfig::default();
        config.database.url = format!("sqlite://{}", db_path.display());

        let database = Database::from_config(&config).await.unwrap();
        let stats = database.stats().await.unwrap();
        assert_eq!(stats.profiles, 0);
        assert!(db_path.exists());
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let database = Database::in_memory().await.unwrap();
        database.migrate().await.unwrap();
        assert_eq!(database.stats().await.unwrap().charts, 0);
    }
}
