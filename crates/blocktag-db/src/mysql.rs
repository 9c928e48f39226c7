//! `MySQL`-backed implementation of [`TagStore`].
//!
//! The networked backend for deployments that share a DBMS across
//! services. Identical observable behavior to the `SQLite` store; only
//! the dialect differs (`ON DUPLICATE KEY UPDATE` instead of
//! `ON CONFLICT`, `VARCHAR` keys sized for index limits).

use async_trait::async_trait;
use blocktag_types::{BlockLocation, OldNewLocationPairSet, Tag};
use sqlx::MySqlPool;
use sqlx::mysql::{MySqlConnectOptions, MySqlPoolOptions};

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::store::TagStore;

/// Tag storage backed by a `MySQL` database reached through a pooled
/// connection.
#[derive(Debug, Clone)]
pub struct MySqlTagStore {
    pool: MySqlPool,
    table: String,
}

/// A row from the tags table.
#[derive(Debug, sqlx::FromRow)]
struct TagRow {
    world: String,
    x: i32,
    y: i32,
    z: i32,
    is_ephemeral: bool,
    created_at: chrono::DateTime<chrono::Utc>,
}

impl From<TagRow> for Tag {
    fn from(row: TagRow) -> Self {
        Self::new(
            BlockLocation::new(row.world, row.x, row.y, row.z),
            row.is_ephemeral,
            row.created_at,
        )
    }
}

impl MySqlTagStore {
    /// Connect to `MySQL` using the provided configuration and ensure the
    /// tags table exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the URL or table name is invalid
    /// and [`StoreError::Database`] if the connection or schema setup
    /// fails.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let table = config.validated_table_name()?.to_owned();

        let connect_options: MySqlConnectOptions = config
            .url
            .parse()
            .map_err(|e: sqlx::Error| StoreError::Config(format!("invalid MySQL URL: {e}")))?;

        let pool = MySqlPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout)
            .idle_timeout(config.idle_timeout)
            .connect_with(connect_options)
            .await?;

        let store = Self { pool, table };
        store.ensure_schema().await?;

        tracing::info!(
            table = %store.table,
            max_connections = config.max_connections,
            "Connected to MySQL tag store"
        );
        Ok(store)
    }

    /// Create the tags table if it does not exist yet.
    ///
    /// World names are capped at 128 characters so the composite primary
    /// key stays well inside `InnoDB` index limits.
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                world VARCHAR(128) NOT NULL,
                x INT NOT NULL,
                y INT NOT NULL,
                z INT NOT NULL,
                is_ephemeral BOOLEAN NOT NULL,
                created_at TIMESTAMP(6) NOT NULL,
                PRIMARY KEY (world, x, y, z)
            )",
            table = self.table
        );
        sqlx::query(&sql).execute(&self.pool).await?;
        Ok(())
    }

    /// Close all connections in the pool gracefully.
    pub async fn close(&self) {
        self.pool.close().await;
        tracing::info!("MySQL pool closed");
    }
}

#[async_trait]
impl TagStore for MySqlTagStore {
    async fn put(&self, tag: &Tag) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {table} (world, x, y, z, is_ephemeral, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON DUPLICATE KEY UPDATE is_ephemeral = VALUES(is_ephemeral),
                                     created_at = VALUES(created_at)",
            table = self.table
        );
        sqlx::query(&sql)
            .bind(&tag.location.world)
            .bind(tag.location.x)
            .bind(tag.location.y)
            .bind(tag.location.z)
            .bind(tag.is_ephemeral)
            .bind(tag.created_at)
            .execute(&self.pool)
            .await?;

        tracing::debug!(location = %tag.location, ephemeral = tag.is_ephemeral, "Upserted tag");
        Ok(())
    }

    async fn delete(&self, location: &BlockLocation) -> Result<(), StoreError> {
        let sql = format!(
            "DELETE FROM {table} WHERE world = ? AND x = ? AND y = ? AND z = ?",
            table = self.table
        );
        sqlx::query(&sql)
            .bind(&location.world)
            .bind(location.x)
            .bind(location.y)
            .bind(location.z)
            .execute(&self.pool)
            .await?;

        tracing::debug!(location = %location, "Deleted tag");
        Ok(())
    }

    async fn find_by_location(
        &self,
        location: &BlockLocation,
    ) -> Result<Option<Tag>, StoreError> {
        let sql = format!(
            "SELECT world, x, y, z, is_ephemeral, created_at
             FROM {table}
             WHERE world = ? AND x = ? AND y = ? AND z = ?",
            table = self.table
        );
        let row = sqlx::query_as::<_, TagRow>(&sql)
            .bind(&location.world)
            .bind(location.x)
            .bind(location.y)
            .bind(location.z)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Tag::from))
    }

    async fn update_locations(&self, pairs: &OldNewLocationPairSet) -> Result<(), StoreError> {
        if pairs.is_empty() {
            return Ok(());
        }

        let select_sql = format!(
            "SELECT world, x, y, z, is_ephemeral, created_at
             FROM {table}
             WHERE world = ? AND x = ? AND y = ? AND z = ?",
            table = self.table
        );
        let delete_sql = format!(
            "DELETE FROM {table} WHERE world = ? AND x = ? AND y = ? AND z = ?",
            table = self.table
        );
        let insert_sql = format!(
            "INSERT INTO {table} (world, x, y, z, is_ephemeral, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON DUPLICATE KEY UPDATE is_ephemeral = VALUES(is_ephemeral),
                                     created_at = VALUES(created_at)",
            table = self.table
        );

        let mut tx = self.pool.begin().await?;

        // Snapshot phase: read every affected tag before touching keys so
        // overlapping pairs (a pushed column of blocks) cannot collide.
        let mut moved: Vec<Tag> = Vec::with_capacity(pairs.len());
        for pair in pairs {
            let row = sqlx::query_as::<_, TagRow>(&select_sql)
                .bind(&pair.old.world)
                .bind(pair.old.x)
                .bind(pair.old.y)
                .bind(pair.old.z)
                .fetch_optional(&mut *tx)
                .await?;
            if let Some(row) = row {
                moved.push(Tag::from(row).at_location(pair.new.clone()));
                sqlx::query(&delete_sql)
                    .bind(&pair.old.world)
                    .bind(pair.old.x)
                    .bind(pair.old.y)
                    .bind(pair.old.z)
                    .execute(&mut *tx)
                    .await?;
            }
        }

        // Rewrite phase: re-insert each detached tag at its new key.
        for tag in &moved {
            sqlx::query(&insert_sql)
                .bind(&tag.location.world)
                .bind(tag.location.x)
                .bind(tag.location.y)
                .bind(tag.location.z)
                .bind(tag.is_ephemeral)
                .bind(tag.created_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            pairs = pairs.len(),
            moved = moved.len(),
            "Rewrote tag locations"
        );
        Ok(())
    }
}
