//! `SQLite`-backed implementation of [`TagStore`].
//!
//! The file-based single-writer backend, suitable for single-server
//! deployments where the plugin and its data live on the same host. The
//! schema is created on connect; there is no separate migration step
//! because the table name is operator-configured.
//!
//! Uses [`sqlx`] with runtime query construction (not compile-time
//! checked) so no live database is required at build time. All values are
//! bound as parameters; the only interpolated identifier is the validated
//! table name.

use async_trait::async_trait;
use blocktag_types::{BlockLocation, OldNewLocationPairSet, Tag};
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::config::DatabaseConfig;
use crate::error::StoreError;
use crate::store::TagStore;

/// Tag storage backed by a `SQLite` database file.
#[derive(Debug, Clone)]
pub struct SqliteTagStore {
    pool: SqlitePool,
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

impl SqliteTagStore {
    /// Connect to `SQLite` using the provided configuration and ensure
    /// the tags table exists.
    ///
    /// The database file is created if missing.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Config`] if the table name is invalid and
    /// [`StoreError::Database`] if the connection or schema setup fails.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let table = config.validated_table_name()?.to_owned();

        let connect_options: SqliteConnectOptions = config
            .url
            .parse::<SqliteConnectOptions>()
            .map_err(|e| StoreError::Config(format!("invalid SQLite URL: {e}")))?
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
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
            "Connected to SQLite tag store"
        );
        Ok(store)
    }

    /// Create the tags table if it does not exist yet.
    async fn ensure_schema(&self) -> Result<(), StoreError> {
        let sql = format!(
            "CREATE TABLE IF NOT EXISTS {table} (
                world TEXT NOT NULL,
                x INTEGER NOT NULL,
                y INTEGER NOT NULL,
                z INTEGER NOT NULL,
                is_ephemeral INTEGER NOT NULL,
                created_at TEXT NOT NULL,
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
        tracing::info!("SQLite pool closed");
    }
}

#[async_trait]
impl TagStore for SqliteTagStore {
    async fn put(&self, tag: &Tag) -> Result<(), StoreError> {
        let sql = format!(
            "INSERT INTO {table} (world, x, y, z, is_ephemeral, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT (world, x, y, z)
             DO UPDATE SET is_ephemeral = excluded.is_ephemeral,
                           created_at = excluded.created_at",
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
             ON CONFLICT (world, x, y, z)
             DO UPDATE SET is_ephemeral = excluded.is_ephemeral,
                           created_at = excluded.created_at",
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
