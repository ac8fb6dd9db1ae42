//! Configuration Store
//!
//! String-keyed JSON configuration behind a trait, so the filter and
//! lifecycle code are a pure function of explicit inputs. The Postgres
//! adapter backs production; the in-memory store backs tests and
//! embedding.

use async_trait::async_trait;
use dashmap::DashMap;
use sqlx::PgPool;
use thiserror::Error;

/// Errors from configuration store operations.
#[derive(Debug, Error)]
pub enum ConfigStoreError {
    /// Database error.
    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

/// Sitewide string-keyed configuration.
///
/// Writes are last-write-wins; no multi-key atomicity is guaranteed
/// beyond `remove_prefix`, which removes a whole namespace in one
/// operation.
#[async_trait]
pub trait ConfigStore: Send + Sync {
    /// Read a configuration value.
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, ConfigStoreError>;

    /// Write a configuration value, replacing any previous one.
    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), ConfigStoreError>;

    /// Remove a configuration value. Removing an absent key is not an
    /// error.
    async fn remove(&self, key: &str) -> Result<(), ConfigStoreError>;

    /// Atomically remove every key under a namespace prefix.
    async fn remove_prefix(&self, prefix: &str) -> Result<(), ConfigStoreError>;
}

/// Postgres-backed configuration store (`site_config` table).
#[derive(Debug, Clone)]
pub struct PgConfigStore {
    pool: PgPool,
}

impl PgConfigStore {
    /// Create a store over an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConfigStore for PgConfigStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, ConfigStoreError> {
        let value: Option<serde_json::Value> = sqlx::query_scalar(
            r"
            SELECT value
            FROM site_config
            WHERE key = $1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), ConfigStoreError> {
        sqlx::query(
            r"
            INSERT INTO site_config (key, value, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value,
                updated_at = NOW()
            ",
        )
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ConfigStoreError> {
        sqlx::query("DELETE FROM site_config WHERE key = $1")
            .bind(key)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<(), ConfigStoreError> {
        // Single statement: a namespace disappears atomically.
        sqlx::query("DELETE FROM site_config WHERE starts_with(key, $1)")
            .bind(prefix)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}

/// In-memory configuration store for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    entries: DashMap<String, serde_json::Value>,
}

impl MemoryConfigStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, ConfigStoreError> {
        Ok(self.entries.get(key).map(|entry| entry.value().clone()))
    }

    async fn set(&self, key: &str, value: serde_json::Value) -> Result<(), ConfigStoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), ConfigStoreError> {
        self.entries.remove(key);
        Ok(())
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<(), ConfigStoreError> {
        self.entries.retain(|key, _| !key.starts_with(prefix));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_memory_store_round_trip() {
        let store = MemoryConfigStore::new();

        store.set("A.One", json!(["x"])).await.unwrap();
        assert_eq!(store.get("A.One").await.unwrap(), Some(json!(["x"])));

        store.set("A.One", json!(["y"])).await.unwrap();
        assert_eq!(store.get("A.One").await.unwrap(), Some(json!(["y"])));
    }

    #[tokio::test]
    async fn test_memory_store_missing_key_is_none() {
        let store = MemoryConfigStore::new();
        assert_eq!(store.get("A.Missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_remove_is_idempotent() {
        let store = MemoryConfigStore::new();

        store.set("A.One", json!(true)).await.unwrap();
        store.remove("A.One").await.unwrap();
        store.remove("A.One").await.unwrap();

        assert_eq!(store.get("A.One").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_memory_store_remove_prefix_spares_other_namespaces() {
        let store = MemoryConfigStore::new();

        store.set("A.One", json!(1)).await.unwrap();
        store.set("A.Two", json!(2)).await.unwrap();
        store.set("B.One", json!(3)).await.unwrap();

        store.remove_prefix("A.").await.unwrap();

        assert_eq!(store.get("A.One").await.unwrap(), None);
        assert_eq!(store.get("A.Two").await.unwrap(), None);
        assert_eq!(store.get("B.One").await.unwrap(), Some(json!(3)));
    }
}
