//! Persistent TTL cache backed by an embedded key-value store
//!
//! Fetched provider payloads are cached here under string keys with a
//! per-entry time-to-live. The cache is handed to the service as a
//! collaborator; nothing in the core consults it directly, and staleness is
//! purely this layer's concern.

use crate::{CityWeatherError, Result};
use fjall::Keyspace;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::fmt::Debug;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::task;

#[derive(Serialize, Deserialize)]
struct StoredEntry<T> {
    value: T,
    expires_at: u64, // Unix timestamp (seconds)
}

/// TTL cache over an on-disk fjall keyspace.
pub struct PersistentCache {
    store: Keyspace,
}

fn get_from_store(store: Keyspace, key: Vec<u8>) -> Result<Option<Vec<u8>>> {
    let value = store
        .get(key)
        .map_err(|e| CityWeatherError::cache(e.to_string()))?;
    Ok(value.map(|v| v.to_vec()))
}

impl PersistentCache {
    /// Open (or create) the cache database at the given directory.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let db = fjall::Database::builder(&path)
            .open()
            .map_err(|e| CityWeatherError::cache(e.to_string()))?;
        let store = db
            .keyspace("cache", fjall::KeyspaceCreateOptions::default)
            .map_err(|e| CityWeatherError::cache(e.to_string()))?;
        Ok(Self { store })
    }

    /// Stores a serializable value with a time-to-live (TTL).
    #[tracing::instrument(name = "put_cache", level = "debug", skip(self, value))]
    pub async fn put<T: Serialize + Send + Debug + 'static>(
        &self,
        key: &str,
        value: T,
        ttl: Duration,
    ) -> Result<()> {
        let store = self.store.clone();
        let key = key.as_bytes().to_vec();

        let expires_at = SystemTime::now()
            .checked_add(ttl)
            .ok_or_else(|| CityWeatherError::cache("TTL overflow"))?
            .duration_since(UNIX_EPOCH)
            .map_err(|e| CityWeatherError::cache(e.to_string()))?
            .as_secs();
        let entry = StoredEntry { value, expires_at };
        let bytes =
            postcard::to_stdvec(&entry).map_err(|e| CityWeatherError::cache(e.to_string()))?;

        let _ = task::spawn_blocking(move || store.insert(key, bytes))
            .await
            .map_err(|e| CityWeatherError::cache(e.to_string()))?;
        Ok(())
    }

    /// Retrieves a value if it exists and has not expired.
    /// Returns `None` for cache misses or expired entries.
    #[tracing::instrument(name = "query_cache", level = "debug", skip(self))]
    pub async fn get<T: DeserializeOwned + Send + 'static>(&self, key: &str) -> Result<Option<T>> {
        let store = self.store.clone();
        let key_bytes = key.as_bytes().to_vec();

        let maybe_bytes: Option<Vec<u8>> =
            task::spawn_blocking(move || get_from_store(store, key_bytes))
                .await
                .map_err(|e| CityWeatherError::cache(e.to_string()))??;

        if let Some(bytes) = maybe_bytes {
            let entry: StoredEntry<T> = postcard::from_bytes(&bytes)
                .map_err(|e| CityWeatherError::cache(e.to_string()))?;
            let now = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map_err(|e| CityWeatherError::cache(e.to_string()))?
                .as_secs();

            if now < entry.expires_at {
                tracing::debug!("Key found and still fresh");
                Ok(Some(entry.value))
            } else {
                tracing::debug!("Key found but expired");
                self.remove(key).await?;
                Ok(None)
            }
        } else {
            tracing::debug!("Key not found");
            Ok(None)
        }
    }

    /// Manually removes a key from the cache.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let key = key.as_bytes().to_vec();
        let store = self.store.clone();
        let _ = task::spawn_blocking(move || store.remove(key))
            .await
            .map_err(|e| CityWeatherError::cache(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_put_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put("greeting", "hola".to_string(), Duration::from_secs(60))
            .await
            .unwrap();

        let value: Option<String> = cache.get("greeting").await.unwrap();
        assert_eq!(value, Some("hola".to_string()));
    }

    #[tokio::test]
    async fn test_missing_key_is_none() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        let value: Option<String> = cache.get("absent").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put("ephemeral", 42u32, Duration::from_secs(0))
            .await
            .unwrap();

        let value: Option<u32> = cache.get("ephemeral").await.unwrap();
        assert!(value.is_none());
    }

    #[tokio::test]
    async fn test_remove_deletes_entry() {
        let dir = TempDir::new().unwrap();
        let cache = PersistentCache::open(dir.path()).unwrap();

        cache
            .put("key", 7u32, Duration::from_secs(60))
            .await
            .unwrap();
        cache.remove("key").await.unwrap();

        let value: Option<u32> = cache.get("key").await.unwrap();
        assert!(value.is_none());
    }
}
