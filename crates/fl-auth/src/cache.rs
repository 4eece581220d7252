use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{LauncherError, Result};

/// How long a cached unique id stays usable
pub const UNIQUE_ID_TTL_HOURS: i64 = 24;

/// Last-known session data for a user, letting repeat logins skip the network
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UniqueIdCacheEntry {
    pub user_name: String,
    pub unique_id: String,
    pub region: u32,
    pub max_expansion: u32,
    pub created_at: DateTime<Utc>,
}

impl UniqueIdCacheEntry {
    pub fn new(user_name: &str, unique_id: &str, region: u32, max_expansion: u32) -> Self {
        Self {
            user_name: user_name.to_string(),
            unique_id: unique_id.to_string(),
            region,
            max_expansion,
            created_at: Utc::now(),
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.created_at + chrono::Duration::hours(UNIQUE_ID_TTL_HOURS)
    }
}

/// Trait for storing and retrieving cached unique ids, keyed by user name
#[async_trait::async_trait]
pub trait UniqueIdCache: Send + Sync {
    /// Load a live entry for a user name
    async fn get(&self, user_name: &str) -> Option<UniqueIdCacheEntry>;

    /// Store an entry, replacing any previous one for the same user
    async fn put(&self, entry: UniqueIdCacheEntry) -> Result<()>;

    /// Forget a user's entry
    async fn remove(&self, user_name: &str) -> Result<()>;
}

/// In-memory cache for testing and single-session launchers
#[derive(Debug, Clone, Default)]
pub struct MemoryUniqueIdCache {
    entries: Arc<RwLock<HashMap<String, UniqueIdCacheEntry>>>,
}

impl MemoryUniqueIdCache {
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

#[async_trait::async_trait]
impl UniqueIdCache for MemoryUniqueIdCache {
    async fn get(&self, user_name: &str) -> Option<UniqueIdCacheEntry> {
        self.entries
            .read()
            .ok()?
            .get(user_name)
            .filter(|entry| !entry.is_expired())
            .cloned()
    }

    async fn put(&self, entry: UniqueIdCacheEntry) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| LauncherError::Cache("Lock poisoned".to_string()))?
            .insert(entry.user_name.clone(), entry);
        Ok(())
    }

    async fn remove(&self, user_name: &str) -> Result<()> {
        self.entries
            .write()
            .map_err(|_| LauncherError::Cache("Lock poisoned".to_string()))?
            .remove(user_name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_put_and_get() {
        let cache = MemoryUniqueIdCache::new();
        cache
            .put(UniqueIdCacheEntry::new("player", "uid-1", 3, 4))
            .await
            .unwrap();

        let entry = cache.get("player").await.unwrap();
        assert_eq!(entry.unique_id, "uid-1");
        assert_eq!(entry.region, 3);
        assert_eq!(entry.max_expansion, 4);
        assert!(cache.get("someone-else").await.is_none());
    }

    #[tokio::test]
    async fn test_expired_entry_is_ignored() {
        let cache = MemoryUniqueIdCache::new();
        let mut entry = UniqueIdCacheEntry::new("player", "uid-1", 3, 4);
        entry.created_at = Utc::now() - chrono::Duration::hours(25);
        cache.put(entry).await.unwrap();

        assert!(cache.get("player").await.is_none());
    }

    #[tokio::test]
    async fn test_remove() {
        let cache = MemoryUniqueIdCache::new();
        cache
            .put(UniqueIdCacheEntry::new("player", "uid-1", 3, 4))
            .await
            .unwrap();
        cache.remove("player").await.unwrap();

        assert!(cache.get("player").await.is_none());
    }
}
