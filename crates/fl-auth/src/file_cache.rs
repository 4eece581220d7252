use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use fs2::FileExt;
use tokio::fs;
use tokio::sync::RwLock;

use crate::cache::{UniqueIdCache, UniqueIdCacheEntry};
use crate::errors::{LauncherError, Result};

/// File-backed unique id cache
///
/// # Directory Structure
/// ```text
/// ~/.cache/frontier-launcher/
/// ├── lock                   # Advisory lock file
/// └── unique_ids.json        # Cached entries, one per user name
/// ```
#[derive(Debug)]
pub struct FileUniqueIdCache {
    cache_file: PathBuf,
    lock_file: PathBuf,
    /// Entries as last read from or written to disk
    entries: Arc<RwLock<HashMap<String, UniqueIdCacheEntry>>>,
}

impl FileUniqueIdCache {
    /// Open (or create) a cache under `storage_dir`
    pub async fn new(storage_dir: impl AsRef<Path>) -> Result<Self> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        fs::create_dir_all(&storage_dir).await?;

        let cache_file = storage_dir.join("unique_ids.json");
        let lock_file = storage_dir.join("lock");
        let entries = Self::load_from_disk(&cache_file).await?;

        Ok(Self {
            cache_file,
            lock_file,
            entries: Arc::new(RwLock::new(entries)),
        })
    }

    /// Get default storage directory for the current platform
    pub fn default_storage_dir() -> Result<PathBuf> {
        let project_dirs = directories::ProjectDirs::from("com", "frontier", "frontier-launcher")
            .ok_or_else(|| LauncherError::Cache("Could not determine cache directory".to_string()))?;

        Ok(project_dirs.cache_dir().to_path_buf())
    }

    /// Acquire an exclusive lock on the storage
    fn acquire_lock(&self) -> Result<std::fs::File> {
        let lock_file = std::fs::OpenOptions::new()
            .create(true)
            .truncate(false)
            .write(true)
            .open(&self.lock_file)?;

        lock_file
            .try_lock_exclusive()
            .map_err(|_| LauncherError::Cache("Cache is locked by another launcher".to_string()))?;

        Ok(lock_file)
    }

    async fn load_from_disk(path: &Path) -> Result<HashMap<String, UniqueIdCacheEntry>> {
        if fs::metadata(path).await.is_err() {
            return Ok(HashMap::new());
        }

        let content = fs::read_to_string(path).await?;
        let entries: Vec<UniqueIdCacheEntry> = match serde_json::from_str(&content) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Discarding unreadable unique id cache {}: {}", path.display(), e);
                Vec::new()
            }
        };

        Ok(entries
            .into_iter()
            .filter(|entry| !entry.is_expired())
            .map(|entry| (entry.user_name.clone(), entry))
            .collect())
    }

    /// Write all entries to disk via a temp file and rename
    async fn save_to_disk(&self, entries: &HashMap<String, UniqueIdCacheEntry>) -> Result<()> {
        let mut list: Vec<&UniqueIdCacheEntry> = entries.values().collect();
        list.sort_by(|a, b| a.user_name.cmp(&b.user_name));
        let json = serde_json::to_string_pretty(&list)?;

        let temp_path = self.cache_file.with_extension("tmp");
        fs::write(&temp_path, json).await?;
        fs::rename(&temp_path, &self.cache_file).await?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            std::fs::set_permissions(&self.cache_file, perms)?;
        }

        Ok(())
    }
}

#[async_trait::async_trait]
impl UniqueIdCache for FileUniqueIdCache {
    async fn get(&self, user_name: &str) -> Option<UniqueIdCacheEntry> {
        self.entries
            .read()
            .await
            .get(user_name)
            .filter(|entry| !entry.is_expired())
            .cloned()
    }

    async fn put(&self, entry: UniqueIdCacheEntry) -> Result<()> {
        let _lock = self.acquire_lock()?;

        // Other launchers may have written since we last looked
        let mut on_disk = Self::load_from_disk(&self.cache_file).await?;
        on_disk.insert(entry.user_name.clone(), entry);
        self.save_to_disk(&on_disk).await?;

        *self.entries.write().await = on_disk;
        Ok(())
    }

    async fn remove(&self, user_name: &str) -> Result<()> {
        let _lock = self.acquire_lock()?;

        let mut on_disk = Self::load_from_disk(&self.cache_file).await?;
        if on_disk.remove(user_name).is_some() {
            self.save_to_disk(&on_disk).await?;
        }

        *self.entries.write().await = on_disk;
        Ok(())
    }
}
