//! Disk-based image cache for persistence across sessions.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use lru::LruCache;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::domain::entities::ImageId;
use crate::domain::errors::{ImageError, ImageResult};

/// Default disk cache limit in megabytes.
pub const DEFAULT_LIMIT_MB: u64 = 200;

const SETTINGS_FILE: &str = "settings.json";
const ENTRY_EXTENSION: &str = "img";
const BYTES_PER_MB: u64 = 1024 * 1024;

#[derive(Debug, Serialize, Deserialize)]
struct CacheSettings {
    limit_mb: u64,
}

struct Index {
    entries: LruCache<ImageId, u64>,
    usage: u64,
    limit_mb: u64,
}

impl Index {
    const fn limit_bytes(&self) -> u64 {
        self.limit_mb.saturating_mul(BYTES_PER_MB)
    }
}

/// Disk cache of raw image bytes with whole-entry LRU eviction.
///
/// Usage never exceeds the limit after a mutation completes. Recency is
/// updated on insert and read, and survives restarts through file
/// modification times.
pub struct DiskImageCache {
    cache_dir: PathBuf,
    index: Mutex<Index>,
}

impl std::fmt::Debug for DiskImageCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiskImageCache")
            .field("cache_dir", &self.cache_dir)
            .finish_non_exhaustive()
    }
}

fn io_error(context: &str, e: &std::io::Error) -> ImageError {
    ImageError::Io(format!("{context}: {e}"))
}

impl DiskImageCache {
    /// Opens the cache in `cache_dir`, rebuilding the index from the files
    /// present. A limit persisted by [`Self::update_limit`] takes precedence
    /// over `default_limit_mb`.
    ///
    /// # Errors
    /// Returns error if the cache directory cannot be created or read.
    pub async fn open(cache_dir: PathBuf, default_limit_mb: u64) -> ImageResult<Self> {
        fs::create_dir_all(&cache_dir)
            .await
            .map_err(|e| io_error("Failed to create cache dir", &e))?;

        let limit_mb = read_settings(&cache_dir)
            .await
            .map_or(default_limit_mb, |s| s.limit_mb);

        let mut files: Vec<(ImageId, SystemTime, u64)> = Vec::new();
        let mut dir = fs::read_dir(&cache_dir)
            .await
            .map_err(|e| io_error("Failed to read cache dir", &e))?;

        while let Ok(Some(entry)) = dir.next_entry().await {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != ENTRY_EXTENSION) {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            if let Ok(meta) = entry.metadata().await {
                let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                files.push((ImageId::new(stem), modified, meta.len()));
            }
        }

        files.sort_by_key(|(_, modified, _)| *modified);

        let mut entries = LruCache::unbounded();
        let mut usage = 0u64;
        for (id, _, size) in files {
            usage += size;
            entries.put(id, size);
        }

        debug!(
            dir = %cache_dir.display(),
            entries = entries.len(),
            usage,
            limit_mb,
            "Opened disk cache"
        );

        let cache = Self {
            cache_dir,
            index: Mutex::new(Index {
                entries,
                usage,
                limit_mb,
            }),
        };

        {
            let mut index = cache.index.lock().await;
            cache.evict_to_fit(&mut index, 0).await;
        }

        Ok(cache)
    }

    /// Returns the cache directory.
    #[must_use]
    pub fn directory(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, id: &ImageId) -> PathBuf {
        self.cache_dir.join(format!("{}.{ENTRY_EXTENSION}", id.as_str()))
    }

    /// Total bytes currently stored.
    pub async fn current_usage_bytes(&self) -> u64 {
        self.index.lock().await.usage
    }

    /// Current limit in megabytes.
    pub async fn limit_in_megabytes(&self) -> u64 {
        self.index.lock().await.limit_mb
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.index.lock().await.entries.len()
    }

    /// Returns true if nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Returns true if an entry is stored for `id`.
    pub async fn contains(&self, id: &ImageId) -> bool {
        self.index.lock().await.entries.contains(id)
    }

    /// Changes the limit, evicting least recently used entries until usage
    /// fits, and persists it.
    ///
    /// # Errors
    /// Returns error if the settings file cannot be written.
    pub async fn update_limit(&self, limit_mb: u64) -> ImageResult<()> {
        let mut index = self.index.lock().await;
        index.limit_mb = limit_mb;
        self.evict_to_fit(&mut index, 0).await;

        let settings = serde_json::to_vec_pretty(&CacheSettings { limit_mb })
            .map_err(|e| ImageError::Io(e.to_string()))?;
        fs::write(self.cache_dir.join(SETTINGS_FILE), settings)
            .await
            .map_err(|e| io_error("Failed to write cache settings", &e))?;

        debug!(limit_mb, usage = index.usage, "Updated disk cache limit");
        Ok(())
    }

    /// Reads an entry, marking it most recently used.
    pub async fn get_bytes(&self, id: &ImageId) -> Option<Vec<u8>> {
        let mut index = self.index.lock().await;
        if index.entries.get(id).is_none() {
            trace!(id = %id, "Disk cache miss");
            return None;
        }

        let path = self.entry_path(id);
        match fs::read(&path).await {
            Ok(bytes) => {
                trace!(id = %id, path = %path.display(), "Disk cache hit");
                touch(&path).await;
                Some(bytes)
            }
            Err(e) => {
                warn!(id = %id, error = %e, "Indexed cache entry unreadable, dropping");
                if let Some(size) = index.entries.pop(id) {
                    index.usage = index.usage.saturating_sub(size);
                }
                None
            }
        }
    }

    /// Stores an entry, evicting least recently used entries to make room.
    /// An entry larger than the whole limit is not stored.
    ///
    /// # Errors
    /// Returns error if the file cannot be written.
    pub async fn put_bytes(&self, id: &ImageId, bytes: &[u8]) -> ImageResult<()> {
        let size = bytes.len() as u64;
        let mut index = self.index.lock().await;

        if size > index.limit_bytes() {
            debug!(id = %id, size, limit_mb = index.limit_mb, "Entry exceeds disk cache limit, not storing");
            return Ok(());
        }

        if let Some(old) = index.entries.pop(id) {
            index.usage = index.usage.saturating_sub(old);
        }
        self.evict_to_fit(&mut index, size).await;

        let path = self.entry_path(id);
        if let Err(e) = fs::write(&path, bytes).await {
            let _ = fs::remove_file(&path).await;
            return Err(io_error("Failed to write cache file", &e));
        }

        index.entries.put(id.clone(), size);
        index.usage += size;

        debug!(id = %id, size, usage = index.usage, "Stored image in disk cache");
        Ok(())
    }

    /// Removes an entry.
    pub async fn evict(&self, id: &ImageId) {
        let mut index = self.index.lock().await;
        if let Some(size) = index.entries.pop(id) {
            index.usage = index.usage.saturating_sub(size);
            self.remove_entry_file(id).await;
            debug!(id = %id, "Evicted from disk cache");
        }
    }

    /// Removes every entry.
    ///
    /// # Errors
    /// Returns error if the cache directory cannot be read.
    pub async fn clear(&self) -> ImageResult<()> {
        let mut index = self.index.lock().await;

        let mut dir = fs::read_dir(&self.cache_dir)
            .await
            .map_err(|e| io_error("Failed to read cache dir", &e))?;
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| io_error("Failed to read entry", &e))?
        {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == ENTRY_EXTENSION)
                && let Err(e) = fs::remove_file(&path).await
            {
                warn!(path = %path.display(), error = %e, "Failed to remove cache file");
            }
        }

        index.entries.clear();
        index.usage = 0;
        debug!("Cleared disk cache");
        Ok(())
    }

    /// Evicts least recently used entries until `incoming` more bytes fit.
    async fn evict_to_fit(&self, index: &mut Index, incoming: u64) {
        let limit = index.limit_bytes();
        while index.usage + incoming > limit {
            let Some((id, size)) = index.entries.pop_lru() else {
                break;
            };
            index.usage = index.usage.saturating_sub(size);
            self.remove_entry_file(&id).await;
            trace!(id = %id, size, "Evicted least recently used disk entry");
        }
    }

    async fn remove_entry_file(&self, id: &ImageId) {
        if let Err(e) = fs::remove_file(self.entry_path(id)).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            warn!(id = %id, error = %e, "Failed to remove cache file");
        }
    }
}

async fn read_settings(dir: &Path) -> Option<CacheSettings> {
    let raw = fs::read(dir.join(SETTINGS_FILE)).await.ok()?;
    match serde_json::from_slice(&raw) {
        Ok(settings) => Some(settings),
        Err(e) => {
            warn!(error = %e, "Ignoring malformed disk cache settings");
            None
        }
    }
}

async fn touch(path: &Path) {
    let target = path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || {
        std::fs::OpenOptions::new()
            .append(true)
            .open(&target)?
            .set_modified(SystemTime::now())
    })
    .await;

    match result {
        Ok(Ok(())) => {}
        Ok(Err(e)) => {
            trace!(path = %path.display(), error = %e, "Failed to update cache entry mtime");
        }
        Err(e) => warn!(path = %path.display(), error = %e, "Touch task panicked"),
    }
}
