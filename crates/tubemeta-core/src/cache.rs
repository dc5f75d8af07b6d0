//! On-disk cache of remote metadata records.
//!
//! Each identifier owns exactly one JSON record at
//! `<cache_root>/youtubemetadata/<identifier>/ytvideo.json`. A record is
//! trusted for a fixed TTL (10 days by default) measured from the file's
//! modification time; after that it is re-fetched and overwritten. Records
//! are never deleted here.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tubemeta_core::cache::MetadataCache;
//! use tubemeta_core::fetcher::YouTubeApiFetcher;
//!
//! let fetcher = Arc::new(YouTubeApiFetcher::new("api-key")?);
//! let cache = MetadataCache::new("/var/cache/tubemeta", fetcher);
//!
//! let record = cache.ensure_fresh(&id, EntityKind::Video, &cancel).await?;
//! ```

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::ResolverConfig;
use crate::error::{CacheError, Error, Result};
use crate::fetcher::MetadataFetcher;
use crate::fs::{FileSystem, RealFileSystem};
use crate::identifier::Identifier;
use crate::record::{CacheRecord, EntityKind};

/// Default cache TTL in seconds (10 days).
pub const DEFAULT_CACHE_TTL_SECS: u64 = 10 * 24 * 60 * 60;

/// Directory under the cache root holding all records.
pub const CACHE_DIR_NAME: &str = "youtubemetadata";

/// File name of a record inside its identifier directory.
pub const RECORD_FILE_NAME: &str = "ytvideo.json";

/// Freshness of a cached record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CacheStatus {
    /// No record on disk.
    Missing,
    /// Record younger than the TTL.
    Fresh,
    /// Record older than the TTL.
    Stale,
}

/// Whether a record modified at `modified` is still trusted at `now`.
///
/// The boundary is inclusive: a record exactly `ttl` old is fresh. A
/// modification time in the future counts as fresh.
#[must_use]
pub fn is_fresh_at(modified: SystemTime, now: SystemTime, ttl: Duration) -> bool {
    now.duration_since(modified).map_or(true, |age| age <= ttl)
}

/// Whether `key` names exactly one plain directory below the cache root.
fn is_valid_key(key: &str) -> bool {
    if key.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(key).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Identifier-keyed record cache with fetch-on-miss.
pub struct MetadataCache {
    root: PathBuf,
    ttl: Duration,
    fetcher: Arc<dyn MetadataFetcher>,
    fs: Arc<dyn FileSystem>,
    in_flight: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl MetadataCache {
    /// Create a cache under `cache_root` that fetches through `fetcher`.
    pub fn new(cache_root: impl AsRef<Path>, fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self {
            root: cache_root.as_ref().join(CACHE_DIR_NAME),
            ttl: Duration::from_secs(DEFAULT_CACHE_TTL_SECS),
            fetcher,
            fs: Arc::new(RealFileSystem::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Create a cache from resolver configuration.
    pub fn from_config(config: &ResolverConfig, fetcher: Arc<dyn MetadataFetcher>) -> Self {
        Self::new(&config.cache_root, fetcher).with_ttl(config.cache_ttl())
    }

    /// Set the TTL.
    #[must_use]
    pub const fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Use another file system implementation.
    #[must_use]
    pub fn with_file_system(mut self, fs: Arc<dyn FileSystem>) -> Self {
        self.fs = fs;
        self
    }

    /// Directory holding all records.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// TTL applied to records.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Path of the record for `id`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidKey`] when `id` is not a single plain path
    /// component, so that every record stays under [`Self::root`].
    pub fn record_path(&self, id: &Identifier) -> Result<PathBuf> {
        if !is_valid_key(id.as_str()) {
            return Err(CacheError::InvalidKey {
                id: id.as_str().to_string(),
            }
            .into());
        }
        Ok(self.root.join(id.as_str()).join(RECORD_FILE_NAME))
    }

    /// Freshness of the record for `id`, without reading it.
    ///
    /// Identifiers that cannot be cached are always [`CacheStatus::Missing`].
    #[must_use]
    pub fn status(&self, id: &Identifier) -> CacheStatus {
        let Ok(path) = self.record_path(id) else {
            return CacheStatus::Missing;
        };
        match self.fs.modified(&path) {
            Ok(Some(modified)) if is_fresh_at(modified, SystemTime::now(), self.ttl) => {
                CacheStatus::Fresh
            }
            Ok(Some(_)) => CacheStatus::Stale,
            Ok(None) => CacheStatus::Missing,
            Err(e) => {
                warn!("Cannot stat cached record {}: {}", path.display(), e);
                CacheStatus::Missing
            }
        }
    }

    /// Return the record for `id`, fetching and persisting it when the cached
    /// copy is missing, stale or unreadable.
    ///
    /// Fetches for the same identifier are serialized, so concurrent callers
    /// trigger at most one remote call per expiry. A record that was fetched
    /// but could not be written is still returned.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::InvalidKey`] for identifiers that cannot be
    /// cached (nothing is fetched), [`Error::Cancelled`] if `cancel` fires
    /// before the record is available, or the fetcher's error. The cache file
    /// is left untouched in all of these cases.
    pub async fn ensure_fresh(
        &self,
        id: &Identifier,
        entity: EntityKind,
        cancel: &CancellationToken,
    ) -> Result<CacheRecord> {
        self.record_path(id)?;

        if let Some(record) = self.read_fresh(id) {
            return Ok(record);
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let lock = self.lock_for(id);
        let result = {
            let acquired = tokio::select! {
                biased;
                () = cancel.cancelled() => None,
                guard = lock.lock() => Some(guard),
            };
            match acquired {
                None => Err(Error::Cancelled),
                Some(_guard) => {
                    if let Some(record) = self.read_fresh(id) {
                        debug!("Record for {} was refreshed by a concurrent caller", id);
                        Ok(record)
                    } else {
                        self.fetch_and_store(id, entity, cancel).await
                    }
                }
            }
        };
        self.release_lock(id, lock);

        result
    }

    async fn fetch_and_store(
        &self,
        id: &Identifier,
        entity: EntityKind,
        cancel: &CancellationToken,
    ) -> Result<CacheRecord> {
        let record = self.fetcher.fetch(id, entity, cancel).await?;

        if let Err(e) = self.store(id, &record) {
            warn!("Returning uncached record for {}: {}", id, e);
        } else {
            info!("Cached {} record for {}", record.entity_kind(), id);
        }

        Ok(record)
    }

    /// Read the record for `id` if it is fresh and parses.
    fn read_fresh(&self, id: &Identifier) -> Option<CacheRecord> {
        if self.status(id) != CacheStatus::Fresh {
            return None;
        }

        match self.read(id) {
            Ok(record) => {
                debug!("Cache hit for {}", id);
                Some(record)
            }
            Err(e) => {
                warn!("Ignoring unreadable cached record: {}", e);
                None
            }
        }
    }

    fn read(&self, id: &Identifier) -> Result<CacheRecord> {
        let path = self.record_path(id)?;
        let read_failed = |reason: String| {
            Error::Cache(CacheError::ReadFailed {
                path: path.clone(),
                reason,
            })
        };

        let content = self
            .fs
            .read_to_string(&path)
            .map_err(|e| read_failed(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| read_failed(e.to_string()))
    }

    /// Overwrite the record for `id`.
    fn store(&self, id: &Identifier, record: &CacheRecord) -> Result<()> {
        let path = self.record_path(id)?;
        let write_failed = |reason: String| {
            Error::Cache(CacheError::WriteFailed {
                path: path.clone(),
                reason,
            })
        };

        let content = serde_json::to_string(record).map_err(|e| write_failed(e.to_string()))?;
        self.fs
            .write_atomic(&path, &content)
            .map_err(|e| write_failed(e.to_string()))
    }

    fn lock_for(&self, id: &Identifier) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(id.as_str().to_string()).or_default())
    }

    fn release_lock(&self, id: &Identifier, lock: Arc<tokio::sync::Mutex<()>>) {
        let mut locks = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        drop(lock);
        // Only the map still holds it: nobody else is waiting.
        if locks
            .get(id.as_str())
            .is_some_and(|entry| Arc::strong_count(entry) == 1)
        {
            locks.remove(id.as_str());
        }
    }
}
