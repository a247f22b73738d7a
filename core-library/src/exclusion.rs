//! Exclusion management
//!
//! Tracks the set of library ids the user has chosen to omit from exports.
//! The set lives inside the album cache file but is mutated independently of
//! sync: every mutation re-reads the stored cache, replaces only the
//! exclusion field, and saves — a targeted read-merge-write that cannot
//! clobber album data written by a concurrent refresh. When no cache file
//! exists yet there is nothing to annotate and persistence is a no-op.

use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::Result;
use crate::store::{AlbumCache, AlbumCacheStore};

/// User-driven exclusion set with write-through persistence
pub struct ExclusionManager {
    store: Arc<AlbumCacheStore>,
    excluded: RwLock<HashSet<String>>,
}

impl ExclusionManager {
    /// Create an empty manager backed by the given store
    pub fn new(store: Arc<AlbumCacheStore>) -> Self {
        Self {
            store,
            excluded: RwLock::new(HashSet::new()),
        }
    }

    /// Seed the in-memory set from a loaded cache
    pub async fn load_from(&self, cache: &AlbumCache) {
        let mut excluded = self.excluded.write().await;
        *excluded = cache.excluded_library_ids.clone();
    }

    /// Whether a library id is currently excluded
    pub async fn is_excluded(&self, library_id: &str) -> bool {
        self.excluded.read().await.contains(library_id)
    }

    /// Snapshot of the current exclusion set
    pub async fn snapshot(&self) -> HashSet<String> {
        self.excluded.read().await.clone()
    }

    /// Excluded records within one year bucket of the given cache
    pub async fn excluded_count_for_year(&self, cache: &AlbumCache, year: i32) -> usize {
        let excluded = self.excluded.read().await;
        cache
            .records_for_year(year)
            .iter()
            .filter(|record| excluded.contains(&record.library_id))
            .count()
    }

    /// Flip one id's exclusion state; returns the new state
    pub async fn toggle(&self, library_id: &str) -> Result<bool> {
        let now_excluded = {
            let mut excluded = self.excluded.write().await;
            if excluded.remove(library_id) {
                false
            } else {
                excluded.insert(library_id.to_string());
                true
            }
        };

        debug!(library_id = library_id, excluded = now_excluded, "Toggled exclusion");
        self.persist().await?;
        Ok(now_excluded)
    }

    /// Bulk-set exclusion state for many ids (range selection)
    pub async fn set_excluded(&self, library_ids: &[String], excluded: bool) -> Result<()> {
        {
            let mut set = self.excluded.write().await;
            for library_id in library_ids {
                if excluded {
                    set.insert(library_id.clone());
                } else {
                    set.remove(library_id);
                }
            }
        }

        debug!(count = library_ids.len(), excluded = excluded, "Bulk-set exclusions");
        self.persist().await
    }

    /// Write the current set into the stored cache without touching albums
    async fn persist(&self) -> Result<()> {
        let Some(mut cache) = self.store.load().await? else {
            // No cache file yet; nothing to annotate.
            return Ok(());
        };

        cache.excluded_library_ids = self.excluded.read().await.clone();
        self.store.save(&cache).await
    }
}
