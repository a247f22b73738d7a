//! # Sync Engine
//!
//! Drives full and incremental refresh of the mirrored album collection.
//!
//! ## Workflow
//!
//! 1. Reject the request if a refresh is already in flight
//! 2. Page through the remote favorites listing until the cursor is
//!    exhausted, emitting progress against the total the server announced on
//!    its first page
//! 3. Normalize raw entries into album records, resolving catalog ids
//! 4. Merge against the existing collection: full mode rebuilds from fresh
//!    data only, incremental mode keeps every existing record verbatim and
//!    adds newly favorited albums
//! 5. Re-bucket by derived year, sort each bucket by case-insensitive
//!    artist, recompute totals, restore the pre-pass exclusion snapshot
//! 6. Persist the merged cache; `last_updated` advances only when the save
//!    succeeds
//!
//! Any paging or decoding error aborts the pass before step 4, so the
//! previous in-memory and persisted cache always stand untouched on failure.

use bridge_traits::library::{CatalogRef, LibraryProvider, RawAlbumEntry};
use bridge_traits::time::Clock;
use core_library::models::{canonical_link_for, derive_release_year, AlbumRecord};
use core_library::store::{AlbumCache, AlbumCacheStore};
use core_library::ExclusionManager;
use core_runtime::events::{CoreEvent, EventBus, SyncEvent};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::{Result, SyncError};

/// Sync engine for the mirrored album collection
///
/// Owns the in-memory collection; all mutations flow through
/// [`fetch_favorites`](SyncEngine::fetch_favorites) under a single-flight
/// guard, so the persisted cache reflects either the pre-pass state or the
/// fully-merged post-pass state, never an interleaving.
pub struct SyncEngine {
    /// Remote library provider
    provider: Arc<dyn LibraryProvider>,

    /// Durable album cache store
    store: Arc<AlbumCacheStore>,

    /// Exclusion set, snapshotted before and restored after each pass
    exclusions: Arc<ExclusionManager>,

    /// Event bus for progress events
    event_bus: EventBus,

    /// Time source for timestamps and the year-derivation fallback
    clock: Arc<dyn Clock>,

    /// Current in-memory collection
    state: Mutex<AlbumCache>,

    /// Single-flight guard; held for the duration of a refresh
    refresh_gate: Mutex<()>,
}

impl SyncEngine {
    /// Create a new engine with an empty in-memory collection
    pub fn new(
        provider: Arc<dyn LibraryProvider>,
        store: Arc<AlbumCacheStore>,
        exclusions: Arc<ExclusionManager>,
        event_bus: EventBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            store,
            exclusions,
            event_bus,
            clock,
            state: Mutex::new(AlbumCache::default()),
            refresh_gate: Mutex::new(()),
        }
    }

    /// Hydrate the in-memory collection from the persisted cache.
    ///
    /// A missing or undecodable cache file leaves the collection empty; the
    /// next refresh rebuilds it from remote data.
    pub async fn hydrate(&self) -> Result<AlbumCache> {
        let cache = self.store.load().await?.unwrap_or_default();
        self.exclusions.load_from(&cache).await;

        let mut state = self.state.lock().await;
        *state = cache.clone();

        info!(
            albums = cache.total_albums,
            "Hydrated album collection from cache"
        );
        Ok(cache)
    }

    /// Snapshot of the current in-memory collection
    pub async fn cached(&self) -> AlbumCache {
        self.state.lock().await.clone()
    }

    /// Run a refresh pass against the remote library.
    ///
    /// # Arguments
    ///
    /// * `incremental` - keep every existing record verbatim and add newly
    ///   favorited albums; `false` rebuilds the collection from fresh remote
    ///   data only
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::SyncInProgress`] when a refresh is already in
    /// flight, and [`SyncError::FetchFailed`] when any page fails to fetch
    /// or decode (the previous cache stands untouched).
    #[instrument(skip(self), fields(incremental = incremental))]
    pub async fn fetch_favorites(&self, incremental: bool) -> Result<AlbumCache> {
        let _guard = self
            .refresh_gate
            .try_lock()
            .map_err(|_| SyncError::SyncInProgress)?;

        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::Started { incremental }))
            .ok();

        let previous = self.cached().await;

        let raw_entries = match self.fetch_all_pages().await {
            Ok(entries) => entries,
            Err(e) => {
                self.event_bus
                    .emit(CoreEvent::Sync(SyncEvent::Failed {
                        message: e.to_string(),
                    }))
                    .ok();
                return Err(e);
            }
        };

        let fallback_year = self.clock.current_year();
        let mut merged: Vec<AlbumRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut added = 0usize;
        let mut kept = 0usize;

        if incremental {
            // Existing records survive even when absent from the new remote
            // results; only a full pass can drop them.
            for record in previous.all_records() {
                seen.insert(record.library_id.clone());
                merged.push(record.clone());
            }
        }

        for entry in &raw_entries {
            if !entry.favorite.unwrap_or(false) {
                continue;
            }
            if entry.library_id.is_empty() {
                continue;
            }
            if seen.contains(&entry.library_id) {
                kept += 1;
                continue;
            }
            if let Some(record) = normalize_entry(entry, fallback_year) {
                seen.insert(record.library_id.clone());
                merged.push(record);
                added += 1;
            } else {
                debug!(
                    library_id = %entry.library_id,
                    "Skipping entry with no resolvable name or artist"
                );
            }
        }

        let mut albums: BTreeMap<i32, Vec<AlbumRecord>> = BTreeMap::new();
        for record in merged {
            albums.entry(record.derived_year).or_default().push(record);
        }
        for bucket in albums.values_mut() {
            bucket.sort_by_key(|record| record.sort_artist());
        }

        let total_albums = albums.values().map(Vec::len).sum();
        let mut cache = AlbumCache {
            albums,
            total_albums,
            last_updated: self.clock.now(),
            excluded_library_ids: self.exclusions.snapshot().await,
        };

        if let Err(e) = self.store.save(&cache).await {
            // The in-memory collection stays authoritative until the next
            // successful save; the timestamp advances only with one.
            warn!(error = %e, "Failed to persist album cache");
            cache.last_updated = previous.last_updated;
        }

        {
            let mut state = self.state.lock().await;
            *state = cache.clone();
        }

        info!(
            total = total_albums,
            added = added,
            kept = kept,
            "Refresh completed"
        );
        self.event_bus
            .emit(CoreEvent::Sync(SyncEvent::Completed {
                total: total_albums,
                added,
                kept,
            }))
            .ok();

        Ok(cache)
    }

    /// Page through the favorites listing until the cursor is exhausted
    async fn fetch_all_pages(&self) -> Result<Vec<RawAlbumEntry>> {
        let mut entries: Vec<RawAlbumEntry> = Vec::new();
        let mut cursor: Option<String> = None;
        let mut total_announced: Option<u64> = None;
        let mut page_count = 0u32;

        loop {
            page_count += 1;
            debug!(page = page_count, cursor = ?cursor, "Fetching favorites page");

            let page = self
                .provider
                .list_favorites(cursor)
                .await
                .map_err(|e| SyncError::FetchFailed(e.to_string()))?;

            // The announced total is captured only from the first page so
            // the progress denominator cannot fluctuate.
            if page_count == 1 {
                total_announced = page.total_announced;
            }

            entries.extend(page.entries);

            self.event_bus
                .emit(CoreEvent::Sync(SyncEvent::Progress {
                    fetched: entries.len() as u64,
                    total_announced,
                }))
                .ok();

            cursor = page.next_cursor;
            if cursor.is_none() {
                break;
            }
        }

        info!(
            entries = entries.len(),
            pages = page_count,
            "Fetched all favorites pages"
        );
        Ok(entries)
    }
}

/// Normalize a raw entry into an album record.
///
/// Entries contributing no resolvable name or artist never become records.
pub fn normalize_entry(entry: &RawAlbumEntry, fallback_year: i32) -> Option<AlbumRecord> {
    let title = entry.name.as_deref().map(str::trim).filter(|s| !s.is_empty())?;
    let artist = entry
        .artist
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())?;

    let catalog_id = resolve_catalog_id(entry);
    let release_date_raw = entry.release_date.clone().unwrap_or_default();
    let derived_year = derive_release_year(&release_date_raw, fallback_year);

    Some(AlbumRecord {
        library_id: entry.library_id.clone(),
        catalog_id,
        title: title.to_string(),
        artist: artist.to_string(),
        genre: entry.genres.first().cloned().unwrap_or_default(),
        release_date_raw,
        derived_year,
        track_count: entry.track_count.unwrap_or(0),
        date_added: entry.date_added.clone().unwrap_or_default(),
        content_rating: entry.content_rating.clone(),
        artwork_template_url: entry.artwork_template_url.clone().unwrap_or_default(),
        canonical_link: canonical_link_for(catalog_id),
    })
}

/// Resolve the public catalog id of a raw entry.
///
/// Attempted in order, first success wins: the album's direct catalog
/// relationship, then the catalog relationship of its first track. Within a
/// relationship the numeric identifier is preferred, falling back to the
/// last path segment of the catalog URL. Unresolvable entries get 0.
pub fn resolve_catalog_id(entry: &RawAlbumEntry) -> i64 {
    parse_catalog_ref(entry.catalog.as_ref())
        .or_else(|| parse_catalog_ref(entry.first_track_catalog.as_ref()))
        .unwrap_or(0)
}

fn parse_catalog_ref(catalog: Option<&CatalogRef>) -> Option<i64> {
    let catalog = catalog?;

    if let Some(id) = catalog.id.as_deref() {
        if let Ok(parsed) = id.parse::<i64>() {
            return Some(parsed);
        }
    }

    let url = catalog.url.as_deref()?;
    url.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse::<i64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(library_id: &str) -> RawAlbumEntry {
        RawAlbumEntry {
            library_id: library_id.to_string(),
            favorite: Some(true),
            name: Some("Album".to_string()),
            artist: Some("Artist".to_string()),
            genres: vec!["Rock".to_string(), "Pop".to_string()],
            release_date: Some("2020-06-15".to_string()),
            track_count: Some(12),
            ..RawAlbumEntry::default()
        }
    }

    #[test]
    fn test_normalize_entry_basic() {
        let record = normalize_entry(&entry("l.1"), 2024).unwrap();

        assert_eq!(record.library_id, "l.1");
        assert_eq!(record.title, "Album");
        assert_eq!(record.genre, "Rock");
        assert_eq!(record.derived_year, 2020);
        assert_eq!(record.catalog_id, 0);
        assert_eq!(record.canonical_link, "");
    }

    #[test]
    fn test_normalize_entry_requires_name_and_artist() {
        let mut nameless = entry("l.1");
        nameless.name = None;
        assert!(normalize_entry(&nameless, 2024).is_none());

        let mut blank_artist = entry("l.2");
        blank_artist.artist = Some("   ".to_string());
        assert!(normalize_entry(&blank_artist, 2024).is_none());
    }

    #[test]
    fn test_normalize_entry_fallback_year() {
        let mut undated = entry("l.1");
        undated.release_date = None;
        let record = normalize_entry(&undated, 2024).unwrap();
        assert_eq!(record.derived_year, 2024);
        assert_eq!(record.release_date_raw, "");
    }

    #[test]
    fn test_resolve_catalog_id_prefers_numeric_id() {
        let mut with_catalog = entry("l.1");
        with_catalog.catalog = Some(CatalogRef {
            id: Some("123456789".to_string()),
            url: Some("/v1/catalog/us/albums/987654321".to_string()),
        });

        assert_eq!(resolve_catalog_id(&with_catalog), 123456789);
    }

    #[test]
    fn test_resolve_catalog_id_parses_url_segment() {
        let mut with_url = entry("l.1");
        with_url.catalog = Some(CatalogRef {
            id: Some("not-numeric".to_string()),
            url: Some("https://music.apple.com/us/album/987654321".to_string()),
        });

        assert_eq!(resolve_catalog_id(&with_url), 987654321);
    }

    #[test]
    fn test_resolve_catalog_id_first_track_fallback() {
        let mut via_track = entry("l.1");
        via_track.first_track_catalog = Some(CatalogRef {
            id: None,
            url: Some("/v1/catalog/us/songs/555".to_string()),
        });

        assert_eq!(resolve_catalog_id(&via_track), 555);
    }

    #[test]
    fn test_resolve_catalog_id_unresolvable() {
        assert_eq!(resolve_catalog_id(&entry("l.1")), 0);

        let mut garbage = entry("l.2");
        garbage.catalog = Some(CatalogRef {
            id: Some("abc".to_string()),
            url: Some("https://example.org/album/abc".to_string()),
        });
        assert_eq!(resolve_catalog_id(&garbage), 0);
    }

    #[test]
    fn test_normalized_record_carries_canonical_link() {
        let mut with_catalog = entry("l.1");
        with_catalog.catalog = Some(CatalogRef {
            id: Some("123456789".to_string()),
            url: None,
        });

        let record = normalize_entry(&with_catalog, 2024).unwrap();
        assert_eq!(
            record.canonical_link,
            "https://music.apple.com/us/album/123456789"
        );
    }
}
