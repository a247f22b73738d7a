//! # Play-Count Aggregator
//!
//! Computes one representative play count per album from noisy per-track
//! data and keeps the play-count cache consistent with it.
//!
//! ## Statistic
//!
//! The representative value is the 75th percentile of the album's *played*
//! tracks (count > 0). A median or mean is distorted by skipped
//! intro/interlude tracks with zero plays, or by one obsessively replayed
//! single; the upper quartile of played tracks approximates "how many times
//! did the listener get through most of this album" while resisting both
//! kinds of skew.
//!
//! ## Qualification
//!
//! The statistic is trusted only when at least half the album's tracks have
//! nonzero plays and the statistic itself is positive. Disqualified albums
//! lose their cached value; they are never cached as zero.
//!
//! ## Matching
//!
//! Albums are joined to catalog track listings by a case-insensitive
//! (artist, title) key, not by identifier, because the library and the
//! catalog are queried independently. Same-key albums by the same artist are
//! not disambiguated; the last listing fetched for a key wins. This is a
//! known limitation of the heuristic join.

use bridge_traits::library::{LibraryProvider, RawTrackEntry};
use bridge_traits::time::Clock;
use core_library::models::AlbumRecord;
use core_library::store::{PlayCountCache, PlayCountStore};
use core_runtime::events::{CoreEvent, EnrichEvent, EventBus};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::Result;

/// Case-insensitive (artist, title) join key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AlbumKey {
    artist: String,
    title: String,
}

impl AlbumKey {
    pub fn new(artist: &str, title: &str) -> Self {
        Self {
            artist: artist.to_lowercase(),
            title: title.to_lowercase(),
        }
    }
}

/// What one album's listing did to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheDecision {
    /// Qualified statistic differed from the cached value and replaced it
    Updated(u32),
    /// Qualified statistic equalled the cached value, or a disqualified
    /// album had nothing cached
    Unchanged,
    /// Disqualified while a value was cached; the entry was removed
    Removed,
}

/// Tallies for one enrichment pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnrichStats {
    pub updated: usize,
    pub removed: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

/// 75th-percentile statistic over an album's raw per-track play counts.
///
/// Zero-count tracks are filtered out first; with no played tracks the
/// statistic is 0, with exactly one it is that track's count.
pub fn album_statistic(play_counts: &[u32]) -> u32 {
    let mut played: Vec<u32> = play_counts.iter().copied().filter(|&c| c > 0).collect();

    match played.len() {
        0 => 0,
        1 => played[0],
        n => {
            played.sort_unstable();
            played[(n - 1) * 3 / 4]
        }
    }
}

/// Apply one album's track listing to the cache, change-driven.
pub fn apply_listing(
    cache: &mut PlayCountCache,
    library_id: &str,
    tracks: &[RawTrackEntry],
) -> CacheDecision {
    // Unsupported entries contribute a zero count but still dilute the
    // played fraction.
    let counts: Vec<u32> = tracks
        .iter()
        .map(|track| track.play_count().unwrap_or(0))
        .collect();
    let played = counts.iter().filter(|&&c| c > 0).count();
    let statistic = album_statistic(&counts);

    let qualified = !counts.is_empty() && played * 2 >= counts.len() && statistic > 0;
    let existing = cache.play_counts_by_library_id.get(library_id).copied();

    if qualified {
        if existing == Some(statistic) {
            CacheDecision::Unchanged
        } else {
            cache
                .play_counts_by_library_id
                .insert(library_id.to_string(), statistic);
            CacheDecision::Updated(statistic)
        }
    } else if existing.is_some() {
        cache.play_counts_by_library_id.remove(library_id);
        CacheDecision::Removed
    } else {
        CacheDecision::Unchanged
    }
}

/// Join albums to fetched listings and apply each to the cache.
///
/// Albums with no listing under their key are skipped silently.
pub fn enrich(
    albums: &[AlbumRecord],
    listings_by_key: &HashMap<AlbumKey, Vec<RawTrackEntry>>,
    cache: &mut PlayCountCache,
) -> EnrichStats {
    let mut stats = EnrichStats::default();

    for album in albums {
        let key = AlbumKey::new(&album.artist, &album.title);
        let Some(tracks) = listings_by_key.get(&key) else {
            stats.skipped += 1;
            continue;
        };

        match apply_listing(cache, &album.library_id, tracks) {
            CacheDecision::Updated(statistic) => {
                debug!(
                    library_id = %album.library_id,
                    statistic = statistic,
                    "Updated cached play count"
                );
                stats.updated += 1;
            }
            CacheDecision::Removed => {
                debug!(library_id = %album.library_id, "Retracted cached play count");
                stats.removed += 1;
            }
            CacheDecision::Unchanged => stats.unchanged += 1,
        }
    }

    stats
}

/// Aggregator driving best-effort enrichment passes
///
/// Track listings are fetched sequentially per album to bound remote load;
/// a fetch or decoding failure skips only that album and leaves its prior
/// cached value untouched. The cache is persisted once after the whole pass,
/// and only when it actually changed, so re-running against identical data
/// is a byte-for-byte no-op.
pub struct PlayCountAggregator {
    provider: Arc<dyn LibraryProvider>,
    store: Arc<PlayCountStore>,
    event_bus: EventBus,
    clock: Arc<dyn Clock>,
}

impl PlayCountAggregator {
    pub fn new(
        provider: Arc<dyn LibraryProvider>,
        store: Arc<PlayCountStore>,
        event_bus: EventBus,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            store,
            event_bus,
            clock,
        }
    }

    /// Run one enrichment pass over the given albums
    #[instrument(skip(self, albums), fields(albums = albums.len()))]
    pub async fn run(&self, albums: &[AlbumRecord]) -> Result<(EnrichStats, PlayCountCache)> {
        self.event_bus
            .emit(CoreEvent::Enrich(EnrichEvent::Started {
                albums: albums.len(),
            }))
            .ok();

        let mut cache = self.store.load().await?.unwrap_or_default();
        let counts_before = cache.play_counts_by_library_id.clone();

        let mut listings_by_key: HashMap<AlbumKey, Vec<RawTrackEntry>> = HashMap::new();
        for album in albums {
            if album.catalog_id == 0 {
                self.emit_skip(&album.library_id, "unresolved catalog id");
                continue;
            }

            match self.provider.list_tracks_for_album(album.catalog_id).await {
                Ok(listing) => {
                    listings_by_key.insert(
                        AlbumKey::new(&listing.artist, &listing.title),
                        listing.tracks,
                    );
                }
                Err(e) => {
                    // Best-effort: this album keeps its prior cached value.
                    warn!(
                        library_id = %album.library_id,
                        catalog_id = album.catalog_id,
                        error = %e,
                        "Track listing fetch failed, skipping album"
                    );
                    self.emit_skip(&album.library_id, &e.to_string());
                }
            }
        }

        let stats = enrich(albums, &listings_by_key, &mut cache);

        if cache.play_counts_by_library_id != counts_before {
            cache.last_updated = self.clock.now();
            self.store.save(&cache).await?;
        }

        info!(
            updated = stats.updated,
            removed = stats.removed,
            unchanged = stats.unchanged,
            skipped = stats.skipped,
            "Enrichment pass completed"
        );
        self.event_bus
            .emit(CoreEvent::Enrich(EnrichEvent::Completed {
                updated: stats.updated,
                removed: stats.removed,
                unchanged: stats.unchanged,
            }))
            .ok();

        Ok((stats, cache))
    }

    fn emit_skip(&self, library_id: &str, reason: &str) {
        self.event_bus
            .emit(CoreEvent::Enrich(EnrichEvent::AlbumSkipped {
                library_id: library_id.to_string(),
                reason: reason.to_string(),
            }))
            .ok();
    }
}
