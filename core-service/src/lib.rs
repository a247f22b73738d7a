//! # Core service façade
//!
//! Wires the provider connector, cache stores, sync engine, aggregator, and
//! exporter into one owner. All cache-mutating operations flow through a
//! [`MirrorService`] instance, so a host gets the concurrency guarantees of
//! the engine (single-flight refresh, all-or-nothing commits) without
//! assembling the pieces itself.
//!
//! ```ignore
//! use core_runtime::CoreConfig;
//! use core_service::MirrorService;
//!
//! let config = CoreConfig::builder()
//!     .data_dir(data_dir)
//!     .developer_token(dev_token)
//!     .media_user_token(user_token)
//!     .build()?;
//!
//! let service = MirrorService::new(config);
//! service.start().await?;
//! service.sync(true).await?;
//! service.enrich().await?;
//! let payload = service.export(ExportFormat::Json, Some(2024)).await?;
//! ```

pub mod error;

pub use error::{CoreError, Result};

use bridge_traits::library::LibraryProvider;
use bridge_traits::time::{Clock, SystemClock};
use core_export::ExportFormat;
use core_library::models::AlbumRecord;
use core_library::store::{AlbumCache, AlbumCacheStore, PlayCountStore};
use core_library::ExclusionManager;
use core_playstats::{EnrichStats, PlayCountAggregator};
use core_runtime::events::{CoreEvent, EventBus};
use core_runtime::CoreConfig;
use core_sync::SyncEngine;
use provider_apple_music::AppleMusicConnector;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Primary façade exposed to host applications.
pub struct MirrorService {
    config: CoreConfig,
    event_bus: EventBus,
    engine: Arc<SyncEngine>,
    aggregator: PlayCountAggregator,
    exclusions: Arc<ExclusionManager>,
    play_counts: Arc<PlayCountStore>,
}

impl MirrorService {
    /// Create a service backed by the Apple Music connector.
    pub fn new(config: CoreConfig) -> Self {
        let provider: Arc<dyn LibraryProvider> = Arc::new(
            AppleMusicConnector::new(
                config.http_client.clone(),
                config.developer_token.clone(),
                config.media_user_token.clone(),
            )
            .with_storefront(config.storefront.clone()),
        );

        Self::with_provider(config, provider)
    }

    /// Create a service with an explicit provider (tests, other services).
    pub fn with_provider(config: CoreConfig, provider: Arc<dyn LibraryProvider>) -> Self {
        let event_bus = EventBus::default();
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let album_store = Arc::new(AlbumCacheStore::new(config.album_cache_path()));
        let play_counts = Arc::new(PlayCountStore::new(config.play_count_cache_path()));
        let exclusions = Arc::new(ExclusionManager::new(album_store.clone()));

        let engine = Arc::new(SyncEngine::new(
            provider.clone(),
            album_store,
            exclusions.clone(),
            event_bus.clone(),
            clock.clone(),
        ));

        let aggregator =
            PlayCountAggregator::new(provider, play_counts.clone(), event_bus.clone(), clock);

        Self {
            config,
            event_bus,
            engine,
            aggregator,
            exclusions,
            play_counts,
        }
    }

    /// Hydrate in-memory state from the persisted caches.
    pub async fn start(&self) -> Result<AlbumCache> {
        Ok(self.engine.hydrate().await?)
    }

    /// Subscribe to progress and completion events.
    pub fn subscribe(&self) -> broadcast::Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    /// Refresh the mirrored collection from the remote library.
    pub async fn sync(&self, incremental: bool) -> Result<AlbumCache> {
        Ok(self.engine.fetch_favorites(incremental).await?)
    }

    /// Enrich the current collection with play counts.
    pub async fn enrich(&self) -> Result<EnrichStats> {
        let albums: Vec<AlbumRecord> = self.engine.cached().await.all_records().cloned().collect();
        let (stats, _) = self.aggregator.run(&albums).await?;
        Ok(stats)
    }

    /// Export the collection (optionally one year bucket) in the given format.
    pub async fn export(&self, format: ExportFormat, year: Option<i32>) -> Result<String> {
        let cache = self.engine.cached().await;
        let play_counts = self.play_counts.load().await?.unwrap_or_default();
        let excluded = self.exclusions.snapshot().await;

        let albums: Vec<AlbumRecord> = match year {
            Some(year) => cache.records_for_year(year).to_vec(),
            None => cache.all_records().cloned().collect(),
        };

        Ok(core_export::export(
            &albums,
            format,
            |library_id| excluded.contains(library_id),
            |library_id| play_counts.get(library_id),
            self.config.artwork_rendition_size,
        )?)
    }

    /// Snapshot of the current in-memory collection.
    pub async fn albums(&self) -> AlbumCache {
        self.engine.cached().await
    }

    /// The user-driven exclusion set.
    pub fn exclusions(&self) -> Arc<ExclusionManager> {
        self.exclusions.clone()
    }
}
