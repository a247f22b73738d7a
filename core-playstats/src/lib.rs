//! # Play Statistics Module
//!
//! Enriches mirrored albums with a robust per-album play count derived from
//! per-track listening statistics.

pub mod aggregator;
pub mod error;

pub use aggregator::{
    album_statistic, apply_listing, enrich, AlbumKey, CacheDecision, EnrichStats,
    PlayCountAggregator,
};
pub use error::{PlayStatsError, Result};
