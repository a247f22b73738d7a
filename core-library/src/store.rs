//! Durable cache stores
//!
//! Two JSON documents persisted as whole files: the year-bucketed album
//! cache and the play-count cache. Writes serialize to a sibling temp file
//! and atomically rename over the target, so a failed write leaves the
//! previous file intact. Loads degrade: a missing file is `None`, and a file
//! that no longer decodes is logged and treated as absent rather than
//! crashing the host.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::Result;
use crate::models::AlbumRecord;

fn default_timestamp() -> DateTime<Utc> {
    DateTime::<Utc>::UNIX_EPOCH
}

/// The persisted album collection.
///
/// Invariants: every record appears in exactly one year bucket, buckets are
/// ordered ascending by case-insensitive artist, and `total_albums` equals
/// the sum of bucket sizes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumCache {
    /// Album records grouped by release year
    #[serde(default)]
    pub albums: BTreeMap<i32, Vec<AlbumRecord>>,

    /// When the cache was last successfully persisted
    #[serde(default = "default_timestamp")]
    pub last_updated: DateTime<Utc>,

    /// Total records across all year buckets
    #[serde(default)]
    pub total_albums: usize,

    /// Library ids the user excluded from exports. Absent on files written
    /// before exclusions shipped, hence the default.
    #[serde(default)]
    pub excluded_library_ids: HashSet<String>,
}

impl Default for AlbumCache {
    fn default() -> Self {
        Self {
            albums: BTreeMap::new(),
            last_updated: default_timestamp(),
            total_albums: 0,
            excluded_library_ids: HashSet::new(),
        }
    }
}

impl AlbumCache {
    /// Iterate all records across year buckets
    pub fn all_records(&self) -> impl Iterator<Item = &AlbumRecord> {
        self.albums.values().flatten()
    }

    /// Records in one year bucket, empty when the year is absent
    pub fn records_for_year(&self, year: i32) -> &[AlbumRecord] {
        self.albums.get(&year).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Check the bucket invariants
    pub fn validate(&self) -> std::result::Result<(), String> {
        let mut seen = HashSet::new();
        let mut count = 0usize;

        for (year, bucket) in &self.albums {
            for record in bucket {
                count += 1;
                if record.derived_year != *year {
                    return Err(format!(
                        "Record {} in bucket {} has derived year {}",
                        record.library_id, year, record.derived_year
                    ));
                }
                if !seen.insert(record.library_id.clone()) {
                    return Err(format!("Duplicate library id {}", record.library_id));
                }
            }
        }

        if count != self.total_albums {
            return Err(format!(
                "total_albums is {} but buckets hold {}",
                self.total_albums, count
            ));
        }

        Ok(())
    }
}

/// The persisted play-count collection.
///
/// Absence of a key means "unknown or disqualified", never zero; every
/// present value met the qualification threshold when it was last computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayCountCache {
    /// Qualified play counts keyed by library id
    #[serde(default)]
    pub play_counts_by_library_id: BTreeMap<String, u32>,

    /// When the cache was last successfully persisted
    #[serde(default = "default_timestamp")]
    pub last_updated: DateTime<Utc>,
}

impl Default for PlayCountCache {
    fn default() -> Self {
        Self {
            play_counts_by_library_id: BTreeMap::new(),
            last_updated: default_timestamp(),
        }
    }
}

impl PlayCountCache {
    /// Cached play count for a library id
    pub fn get(&self, library_id: &str) -> Option<u32> {
        self.play_counts_by_library_id.get(library_id).copied()
    }
}

/// Read a JSON document, treating missing and undecodable files as absent
async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = ?path, "Cache file not found");
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    };

    match serde_json::from_slice(&bytes) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            // A corrupted cache degrades to "empty"; the next full fetch
            // rebuilds it.
            warn!(path = ?path, error = %e, "Cache file failed to decode, treating as absent");
            Ok(None)
        }
    }
}

/// Serialize a JSON document and atomically replace the target file
async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let payload = serde_json::to_vec_pretty(value)?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);

    fs::write(&tmp, &payload).await?;
    fs::rename(&tmp, path).await?;

    debug!(path = ?path, size = payload.len(), "Persisted cache file");
    Ok(())
}

/// File store for the album cache
pub struct AlbumCacheStore {
    path: PathBuf,
}

impl AlbumCacheStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted cache, `None` when missing or undecodable
    pub async fn load(&self) -> Result<Option<AlbumCache>> {
        read_json(&self.path).await
    }

    /// Persist the cache with a whole-file atomic replace
    pub async fn save(&self, cache: &AlbumCache) -> Result<()> {
        write_json_atomic(&self.path, cache).await
    }
}

/// File store for the play-count cache
pub struct PlayCountStore {
    path: PathBuf,
}

impl PlayCountStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the persisted cache, `None` when missing or undecodable
    pub async fn load(&self) -> Result<Option<PlayCountCache>> {
        read_json(&self.path).await
    }

    /// Persist the cache with a whole-file atomic replace
    pub async fn save(&self, cache: &PlayCountCache) -> Result<()> {
        write_json_atomic(&self.path, cache).await
    }
}
