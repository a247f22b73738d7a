//! Domain models for the album mirror
//!
//! The durable representation of one favorited album, plus the small
//! derivation helpers (release year, canonical catalog link, artwork
//! rendition) the engine and exporters share.

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Base URL for canonical catalog album links
pub const CATALOG_ALBUM_URL_BASE: &str = "https://music.apple.com/us/album/";

/// One favorited album, as persisted in the album cache.
///
/// `library_id` is the stable per-library key and primary key for exclusion
/// and play-count lookups. `catalog_id` is the public catalog
/// cross-reference, 0 when unresolved; a record with `catalog_id == 0` has
/// an empty `canonical_link`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlbumRecord {
    /// Stable per-library identifier
    pub library_id: String,

    /// Public catalog identifier, 0 if unresolved
    #[serde(default)]
    pub catalog_id: i64,

    /// Album title
    pub title: String,

    /// Album artist
    pub artist: String,

    /// First genre name, empty when the source announced none
    #[serde(default)]
    pub genre: String,

    /// Release date as the source sent it, `yyyy-MM-dd` or a partial prefix
    #[serde(default)]
    pub release_date_raw: String,

    /// Year parsed from `release_date_raw`, falling back to the calendar
    /// year the record was created
    pub derived_year: i32,

    /// Number of tracks
    #[serde(default)]
    pub track_count: u32,

    /// When the album was added to the library
    #[serde(default)]
    pub date_added: String,

    /// Content rating (e.g. "explicit"), if any
    #[serde(default)]
    pub content_rating: Option<String>,

    /// Artwork URL template containing `{w}`/`{h}` placeholder tokens
    #[serde(default)]
    pub artwork_template_url: String,

    /// Canonical catalog URL, empty when `catalog_id` is unresolved
    #[serde(default)]
    pub canonical_link: String,
}

impl AlbumRecord {
    /// Validate record invariants
    pub fn validate(&self) -> Result<(), String> {
        if self.library_id.trim().is_empty() {
            return Err("Library id cannot be empty".to_string());
        }

        if self.title.trim().is_empty() {
            return Err("Album title cannot be empty".to_string());
        }

        if self.artist.trim().is_empty() {
            return Err("Album artist cannot be empty".to_string());
        }

        if self.catalog_id == 0 && !self.canonical_link.is_empty() {
            return Err("Unresolved catalog id cannot carry a canonical link".to_string());
        }

        if let Ok(date) = NaiveDate::parse_from_str(&self.release_date_raw, "%Y-%m-%d") {
            if date.year() != self.derived_year {
                return Err(format!(
                    "Derived year {} disagrees with release date {}",
                    self.derived_year, self.release_date_raw
                ));
            }
        }

        Ok(())
    }

    /// Artist name lowered for case-insensitive ordering
    pub fn sort_artist(&self) -> String {
        self.artist.to_lowercase()
    }

    /// Render the artwork template at a square pixel size.
    ///
    /// Returns an empty string when the record has no artwork template.
    pub fn artwork_url_at(&self, size: u32) -> String {
        if self.artwork_template_url.is_empty() {
            return String::new();
        }
        let size = size.to_string();
        self.artwork_template_url
            .replace("{w}", &size)
            .replace("{h}", &size)
    }
}

/// Canonical catalog link for a resolved catalog id, empty for 0.
pub fn canonical_link_for(catalog_id: i64) -> String {
    if catalog_id == 0 {
        String::new()
    } else {
        format!("{}{}", CATALOG_ALBUM_URL_BASE, catalog_id)
    }
}

/// Derive a release year from the raw source date.
///
/// Tries full `yyyy-MM-dd` first, then the first four characters as an
/// integer year, then the supplied fallback (the current calendar year at
/// normalization time).
pub fn derive_release_year(raw: &str, fallback_year: i32) -> i32 {
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.year();
    }

    if let Some(prefix) = raw.get(..4) {
        if let Ok(year) = prefix.parse::<i32>() {
            return year;
        }
    }

    fallback_year
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> AlbumRecord {
        AlbumRecord {
            library_id: "l.abc".to_string(),
            catalog_id: 123456789,
            title: "Test Album".to_string(),
            artist: "Test Artist".to_string(),
            genre: "Rock".to_string(),
            release_date_raw: "2020-01-31".to_string(),
            derived_year: 2020,
            track_count: 10,
            date_added: "2021-05-01T12:00:00Z".to_string(),
            content_rating: None,
            artwork_template_url: "https://example.org/{w}x{h}bb.jpg".to_string(),
            canonical_link: canonical_link_for(123456789),
        }
    }

    #[test]
    fn test_canonical_link() {
        assert_eq!(
            canonical_link_for(123456789),
            "https://music.apple.com/us/album/123456789"
        );
        assert_eq!(canonical_link_for(0), "");
    }

    #[test]
    fn test_derive_release_year() {
        assert_eq!(derive_release_year("2025-10-03", 2000), 2025);
        assert_eq!(derive_release_year("1999", 2000), 1999);
        assert_eq!(derive_release_year("", 2000), 2000);
        assert_eq!(derive_release_year("unknown", 2000), 2000);
        assert_eq!(derive_release_year("1987-13-99", 2000), 1987);
    }

    #[test]
    fn test_validate() {
        let mut album = record();
        assert!(album.validate().is_ok());

        // Empty library id
        album.library_id = "".to_string();
        assert!(album.validate().is_err());

        // Canonical link without a catalog id
        let mut album = record();
        album.catalog_id = 0;
        assert!(album.validate().is_err());
        album.canonical_link = String::new();
        assert!(album.validate().is_ok());

        // Year disagreeing with a well-formed date
        let mut album = record();
        album.derived_year = 1999;
        assert!(album.validate().is_err());
    }

    #[test]
    fn test_artwork_url_at() {
        let album = record();
        assert_eq!(album.artwork_url_at(600), "https://example.org/600x600bb.jpg");

        let mut bare = record();
        bare.artwork_template_url = String::new();
        assert_eq!(bare.artwork_url_at(600), "");
    }

    #[test]
    fn test_sort_artist() {
        let mut album = record();
        album.artist = "The Beatles".to_string();
        assert_eq!(album.sort_artist(), "the beatles");
    }

    #[test]
    fn test_serde_round_trip() {
        let album = record();
        let json = serde_json::to_string(&album).unwrap();
        assert!(json.contains("\"libraryId\":\"l.abc\""));

        let back: AlbumRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, album);
    }
}
