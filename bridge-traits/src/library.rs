//! Remote Library Abstraction
//!
//! Defines the contract between the sync/enrichment engine and a remote
//! music library service: a paged listing of the user's library albums and a
//! per-album catalog track listing. Connectors (e.g. `provider-apple-music`)
//! implement [`LibraryProvider`] and translate their wire formats into the
//! boundary types defined here.

use async_trait::async_trait;

use crate::error::Result;

/// Reference to a public catalog entity, as the server exposes it.
///
/// Servers are inconsistent about how the catalog cross-reference appears:
/// some entries carry a numeric identifier, some only a catalog URL whose
/// last path segment encodes the id, some neither. Both fields are optional
/// and consumers decide precedence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CatalogRef {
    /// Catalog identifier, if the server provided one directly
    pub id: Option<String>,
    /// Catalog URL, if the server provided one
    pub url: Option<String>,
}

/// One raw album entry from the remote library listing.
///
/// Every descriptive field may be absent on any entry; normalization into a
/// durable record happens in the sync engine, which skips entries that lack
/// a resolvable name or artist.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawAlbumEntry {
    /// Stable per-library identifier
    pub library_id: String,
    /// Whether the user has favorited this album
    pub favorite: Option<bool>,
    /// Album title
    pub name: Option<String>,
    /// Album artist
    pub artist: Option<String>,
    /// Genre names, most significant first
    pub genres: Vec<String>,
    /// Release date, `yyyy-MM-dd` or a partial prefix
    pub release_date: Option<String>,
    /// Number of tracks
    pub track_count: Option<u32>,
    /// When the album was added to the library
    pub date_added: Option<String>,
    /// Content rating (e.g. "explicit"), if any
    pub content_rating: Option<String>,
    /// Artwork URL template containing `{w}`/`{h}` placeholder tokens
    pub artwork_template_url: Option<String>,
    /// Catalog relationship on the album itself
    pub catalog: Option<CatalogRef>,
    /// Catalog relationship of the album's first track
    pub first_track_catalog: Option<CatalogRef>,
}

/// One page of the favorites listing.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FavoritesPage {
    /// Raw entries on this page
    pub entries: Vec<RawAlbumEntry>,
    /// Opaque cursor for the next page, `None` when exhausted
    pub next_cursor: Option<String>,
    /// Total result count, announced by the server (typically only reliable
    /// on the first page)
    pub total_announced: Option<u64>,
}

/// One entry of a per-album track listing.
///
/// The catalog can interleave non-song items (music videos, extras) among an
/// album's tracks. Those carry no play count and are modelled explicitly
/// rather than coerced into a zero-count song.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawTrackEntry {
    /// A playable song with an optional play count
    Song { play_count: Option<u32> },
    /// Any other item kind; contributes no play count
    Unsupported { kind: String },
}

impl RawTrackEntry {
    /// Play count of this entry, `None` for unsupported kinds or when the
    /// server omitted the field.
    pub fn play_count(&self) -> Option<u32> {
        match self {
            RawTrackEntry::Song { play_count } => *play_count,
            RawTrackEntry::Unsupported { .. } => None,
        }
    }
}

/// A per-album track listing from the catalog source.
///
/// The listing reports its own artist and album title; because the catalog
/// and the library are queried independently, consumers join the two by a
/// case-insensitive (artist, title) key rather than by identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlbumTrackListing {
    /// Artist name as the catalog reports it
    pub artist: String,
    /// Album title as the catalog reports it
    pub title: String,
    /// Track entries in album order
    pub tracks: Vec<RawTrackEntry>,
}

/// Remote music library provider trait
///
/// # Example
///
/// ```ignore
/// use bridge_traits::library::LibraryProvider;
///
/// async fn page_through(provider: &dyn LibraryProvider) -> Result<usize> {
///     let mut total = 0;
///     let mut cursor = None;
///     loop {
///         let page = provider.list_favorites(cursor).await?;
///         total += page.entries.len();
///         cursor = page.next_cursor;
///         if cursor.is_none() {
///             break;
///         }
///     }
///     Ok(total)
/// }
/// ```
#[async_trait]
pub trait LibraryProvider: Send + Sync {
    /// List one page of the user's library albums.
    ///
    /// `cursor` is `None` for the first page; subsequent pages pass the
    /// cursor returned by the previous call.
    async fn list_favorites(&self, cursor: Option<String>) -> Result<FavoritesPage>;

    /// Fetch the catalog track listing for one album.
    async fn list_tracks_for_album(&self, catalog_id: i64) -> Result<AlbumTrackListing>;
}
