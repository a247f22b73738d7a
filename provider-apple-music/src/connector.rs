//! Apple Music API connector implementation
//!
//! Implements the `LibraryProvider` trait against the Apple Music API:
//! the user's library-albums listing (paged) and catalog album track
//! listings with play counts.

use async_trait::async_trait;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse, RetryPolicy};
use bridge_traits::library::{
    AlbumTrackListing, CatalogRef, FavoritesPage, LibraryProvider, RawAlbumEntry, RawTrackEntry,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::error::{AppleMusicError, Result};
use crate::types::{
    CatalogAlbumsResponse, CatalogTrackResource, LibraryAlbumResource, LibraryAlbumsResponse,
    RelationshipList,
};

/// Apple Music API base URL
const API_BASE: &str = "https://api.music.apple.com";

/// Library albums listing path
const LIBRARY_ALBUMS_PATH: &str = "/v1/me/library/albums";

/// Maximum results per page (API limit)
const MAX_PAGE_SIZE: u32 = 100;

/// Relationships to request on library albums
const LIBRARY_INCLUDES: &str = "catalog,tracks";

/// Apple Music API connector
///
/// Implements [`LibraryProvider`] for the Apple Music API.
///
/// # Features
///
/// - Paginated library-albums listing following server `next` cursors,
///   re-attaching the fixed query parameters the cursor omits
/// - Catalog album track listings including per-track play counts
/// - Exponential backoff for rate limiting via the `HttpClient` retry policy
/// - Developer-token + media-user-token authentication
///
/// # Example
///
/// ```ignore
/// use provider_apple_music::AppleMusicConnector;
/// use bridge_traits::library::LibraryProvider;
///
/// let connector = AppleMusicConnector::new(http_client, developer_token, media_user_token);
/// let page = connector.list_favorites(None).await?;
/// ```
pub struct AppleMusicConnector {
    /// HTTP client for API requests
    http_client: Arc<dyn HttpClient>,

    /// Developer bearer token
    developer_token: String,

    /// Media user token identifying the library owner
    media_user_token: String,

    /// Catalog storefront (country segment of catalog URLs)
    storefront: String,

    /// API base URL, overridable for tests
    base_url: String,
}

impl AppleMusicConnector {
    /// Create a new connector for the `us` storefront
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        developer_token: impl Into<String>,
        media_user_token: impl Into<String>,
    ) -> Self {
        Self {
            http_client,
            developer_token: developer_token.into(),
            media_user_token: media_user_token.into(),
            storefront: "us".to_string(),
            base_url: API_BASE.to_string(),
        }
    }

    /// Override the catalog storefront
    pub fn with_storefront(mut self, storefront: impl Into<String>) -> Self {
        self.storefront = storefront.into();
        self
    }

    /// Override the API base URL
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fixed query parameters attached to every listing page
    fn listing_query() -> String {
        format!(
            "limit={}&include={}",
            MAX_PAGE_SIZE,
            urlencoding::encode(LIBRARY_INCLUDES)
        )
    }

    /// Execute an authenticated GET and fail on non-2xx statuses
    async fn execute(&self, url: String) -> Result<HttpResponse> {
        let request = HttpRequest::get(&url)
            .bearer_token(&self.developer_token)
            .header("Music-User-Token", &self.media_user_token)
            .header("Accept", "application/json")
            .timeout(Duration::from_secs(30));

        let response = self
            .http_client
            .execute_with_retry(request, RetryPolicy::default())
            .await?;

        if response.is_success() {
            debug!(url = %url, status = response.status, "API request succeeded");
            Ok(response)
        } else {
            Err(AppleMusicError::ApiError {
                status_code: response.status,
                message: response.text().unwrap_or_default(),
            })
        }
    }

    /// Convert a library album resource into the boundary entry type
    fn convert_album(resource: LibraryAlbumResource) -> RawAlbumEntry {
        let attributes = resource.attributes.unwrap_or_default();
        let relationships = resource.relationships.unwrap_or_default();

        let catalog = relationships
            .catalog
            .as_ref()
            .and_then(Self::convert_catalog_ref);
        let first_track_catalog = relationships
            .tracks
            .as_ref()
            .and_then(|tracks| tracks.data.first())
            .and_then(|track| track.relationships.as_ref())
            .and_then(|rels| rels.catalog.as_ref())
            .and_then(Self::convert_catalog_ref);

        RawAlbumEntry {
            library_id: resource.id,
            favorite: attributes.favorite,
            name: attributes.name,
            artist: attributes.artist_name,
            genres: attributes.genre_names,
            release_date: attributes.release_date,
            track_count: attributes.track_count,
            date_added: attributes.date_added,
            content_rating: attributes.content_rating,
            artwork_template_url: attributes.artwork.and_then(|artwork| artwork.url),
            catalog,
            first_track_catalog,
        }
    }

    /// First entry of a catalog relationship, as a `CatalogRef`
    fn convert_catalog_ref(list: &RelationshipList) -> Option<CatalogRef> {
        list.data.first().map(|related| CatalogRef {
            id: related.id.clone(),
            url: related.href.clone(),
        })
    }

    /// Convert a catalog track resource, keeping non-song kinds explicit
    fn convert_track(resource: CatalogTrackResource) -> RawTrackEntry {
        match resource.kind.as_str() {
            "songs" | "library-songs" => RawTrackEntry::Song {
                play_count: resource.attributes.and_then(|attrs| attrs.play_count),
            },
            _ => RawTrackEntry::Unsupported {
                kind: resource.kind,
            },
        }
    }
}

#[async_trait]
impl LibraryProvider for AppleMusicConnector {
    #[instrument(skip(self))]
    async fn list_favorites(
        &self,
        cursor: Option<String>,
    ) -> bridge_traits::error::Result<FavoritesPage> {
        let url = match cursor {
            None => format!(
                "{}{}?{}",
                self.base_url,
                LIBRARY_ALBUMS_PATH,
                Self::listing_query()
            ),
            Some(next) => {
                // Server cursors omit the fixed query parameters; re-attach
                // them or follow-up pages come back without relationships.
                let separator = if next.contains('?') { '&' } else { '?' };
                format!(
                    "{}{}{}{}",
                    self.base_url,
                    next,
                    separator,
                    Self::listing_query()
                )
            }
        };

        let response = self.execute(url).await?;

        let page: LibraryAlbumsResponse = serde_json::from_slice(&response.body).map_err(|e| {
            AppleMusicError::ParseError(format!("Failed to parse library albums page: {}", e))
        })?;

        let total_announced = page.meta.and_then(|meta| meta.total);
        let entries: Vec<RawAlbumEntry> =
            page.data.into_iter().map(Self::convert_album).collect();

        info!(
            count = entries.len(),
            has_next = page.next.is_some(),
            "Listed library albums page"
        );

        Ok(FavoritesPage {
            entries,
            next_cursor: page.next,
            total_announced,
        })
    }

    #[instrument(skip(self), fields(catalog_id = catalog_id))]
    async fn list_tracks_for_album(
        &self,
        catalog_id: i64,
    ) -> bridge_traits::error::Result<AlbumTrackListing> {
        let url = format!(
            "{}/v1/catalog/{}/albums/{}?include=tracks",
            self.base_url, self.storefront, catalog_id
        );

        let response = self.execute(url).await?;

        let decoded: CatalogAlbumsResponse = serde_json::from_slice(&response.body).map_err(|e| {
            AppleMusicError::ParseError(format!("Failed to parse catalog album: {}", e))
        })?;

        let album = decoded
            .data
            .into_iter()
            .next()
            .ok_or(AppleMusicError::AlbumNotFound { catalog_id })?;

        let attributes = album.attributes.unwrap_or_default();
        let tracks: Vec<RawTrackEntry> = album
            .relationships
            .and_then(|rels| rels.tracks)
            .map(|list| list.data)
            .unwrap_or_default()
            .into_iter()
            .map(Self::convert_track)
            .collect();

        Ok(AlbumTrackListing {
            artist: attributes.artist_name.unwrap_or_default(),
            title: attributes.name.unwrap_or_default(),
            tracks,
        })
    }
}
