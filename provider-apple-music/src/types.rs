//! Apple Music API response types
//!
//! Data structures for deserializing the library and catalog endpoints this
//! connector consumes. Every field the server may omit carries a default so
//! sparse payloads decode cleanly.

use serde::Deserialize;

/// `GET /v1/me/library/albums` response page
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryAlbumsResponse {
    /// Album resources on this page
    #[serde(default)]
    pub data: Vec<LibraryAlbumResource>,

    /// Path of the next page, absent on the last page. The server strips
    /// custom query parameters from this path.
    #[serde(default)]
    pub next: Option<String>,

    /// Page metadata
    #[serde(default)]
    pub meta: Option<PageMeta>,
}

/// Listing page metadata
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    /// Total result count across all pages
    #[serde(default)]
    pub total: Option<u64>,
}

/// One library album resource
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryAlbumResource {
    /// Library identifier (e.g. `l.abc123`)
    pub id: String,

    /// Descriptive attributes
    #[serde(default)]
    pub attributes: Option<LibraryAlbumAttributes>,

    /// Relationships to catalog entities and library tracks
    #[serde(default)]
    pub relationships: Option<LibraryAlbumRelationships>,
}

/// Library album attributes
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryAlbumAttributes {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub artist_name: Option<String>,

    #[serde(default)]
    pub genre_names: Vec<String>,

    /// `yyyy-MM-dd`, or a partial prefix on older content
    #[serde(default)]
    pub release_date: Option<String>,

    #[serde(default)]
    pub track_count: Option<u32>,

    /// RFC 3339 timestamp of when the album entered the library
    #[serde(default)]
    pub date_added: Option<String>,

    /// Content rating (e.g. `explicit`)
    #[serde(default)]
    pub content_rating: Option<String>,

    #[serde(default)]
    pub artwork: Option<ArtworkResource>,

    /// Whether the user has favorited the album
    #[serde(default)]
    pub favorite: Option<bool>,
}

/// Artwork descriptor with a templated URL
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtworkResource {
    /// URL template containing `{w}`/`{h}` placeholder tokens
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub width: Option<u32>,

    #[serde(default)]
    pub height: Option<u32>,
}

/// Relationships block of a library album
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryAlbumRelationships {
    /// Catalog counterpart of the album, when resolved server-side
    #[serde(default)]
    pub catalog: Option<RelationshipList>,

    /// Library tracks of the album
    #[serde(default)]
    pub tracks: Option<LibraryTrackList>,
}

/// Generic to-catalog relationship list
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipList {
    #[serde(default)]
    pub data: Vec<RelatedResource>,
}

/// One related catalog resource
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedResource {
    /// Catalog identifier
    #[serde(default)]
    pub id: Option<String>,

    /// Catalog URL; its last path segment encodes the identifier
    #[serde(default)]
    pub href: Option<String>,
}

/// Library track relationship list
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryTrackList {
    #[serde(default)]
    pub data: Vec<LibraryTrackResource>,
}

/// One library track resource (only its catalog link is consumed here)
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryTrackResource {
    #[serde(default)]
    pub relationships: Option<LibraryTrackRelationships>,
}

/// Relationships block of a library track
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LibraryTrackRelationships {
    #[serde(default)]
    pub catalog: Option<RelationshipList>,
}

/// `GET /v1/catalog/{storefront}/albums/{id}` response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAlbumsResponse {
    #[serde(default)]
    pub data: Vec<CatalogAlbumResource>,
}

/// One catalog album resource
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAlbumResource {
    pub id: String,

    #[serde(default)]
    pub attributes: Option<CatalogAlbumAttributes>,

    #[serde(default)]
    pub relationships: Option<CatalogAlbumRelationships>,
}

/// Catalog album attributes
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAlbumAttributes {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub artist_name: Option<String>,
}

/// Relationships block of a catalog album
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAlbumRelationships {
    #[serde(default)]
    pub tracks: Option<CatalogTrackList>,
}

/// Catalog track relationship list
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTrackList {
    #[serde(default)]
    pub data: Vec<CatalogTrackResource>,
}

/// One item of a catalog album's track relationship.
///
/// The catalog interleaves non-song kinds (e.g. `music-videos`) among an
/// album's tracks, so the resource `type` is significant.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTrackResource {
    #[serde(rename = "type", default)]
    pub kind: String,

    #[serde(default)]
    pub attributes: Option<CatalogTrackAttributes>,
}

/// Catalog track attributes
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogTrackAttributes {
    /// Listener play count for this track
    #[serde(default)]
    pub play_count: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_library_album() {
        let json = r#"{
            "id": "l.abc123",
            "type": "library-albums",
            "attributes": {
                "name": "Test Album",
                "artistName": "Test Artist",
                "genreNames": ["Rock", "Alternative"],
                "releaseDate": "2020-01-31",
                "trackCount": 10,
                "dateAdded": "2021-05-01T12:00:00Z",
                "artwork": { "url": "https://example.org/{w}x{h}bb.jpg", "width": 3000, "height": 3000 },
                "favorite": true
            },
            "relationships": {
                "catalog": {
                    "data": [
                        { "id": "123456789", "type": "albums", "href": "/v1/catalog/us/albums/123456789" }
                    ]
                }
            }
        }"#;

        let resource: LibraryAlbumResource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.id, "l.abc123");

        let attrs = resource.attributes.unwrap();
        assert_eq!(attrs.name.as_deref(), Some("Test Album"));
        assert_eq!(attrs.genre_names, vec!["Rock", "Alternative"]);
        assert_eq!(attrs.favorite, Some(true));
        assert_eq!(attrs.content_rating, None);

        let catalog = resource.relationships.unwrap().catalog.unwrap();
        assert_eq!(catalog.data[0].id.as_deref(), Some("123456789"));
    }

    #[test]
    fn test_deserialize_sparse_album() {
        // Older library entries can come back with nothing but an id
        let json = r#"{ "id": "l.bare" }"#;

        let resource: LibraryAlbumResource = serde_json::from_str(json).unwrap();
        assert_eq!(resource.id, "l.bare");
        assert!(resource.attributes.is_none());
        assert!(resource.relationships.is_none());
    }

    #[test]
    fn test_deserialize_albums_page() {
        let json = r#"{
            "data": [{ "id": "l.1" }, { "id": "l.2" }],
            "next": "/v1/me/library/albums?offset=100",
            "meta": { "total": 231 }
        }"#;

        let page: LibraryAlbumsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(page.data.len(), 2);
        assert_eq!(page.next.as_deref(), Some("/v1/me/library/albums?offset=100"));
        assert_eq!(page.meta.unwrap().total, Some(231));
    }

    #[test]
    fn test_deserialize_catalog_tracks() {
        let json = r#"{
            "data": [{
                "id": "123456789",
                "attributes": { "name": "Test Album", "artistName": "Test Artist" },
                "relationships": {
                    "tracks": {
                        "data": [
                            { "type": "songs", "attributes": { "playCount": 12 } },
                            { "type": "music-videos" }
                        ]
                    }
                }
            }]
        }"#;

        let response: CatalogAlbumsResponse = serde_json::from_str(json).unwrap();
        let album = &response.data[0];
        let tracks = &album.relationships.as_ref().unwrap().tracks.as_ref().unwrap().data;
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[0].kind, "songs");
        assert_eq!(tracks[0].attributes.as_ref().unwrap().play_count, Some(12));
        assert_eq!(tracks[1].kind, "music-videos");
        assert!(tracks[1].attributes.is_none());
    }
}
