//! # Export Formatter
//!
//! Pure transformation from a filtered album list (plus an exclusion
//! predicate and a play-count lookup) into one of three textual payloads.
//! Nothing here touches the caches.

use core_library::models::AlbumRecord;
use serde::Serialize;

use crate::error::{ExportError, Result};

/// Output payload formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Json,
    Text,
    Markdown,
}

/// JSON document shape for one exported album.
///
/// Field order is the lexicographic key order of the serialized names;
/// serde emits struct fields in declaration order, so keep this sorted.
#[derive(Debug, Serialize)]
struct ExportedAlbum<'a> {
    artist: &'a str,
    #[serde(rename = "artworkUrl")]
    artwork_url: String,
    #[serde(rename = "contentRating")]
    content_rating: Option<&'a str>,
    #[serde(rename = "dateAdded")]
    date_added: &'a str,
    genre: &'a str,
    id: Option<i64>,
    name: &'a str,
    #[serde(rename = "playCount")]
    play_count: Option<u32>,
    #[serde(rename = "releaseDate")]
    release_date: &'a str,
    #[serde(rename = "trackCount")]
    track_count: u32,
    url: &'a str,
}

/// Render the included albums in the requested format.
///
/// Excluded albums are always omitted; when nothing remains the export
/// fails with [`ExportError::Empty`] and produces no payload.
pub fn export<E, P>(
    albums: &[AlbumRecord],
    format: ExportFormat,
    is_excluded: E,
    play_count: P,
    artwork_size: u32,
) -> Result<String>
where
    E: Fn(&str) -> bool,
    P: Fn(&str) -> Option<u32>,
{
    let included: Vec<&AlbumRecord> = albums
        .iter()
        .filter(|album| !is_excluded(&album.library_id))
        .collect();

    if included.is_empty() {
        return Err(ExportError::Empty);
    }

    match format {
        ExportFormat::Json => export_json(&included, play_count, artwork_size),
        ExportFormat::Text => Ok(export_text(&included)),
        ExportFormat::Markdown => Ok(export_markdown(&included)),
    }
}

fn export_json<P>(albums: &[&AlbumRecord], play_count: P, artwork_size: u32) -> Result<String>
where
    P: Fn(&str) -> Option<u32>,
{
    let documents: Vec<ExportedAlbum<'_>> = albums
        .iter()
        .map(|album| ExportedAlbum {
            artist: &album.artist,
            artwork_url: album.artwork_url_at(artwork_size),
            content_rating: album.content_rating.as_deref(),
            date_added: &album.date_added,
            genre: &album.genre,
            id: if album.catalog_id == 0 {
                None
            } else {
                Some(album.catalog_id)
            },
            name: &album.title,
            play_count: play_count(&album.library_id),
            release_date: &album.release_date_raw,
            track_count: album.track_count,
            url: &album.canonical_link,
        })
        .collect();

    // Compact form: no whitespace around the separators.
    Ok(serde_json::to_string(&documents)?)
}

fn export_text(albums: &[&AlbumRecord]) -> String {
    albums
        .iter()
        .map(|album| {
            format!(
                "\"{}\" by {}: {}",
                album.title, album.artist, album.canonical_link
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn export_markdown(albums: &[&AlbumRecord]) -> String {
    albums
        .iter()
        .map(|album| {
            format!(
                "- \"[{}]({})\" by {}",
                album.title, album.canonical_link, album.artist
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_library::models::canonical_link_for;

    fn album(library_id: &str, catalog_id: i64, title: &str, artist: &str) -> AlbumRecord {
        AlbumRecord {
            library_id: library_id.to_string(),
            catalog_id,
            title: title.to_string(),
            artist: artist.to_string(),
            genre: "Rock".to_string(),
            release_date_raw: "2020-01-31".to_string(),
            derived_year: 2020,
            track_count: 10,
            date_added: "2021-05-01T12:00:00Z".to_string(),
            content_rating: None,
            artwork_template_url: "https://example.org/{w}x{h}bb.jpg".to_string(),
            canonical_link: canonical_link_for(catalog_id),
        }
    }

    fn no_exclusions(_: &str) -> bool {
        false
    }

    fn no_play_counts(_: &str) -> Option<u32> {
        None
    }

    #[test]
    fn test_excluding_the_only_album_is_empty() {
        let albums = vec![album("l.1", 1, "Album", "Artist")];

        let result = export(
            &albums,
            ExportFormat::Text,
            |id| id == "l.1",
            no_play_counts,
            600,
        );

        assert!(matches!(result, Err(ExportError::Empty)));
    }

    #[test]
    fn test_empty_input_is_empty() {
        let result = export(&[], ExportFormat::Json, no_exclusions, no_play_counts, 600);
        assert!(matches!(result, Err(ExportError::Empty)));
    }

    #[test]
    fn test_text_format_exact() {
        let albums = vec![album("l.1", 123456789, "Blue Album", "Weezer")];

        let payload = export(
            &albums,
            ExportFormat::Text,
            no_exclusions,
            no_play_counts,
            600,
        )
        .unwrap();

        assert_eq!(
            payload,
            "\"Blue Album\" by Weezer: https://music.apple.com/us/album/123456789"
        );
    }

    #[test]
    fn test_text_format_unresolved_catalog_has_empty_url() {
        let albums = vec![album("l.1", 0, "Obscure", "Someone")];

        let payload = export(
            &albums,
            ExportFormat::Text,
            no_exclusions,
            no_play_counts,
            600,
        )
        .unwrap();

        assert_eq!(payload, "\"Obscure\" by Someone: ");
    }

    #[test]
    fn test_markdown_format_exact() {
        let albums = vec![
            album("l.1", 123456789, "Blue Album", "Weezer"),
            album("l.2", 987654321, "OK Computer", "Radiohead"),
        ];

        let payload = export(
            &albums,
            ExportFormat::Markdown,
            no_exclusions,
            no_play_counts,
            600,
        )
        .unwrap();

        assert_eq!(
            payload,
            "- \"[Blue Album](https://music.apple.com/us/album/123456789)\" by Weezer\n\
             - \"[OK Computer](https://music.apple.com/us/album/987654321)\" by Radiohead"
        );
    }

    #[test]
    fn test_json_format_exact() {
        let albums = vec![album("l.1", 123456789, "Blue Album", "Weezer")];

        let payload = export(
            &albums,
            ExportFormat::Json,
            no_exclusions,
            |_| Some(5),
            600,
        )
        .unwrap();

        assert_eq!(
            payload,
            "[{\"artist\":\"Weezer\",\
              \"artworkUrl\":\"https://example.org/600x600bb.jpg\",\
              \"contentRating\":null,\
              \"dateAdded\":\"2021-05-01T12:00:00Z\",\
              \"genre\":\"Rock\",\
              \"id\":123456789,\
              \"name\":\"Blue Album\",\
              \"playCount\":5,\
              \"releaseDate\":\"2020-01-31\",\
              \"trackCount\":10,\
              \"url\":\"https://music.apple.com/us/album/123456789\"}]"
        );
    }

    #[test]
    fn test_json_nullable_fields() {
        let albums = vec![album("l.1", 0, "Obscure", "Someone")];

        let payload = export(
            &albums,
            ExportFormat::Json,
            no_exclusions,
            no_play_counts,
            600,
        )
        .unwrap();

        let parsed: serde_json::Value = serde_json::from_str(&payload).unwrap();
        let entry = &parsed[0];
        assert!(entry["id"].is_null());
        assert!(entry["playCount"].is_null());
        assert_eq!(entry["url"], "");
    }

    #[test]
    fn test_json_keys_are_sorted() {
        let albums = vec![album("l.1", 1, "Album", "Artist")];

        let payload = export(
            &albums,
            ExportFormat::Json,
            no_exclusions,
            no_play_counts,
            600,
        )
        .unwrap();

        let keys: Vec<&str> = payload
            .trim_start_matches("[{")
            .trim_end_matches("}]")
            .split(',')
            .filter_map(|pair| pair.split(':').next())
            .filter(|key| key.starts_with('"'))
            .map(|key| key.trim_matches('"'))
            .collect();

        let mut sorted = keys.clone();
        sorted.sort_unstable();
        assert_eq!(keys, sorted);
    }

    #[test]
    fn test_excluded_albums_are_omitted() {
        let albums = vec![
            album("l.1", 1, "Kept", "Artist"),
            album("l.2", 2, "Dropped", "Artist"),
        ];

        let payload = export(
            &albums,
            ExportFormat::Text,
            |id| id == "l.2",
            no_play_counts,
            600,
        )
        .unwrap();

        assert!(payload.contains("Kept"));
        assert!(!payload.contains("Dropped"));
    }
}
