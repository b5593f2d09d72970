//! Library sections (artist, album, title, genre) derived from the flat
//! track listing.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::rpc::{RawId, RawTrack};

use super::types::{
    AlbumRecord, ArtistRecord, EntityType, EntryError, EntryFailure, GenreRecord, SourceIndex,
    SourceKind, SourceRecord, TitleRecord,
};

/// One library track with its text and id fields normalized.
///
/// Fields are kept optional: each section checks only the fields it needs,
/// so a track missing its artist id still lands in the album and title
/// sections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub track_id: Option<String>,
    pub title: Option<String>,
    pub artist: Option<String>,
    pub artist_id: Option<String>,
    pub album: Option<String>,
    pub album_id: Option<String>,
    /// Untagged tracks have no genre; they are still playable by title.
    pub genre: Option<String>,
    pub genre_id: Option<String>,
    pub url: Option<String>,
    pub duration: Option<f64>,
}

impl From<&RawTrack> for CatalogEntry {
    fn from(raw: &RawTrack) -> Self {
        Self {
            track_id: id_text(&raw.id),
            title: non_empty(&raw.title),
            artist: non_empty(&raw.artist),
            artist_id: id_text(&raw.artist_id),
            album: non_empty(&raw.album),
            album_id: id_text(&raw.album_id),
            genre: non_empty(&raw.genre),
            genre_id: id_text(&raw.genre_id),
            url: non_empty(&raw.url),
            duration: raw.duration,
        }
    }
}

/// Artist section fields.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArtistFields<'a> {
    pub name: &'a str,
    pub artist_id: &'a str,
}

/// Album section fields. `artist` only adds the `by` key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlbumFields<'a> {
    pub name: &'a str,
    pub album_id: &'a str,
    pub artist: Option<&'a str>,
}

/// Title section fields. `artist` only adds the `by` key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TitleFields<'a> {
    pub name: &'a str,
    pub track_id: &'a str,
    pub url: &'a str,
    pub artist: Option<&'a str>,
}

impl CatalogEntry {
    pub fn artist_fields(&self) -> Result<ArtistFields<'_>, EntryError> {
        Ok(ArtistFields {
            name: require(&self.artist, "artist")?,
            artist_id: require(&self.artist_id, "artist_id")?,
        })
    }

    pub fn album_fields(&self) -> Result<AlbumFields<'_>, EntryError> {
        Ok(AlbumFields {
            name: require(&self.album, "album")?,
            album_id: require(&self.album_id, "album_id")?,
            artist: self.artist.as_deref(),
        })
    }

    pub fn title_fields(&self) -> Result<TitleFields<'_>, EntryError> {
        Ok(TitleFields {
            name: require(&self.title, "title")?,
            track_id: require(&self.track_id, "id")?,
            url: require(&self.url, "url")?,
            artist: self.artist.as_deref(),
        })
    }

    /// Genre name and id, when the track is tagged.
    pub fn genre_fields(&self) -> Option<(&str, &str)> {
        Some((self.genre.as_deref()?, self.genre_id.as_deref()?))
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn id_text(value: &Option<RawId>) -> Option<String> {
    value
        .as_ref()
        .map(RawId::to_string)
        .filter(|s| !s.is_empty())
}

fn require<'a>(value: &'a Option<String>, field: &'static str) -> Result<&'a str, EntryError> {
    value.as_deref().ok_or(EntryError::MissingField(field))
}

/// `"<name> by <artist>"`, the disambiguating key for albums and titles.
pub fn by_artist_key(name: &str, artist: &str) -> String {
    format!("{} by {}", name, artist)
}

/// Result of building the library sections.
#[derive(Debug, Clone, Default)]
pub struct LibraryBuild {
    pub index: SourceIndex,
    pub failures: Vec<EntryFailure>,
}

/// Build the artist, album, title and genre sections.
///
/// Each section is validated on its own: a track that cannot join one
/// section is reported once for that section and still joins the others.
/// Album track lists and artist album lists are grouped over the whole
/// listing by id, so every track of an album is attached even though only the
/// first album name is indexed.
pub fn build_library_sections(tracks: &[RawTrack]) -> LibraryBuild {
    let entries: Vec<CatalogEntry> = tracks.iter().map(CatalogEntry::from).collect();

    let mut tracks_by_album: IndexMap<&str, Vec<String>> = IndexMap::new();
    let mut albums_by_artist: IndexMap<&str, Vec<String>> = IndexMap::new();
    for entry in &entries {
        let Some(album_id) = entry.album_id.as_deref() else {
            continue;
        };
        if let Some(track_id) = &entry.track_id {
            tracks_by_album
                .entry(album_id)
                .or_default()
                .push(track_id.clone());
        }
        if let Some(artist_id) = entry.artist_id.as_deref() {
            let albums = albums_by_artist.entry(artist_id).or_default();
            if !albums.iter().any(|id| id == album_id) {
                albums.push(album_id.to_string());
            }
        }
    }

    let mut index = SourceIndex::new();
    let mut failures = Vec::new();
    for (position, entry) in entries.iter().enumerate() {
        let mut report = |section: EntityType, error: EntryError| {
            let name = entry.title.clone().unwrap_or_else(|| format!("#{}", position));
            warn!("Failed to load {} for track {}: {}", section, name, error);
            failures.push(EntryFailure {
                source: SourceKind::MediaLibrary,
                entry: name,
                error,
            });
        };

        match entry.artist_fields() {
            Ok(artist) => {
                index.insert(
                    artist.name,
                    SourceRecord::Artist(ArtistRecord {
                        artist_id: artist.artist_id.to_string(),
                        album_ids: albums_by_artist
                            .get(artist.artist_id)
                            .cloned()
                            .unwrap_or_default(),
                    }),
                );
            }
            Err(error) => report(EntityType::Artist, error),
        }

        match entry.album_fields() {
            Ok(album) => {
                let record = SourceRecord::Album(AlbumRecord {
                    album_id: album.album_id.to_string(),
                    track_ids: tracks_by_album
                        .get(album.album_id)
                        .cloned()
                        .unwrap_or_default(),
                });
                if index.insert(album.name, record.clone()) {
                    debug!("Loaded album: {}", album.name);
                }
                if let Some(artist) = album.artist {
                    index.insert(by_artist_key(album.name, artist), record);
                }
            }
            Err(error) => report(EntityType::Album, error),
        }

        match entry.title_fields() {
            Ok(title) => {
                let record = SourceRecord::Title(TitleRecord {
                    track_id: title.track_id.to_string(),
                    url: title.url.to_string(),
                });
                index.insert(title.name, record.clone());
                if let Some(artist) = title.artist {
                    index.insert(by_artist_key(title.name, artist), record);
                }
            }
            Err(error) => report(EntityType::Title, error),
        }

        if let Some((genre, genre_id)) = entry.genre_fields() {
            if index.insert(
                genre,
                SourceRecord::Genre(GenreRecord {
                    genre_id: genre_id.to_string(),
                }),
            ) {
                debug!("Loaded genre: {}", genre);
            }
        }
    }

    info!(
        "Built library sections: {} artists, {} albums, {} titles, {} genres ({} skipped)",
        index.len(EntityType::Artist),
        index.len(EntityType::Album),
        index.len(EntityType::Title),
        index.len(EntityType::Genre),
        failures.len()
    );

    LibraryBuild { index, failures }
}
