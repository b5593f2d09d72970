//! Source index data model.

use std::collections::BTreeMap;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Category of playable content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Artist,
    Album,
    Title,
    Genre,
    Favorite,
    Playlist,
    Podcast,
}

impl EntityType {
    pub const ALL: [EntityType; 7] = [
        EntityType::Artist,
        EntityType::Album,
        EntityType::Title,
        EntityType::Genre,
        EntityType::Favorite,
        EntityType::Playlist,
        EntityType::Podcast,
    ];

    /// Sections built from the cached library listing.
    pub const LIBRARY: [EntityType; 4] = [
        EntityType::Artist,
        EntityType::Album,
        EntityType::Title,
        EntityType::Genre,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EntityType::Artist => "artist",
            EntityType::Album => "album",
            EntityType::Title => "title",
            EntityType::Genre => "genre",
            EntityType::Favorite => "favorite",
            EntityType::Playlist => "playlist",
            EntityType::Podcast => "podcast",
        }
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtistRecord {
    pub artist_id: String,
    /// Every album credited to `artist_id`.
    pub album_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlbumRecord {
    pub album_id: String,
    /// Every track carrying `album_id`.
    pub track_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TitleRecord {
    pub track_id: String,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenreRecord {
    pub genre_id: String,
}

/// Favorites, playlists and podcasts only carry the server-assigned id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub id: String,
}

/// One indexed entity; the variant always matches the section it lives in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceRecord {
    Artist(ArtistRecord),
    Album(AlbumRecord),
    Title(TitleRecord),
    Genre(GenreRecord),
    Favorite(ItemRecord),
    Playlist(ItemRecord),
    Podcast(ItemRecord),
}

impl SourceRecord {
    pub fn entity_type(&self) -> EntityType {
        match self {
            SourceRecord::Artist(_) => EntityType::Artist,
            SourceRecord::Album(_) => EntityType::Album,
            SourceRecord::Title(_) => EntityType::Title,
            SourceRecord::Genre(_) => EntityType::Genre,
            SourceRecord::Favorite(_) => EntityType::Favorite,
            SourceRecord::Playlist(_) => EntityType::Playlist,
            SourceRecord::Podcast(_) => EntityType::Podcast,
        }
    }
}

/// Name-keyed lookup of every playable entity, one section per entity type.
///
/// Names are unique within a section and the first insertion of a name wins;
/// later duplicates are dropped, never merged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SourceIndex {
    sections: BTreeMap<EntityType, IndexMap<String, SourceRecord>>,
}

impl SourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `record` under `name` in its type's section.
    ///
    /// Returns `false` (and leaves the index untouched) when the name is
    /// already taken.
    pub fn insert(&mut self, name: impl Into<String>, record: SourceRecord) -> bool {
        let section = self.sections.entry(record.entity_type()).or_default();
        match section.entry(name.into()) {
            indexmap::map::Entry::Occupied(_) => false,
            indexmap::map::Entry::Vacant(slot) => {
                slot.insert(record);
                true
            }
        }
    }

    pub fn get(&self, entity_type: EntityType, name: &str) -> Option<&SourceRecord> {
        self.sections.get(&entity_type)?.get(name)
    }

    /// Names in a section, in insertion order.
    pub fn names(&self, entity_type: EntityType) -> impl Iterator<Item = &str> {
        self.sections
            .get(&entity_type)
            .into_iter()
            .flat_map(|section| section.keys().map(String::as_str))
    }

    pub fn len(&self, entity_type: EntityType) -> usize {
        self.sections.get(&entity_type).map_or(0, IndexMap::len)
    }

    pub fn is_empty(&self, entity_type: EntityType) -> bool {
        self.len(entity_type) == 0
    }

    /// Copy whole sections of `other` into this index, replacing ours.
    pub fn adopt_sections(&mut self, other: &SourceIndex, types: &[EntityType]) {
        for entity_type in types {
            match other.sections.get(entity_type) {
                Some(section) => {
                    self.sections.insert(*entity_type, section.clone());
                }
                None => {
                    self.sections.remove(entity_type);
                }
            }
        }
    }

    /// Entry count per entity type, including empty sections.
    pub fn counts(&self) -> BTreeMap<EntityType, usize> {
        EntityType::ALL
            .iter()
            .map(|t| (*t, self.len(*t)))
            .collect()
    }
}

/// Which loader produced an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    MediaLibrary,
    Favorite,
    Playlist,
    Podcast,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::MediaLibrary => "media_library",
            SourceKind::Favorite => "favorite",
            SourceKind::Playlist => "playlist",
            SourceKind::Podcast => "podcast",
        }
    }
}

/// Why a single listing entry could not be indexed.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "type", content = "detail", rename_all = "snake_case")]
pub enum EntryError {
    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("listing unavailable: {0}")]
    ListingUnavailable(String),
}

/// A skipped entry, kept for observability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    pub source: SourceKind,
    /// Entry name, or `#<position>` when the entry has no usable name.
    pub entry: String,
    pub error: EntryError,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn genre(id: &str) -> SourceRecord {
        SourceRecord::Genre(GenreRecord {
            genre_id: id.to_string(),
        })
    }

    #[test]
    fn test_first_insert_wins() {
        let mut index = SourceIndex::new();
        assert!(index.insert("Rock", genre("1")));
        assert!(!index.insert("Rock", genre("2")));

        assert_eq!(index.get(EntityType::Genre, "Rock"), Some(&genre("1")));
        assert_eq!(index.len(EntityType::Genre), 1);
    }

    #[test]
    fn test_records_land_in_their_own_section() {
        let mut index = SourceIndex::new();
        index.insert("Rock", genre("1"));
        index.insert(
            "Rock",
            SourceRecord::Playlist(ItemRecord {
                id: "9".to_string(),
            }),
        );

        assert_eq!(index.len(EntityType::Genre), 1);
        assert_eq!(index.len(EntityType::Playlist), 1);
        assert!(index.is_empty(EntityType::Album));
    }

    #[test]
    fn test_names_keep_insertion_order() {
        let mut index = SourceIndex::new();
        for (name, id) in [("Jazz", "3"), ("Blues", "1"), ("Rock", "2")] {
            index.insert(name, genre(id));
        }
        let names: Vec<&str> = index.names(EntityType::Genre).collect();
        assert_eq!(names, vec!["Jazz", "Blues", "Rock"]);
        assert_eq!(index.names(EntityType::Podcast).count(), 0);
    }

    #[test]
    fn test_adopt_sections_replaces_and_clears() {
        let mut library = SourceIndex::new();
        library.insert("Rock", genre("1"));

        let mut index = SourceIndex::new();
        index.insert("Old", genre("0"));
        index.insert(
            "News",
            SourceRecord::Podcast(ItemRecord {
                id: "p".to_string(),
            }),
        );
        index.adopt_sections(&library, &[EntityType::Genre, EntityType::Album]);

        let names: Vec<&str> = index.names(EntityType::Genre).collect();
        assert_eq!(names, vec!["Rock"]);
        assert_eq!(index.len(EntityType::Podcast), 1);
    }

    #[test]
    fn test_index_json_roundtrip_keeps_sections() {
        let mut index = SourceIndex::new();
        index.insert(
            "Help!",
            SourceRecord::Album(AlbumRecord {
                album_id: "5".to_string(),
                track_ids: vec!["10".to_string(), "11".to_string()],
            }),
        );
        let json = serde_json::to_string(&index).unwrap();
        let back: SourceIndex = serde_json::from_str(&json).unwrap();
        assert_eq!(back, index);
    }

    #[test]
    fn test_counts_cover_every_type() {
        let counts = SourceIndex::new().counts();
        assert_eq!(counts.len(), 7);
        assert!(counts.values().all(|c| *c == 0));
    }
}
