//! Testing utilities and mock implementations.
//!
//! This module provides a mock media server plus fixtures for a small,
//! deterministic library, allowing end-to-end tests of resolution and
//! dispatch without a real server.
//!
//! # Example
//!
//! ```rust,ignore
//! use squeezer_core::testing::{fixtures, MockMediaServer};
//!
//! let server = MockMediaServer::new();
//! server.set_players(fixtures::roster()).await;
//! server.set_catalog(fixtures::beatles_catalog(), 1234.5).await;
//!
//! // Use as Arc<dyn MediaServer>...
//! ```

mod mock_media_server;

pub use mock_media_server::{MockMediaServer, RecordedCall};

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::rpc::{Player, RawFavorite, RawId, RawPlaylist, RawPodcast, RawTrack};

    fn slug(name: &str) -> String {
        name.to_lowercase().replace(' ', "-")
    }

    /// Create a library track. Artist and album ids are derived from the
    /// names, so tracks sharing a name share the id.
    pub fn raw_track(id: i64, title: &str, artist: &str, album: &str) -> RawTrack {
        RawTrack {
            id: Some(RawId::Number(id)),
            title: Some(title.to_string()),
            artist: Some(artist.to_string()),
            artist_id: Some(RawId::Text(format!("ar-{}", slug(artist)))),
            album: Some(album.to_string()),
            album_id: Some(RawId::Text(format!("al-{}", slug(album)))),
            genre: Some("Rock".to_string()),
            genre_id: Some(RawId::Number(1)),
            url: Some(format!("file:///music/{}.flac", id)),
            duration: Some(180.0),
        }
    }

    /// A small library with a title that appears on two albums.
    pub fn beatles_catalog() -> Vec<RawTrack> {
        vec![
            raw_track(1, "Help!", "The Beatles", "Help!"),
            raw_track(2, "Yesterday", "The Beatles", "Help!"),
            raw_track(3, "Come Together", "The Beatles", "Abbey Road"),
            raw_track(4, "Something", "The Beatles", "Abbey Road"),
            raw_track(5, "Yesterday", "The Beatles", "Past Masters"),
            raw_track(6, "Day Tripper", "The Beatles", "Past Masters"),
        ]
    }

    pub fn player(id: &str, name: &str) -> Player {
        Player {
            id: id.to_string(),
            name: name.to_string(),
        }
    }

    pub fn roster() -> Vec<Player> {
        vec![
            player("aa:aa:aa:aa:aa:aa", "Kitchen Speaker"),
            player("bb:bb:bb:bb:bb:bb", "Living Room"),
        ]
    }

    pub fn favorite(id: &str, name: &str, kind: &str, isaudio: i64) -> RawFavorite {
        RawFavorite {
            id: Some(RawId::Text(id.to_string())),
            name: Some(name.to_string()),
            kind: Some(kind.to_string()),
            isaudio: Some(isaudio),
            hasitems: Some(0),
        }
    }

    /// One playable favorite and one folder.
    pub fn favorites() -> Vec<RawFavorite> {
        vec![
            favorite("f.1", "Radio Paradise", "audio", 1),
            favorite("f.2", "My Folder", "link", 0),
        ]
    }

    pub fn playlist(id: i64, name: &str) -> RawPlaylist {
        RawPlaylist {
            id: Some(RawId::Number(id)),
            playlist: Some(name.to_string()),
        }
    }

    pub fn playlists() -> Vec<RawPlaylist> {
        vec![playlist(11, "Morning Mix"), playlist(12, "Dinner Jazz")]
    }

    pub fn podcast(id: &str, name: &str, hasitems: i64, isaudio: i64) -> RawPodcast {
        RawPodcast {
            id: Some(RawId::Text(id.to_string())),
            name: Some(name.to_string()),
            hasitems: Some(hasitems),
            isaudio: Some(isaudio),
        }
    }

    /// One show and one stray episode.
    pub fn podcasts() -> Vec<RawPodcast> {
        vec![
            podcast("p.1", "Daily News", 1, 0),
            podcast("p.2", "Episode 12", 1, 1),
        ]
    }
}
