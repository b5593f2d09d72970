//! RPC gateway to the media server.
//!
//! This module provides a `MediaServer` trait covering the remote operations
//! the skill needs, plus the Logitech Media Server JSON-RPC implementation.
//! Every method maps to exactly one remote call; sequencing lives in the
//! playback dispatcher.

mod lms;
mod types;

pub use lms::LmsClient;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the media server.
#[derive(Debug, Error)]
pub enum RpcError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout")]
    Timeout,

    #[error("HTTP error: {status} - {message}")]
    Http { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("Client setup failed: {0}")]
    Setup(String),
}

impl From<reqwest::Error> for RpcError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            RpcError::Timeout
        } else if e.is_connect() {
            RpcError::ConnectionFailed(e.to_string())
        } else if e.is_decode() {
            RpcError::Malformed(e.to_string())
        } else {
            RpcError::ConnectionFailed(e.to_string())
        }
    }
}

/// Remote media-control operations.
///
/// Implemented by `LmsClient` for production and by
/// `testing::MockMediaServer` for tests.
#[async_trait]
pub trait MediaServer: Send + Sync {
    // Catalog and roster queries

    /// List every player connected to the server.
    async fn list_players(&self) -> Result<Vec<Player>, RpcError>;

    /// Aggregate duration of the whole library in seconds.
    async fn get_catalog_signature(&self) -> Result<f64, RpcError>;

    /// Every track of the library with its tags.
    async fn fetch_full_catalog(&self) -> Result<Vec<RawTrack>, RpcError>;

    async fn list_favorites(&self) -> Result<Vec<RawFavorite>, RpcError>;

    async fn list_playlists(&self) -> Result<Vec<RawPlaylist>, RpcError>;

    /// Podcast menu as seen by `player_id`.
    async fn list_podcasts(&self, player_id: &str) -> Result<Vec<RawPodcast>, RpcError>;

    // Queue setup

    async fn set_shuffle(&self, player_id: &str, mode: ShuffleMode) -> Result<(), RpcError>;

    async fn set_repeat(&self, player_id: &str, mode: RepeatMode) -> Result<(), RpcError>;

    async fn clear_queue(&self, player_id: &str) -> Result<(), RpcError>;

    async fn enqueue(&self, player_id: &str, uri: &str) -> Result<(), RpcError>;

    async fn play(&self, player_id: &str) -> Result<(), RpcError>;

    // Server-side loads

    async fn play_by_album(&self, player_id: &str, album_id: &str) -> Result<(), RpcError>;

    async fn play_by_artist(&self, player_id: &str, artist_id: &str) -> Result<(), RpcError>;

    async fn play_by_genre(&self, player_id: &str, genre_id: &str) -> Result<(), RpcError>;

    async fn play_favorite(&self, player_id: &str, favorite_id: &str) -> Result<(), RpcError>;

    async fn play_podcast(&self, player_id: &str, podcast_id: &str) -> Result<(), RpcError>;

    async fn play_named_playlist(&self, player_id: &str, name: &str) -> Result<(), RpcError>;

    // Transport controls

    async fn pause(&self, player_id: &str) -> Result<(), RpcError>;

    async fn resume(&self, player_id: &str) -> Result<(), RpcError>;

    async fn stop(&self, player_id: &str) -> Result<(), RpcError>;

    async fn next(&self, player_id: &str) -> Result<(), RpcError>;

    async fn previous(&self, player_id: &str) -> Result<(), RpcError>;

    async fn set_volume(&self, player_id: &str, change: VolumeChange) -> Result<(), RpcError>;

    async fn mute(&self, player_id: &str, muted: bool) -> Result<(), RpcError>;

    async fn get_volume(&self, player_id: &str) -> Result<i64, RpcError>;

    async fn get_now_playing(&self, player_id: &str) -> Result<NowPlaying, RpcError>;
}
