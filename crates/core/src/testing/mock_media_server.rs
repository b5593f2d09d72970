//! Mock media server for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::rpc::{
    MediaServer, NowPlaying, Player, RawFavorite, RawPlaylist, RawPodcast, RawTrack, RepeatMode,
    RpcError, ShuffleMode, VolumeChange,
};

/// A recorded gateway call for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCall {
    ListPlayers,
    GetCatalogSignature,
    FetchFullCatalog,
    ListFavorites,
    ListPlaylists,
    ListPodcasts { player: String },
    SetShuffle { player: String, mode: ShuffleMode },
    SetRepeat { player: String, mode: RepeatMode },
    ClearQueue { player: String },
    Enqueue { player: String, uri: String },
    Play { player: String },
    PlayByAlbum { player: String, album_id: String },
    PlayByArtist { player: String, artist_id: String },
    PlayByGenre { player: String, genre_id: String },
    PlayFavorite { player: String, id: String },
    PlayPodcast { player: String, id: String },
    PlayNamedPlaylist { player: String, name: String },
    Pause { player: String },
    Resume { player: String },
    Stop { player: String },
    Next { player: String },
    Previous { player: String },
    SetVolume { player: String, change: VolumeChange },
    Mute { player: String, muted: bool },
    GetVolume { player: String },
    GetNowPlaying { player: String },
}

impl RecordedCall {
    /// Whether the call changes player state.
    pub fn is_control(&self) -> bool {
        !matches!(
            self,
            RecordedCall::ListPlayers
                | RecordedCall::GetCatalogSignature
                | RecordedCall::FetchFullCatalog
                | RecordedCall::ListFavorites
                | RecordedCall::ListPlaylists
                | RecordedCall::ListPodcasts { .. }
                | RecordedCall::GetVolume { .. }
                | RecordedCall::GetNowPlaying { .. }
        )
    }
}

/// Mock implementation of the MediaServer trait.
///
/// Provides controllable behavior for testing:
/// - Configurable roster, library, favorites, playlists and podcasts
/// - Every call recorded for assertions
/// - One-shot failures, either for the next call or a named operation
///
/// # Example
///
/// ```rust,ignore
/// let server = MockMediaServer::new();
/// server.set_players(vec![fixtures::player("aa:aa", "Kitchen")]).await;
/// server.set_catalog(fixtures::beatles_catalog(), 1234.5).await;
///
/// server.fail_operation("play_by_album", RpcError::Timeout).await;
///
/// let calls = server.recorded_calls().await;
/// ```
#[derive(Debug)]
pub struct MockMediaServer {
    players: Arc<RwLock<Vec<Player>>>,
    catalog: Arc<RwLock<Vec<RawTrack>>>,
    signature: Arc<RwLock<f64>>,
    favorites: Arc<RwLock<Vec<RawFavorite>>>,
    playlists: Arc<RwLock<Vec<RawPlaylist>>>,
    podcasts: Arc<RwLock<Vec<RawPodcast>>>,
    volume: Arc<RwLock<i64>>,
    now_playing: Arc<RwLock<NowPlaying>>,
    /// Every call, in order.
    calls: Arc<RwLock<Vec<RecordedCall>>>,
    /// Number of full catalog fetches.
    full_fetches: Arc<RwLock<usize>>,
    /// If set, the next call of any kind fails with this error.
    next_error: Arc<RwLock<Option<RpcError>>>,
    /// Failures for the next call of a named operation.
    failing: Arc<RwLock<HashMap<&'static str, RpcError>>>,
}

impl Default for MockMediaServer {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMediaServer {
    /// Create a mock server with an empty library and no players.
    pub fn new() -> Self {
        Self {
            players: Arc::new(RwLock::new(Vec::new())),
            catalog: Arc::new(RwLock::new(Vec::new())),
            signature: Arc::new(RwLock::new(0.0)),
            favorites: Arc::new(RwLock::new(Vec::new())),
            playlists: Arc::new(RwLock::new(Vec::new())),
            podcasts: Arc::new(RwLock::new(Vec::new())),
            volume: Arc::new(RwLock::new(50)),
            now_playing: Arc::new(RwLock::new(NowPlaying {
                title: None,
                artist: None,
                mode: "stop".to_string(),
            })),
            calls: Arc::new(RwLock::new(Vec::new())),
            full_fetches: Arc::new(RwLock::new(0)),
            next_error: Arc::new(RwLock::new(None)),
            failing: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub async fn set_players(&self, players: Vec<Player>) {
        *self.players.write().await = players;
    }

    /// Replace the library and the signature reported for it.
    pub async fn set_catalog(&self, tracks: Vec<RawTrack>, signature: f64) {
        *self.catalog.write().await = tracks;
        *self.signature.write().await = signature;
    }

    pub async fn set_favorites(&self, favorites: Vec<RawFavorite>) {
        *self.favorites.write().await = favorites;
    }

    pub async fn set_playlists(&self, playlists: Vec<RawPlaylist>) {
        *self.playlists.write().await = playlists;
    }

    pub async fn set_podcasts(&self, podcasts: Vec<RawPodcast>) {
        *self.podcasts.write().await = podcasts;
    }

    pub async fn set_now_playing(&self, now_playing: NowPlaying) {
        *self.now_playing.write().await = now_playing;
    }

    /// Current mixer volume.
    pub async fn volume(&self) -> i64 {
        *self.volume.read().await
    }

    /// Make the next call fail.
    pub async fn set_next_error(&self, error: RpcError) {
        *self.next_error.write().await = Some(error);
    }

    /// Make the next call of `operation` (a `MediaServer` method name) fail.
    pub async fn fail_operation(&self, operation: &'static str, error: RpcError) {
        self.failing.write().await.insert(operation, error);
    }

    pub async fn recorded_calls(&self) -> Vec<RecordedCall> {
        self.calls.read().await.clone()
    }

    /// Recorded calls that change player state.
    pub async fn control_calls(&self) -> Vec<RecordedCall> {
        self.calls
            .read()
            .await
            .iter()
            .filter(|c| c.is_control())
            .cloned()
            .collect()
    }

    pub async fn clear_calls(&self) {
        self.calls.write().await.clear();
    }

    pub async fn full_fetch_count(&self) -> usize {
        *self.full_fetches.read().await
    }

    /// Record a call and return any configured failure for it.
    async fn record(&self, operation: &'static str, call: RecordedCall) -> Result<(), RpcError> {
        self.calls.write().await.push(call);
        if let Some(error) = self.next_error.write().await.take() {
            return Err(error);
        }
        match self.failing.write().await.remove(operation) {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl MediaServer for MockMediaServer {
    async fn list_players(&self) -> Result<Vec<Player>, RpcError> {
        self.record("list_players", RecordedCall::ListPlayers).await?;
        Ok(self.players.read().await.clone())
    }

    async fn get_catalog_signature(&self) -> Result<f64, RpcError> {
        self.record("get_catalog_signature", RecordedCall::GetCatalogSignature)
            .await?;
        Ok(*self.signature.read().await)
    }

    async fn fetch_full_catalog(&self) -> Result<Vec<RawTrack>, RpcError> {
        self.record("fetch_full_catalog", RecordedCall::FetchFullCatalog)
            .await?;
        *self.full_fetches.write().await += 1;
        Ok(self.catalog.read().await.clone())
    }

    async fn list_favorites(&self) -> Result<Vec<RawFavorite>, RpcError> {
        self.record("list_favorites", RecordedCall::ListFavorites).await?;
        Ok(self.favorites.read().await.clone())
    }

    async fn list_playlists(&self) -> Result<Vec<RawPlaylist>, RpcError> {
        self.record("list_playlists", RecordedCall::ListPlaylists).await?;
        Ok(self.playlists.read().await.clone())
    }

    async fn list_podcasts(&self, player_id: &str) -> Result<Vec<RawPodcast>, RpcError> {
        self.record(
            "list_podcasts",
            RecordedCall::ListPodcasts {
                player: player_id.to_string(),
            },
        )
        .await?;
        Ok(self.podcasts.read().await.clone())
    }

    async fn set_shuffle(&self, player_id: &str, mode: ShuffleMode) -> Result<(), RpcError> {
        self.record(
            "set_shuffle",
            RecordedCall::SetShuffle {
                player: player_id.to_string(),
                mode,
            },
        )
        .await
    }

    async fn set_repeat(&self, player_id: &str, mode: RepeatMode) -> Result<(), RpcError> {
        self.record(
            "set_repeat",
            RecordedCall::SetRepeat {
                player: player_id.to_string(),
                mode,
            },
        )
        .await
    }

    async fn clear_queue(&self, player_id: &str) -> Result<(), RpcError> {
        self.record(
            "clear_queue",
            RecordedCall::ClearQueue {
                player: player_id.to_string(),
            },
        )
        .await
    }

    async fn enqueue(&self, player_id: &str, uri: &str) -> Result<(), RpcError> {
        self.record(
            "enqueue",
            RecordedCall::Enqueue {
                player: player_id.to_string(),
                uri: uri.to_string(),
            },
        )
        .await
    }

    async fn play(&self, player_id: &str) -> Result<(), RpcError> {
        self.record(
            "play",
            RecordedCall::Play {
                player: player_id.to_string(),
            },
        )
        .await
    }

    async fn play_by_album(&self, player_id: &str, album_id: &str) -> Result<(), RpcError> {
        self.record(
            "play_by_album",
            RecordedCall::PlayByAlbum {
                player: player_id.to_string(),
                album_id: album_id.to_string(),
            },
        )
        .await
    }

    async fn play_by_artist(&self, player_id: &str, artist_id: &str) -> Result<(), RpcError> {
        self.record(
            "play_by_artist",
            RecordedCall::PlayByArtist {
                player: player_id.to_string(),
                artist_id: artist_id.to_string(),
            },
        )
        .await
    }

    async fn play_by_genre(&self, player_id: &str, genre_id: &str) -> Result<(), RpcError> {
        self.record(
            "play_by_genre",
            RecordedCall::PlayByGenre {
                player: player_id.to_string(),
                genre_id: genre_id.to_string(),
            },
        )
        .await
    }

    async fn play_favorite(&self, player_id: &str, favorite_id: &str) -> Result<(), RpcError> {
        self.record(
            "play_favorite",
            RecordedCall::PlayFavorite {
                player: player_id.to_string(),
                id: favorite_id.to_string(),
            },
        )
        .await
    }

    async fn play_podcast(&self, player_id: &str, podcast_id: &str) -> Result<(), RpcError> {
        self.record(
            "play_podcast",
            RecordedCall::PlayPodcast {
                player: player_id.to_string(),
                id: podcast_id.to_string(),
            },
        )
        .await
    }

    async fn play_named_playlist(&self, player_id: &str, name: &str) -> Result<(), RpcError> {
        self.record(
            "play_named_playlist",
            RecordedCall::PlayNamedPlaylist {
                player: player_id.to_string(),
                name: name.to_string(),
            },
        )
        .await
    }

    async fn pause(&self, player_id: &str) -> Result<(), RpcError> {
        self.record(
            "pause",
            RecordedCall::Pause {
                player: player_id.to_string(),
            },
        )
        .await?;
        self.now_playing.write().await.mode = "pause".to_string();
        Ok(())
    }

    async fn resume(&self, player_id: &str) -> Result<(), RpcError> {
        self.record(
            "resume",
            RecordedCall::Resume {
                player: player_id.to_string(),
            },
        )
        .await?;
        self.now_playing.write().await.mode = "play".to_string();
        Ok(())
    }

    async fn stop(&self, player_id: &str) -> Result<(), RpcError> {
        self.record(
            "stop",
            RecordedCall::Stop {
                player: player_id.to_string(),
            },
        )
        .await?;
        self.now_playing.write().await.mode = "stop".to_string();
        Ok(())
    }

    async fn next(&self, player_id: &str) -> Result<(), RpcError> {
        self.record(
            "next",
            RecordedCall::Next {
                player: player_id.to_string(),
            },
        )
        .await
    }

    async fn previous(&self, player_id: &str) -> Result<(), RpcError> {
        self.record(
            "previous",
            RecordedCall::Previous {
                player: player_id.to_string(),
            },
        )
        .await
    }

    async fn set_volume(&self, player_id: &str, change: VolumeChange) -> Result<(), RpcError> {
        self.record(
            "set_volume",
            RecordedCall::SetVolume {
                player: player_id.to_string(),
                change,
            },
        )
        .await?;
        let mut volume = self.volume.write().await;
        *volume = match change {
            VolumeChange::Set(value) => i64::from(value.min(100)),
            VolumeChange::Delta(delta) => (*volume + i64::from(delta)).clamp(0, 100),
        };
        Ok(())
    }

    async fn mute(&self, player_id: &str, muted: bool) -> Result<(), RpcError> {
        self.record(
            "mute",
            RecordedCall::Mute {
                player: player_id.to_string(),
                muted,
            },
        )
        .await
    }

    async fn get_volume(&self, player_id: &str) -> Result<i64, RpcError> {
        self.record(
            "get_volume",
            RecordedCall::GetVolume {
                player: player_id.to_string(),
            },
        )
        .await?;
        Ok(*self.volume.read().await)
    }

    async fn get_now_playing(&self, player_id: &str) -> Result<NowPlaying, RpcError> {
        self.record(
            "get_now_playing",
            RecordedCall::GetNowPlaying {
                player: player_id.to_string(),
            },
        )
        .await?;
        Ok(self.now_playing.read().await.clone())
    }
}
