//! Playback dispatcher.
//!
//! Maps a resolved target to the media server call sequence that starts it.
//! Dispatch is best effort: the host has already announced playback, so a
//! failing call is logged and reported in the outcome, never raised.

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use tracing::{error, info};

use crate::metrics::{PLAYBACK_STARTS, RPC_FAILURES};
use crate::resolver::PlaybackTarget;
use crate::rpc::{MediaServer, RepeatMode, RpcError, ShuffleMode};

/// Result of a dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DispatchOutcome {
    Started,
    /// The sequence stopped at `operation`; later calls were not issued.
    Failed { operation: String, error: String },
}

impl DispatchOutcome {
    pub fn is_started(&self) -> bool {
        matches!(self, DispatchOutcome::Started)
    }
}

struct StepFailure {
    operation: &'static str,
    error: RpcError,
}

async fn step<F>(operation: &'static str, call: F) -> Result<(), StepFailure>
where
    F: Future<Output = Result<(), RpcError>>,
{
    call.await
        .map_err(|error| StepFailure { operation, error })
}

pub struct PlaybackDispatcher {
    server: Arc<dyn MediaServer>,
}

impl PlaybackDispatcher {
    pub fn new(server: Arc<dyn MediaServer>) -> Self {
        Self { server }
    }

    /// Start `target` on `player_id`.
    pub async fn dispatch(&self, player_id: &str, target: &PlaybackTarget) -> DispatchOutcome {
        let kind = target.kind();
        info!("Starting {} on player {}", kind, player_id);

        match self.run(player_id, target).await {
            Ok(()) => {
                PLAYBACK_STARTS.with_label_values(&[kind, "started"]).inc();
                DispatchOutcome::Started
            }
            Err(failure) => {
                error!(
                    "Failed to start {} on {}: {} failed: {}",
                    kind, player_id, failure.operation, failure.error
                );
                PLAYBACK_STARTS.with_label_values(&[kind, "failed"]).inc();
                RPC_FAILURES.with_label_values(&[failure.operation]).inc();
                DispatchOutcome::Failed {
                    operation: failure.operation.to_string(),
                    error: failure.error.to_string(),
                }
            }
        }
    }

    async fn run(&self, player_id: &str, target: &PlaybackTarget) -> Result<(), StepFailure> {
        let server = self.server.as_ref();

        match target {
            PlaybackTarget::Continue => step("play", server.play(player_id)).await,
            PlaybackTarget::Title { url, .. } => {
                step("clear_queue", server.clear_queue(player_id)).await?;
                self.set_modes(player_id, ShuffleMode::Songs, RepeatMode::All)
                    .await?;
                step("enqueue", server.enqueue(player_id, url)).await?;
                step("play", server.play(player_id)).await
            }
            PlaybackTarget::Album { album_id } => {
                self.set_modes(player_id, ShuffleMode::Songs, RepeatMode::All)
                    .await?;
                step("play_by_album", server.play_by_album(player_id, album_id)).await
            }
            PlaybackTarget::Artist { artist_id } => {
                self.set_modes(player_id, ShuffleMode::Songs, RepeatMode::All)
                    .await?;
                step("play_by_artist", server.play_by_artist(player_id, artist_id)).await
            }
            PlaybackTarget::Genre { genre_id } => {
                self.set_modes(player_id, ShuffleMode::Songs, RepeatMode::All)
                    .await?;
                step("play_by_genre", server.play_by_genre(player_id, genre_id)).await
            }
            PlaybackTarget::Playlist { name } => {
                self.set_modes(player_id, ShuffleMode::Songs, RepeatMode::All)
                    .await?;
                step(
                    "play_named_playlist",
                    server.play_named_playlist(player_id, name),
                )
                .await
            }
            // Curated content keeps its own order.
            PlaybackTarget::Favorite { id } => {
                self.set_modes(player_id, ShuffleMode::Off, RepeatMode::Off)
                    .await?;
                step("play_favorite", server.play_favorite(player_id, id)).await
            }
            PlaybackTarget::Podcast { id } => {
                self.set_modes(player_id, ShuffleMode::Off, RepeatMode::Off)
                    .await?;
                step("play_podcast", server.play_podcast(player_id, id)).await
            }
        }
    }

    async fn set_modes(
        &self,
        player_id: &str,
        shuffle: ShuffleMode,
        repeat: RepeatMode,
    ) -> Result<(), StepFailure> {
        step("set_shuffle", self.server.set_shuffle(player_id, shuffle)).await?;
        step("set_repeat", self.server.set_repeat(player_id, repeat)).await
    }
}
