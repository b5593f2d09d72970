//! Media skill façade.
//!
//! Wires the gateway, cache, loader, resolver and dispatcher together and
//! exposes the operations a voice assistant host calls. Public entry points
//! are serialized: one utterance or command is fully handled before the next
//! one starts.

mod command;
mod feedback;

pub use command::{PlayerCommand, TransportCommand, VOLUME_STEP};
pub use feedback::{Dialog, Feedback};

use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;
use tokio::sync::{Mutex, RwLock};
use tracing::{info, warn};

use crate::cache::{CacheError, CatalogCache};
use crate::config::{validate_config, Config, ConfigError};
use crate::dispatcher::{DispatchOutcome, PlaybackDispatcher};
use crate::index::{resolve_player, IndexHandle, LoadSummary, SourceLoader};
use crate::resolver::{PhraseResolver, RegexRecognizer, ResolvedQuery};
use crate::rpc::{MediaServer, Player, RpcError, VolumeChange};

/// Errors surfaced by the skill.
#[derive(Debug, Error)]
pub enum SkillError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Media server error: {0}")]
    Rpc(#[from] RpcError),

    #[error("Cache error: {0}")]
    Cache(#[from] CacheError),
}

/// Result of `MediaSkill::start`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StartReport {
    pub feedback: Feedback,
    /// `None` when no player was resolved and nothing was sent.
    pub dispatch: Option<DispatchOutcome>,
}

pub struct MediaSkill {
    server: Arc<dyn MediaServer>,
    cache: Arc<CatalogCache>,
    loader: SourceLoader,
    resolver: PhraseResolver,
    dispatcher: PlaybackDispatcher,
    index: IndexHandle,
    default_player_name: String,
    speak_dialog_enabled: bool,
    last_load: RwLock<Option<LoadSummary>>,
    serial: Mutex<()>,
}

impl MediaSkill {
    /// Build the skill and load its index.
    ///
    /// Only configuration problems are fatal; an unreachable server leaves the
    /// affected sources empty.
    pub async fn initialize(
        config: &Config,
        server: Arc<dyn MediaServer>,
    ) -> Result<Self, SkillError> {
        info!("Initializing media skill");
        validate_config(config)?;
        let recognizer = RegexRecognizer::new(&config.patterns)?;

        let cache = Arc::new(CatalogCache::new(server.clone(), &config.cache));
        let skill = Self {
            loader: SourceLoader::new(server.clone(), cache.clone(), config.sources),
            resolver: PhraseResolver::new(Arc::new(recognizer)),
            dispatcher: PlaybackDispatcher::new(server.clone()),
            index: IndexHandle::default(),
            default_player_name: config.player.default_player_name.clone(),
            speak_dialog_enabled: config.feedback.speak_dialog_enabled,
            last_load: RwLock::new(None),
            serial: Mutex::new(()),
            server,
            cache,
        };

        if config.sources.media_library {
            if let Err(e) = skill.cache.ensure_fresh().await {
                warn!("Library cache check failed, using what is on disk: {}", e);
            }
        }
        skill.load_and_publish().await;

        info!("Media skill ready");
        Ok(skill)
    }

    pub fn index(&self) -> &IndexHandle {
        &self.index
    }

    /// Report of the most recent source load.
    pub async fn last_load(&self) -> Option<LoadSummary> {
        self.last_load.read().await.clone()
    }

    /// Resolve an utterance and the player it targets.
    ///
    /// A query whose player cannot be found is still returned, with `player`
    /// left empty; `start` reports it.
    pub async fn match_phrase(&self, phrase: &str) -> Option<ResolvedQuery> {
        let _serial = self.serial.lock().await;
        let index = self.index.snapshot().await;
        let mut query = self.resolver.resolve(phrase, &index)?;
        query.player = self.find_player(query.backend.as_deref()).await;
        Some(query)
    }

    /// Start playback of a resolved query.
    ///
    /// The returned feedback is optimistic: dispatch failures are logged and
    /// reported in `dispatch`, but the dialog stays `playing`.
    pub async fn start(&self, query: &ResolvedQuery) -> StartReport {
        let _serial = self.serial.lock().await;

        let Some(player) = &query.player else {
            return StartReport {
                feedback: self.player_not_found(query.backend.as_deref()),
                dispatch: None,
            };
        };

        info!(
            "Playing {} ({}) on {}",
            query.matched_name.as_deref().unwrap_or("current queue"),
            query.target.kind(),
            player.name
        );
        let feedback = self
            .feedback(Dialog::Playing)
            .with("name", query.matched_name.clone())
            .with("type", query.target.kind())
            .with("backend", player.name.clone());

        let outcome = self.dispatcher.dispatch(&player.id, &query.target).await;
        StartReport {
            feedback,
            dispatch: Some(outcome),
        }
    }

    /// Run a transport command against the player named by `player_hint`
    /// (or the default player).
    pub async fn handle_command(
        &self,
        command: impl Into<TransportCommand>,
        player_hint: Option<&str>,
    ) -> Result<Feedback, SkillError> {
        let command = command.into();
        let _serial = self.serial.lock().await;
        info!("Handling {:?} request", command);

        let command = match command {
            TransportCommand::UpdateCache => return self.refresh_cache().await,
            TransportCommand::Player(command) => command,
        };

        let roster_match =
            resolve_player(self.server.as_ref(), player_hint, &self.default_player_name).await?;
        let player = match roster_match {
            Some(player) => player,
            None => return Ok(self.player_not_found(player_hint)),
        };
        let id = player.id.as_str();

        let feedback = match command {
            PlayerCommand::Pause => {
                self.server.pause(id).await?;
                self.feedback(Dialog::Pause)
            }
            PlayerCommand::Resume => {
                self.server.resume(id).await?;
                self.feedback(Dialog::Resume)
            }
            PlayerCommand::Next => {
                self.server.next(id).await?;
                self.feedback(Dialog::NextTrack)
            }
            PlayerCommand::Previous => {
                self.server.previous(id).await?;
                self.feedback(Dialog::PreviousTrack)
            }
            PlayerCommand::Stop => {
                self.server.stop(id).await?;
                self.feedback(Dialog::Stop)
            }
            PlayerCommand::VolumeUp => {
                self.server
                    .set_volume(id, VolumeChange::Delta(VOLUME_STEP))
                    .await?;
                self.with_volume(Dialog::VolumeUp, id).await?
            }
            PlayerCommand::VolumeDown => {
                self.server
                    .set_volume(id, VolumeChange::Delta(-VOLUME_STEP))
                    .await?;
                self.with_volume(Dialog::VolumeDown, id).await?
            }
            PlayerCommand::VolumeSet(level) => {
                self.server.set_volume(id, VolumeChange::Set(level)).await?;
                self.with_volume(Dialog::VolumeSet, id).await?
            }
            PlayerCommand::Mute => {
                self.server.mute(id, true).await?;
                self.with_volume(Dialog::VolumeMute, id).await?
            }
            PlayerCommand::Unmute => {
                self.server.mute(id, false).await?;
                self.with_volume(Dialog::VolumeUnmute, id).await?
            }
            PlayerCommand::IdentifyTrack => self.identify(&player).await?,
        };
        Ok(feedback)
    }

    /// Check the library cache and reload sources when it changed.
    pub async fn update_cache(&self) -> Result<Feedback, SkillError> {
        let _serial = self.serial.lock().await;
        self.refresh_cache().await
    }

    /// Rebuild the whole index and publish it.
    pub async fn reload_sources(&self) -> LoadSummary {
        let _serial = self.serial.lock().await;
        self.load_and_publish().await
    }

    async fn refresh_cache(&self) -> Result<Feedback, SkillError> {
        if self.cache.ensure_fresh().await? {
            self.load_and_publish().await;
            Ok(self.feedback(Dialog::CacheUpdated))
        } else {
            Ok(self.feedback(Dialog::CacheNotUpdated))
        }
    }

    async fn load_and_publish(&self) -> LoadSummary {
        let podcast_player = self.find_player(None).await;
        let outcome = self
            .loader
            .load(podcast_player.as_ref().map(|p| p.id.as_str()))
            .await;

        let summary = outcome.summary();
        self.index.publish(outcome.index).await;
        *self.last_load.write().await = Some(summary.clone());
        summary
    }

    async fn find_player(&self, hint: Option<&str>) -> Option<Player> {
        match resolve_player(self.server.as_ref(), hint, &self.default_player_name).await {
            Ok(player) => player,
            Err(e) => {
                warn!("Could not fetch player roster: {}", e);
                None
            }
        }
    }

    async fn identify(&self, player: &Player) -> Result<Feedback, SkillError> {
        let now = self.server.get_now_playing(&player.id).await?;

        if !now.is_playing() {
            return Ok(self
                .feedback(Dialog::IdentifyNoPlay)
                .with("backend", player.name.clone())
                .with("mode", now.mode));
        }

        let feedback = match now.artist.filter(|a| !a.trim().is_empty()) {
            Some(artist) => self
                .feedback(Dialog::Identify)
                .with("title", now.title)
                .with("artist", artist),
            None => self
                .feedback(Dialog::IdentifyNoArtist)
                .with("title", now.title),
        };
        Ok(feedback)
    }

    async fn with_volume(&self, dialog: Dialog, player_id: &str) -> Result<Feedback, SkillError> {
        let volume = self.server.get_volume(player_id).await?;
        Ok(self.feedback(dialog).with("volume", volume))
    }

    fn player_not_found(&self, backend: Option<&str>) -> Feedback {
        let backend = backend.unwrap_or(&self.default_player_name).to_string();
        warn!("Couldn't find player matching: {}", backend);
        self.feedback(Dialog::PlayerNotFound).with("backend", backend)
    }

    fn feedback(&self, dialog: Dialog) -> Feedback {
        Feedback::new(dialog, self.speak_dialog_enabled)
    }
}
