//! Builds a complete `SourceIndex` from every enabled source.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::cache::CatalogCache;
use crate::config::SourcesConfig;
use crate::metrics::ENTRIES_SKIPPED;
use crate::rpc::{MediaServer, RawFavorite, RawId, RawPlaylist, RawPodcast};

use super::types::{
    EntityType, EntryError, EntryFailure, ItemRecord, SourceIndex, SourceKind, SourceRecord,
};

/// A freshly built index plus everything that was skipped on the way.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub index: SourceIndex,
    pub failures: Vec<EntryFailure>,
    pub loaded_at: DateTime<Utc>,
}

/// Compact report of a load, for logs and the HTTP surface.
#[derive(Debug, Clone, Serialize)]
pub struct LoadSummary {
    pub counts: std::collections::BTreeMap<EntityType, usize>,
    pub failures: Vec<EntryFailure>,
    pub loaded_at: DateTime<Utc>,
}

impl LoadOutcome {
    pub fn summary(&self) -> LoadSummary {
        LoadSummary {
            counts: self.index.counts(),
            failures: self.failures.clone(),
            loaded_at: self.loaded_at,
        }
    }
}

/// Outcome of converting one listing entry.
enum Converted {
    Indexed(String, SourceRecord),
    /// Filtered out on purpose (not audio, empty container...).
    Filtered,
}

/// Loads the library sections from the cache and queries favorites,
/// playlists and podcasts live.
pub struct SourceLoader {
    server: Arc<dyn MediaServer>,
    cache: Arc<CatalogCache>,
    sources: SourcesConfig,
}

impl SourceLoader {
    pub fn new(
        server: Arc<dyn MediaServer>,
        cache: Arc<CatalogCache>,
        sources: SourcesConfig,
    ) -> Self {
        Self {
            server,
            cache,
            sources,
        }
    }

    /// Build a new index from scratch.
    ///
    /// Podcasts are listed per player; without `podcast_player` the podcast
    /// section stays empty. Disabled sources leave their sections empty. This
    /// never fails as a whole: bad entries and unavailable listings are
    /// reported in `failures`.
    pub async fn load(&self, podcast_player: Option<&str>) -> LoadOutcome {
        let mut index = SourceIndex::new();
        let mut failures = Vec::new();

        if self.sources.media_library {
            let library = self.cache.load_library().await;
            index.adopt_sections(&library.index, &EntityType::LIBRARY);
            failures.extend(library.failures);
        }

        if self.sources.favorite {
            match self.server.list_favorites().await {
                Ok(favorites) => index_entries(
                    &mut index,
                    &mut failures,
                    SourceKind::Favorite,
                    &favorites,
                    |f| f.name.as_deref(),
                    convert_favorite,
                ),
                Err(e) => listing_failed(&mut failures, SourceKind::Favorite, e),
            }
        }

        if self.sources.playlist {
            match self.server.list_playlists().await {
                Ok(playlists) => index_entries(
                    &mut index,
                    &mut failures,
                    SourceKind::Playlist,
                    &playlists,
                    |p| p.playlist.as_deref(),
                    convert_playlist,
                ),
                Err(e) => listing_failed(&mut failures, SourceKind::Playlist, e),
            }
        }

        if self.sources.podcast {
            match podcast_player {
                Some(player_id) => match self.server.list_podcasts(player_id).await {
                    Ok(podcasts) => index_entries(
                        &mut index,
                        &mut failures,
                        SourceKind::Podcast,
                        &podcasts,
                        |p| p.name.as_deref(),
                        convert_podcast,
                    ),
                    Err(e) => listing_failed(&mut failures, SourceKind::Podcast, e),
                },
                None => warn!("No player to list podcasts with, podcast section left empty"),
            }
        }

        for failure in &failures {
            ENTRIES_SKIPPED
                .with_label_values(&[failure.source.as_str()])
                .inc();
        }

        let counts = index.counts();
        info!(
            "Loaded sources: {} ({} entries skipped)",
            counts
                .iter()
                .map(|(t, n)| format!("{}={}", t, n))
                .collect::<Vec<_>>()
                .join(", "),
            failures.len()
        );

        LoadOutcome {
            index,
            failures,
            loaded_at: Utc::now(),
        }
    }
}

fn listing_failed(failures: &mut Vec<EntryFailure>, source: SourceKind, error: impl ToString) {
    let error = EntryError::ListingUnavailable(error.to_string());
    warn!("Failed to list {} source: {}", source.as_str(), error);
    failures.push(EntryFailure {
        source,
        entry: "*".to_string(),
        error,
    });
}

fn index_entries<T>(
    index: &mut SourceIndex,
    failures: &mut Vec<EntryFailure>,
    source: SourceKind,
    entries: &[T],
    name_of: impl Fn(&T) -> Option<&str>,
    convert: impl Fn(&T) -> Result<Converted, EntryError>,
) {
    for (position, entry) in entries.iter().enumerate() {
        match convert(entry) {
            Ok(Converted::Indexed(name, record)) => {
                debug!("Loaded {}: {}", source.as_str(), name);
                index.insert(name, record);
            }
            Ok(Converted::Filtered) => {}
            Err(error) => {
                let entry = name_of(entry)
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("#{}", position));
                warn!("Failed to load {} {}: {}", source.as_str(), entry, error);
                failures.push(EntryFailure {
                    source,
                    entry,
                    error,
                });
            }
        }
    }
}

fn required_name(name: &Option<String>, field: &'static str) -> Result<String, EntryError> {
    name.as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string)
        .ok_or(EntryError::MissingField(field))
}

fn required_id(id: &Option<RawId>) -> Result<String, EntryError> {
    id.as_ref()
        .map(RawId::to_string)
        .filter(|id| !id.is_empty())
        .ok_or(EntryError::MissingField("id"))
}

/// Only playable audio favorites are indexed.
fn convert_favorite(favorite: &RawFavorite) -> Result<Converted, EntryError> {
    let kind = favorite.kind.as_deref().ok_or(EntryError::MissingField("type"))?;
    let is_audio = favorite.isaudio.ok_or(EntryError::MissingField("isaudio"))?;
    if !kind.contains("audio") || is_audio != 1 {
        return Ok(Converted::Filtered);
    }

    Ok(Converted::Indexed(
        required_name(&favorite.name, "name")?,
        SourceRecord::Favorite(ItemRecord {
            id: required_id(&favorite.id)?,
        }),
    ))
}

fn convert_playlist(playlist: &RawPlaylist) -> Result<Converted, EntryError> {
    Ok(Converted::Indexed(
        required_name(&playlist.playlist, "playlist")?,
        SourceRecord::Playlist(ItemRecord {
            id: required_id(&playlist.id)?,
        }),
    ))
}

/// Only non-audio containers with at least one item are indexed.
fn convert_podcast(podcast: &RawPodcast) -> Result<Converted, EntryError> {
    let has_items = podcast.hasitems.ok_or(EntryError::MissingField("hasitems"))?;
    let is_audio = podcast.isaudio.ok_or(EntryError::MissingField("isaudio"))?;
    if has_items == 0 || is_audio != 0 {
        return Ok(Converted::Filtered);
    }

    Ok(Converted::Indexed(
        required_name(&podcast.name, "name")?,
        SourceRecord::Podcast(ItemRecord {
            id: required_id(&podcast.id)?,
        }),
    ))
}
