use serde::{Deserialize, Serialize};

use crate::index::{EntityType, SourceRecord};
use crate::rpc::Player;

/// Coarse confidence bucket reported to the host for ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceTier {
    Category,
    Title,
    MultiKey,
    Exact,
}

impl ConfidenceTier {
    /// Thresholds are exclusive lower bounds.
    pub fn from_confidence(confidence: f64) -> Self {
        if confidence > 0.9 {
            ConfidenceTier::Exact
        } else if confidence > 0.7 {
            ConfidenceTier::MultiKey
        } else if confidence > 0.5 {
            ConfidenceTier::Title
        } else {
            ConfidenceTier::Category
        }
    }
}

/// What to load on the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaybackTarget {
    /// Resume whatever is queued.
    Continue,
    Title { track_id: String, url: String },
    Album { album_id: String },
    Artist { artist_id: String },
    Genre { genre_id: String },
    /// Saved playlists are played by file name.
    Playlist { name: String },
    Favorite { id: String },
    Podcast { id: String },
}

impl PlaybackTarget {
    pub fn from_record(name: &str, record: &SourceRecord) -> Self {
        match record {
            SourceRecord::Title(r) => PlaybackTarget::Title {
                track_id: r.track_id.clone(),
                url: r.url.clone(),
            },
            SourceRecord::Album(r) => PlaybackTarget::Album {
                album_id: r.album_id.clone(),
            },
            SourceRecord::Artist(r) => PlaybackTarget::Artist {
                artist_id: r.artist_id.clone(),
            },
            SourceRecord::Genre(r) => PlaybackTarget::Genre {
                genre_id: r.genre_id.clone(),
            },
            SourceRecord::Playlist(_) => PlaybackTarget::Playlist {
                name: name.to_string(),
            },
            SourceRecord::Favorite(r) => PlaybackTarget::Favorite { id: r.id.clone() },
            SourceRecord::Podcast(r) => PlaybackTarget::Podcast { id: r.id.clone() },
        }
    }

    /// `None` for `Continue`.
    pub fn entity_type(&self) -> Option<EntityType> {
        match self {
            PlaybackTarget::Continue => None,
            PlaybackTarget::Title { .. } => Some(EntityType::Title),
            PlaybackTarget::Album { .. } => Some(EntityType::Album),
            PlaybackTarget::Artist { .. } => Some(EntityType::Artist),
            PlaybackTarget::Genre { .. } => Some(EntityType::Genre),
            PlaybackTarget::Playlist { .. } => Some(EntityType::Playlist),
            PlaybackTarget::Favorite { .. } => Some(EntityType::Favorite),
            PlaybackTarget::Podcast { .. } => Some(EntityType::Podcast),
        }
    }

    pub fn kind(&self) -> &'static str {
        self.entity_type().map_or("continue", |t| t.as_str())
    }
}

/// Which rule produced a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionPath {
    Continuation,
    Specific,
    Generic,
}

impl ResolutionPath {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResolutionPath::Continuation => "continuation",
            ResolutionPath::Specific => "specific",
            ResolutionPath::Generic => "generic",
        }
    }
}

/// Outcome of resolving one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedQuery {
    /// Phrase left after removing squeezebox and backend segments.
    pub phrase: String,
    /// Index key that matched; `None` for continuation.
    pub matched_name: Option<String>,
    pub target: PlaybackTarget,
    pub confidence: f64,
    pub tier: ConfidenceTier,
    pub path: ResolutionPath,
    /// Player or speaker named in the phrase.
    pub backend: Option<String>,
    /// Filled in once the player roster has been consulted.
    pub player: Option<Player>,
}
