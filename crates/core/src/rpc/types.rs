//! Typed payloads exchanged with the media server.
//!
//! Raw listing entries keep every field optional: the server omits tags it
//! has no value for, and one malformed entry must not fail a whole listing.
//! Validation happens per entry when the index is built.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Server-assigned identifier. LMS uses integers for library objects and
/// opaque strings for favorites and podcast items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawId::Number(n) => write!(f, "{}", n),
            RawId::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RawId {
    fn from(value: i64) -> Self {
        RawId::Number(value)
    }
}

impl From<&str> for RawId {
    fn from(value: &str) -> Self {
        RawId::Text(value.to_string())
    }
}

/// A playback endpoint known to the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "playerid")]
    pub id: String,
    pub name: String,
}

/// One track of the flat library listing, as returned by the server.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawTrack {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist: Option<String>,
    #[serde(default)]
    pub artist_id: Option<RawId>,
    #[serde(default)]
    pub album: Option<String>,
    #[serde(default)]
    pub album_id: Option<RawId>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub genre_id: Option<RawId>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "loose_float")]
    pub duration: Option<f64>,
}

/// A favorites menu entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawFavorite {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default, deserialize_with = "loose_int")]
    pub isaudio: Option<i64>,
    #[serde(default, deserialize_with = "loose_int")]
    pub hasitems: Option<i64>,
}

/// A saved playlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPlaylist {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub playlist: Option<String>,
}

/// A podcast menu entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawPodcast {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "loose_int")]
    pub hasitems: Option<i64>,
    #[serde(default, deserialize_with = "loose_int")]
    pub isaudio: Option<i64>,
}

/// Queue shuffle mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleMode {
    Off,
    Songs,
}

impl ShuffleMode {
    pub fn as_param(&self) -> u8 {
        match self {
            ShuffleMode::Off => 0,
            ShuffleMode::Songs => 1,
        }
    }
}

/// Queue repeat mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepeatMode {
    Off,
    Track,
    All,
}

impl RepeatMode {
    pub fn as_param(&self) -> u8 {
        match self {
            RepeatMode::Off => 0,
            RepeatMode::Track => 1,
            RepeatMode::All => 2,
        }
    }
}

/// Absolute or relative mixer volume change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VolumeChange {
    Set(u8),
    Delta(i8),
}

impl VolumeChange {
    /// Mixer argument: `"50"` for absolute, `"+5"` / `"-5"` for relative.
    pub fn as_param(&self) -> String {
        match self {
            VolumeChange::Set(value) => value.min(&100).to_string(),
            VolumeChange::Delta(delta) => format!("{:+}", delta),
        }
    }
}

/// What a player is currently doing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlaying {
    pub title: Option<String>,
    pub artist: Option<String>,
    /// `play`, `pause` or `stop`
    pub mode: String,
}

impl NowPlaying {
    pub fn is_playing(&self) -> bool {
        self.mode == "play"
    }
}

fn loose_int<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(i64::from(b)),
        _ => None,
    }))
}

fn loose_float<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_raw_track_accepts_numeric_and_string_ids() {
        let track: RawTrack = serde_json::from_value(json!({
            "id": 42,
            "title": "Yesterday",
            "album_id": "7",
            "duration": "125.5"
        }))
        .unwrap();

        assert_eq!(track.id, Some(RawId::Number(42)));
        assert_eq!(track.album_id, Some(RawId::Text("7".to_string())));
        assert_eq!(track.duration, Some(125.5));
        assert!(track.artist.is_none());
    }

    #[test]
    fn test_raw_favorite_loose_flags() {
        let favorite: RawFavorite = serde_json::from_value(json!({
            "id": "a1b2.0",
            "name": "Radio Paradise",
            "type": "audio",
            "isaudio": "1",
            "hasitems": 0
        }))
        .unwrap();

        assert_eq!(favorite.kind.as_deref(), Some("audio"));
        assert_eq!(favorite.isaudio, Some(1));
        assert_eq!(favorite.hasitems, Some(0));
    }

    #[test]
    fn test_unparseable_flag_becomes_none() {
        let podcast: RawPodcast = serde_json::from_value(json!({
            "id": "p.1",
            "name": "News",
            "hasitems": {"nested": true}
        }))
        .unwrap();
        assert!(podcast.hasitems.is_none());
    }

    #[test]
    fn test_volume_change_params() {
        assert_eq!(VolumeChange::Set(50).as_param(), "50");
        assert_eq!(VolumeChange::Set(140).as_param(), "100");
        assert_eq!(VolumeChange::Delta(5).as_param(), "+5");
        assert_eq!(VolumeChange::Delta(-5).as_param(), "-5");
    }

    #[test]
    fn test_mode_params() {
        assert_eq!(ShuffleMode::Songs.as_param(), 1);
        assert_eq!(ShuffleMode::Off.as_param(), 0);
        assert_eq!(RepeatMode::All.as_param(), 2);
        assert_eq!(RepeatMode::Off.as_param(), 0);
    }

    #[test]
    fn test_raw_id_display() {
        assert_eq!(RawId::from(12).to_string(), "12");
        assert_eq!(RawId::from("abc.1").to_string(), "abc.1");
    }
}
