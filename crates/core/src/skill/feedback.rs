//! User-facing confirmations.
//!
//! The skill only describes what should be said or played; rendering speech
//! or sound files is left to the host.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named dialog, matching the host's dialog files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialog {
    Playing,
    PlayerNotFound,
    Pause,
    Resume,
    NextTrack,
    PreviousTrack,
    Stop,
    VolumeUp,
    VolumeDown,
    VolumeSet,
    VolumeMute,
    VolumeUnmute,
    Identify,
    IdentifyNoArtist,
    IdentifyNoPlay,
    CacheUpdated,
    CacheNotUpdated,
}

impl Dialog {
    pub fn as_str(&self) -> &'static str {
        match self {
            Dialog::Playing => "playing",
            Dialog::PlayerNotFound => "playernotfound",
            Dialog::Pause => "pause",
            Dialog::Resume => "resume",
            Dialog::NextTrack => "nexttrack",
            Dialog::PreviousTrack => "previoustrack",
            Dialog::Stop => "stop",
            Dialog::VolumeUp => "volumeup",
            Dialog::VolumeDown => "volumedown",
            Dialog::VolumeSet => "volumeset",
            Dialog::VolumeMute => "volumemute",
            Dialog::VolumeUnmute => "volumeunmute",
            Dialog::Identify => "identify",
            Dialog::IdentifyNoArtist => "identifynoartist",
            Dialog::IdentifyNoPlay => "identifynoplay",
            Dialog::CacheUpdated => "cacheupdated",
            Dialog::CacheNotUpdated => "cachenotupdated",
        }
    }

    /// Short confirmation sound, if the dialog has one.
    pub fn sound(&self) -> Option<&'static str> {
        match self {
            Dialog::Playing => Some("playingcontent.wav"),
            Dialog::PlayerNotFound => Some("playernotfound.wav"),
            Dialog::Pause => Some("pause.wav"),
            Dialog::Resume => Some("resume.wav"),
            Dialog::NextTrack => Some("nexttrack.wav"),
            Dialog::PreviousTrack => Some("previoustrack.wav"),
            Dialog::Stop => Some("stop.wav"),
            Dialog::VolumeUp => Some("volumeup.wav"),
            Dialog::VolumeDown => Some("volumedown.wav"),
            Dialog::VolumeSet => Some("volumeset.wav"),
            Dialog::VolumeMute => Some("volumemute.wav"),
            Dialog::VolumeUnmute => Some("volumeunmute.wav"),
            Dialog::CacheUpdated => Some("cacheupdated.wav"),
            Dialog::CacheNotUpdated => Some("cachenotupdated.wav"),
            // Identification always has to be spoken.
            Dialog::Identify | Dialog::IdentifyNoArtist | Dialog::IdentifyNoPlay => None,
        }
    }
}

impl fmt::Display for Dialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the host should tell the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub dialog: Dialog,
    pub sound: Option<String>,
    /// Speak the dialog instead of playing `sound`.
    pub prefer_speech: bool,
    /// Template values for the dialog.
    pub data: BTreeMap<String, Value>,
}

impl Feedback {
    pub fn new(dialog: Dialog, speak_dialog_enabled: bool) -> Self {
        let sound = dialog.sound().map(str::to_string);
        Self {
            dialog,
            prefer_speech: speak_dialog_enabled || sound.is_none(),
            sound,
            data: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.data.insert(key.to_string(), value.into());
        self
    }
}
