//! Locale-specific phrase recognition.

use regex_lite::Regex;

use crate::config::{ConfigError, PatternsConfig};
use crate::index::EntityType;

/// Language-dependent pieces of phrase parsing.
pub trait Recognizer: Send + Sync {
    /// Player or speaker named in the phrase, if any.
    fn extract_backend_hint(&self, text: &str) -> Option<String>;

    /// Whether the phrase addresses this skill explicitly.
    fn has_bonus_marker(&self, text: &str) -> bool;

    /// Remove "on the squeezebox" style phrases.
    fn strip_on_squeezebox(&self, text: &str) -> String;

    /// Remove the backend segment found by `extract_backend_hint`.
    fn strip_backend(&self, text: &str) -> String;

    /// Whether the remaining phrase asks to resume playback.
    fn is_continuation(&self, text: &str) -> bool;

    /// Entity name captured by the pattern for `entity_type`.
    fn capture(&self, entity_type: EntityType, text: &str) -> Option<String>;
}

/// `Recognizer` driven by the configured regular expressions.
#[derive(Debug, Clone)]
pub struct RegexRecognizer {
    backend: Regex,
    on_squeezebox: Regex,
    bonus: Regex,
    continuation: String,
    album: Regex,
    artist: Regex,
    title: Regex,
    genre: Regex,
    playlist: Regex,
    favorite: Regex,
    podcast: Regex,
}

fn compile(name: &str, pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern)
        .map_err(|e| ConfigError::ValidationError(format!("patterns.{}: {}", name, e)))
}

impl RegexRecognizer {
    pub fn new(patterns: &PatternsConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            backend: compile("backend", &patterns.backend)?,
            on_squeezebox: compile("on_squeezebox", &patterns.on_squeezebox)?,
            bonus: compile("bonus", &patterns.bonus)?,
            continuation: patterns.continuation.trim().to_lowercase(),
            album: compile("album", &patterns.album)?,
            artist: compile("artist", &patterns.artist)?,
            title: compile("title", &patterns.title)?,
            genre: compile("genre", &patterns.genre)?,
            playlist: compile("playlist", &patterns.playlist)?,
            favorite: compile("favorite", &patterns.favorite)?,
            podcast: compile("podcast", &patterns.podcast)?,
        })
    }

    fn pattern_for(&self, entity_type: EntityType) -> &Regex {
        match entity_type {
            EntityType::Album => &self.album,
            EntityType::Artist => &self.artist,
            EntityType::Title => &self.title,
            EntityType::Genre => &self.genre,
            EntityType::Playlist => &self.playlist,
            EntityType::Favorite => &self.favorite,
            EntityType::Podcast => &self.podcast,
        }
    }
}

impl Recognizer for RegexRecognizer {
    fn extract_backend_hint(&self, text: &str) -> Option<String> {
        self.backend
            .captures(text)?
            .name("backend")
            .map(|m| m.as_str().trim().to_string())
            .filter(|b| !b.is_empty())
    }

    fn has_bonus_marker(&self, text: &str) -> bool {
        self.bonus.is_match(text)
    }

    fn strip_on_squeezebox(&self, text: &str) -> String {
        self.on_squeezebox.replace_all(text, "").trim().to_string()
    }

    fn strip_backend(&self, text: &str) -> String {
        self.backend.replace_all(text, "").to_string()
    }

    fn is_continuation(&self, text: &str) -> bool {
        text.trim().to_lowercase() == self.continuation
    }

    fn capture(&self, entity_type: EntityType, text: &str) -> Option<String> {
        self.pattern_for(entity_type)
            .captures(text)?
            .name(entity_type.as_str())
            .map(|m| m.as_str().trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recognizer() -> RegexRecognizer {
        RegexRecognizer::new(&PatternsConfig::default()).unwrap()
    }

    #[test]
    fn test_backend_hint() {
        let r = recognizer();
        assert_eq!(
            r.extract_backend_hint("the album help on the kitchen speaker"),
            Some("kitchen".to_string())
        );
        assert_eq!(
            r.extract_backend_hint("artist queen in living room player"),
            Some("living room".to_string())
        );
        assert_eq!(r.extract_backend_hint("the album help"), None);
    }

    #[test]
    fn test_strip_backend() {
        let r = recognizer();
        assert_eq!(
            r.strip_backend("the album help on the kitchen speaker"),
            "the album help"
        );
    }

    #[test]
    fn test_squeezebox_markers() {
        let r = recognizer();
        assert!(r.has_bonus_marker("abbey road on squeezebox"));
        assert!(!r.has_bonus_marker("abbey road"));
        assert_eq!(r.strip_on_squeezebox("abbey road on squeezebox"), "abbey road");
        assert_eq!(
            r.strip_on_squeezebox("the artist queen using the squeezebox"),
            "the artist queen"
        );
        assert_eq!(r.strip_on_squeezebox("squeezebox"), "squeezebox");
    }

    #[test]
    fn test_continuation() {
        let r = recognizer();
        assert!(r.is_continuation("  squeezebox "));
        assert!(r.is_continuation("Squeezebox"));
        assert!(!r.is_continuation("squeezebox album"));
    }

    #[test]
    fn test_entity_captures() {
        let r = recognizer();
        assert_eq!(
            r.capture(EntityType::Album, "the album help"),
            Some("help".to_string())
        );
        assert_eq!(
            r.capture(EntityType::Artist, "band queen"),
            Some("queen".to_string())
        );
        assert_eq!(
            r.capture(EntityType::Genre, "some genre jazz"),
            Some("jazz".to_string())
        );
        assert_eq!(
            r.capture(EntityType::Favorite, "my favourite radio paradise"),
            Some("radio paradise".to_string())
        );
        assert_eq!(r.capture(EntityType::Album, "the beatles"), None);
    }

    #[test]
    fn test_invalid_pattern_is_a_config_error() {
        let patterns = PatternsConfig {
            album: "(?P<album>".to_string(),
            ..PatternsConfig::default()
        };
        assert!(matches!(
            RegexRecognizer::new(&patterns),
            Err(ConfigError::ValidationError(_))
        ));
    }
}
