use regex_lite::Regex;

use super::{types::Config, ConfigError};

/// Validate configuration
/// Currently validates:
/// - Media server host and default player name are set
/// - Timeout and HTTP port are not 0
/// - Every recognizer pattern compiles and exposes its capture group
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.host.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "server.host cannot be empty".to_string(),
        ));
    }

    if config.player.default_player_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "player.default_player_name cannot be empty".to_string(),
        ));
    }

    if config.server.timeout_secs == 0 {
        return Err(ConfigError::ValidationError(
            "server.timeout_secs cannot be 0".to_string(),
        ));
    }

    if config.http.port == 0 {
        return Err(ConfigError::ValidationError(
            "http.port cannot be 0".to_string(),
        ));
    }

    if config.patterns.continuation.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "patterns.continuation cannot be empty".to_string(),
        ));
    }

    let patterns = &config.patterns;
    let checks: [(&str, &str, Option<&str>); 10] = [
        ("backend", patterns.backend.as_str(), Some("backend")),
        ("on_squeezebox", patterns.on_squeezebox.as_str(), None),
        ("bonus", patterns.bonus.as_str(), None),
        ("album", patterns.album.as_str(), Some("album")),
        ("artist", patterns.artist.as_str(), Some("artist")),
        ("title", patterns.title.as_str(), Some("title")),
        ("genre", patterns.genre.as_str(), Some("genre")),
        ("playlist", patterns.playlist.as_str(), Some("playlist")),
        ("favorite", patterns.favorite.as_str(), Some("favorite")),
        ("podcast", patterns.podcast.as_str(), Some("podcast")),
    ];

    for (key, pattern, group) in checks {
        let regex = Regex::new(pattern).map_err(|e| {
            ConfigError::ValidationError(format!("patterns.{} is not a valid regex: {}", key, e))
        })?;
        if let Some(group) = group {
            if !regex.capture_names().flatten().any(|name| name == group) {
                return Err(ConfigError::ValidationError(format!(
                    "patterns.{} must contain a named group '{}'",
                    key, group
                )));
            }
        }
    }

    Ok(())
}
