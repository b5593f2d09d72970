use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub server: MediaServerConfig,
    pub player: PlayerConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub patterns: PatternsConfig,
    #[serde(default)]
    pub feedback: FeedbackConfig,
    #[serde(default)]
    pub http: HttpConfig,
}

/// Media server (LMS) connection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MediaServerConfig {
    pub host: String,
    #[serde(default = "default_server_port")]
    pub port: u16,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    /// Request timeout in seconds (default: 60)
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Directory on the media server holding `.m3u` playlist files
    #[serde(default = "default_playlist_dir")]
    pub playlist_dir: String,
}

fn default_server_port() -> u16 {
    9000
}

fn default_timeout() -> u64 {
    60
}

fn default_playlist_dir() -> String {
    "/var/lib/squeezeboxserver/playlists".to_string()
}

/// Player selection settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PlayerConfig {
    /// Player used when an utterance names none
    pub default_player_name: String,
}

/// Which catalog sources get indexed
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
pub struct SourcesConfig {
    #[serde(default = "enabled")]
    pub media_library: bool,
    #[serde(default = "enabled")]
    pub favorite: bool,
    #[serde(default = "enabled")]
    pub playlist: bool,
    #[serde(default = "enabled")]
    pub podcast: bool,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            media_library: true,
            favorite: true,
            playlist: true,
            podcast: true,
        }
    }
}

fn enabled() -> bool {
    true
}

/// Catalog cache location
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_dir")]
    pub dir: PathBuf,
    /// Files at or below this size are treated as placeholders, not data
    #[serde(default = "default_min_file_bytes")]
    pub min_file_bytes: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: default_cache_dir(),
            min_file_bytes: default_min_file_bytes(),
        }
    }
}

fn default_cache_dir() -> PathBuf {
    PathBuf::from("cache")
}

fn default_min_file_bytes() -> u64 {
    26
}

/// Locale-specific recognizer patterns.
///
/// Entity patterns must contain a named capture group called after the entity
/// type (`album`, `artist`, ...); `backend` must capture `backend`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct PatternsConfig {
    pub backend: String,
    pub on_squeezebox: String,
    pub bonus: String,
    /// Literal phrase that resumes the current queue
    pub continuation: String,
    pub album: String,
    pub artist: String,
    pub title: String,
    pub genre: String,
    pub playlist: String,
    pub favorite: String,
    pub podcast: String,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            backend: r"(?i)\s+(?:on|in) (?:the )?(?P<backend>[\w ]+?) (?:player|speaker)$"
                .to_string(),
            on_squeezebox: r"(?i)\s*\b(?:on|using|with|from) (?:the )?squeezebox\b".to_string(),
            bonus: r"(?i)\bsqueezebox\b".to_string(),
            continuation: "squeezebox".to_string(),
            album: r"(?i)^(?:the )?album (?P<album>.+)$".to_string(),
            artist: r"(?i)^(?:the )?(?:artist|band) (?P<artist>.+)$".to_string(),
            title: r"(?i)^(?:the )?(?:song|track|title) (?P<title>.+)$".to_string(),
            genre: r"(?i)^(?:some )?(?:the )?genre (?P<genre>.+)$".to_string(),
            playlist: r"(?i)^(?:the |my )?playlist (?P<playlist>.+)$".to_string(),
            favorite: r"(?i)^(?:the |my )?favou?rite (?P<favorite>.+)$".to_string(),
            podcast: r"(?i)^(?:the )?podcast (?P<podcast>.+)$".to_string(),
        }
    }
}

/// Spoken/audible confirmation settings
#[derive(Debug, Clone, Copy, Default, Deserialize, Serialize)]
pub struct FeedbackConfig {
    #[serde(default)]
    pub speak_dialog_enabled: bool,
}

/// HTTP surface configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8099
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: SanitizedServerConfig,
    pub player: PlayerConfig,
    pub sources: SourcesConfig,
    pub cache: CacheConfig,
    pub feedback: FeedbackConfig,
    pub http: HttpConfig,
}

/// Sanitized media server config (password hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedServerConfig {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password_configured: bool,
    pub timeout_secs: u64,
    pub playlist_dir: String,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: SanitizedServerConfig {
                host: config.server.host.clone(),
                port: config.server.port,
                username: config.server.username.clone(),
                password_configured: config
                    .server
                    .password
                    .as_ref()
                    .is_some_and(|p| !p.is_empty()),
                timeout_secs: config.server.timeout_secs,
                playlist_dir: config.server.playlist_dir.clone(),
            },
            player: config.player.clone(),
            sources: config.sources,
            cache: config.cache.clone(),
            feedback: config.feedback,
            http: config.http.clone(),
        }
    }
}
