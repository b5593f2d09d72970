//! Logitech Media Server JSON-RPC client.
//!
//! Every call is a `slim.request` POSTed to `/jsonrpc.js`:
//! `{"id": 1, "method": "slim.request", "params": [<player>, [<command>...]]}`.
//! Server-wide queries use an empty player id.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use tracing::debug;

use crate::config::MediaServerConfig;

use super::{
    MediaServer, NowPlaying, Player, RawFavorite, RawPlaylist, RawPodcast, RawTrack, RepeatMode,
    RpcError, ShuffleMode, VolumeChange,
};

/// Tags requested for the full catalog listing:
/// artist, duration, album id, genre, album, genre id, artist id, track no, url.
const CATALOG_TAGS: &str = "tags:adegilpstu";

/// Upper bound for menu listings (favorites, podcasts, playlists).
const MENU_LIMIT: u32 = 1000;

/// LMS JSON-RPC client.
pub struct LmsClient {
    client: Client,
    url: String,
    credentials: Option<(String, String)>,
    playlist_dir: String,
}

impl LmsClient {
    /// Create a new client for the configured server.
    pub fn new(config: &MediaServerConfig) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| RpcError::Setup(e.to_string()))?;

        let credentials = match (&config.username, &config.password) {
            (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                Some((user.clone(), pass.clone()))
            }
            _ => None,
        };

        Ok(Self {
            client,
            url: format!("http://{}:{}/jsonrpc.js", config.host, config.port),
            credentials,
            playlist_dir: config.playlist_dir.trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint URL (without credentials).
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Send one `slim.request` and return its `result` object.
    async fn request(&self, player_id: &str, command: Vec<Value>) -> Result<Value, RpcError> {
        let payload = json!({
            "id": 1,
            "method": "slim.request",
            "params": [player_id, command],
        });

        debug!("LMS request: {}", payload["params"]);

        let mut request = self
            .client
            .post(&self.url)
            .header("X-Requested-With", "XMLHttpRequest")
            .json(&payload);
        if let Some((user, pass)) = &self.credentials {
            request = request.basic_auth(user, Some(pass));
        }

        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RpcError::Http {
                status: status.as_u16(),
                message: body,
            });
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RpcError::Malformed(format!("Invalid JSON body: {}", e)))?;

        Ok(body.get("result").cloned().unwrap_or(Value::Null))
    }

    /// Send a command whose result is irrelevant.
    async fn command(&self, player_id: &str, command: Vec<Value>) -> Result<(), RpcError> {
        self.request(player_id, command).await.map(|_| ())
    }

    /// Send a `<menu> playlist play item_id:<id>` command.
    async fn play_item(&self, player_id: &str, menu: &str, item_id: &str) -> Result<(), RpcError> {
        self.command(
            player_id,
            vec![
                json!(menu),
                json!("playlist"),
                json!("play"),
                json!(format!("item_id:{}", item_id)),
            ],
        )
        .await
    }
}

/// Extract a `*_loop` array; a missing loop means an empty listing.
fn loop_field<T: DeserializeOwned>(result: &Value, key: &str) -> Result<Vec<T>, RpcError> {
    match result.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(value) => serde_json::from_value(value.clone())
            .map_err(|e| RpcError::Malformed(format!("Invalid {}: {}", key, e))),
    }
}

/// Extract a required scalar field.
fn required_field<'a>(result: &'a Value, key: &str) -> Result<&'a Value, RpcError> {
    result
        .get(key)
        .filter(|v| !v.is_null())
        .ok_or_else(|| RpcError::Malformed(format!("Missing field {}", key)))
}

/// Numbers come back either as JSON numbers or as numeric strings.
fn as_number(value: &Value, key: &str) -> Result<f64, RpcError> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    number.ok_or_else(|| RpcError::Malformed(format!("Field {} is not numeric: {}", key, value)))
}

fn as_optional_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[async_trait]
impl MediaServer for LmsClient {
    async fn list_players(&self) -> Result<Vec<Player>, RpcError> {
        let result = self
            .request("", vec![json!("players"), json!(0), json!(MENU_LIMIT)])
            .await?;
        loop_field(&result, "players_loop")
    }

    async fn get_catalog_signature(&self) -> Result<f64, RpcError> {
        let result = self
            .request(
                "",
                vec![json!("info"), json!("total"), json!("duration"), json!("?")],
            )
            .await?;
        as_number(required_field(&result, "_duration")?, "_duration")
    }

    async fn fetch_full_catalog(&self) -> Result<Vec<RawTrack>, RpcError> {
        let result = self
            .request(
                "",
                vec![json!("titles"), json!("0"), json!("-1"), json!(CATALOG_TAGS)],
            )
            .await?;
        loop_field(&result, "titles_loop")
    }

    async fn list_favorites(&self) -> Result<Vec<RawFavorite>, RpcError> {
        let result = self
            .request(
                "",
                vec![json!("favorites"), json!("items"), json!(0), json!(MENU_LIMIT)],
            )
            .await?;
        loop_field(&result, "loop_loop")
    }

    async fn list_playlists(&self) -> Result<Vec<RawPlaylist>, RpcError> {
        let result = self
            .request("", vec![json!("playlists"), json!(0), json!(MENU_LIMIT)])
            .await?;
        loop_field(&result, "playlists_loop")
    }

    async fn list_podcasts(&self, player_id: &str) -> Result<Vec<RawPodcast>, RpcError> {
        let result = self
            .request(
                player_id,
                vec![json!("podcasts"), json!("items"), json!(0), json!(MENU_LIMIT)],
            )
            .await?;
        loop_field(&result, "loop_loop")
    }

    async fn set_shuffle(&self, player_id: &str, mode: ShuffleMode) -> Result<(), RpcError> {
        self.command(
            player_id,
            vec![json!("playlist"), json!("shuffle"), json!(mode.as_param())],
        )
        .await
    }

    async fn set_repeat(&self, player_id: &str, mode: RepeatMode) -> Result<(), RpcError> {
        self.command(
            player_id,
            vec![json!("playlist"), json!("repeat"), json!(mode.as_param())],
        )
        .await
    }

    async fn clear_queue(&self, player_id: &str) -> Result<(), RpcError> {
        self.command(player_id, vec![json!("playlist"), json!("clear")])
            .await
    }

    async fn enqueue(&self, player_id: &str, uri: &str) -> Result<(), RpcError> {
        self.command(player_id, vec![json!("playlist"), json!("add"), json!(uri)])
            .await
    }

    async fn play(&self, player_id: &str) -> Result<(), RpcError> {
        self.command(player_id, vec![json!("play")]).await
    }

    async fn play_by_album(&self, player_id: &str, album_id: &str) -> Result<(), RpcError> {
        self.command(
            player_id,
            vec![
                json!("playlist"),
                json!("loadtracks"),
                json!(format!("album.id={}", album_id)),
            ],
        )
        .await
    }

    async fn play_by_artist(&self, player_id: &str, artist_id: &str) -> Result<(), RpcError> {
        self.command(
            player_id,
            vec![
                json!("playlist"),
                json!("loadtracks"),
                json!(format!("contributor.id={}", artist_id)),
            ],
        )
        .await
    }

    async fn play_by_genre(&self, player_id: &str, genre_id: &str) -> Result<(), RpcError> {
        self.command(
            player_id,
            vec![
                json!("playlist"),
                json!("loadtracks"),
                json!(format!("genre.id={}", genre_id)),
            ],
        )
        .await
    }

    async fn play_favorite(&self, player_id: &str, favorite_id: &str) -> Result<(), RpcError> {
        self.play_item(player_id, "favorites", favorite_id).await
    }

    async fn play_podcast(&self, player_id: &str, podcast_id: &str) -> Result<(), RpcError> {
        self.play_item(player_id, "podcasts", podcast_id).await
    }

    async fn play_named_playlist(&self, player_id: &str, name: &str) -> Result<(), RpcError> {
        let path = format!("{}/{}.m3u", self.playlist_dir, name);
        self.command(player_id, vec![json!("playlist"), json!("play"), json!(path)])
            .await
    }

    async fn pause(&self, player_id: &str) -> Result<(), RpcError> {
        self.command(player_id, vec![json!("pause")]).await
    }

    async fn resume(&self, player_id: &str) -> Result<(), RpcError> {
        self.command(player_id, vec![json!("play")]).await
    }

    async fn stop(&self, player_id: &str) -> Result<(), RpcError> {
        self.command(player_id, vec![json!("stop")]).await
    }

    async fn next(&self, player_id: &str) -> Result<(), RpcError> {
        self.command(player_id, vec![json!("playlist"), json!("jump"), json!("+1")])
            .await
    }

    async fn previous(&self, player_id: &str) -> Result<(), RpcError> {
        self.command(player_id, vec![json!("playlist"), json!("jump"), json!("-1")])
            .await
    }

    async fn set_volume(&self, player_id: &str, change: VolumeChange) -> Result<(), RpcError> {
        self.command(
            player_id,
            vec![json!("mixer"), json!("volume"), json!(change.as_param())],
        )
        .await
    }

    async fn mute(&self, player_id: &str, muted: bool) -> Result<(), RpcError> {
        let flag = if muted { "1" } else { "0" };
        self.command(player_id, vec![json!("mixer"), json!("muting"), json!(flag)])
            .await
    }

    async fn get_volume(&self, player_id: &str) -> Result<i64, RpcError> {
        let result = self.request(player_id, vec![json!("status")]).await?;
        as_number(required_field(&result, "mixer volume")?, "mixer volume").map(|v| v as i64)
    }

    async fn get_now_playing(&self, player_id: &str) -> Result<NowPlaying, RpcError> {
        let status = self.request(player_id, vec![json!("status")]).await?;
        let mode = required_field(&status, "mode")?
            .as_str()
            .unwrap_or_default()
            .to_string();

        let title = self
            .request(player_id, vec![json!("title"), json!("?")])
            .await?;

        // Streams and some plugins have no artist; a failed lookup is not fatal.
        let artist = match self
            .request(player_id, vec![json!("artist"), json!("?")])
            .await
        {
            Ok(result) => as_optional_text(result.get("_artist")),
            Err(e) => {
                debug!("Artist lookup failed for {}: {}", player_id, e);
                None
            }
        };

        Ok(NowPlaying {
            title: as_optional_text(title.get("_title")),
            artist,
            mode,
        })
    }
}
