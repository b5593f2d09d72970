//! Player roster lookup.

use tracing::{debug, info, warn};

use crate::matcher::best_match;
use crate::rpc::{MediaServer, Player, RpcError};

/// A player is only accepted above this confidence.
pub const PLAYER_MATCH_THRESHOLD: f64 = 0.5;

/// Fuzzy-match `wanted` against the roster.
pub fn match_player(players: &[Player], wanted: &str) -> Option<Player> {
    let found = best_match(wanted, players.iter().map(|p| p.name.as_str()))?;

    if found.confidence <= PLAYER_MATCH_THRESHOLD {
        warn!(
            "No player matches '{}' (best '{}' at {:.2})",
            wanted, found.candidate, found.confidence
        );
        return None;
    }

    debug!(
        "Player '{}' matched '{}' at {:.2}",
        wanted, found.candidate, found.confidence
    );
    players.iter().find(|p| p.name == found.candidate).cloned()
}

/// Resolve a player from an optional spoken hint, falling back to
/// `default_name`.
///
/// `Ok(None)` means the roster was fetched but nothing matched well enough.
pub async fn resolve_player(
    server: &dyn MediaServer,
    hint: Option<&str>,
    default_name: &str,
) -> Result<Option<Player>, RpcError> {
    let wanted = hint
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .unwrap_or(default_name);

    let players = server.list_players().await?;
    if players.is_empty() {
        warn!("Media server reports no connected players");
        return Ok(None);
    }

    let player = match_player(&players, wanted);
    if let Some(player) = &player {
        info!("Resolved player '{}' -> {} ({})", wanted, player.name, player.id);
    }
    Ok(player)
}
