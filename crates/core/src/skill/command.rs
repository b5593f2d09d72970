use serde::{Deserialize, Serialize};

/// Volume step for relative volume commands.
pub const VOLUME_STEP: i8 = 5;

/// Commands that act on one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "volume", rename_all = "snake_case")]
pub enum PlayerCommand {
    Pause,
    Resume,
    Next,
    Previous,
    Stop,
    VolumeUp,
    VolumeDown,
    VolumeSet(u8),
    Mute,
    Unmute,
    IdentifyTrack,
}

impl PlayerCommand {
    /// Parse a player command name as used in URLs.
    ///
    /// `volume_set` needs `volume`; the quarter/half/three_quarters/max
    /// shortcuts set fixed levels.
    pub fn parse(name: &str, volume: Option<u8>) -> Option<Self> {
        let command = match name {
            "pause" => PlayerCommand::Pause,
            "resume" => PlayerCommand::Resume,
            "next" | "next_track" => PlayerCommand::Next,
            "previous" | "previous_track" => PlayerCommand::Previous,
            "stop" => PlayerCommand::Stop,
            "volume_up" => PlayerCommand::VolumeUp,
            "volume_down" => PlayerCommand::VolumeDown,
            "volume_set" => PlayerCommand::VolumeSet(volume.filter(|v| *v <= 100)?),
            "volume_quarter" => PlayerCommand::VolumeSet(25),
            "volume_half" => PlayerCommand::VolumeSet(50),
            "volume_three_quarters" => PlayerCommand::VolumeSet(75),
            "volume_max" => PlayerCommand::VolumeSet(100),
            "mute" => PlayerCommand::Mute,
            "unmute" => PlayerCommand::Unmute,
            "identify" | "identify_track" => PlayerCommand::IdentifyTrack,
            _ => return None,
        };
        Some(command)
    }
}

/// Transport intents: a player command, or a library cache check that needs
/// no player.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportCommand {
    Player(PlayerCommand),
    UpdateCache,
}

impl TransportCommand {
    /// Parse a command name as used in URLs.
    pub fn parse(name: &str, volume: Option<u8>) -> Option<Self> {
        if name == "update_cache" {
            return Some(TransportCommand::UpdateCache);
        }
        PlayerCommand::parse(name, volume).map(TransportCommand::Player)
    }
}

impl From<PlayerCommand> for TransportCommand {
    fn from(command: PlayerCommand) -> Self {
        TransportCommand::Player(command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        assert_eq!(
            TransportCommand::parse("pause", None),
            Some(TransportCommand::Player(PlayerCommand::Pause))
        );
        assert_eq!(
            TransportCommand::parse("next_track", None),
            Some(PlayerCommand::Next.into())
        );
        assert_eq!(
            TransportCommand::parse("volume_half", None),
            Some(PlayerCommand::VolumeSet(50).into())
        );
        assert_eq!(TransportCommand::parse("rewind", None), None);
    }

    #[test]
    fn test_volume_set_requires_valid_level() {
        assert_eq!(
            PlayerCommand::parse("volume_set", Some(30)),
            Some(PlayerCommand::VolumeSet(30))
        );
        assert_eq!(PlayerCommand::parse("volume_set", None), None);
        assert_eq!(PlayerCommand::parse("volume_set", Some(101)), None);
    }

    #[test]
    fn test_update_cache_is_not_a_player_command() {
        assert_eq!(
            TransportCommand::parse("update_cache", None),
            Some(TransportCommand::UpdateCache)
        );
        assert_eq!(PlayerCommand::parse("update_cache", None), None);
    }
}
