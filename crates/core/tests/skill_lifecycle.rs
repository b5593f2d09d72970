//! Media skill lifecycle integration tests.
//!
//! These tests drive the skill the way a voice assistant host does:
//! initialize -> match phrase -> start, plus transport commands and cache
//! updates, against a mock media server.

use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;

use squeezer_core::{
    load_config_from_str,
    resolver::ResolutionPath,
    rpc::NowPlaying,
    testing::{fixtures, MockMediaServer, RecordedCall},
    Config, ConfidenceTier, Dialog, DispatchOutcome, EntityType, MediaSkill, PlaybackTarget,
    PlayerCommand, RpcError, SkillError, TransportCommand,
};

const KITCHEN: &str = "aa:aa:aa:aa:aa:aa";
const LIVING_ROOM: &str = "bb:bb:bb:bb:bb:bb";

/// Test helper owning the mock server and the cache directory.
struct TestHarness {
    server: Arc<MockMediaServer>,
    config: Config,
    _temp_dir: TempDir,
}

impl TestHarness {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let config = load_config_from_str(&format!(
            r#"
[server]
host = "lms.local"

[player]
default_player_name = "Living Room"

[cache]
dir = "{}"
"#,
            temp_dir.path().join("cache").display()
        ))
        .expect("Failed to parse config");

        let server = Arc::new(MockMediaServer::new());
        server.set_players(fixtures::roster()).await;
        server.set_catalog(fixtures::beatles_catalog(), 1234.5).await;
        server.set_favorites(fixtures::favorites()).await;
        server.set_playlists(fixtures::playlists()).await;
        server.set_podcasts(fixtures::podcasts()).await;

        Self {
            server,
            config,
            _temp_dir: temp_dir,
        }
    }

    async fn skill(&self) -> MediaSkill {
        MediaSkill::initialize(&self.config, self.server.clone())
            .await
            .expect("Failed to initialize skill")
    }
}

#[tokio::test]
async fn test_initialize_indexes_every_source() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;

    let index = skill.index().snapshot().await;
    assert!(index.get(EntityType::Artist, "The Beatles").is_some());
    assert!(index.get(EntityType::Album, "Abbey Road by The Beatles").is_some());
    assert!(index.get(EntityType::Favorite, "Radio Paradise").is_some());
    assert!(index.get(EntityType::Playlist, "Dinner Jazz").is_some());
    assert!(index.get(EntityType::Podcast, "Daily News").is_some());

    // Filtered entries are not failures.
    let summary = skill.last_load().await.expect("No load summary");
    assert!(summary.failures.is_empty());
    assert_eq!(summary.counts[&EntityType::Favorite], 1);
    assert_eq!(summary.counts[&EntityType::Podcast], 1);

    // Podcasts are listed through the default player.
    assert!(harness
        .server
        .recorded_calls()
        .await
        .contains(&RecordedCall::ListPodcasts {
            player: LIVING_ROOM.to_string()
        }));
}

#[tokio::test]
async fn test_duplicate_title_keeps_first_track() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;
    let index = skill.index().snapshot().await;

    for key in ["Yesterday", "Yesterday by The Beatles"] {
        match PlaybackTarget::from_record(key, index.get(EntityType::Title, key).unwrap()) {
            PlaybackTarget::Title { track_id, .. } => assert_eq!(track_id, "2"),
            other => panic!("unexpected target {:?}", other),
        }
    }
}

#[tokio::test]
async fn test_album_on_named_speaker() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;
    harness.server.clear_calls().await;

    let query = skill
        .match_phrase("the album abbey road on the kitchen speaker")
        .await
        .expect("No match");
    assert_eq!(query.matched_name.as_deref(), Some("Abbey Road"));
    assert_eq!(query.tier, ConfidenceTier::Exact);
    assert_eq!(query.player.as_ref().map(|p| p.id.as_str()), Some(KITCHEN));

    let report = skill.start(&query).await;
    assert_eq!(report.feedback.dialog, Dialog::Playing);
    assert_eq!(report.feedback.data["backend"], Value::from("Kitchen Speaker"));
    assert_eq!(report.dispatch, Some(DispatchOutcome::Started));

    assert_eq!(
        harness.server.control_calls().await.last(),
        Some(&RecordedCall::PlayByAlbum {
            player: KITCHEN.to_string(),
            album_id: "al-abbey-road".to_string()
        })
    );
}

#[tokio::test]
async fn test_generic_query_uses_default_player() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;

    let query = skill.match_phrase("radio paradise").await.expect("No match");
    assert_eq!(query.path, ResolutionPath::Generic);
    assert_eq!(
        query.target,
        PlaybackTarget::Favorite {
            id: "f.1".to_string()
        }
    );
    assert_eq!(
        query.player.as_ref().map(|p| p.id.as_str()),
        Some(LIVING_ROOM)
    );
}

#[tokio::test]
async fn test_unknown_speaker_reports_player_not_found() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;

    let query = skill
        .match_phrase("the album help on the xyz123 speaker")
        .await
        .expect("No match");
    assert_eq!(query.backend.as_deref(), Some("xyz123"));
    assert!(query.player.is_none());

    harness.server.clear_calls().await;
    let report = skill.start(&query).await;
    assert_eq!(report.feedback.dialog, Dialog::PlayerNotFound);
    assert_eq!(report.feedback.data["backend"], Value::from("xyz123"));
    assert!(report.dispatch.is_none());
    assert!(harness.server.control_calls().await.is_empty());
}

#[tokio::test]
async fn test_continuation_resumes_default_player() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;

    let query = skill.match_phrase("squeezebox").await.expect("No match");
    assert_eq!(query.target, PlaybackTarget::Continue);

    harness.server.clear_calls().await;
    skill.start(&query).await;
    assert_eq!(
        harness.server.control_calls().await,
        vec![RecordedCall::Play {
            player: LIVING_ROOM.to_string()
        }]
    );
}

#[tokio::test]
async fn test_dispatch_failure_keeps_optimistic_feedback() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;
    let query = skill.match_phrase("the playlist morning mix").await.unwrap();

    harness
        .server
        .fail_operation("play_named_playlist", RpcError::Timeout)
        .await;
    let report = skill.start(&query).await;

    assert_eq!(report.feedback.dialog, Dialog::Playing);
    assert!(matches!(
        report.dispatch,
        Some(DispatchOutcome::Failed { ref operation, .. }) if operation == "play_named_playlist"
    ));
}

#[tokio::test]
async fn test_unmatched_phrase_returns_none() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;
    assert!(skill.match_phrase("zzzzqqqq").await.is_none());
}

#[tokio::test]
async fn test_cache_is_fetched_once_across_restarts() {
    let harness = TestHarness::new().await;
    let _first = harness.skill().await;
    let _second = harness.skill().await;

    assert_eq!(harness.server.full_fetch_count().await, 1);
}

#[tokio::test]
async fn test_update_cache_reloads_index_on_change() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;

    let feedback = skill.update_cache().await.unwrap();
    assert_eq!(feedback.dialog, Dialog::CacheNotUpdated);

    let mut catalog = fixtures::beatles_catalog();
    catalog.push(fixtures::raw_track(7, "Bohemian Rhapsody", "Queen", "A Night at the Opera"));
    harness.server.set_catalog(catalog, 1588.5).await;

    let feedback = skill
        .handle_command(TransportCommand::UpdateCache, None)
        .await
        .unwrap();
    assert_eq!(feedback.dialog, Dialog::CacheUpdated);
    assert_eq!(feedback.sound.as_deref(), Some("cacheupdated.wav"));

    let index = skill.index().snapshot().await;
    assert!(index.get(EntityType::Artist, "Queen").is_some());
}

#[tokio::test]
async fn test_update_cache_command_needs_no_player() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;
    harness.server.set_players(Vec::new()).await;
    harness.server.clear_calls().await;

    let feedback = skill
        .handle_command(TransportCommand::UpdateCache, Some("xyz123"))
        .await
        .unwrap();

    assert_eq!(feedback.dialog, Dialog::CacheNotUpdated);
    assert!(!harness
        .server
        .recorded_calls()
        .await
        .contains(&RecordedCall::ListPlayers));
}

#[tokio::test]
async fn test_volume_commands_report_volume() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;

    let feedback = skill
        .handle_command(PlayerCommand::VolumeUp, Some("kitchen"))
        .await
        .unwrap();
    assert_eq!(feedback.dialog, Dialog::VolumeUp);
    assert_eq!(feedback.data["volume"], Value::from(55));

    let feedback = skill
        .handle_command(PlayerCommand::VolumeSet(25), None)
        .await
        .unwrap();
    assert_eq!(feedback.dialog, Dialog::VolumeSet);
    assert_eq!(feedback.data["volume"], Value::from(25));
}

#[tokio::test]
async fn test_transport_commands_target_resolved_player() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;
    harness.server.clear_calls().await;

    let feedback = skill
        .handle_command(PlayerCommand::Next, Some("kitchen"))
        .await
        .unwrap();
    assert_eq!(feedback.dialog, Dialog::NextTrack);
    assert_eq!(
        harness.server.control_calls().await,
        vec![RecordedCall::Next {
            player: KITCHEN.to_string()
        }]
    );

    let feedback = skill
        .handle_command(PlayerCommand::Pause, Some("xyz123"))
        .await
        .unwrap();
    assert_eq!(feedback.dialog, Dialog::PlayerNotFound);
}

#[tokio::test]
async fn test_identify_track() {
    let harness = TestHarness::new().await;
    let skill = harness.skill().await;

    let feedback = skill
        .handle_command(PlayerCommand::IdentifyTrack, None)
        .await
        .unwrap();
    assert_eq!(feedback.dialog, Dialog::IdentifyNoPlay);
    assert_eq!(feedback.data["mode"], Value::from("stop"));
    assert!(feedback.prefer_speech);

    harness
        .server
        .set_now_playing(NowPlaying {
            title: Some("Something".to_string()),
            artist: Some("The Beatles".to_string()),
            mode: "play".to_string(),
        })
        .await;
    let feedback = skill
        .handle_command(PlayerCommand::IdentifyTrack, None)
        .await
        .unwrap();
    assert_eq!(feedback.dialog, Dialog::Identify);
    assert_eq!(feedback.data["artist"], Value::from("The Beatles"));

    harness
        .server
        .set_now_playing(NowPlaying {
            title: Some("Radio Paradise".to_string()),
            artist: None,
            mode: "play".to_string(),
        })
        .await;
    let feedback = skill
        .handle_command(PlayerCommand::IdentifyTrack, None)
        .await
        .unwrap();
    assert_eq!(feedback.dialog, Dialog::IdentifyNoArtist);
}

#[tokio::test]
async fn test_invalid_config_is_fatal() {
    let mut harness = TestHarness::new().await;
    harness.config.player.default_player_name = String::new();

    let result = MediaSkill::initialize(&harness.config, harness.server.clone()).await;
    assert!(matches!(result, Err(SkillError::Config(_))));
}

#[tokio::test]
async fn test_unreachable_library_degrades_to_live_sources() {
    let harness = TestHarness::new().await;
    harness
        .server
        .fail_operation("get_catalog_signature", RpcError::Timeout)
        .await;

    let skill = harness.skill().await;
    let index = skill.index().snapshot().await;
    assert!(index.is_empty(EntityType::Artist));
    assert!(!index.is_empty(EntityType::Playlist));
}
