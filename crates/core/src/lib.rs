pub mod cache;
pub mod config;
pub mod dispatcher;
pub mod index;
pub mod matcher;
pub mod metrics;
pub mod resolver;
pub mod rpc;
pub mod skill;
pub mod testing;

pub use cache::{CacheError, CatalogCache};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use dispatcher::{DispatchOutcome, PlaybackDispatcher};
pub use index::{
    EntityType, EntryError, EntryFailure, IndexHandle, LoadOutcome, LoadSummary, SourceIndex,
    SourceLoader, SourceRecord,
};
pub use matcher::{best_match, FuzzyMatch};
pub use resolver::{
    ConfidenceTier, PhraseResolver, PlaybackTarget, RegexRecognizer, Recognizer, ResolvedQuery,
};
pub use rpc::{LmsClient, MediaServer, Player, RpcError};
pub use skill::{
    Dialog, Feedback, MediaSkill, PlayerCommand, SkillError, StartReport, TransportCommand,
};
