//! Source index.
//!
//! Name-keyed lookup of every playable entity on the media server, built
//! from the cached library listing plus live favorites, playlists and
//! podcasts. Indexes are built whole and published through `IndexHandle`;
//! nothing mutates a published index.

mod handle;
mod library;
mod loader;
mod players;
mod types;

pub use handle::IndexHandle;
pub use library::{build_library_sections, by_artist_key, CatalogEntry, LibraryBuild};
pub use loader::{LoadOutcome, LoadSummary, SourceLoader};
pub use players::{match_player, resolve_player, PLAYER_MATCH_THRESHOLD};
pub use types::*;
