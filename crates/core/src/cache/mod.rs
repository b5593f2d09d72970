//! Catalog cache manager.
//!
//! Keeps a compressed snapshot of the full library listing on disk together
//! with the derived library sections and the signature they were built from.
//! The signature is the library's aggregate duration: cheap to query, but two
//! libraries of equal total duration are indistinguishable and a stale cache
//! can be served in that case.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::CacheConfig;
use crate::index::{build_library_sections, LibraryBuild, SourceIndex};
use crate::metrics::CACHE_REFRESHES;
use crate::rpc::{MediaServer, RawTrack, RpcError};

/// Flat library listing.
pub const CATALOG_FILE: &str = "library_cache.json.zst";
/// Derived artist/album/title/genre sections.
pub const SECTIONS_FILE: &str = "sources_cache.json.zst";
/// Signature of the persisted listing.
pub const SIGNATURE_FILE: &str = "library_total_duration.json.zst";

const COMPRESSION_LEVEL: i32 = 3;

/// Errors from cache persistence.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Corrupt cache file {path}: {message}")]
    Corrupt { path: PathBuf, message: String },

    #[error("Failed to encode cache file {path}: {message}")]
    Encode { path: PathBuf, message: String },

    #[error("Media server error: {0}")]
    Rpc(#[from] RpcError),
}

/// Owns the on-disk catalog snapshot.
pub struct CatalogCache {
    server: Arc<dyn MediaServer>,
    dir: PathBuf,
    min_file_bytes: u64,
}

impl CatalogCache {
    pub fn new(server: Arc<dyn MediaServer>, config: &CacheConfig) -> Self {
        Self {
            server,
            dir: config.dir.clone(),
            min_file_bytes: config.min_file_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Refresh the snapshot when the server's signature differs from the
    /// stored one or the stored files are placeholders.
    ///
    /// Returns `true` when a full fetch happened.
    pub async fn ensure_fresh(&self) -> Result<bool, CacheError> {
        let result = self.refresh_if_stale().await;
        let outcome = match &result {
            Ok(true) => "refreshed",
            Ok(false) => "fresh",
            Err(_) => "failed",
        };
        CACHE_REFRESHES.with_label_values(&[outcome]).inc();
        result
    }

    async fn refresh_if_stale(&self) -> Result<bool, CacheError> {
        let current = self.server.get_catalog_signature().await?;

        let stored = match self.stored_signature().await {
            Ok(signature) => Some(signature),
            Err(e) => {
                warn!("No usable cache signature, treating cache as stale: {}", e);
                None
            }
        };
        let populated = self.is_populated().await;

        if stored == Some(current) && populated {
            info!("Library cache is up to date (signature {})", current);
            return Ok(false);
        }

        info!(
            "Refreshing library cache (stored signature {:?}, server {}, populated {})",
            stored, current, populated
        );

        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| CacheError::Io {
                path: self.dir.clone(),
                source,
            })?;

        let tracks = self.server.fetch_full_catalog().await?;
        let build = build_library_sections(&tracks);

        self.write_json(CATALOG_FILE, &tracks).await?;
        self.write_json(SECTIONS_FILE, &build.index).await?;
        // Written last so an interrupted refresh is retried next time.
        self.write_json(SIGNATURE_FILE, &current).await?;

        info!("Library cache refreshed with {} tracks", tracks.len());
        Ok(true)
    }

    /// Load the library sections from disk.
    ///
    /// Falls back to rebuilding from the flat listing when the derived file is
    /// unusable, and to empty sections when both are. Never fails.
    pub async fn load_library(&self) -> LibraryBuild {
        match self.read_json::<SourceIndex>(SECTIONS_FILE).await {
            Ok(index) => {
                debug!("Loaded library sections from {}", SECTIONS_FILE);
                return LibraryBuild {
                    index,
                    failures: Vec::new(),
                };
            }
            Err(e) => warn!("Library sections unavailable, rebuilding: {}", e),
        }

        match self.read_json::<Vec<RawTrack>>(CATALOG_FILE).await {
            Ok(tracks) => build_library_sections(&tracks),
            Err(e) => {
                warn!("Library cache unavailable, library sections left empty: {}", e);
                LibraryBuild::default()
            }
        }
    }

    /// Signature the current snapshot was built from.
    pub async fn stored_signature(&self) -> Result<f64, CacheError> {
        self.read_json(SIGNATURE_FILE).await
    }

    /// Both data files exist and exceed the placeholder size.
    async fn is_populated(&self) -> bool {
        for name in [CATALOG_FILE, SECTIONS_FILE] {
            let path = self.dir.join(name);
            match tokio::fs::metadata(&path).await {
                Ok(meta) if meta.len() > self.min_file_bytes => {}
                Ok(meta) => {
                    debug!("{} is only {} bytes", path.display(), meta.len());
                    return false;
                }
                Err(_) => return false,
            }
        }
        true
    }

    async fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<T, CacheError> {
        let path = self.dir.join(name);
        let compressed = tokio::fs::read(&path)
            .await
            .map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;

        let json = zstd::decode_all(compressed.as_slice()).map_err(|e| CacheError::Corrupt {
            path: path.clone(),
            message: e.to_string(),
        })?;

        serde_json::from_slice(&json).map_err(|e| CacheError::Corrupt {
            path,
            message: e.to_string(),
        })
    }

    async fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<(), CacheError> {
        let path = self.dir.join(name);
        let encode_error = |message: String| CacheError::Encode {
            path: path.clone(),
            message,
        };

        let json = serde_json::to_vec(value).map_err(|e| encode_error(e.to_string()))?;
        let compressed = zstd::encode_all(json.as_slice(), COMPRESSION_LEVEL)
            .map_err(|e| encode_error(e.to_string()))?;

        // Replace atomically so readers never see a truncated file.
        let tmp = path.with_extension("tmp");
        tokio::fs::write(&tmp, &compressed)
            .await
            .map_err(|source| CacheError::Io {
                path: tmp.clone(),
                source,
            })?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|source| CacheError::Io {
                path: path.clone(),
                source,
            })?;

        debug!("Wrote {} ({} bytes)", path.display(), compressed.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::{EntityType, SourceRecord};
    use crate::testing::{fixtures, MockMediaServer};
    use tempfile::TempDir;

    fn setup(dir: &TempDir) -> (Arc<MockMediaServer>, CatalogCache) {
        let server = Arc::new(MockMediaServer::new());
        let config = CacheConfig {
            dir: dir.path().join("cache"),
            min_file_bytes: 26,
        };
        let cache = CatalogCache::new(server.clone(), &config);
        (server, cache)
    }

    #[tokio::test]
    async fn test_first_call_fetches_and_persists() {
        let dir = TempDir::new().unwrap();
        let (server, cache) = setup(&dir);
        server.set_catalog(fixtures::beatles_catalog(), 1234.5).await;

        assert!(cache.ensure_fresh().await.unwrap());
        assert_eq!(server.full_fetch_count().await, 1);
        assert_eq!(cache.stored_signature().await.unwrap(), 1234.5);

        for name in [CATALOG_FILE, SECTIONS_FILE, SIGNATURE_FILE] {
            assert!(cache.dir().join(name).exists(), "{} missing", name);
        }
    }

    #[tokio::test]
    async fn test_unchanged_signature_skips_second_fetch() {
        let dir = TempDir::new().unwrap();
        let (server, cache) = setup(&dir);
        server.set_catalog(fixtures::beatles_catalog(), 1234.5).await;

        assert!(cache.ensure_fresh().await.unwrap());
        assert!(!cache.ensure_fresh().await.unwrap());
        assert_eq!(server.full_fetch_count().await, 1);
    }

    #[tokio::test]
    async fn test_changed_signature_refetches() {
        let dir = TempDir::new().unwrap();
        let (server, cache) = setup(&dir);
        server.set_catalog(fixtures::beatles_catalog(), 1234.5).await;
        tokio_test::assert_ok!(cache.ensure_fresh().await);

        server.set_catalog(fixtures::beatles_catalog(), 999.0).await;
        assert!(cache.ensure_fresh().await.unwrap());
        assert_eq!(server.full_fetch_count().await, 2);
    }

    #[tokio::test]
    async fn test_placeholder_file_forces_refetch() {
        let dir = TempDir::new().unwrap();
        let (server, cache) = setup(&dir);
        server.set_catalog(fixtures::beatles_catalog(), 1234.5).await;
        tokio_test::assert_ok!(cache.ensure_fresh().await);

        std::fs::write(cache.dir().join(CATALOG_FILE), [0u8; 10]).unwrap();

        assert!(cache.ensure_fresh().await.unwrap());
        assert!(!cache.ensure_fresh().await.unwrap());
        assert_eq!(server.full_fetch_count().await, 2);
    }

    #[tokio::test]
    async fn test_missing_signature_file_self_heals() {
        let dir = TempDir::new().unwrap();
        let (server, cache) = setup(&dir);
        server.set_catalog(fixtures::beatles_catalog(), 1234.5).await;
        tokio_test::assert_ok!(cache.ensure_fresh().await);

        std::fs::remove_file(cache.dir().join(SIGNATURE_FILE)).unwrap();

        assert!(cache.ensure_fresh().await.unwrap());
        assert_eq!(cache.stored_signature().await.unwrap(), 1234.5);
    }

    #[tokio::test]
    async fn test_load_library_reads_sections() {
        let dir = TempDir::new().unwrap();
        let (server, cache) = setup(&dir);
        server.set_catalog(fixtures::beatles_catalog(), 1234.5).await;
        tokio_test::assert_ok!(cache.ensure_fresh().await);

        let build = cache.load_library().await;
        assert!(build.failures.is_empty());
        assert!(matches!(
            build.index.get(EntityType::Album, "Help! by The Beatles"),
            Some(SourceRecord::Album(_))
        ));
    }

    #[tokio::test]
    async fn test_load_library_rebuilds_from_listing() {
        let dir = TempDir::new().unwrap();
        let (server, cache) = setup(&dir);
        server.set_catalog(fixtures::beatles_catalog(), 1234.5).await;
        tokio_test::assert_ok!(cache.ensure_fresh().await);

        std::fs::write(cache.dir().join(SECTIONS_FILE), b"not zstd").unwrap();

        let build = cache.load_library().await;
        assert!(build.index.len(EntityType::Title) > 0);
    }

    #[tokio::test]
    async fn test_load_library_without_cache_is_empty() {
        let dir = TempDir::new().unwrap();
        let (_server, cache) = setup(&dir);

        let build = cache.load_library().await;
        for entity_type in EntityType::LIBRARY {
            assert!(build.index.is_empty(entity_type));
        }
    }

    #[tokio::test]
    async fn test_signature_failure_is_an_error() {
        let dir = TempDir::new().unwrap();
        let (server, cache) = setup(&dir);
        server.set_next_error(RpcError::Timeout).await;

        let result = cache.ensure_fresh().await;
        assert!(matches!(result, Err(CacheError::Rpc(RpcError::Timeout))));
        assert_eq!(server.full_fetch_count().await, 0);
    }
}
