// SPDX-License-Identifier: Apache-2.0

//! TTL-based file cache for per-file analysis results.
//!
//! Entries are JSON files named after a SHA-256 key derived from the crate
//! version, the effective settings, the file path and the file content, so
//! any change to one of them misses the cache.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::NeatcommitError;

/// A cached entry with metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    /// The cached data.
    pub data: T,
    /// When the entry was cached.
    pub cached_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    /// Create a new cache entry stamped with the current time.
    pub fn new(data: T) -> Self {
        Self {
            data,
            cached_at: Utc::now(),
        }
    }

    /// `true` if the entry is within its TTL, `false` if expired.
    pub fn is_valid(&self, ttl: Duration) -> bool {
        Utc::now().signed_duration_since(self.cached_at) < ttl
    }
}

/// Generate the cache key for one analyzed file.
///
/// `settings` is any stable serialization of the configuration that
/// influences the result.
#[must_use]
pub fn cache_key(settings: &str, file_path: &str, content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(env!("CARGO_PKG_VERSION").as_bytes());
    hasher.update(b":");
    hasher.update(settings.as_bytes());
    hasher.update(b":");
    hasher.update(file_path.as_bytes());
    hasher.update(b":");
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// On-disk cache rooted at one directory.
#[derive(Debug, Clone)]
pub struct AnalysisCache {
    dir: PathBuf,
    ttl: Duration,
}

impl AnalysisCache {
    /// Creates a cache in `dir` whose entries live for `ttl_hours`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>, ttl_hours: u64) -> Self {
        let hours = i64::try_from(ttl_hours).unwrap_or(i64::MAX);
        Self {
            dir: dir.into(),
            ttl: Duration::try_hours(hours).unwrap_or(Duration::MAX),
        }
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        // Sharded by the first two hex digits of the key.
        let (shard, _) = key.split_at(key.len().min(2));
        self.dir.join(shard).join(format!("{key}.json"))
    }

    /// Reads a cache entry, returning `None` when missing or expired.
    ///
    /// Expired entries are removed from disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, NeatcommitError> {
        let path = self.entry_path(key);

        if !path.exists() {
            return Ok(None);
        }

        let contents = fs::read_to_string(&path).map_err(|source| NeatcommitError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let entry: CacheEntry<T> =
            serde_json::from_str(&contents).map_err(|e| NeatcommitError::Cache {
                message: format!("Failed to parse cache file {}: {e}", path.display()),
            })?;

        if entry.is_valid(self.ttl) {
            Ok(Some(entry.data))
        } else {
            tracing::debug!(key, "Cache entry expired");
            if let Err(e) = fs::remove_file(&path) {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "Failed to remove expired cache entry"
                );
            }
            Ok(None)
        }
    }

    /// Writes a cache entry.
    ///
    /// Creates parent directories if they don't exist. The file is written
    /// to a temporary path and renamed into place.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn put<T: Serialize>(&self, key: &str, data: &T) -> Result<(), NeatcommitError> {
        let path = self.entry_path(key);

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(io_error(parent))?;
        }

        let contents = serde_json::to_string(&CacheEntry::new(data)).map_err(|e| {
            NeatcommitError::Cache {
                message: format!("Failed to serialize cache entry: {e}"),
            }
        })?;

        let temp_path = path.with_extension(format!("{}.tmp", std::process::id()));
        fs::write(&temp_path, contents).map_err(io_error(&temp_path))?;
        fs::rename(&temp_path, &path).map_err(io_error(&path))?;

        Ok(())
    }
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> NeatcommitError + use<> {
    let path = path.display().to_string();
    move |source| NeatcommitError::Io { path, source }
}
