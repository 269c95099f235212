//! Freshness decisions for rebuilt artifacts.
//!
//! Incremental builds rewrite artifact files in place, which breaks the
//! assumption behind per-path parse caches that a path identifies stable
//! content. This cache records a content fingerprint per entry key; a
//! mismatch tells the caller to discard the cached parse for that path and
//! read the file again.

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};

use thiserror::Error;

/// Defines errors that may occur while fingerprinting artifacts
#[derive(Error, Debug)]
pub enum CacheError {
    /// Error when reading the file to fingerprint
    #[error("Failed to fingerprint '{path}': {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

/// Per-target fingerprint cache driving rebuild decisions.
///
/// One instance belongs to exactly one output target and is never shared
/// across concurrent builds of different targets.
#[derive(Debug, Clone)]
pub struct RebuildCache {
    /// Opaque identifier of the owning output target, for diagnostics.
    target: String,
    /// Recorded fingerprint per entry key.
    entries: HashMap<String, (PathBuf, blake3::Hash)>,
}

impl RebuildCache {
    /// Creates an empty cache scoped to one output target.
    #[must_use]
    pub fn new(target: impl Into<String>) -> Self {
        Self { target: target.into(), entries: HashMap::new() }
    }

    /// Decides whether the file behind `key` must be reloaded fresh.
    ///
    /// True when no fingerprint is recorded for `key`, when the recorded
    /// path differs from `path`, or when the file content changed since the
    /// fingerprint was recorded. A fingerprinting failure also answers true:
    /// the cache fails open toward a fresh read, never toward reuse.
    #[must_use]
    pub fn need_rebuild(&self, key: &str, path: &Path) -> bool {
        let Some((recorded_path, recorded)) = self.entries.get(key) else {
            return true;
        };
        if recorded_path != path {
            return true;
        }

        match fingerprint(path) {
            Ok(current) => current != *recorded,
            Err(err) => {
                tracing::warn!(
                    cache_target = %self.target,
                    %err,
                    "Fingerprinting failed, forcing a rebuild"
                );
                true
            }
        }
    }

    /// Records the current fingerprint of `path` under `key`.
    ///
    /// # Errors
    /// - File read error while fingerprinting
    pub fn record(&mut self, key: &str, path: &Path) -> Result<(), CacheError> {
        let digest = fingerprint(path)?;
        self.entries.insert(key.to_string(), (path.to_path_buf(), digest));
        tracing::debug!(cache_target = %self.target, key, "Recorded artifact fingerprint");
        Ok(())
    }
}

/// Content hash of one artifact file.
///
/// Hashing the content keeps the decision sensitive to in-place file
/// replacement even when timestamps do not move.
fn fingerprint(path: &Path) -> Result<blake3::Hash, CacheError> {
    let content = std::fs::read(path).map_err(|source| CacheError::Io {
        path: path.display().to_string(),
        source,
    })?;
    Ok(blake3::hash(&content))
}
