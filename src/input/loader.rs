//! Loadable-module parsing with an in-process cache.
//!
//! Keyset fragments and the intermediate keysets artifact are both
//! "loadable modules": a file whose sole export is a JSON-equivalent value,
//! written either as a bare payload or as `module.exports = <payload>;`.
//! Parsed values are cached per path until explicitly invalidated, which is
//! what lets the rebuild cache force a genuine re-read after an artifact is
//! rewritten in place.

use std::collections::HashMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use serde_json::Value;
use tokio::sync::RwLock;

use super::types::LoadError;

/// Prefix of the module wrapper emitted by the merge stage.
const MODULE_EXPORTS: &str = "module.exports";

/// Asynchronous module loader with an explicitly invalidatable parse cache.
#[derive(Debug, Clone, Default)]
pub struct ModuleLoader {
    /// Last parsed value per path, valid until invalidated.
    cache: Arc<RwLock<HashMap<PathBuf, Arc<Value>>>>,
}

impl ModuleLoader {
    /// Creates a loader with an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self { cache: Arc::new(RwLock::new(HashMap::new())) }
    }

    /// Loads the exported value of the module at `path`.
    ///
    /// A previously parsed value for the same path is reused, even if the
    /// file changed on disk since; call [`Self::invalidate`] first to force
    /// a fresh read.
    ///
    /// # Errors
    /// - File read error
    /// - Payload parse error
    pub async fn load(&self, path: &Path) -> Result<Arc<Value>, LoadError> {
        if let Some(value) = self.cache.read().await.get(path) {
            return Ok(Arc::clone(value));
        }

        let content = tokio::fs::read_to_string(path).await.map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let value = Arc::new(parse_module_source(&content).map_err(|message| {
            LoadError::Parse { path: path.display().to_string(), message }
        })?);

        self.cache.write().await.insert(path.to_path_buf(), Arc::clone(&value));
        tracing::debug!(path = %path.display(), "Loaded module");
        Ok(value)
    }

    /// Discards any cached parse of exactly `path`.
    pub async fn invalidate(&self, path: &Path) {
        if self.cache.write().await.remove(path).is_some() {
            tracing::debug!(path = %path.display(), "Invalidated cached module");
        }
    }
}

/// Parses a loadable-module source into its exported value.
///
/// Accepts either a bare JSONC payload or a `module.exports = <payload>;`
/// wrapper. Comments and trailing commas are allowed so hand-maintained
/// fragment files stay editable.
pub(crate) fn parse_module_source(source: &str) -> Result<Value, String> {
    let trimmed = source.trim();

    let payload = if let Some(rest) = trimmed.strip_prefix(MODULE_EXPORTS) {
        let rest = rest.trim_start();
        let Some(rest) = rest.strip_prefix('=') else {
            return Err(format!("expected '=' after '{MODULE_EXPORTS}'"));
        };
        rest.trim_end().strip_suffix(';').unwrap_or(rest).trim()
    } else {
        trimmed
    };

    let parsed = jsonc_parser::parse_to_serde_value(payload, &jsonc_parser::ParseOptions::default())
        .map_err(|e| e.to_string())?;
    parsed.ok_or_else(|| "module payload is empty".to_string())
}
