//! Stage 2: language bundle build step.
//!
//! Loads the consolidated keysets artifact — forcing a fresh read when the
//! rebuild cache says the file changed underneath the parse cache — and
//! writes the composed bundle.

use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;

use serde_json::Value;

use super::target::{
    BuildContext,
    KEYSETS_TARGET,
    LANG_TARGET,
    write_target,
};
use super::types::{
    BuildError,
    LangBundleOptions,
};
use crate::cache::RebuildCache;
use crate::compose::BundleComposer;
use crate::config::BundlerSettings;
use crate::input::ModuleLoader;
use crate::types::ConsolidatedKeysets;

/// Compiles a keysets artifact into a language bundle.
#[derive(Debug, Clone)]
pub struct LangBundleTech {
    /// Module loader the artifact is read through.
    loader: ModuleLoader,
    /// Rebuild decisions for this step's output target.
    cache: RebuildCache,
    /// Declaration block assembly.
    composer: BundleComposer,
}

impl LangBundleTech {
    /// Creates the bundle step with its target-scoped rebuild cache.
    #[must_use]
    pub fn new(loader: ModuleLoader, settings: &BundlerSettings, cache: RebuildCache) -> Self {
        Self { loader, cache, composer: BundleComposer::new(settings.registry_global.as_str()) }
    }

    /// Builds the bundle for `options.lang` and returns its path.
    ///
    /// # Errors
    /// - Artifact load or decode failure
    /// - Translation compile failure
    /// - Bundle write failure
    pub async fn build(
        &mut self,
        ctx: &BuildContext,
        options: &LangBundleOptions,
    ) -> Result<PathBuf, BuildError> {
        let lang = &options.lang;
        let keysets_path =
            ctx.target_path(options.keysets_target.as_deref().unwrap_or(KEYSETS_TARGET), lang);

        let payload = self.load_keysets(&keysets_path).await?;
        let keysets: ConsolidatedKeysets = serde_json::from_value((*payload).clone())?;
        let bundle = self.composer.compose(&keysets, lang)?;

        let target = ctx.target_path(options.target.as_deref().unwrap_or(LANG_TARGET), lang);
        write_target(&target, &bundle).await?;
        tracing::debug!(target = %target.display(), "Wrote language bundle");
        Ok(target)
    }

    /// Loads the artifact, bypassing the parse cache when it went stale.
    async fn load_keysets(&mut self, keysets_path: &Path) -> Result<Arc<Value>, BuildError> {
        let cache_key = format!("keysets-file-{}", file_name(keysets_path));

        if self.cache.need_rebuild(&cache_key, keysets_path) {
            // The artifact is rewritten in place between builds; whatever
            // the loader has cached for this path is not trustworthy.
            self.loader.invalidate(keysets_path).await;
            let payload = self.loader.load(keysets_path).await?;
            if let Err(err) = self.cache.record(&cache_key, keysets_path) {
                tracing::warn!(%err, "Failed to record artifact fingerprint");
            }
            return Ok(payload);
        }

        Ok(self.loader.load(keysets_path).await?)
    }
}

/// File name component used as the cache key suffix.
fn file_name(path: &Path) -> String {
    path.file_name().map_or_else(String::new, |name| name.to_string_lossy().into_owned())
}
