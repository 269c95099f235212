//! Stage 1: keyset merge build step.
//!
//! Collects `<lang>.<ext>` fragments from every contributing translation
//! directory and writes the consolidated keysets artifact as a loadable
//! module.

use std::path::PathBuf;

use super::target::{
    BuildContext,
    KEYSETS_TARGET,
    write_target,
};
use super::types::{
    BuildError,
    MergeKeysetsOptions,
};
use crate::config::BundlerSettings;
use crate::input::{
    FragmentFile,
    LoadError,
    ModuleLoader,
    find_fragment_dirs,
};
use crate::merge::{
    LoadedFragment,
    merge_keysets,
};

/// Merges per-language keyset fragments into one artifact.
#[derive(Debug, Clone)]
pub struct MergeKeysetsTech {
    /// Module loader the fragments are read through.
    loader: ModuleLoader,
    /// Workspace settings.
    settings: BundlerSettings,
}

impl MergeKeysetsTech {
    /// Creates the merge step.
    #[must_use]
    pub fn new(loader: ModuleLoader, settings: BundlerSettings) -> Self {
        Self { loader, settings }
    }

    /// Builds the keysets artifact for `options.lang` and returns its path.
    ///
    /// Source roots are scanned in the given order, which together with the
    /// sorted order inside each root defines the merge order. Fragment
    /// loads run concurrently; `try_join_all` re-sequences their results
    /// into listing order and abandons outstanding loads on the first
    /// failure, so nothing is merged out of order and no partial artifact
    /// is ever written.
    ///
    /// # Errors
    /// - Fragment discovery or load failure
    /// - Fragment shape error during the merge
    /// - Artifact write failure
    pub async fn build(
        &self,
        ctx: &BuildContext,
        roots: &[PathBuf],
        options: &MergeKeysetsOptions,
    ) -> Result<PathBuf, BuildError> {
        let lang = &options.lang;
        let fragment_name = self.settings.fragment_file_name(lang);

        let listings =
            find_fragment_dirs(roots, &self.settings.dir_suffix, &self.settings.exclude_patterns)?;
        let files: Vec<FragmentFile> = listings
            .into_iter()
            .flat_map(|listing| listing.files)
            .filter(|file| file.name == fragment_name)
            .collect();
        tracing::debug!(lang, fragments = files.len(), "Merging keyset fragments");

        let fragments =
            futures::future::try_join_all(files.iter().map(|file| self.load_fragment(file)))
                .await?;
        let merged = merge_keysets(&fragments, lang)?;

        let module = format!("module.exports = {};", serde_json::to_string(&merged)?);
        let target = ctx.target_path(options.target.as_deref().unwrap_or(KEYSETS_TARGET), lang);
        write_target(&target, &module).await?;
        tracing::debug!(target = %target.display(), "Wrote keysets artifact");
        Ok(target)
    }

    /// Loads one fragment through the module loader.
    async fn load_fragment(&self, file: &FragmentFile) -> Result<LoadedFragment, LoadError> {
        let payload = self.loader.load(&file.path).await?;
        Ok(LoadedFragment { path: file.path.clone(), payload })
    }
}
