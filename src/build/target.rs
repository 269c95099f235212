//! Output target templates and build context.

use std::path::{
    Path,
    PathBuf,
};

use super::types::BuildError;

/// Default template of the intermediate keysets artifact.
pub const KEYSETS_TARGET: &str = "?.keysets.{lang}.js";

/// Default template of the final language bundle.
pub const LANG_TARGET: &str = "?.lang.{lang}.js";

/// Expands a target template: `?` → stem, `{lang}` → language.
#[must_use]
pub fn expand_target(template: &str, stem: &str, lang: &str) -> String {
    template.replace('?', stem).replace("{lang}", lang)
}

/// Location and naming stem of one build node's output artifacts.
#[derive(Debug, Clone)]
pub struct BuildContext {
    /// Directory the artifacts are written into.
    out_dir: PathBuf,
    /// Stem substituted for `?` in target templates.
    stem: String,
}

impl BuildContext {
    /// Creates a context whose stem is the output directory name.
    #[must_use]
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        let out_dir = out_dir.into();
        let stem = out_dir
            .file_name()
            .map_or_else(|| "bundle".to_string(), |name| name.to_string_lossy().into_owned());
        Self { out_dir, stem }
    }

    /// Creates a context with an explicit stem.
    #[must_use]
    pub fn with_stem(out_dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
        Self { out_dir: out_dir.into(), stem: stem.into() }
    }

    /// Resolves a target template against this context.
    #[must_use]
    pub fn target_path(&self, template: &str, lang: &str) -> PathBuf {
        self.out_dir.join(expand_target(template, &self.stem, lang))
    }
}

/// Writes one fully assembled target file.
///
/// Content is only ever written after a stage succeeded completely, so a
/// plain write keeps the no-partial-output guarantee.
pub(super) async fn write_target(path: &Path, content: &str) -> Result<(), BuildError> {
    tokio::fs::write(path, content).await.map_err(|source| BuildError::Write {
        path: path.display().to_string(),
        source,
    })
}
