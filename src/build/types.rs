//! Build step type definitions.

use thiserror::Error;

use crate::compose::ComposeError;
use crate::config::ConfigError;
use crate::input::LoadError;
use crate::merge::MergeError;

/// Options of the keyset merge step.
#[derive(Debug, Clone)]
pub struct MergeKeysetsOptions {
    /// Target template override; `?.keysets.{lang}.js` when unset.
    pub target: Option<String>,
    /// Language to merge fragments for (required).
    pub lang: String,
}

/// Options of the language bundle step.
#[derive(Debug, Clone)]
pub struct LangBundleOptions {
    /// Target template override; `?.lang.{lang}.js` when unset.
    pub target: Option<String>,
    /// Template of the consumed keysets artifact; the merge step's default
    /// when unset.
    pub keysets_target: Option<String>,
    /// Language to build the bundle for (required).
    pub lang: String,
}

/// Defines errors that may fail a build step
#[derive(Error, Debug)]
pub enum BuildError {
    /// Error while loading workspace configuration
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// Error while discovering or loading a source fragment
    #[error(transparent)]
    Load(#[from] LoadError),
    /// Error while merging fragments
    #[error(transparent)]
    Merge(#[from] MergeError),
    /// Error while composing the bundle
    #[error(transparent)]
    Compose(#[from] ComposeError),
    /// Error while encoding or decoding the keysets artifact
    #[error("Invalid keysets artifact: {0}")]
    Artifact(#[from] serde_json::Error),
    /// Error while writing a target file
    #[error("Failed to write target '{path}': {source}")]
    Write {
        /// Target path that failed to write.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
