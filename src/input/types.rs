//! Input layer type definitions.

use std::path::PathBuf;

use thiserror::Error;

/// One file inside a contributing translation directory.
///
/// Only the name (for the `<language>.<ext>` filter) and the full path
/// (for loading) are ever consumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FragmentFile {
    /// File name without any directory components.
    pub name: String,
    /// Full path used for loading.
    pub path: PathBuf,
}

/// One contributing translation directory with its immediate files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirListing {
    /// Path of the directory itself.
    pub path: PathBuf,
    /// Immediate files, name-sorted.
    pub files: Vec<FragmentFile>,
}

/// Defines errors that may occur while discovering or loading fragments
#[derive(Error, Debug)]
pub enum LoadError {
    /// Error when failing to read a file or directory
    #[error("Failed to read '{path}': {source}")]
    Io {
        /// Path that failed to read.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// Error when a fragment payload fails to parse
    #[error("Failed to parse '{path}': {message}")]
    Parse {
        /// Path of the malformed file.
        path: String,
        /// Parser diagnostic.
        message: String,
    },
    /// Error when a discovery glob pattern is invalid
    #[error("Invalid exclude pattern '{pattern}': {message}")]
    Pattern {
        /// The offending pattern.
        pattern: String,
        /// Parser diagnostic.
        message: String,
    },
}
