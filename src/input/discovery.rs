//! Discovery of contributing translation directories.
//!
//! Source roots are visited in the caller-supplied order; inside a root the
//! walk is name-sorted so the merge order stays stable across platforms.

use std::path::{
    Path,
    PathBuf,
};

use globset::{
    Glob,
    GlobSet,
    GlobSetBuilder,
};
use ignore::WalkBuilder;

use super::types::{
    DirListing,
    FragmentFile,
    LoadError,
};

/// Finds every `<dir_suffix>` directory under the given roots.
///
/// Returned listings preserve root order; directories within a root and
/// files within a directory are name-sorted.
///
/// # Errors
/// - Invalid exclude pattern
/// - Directory read error while listing a discovered directory
pub fn find_fragment_dirs(
    roots: &[PathBuf],
    dir_suffix: &str,
    exclude_patterns: &[String],
) -> Result<Vec<DirListing>, LoadError> {
    let exclude_set = build_exclude_set(exclude_patterns)?;

    let mut listings = Vec::new();
    for root in roots {
        for dir in find_dirs_in_root(root, dir_suffix, &exclude_set) {
            listings.push(DirListing { files: list_fragment_files(&dir)?, path: dir });
        }
    }

    tracing::debug!(dirs = listings.len(), "Discovered translation directories");
    Ok(listings)
}

/// Builds the exclusion set from the configured glob patterns.
fn build_exclude_set(exclude_patterns: &[String]) -> Result<GlobSet, LoadError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in exclude_patterns {
        let glob = Glob::new(pattern).map_err(|e| LoadError::Pattern {
            pattern: pattern.clone(),
            message: e.to_string(),
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|e| LoadError::Pattern {
        pattern: exclude_patterns.join(", "),
        message: e.to_string(),
    })
}

/// Walks one root and collects matching directories in sorted order.
fn find_dirs_in_root(root: &Path, dir_suffix: &str, exclude_set: &GlobSet) -> Vec<PathBuf> {
    let mut dirs = Vec::new();

    for result in WalkBuilder::new(root)
        .hidden(false)
        .git_ignore(true)
        .git_global(true)
        .git_exclude(true)
        .follow_links(false)
        .sort_by_file_name(std::cmp::Ord::cmp)
        .build()
    {
        let entry = match result {
            Ok(entry) => entry,
            Err(err) => {
                tracing::debug!(?err, "Failed to read directory entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
            continue;
        }

        let path = entry.path();
        let Some(name) = path.file_name().and_then(|name| name.to_str()) else {
            continue;
        };
        if !name.ends_with(dir_suffix) {
            continue;
        }

        let Ok(relative_path) = path.strip_prefix(root) else {
            continue;
        };
        if exclude_set.is_match(relative_path) {
            continue;
        }

        dirs.push(path.to_path_buf());
    }

    dirs
}

/// Lists the immediate files of one directory, name-sorted.
fn list_fragment_files(dir: &Path) -> Result<Vec<FragmentFile>, LoadError> {
    let entries = std::fs::read_dir(dir).map_err(|source| LoadError::Io {
        path: dir.display().to_string(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| LoadError::Io {
            path: dir.display().to_string(),
            source,
        })?;
        if !entry.file_type().is_ok_and(|ft| ft.is_file()) {
            continue;
        }
        files.push(FragmentFile {
            name: entry.file_name().to_string_lossy().into_owned(),
            path: entry.path(),
        });
    }

    files.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(files)
}
