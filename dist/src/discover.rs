//! File discovery helpers shared by the packagers.

use crate::error::{DistError, Result};
use camino::{Utf8Path, Utf8PathBuf};
use glob::Pattern;

/// Regular files under `dir` matching `pattern`, sorted.
///
/// `dir` is escaped before joining, so directory names containing glob
/// metacharacters are matched literally.
///
/// # Errors
///
/// Returns [`DistError::Glob`] if the pattern is invalid or a match cannot
/// be read, and [`DistError::NonUtf8Path`] for non-UTF-8 matches.
pub fn files_matching(dir: &Utf8Path, pattern: &str) -> Result<Vec<Utf8PathBuf>> {
    let full = format!("{}/{pattern}", Pattern::escape(dir.as_str()));
    let entries = glob::glob(&full).map_err(|err| DistError::Glob {
        pattern: full.clone(),
        reason: err.to_string(),
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry.map_err(|err| DistError::Glob {
            pattern: full.clone(),
            reason: err.to_string(),
        })?;
        if !path.is_file() {
            continue;
        }
        files.push(Utf8PathBuf::from_path_buf(path).map_err(DistError::NonUtf8Path)?);
    }
    files.sort();
    Ok(files)
}

/// Every regular file below `dir`, recursively, sorted.
///
/// # Errors
///
/// See [`files_matching`].
pub fn files_under(dir: &Utf8Path) -> Result<Vec<Utf8PathBuf>> {
    files_matching(dir, "**/*")
}

/// Archive entry name for `path` relative to `root`, always `/`-separated.
///
/// Returns `None` when `path` is not below `root`.
#[must_use]
pub fn entry_name(root: &Utf8Path, path: &Utf8Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<&str> = relative.components().map(|part| part.as_str()).collect();
    (!parts.is_empty()).then(|| parts.join("/"))
}
