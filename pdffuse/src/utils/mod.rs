//! Utilities for path collection and size formatting.

use crate::{Result, error::PdfFuseError};
use std::path::PathBuf;

/// Expand multiple glob patterns into filesystem paths.
///
/// Accepts anything iterable with items that convert to `&str`, e.g.:
/// `&[&str]`, `Vec<String>`, or `Vec<&str>`.
///
/// Paths come back in pattern order; within one pattern they follow the
/// order `glob` yields them (alphabetical). A pattern without wildcards
/// that matches nothing is kept as-is, so the caller reports the missing
/// file instead of silently skipping it.
///
/// Errors:
/// - Propagates `glob` parse errors.
/// - Propagates filesystem errors from glob iterator.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved_paths = Vec::new();

    for pattern in patterns.into_iter() {
        let paths = collect_paths_for_pattern(pattern.as_ref())?;
        if paths.is_empty() && !is_glob_pattern(pattern.as_ref()) {
            resolved_paths.push(PathBuf::from(pattern.as_ref()));
        } else {
            resolved_paths.extend(paths);
        }
    }

    Ok(resolved_paths)
}

/// Expand a single glob pattern into filesystem paths.
///
/// Pattern examples:
/// - `"**/*.pdf"`
/// - `"./docs/*.pdf"`
fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let mut resolved_paths = Vec::new();

    let paths = glob::glob(pattern).map_err(|err| PdfFuseError::Other {
        message: format!("Invalid pattern '{pattern}': {err}"),
    })?;

    for entry in paths {
        let path = entry.map_err(|err| PdfFuseError::Other {
            message: err.to_string(),
        })?;
        resolved_paths.push(path);
    }

    Ok(resolved_paths)
}

fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// Format a byte count for display.
///
/// Follows the upload list's convention: plain bytes below 1 KiB, then one
/// decimal in KB, then one decimal in MB with no larger unit.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if size >= MB {
        format!("{:.1} MB", size as f64 / MB as f64)
    } else if size >= KB {
        format!("{:.1} KB", size as f64 / KB as f64)
    } else {
        format!("{size} bytes")
    }
}
